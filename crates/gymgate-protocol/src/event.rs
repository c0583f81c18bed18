//! Inbound events emitted by the reader service.

use gymgate_core::MemberId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events the reader service writes to the socket, discriminated by `type`.
///
/// Verification responses may carry the `requestId` echoed from the
/// originating command; older firmwares omit it, in which case the pipeline
/// falls back to most-recent-request matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A submitted sample matched a loaded template.
    #[serde(rename_all = "camelCase")]
    FingerprintVerified {
        member_id: MemberId,
        #[serde(default)]
        member_name: Option<String>,
        /// Raw reader score, 0-1 or 0-100 depending on firmware.
        confidence: f64,
        #[serde(default)]
        request_id: Option<Uuid>,
    },

    /// A submitted sample matched nothing. Expected, non-exceptional.
    #[serde(rename_all = "camelCase")]
    FingerprintNotFound {
        #[serde(default)]
        request_id: Option<Uuid>,
    },

    /// One capture of the enrollment sequence completed.
    #[serde(rename_all = "camelCase")]
    EnrollmentProgress {
        member_id: MemberId,
        status: String,
        samples_needed: u8,
    },

    /// All required captures taken; the template is ready.
    #[serde(rename_all = "camelCase")]
    EnrollmentComplete { member_id: MemberId },

    /// The reader failed the enrollment; the session must be restarted.
    #[serde(rename_all = "camelCase")]
    EnrollmentError { member_id: MemberId, error: String },
}

impl Event {
    /// Returns `true` for the two verification response events.
    #[must_use]
    pub fn is_verification_response(&self) -> bool {
        matches!(
            self,
            Event::FingerprintVerified { .. } | Event::FingerprintNotFound { .. }
        )
    }
}
