//! Verification and attendance recording.
//!
//! A verification is a request/response exchange over the event channel: the
//! client sends `verify_fingerprint` and awaits the matching
//! `fingerprint_verified` or `fingerprint_not_found` event. Each request
//! carries a correlation id; response events that echo one are matched on it,
//! events without one (older reader firmware) fall back to the
//! most-recent-request rule. Requests are serialized by construction: the
//! pipeline holds the `&mut` link for the whole exchange.
//!
//! On a match, the pipeline records attendance in the remote store. The
//! match-then-append sequence spans two store operations and is not wrapped
//! in a transaction; the append itself is conditional on the member still
//! existing, so a deletion race surfaces as a clean failure instead of an
//! orphaned record.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use gymgate_core::{
    AttendanceRecord, Confidence, Error, MatchResult, MemberId, NewAttendance, Quality, Result,
    TemplateData, TenantId, constants::DEFAULT_VERIFY_TIMEOUT,
};
use gymgate_link::ReaderLink;
use gymgate_protocol::{Command, Event};
use gymgate_store::{Member, MemberStore, StoredTemplate};

/// Configuration for the verification pipeline.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Bounded wait for a verification response event. Elapsing fails closed
    /// with `Error::ReaderTimeout`, distinct from "not recognized".
    pub verify_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            verify_timeout: DEFAULT_VERIFY_TIMEOUT,
        }
    }
}

/// Outcome of one verification exchange.
#[derive(Debug, Clone, PartialEq)]
pub enum VerifyOutcome {
    /// The sample matched a loaded template.
    Match(MatchResult),
    /// No template matched. Expected, non-exceptional.
    NotRecognized,
}

/// Outcome of the composed verify-then-record operation.
#[derive(Debug, Clone, PartialEq)]
pub enum AttendanceOutcome {
    /// Attendance recorded; profile fields for the UI plus the new record.
    Recorded {
        member: Member,
        record: AttendanceRecord,
    },
    /// No template matched; nothing was written.
    NotRecognized,
}

/// Turns a captured sample into an attendance side effect, and manages the
/// member's canonical biometric record in the remote store.
#[derive(Debug, Clone, Default)]
pub struct VerificationPipeline {
    config: SessionConfig,
}

impl VerificationPipeline {
    /// Create a pipeline with the given configuration.
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self { config }
    }

    /// Submit a captured sample for matching.
    ///
    /// Sends `verify_fingerprint` tagged with a fresh correlation id and
    /// pumps the link until the corresponding response event arrives.
    /// Unrelated events seen meanwhile (enrollment traffic, stale responses
    /// with a different correlation id) are logged and dropped.
    ///
    /// # Errors
    ///
    /// - `Error::ReaderTimeout` if no response arrives within the configured
    ///   window
    /// - `Error::NotConnected` / `Error::ConnectionLost` on transport
    ///   failures
    /// - `Error::InvalidConfidence` if the reader reports a nonsensical score
    pub async fn verify(
        &self,
        link: &mut ReaderLink,
        tenant: &TenantId,
        template: TemplateData,
    ) -> Result<VerifyOutcome> {
        let request_id = Uuid::new_v4();

        link.send(Command::VerifyFingerprint {
            tenant_id: tenant.clone(),
            template,
            request_id,
        })
        .await?;

        debug!(%request_id, "Verification submitted");
        let deadline = Instant::now() + self.config.verify_timeout;

        loop {
            let event = match tokio::time::timeout_at(deadline, link.next_event()).await {
                Ok(result) => result?,
                Err(_) => {
                    warn!(%request_id, "No response from reader");
                    return Err(Error::ReaderTimeout(
                        self.config.verify_timeout.as_millis() as u64,
                    ));
                }
            };

            match event {
                Event::FingerprintVerified {
                    member_id,
                    member_name,
                    confidence,
                    request_id: echoed,
                } if correlates(echoed, request_id) => {
                    let confidence = Confidence::from_raw(confidence)?;
                    info!(member = %member_id, %confidence, "Fingerprint matched");
                    return Ok(VerifyOutcome::Match(MatchResult {
                        member_id,
                        member_name,
                        confidence,
                    }));
                }
                Event::FingerprintNotFound { request_id: echoed }
                    if correlates(echoed, request_id) =>
                {
                    info!(%request_id, "Fingerprint not recognized");
                    return Ok(VerifyOutcome::NotRecognized);
                }
                other => {
                    debug!(event = ?other, "Ignoring event unrelated to verification");
                }
            }
        }
    }

    /// Verify a sample and, on match, record attendance.
    ///
    /// 1. [`verify`](Self::verify); a no-match returns
    ///    [`AttendanceOutcome::NotRecognized`] without touching the store.
    /// 2. Fetch the member's current record; a template must never outlive
    ///    its owning member, but deletion races exist, so a missing member
    ///    fails with `Error::MemberNotFound`.
    /// 3. Append one attendance event with `method = fingerprint`. The store
    ///    assigns the record id and timestamp; the returned record is the
    ///    persisted one.
    ///
    /// # Errors
    ///
    /// `Error::AttendanceWrite` (store write failed after a successful
    /// match, so the operator should retry, not re-scan) is distinct from
    /// both the not-recognized outcome and `Error::MemberNotFound`.
    pub async fn verify_and_register<S: MemberStore>(
        &self,
        link: &mut ReaderLink,
        store: &S,
        tenant: &TenantId,
        template: TemplateData,
    ) -> Result<AttendanceOutcome> {
        let matched = match self.verify(link, tenant, template).await? {
            VerifyOutcome::Match(matched) => matched,
            VerifyOutcome::NotRecognized => return Ok(AttendanceOutcome::NotRecognized),
        };

        let member = store
            .find_member(tenant, &matched.member_id)
            .await?
            .ok_or_else(|| Error::MemberNotFound(matched.member_id.to_string()))?;

        let record = store
            .append_attendance(
                tenant,
                NewAttendance::fingerprint(member.id.clone(), member.name.clone()),
            )
            .await?;

        info!(
            member = %member.id,
            record = %record.id,
            "Attendance recorded"
        );
        Ok(AttendanceOutcome::Recorded { member, record })
    }

    /// Store a newly captured template as the member's canonical biometric
    /// record, superseding any prior one.
    pub async fn enroll_fingerprint<S: MemberStore>(
        &self,
        store: &S,
        tenant: &TenantId,
        member_id: &MemberId,
        template: TemplateData,
        quality: Quality,
    ) -> Result<()> {
        store
            .set_template(tenant, member_id, StoredTemplate::new(template, quality))
            .await?;
        info!(member = %member_id, "Template stored");
        Ok(())
    }

    /// Clear the member's stored template.
    ///
    /// Copies already loaded inside the reader service stay live until the
    /// next sync run pushes the updated collection.
    pub async fn delete_fingerprint<S: MemberStore>(
        &self,
        store: &S,
        tenant: &TenantId,
        member_id: &MemberId,
    ) -> Result<()> {
        store.clear_template(tenant, member_id).await?;
        info!(member = %member_id, "Template cleared");
        Ok(())
    }
}

/// Correlation rule: match on the echoed request id when present, fall back
/// to most-recent-request when the firmware omits it.
fn correlates(echoed: Option<Uuid>, expected: Uuid) -> bool {
    echoed.is_none_or(|id| id == expected)
}
