//! Outbound commands sent to the reader service.

use gymgate_core::{MemberId, Quality, TemplateData, TenantId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One member's template as pushed during a sync run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRecord {
    pub member_id: MemberId,
    pub template: TemplateData,
    pub quality: Quality,
}

/// Commands the client writes to the socket.
///
/// Serialized as a flat JSON object with a `command` discriminator, matching
/// what the reader service parses, e.g.
/// `{"command":"start_enrollment","memberId":"M1"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// Begin a multi-sample enrollment for one member.
    #[serde(rename_all = "camelCase")]
    StartEnrollment { member_id: MemberId },

    /// Abort the in-progress enrollment. The reader service is trusted to
    /// stop capturing on receipt; no acknowledgement is awaited.
    CancelEnrollment,

    /// Keepalive, emitted every 30 seconds while connected.
    Ping,

    /// Submit a captured sample for matching against the tenant's loaded
    /// templates. Answered by `fingerprint_verified` or
    /// `fingerprint_not_found`, correlated by `request_id`.
    #[serde(rename_all = "camelCase")]
    VerifyFingerprint {
        tenant_id: TenantId,
        template: TemplateData,
        request_id: Uuid,
    },

    /// Replace the reader service's local matching set with the tenant's
    /// current templates.
    #[serde(rename_all = "camelCase")]
    LoadTemplates {
        tenant_id: TenantId,
        templates: Vec<TemplateRecord>,
    },
}

impl Command {
    /// Wire name of the command, as it appears in the `command` tag.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Command::StartEnrollment { .. } => "start_enrollment",
            Command::CancelEnrollment => "cancel_enrollment",
            Command::Ping => "ping",
            Command::VerifyFingerprint { .. } => "verify_fingerprint",
            Command::LoadTemplates { .. } => "load_templates",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(id: &str) -> MemberId {
        MemberId::new(id).unwrap()
    }

    #[test]
    fn test_start_enrollment_wire_shape() {
        let cmd = Command::StartEnrollment {
            member_id: member("M1"),
        };
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json["command"], "start_enrollment");
        assert_eq!(json["memberId"], "M1");
    }

    #[test]
    fn test_ping_is_bare_tag() {
        let json = serde_json::to_value(Command::Ping).unwrap();
        assert_eq!(json, serde_json::json!({"command": "ping"}));
    }

    #[test]
    fn test_verify_carries_correlation_id() {
        let request_id = Uuid::new_v4();
        let cmd = Command::VerifyFingerprint {
            tenant_id: TenantId::new("gym-1").unwrap(),
            template: TemplateData::new("AAEC").unwrap(),
            request_id,
        };
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json["command"], "verify_fingerprint");
        assert_eq!(json["tenantId"], "gym-1");
        assert_eq!(json["requestId"], request_id.to_string());
    }

    #[test]
    fn test_load_templates_roundtrip() {
        let cmd = Command::LoadTemplates {
            tenant_id: TenantId::new("gym-1").unwrap(),
            templates: vec![TemplateRecord {
                member_id: member("M1"),
                template: TemplateData::new("AAEC").unwrap(),
                quality: Quality::new(80).unwrap(),
            }],
        };
        let json = serde_json::to_string(&cmd).unwrap();
        let back: Command = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cmd);
    }

    #[test]
    fn test_command_names() {
        assert_eq!(Command::CancelEnrollment.name(), "cancel_enrollment");
        assert_eq!(Command::Ping.name(), "ping");
    }
}
