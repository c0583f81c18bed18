use chrono::{DateTime, Utc};
use gymgate_core::{MemberId, Quality, TemplateData, TenantId};
use serde::{Deserialize, Serialize};

/// A member's enrolled biometric template as held by the remote store.
///
/// Immutable once stored: re-enrollment replaces the whole value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredTemplate {
    pub template: TemplateData,
    pub quality: Quality,
    pub enrolled_at: DateTime<Utc>,
}

impl StoredTemplate {
    /// Create a template stamped with the current time.
    #[must_use]
    pub fn new(template: TemplateData, quality: Quality) -> Self {
        Self {
            template,
            quality,
            enrolled_at: Utc::now(),
        }
    }
}

/// The member fields the attendance subsystem reads.
///
/// The full member document (memberships, contact data, billing) belongs to
/// the CRUD screens and is out of scope here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: MemberId,
    pub tenant_id: TenantId,
    pub name: String,
    /// Current template, if the member is enrolled.
    pub template: Option<StoredTemplate>,
}

impl Member {
    /// Returns `true` if the member has an enrolled template.
    #[must_use]
    pub fn is_enrolled(&self) -> bool {
        self.template.is_some()
    }
}
