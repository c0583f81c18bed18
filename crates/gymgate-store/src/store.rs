#![allow(async_fn_in_trait)]

use crate::models::{Member, StoredTemplate};
use gymgate_core::{AttendanceRecord, MemberId, NewAttendance, Result, TenantId};
use gymgate_protocol::TemplateRecord;

/// Contract for the remote document store, scoped to what the attendance
/// subsystem needs.
///
/// Implementations are expected to provide atomic single-document semantics
/// per operation; nothing here spans documents.
///
/// # Implementation Note
///
/// Uses native async trait methods (Edition 2024), so no `async-trait`
/// dependency is needed.
pub trait MemberStore: Send + Sync {
    /// Read one member by id within a tenant.
    async fn find_member(&self, tenant: &TenantId, member: &MemberId) -> Result<Option<Member>>;

    /// List the tenant's current template collection, one record per
    /// enrolled member, in wire-ready form for a sync push.
    async fn list_templates(&self, tenant: &TenantId) -> Result<Vec<TemplateRecord>>;

    /// Set a member's canonical template, superseding any prior one.
    ///
    /// # Errors
    /// Returns `Error::MemberNotFound` if the member does not exist.
    async fn set_template(
        &self,
        tenant: &TenantId,
        member: &MemberId,
        template: StoredTemplate,
    ) -> Result<()>;

    /// Clear a member's stored template.
    ///
    /// Copies already loaded inside the reader service stay valid until the
    /// next sync.
    ///
    /// # Errors
    /// Returns `Error::MemberNotFound` if the member does not exist.
    async fn clear_template(&self, tenant: &TenantId, member: &MemberId) -> Result<()>;

    /// Append one attendance event, conditional on the member existing.
    ///
    /// The store assigns the record id and timestamp at write time and
    /// returns the record exactly as persisted, so the caller's copy can
    /// never diverge from the stored one.
    ///
    /// # Errors
    /// Returns `Error::MemberNotFound` if the member was deleted since the
    /// match, `Error::AttendanceWrite` on a write failure.
    async fn append_attendance(
        &self,
        tenant: &TenantId,
        attendance: NewAttendance,
    ) -> Result<AttendanceRecord>;
}
