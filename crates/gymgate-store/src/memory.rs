//! In-memory store used by tests and as a reference implementation.

use crate::models::{Member, StoredTemplate};
use crate::store::MemberStore;
use gymgate_core::{AttendanceRecord, Error, MemberId, NewAttendance, Result, TenantId};
use gymgate_protocol::TemplateRecord;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

#[derive(Default)]
struct Inner {
    members: HashMap<(TenantId, MemberId), Member>,
    attendance: Vec<(TenantId, AttendanceRecord)>,
    /// When set, the next attendance append fails with this message.
    attendance_failure: Option<String>,
}

/// Programmable in-memory [`MemberStore`].
///
/// Beyond the trait, it exposes seeding helpers, a failure-injection hook for
/// the attendance-write path, and call counters so tests can assert how many
/// store reads a flow performed (the single-flight sync tests rely on this).
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    list_calls: AtomicUsize,
    find_calls: AtomicUsize,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a member.
    pub async fn put_member(&self, member: Member) {
        let mut inner = self.inner.lock().await;
        inner
            .members
            .insert((member.tenant_id.clone(), member.id.clone()), member);
    }

    /// Remove a member entirely (simulates a deletion race).
    pub async fn remove_member(&self, tenant: &TenantId, member: &MemberId) {
        let mut inner = self.inner.lock().await;
        inner.members.remove(&(tenant.clone(), member.clone()));
    }

    /// Make the next `append_attendance` call fail.
    pub async fn fail_next_attendance(&self, message: &str) {
        let mut inner = self.inner.lock().await;
        inner.attendance_failure = Some(message.to_string());
    }

    /// All records appended for a tenant, in insertion order.
    pub async fn attendance_for(&self, tenant: &TenantId) -> Vec<AttendanceRecord> {
        let inner = self.inner.lock().await;
        inner
            .attendance
            .iter()
            .filter(|(t, _)| t == tenant)
            .map(|(_, r)| r.clone())
            .collect()
    }

    /// Number of `list_templates` calls made so far.
    pub fn list_template_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Number of `find_member` calls made so far.
    pub fn find_member_calls(&self) -> usize {
        self.find_calls.load(Ordering::SeqCst)
    }
}

impl MemberStore for MemoryStore {
    async fn find_member(&self, tenant: &TenantId, member: &MemberId) -> Result<Option<Member>> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        let inner = self.inner.lock().await;
        Ok(inner.members.get(&(tenant.clone(), member.clone())).cloned())
    }

    async fn list_templates(&self, tenant: &TenantId) -> Result<Vec<TemplateRecord>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let inner = self.inner.lock().await;
        let mut records: Vec<TemplateRecord> = inner
            .members
            .values()
            .filter(|m| &m.tenant_id == tenant)
            .filter_map(|m| {
                m.template.as_ref().map(|t| TemplateRecord {
                    member_id: m.id.clone(),
                    template: t.template.clone(),
                    quality: t.quality,
                })
            })
            .collect();
        // Deterministic order for test assertions.
        records.sort_by(|a, b| a.member_id.as_str().cmp(b.member_id.as_str()));
        Ok(records)
    }

    async fn set_template(
        &self,
        tenant: &TenantId,
        member: &MemberId,
        template: StoredTemplate,
    ) -> Result<()> {
        let mut inner = self.inner.lock().await;
        let entry = inner
            .members
            .get_mut(&(tenant.clone(), member.clone()))
            .ok_or_else(|| Error::MemberNotFound(member.to_string()))?;
        entry.template = Some(template);
        Ok(())
    }

    async fn clear_template(&self, tenant: &TenantId, member: &MemberId) -> Result<()> {
        let mut inner = self.inner.lock().await;
        let entry = inner
            .members
            .get_mut(&(tenant.clone(), member.clone()))
            .ok_or_else(|| Error::MemberNotFound(member.to_string()))?;
        entry.template = None;
        Ok(())
    }

    async fn append_attendance(
        &self,
        tenant: &TenantId,
        attendance: NewAttendance,
    ) -> Result<AttendanceRecord> {
        let mut inner = self.inner.lock().await;
        if let Some(message) = inner.attendance_failure.take() {
            return Err(Error::AttendanceWrite(message));
        }
        if !inner
            .members
            .contains_key(&(tenant.clone(), attendance.member_id.clone()))
        {
            return Err(Error::MemberNotFound(attendance.member_id.to_string()));
        }
        // Id and timestamp are assigned here, on the store side.
        let record = AttendanceRecord::assign(attendance);
        inner.attendance.push((tenant.clone(), record.clone()));
        Ok(record)
    }
}
