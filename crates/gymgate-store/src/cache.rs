//! TTL-cache decorator for idempotent member reads.
//!
//! Wraps any [`MemberStore`] and memoizes `find_member` results for a short
//! window, keyed by `(tenant, member)`. Explicit wrapper composition, not
//! annotation magic: build the store, then wrap it where the composition root
//! wants cached reads.
//!
//! Only positive results are cached; a miss always goes to the remote store
//! so a freshly created member shows up immediately. Template writes
//! invalidate the affected key.

use crate::models::{Member, StoredTemplate};
use crate::store::MemberStore;
use gymgate_core::{AttendanceRecord, MemberId, NewAttendance, Result, TenantId};
use gymgate_protocol::TemplateRecord;
use std::sync::Mutex;
use std::time::Duration;
use tracing::trace;
use ttl_cache::TtlCache;

/// Default entry lifetime for cached member reads.
const DEFAULT_TTL: Duration = Duration::from_secs(30);

/// Default cache capacity (entries).
const DEFAULT_CAPACITY: usize = 1024;

type Key = (TenantId, MemberId);

/// Caching [`MemberStore`] wrapper.
pub struct CachedStore<S> {
    inner: S,
    cache: Mutex<TtlCache<Key, Member>>,
    ttl: Duration,
}

impl<S: MemberStore> CachedStore<S> {
    /// Wrap a store with the default TTL and capacity.
    pub fn new(inner: S) -> Self {
        Self::with_ttl(inner, DEFAULT_TTL)
    }

    /// Wrap a store with a custom entry lifetime.
    pub fn with_ttl(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            cache: Mutex::new(TtlCache::new(DEFAULT_CAPACITY)),
            ttl,
        }
    }

    /// Access the wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn cache_get(&self, key: &Key) -> Option<Member> {
        // Mutex poisoning only happens if a panic occurred while holding the
        // lock; treat that as an empty cache rather than propagating.
        let mut cache = match self.cache.lock() {
            Ok(cache) => cache,
            Err(poisoned) => poisoned.into_inner(),
        };
        cache.get(key).cloned()
    }

    fn cache_put(&self, key: Key, member: Member) {
        let mut cache = match self.cache.lock() {
            Ok(cache) => cache,
            Err(poisoned) => poisoned.into_inner(),
        };
        cache.insert(key, member, self.ttl);
    }

    fn cache_invalidate(&self, key: &Key) {
        let mut cache = match self.cache.lock() {
            Ok(cache) => cache,
            Err(poisoned) => poisoned.into_inner(),
        };
        cache.remove(key);
    }
}

impl<S: MemberStore> MemberStore for CachedStore<S> {
    async fn find_member(&self, tenant: &TenantId, member: &MemberId) -> Result<Option<Member>> {
        let key = (tenant.clone(), member.clone());

        if let Some(hit) = self.cache_get(&key) {
            trace!(member = %member, "member read served from cache");
            return Ok(Some(hit));
        }

        let result = self.inner.find_member(tenant, member).await?;
        if let Some(found) = &result {
            self.cache_put(key, found.clone());
        }
        Ok(result)
    }

    async fn list_templates(&self, tenant: &TenantId) -> Result<Vec<TemplateRecord>> {
        // Sync runs want the freshest collection; never cached.
        self.inner.list_templates(tenant).await
    }

    async fn set_template(
        &self,
        tenant: &TenantId,
        member: &MemberId,
        template: StoredTemplate,
    ) -> Result<()> {
        self.cache_invalidate(&(tenant.clone(), member.clone()));
        self.inner.set_template(tenant, member, template).await
    }

    async fn clear_template(&self, tenant: &TenantId, member: &MemberId) -> Result<()> {
        self.cache_invalidate(&(tenant.clone(), member.clone()));
        self.inner.clear_template(tenant, member).await
    }

    async fn append_attendance(
        &self,
        tenant: &TenantId,
        attendance: NewAttendance,
    ) -> Result<AttendanceRecord> {
        self.inner.append_attendance(tenant, attendance).await
    }
}
