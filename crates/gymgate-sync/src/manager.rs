//! The single-flight sync runner and its interval scheduler.

use std::sync::Mutex;
use std::sync::PoisonError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use gymgate_core::{
    SyncResult, TenantId,
    constants::{SYNC_CONNECT_SETTLE, SYNC_INTERVAL},
};
use gymgate_link::ReaderLink;
use gymgate_protocol::Command;
use gymgate_store::MemberStore;

/// Configuration for the sync manager.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Delay between scheduled runs.
    pub interval: Duration,
    /// Settle delay after an in-run `connect()` before connectivity is
    /// re-checked.
    pub connect_settle: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval: SYNC_INTERVAL,
            connect_settle: SYNC_CONNECT_SETTLE,
        }
    }
}

/// What the last completed run accomplished. Failed and skipped runs leave
/// this untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncStatus {
    pub last_synced_at: Option<DateTime<Utc>>,
    pub last_count: usize,
}

/// Pushes the tenant's template collection to the reader service.
///
/// One push replaces the whole collection, so a run is idempotent and safe
/// to repeat on a schedule. The manager is shared (`&self` operations) and
/// guards itself with an atomic in-flight flag.
#[derive(Debug, Default)]
pub struct TemplateSyncManager {
    config: SyncConfig,
    in_flight: AtomicBool,
    status: Mutex<SyncStatus>,
}

/// Clears the in-flight flag on every exit path out of `run()`.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl TemplateSyncManager {
    /// Create a manager with the given configuration.
    #[must_use]
    pub fn new(config: SyncConfig) -> Self {
        Self {
            config,
            in_flight: AtomicBool::new(false),
            status: Mutex::new(SyncStatus::default()),
        }
    }

    /// Snapshot of the last completed run.
    pub fn status(&self) -> SyncStatus {
        self.status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Run one sync pass: read the tenant's templates from the store and
    /// push them as a single `load_templates` command.
    ///
    /// If another run is already in flight, this returns a failed
    /// [`SyncResult`] without touching the link or the store. A disconnected
    /// link gets one `connect()` attempt plus a settle delay; if the reader
    /// service is still unreachable the run aborts softly and the scheduler
    /// retries at the next interval.
    ///
    /// Failures never update [`status`](Self::status).
    pub async fn run<S: MemberStore>(
        &self,
        link: &mut ReaderLink,
        store: &S,
        tenant: &TenantId,
    ) -> SyncResult {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(%tenant, "Sync already in progress, skipping");
            return SyncResult::failed("sync already in progress");
        }
        let _guard = InFlightGuard(&self.in_flight);

        if !link.is_connected() {
            link.connect().await;
            tokio::time::sleep(self.config.connect_settle).await;
            if !link.is_connected() {
                warn!(%tenant, "Reader service unreachable, sync aborted");
                return SyncResult::failed("reader service unreachable");
            }
        }

        let templates = match store.list_templates(tenant).await {
            Ok(templates) => templates,
            Err(err) => {
                warn!(%tenant, error = %err, "Template listing failed");
                return SyncResult::failed(err.to_string());
            }
        };
        let count = templates.len();

        if let Err(err) = link
            .send(Command::LoadTemplates {
                tenant_id: tenant.clone(),
                templates,
            })
            .await
        {
            warn!(%tenant, error = %err, "Template push failed");
            return SyncResult::failed(err.to_string());
        }

        {
            let mut status = self.status.lock().unwrap_or_else(PoisonError::into_inner);
            status.last_synced_at = Some(Utc::now());
            status.last_count = count;
        }

        info!(%tenant, count, "Templates synced");
        SyncResult::completed(count)
    }

    /// Operator-triggered sync, e.g. after a bulk member import. Same
    /// guarded pass as the scheduled one.
    pub async fn resync<S: MemberStore>(
        &self,
        link: &mut ReaderLink,
        store: &S,
        tenant: &TenantId,
    ) -> SyncResult {
        info!(%tenant, "Manual resync requested");
        self.run(link, store, tenant).await
    }

    /// Drive [`run`](Self::run) on the configured interval, forever.
    ///
    /// The first pass fires immediately, so calling this right after startup
    /// doubles as the initial template load. Failed passes are logged and
    /// retried at the next tick.
    pub async fn run_on_interval<S: MemberStore>(
        &self,
        link: &mut ReaderLink,
        store: &S,
        tenant: &TenantId,
    ) {
        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let result = self.run(link, store, tenant).await;
            if !result.success {
                warn!(
                    %tenant,
                    error = result.error.as_deref().unwrap_or("unknown"),
                    "Scheduled sync did not complete"
                );
            }
        }
    }
}
