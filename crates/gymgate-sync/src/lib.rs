//! Template synchronization between the remote store and the reader service.
//!
//! The reader service matches against its in-memory template collection, so
//! that collection has to track the store: a [`TemplateSyncManager`] reads
//! the tenant's templates once and pushes them as a single `load_templates`
//! command. Runs are single-flight; a `run()` issued while another is in
//! progress is a no-op.

pub mod manager;

pub use manager::{SyncConfig, SyncStatus, TemplateSyncManager};
