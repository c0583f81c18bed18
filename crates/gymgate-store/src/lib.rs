//! Remote-store interface for the attendance link.
//!
//! The hosted document store (members, templates, attendance records) is an
//! external collaborator: this crate defines the narrow contract the
//! attendance subsystem consumes (read a member by id, list or replace a
//! tenant's template collection, append an attendance record), plus an
//! in-memory implementation used by tests and as a reference, and a TTL-cache
//! decorator for idempotent member reads.
//!
//! All operations are atomic single-document reads/writes; no cross-document
//! transactions are assumed available. The attendance append is conditional
//! on the member still existing, which closes the verify-then-record race at
//! the store boundary.

pub mod cache;
pub mod memory;
pub mod models;
pub mod store;

pub use cache::CachedStore;
pub use memory::MemoryStore;
pub use models::{Member, StoredTemplate};
pub use store::MemberStore;
