//! Enrollment and verification workflows over the reader link.
//!
//! Two coordinators sit between the UI layer and the connection manager:
//!
//! - [`EnrollmentCoordinator`] drives the multi-sample enrollment state
//!   machine, one session at a time.
//! - [`VerificationPipeline`] turns a captured sample into an attendance
//!   side effect: verify against the reader service, then record attendance
//!   in the remote store.
//!
//! Both borrow the [`ReaderLink`](gymgate_link::ReaderLink) `&mut` per
//! operation, which is what keeps command/response exchanges serialized (at
//! most one verification in flight, one enrollment session per client).

pub mod enrollment;
pub mod verification;

pub use enrollment::{
    EnrollmentCoordinator, EnrollmentSession, EnrollmentState, EnrollmentUpdate,
};
pub use verification::{AttendanceOutcome, SessionConfig, VerificationPipeline, VerifyOutcome};
