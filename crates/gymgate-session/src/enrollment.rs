//! Enrollment session state machine and coordinator.
//!
//! # States
//!
//! - `Starting`: command sent, waiting for the first capture
//! - `Capturing`: captures in progress, `samples_needed` counting down
//! - `Complete`: all samples taken, template stored reader-side
//! - `Cancelled`: aborted by the operator
//! - `Error`: reader-reported failure
//!
//! # Valid Transitions
//!
//! - Starting → Capturing / Complete / Cancelled / Error
//! - Capturing → Capturing / Complete / Cancelled / Error
//!
//! Terminal states destroy the session; there is never more than one active
//! session per client.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use gymgate_core::{Error, MemberId, Result, constants::SAMPLES_REQUIRED};
use gymgate_link::ReaderLink;
use gymgate_protocol::{Command, Event};

/// Phase of an enrollment session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentState {
    /// `start_enrollment` sent, waiting for the reader to begin capturing.
    Starting,

    /// Captures in progress.
    Capturing,

    /// All required samples captured.
    Complete,

    /// Aborted locally by the operator.
    Cancelled,

    /// Reader-reported capture failure.
    Error,
}

impl fmt::Display for EnrollmentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state_str = match self {
            EnrollmentState::Starting => "Starting",
            EnrollmentState::Capturing => "Capturing",
            EnrollmentState::Complete => "Complete",
            EnrollmentState::Cancelled => "Cancelled",
            EnrollmentState::Error => "Error",
        };
        write!(f, "{}", state_str)
    }
}

impl EnrollmentState {
    /// Check if transition to target state is valid from this state.
    ///
    /// # Examples
    ///
    /// ```
    /// use gymgate_session::EnrollmentState;
    ///
    /// assert!(EnrollmentState::Starting.can_transition_to(&EnrollmentState::Capturing));
    /// assert!(!EnrollmentState::Complete.can_transition_to(&EnrollmentState::Capturing));
    /// ```
    pub fn can_transition_to(&self, target: &EnrollmentState) -> bool {
        matches!(
            (self, target),
            (
                EnrollmentState::Starting,
                EnrollmentState::Capturing
                    | EnrollmentState::Complete
                    | EnrollmentState::Cancelled
                    | EnrollmentState::Error
            ) | (
                EnrollmentState::Capturing,
                EnrollmentState::Capturing
                    | EnrollmentState::Complete
                    | EnrollmentState::Cancelled
                    | EnrollmentState::Error
            )
        )
    }

    /// Returns `true` for states that end the session.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            EnrollmentState::Complete | EnrollmentState::Cancelled | EnrollmentState::Error
        )
    }
}

/// One in-flight enrollment. Created by `start()`, destroyed on completion,
/// cancellation, or error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentSession {
    pub member_id: MemberId,
    pub state: EnrollmentState,
    /// Remaining captures. Starts at 4, non-increasing.
    pub samples_needed: u8,
}

/// Progress surfaced to the UI layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrollmentUpdate {
    /// One more capture landed; show the countdown.
    Progress {
        member_id: MemberId,
        samples_needed: u8,
    },

    /// Enrollment finished; play the completion cue.
    Completed { member_id: MemberId },

    /// Reader failed the enrollment; the operator must restart it.
    Failed { member_id: MemberId, error: String },
}

/// Drives enrollment sessions, one at a time.
///
/// Local state is authoritative for UI purposes: cancellation destroys the
/// session whether or not the reader service ever acknowledges it.
#[derive(Debug, Default)]
pub struct EnrollmentCoordinator {
    session: Option<EnrollmentSession>,
}

impl EnrollmentCoordinator {
    /// Create a coordinator with no active session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The active session, if any.
    #[must_use]
    pub fn session(&self) -> Option<&EnrollmentSession> {
        self.session.as_ref()
    }

    /// Start enrolling a member.
    ///
    /// Sends `start_enrollment` and creates the session in `Starting` with
    /// the full sample count.
    ///
    /// # Errors
    ///
    /// Returns `Error::EnrollmentInProgress` if any session is already
    /// active, for the same or a different member: a second start would
    /// desynchronize the reader and the UI. Propagates send failures; no
    /// session is created if the command could not be written.
    pub async fn start(&mut self, link: &mut ReaderLink, member_id: MemberId) -> Result<()> {
        if let Some(active) = &self.session {
            return Err(Error::EnrollmentInProgress(active.member_id.to_string()));
        }

        link.send(Command::StartEnrollment {
            member_id: member_id.clone(),
        })
        .await?;

        info!(member = %member_id, "Enrollment started");
        self.session = Some(EnrollmentSession {
            member_id,
            state: EnrollmentState::Starting,
            samples_needed: SAMPLES_REQUIRED,
        });
        Ok(())
    }

    /// Cancel the active enrollment, if any.
    ///
    /// Best-effort and local-first: the cancel command is sent when the link
    /// is up, but the session is destroyed regardless. The reader service is
    /// trusted to stop capturing on receipt.
    pub async fn cancel(&mut self, link: &mut ReaderLink) {
        let Some(session) = self.session.take() else {
            debug!("cancel ignored: no active enrollment");
            return;
        };

        info!(member = %session.member_id, "Enrollment cancelled");
        if let Err(e) = link.send(Command::CancelEnrollment).await {
            warn!("cancel_enrollment not delivered: {}", e);
        }
    }

    /// Feed an inbound event to the coordinator.
    ///
    /// Returns an update for the UI when the event advanced the session.
    /// Events for other members, events without a session, and
    /// non-enrollment events are logged and ignored.
    pub fn handle_event(&mut self, event: &Event) -> Option<EnrollmentUpdate> {
        match event {
            Event::EnrollmentProgress {
                member_id,
                status,
                samples_needed,
            } => self.on_progress(member_id, status, *samples_needed),
            Event::EnrollmentComplete { member_id } => self.on_complete(member_id),
            Event::EnrollmentError { member_id, error } => self.on_error(member_id, error),
            _ => None,
        }
    }

    fn session_for(&mut self, member_id: &MemberId) -> Option<&mut EnrollmentSession> {
        match &self.session {
            Some(session) if &session.member_id == member_id => {}
            Some(session) => {
                warn!(
                    expected = %session.member_id,
                    got = %member_id,
                    "enrollment event for wrong member ignored"
                );
                return None;
            }
            None => {
                warn!(member = %member_id, "enrollment event without active session ignored");
                return None;
            }
        }
        self.session.as_mut()
    }

    fn on_progress(
        &mut self,
        member_id: &MemberId,
        status: &str,
        samples_needed: u8,
    ) -> Option<EnrollmentUpdate> {
        let session = self.session_for(member_id)?;

        if session.state.can_transition_to(&EnrollmentState::Capturing) {
            session.state = EnrollmentState::Capturing;
        }

        // The countdown is non-increasing; a regression means the reader
        // restarted on us, keep the UI monotonic and log it.
        if samples_needed > session.samples_needed {
            warn!(
                member = %member_id,
                reported = samples_needed,
                current = session.samples_needed,
                "ignoring samples_needed regression"
            );
        } else {
            session.samples_needed = samples_needed;
        }

        debug!(
            member = %member_id,
            status,
            samples_needed = session.samples_needed,
            "Enrollment progress"
        );

        Some(EnrollmentUpdate::Progress {
            member_id: member_id.clone(),
            samples_needed: session.samples_needed,
        })
    }

    fn on_complete(&mut self, member_id: &MemberId) -> Option<EnrollmentUpdate> {
        self.session_for(member_id)?;
        self.session = None;

        info!(member = %member_id, "Enrollment complete");
        Some(EnrollmentUpdate::Completed {
            member_id: member_id.clone(),
        })
    }

    fn on_error(&mut self, member_id: &MemberId, error: &str) -> Option<EnrollmentUpdate> {
        self.session_for(member_id)?;
        self.session = None;

        warn!(member = %member_id, error, "Enrollment failed");
        Some(EnrollmentUpdate::Failed {
            member_id: member_id.clone(),
            error: error.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gymgate_link::LinkConfig;
    use rstest::rstest;

    fn member(id: &str) -> MemberId {
        MemberId::new(id).unwrap()
    }

    fn progress(id: &str, samples_needed: u8) -> Event {
        Event::EnrollmentProgress {
            member_id: member(id),
            status: "capturing".to_string(),
            samples_needed,
        }
    }

    /// A link that was never connected: sends fail, which is what the
    /// cancel-is-local-first tests want.
    fn dead_link() -> ReaderLink {
        ReaderLink::new(LinkConfig::default())
    }

    #[rstest]
    #[case(EnrollmentState::Starting, EnrollmentState::Capturing, true)]
    #[case(EnrollmentState::Starting, EnrollmentState::Complete, true)]
    #[case(EnrollmentState::Capturing, EnrollmentState::Capturing, true)]
    #[case(EnrollmentState::Capturing, EnrollmentState::Error, true)]
    #[case(EnrollmentState::Complete, EnrollmentState::Capturing, false)]
    #[case(EnrollmentState::Cancelled, EnrollmentState::Starting, false)]
    #[case(EnrollmentState::Error, EnrollmentState::Capturing, false)]
    fn test_state_transitions(
        #[case] from: EnrollmentState,
        #[case] to: EnrollmentState,
        #[case] valid: bool,
    ) {
        assert_eq!(from.can_transition_to(&to), valid);
    }

    #[test]
    fn test_terminal_states() {
        assert!(EnrollmentState::Complete.is_terminal());
        assert!(EnrollmentState::Cancelled.is_terminal());
        assert!(EnrollmentState::Error.is_terminal());
        assert!(!EnrollmentState::Starting.is_terminal());
        assert!(!EnrollmentState::Capturing.is_terminal());
    }

    #[tokio::test]
    async fn test_start_requires_working_link() {
        let mut coordinator = EnrollmentCoordinator::new();
        let mut link = dead_link();

        let result = coordinator.start(&mut link, member("M1")).await;
        assert!(result.is_err());
        // No session is created when the command never went out.
        assert!(coordinator.session().is_none());
    }

    #[tokio::test]
    async fn test_second_start_rejected_while_session_active() {
        let mut coordinator = EnrollmentCoordinator::new();
        coordinator.session = Some(EnrollmentSession {
            member_id: member("M1"),
            state: EnrollmentState::Capturing,
            samples_needed: 2,
        });

        // Guard fires before any socket I/O, for the same or another member.
        let mut link = dead_link();
        let result = coordinator.start(&mut link, member("M1")).await;
        assert!(matches!(result, Err(Error::EnrollmentInProgress(_))));

        let result = coordinator.start(&mut link, member("M2")).await;
        assert!(matches!(result, Err(Error::EnrollmentInProgress(_))));

        assert_eq!(coordinator.session().unwrap().member_id, member("M1"));
    }

    #[test]
    fn test_progress_counts_down_and_transitions_to_capturing() {
        let mut coordinator = EnrollmentCoordinator::new();
        coordinator.session = Some(EnrollmentSession {
            member_id: member("M1"),
            state: EnrollmentState::Starting,
            samples_needed: SAMPLES_REQUIRED,
        });

        for expected in [3, 2, 1, 0] {
            let update = coordinator.handle_event(&progress("M1", expected)).unwrap();
            assert_eq!(
                update,
                EnrollmentUpdate::Progress {
                    member_id: member("M1"),
                    samples_needed: expected
                }
            );
        }

        let session = coordinator.session().unwrap();
        assert_eq!(session.state, EnrollmentState::Capturing);
        assert_eq!(session.samples_needed, 0);
    }

    #[test]
    fn test_samples_needed_never_increases() {
        let mut coordinator = EnrollmentCoordinator::new();
        coordinator.session = Some(EnrollmentSession {
            member_id: member("M1"),
            state: EnrollmentState::Capturing,
            samples_needed: 2,
        });

        let update = coordinator.handle_event(&progress("M1", 3)).unwrap();
        assert_eq!(
            update,
            EnrollmentUpdate::Progress {
                member_id: member("M1"),
                samples_needed: 2
            }
        );
    }

    #[test]
    fn test_complete_destroys_session() {
        let mut coordinator = EnrollmentCoordinator::new();
        coordinator.session = Some(EnrollmentSession {
            member_id: member("M1"),
            state: EnrollmentState::Capturing,
            samples_needed: 0,
        });

        let update = coordinator
            .handle_event(&Event::EnrollmentComplete {
                member_id: member("M1"),
            })
            .unwrap();
        assert_eq!(
            update,
            EnrollmentUpdate::Completed {
                member_id: member("M1")
            }
        );
        assert!(coordinator.session().is_none());
    }

    #[test]
    fn test_error_destroys_session_and_surfaces_message() {
        let mut coordinator = EnrollmentCoordinator::new();
        coordinator.session = Some(EnrollmentSession {
            member_id: member("M1"),
            state: EnrollmentState::Capturing,
            samples_needed: 2,
        });

        let update = coordinator
            .handle_event(&Event::EnrollmentError {
                member_id: member("M1"),
                error: "finger moved".to_string(),
            })
            .unwrap();
        assert_eq!(
            update,
            EnrollmentUpdate::Failed {
                member_id: member("M1"),
                error: "finger moved".to_string()
            }
        );
        assert!(coordinator.session().is_none());
    }

    #[test]
    fn test_events_for_other_members_ignored() {
        let mut coordinator = EnrollmentCoordinator::new();
        coordinator.session = Some(EnrollmentSession {
            member_id: member("M1"),
            state: EnrollmentState::Capturing,
            samples_needed: 2,
        });

        assert!(coordinator.handle_event(&progress("M2", 1)).is_none());
        assert!(coordinator
            .handle_event(&Event::EnrollmentComplete {
                member_id: member("M2")
            })
            .is_none());

        // Session untouched.
        assert_eq!(coordinator.session().unwrap().samples_needed, 2);
    }

    #[test]
    fn test_events_without_session_ignored() {
        let mut coordinator = EnrollmentCoordinator::new();
        assert!(coordinator.handle_event(&progress("M1", 3)).is_none());
    }

    #[test]
    fn test_non_enrollment_events_ignored() {
        let mut coordinator = EnrollmentCoordinator::new();
        coordinator.session = Some(EnrollmentSession {
            member_id: member("M1"),
            state: EnrollmentState::Capturing,
            samples_needed: 2,
        });

        let event = Event::FingerprintNotFound { request_id: None };
        assert!(coordinator.handle_event(&event).is_none());
    }

    #[tokio::test]
    async fn test_cancel_destroys_session_even_when_send_fails() {
        let mut coordinator = EnrollmentCoordinator::new();
        coordinator.session = Some(EnrollmentSession {
            member_id: member("M1"),
            state: EnrollmentState::Capturing,
            samples_needed: 2,
        });

        // Disconnected link: the cancel command cannot be delivered.
        let mut link = dead_link();
        coordinator.cancel(&mut link).await;

        assert!(coordinator.session().is_none());
    }

    #[tokio::test]
    async fn test_cancel_without_session_is_noop() {
        let mut coordinator = EnrollmentCoordinator::new();
        let mut link = dead_link();
        coordinator.cancel(&mut link).await;
        assert!(coordinator.session().is_none());
    }
}
