//! Connection management for the local fingerprint-reader service.
//!
//! This crate owns the one persistent socket between the attendance client
//! and the reader service. It provides explicit lifecycle control
//! (`connect`/`disconnect`/`reconnect`), command sending, the inbound event
//! pump, and the 30-second keepalive.
//!
//! # Recovery policy
//!
//! A failed or dropped connection is **never** retried automatically. The
//! reader service is a single local hardware-bound process; reconnect storms
//! against it help nothing. After the first failed attempt, `connect()`
//! becomes a logged no-op until `reconnect()` resets the attempt flag; that
//! is the only sanctioned recovery path, wired to an operator-facing button.
//!
//! # Example
//!
//! ```no_run
//! use gymgate_link::{LinkConfig, ReaderLink};
//! use gymgate_protocol::Command;
//!
//! # async fn example() -> gymgate_core::Result<()> {
//! let mut link = ReaderLink::new(LinkConfig::from_env()?);
//!
//! link.connect().await;
//! if link.is_connected() {
//!     link.send(Command::Ping).await?;
//!     let event = link.next_event().await?;
//!     println!("reader says: {:?}", event);
//! }
//! # Ok(())
//! # }
//! ```

mod config;
mod link;

pub use config::LinkConfig;
pub use link::ReaderLink;
