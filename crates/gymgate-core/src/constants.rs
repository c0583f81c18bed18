//! Timing and protocol constants for the attendance link.
//!
//! These values govern the behavior of the reader-service connection, the
//! enrollment workflow, and the template sync schedule. They are deliberate
//! policy choices, not tunables: the no-auto-retry rule in particular depends
//! on the reconnect settle delay being long enough for the prior socket to
//! fully close.

use std::time::Duration;

// ============================================================================
// Reader service endpoint
// ============================================================================

/// Default reader-service endpoint (local loopback).
///
/// The reader service always runs on the same machine as the front desk
/// client. Override with the `GYMGATE_READER_ADDR` environment variable.
pub const DEFAULT_READER_ADDR: &str = "127.0.0.1:8080";

/// Environment variable overriding [`DEFAULT_READER_ADDR`].
pub const READER_ADDR_ENV: &str = "GYMGATE_READER_ADDR";

// ============================================================================
// Connection lifecycle
// ============================================================================

/// Timeout for establishing the TCP connection to the reader service.
pub const CONNECT_TIMEOUT: Duration = Duration::from_millis(3000);

/// Delay between `disconnect()` and `connect()` during a manual reconnect.
///
/// Lets the previous socket fully close before a new one is opened, so the
/// reader service never sees two live connections from the same client.
pub const RECONNECT_SETTLE: Duration = Duration::from_millis(500);

/// Keepalive interval while connected.
///
/// A `ping` command is emitted on this schedule; it is the only traffic
/// generated without an explicit caller action.
pub const PING_INTERVAL: Duration = Duration::from_secs(30);

/// Timeout for a single outbound write.
pub const SEND_TIMEOUT: Duration = Duration::from_millis(3000);

// ============================================================================
// Enrollment
// ============================================================================

/// Number of fingerprint captures required to complete one enrollment.
pub const SAMPLES_REQUIRED: u8 = 4;

// ============================================================================
// Verification
// ============================================================================

/// Default bounded wait for a verification response event.
///
/// The reader service normally answers within a second or two; if nothing
/// arrives within this window the attempt fails closed with a reader-timeout
/// error rather than leaving the operator staring at a pending screen.
pub const DEFAULT_VERIFY_TIMEOUT: Duration = Duration::from_secs(10);

// ============================================================================
// Template sync
// ============================================================================

/// Interval between automatic template sync runs.
///
/// Interval retry is acceptable here, unlike connection auto-retry, because
/// it is bounded and low-frequency.
pub const SYNC_INTERVAL: Duration = Duration::from_secs(300);

/// Settle delay after `connect()` before the sync run re-checks connectivity.
pub const SYNC_CONNECT_SETTLE: Duration = Duration::from_millis(500);

// ============================================================================
// Limits
// ============================================================================

/// Maximum quality score for a captured template.
pub const MAX_QUALITY: u8 = 100;

/// Maximum accepted wire frame size in bytes (64 KB).
///
/// A full template push for a large gym fits comfortably; anything bigger is
/// a protocol violation or a hostile peer.
pub const MAX_FRAME_SIZE: usize = 64 * 1024;
