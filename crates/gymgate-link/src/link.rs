//! The reader link: one persistent connection to the local reader service.

use futures::{SinkExt, StreamExt};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::Instant;
use tokio_util::codec::Framed;
use tracing::{debug, error, info, trace, warn};

use crate::LinkConfig;
use gymgate_core::{Error, LinkState, Result};
use gymgate_protocol::{Command, Event, ReaderCodec};

use std::time::Duration;

/// Bounded wait for flush/shutdown during disconnect, so a dead network
/// cannot hang the teardown path.
const CLOSE_TIMEOUT: Duration = Duration::from_millis(500);

/// Connection manager for the fingerprint-reader service.
///
/// `ReaderLink` owns the socket, the connection state, and the
/// "connection attempted" flag that enforces the no-auto-retry policy. All
/// coordinators funnel their commands through one instance, injected by the
/// application's composition root; borrowing it `&mut` per operation is what
/// serializes command/response exchanges.
///
/// # Connection lifecycle
///
/// ```text
/// disconnected ──connect()──> connecting ──> connected
///       ^                                        │
///       └───── error / close / disconnect() ─────┘
/// ```
///
/// After any attempt, `connect()` is suppressed until [`reconnect`]
/// (ReaderLink::reconnect) clears the flag. `reconnect()` is always a
/// user- or caller-triggered action, never automatic.
///
/// # Thread safety
///
/// `ReaderLink` is single-owner by design. The subsystem is single-task
/// cooperative: all socket I/O happens on whichever task currently holds the
/// `&mut` borrow.
pub struct ReaderLink {
    config: LinkConfig,

    /// Framed socket (None whenever disconnected).
    framed: Option<Framed<TcpStream, ReaderCodec>>,

    state: LinkState,

    /// Set by every `connect()` call, cleared only by `reconnect()`.
    attempted: bool,

    /// Deadline for the next keepalive ping (None while disconnected).
    next_ping: Option<Instant>,
}

impl ReaderLink {
    /// Create a new, disconnected link.
    ///
    /// # Example
    ///
    /// ```
    /// use gymgate_link::{LinkConfig, ReaderLink};
    ///
    /// let link = ReaderLink::new(LinkConfig::default());
    /// assert!(!link.is_connected());
    /// ```
    pub fn new(config: LinkConfig) -> Self {
        debug!("Creating reader link for {}", config.reader_addr);

        Self {
            config,
            framed: None,
            state: LinkState::Disconnected,
            attempted: false,
            next_ping: None,
        }
    }

    /// Current connection state.
    #[must_use]
    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Returns `true` if the socket is open and usable.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    /// Returns `true` if a connection attempt has been made since the last
    /// `reconnect()`.
    #[must_use]
    pub fn connection_attempted(&self) -> bool {
        self.attempted
    }

    /// Attempt to connect to the reader service.
    ///
    /// A no-op (beyond a logged warning) if a prior attempt was already made
    /// and the link is not connected: failures are never retried
    /// automatically, the operator must trigger [`reconnect`]
    /// (ReaderLink::reconnect). Also a no-op when already connected.
    ///
    /// Failure does not surface as an error; it leaves the state
    /// `disconnected` and logs the cause. Callers observe the returned
    /// [`LinkState`].
    pub async fn connect(&mut self) -> LinkState {
        if self.state.is_connected() {
            debug!("connect() ignored: already connected");
            return self.state;
        }
        if self.attempted {
            warn!(
                "connect() suppressed after earlier attempt; use reconnect() to retry {}",
                self.config.reader_addr
            );
            return self.state;
        }

        self.attempted = true;
        self.state = LinkState::Connecting;
        info!("Connecting to reader service at {}", self.config.reader_addr);

        let stream = match tokio::time::timeout(
            self.config.connect_timeout,
            TcpStream::connect(self.config.reader_addr),
        )
        .await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                error!("Connection to reader service failed: {}", e);
                self.state = LinkState::Disconnected;
                return self.state;
            }
            Err(_) => {
                warn!(
                    "Connection timeout after {}ms",
                    self.config.connect_timeout.as_millis()
                );
                self.state = LinkState::Disconnected;
                return self.state;
            }
        };

        // Commands are small and latency-sensitive; do not let Nagle batch them.
        if let Err(e) = stream.set_nodelay(true) {
            warn!("Failed to set TCP_NODELAY: {}", e);
        }

        self.framed = Some(Framed::new(stream, ReaderCodec::new()));
        self.state = LinkState::Connected;
        self.next_ping = Some(Instant::now() + self.config.ping_interval);

        info!("Connected to reader service");
        self.state
    }

    /// Close the connection. Idempotent.
    ///
    /// Flush and shutdown each get a bounded wait so teardown cannot hang on
    /// a dead network.
    pub async fn disconnect(&mut self) {
        self.next_ping = None;
        self.state = LinkState::Disconnected;

        if let Some(mut framed) = self.framed.take() {
            info!("Closing connection to reader service");

            match tokio::time::timeout(CLOSE_TIMEOUT, framed.flush()).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!("Error flushing during disconnect: {}", e),
                Err(_) => warn!("Flush timeout during disconnect"),
            }

            let mut stream = framed.into_inner();
            match tokio::time::timeout(CLOSE_TIMEOUT, stream.shutdown()).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!("Error during shutdown: {}", e),
                Err(_) => warn!("Shutdown timeout during disconnect"),
            }

            debug!("Connection closed");
        }
    }

    /// The only sanctioned recovery path.
    ///
    /// Resets the attempt flag, tears down any existing socket, waits the
    /// settle delay so the prior socket fully closes, then connects again.
    pub async fn reconnect(&mut self) -> LinkState {
        info!("Manual reconnect requested");
        self.attempted = false;
        self.disconnect().await;
        tokio::time::sleep(self.config.settle_delay).await;
        self.connect().await
    }

    /// Send a command to the reader service.
    ///
    /// Commands are not queued or retried: on a closed link this logs a
    /// diagnostic and returns `Error::NotConnected`, which fire-and-forget
    /// callers (keepalive, enrollment cancel) deliberately ignore. A write
    /// failure tears the connection down; recovery is `reconnect()`.
    pub async fn send(&mut self, command: Command) -> Result<()> {
        let Some(framed) = self.framed.as_mut() else {
            warn!(command = command.name(), "send dropped: not connected");
            return Err(Error::NotConnected);
        };

        trace!(command = command.name(), "Sending command");

        match tokio::time::timeout(self.config.send_timeout, framed.send(command)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => {
                error!("Failed to send command: {}", e);
                self.drop_connection();
                Err(Error::ConnectionLost(e.to_string()))
            }
            Err(_) => {
                warn!(
                    "Send timeout after {}ms",
                    self.config.send_timeout.as_millis()
                );
                self.drop_connection();
                Err(Error::ConnectionLost("send timeout".to_string()))
            }
        }
    }

    /// Wait for the next inbound event.
    ///
    /// This is the event pump: while it is being polled, the keepalive ping
    /// fires on schedule (the only traffic generated without an explicit
    /// caller action) and stops the moment the connection drops.
    ///
    /// Malformed frames are logged and dropped without tearing down the
    /// connection. I/O errors and EOF flip the state to disconnected and
    /// surface as `Error::ConnectionLost`; no retry is scheduled.
    pub async fn next_event(&mut self) -> Result<Event> {
        loop {
            if self.framed.is_none() {
                return Err(Error::NotConnected);
            }

            // Keepalive due?
            if let Some(deadline) = self.next_ping
                && deadline <= Instant::now()
            {
                self.next_ping = Some(Instant::now() + self.config.ping_interval);
                trace!("Sending keepalive ping");
                self.send(Command::Ping).await?;
                continue;
            }

            let deadline = self
                .next_ping
                .unwrap_or_else(|| Instant::now() + self.config.ping_interval);

            // framed is Some, checked above; re-borrow after the ping branch.
            let Some(framed) = self.framed.as_mut() else {
                return Err(Error::NotConnected);
            };

            match tokio::time::timeout_at(deadline, framed.next()).await {
                // Ping deadline reached; handled at the top of the loop.
                Err(_) => continue,
                Ok(Some(Ok(event))) => {
                    trace!(?event, "Received event");
                    return Ok(event);
                }
                Ok(Some(Err(Error::InvalidMessageFormat(detail)))) => {
                    // Protocol error: logged and dropped, connection stays up.
                    warn!("Dropping malformed frame from reader service: {}", detail);
                }
                Ok(Some(Err(e))) => {
                    error!("Read failed: {}", e);
                    self.drop_connection();
                    return Err(Error::ConnectionLost(e.to_string()));
                }
                Ok(None) => {
                    warn!("Reader service closed the connection");
                    self.drop_connection();
                    return Err(Error::ConnectionLost(
                        "connection closed by reader service".to_string(),
                    ));
                }
            }
        }
    }

    /// Clear the live socket after an error or close. Never schedules a
    /// retry; operators must trigger `reconnect()`.
    fn drop_connection(&mut self) {
        self.framed = None;
        self.next_ping = None;
        self.state = LinkState::Disconnected;
    }
}

impl Drop for ReaderLink {
    fn drop(&mut self) {
        if self.framed.is_some() {
            debug!("ReaderLink dropped while connected - socket will be closed");
        }
    }
}
