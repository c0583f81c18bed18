//! Tokio codecs for the newline-delimited JSON reader protocol.
//!
//! Two thin codecs over the same line framing:
//!
//! - [`ReaderCodec`] is the client side: encodes [`Command`], decodes [`Event`].
//! - [`ServiceCodec`] is the reader-service side: encodes [`Event`], decodes
//!   [`Command`]. Used by the in-process service mocks in integration tests.
//!
//! Both enforce a maximum frame size so a misbehaving peer cannot grow the
//! receive buffer without bound.
//!
//! Decode errors identify the offending line but do not poison the codec:
//! the connection layer logs and drops malformed frames and keeps reading,
//! per the protocol-error policy.

use bytes::{BufMut, BytesMut};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio_util::codec::{Decoder, Encoder};

use crate::{Command, Event};
use gymgate_core::{Error, Result, constants::MAX_FRAME_SIZE};

/// Encode one message as a JSON line into the destination buffer.
fn encode_line<T: Serialize>(item: &T, dst: &mut BytesMut, max_frame_size: usize) -> Result<()> {
    let json = serde_json::to_vec(item)?;
    if json.len() + 1 > max_frame_size {
        return Err(Error::FrameTooLarge {
            size: json.len() + 1,
            max_size: max_frame_size,
        });
    }
    dst.reserve(json.len() + 1);
    dst.put_slice(&json);
    dst.put_u8(b'\n');
    Ok(())
}

/// Extract and parse the next complete JSON line from the source buffer.
///
/// Returns `Ok(None)` when no full line has arrived yet. Blank lines are
/// consumed and skipped.
fn decode_line<T: DeserializeOwned>(
    src: &mut BytesMut,
    max_frame_size: usize,
) -> Result<Option<T>> {
    loop {
        let Some(pos) = src.iter().position(|&b| b == b'\n') else {
            // No complete line yet. Refuse to buffer forever.
            if src.len() > max_frame_size {
                return Err(Error::FrameTooLarge {
                    size: src.len(),
                    max_size: max_frame_size,
                });
            }
            return Ok(None);
        };

        if pos + 1 > max_frame_size {
            return Err(Error::FrameTooLarge {
                size: pos + 1,
                max_size: max_frame_size,
            });
        }

        let line = src.split_to(pos + 1);
        let line = &line[..pos];
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if line.is_empty() {
            continue;
        }

        return serde_json::from_slice(line)
            .map(Some)
            .map_err(|e| Error::InvalidMessageFormat(format!("bad frame: {e}")));
    }
}

/// Client-side codec: [`Command`] out, [`Event`] in.
#[derive(Debug)]
pub struct ReaderCodec {
    max_frame_size: usize,
}

impl ReaderCodec {
    /// Create a codec with the default 64 KB frame limit.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_frame_size: MAX_FRAME_SIZE,
        }
    }

    /// Create a codec with a custom frame limit.
    #[must_use]
    pub fn with_max_frame_size(max_frame_size: usize) -> Self {
        Self { max_frame_size }
    }

    /// Get the current maximum frame size.
    #[must_use]
    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }
}

impl Default for ReaderCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for ReaderCodec {
    type Item = Event;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Event>> {
        decode_line(src, self.max_frame_size)
    }
}

impl Encoder<Command> for ReaderCodec {
    type Error = Error;

    fn encode(&mut self, item: Command, dst: &mut BytesMut) -> Result<()> {
        encode_line(&item, dst, self.max_frame_size)
    }
}

/// Service-side codec: [`Event`] out, [`Command`] in.
///
/// The mirror of [`ReaderCodec`], used by scripted reader-service mocks in
/// integration tests and by the emulator.
#[derive(Debug)]
pub struct ServiceCodec {
    max_frame_size: usize,
}

impl ServiceCodec {
    /// Create a codec with the default 64 KB frame limit.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_frame_size: MAX_FRAME_SIZE,
        }
    }
}

impl Default for ServiceCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for ServiceCodec {
    type Item = Command;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Command>> {
        decode_line(src, self.max_frame_size)
    }
}

impl Encoder<Event> for ServiceCodec {
    type Error = Error;

    fn encode(&mut self, item: Event, dst: &mut BytesMut) -> Result<()> {
        encode_line(&item, dst, self.max_frame_size)
    }
}
