//! gRPC-Web envelope encoding/decoding.
//!
//! Every frame carries a fixed 5-byte header:
//! ```text
//! +--------------+-----------------------------+
//! |  Flags (8)   |        Length (32, BE)      |
//! +--------------+-----------------------------+
//! |              Payload ...                   |
//! +--------------------------------------------+
//! ```
//!
//! Flags `0x00` marks a DATA frame (one application message payload) and
//! `0x80` marks a TRAILERS frame (an HTTP/1-style header block with
//! end-of-stream metadata). A stream carries any number of DATA frames
//! followed by at most one non-empty TRAILERS frame.

use bytes::{Buf, Bytes, BytesMut};

use crate::error::FrameError;

/// Envelope header size in bytes: flags byte + 4-byte big-endian length.
pub const FRAME_HEADER_LEN: usize = 5;

/// Flags bit marking a TRAILERS frame.
pub const FLAG_TRAILERS: u8 = 0x80;

/// Flags bit marking a compressed payload (not supported).
pub const FLAG_COMPRESSED: u8 = 0x01;

/// Default ceiling on a single frame's payload length (4 MiB, the
/// conventional gRPC maximum message size).
pub const DEFAULT_MAX_FRAME_LEN: usize = 4 * 1024 * 1024;

/// One decoded gRPC-Web frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// DATA frame: raw bytes of one undeserialized application message.
    Message(Bytes),
    /// TRAILERS frame: raw bytes of the trailing metadata block.
    Trailers(Bytes),
}

/// Append one DATA envelope carrying `payload` to `out`.
pub fn encode_message(payload: &[u8], out: &mut Vec<u8>) {
    out.push(0);
    out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    out.extend_from_slice(payload);
}

/// Append one TRAILERS envelope carrying `block` to `out`.
pub fn encode_trailers(block: &[u8], out: &mut Vec<u8>) {
    out.push(FLAG_TRAILERS);
    out.extend_from_slice(&(block.len() as u32).to_be_bytes());
    out.extend_from_slice(block);
}

/// Try to decode one frame from the front of `buf`.
///
/// Returns `Ok(Some((frame, consumed)))` for a complete frame, `Ok(None)`
/// when more bytes are needed. A partial header or partial payload consumes
/// nothing. Never panics on malformed input.
pub fn decode(buf: &[u8], max_len: usize) -> Result<Option<(Frame, usize)>, FrameError> {
    if buf.len() < FRAME_HEADER_LEN {
        return Ok(None);
    }

    let flags = buf[0];
    if flags != 0 && flags != FLAG_TRAILERS {
        return Err(FrameError::UnsupportedFlags(flags));
    }

    let len = u32::from_be_bytes([buf[1], buf[2], buf[3], buf[4]]) as usize;
    if len > max_len {
        return Err(FrameError::FrameTooLarge { len, max: max_len });
    }

    let total = FRAME_HEADER_LEN + len;
    if buf.len() < total {
        return Ok(None);
    }

    let payload = Bytes::copy_from_slice(&buf[FRAME_HEADER_LEN..total]);
    let frame = if flags == FLAG_TRAILERS {
        Frame::Trailers(payload)
    } else {
        Frame::Message(payload)
    };

    Ok(Some((frame, total)))
}

/// Stateful reassembly buffer for decoding frames from chunked input.
///
/// Bytes arrive via [`push`](Self::push) in whatever splits the transport
/// produced; [`try_decode`](Self::try_decode) drains complete frames in
/// byte order, buffering any trailing partial frame for the next push.
/// Once a decode error is hit the buffer latches it and reports the same
/// error on every subsequent call -- frame boundaries are unrecoverable
/// after a malformed header, so the stream must be discarded.
#[derive(Debug)]
pub struct FrameBuffer {
    buf: BytesMut,
    max_len: usize,
    failed: Option<FrameError>,
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuffer {
    /// Create a buffer with the default frame length ceiling.
    pub fn new() -> Self {
        Self::with_max_frame_len(DEFAULT_MAX_FRAME_LEN)
    }

    /// Create a buffer with an explicit frame length ceiling.
    pub fn with_max_frame_len(max_len: usize) -> Self {
        Self {
            buf: BytesMut::new(),
            max_len,
            failed: None,
        }
    }

    /// Append bytes received from the transport.
    pub fn push(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Try to drain one complete frame. `Ok(None)` means no complete frame
    /// is buffered yet.
    pub fn try_decode(&mut self) -> Result<Option<Frame>, FrameError> {
        if let Some(err) = &self.failed {
            return Err(err.clone());
        }

        match decode(&self.buf, self.max_len) {
            Ok(Some((frame, consumed))) => {
                self.buf.advance(consumed);
                Ok(Some(frame))
            }
            Ok(None) => Ok(None),
            Err(err) => {
                self.failed = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Whether no undecoded bytes remain buffered.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}
