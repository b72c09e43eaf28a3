//! Streamed response reader state machine.
//!
//! `StreamReader` consumes the cumulative base64 response text of a polling
//! transport and translates it into `data` / `status` / `end` callback
//! dispatches. All work happens synchronously inside
//! [`on_ready_state_change`](StreamReader::on_ready_state_change), the single
//! entry point the transport driver invokes after every ready-state change.
//!
//! The cursor into the response text only ever advances to a multiple of 4:
//! base64 decodes in 4-character groups, and the final group of the text
//! seen so far may still be incomplete. Everything past the last complete
//! group is left for a later notification, so no byte is ever decoded twice
//! or dropped across chunk boundaries. Per-notification cost is proportional
//! to newly available text, not to the total received.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use grpcweb_frame::{Frame, FrameBuffer};

use crate::error::ReadError;
use crate::metrics;
use crate::status::{Status, StatusCode, TrailerMap};
use crate::trailers::parse_trailers;
use crate::transport::PollingTransport;

/// Reader over one streamed gRPC-Web response.
///
/// Bound to a single transport for that transport's whole lifetime; discard
/// it once the stream ends or is cancelled. `M` is the deserialized message
/// type produced by the caller-supplied deserializer.
pub struct StreamReader<T, M: 'static> {
    transport: T,
    /// Characters of response text already consumed. Always a multiple of 4,
    /// monotonically non-decreasing, never beyond the current text length.
    pos: usize,
    frames: FrameBuffer,
    deserializer: Option<Box<dyn Fn(&[u8]) -> Option<M>>>,
    on_data: Option<Box<dyn FnMut(M)>>,
    on_status: Option<Box<dyn FnMut(Status)>>,
    on_end: Option<Box<dyn FnMut()>>,
    /// Set once `end` has been dispatched (or the stream failed); later
    /// notifications are ignored.
    ended: bool,
}

impl<T: PollingTransport, M: 'static> StreamReader<T, M> {
    /// Create a reader bound to `transport`, with cursor at zero, a fresh
    /// frame buffer, and no deserializer or callbacks set.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            pos: 0,
            frames: FrameBuffer::new(),
            deserializer: None,
            on_data: None,
            on_status: None,
            on_end: None,
            ended: false,
        }
    }

    /// Create a reader with an explicit ceiling on a single frame's payload
    /// length in place of the default.
    pub fn with_max_frame_len(transport: T, max_len: usize) -> Self {
        let mut reader = Self::new(transport);
        reader.frames = FrameBuffer::with_max_frame_len(max_len);
        reader
    }

    /// Set the message deserializer: raw payload bytes to a message value,
    /// or `None` when the bytes are not a valid encoding. Replaces any
    /// previous deserializer. Message frames arriving while no deserializer
    /// is set are silently dropped.
    pub fn set_deserializer<F>(&mut self, deserialize: F) -> &mut Self
    where
        F: Fn(&[u8]) -> Option<M> + 'static,
    {
        self.deserializer = Some(Box::new(deserialize));
        self
    }

    /// Register the `data` callback, replacing any previous one.
    pub fn on_data<F>(&mut self, callback: F) -> &mut Self
    where
        F: FnMut(M) + 'static,
    {
        self.on_data = Some(Box::new(callback));
        self
    }

    /// Register the `status` callback, replacing any previous one.
    pub fn on_status<F>(&mut self, callback: F) -> &mut Self
    where
        F: FnMut(Status) + 'static,
    {
        self.on_status = Some(Box::new(callback));
        self
    }

    /// Register the `end` callback, replacing any previous one.
    pub fn on_end<F>(&mut self, callback: F) -> &mut Self
    where
        F: FnMut() + 'static,
    {
        self.on_end = Some(Box::new(callback));
        self
    }

    /// Request that the transport abort the in-flight request. Advisory: a
    /// notification already in flight may still complete its processing
    /// pass, and no further callbacks are guaranteed afterwards. Registered
    /// callbacks and the cursor are left untouched.
    pub fn cancel(&mut self) {
        self.transport.abort();
    }

    /// The transport this reader is bound to.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutable access to the transport, for the driver that owns it.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Notification entry point; the transport driver calls this after
    /// every ready-state change.
    ///
    /// Extracts the newly available base64-group-aligned slice of response
    /// text, decodes it, drains complete frames, dispatches callbacks in
    /// frame order, and finally fires `end` exactly once if the transport
    /// reports completion. The completion check runs on every notification,
    /// including ones that surfaced no new aligned text.
    pub fn on_ready_state_change(&mut self) {
        if self.ended {
            return;
        }

        let chunk = {
            let text = self.transport.response_text();
            let aligned = text.len() - text.len() % 4;
            if aligned > self.pos {
                match text.get(self.pos..aligned) {
                    Some(slice) => Ok(Some((slice.to_owned(), aligned))),
                    // Alignment fell inside a multi-byte character; the
                    // body cannot be base64.
                    None => Err(ReadError::NonAscii),
                }
            } else {
                Ok(None)
            }
        };

        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(err) => {
                self.fail(err);
                return;
            }
        };

        if let Some((slice, aligned)) = chunk {
            self.pos = aligned;
            if let Err(err) = self.process_slice(&slice) {
                self.fail(err);
                return;
            }
        }

        if self.transport.ready_state().is_done() {
            self.ended = true;
            if let Some(callback) = &mut self.on_end {
                callback();
            }
        }
    }

    /// Decode one aligned base64 slice and dispatch every complete frame.
    fn process_slice(&mut self, slice: &str) -> Result<(), ReadError> {
        let bytes = STANDARD.decode(slice)?;
        self.frames.push(&bytes);

        while let Some(frame) = self.frames.try_decode()? {
            metrics::FRAMES_DECODED.increment();
            match frame {
                Frame::Message(payload) => self.dispatch_message(&payload),
                Frame::Trailers(block) => {
                    // Only a non-empty trailer block carries a status.
                    if !block.is_empty() {
                        self.dispatch_trailers(&block);
                    }
                }
            }
        }

        Ok(())
    }

    fn dispatch_message(&mut self, payload: &[u8]) {
        let message = match &self.deserializer {
            Some(deserialize) => deserialize(payload),
            None => {
                metrics::MESSAGES_DROPPED.increment();
                return;
            }
        };

        match message {
            Some(message) => {
                metrics::MESSAGES_DELIVERED.increment();
                if let Some(callback) = &mut self.on_data {
                    callback(message);
                }
            }
            // Undecodable payload: drop this one message, keep the stream.
            None => {
                metrics::MESSAGES_DROPPED.increment();
            }
        }
    }

    fn dispatch_trailers(&mut self, block: &[u8]) {
        metrics::TRAILERS_PARSED.increment();
        let status = Status::from_trailers(parse_trailers(block));
        if let Some(callback) = &mut self.on_status {
            callback(status);
        }
    }

    /// Fail the stream deterministically: surface an unknown-status end and
    /// ignore every later notification. The cursor is never rewound, so a
    /// failure cannot corrupt alignment arithmetic.
    fn fail(&mut self, err: ReadError) {
        metrics::STREAMS_FAILED.increment();
        self.ended = true;
        if let Some(callback) = &mut self.on_status {
            callback(Status {
                code: StatusCode::Unknown,
                details: err.to_string(),
                metadata: TrailerMap::new(),
            });
        }
        if let Some(callback) = &mut self.on_end {
            callback();
        }
    }

    #[cfg(test)]
    fn position(&self) -> usize {
        self.pos
    }
}
