//! Sans-IO gRPC-Web envelope framing.
//!
//! This crate provides the framing layer of the gRPC-Web wire protocol:
//! encoding payloads into length-prefixed envelopes and incrementally
//! decoding a byte stream back into frames. It performs no I/O and no
//! base64 handling -- callers feed it raw decoded bytes in whatever chunks
//! the transport produced and drain complete frames as they become
//! available.
//!
//! # Example
//!
//! ```rust
//! use grpcweb_frame::{Frame, FrameBuffer, encode_message};
//!
//! let mut wire = Vec::new();
//! encode_message(b"hello", &mut wire);
//!
//! let mut fb = FrameBuffer::new();
//! fb.push(&wire[..3]);
//! assert!(fb.try_decode().unwrap().is_none()); // header incomplete
//!
//! fb.push(&wire[3..]);
//! match fb.try_decode().unwrap() {
//!     Some(Frame::Message(payload)) => assert_eq!(&payload[..], b"hello"),
//!     other => panic!("expected message frame, got {other:?}"),
//! }
//! ```

pub mod error;
pub mod frame;

pub use error::FrameError;
pub use frame::{
    DEFAULT_MAX_FRAME_LEN, FLAG_COMPRESSED, FLAG_TRAILERS, FRAME_HEADER_LEN, Frame, FrameBuffer,
    decode, encode_message, encode_trailers,
};
