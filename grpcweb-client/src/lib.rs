//! Streamed gRPC-Web response reader.
//!
//! This crate turns the incrementally-delivered, base64-encoded body of a
//! gRPC-Web response into typed application messages plus a terminal
//! status. It sits between a polling HTTP transport (anything that exposes
//! cumulative response text and a ready state) and application code that
//! wants `data` / `status` / `end` events. Message (de)serialization stays
//! with the caller -- the reader hands over raw `&[u8]` payloads, in the
//! same codec-agnostic spirit as the rest of the stack.
//!
//! # Architecture
//!
//! ```text
//!   cumulative base64 response text
//!        |
//!   +----v------------+
//!   | StreamReader    |  4-aligned slicing + base64 decode
//!   +----+------------+
//!        |
//!   +----v------------+
//!   | grpcweb-frame   |  envelope framing: Message / Trailers
//!   +----+------------+
//!        |
//!   data / status / end callbacks
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use grpcweb_client::StreamReader;
//!
//! let mut reader = StreamReader::new(transport);
//! reader
//!     .set_deserializer(|bytes| MyMessage::decode(bytes).ok())
//!     .on_data(|msg| println!("message: {msg:?}"))
//!     .on_status(|status| println!("status: {}", status.code))
//!     .on_end(|| println!("stream complete"));
//!
//! // The transport driver invokes this after every ready-state change.
//! reader.on_ready_state_change();
//! ```

pub mod error;
pub mod metrics;
pub mod reader;
pub mod status;
pub mod trailers;
pub mod transport;

pub use error::ReadError;
pub use reader::StreamReader;
pub use status::{Status, StatusCode, TrailerMap};
pub use trailers::parse_trailers;
pub use transport::{PollingTransport, ReadyState};
