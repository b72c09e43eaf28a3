//! Reader counters, exposed via metriken for Prometheus exposition.

use metriken::{Counter, metric};

#[metric(
    name = "grpcweb/frames/decoded",
    description = "Total frames decoded from response streams"
)]
pub static FRAMES_DECODED: Counter = Counter::new();

#[metric(
    name = "grpcweb/messages/delivered",
    description = "Messages deserialized and dispatched to the data callback"
)]
pub static MESSAGES_DELIVERED: Counter = Counter::new();

#[metric(
    name = "grpcweb/messages/dropped",
    description = "Message frames dropped (no deserializer set, or deserialization failed)"
)]
pub static MESSAGES_DROPPED: Counter = Counter::new();

#[metric(
    name = "grpcweb/trailers/parsed",
    description = "Non-empty trailer blocks parsed into a status"
)]
pub static TRAILERS_PARSED: Counter = Counter::new();

#[metric(
    name = "grpcweb/streams/failed",
    description = "Streams ended by a base64 or framing decode failure"
)]
pub static STREAMS_FAILED: Counter = Counter::new();
