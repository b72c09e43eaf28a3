use grpcweb_frame::FrameError;

/// Failures hit while decoding a response stream inside a notification pass.
///
/// None of these escape the reader as panics or propagated errors: each one
/// latches the stream as failed and is surfaced to the consumer as an
/// unknown-status end (the `status` and `end` callbacks are the only failure
/// channel).
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    /// An aligned slice of the response text failed base64 decoding.
    #[error("malformed base64 in response body: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The decoded byte stream carried a malformed envelope.
    #[error("malformed response frame: {0}")]
    Frame(#[from] FrameError),

    /// The response text carried non-ASCII data where base64 was expected.
    #[error("response text contains non-ASCII data")]
    NonAscii,
}
