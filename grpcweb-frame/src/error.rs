/// Errors produced while decoding gRPC-Web envelopes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// The flags byte is not a plain DATA or TRAILERS frame.
    ///
    /// This includes the compressed bit (0x01): there is no decompression
    /// path, so a compressed frame cannot be delivered correctly.
    #[error("unsupported frame flags: {0:#04x}")]
    UnsupportedFlags(u8),

    /// The declared frame length exceeds the configured ceiling.
    #[error("frame of {len} bytes exceeds maximum of {max}")]
    FrameTooLarge { len: usize, max: usize },
}
