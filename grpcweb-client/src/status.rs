//! gRPC status model: canonical codes plus the trailer-derived `Status`.

use std::collections::HashMap;
use std::fmt;

/// Trailer metadata: header name to value, case-sensitive as received.
/// Duplicate keys resolve to the last occurrence.
pub type TrailerMap = HashMap<String, String>;

/// Canonical gRPC status codes
/// (<https://grpc.github.io/grpc/core/md_doc_statuscodes.html>).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum StatusCode {
    Ok = 0,
    Cancelled = 1,
    Unknown = 2,
    InvalidArgument = 3,
    DeadlineExceeded = 4,
    NotFound = 5,
    AlreadyExists = 6,
    PermissionDenied = 7,
    ResourceExhausted = 8,
    FailedPrecondition = 9,
    Aborted = 10,
    OutOfRange = 11,
    Unimplemented = 12,
    Internal = 13,
    Unavailable = 14,
    DataLoss = 15,
    Unauthenticated = 16,
}

impl StatusCode {
    /// Map a numeric code to its variant. Out-of-range values collapse to
    /// [`Unknown`](Self::Unknown).
    pub fn from_code(code: u32) -> Self {
        match code {
            0 => Self::Ok,
            1 => Self::Cancelled,
            2 => Self::Unknown,
            3 => Self::InvalidArgument,
            4 => Self::DeadlineExceeded,
            5 => Self::NotFound,
            6 => Self::AlreadyExists,
            7 => Self::PermissionDenied,
            8 => Self::ResourceExhausted,
            9 => Self::FailedPrecondition,
            10 => Self::Aborted,
            11 => Self::OutOfRange,
            12 => Self::Unimplemented,
            13 => Self::Internal,
            14 => Self::Unavailable,
            15 => Self::DataLoss,
            16 => Self::Unauthenticated,
            _ => Self::Unknown,
        }
    }

    /// Decode a `grpc-status` trailer value: a decimal string. A value that
    /// does not parse as a number is a data-quality defect and decodes to
    /// [`Unknown`](Self::Unknown) rather than failing the stream.
    pub fn from_wire(value: &str) -> Self {
        match value.trim().parse::<u32>() {
            Ok(code) => Self::from_code(code),
            Err(_) => Self::Unknown,
        }
    }

    /// The canonical SCREAMING_SNAKE name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Cancelled => "CANCELLED",
            Self::Unknown => "UNKNOWN",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::DeadlineExceeded => "DEADLINE_EXCEEDED",
            Self::NotFound => "NOT_FOUND",
            Self::AlreadyExists => "ALREADY_EXISTS",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::ResourceExhausted => "RESOURCE_EXHAUSTED",
            Self::FailedPrecondition => "FAILED_PRECONDITION",
            Self::Aborted => "ABORTED",
            Self::OutOfRange => "OUT_OF_RANGE",
            Self::Unimplemented => "UNIMPLEMENTED",
            Self::Internal => "INTERNAL",
            Self::Unavailable => "UNAVAILABLE",
            Self::DataLoss => "DATA_LOSS",
            Self::Unauthenticated => "UNAUTHENTICATED",
        }
    }

    /// Whether this is the OK status.
    pub fn is_ok(self) -> bool {
        self == Self::Ok
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Terminal status of one response stream, built from its trailer block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    /// Decoded `grpc-status`; `Ok` when the trailer carries none.
    pub code: StatusCode,
    /// Decoded `grpc-message`; empty when the trailer carries none.
    pub details: String,
    /// Every trailer header as received, the status headers included.
    pub metadata: TrailerMap,
}

impl Status {
    /// Build a status from a parsed trailer block.
    pub fn from_trailers(metadata: TrailerMap) -> Self {
        let code = metadata
            .get("grpc-status")
            .map(|v| StatusCode::from_wire(v))
            .unwrap_or(StatusCode::Ok);
        let details = metadata.get("grpc-message").cloned().unwrap_or_default();
        Self {
            code,
            details,
            metadata,
        }
    }
}
