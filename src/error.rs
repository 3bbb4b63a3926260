use core::fmt;

/// A structured code identifying why a stream operation was rejected.
///
/// Codes carry no message text, so errors stay `Copy` and cost nothing to
/// construct on `no_std` targets; `Display` on [`StreamError`] maps each
/// code to a fixed description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorCode {
    /// A write would exceed the buffer capacity.
    CapacityExceeded,
    /// A read would consume bytes beyond the written length.
    Underflow,
    /// A caller-provided destination buffer is too small.
    InvalidDestination,

    /// The stream does not start with the serdelite magic number.
    BadMagic,
    /// The stream was written by an incompatible major version.
    VersionIncompatible,

    /// A hex string contains an odd-length or non-hex-digit run.
    MalformedHex,
    /// Decoded string bytes are not valid UTF-8.
    InvalidUtf8,

    /// A JSON write was attempted after `close()`.
    StreamClosed,
    /// A string exceeds the 16-bit length prefix.
    StringTooLong,

    /// A bit width outside 8..=64 or not a multiple of 8 was requested.
    UnsupportedWidth,
}

/// A serdelite error with a stable code and the byte offset where it was detected.
///
/// Write failures report the buffer length at the time of the call; read
/// failures report the read cursor. Every failing operation leaves the
/// buffer and cursors exactly as they were before the call, except for the
/// documented [`ByteStream::read_string`](crate::ByteStream::read_string)
/// length-prefix asymmetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamError {
    /// The error code.
    pub code: ErrorCode,
    /// Byte offset into the buffer where the error was detected.
    pub offset: usize,
}

impl StreamError {
    /// Construct an error at `offset`.
    #[inline]
    #[must_use]
    pub const fn new(code: ErrorCode, offset: usize) -> Self {
        Self { code, offset }
    }

    /// Returns true iff this error means the caller-owned buffer is exhausted.
    #[inline]
    #[must_use]
    pub const fn is_capacity(self) -> bool {
        matches!(self.code, ErrorCode::CapacityExceeded)
    }
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self.code {
            ErrorCode::CapacityExceeded => "write exceeds buffer capacity",
            ErrorCode::Underflow => "read past written length",
            ErrorCode::InvalidDestination => "destination buffer too small",

            ErrorCode::BadMagic => "missing serdelite magic number",
            ErrorCode::VersionIncompatible => "incompatible major version",

            ErrorCode::MalformedHex => "malformed hex digit pair",
            ErrorCode::InvalidUtf8 => "string bytes are not valid UTF-8",

            ErrorCode::StreamClosed => "json stream already closed",
            ErrorCode::StringTooLong => "string exceeds u16 length prefix",

            ErrorCode::UnsupportedWidth => "bit width must be 8, 16, 32 or 64",
        };
        write!(f, "serdelite stream failed at {}: {msg}", self.offset)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for StreamError {}
