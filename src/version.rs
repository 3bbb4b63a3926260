//! Library metadata: the magic number and version constants baked into the
//! 7-byte stream header.

/// The 4-byte magic number identifying serdelite binary streams.
///
/// FourCC for `"SDLV"`. Acts as a signature at the start of every framed
/// stream; see [`ByteStream::write_library_header`](crate::ByteStream::write_library_header).
pub const MAGIC: u32 = 0x5344_4C56;

/// Major version. Incremented for incompatible wire-format changes; streams
/// with a differing major are rejected by header verification.
pub const VERSION_MAJOR: u8 = 1;

/// Minor version. Backward-compatible additions; tolerated by verification.
pub const VERSION_MINOR: u8 = 1;

/// Patch version. Bug fixes only; tolerated by verification.
pub const VERSION_PATCH: u8 = 0;

/// The complete semantic version string.
#[must_use]
pub const fn version() -> &'static str {
    "1.1.0"
}
