//! # serdelite
//!
//! Allocation-free dual-mode serialization over caller-owned buffers: a
//! bounds-checked binary codec and a JSON text builder sharing one memory
//! abstraction.
//!
//! ## Design principles
//!
//! - **The caller owns the memory.**
//!   Every byte lives in a fixed-capacity buffer the caller provides;
//!   [`ByteBuffer`] is a borrowed view that can never grow past it. The
//!   core performs no heap allocation anywhere.
//! - **The wire format is positional.**
//!   Binary streams carry no schema tags: field identity is the agreed
//!   call order between writer and reader. This is a deliberate
//!   compactness trade-off — mismatched schemas are undetectable beyond
//!   the optional library header, so implementers of [`ByteEncode`] /
//!   [`ByteDecode`] must keep both sides in lockstep.
//! - **Failures are local and leave nothing behind.**
//!   Every operation pre-checks capacity and reports failure as a
//!   [`StreamError`]; composite writes snapshot the buffer length and roll
//!   back, so a `false` outcome means "nothing observable changed" (one
//!   documented exception: [`ByteStream::read_string`]).
//!
//! ## The two modes
//!
//! - [`ByteStream`]: endian-configurable binary reader/writer with a
//!   7-byte magic + version header for stream sniffing.
//! - [`JsonStream`]: compact JSON object builder with escaping and a
//!   comma/closing-brace state machine; [`JsonText::pretty`] reflows the
//!   result with indentation.
//!
//! ## Feature flags
//!
//! - `std` *(default)*: implements `std::error::Error` for [`StreamError`].
//! - `derive` *(default)*: re-exports the [`ByteEncode`], [`ByteDecode`]
//!   and [`JsonEncode`] derive macros.
//!
//! ## `no_std`
//!
//! The crate is `no_std` compatible with no `alloc` requirement; disable
//! default features and keep `derive` as needed.

#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap
)]

mod binary;
mod buffer;
mod error;
mod json;
mod pretty;
mod serialize;
pub mod version;

pub use crate::binary::ByteStream;
pub use crate::buffer::{ByteBuffer, Endian, HexDump};
pub use crate::error::{ErrorCode, StreamError};
pub use crate::json::JsonStream;
pub use crate::pretty::{JsonText, PrettyJson};
pub use crate::serialize::{ByteDecode, ByteEncode, JsonEncode, JsonField};
pub use crate::version::{version, MAGIC, VERSION_MAJOR, VERSION_MINOR, VERSION_PATCH};

#[cfg(feature = "derive")]
pub use serdelite_derive::{ByteDecode, ByteEncode, JsonEncode};
