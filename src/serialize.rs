//! Capability traits user types implement to participate in stream
//! serialization, plus the primitive impls that make hand-written and
//! derived implementations compose.
//!
//! The binary format is strictly positional: [`ByteEncode::encode`] writes
//! fields in a fixed, self-chosen order and [`ByteDecode::decode`] must
//! replay exactly that order. There are no wire tags to catch a mismatch —
//! only the outer library header check and whatever application-level type
//! tag the caller adds around the object.

use crate::binary::ByteStream;
use crate::json::JsonStream;
use crate::StreamError;

/// Binary serialization capability: write your fields into a [`ByteStream`]
/// in a fixed order.
pub trait ByteEncode {
    /// Write this object's fields into the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if any field write fails; implementations should
    /// propagate the first failure and write nothing further.
    fn encode(&self, stream: &mut ByteStream<'_, '_>) -> Result<(), StreamError>;

    /// Total number of bytes [`encode`](Self::encode) will append.
    ///
    /// Advisory only: the stream never consults it before writing. It
    /// exists so callers can size buffers up front; enforcing it here would
    /// change failure behavior for existing callers.
    fn byte_size(&self) -> usize;
}

/// Binary deserialization capability: read your fields from a
/// [`ByteStream`] in the same order [`ByteEncode::encode`] wrote them.
pub trait ByteDecode: Sized {
    /// Reconstruct a value from the stream at its read cursor.
    ///
    /// # Errors
    ///
    /// Returns an error if any field read fails.
    fn decode(stream: &mut ByteStream<'_, '_>) -> Result<Self, StreamError>;
}

/// JSON serialization capability: write your fields as key/value pairs into
/// a [`JsonStream`].
pub trait JsonEncode {
    /// Write this object's fields as key/value pairs. Do not close the
    /// object here; [`to_json`](Self::to_json) and
    /// [`JsonStream::write_object`] handle the closing brace.
    ///
    /// # Errors
    ///
    /// Returns an error if any field write fails.
    fn json_fields(&self, stream: &mut JsonStream<'_, '_>) -> Result<(), StreamError>;

    /// Entry point producing the final object: writes the fields, then
    /// closes the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if a field write or the close fails.
    fn to_json(&self, stream: &mut JsonStream<'_, '_>) -> Result<(), StreamError> {
        self.json_fields(stream)?;
        stream.close()
    }
}

/// A value that can appear on the right-hand side of a JSON field.
///
/// Implemented for the primitive scalars, `&str`, and (via the derive) any
/// [`JsonEncode`] type, which nests as a sub-object. This is what lets the
/// `JsonEncode` derive emit one uniform call per field.
pub trait JsonField {
    /// Write `"key":<self>` into the stream, including the leading comma
    /// when needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream is closed or the buffer fills up.
    fn write_field(&self, key: &str, stream: &mut JsonStream<'_, '_>) -> Result<(), StreamError>;
}

macro_rules! impl_byte_scalar {
    ($($ty:ty => $write:ident, $read:ident;)*) => {
        $(
            impl ByteEncode for $ty {
                #[inline]
                fn encode(&self, stream: &mut ByteStream<'_, '_>) -> Result<(), StreamError> {
                    stream.$write(*self)
                }

                #[inline]
                fn byte_size(&self) -> usize {
                    core::mem::size_of::<$ty>()
                }
            }

            impl ByteDecode for $ty {
                #[inline]
                fn decode(stream: &mut ByteStream<'_, '_>) -> Result<Self, StreamError> {
                    stream.$read()
                }
            }
        )*
    };
}

impl_byte_scalar! {
    u8  => write_u8,  read_u8;
    u16 => write_u16, read_u16;
    u32 => write_u32, read_u32;
    u64 => write_u64, read_u64;
    i8  => write_i8,  read_i8;
    i16 => write_i16, read_i16;
    i32 => write_i32, read_i32;
    i64 => write_i64, read_i64;
    f32 => write_f32, read_f32;
    f64 => write_f64, read_f64;
    bool => write_bool, read_bool;
}

impl<const N: usize> ByteEncode for [u8; N] {
    #[inline]
    fn encode(&self, stream: &mut ByteStream<'_, '_>) -> Result<(), StreamError> {
        stream.write_chars(self)
    }

    #[inline]
    fn byte_size(&self) -> usize {
        N
    }
}

impl<const N: usize> ByteDecode for [u8; N] {
    #[inline]
    fn decode(stream: &mut ByteStream<'_, '_>) -> Result<Self, StreamError> {
        let mut out = [0u8; N];
        stream.read_chars(&mut out)?;
        Ok(out)
    }
}

impl ByteEncode for str {
    #[inline]
    fn encode(&self, stream: &mut ByteStream<'_, '_>) -> Result<(), StreamError> {
        stream.write_string(self)
    }

    /// Length prefix plus the raw bytes.
    #[inline]
    fn byte_size(&self) -> usize {
        2 + self.len()
    }
}

macro_rules! impl_json_scalar {
    ($($ty:ty => $write:ident;)*) => {
        $(
            impl JsonField for $ty {
                #[inline]
                fn write_field(
                    &self,
                    key: &str,
                    stream: &mut JsonStream<'_, '_>,
                ) -> Result<(), StreamError> {
                    stream.$write(key, *self)
                }
            }
        )*
    };
}

impl_json_scalar! {
    u8  => write_u8;
    u16 => write_u16;
    u32 => write_u32;
    u64 => write_u64;
    i8  => write_i8;
    i16 => write_i16;
    i32 => write_i32;
    i64 => write_i64;
    f32 => write_f32;
    f64 => write_f64;
    bool => write_bool;
}

impl JsonField for str {
    #[inline]
    fn write_field(&self, key: &str, stream: &mut JsonStream<'_, '_>) -> Result<(), StreamError> {
        stream.write_string(key, self)
    }
}

impl JsonField for &str {
    #[inline]
    fn write_field(&self, key: &str, stream: &mut JsonStream<'_, '_>) -> Result<(), StreamError> {
        stream.write_string(key, self)
    }
}
