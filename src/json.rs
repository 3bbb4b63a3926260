use core::fmt;
use core::fmt::Write as _;

use crate::binary::sign_extend;
use crate::buffer::ByteBuffer;
use crate::pretty::JsonText;
use crate::serialize::JsonEncode;
use crate::{ErrorCode, StreamError};

/// Key/value JSON text emitter writing directly into a [`ByteBuffer`].
///
/// The opening brace is appended at construction. Two flags drive the comma
/// and closing-brace discipline: `first_field` decides whether a field
/// write emits a leading comma, and `closed` makes the stream terminal —
/// once [`close`](Self::close) has appended the final `}`, every further
/// field or nested-object write fails with `StreamClosed`.
///
/// Field keys are written verbatim and trusted; values are escaped per the
/// JSON string rules. String bytes pass through without UTF-8 validation.
///
/// Every field write is all-or-nothing: on any failure the buffer length
/// and the comma state are rolled back to their pre-call values.
pub struct JsonStream<'a, 'b> {
    buf: &'b mut ByteBuffer<'a>,
    first_field: bool,
    closed: bool,
}

impl<'a, 'b> JsonStream<'a, 'b> {
    /// Attach a stream to a buffer and append the opening brace.
    ///
    /// # Errors
    ///
    /// Returns `CapacityExceeded` if the buffer cannot hold even the brace.
    pub fn new(buf: &'b mut ByteBuffer<'a>) -> Result<Self, StreamError> {
        buf.push(b'{')?;
        Ok(Self {
            buf,
            first_field: true,
            closed: false,
        })
    }

    /// Write an unsigned 8-bit field as a decimal number.
    ///
    /// # Errors
    ///
    /// Returns `StreamClosed` after [`close`](Self::close), or
    /// `CapacityExceeded` if the field does not fit.
    pub fn write_u8(&mut self, key: &str, val: u8) -> Result<(), StreamError> {
        self.write_int_bits(key, u64::from(val), 8, false)
    }

    /// Write an unsigned 16-bit field as a decimal number.
    ///
    /// # Errors
    ///
    /// Returns `StreamClosed` after [`close`](Self::close), or
    /// `CapacityExceeded` if the field does not fit.
    pub fn write_u16(&mut self, key: &str, val: u16) -> Result<(), StreamError> {
        self.write_int_bits(key, u64::from(val), 16, false)
    }

    /// Write an unsigned 32-bit field as a decimal number.
    ///
    /// # Errors
    ///
    /// Returns `StreamClosed` after [`close`](Self::close), or
    /// `CapacityExceeded` if the field does not fit.
    pub fn write_u32(&mut self, key: &str, val: u32) -> Result<(), StreamError> {
        self.write_int_bits(key, u64::from(val), 32, false)
    }

    /// Write an unsigned 64-bit field as a decimal number.
    ///
    /// # Errors
    ///
    /// Returns `StreamClosed` after [`close`](Self::close), or
    /// `CapacityExceeded` if the field does not fit.
    pub fn write_u64(&mut self, key: &str, val: u64) -> Result<(), StreamError> {
        self.write_int_bits(key, val, 64, false)
    }

    /// Write a signed 8-bit field as a decimal number.
    ///
    /// # Errors
    ///
    /// Returns `StreamClosed` after [`close`](Self::close), or
    /// `CapacityExceeded` if the field does not fit.
    pub fn write_i8(&mut self, key: &str, val: i8) -> Result<(), StreamError> {
        self.write_int_bits(key, u64::from(val as u8), 8, true)
    }

    /// Write a signed 16-bit field as a decimal number.
    ///
    /// # Errors
    ///
    /// Returns `StreamClosed` after [`close`](Self::close), or
    /// `CapacityExceeded` if the field does not fit.
    pub fn write_i16(&mut self, key: &str, val: i16) -> Result<(), StreamError> {
        self.write_int_bits(key, u64::from(val as u16), 16, true)
    }

    /// Write a signed 32-bit field as a decimal number.
    ///
    /// # Errors
    ///
    /// Returns `StreamClosed` after [`close`](Self::close), or
    /// `CapacityExceeded` if the field does not fit.
    pub fn write_i32(&mut self, key: &str, val: i32) -> Result<(), StreamError> {
        self.write_int_bits(key, u64::from(val as u32), 32, true)
    }

    /// Write a signed 64-bit field as a decimal number.
    ///
    /// # Errors
    ///
    /// Returns `StreamClosed` after [`close`](Self::close), or
    /// `CapacityExceeded` if the field does not fit.
    pub fn write_i64(&mut self, key: &str, val: i64) -> Result<(), StreamError> {
        self.write_int_bits(key, val as u64, 64, true)
    }

    /// Write an `f32` field. Finite values are formatted with round-trip
    /// precision; infinities and NaN become the literal `null`, never an
    /// invalid JSON token.
    ///
    /// # Errors
    ///
    /// Returns `StreamClosed` after [`close`](Self::close), or
    /// `CapacityExceeded` if the field does not fit.
    pub fn write_f32(&mut self, key: &str, val: f32) -> Result<(), StreamError> {
        self.write_field_with(key, |s| {
            if !val.is_finite() {
                return s.write_raw(b"null");
            }
            let mut num = FmtBuf::<40>::new();
            write!(num, "{val}").map_err(|_| s.capacity_error())?;
            s.write_raw(num.as_bytes())
        })
    }

    /// Write an `f64` field. Finite values are formatted with round-trip
    /// precision; infinities and NaN become the literal `null`.
    ///
    /// # Errors
    ///
    /// Returns `StreamClosed` after [`close`](Self::close), or
    /// `CapacityExceeded` if the field does not fit.
    pub fn write_f64(&mut self, key: &str, val: f64) -> Result<(), StreamError> {
        self.write_field_with(key, |s| {
            if !val.is_finite() {
                return s.write_raw(b"null");
            }
            let mut num = FmtBuf::<40>::new();
            write!(num, "{val}").map_err(|_| s.capacity_error())?;
            s.write_raw(num.as_bytes())
        })
    }

    /// Write a boolean field as the literal `true` or `false`.
    ///
    /// # Errors
    ///
    /// Returns `StreamClosed` after [`close`](Self::close), or
    /// `CapacityExceeded` if the field does not fit.
    pub fn write_bool(&mut self, key: &str, val: bool) -> Result<(), StreamError> {
        self.write_field_with(key, |s| {
            let literal: &[u8] = if val { b"true" } else { b"false" };
            s.write_raw(literal)
        })
    }

    /// Write a double-quoted, escaped string field.
    ///
    /// Quote, backslash, newline, tab, carriage return, backspace and form
    /// feed map to their two-character escapes; any other control byte
    /// below 0x20 becomes `\u00XX`; everything else passes through
    /// unescaped.
    ///
    /// # Errors
    ///
    /// Returns `StreamClosed` after [`close`](Self::close), or
    /// `CapacityExceeded` if the field does not fit.
    pub fn write_string(&mut self, key: &str, val: &str) -> Result<(), StreamError> {
        self.write_field_with(key, |s| {
            s.buf.push(b'"')?;
            s.write_escaped(val.as_bytes())?;
            s.buf.push(b'"')
        })
    }

    /// Write a nested object field by delegating to the object's own
    /// field-writing routine.
    ///
    /// The stream's comma/close state is saved, reset to the fresh-object
    /// state for the nested fields, and restored afterwards, so the
    /// parent's subsequent fields continue with correct comma placement.
    /// On any failure the buffer is rolled back to its pre-call length and
    /// the parent state restored; no partial nested object stays visible.
    ///
    /// # Errors
    ///
    /// Returns `StreamClosed` after [`close`](Self::close), or any failure
    /// propagated from the nested object's writes.
    pub fn write_object<T: JsonEncode + ?Sized>(
        &mut self,
        key: &str,
        obj: &T,
    ) -> Result<(), StreamError> {
        if self.closed {
            return Err(StreamError::new(ErrorCode::StreamClosed, self.buf.len()));
        }

        let start_len = self.buf.len();
        let parent_first = self.first_field;

        let result = (|| {
            self.start_field(key)?;
            self.buf.push(b'{')?;
            self.first_field = true;
            // The nested to_json ends with the shared close step, which
            // appends the child's closing brace and marks us closed.
            obj.to_json(self)
        })();

        if result.is_ok() {
            self.first_field = false;
            self.closed = false;
        } else {
            self.buf.truncate(start_len);
            self.first_field = parent_first;
            self.closed = false;
        }
        result
    }

    /// Append the final closing brace and mark the stream terminal.
    /// Idempotent: calling it again is a no-op success.
    ///
    /// # Errors
    ///
    /// Returns `CapacityExceeded` if the brace does not fit; the stream
    /// stays open so the caller can retry after making room.
    pub fn close(&mut self) -> Result<(), StreamError> {
        if self.closed {
            return Ok(());
        }
        self.buf.push(b'}')?;
        self.closed = true;
        Ok(())
    }

    /// Close the object if still open and return the finished text view.
    ///
    /// # Errors
    ///
    /// Returns `CapacityExceeded` if the closing brace does not fit.
    pub fn finish(mut self) -> Result<JsonText<'b>, StreamError> {
        self.close()?;
        let buf: &'b ByteBuffer<'a> = self.buf;
        let text = core::str::from_utf8(buf.as_bytes())
            .map_err(|e| StreamError::new(ErrorCode::InvalidUtf8, e.valid_up_to()))?;
        Ok(JsonText::new(text))
    }

    /// Returns `true` if `count` bytes fit in the remaining capacity.
    ///
    /// Useful to pre-check a field write whose rendered size the caller
    /// knows; the write itself still re-checks and rolls back.
    #[inline]
    #[must_use]
    pub fn can_write(&self, count: usize) -> bool {
        self.buf.remaining() >= count
    }

    /// Borrow the underlying buffer for inspection.
    #[must_use]
    pub fn buffer(&self) -> &ByteBuffer<'a> {
        self.buf
    }

    /// Shared skeleton for every scalar field write: closed check, comma +
    /// `"key":` prefix, value emission, rollback of both the bytes and the
    /// comma state on failure.
    fn write_field_with<F>(&mut self, key: &str, emit: F) -> Result<(), StreamError>
    where
        F: FnOnce(&mut Self) -> Result<(), StreamError>,
    {
        if self.closed {
            return Err(StreamError::new(ErrorCode::StreamClosed, self.buf.len()));
        }

        let start_len = self.buf.len();
        let was_first = self.first_field;

        let result = (|| {
            self.start_field(key)?;
            emit(self)
        })();

        if result.is_err() {
            self.buf.truncate(start_len);
            self.first_field = was_first;
        }
        result
    }

    fn write_int_bits(
        &mut self,
        key: &str,
        val: u64,
        bit_size: u8,
        signed: bool,
    ) -> Result<(), StreamError> {
        self.write_field_with(key, |s| {
            let mut num = FmtBuf::<24>::new();
            if signed {
                let sval = sign_extend(val, bit_size);
                write!(num, "{sval}").map_err(|_| s.capacity_error())?;
            } else {
                write!(num, "{val}").map_err(|_| s.capacity_error())?;
            }
            s.write_raw(num.as_bytes())
        })
    }

    /// Emit the separator comma (unless this is the first field) and the
    /// `"key":` prefix. Keys are trusted and written unescaped.
    fn start_field(&mut self, key: &str) -> Result<(), StreamError> {
        if !self.first_field {
            self.buf.push(b',')?;
        }
        self.first_field = false;

        self.buf.push(b'"')?;
        self.write_raw(key.as_bytes())?;
        self.write_raw(b"\":")
    }

    fn write_raw(&mut self, bytes: &[u8]) -> Result<(), StreamError> {
        if self.buf.remaining() < bytes.len() {
            return Err(self.capacity_error());
        }
        for &byte in bytes {
            self.buf.push(byte)?;
        }
        Ok(())
    }

    fn write_escaped(&mut self, bytes: &[u8]) -> Result<(), StreamError> {
        const HEX: &[u8; 16] = b"0123456789ABCDEF";
        for &byte in bytes {
            match byte {
                b'"' => self.write_raw(b"\\\"")?,
                b'\\' => self.write_raw(b"\\\\")?,
                b'\n' => self.write_raw(b"\\n")?,
                b'\t' => self.write_raw(b"\\t")?,
                b'\r' => self.write_raw(b"\\r")?,
                0x08 => self.write_raw(b"\\b")?,
                0x0c => self.write_raw(b"\\f")?,
                b if b < 0x20 => {
                    let esc = [
                        b'\\',
                        b'u',
                        b'0',
                        b'0',
                        HEX[usize::from(b >> 4)],
                        HEX[usize::from(b & 0x0f)],
                    ];
                    self.write_raw(&esc)?;
                }
                b => self.buf.push(b)?,
            }
        }
        Ok(())
    }

    fn capacity_error(&self) -> StreamError {
        StreamError::new(ErrorCode::CapacityExceeded, self.buf.len())
    }
}

impl fmt::Debug for JsonStream<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonStream")
            .field("len", &self.buf.len())
            .field("first_field", &self.first_field)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

/// Fixed-capacity `core::fmt::Write` sink for number formatting without
/// allocation.
struct FmtBuf<const N: usize> {
    buf: [u8; N],
    len: usize,
}

impl<const N: usize> FmtBuf<N> {
    const fn new() -> Self {
        Self {
            buf: [0; N],
            len: 0,
        }
    }

    fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

impl<const N: usize> core::fmt::Write for FmtBuf<N> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        let bytes = s.as_bytes();
        if self.len + bytes.len() > N {
            return Err(core::fmt::Error);
        }
        self.buf[self.len..self.len + bytes.len()].copy_from_slice(bytes);
        self.len += bytes.len();
        Ok(())
    }
}
