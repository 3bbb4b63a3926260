use crate::buffer::{ByteBuffer, Endian};
use crate::serialize::{ByteDecode, ByteEncode};
use crate::version::{MAGIC, VERSION_MAJOR, VERSION_MINOR, VERSION_PATCH};
use crate::{ErrorCode, StreamError};

/// Reconstruct a signed value from a narrower unsigned bit pattern.
///
/// If the top bit of the declared width is set, all higher bits are forced
/// to 1 (two's-complement sign extension), independent of the native width
/// of the destination.
pub(crate) const fn sign_extend(num: u64, bit_size: u8) -> i64 {
    if bit_size == 0 || bit_size >= 64 {
        return num as i64;
    }
    let sign_bit = 1u64 << (bit_size - 1);
    if num & sign_bit != 0 {
        (num | !((1u64 << bit_size) - 1)) as i64
    } else {
        num as i64
    }
}

/// Cursor-based binary reader/writer over a [`ByteBuffer`].
///
/// Writes always append, so the buffer's written length doubles as the
/// write cursor; reads consume from an independent `read_pos` that never
/// passes the written length. Every multi-byte value goes through a single
/// bit-packing routine that iterates byte-by-byte in the buffer's
/// [`Endian`] order, so the wire format is independent of the host
/// architecture by construction.
///
/// The binary format is strictly positional: there are no type or length
/// tags around fields or nested objects. Field identity is the agreed call
/// order between writer and reader; see [`ByteEncode`] for the contract
/// user types implement.
///
/// Every failing operation is a no-op — no partial byte is appended or
/// consumed — except the documented [`read_string`](Self::read_string)
/// length-prefix asymmetry. Composite writes snapshot the buffer length
/// and roll back on any sub-step failure.
pub struct ByteStream<'a, 'b> {
    buf: &'b mut ByteBuffer<'a>,
    read_pos: usize,
}

impl<'a, 'b> ByteStream<'a, 'b> {
    /// Attach a stream to a buffer. The read cursor starts at 0; the write
    /// cursor is wherever the buffer's written length already is.
    pub fn new(buf: &'b mut ByteBuffer<'a>) -> Self {
        Self { buf, read_pos: 0 }
    }

    /// Borrow the underlying buffer for inspection.
    #[must_use]
    pub fn buffer(&self) -> &ByteBuffer<'a> {
        self.buf
    }

    /// Current read cursor position.
    #[inline]
    #[must_use]
    pub const fn read_position(&self) -> usize {
        self.read_pos
    }

    /// Rewind the read cursor to the start of the buffer.
    pub fn reset_read_cursor(&mut self) {
        self.read_pos = 0;
    }

    /// Returns `true` if `count` bytes can be read without passing the
    /// written length.
    #[inline]
    #[must_use]
    pub fn can_read(&self, count: usize) -> bool {
        self.read_pos + count <= self.buf.len()
    }

    /// Returns `true` if `count` bytes fit in the remaining capacity.
    #[inline]
    #[must_use]
    pub fn can_write(&self, count: usize) -> bool {
        self.buf.remaining() >= count
    }

    /// Append the 7-byte library header: the 4-byte magic number followed
    /// by the major, minor and patch version bytes.
    ///
    /// # Errors
    ///
    /// Returns `CapacityExceeded` if fewer than 7 bytes remain; nothing is
    /// written on failure.
    pub fn write_library_header(&mut self) -> Result<(), StreamError> {
        if !self.can_write(7) {
            return Err(StreamError::new(ErrorCode::CapacityExceeded, self.buf.len()));
        }
        self.write_u32(MAGIC)?;
        self.write_u8(VERSION_MAJOR)?;
        self.write_u8(VERSION_MINOR)?;
        self.write_u8(VERSION_PATCH)
    }

    /// Consume and verify the 7-byte library header at the read cursor.
    ///
    /// Minor and patch differences are tolerated; only the magic number and
    /// the major version must match. On any failure the read cursor is
    /// restored to its pre-call position.
    ///
    /// # Errors
    ///
    /// `Underflow` if fewer than 7 bytes are available, `BadMagic` if the
    /// magic number does not match, `VersionIncompatible` if the stream's
    /// major version differs from [`VERSION_MAJOR`].
    pub fn verify_library_header(&mut self) -> Result<(), StreamError> {
        let start_pos = self.read_pos;
        if !self.can_read(7) {
            return Err(StreamError::new(ErrorCode::Underflow, start_pos));
        }

        let result = (|| {
            let magic = self.read_u32()?;
            if magic != MAGIC {
                return Err(StreamError::new(ErrorCode::BadMagic, start_pos));
            }
            let major = self.read_u8()?;
            let _minor = self.read_u8()?;
            let _patch = self.read_u8()?;
            if major != VERSION_MAJOR {
                return Err(StreamError::new(ErrorCode::VersionIncompatible, start_pos));
            }
            Ok(())
        })();

        if result.is_err() {
            self.read_pos = start_pos;
        }
        result
    }

    /// Read a `u32` at the read cursor without consuming it.
    ///
    /// # Errors
    ///
    /// Returns `Underflow` if fewer than 4 bytes are available.
    pub fn peek_u32(&self) -> Result<u32, StreamError> {
        self.read_bits_at(self.read_pos, 32).map(|v| v as u32)
    }

    /// Sniff whether the bytes at the read cursor start with the serdelite
    /// magic number, without moving any cursor.
    #[must_use]
    pub fn is_serdelite_stream(&self) -> bool {
        matches!(self.peek_u32(), Ok(magic) if magic == MAGIC)
    }

    /// Delegate to the object's own field-writing routine.
    ///
    /// No tag or length is emitted around the object: the format stays
    /// strictly positional, and the reader must replay the same order.
    ///
    /// # Errors
    ///
    /// Propagates any failure from the object's encode routine.
    pub fn write_object<T: ByteEncode + ?Sized>(&mut self, obj: &T) -> Result<(), StreamError> {
        obj.encode(self)
    }

    /// Delegate to the type's own field-reading routine, mirroring
    /// [`write_object`](Self::write_object).
    ///
    /// # Errors
    ///
    /// Propagates any failure from the type's decode routine.
    pub fn read_object<T: ByteDecode>(&mut self) -> Result<T, StreamError> {
        T::decode(self)
    }

    /// Write a `u8`.
    ///
    /// # Errors
    ///
    /// Returns `CapacityExceeded` if the buffer is full.
    pub fn write_u8(&mut self, val: u8) -> Result<(), StreamError> {
        self.write_bits(u64::from(val), 8)
    }

    /// Write a `u16` in the buffer's endian order.
    ///
    /// # Errors
    ///
    /// Returns `CapacityExceeded` if 2 bytes do not fit.
    pub fn write_u16(&mut self, val: u16) -> Result<(), StreamError> {
        self.write_bits(u64::from(val), 16)
    }

    /// Write a `u32` in the buffer's endian order.
    ///
    /// # Errors
    ///
    /// Returns `CapacityExceeded` if 4 bytes do not fit.
    pub fn write_u32(&mut self, val: u32) -> Result<(), StreamError> {
        self.write_bits(u64::from(val), 32)
    }

    /// Write a `u64` in the buffer's endian order.
    ///
    /// # Errors
    ///
    /// Returns `CapacityExceeded` if 8 bytes do not fit.
    pub fn write_u64(&mut self, val: u64) -> Result<(), StreamError> {
        self.write_bits(val, 64)
    }

    /// Write an `i8` as its two's-complement bit pattern.
    ///
    /// # Errors
    ///
    /// Returns `CapacityExceeded` if the buffer is full.
    pub fn write_i8(&mut self, val: i8) -> Result<(), StreamError> {
        self.write_bits(u64::from(val as u8), 8)
    }

    /// Write an `i16` as its two's-complement bit pattern.
    ///
    /// # Errors
    ///
    /// Returns `CapacityExceeded` if 2 bytes do not fit.
    pub fn write_i16(&mut self, val: i16) -> Result<(), StreamError> {
        self.write_bits(u64::from(val as u16), 16)
    }

    /// Write an `i32` as its two's-complement bit pattern.
    ///
    /// # Errors
    ///
    /// Returns `CapacityExceeded` if 4 bytes do not fit.
    pub fn write_i32(&mut self, val: i32) -> Result<(), StreamError> {
        self.write_bits(u64::from(val as u32), 32)
    }

    /// Write an `i64` as its two's-complement bit pattern.
    ///
    /// # Errors
    ///
    /// Returns `CapacityExceeded` if 8 bytes do not fit.
    pub fn write_i64(&mut self, val: i64) -> Result<(), StreamError> {
        self.write_bits(val as u64, 64)
    }

    /// Write an `f32` by routing its IEEE-754 bit pattern through the
    /// integer codec, so the bit layout plus the buffer's endian order
    /// fully determine the wire bytes.
    ///
    /// # Errors
    ///
    /// Returns `CapacityExceeded` if 4 bytes do not fit.
    pub fn write_f32(&mut self, val: f32) -> Result<(), StreamError> {
        self.write_bits(u64::from(val.to_bits()), 32)
    }

    /// Write an `f64` by routing its IEEE-754 bit pattern through the
    /// integer codec.
    ///
    /// # Errors
    ///
    /// Returns `CapacityExceeded` if 8 bytes do not fit.
    pub fn write_f64(&mut self, val: f64) -> Result<(), StreamError> {
        self.write_bits(val.to_bits(), 64)
    }

    /// Write a bool as a single byte, 1 for true and 0 for false.
    ///
    /// # Errors
    ///
    /// Returns `CapacityExceeded` if the buffer is full.
    pub fn write_bool(&mut self, val: bool) -> Result<(), StreamError> {
        self.write_u8(u8::from(val))
    }

    /// Write a fixed run of raw bytes with no framing. Used for sub-fields
    /// whose length is known externally; pair with
    /// [`read_chars`](Self::read_chars).
    ///
    /// # Errors
    ///
    /// Returns `CapacityExceeded` if the run does not fit; nothing is
    /// written on failure.
    pub fn write_chars(&mut self, chars: &[u8]) -> Result<(), StreamError> {
        if !self.can_write(chars.len()) {
            return Err(StreamError::new(ErrorCode::CapacityExceeded, self.buf.len()));
        }
        for &byte in chars {
            self.buf.push(byte)?;
        }
        Ok(())
    }

    /// Write a length-prefixed string: a `u16` length in the buffer's
    /// endian order followed by the raw bytes, no terminator.
    ///
    /// # Errors
    ///
    /// `StringTooLong` if the string exceeds 65535 bytes,
    /// `CapacityExceeded` if prefix plus bytes do not fit. Either way
    /// nothing is written: the two-step write snapshots the buffer length
    /// and rolls back on any sub-step failure.
    pub fn write_string(&mut self, s: &str) -> Result<(), StreamError> {
        let bytes = s.as_bytes();
        let Ok(len) = u16::try_from(bytes.len()) else {
            return Err(StreamError::new(ErrorCode::StringTooLong, self.buf.len()));
        };
        if !self.can_write(2 + bytes.len()) {
            return Err(StreamError::new(ErrorCode::CapacityExceeded, self.buf.len()));
        }

        let start_len = self.buf.len();
        let result = self
            .write_u16(len)
            .and_then(|()| self.write_chars(bytes));
        if result.is_err() {
            // Snapshot rollback keeps the write all-or-nothing.
            self.buf.truncate(start_len);
        }
        result
    }

    /// Read a `u8`.
    ///
    /// # Errors
    ///
    /// Returns `Underflow` if no byte is available; the cursor is unchanged.
    pub fn read_u8(&mut self) -> Result<u8, StreamError> {
        self.read_bits(8).map(|v| v as u8)
    }

    /// Read a `u16` in the buffer's endian order.
    ///
    /// # Errors
    ///
    /// Returns `Underflow` if fewer than 2 bytes remain; the cursor is unchanged.
    pub fn read_u16(&mut self) -> Result<u16, StreamError> {
        self.read_bits(16).map(|v| v as u16)
    }

    /// Read a `u32` in the buffer's endian order.
    ///
    /// # Errors
    ///
    /// Returns `Underflow` if fewer than 4 bytes remain; the cursor is unchanged.
    pub fn read_u32(&mut self) -> Result<u32, StreamError> {
        self.read_bits(32).map(|v| v as u32)
    }

    /// Read a `u64` in the buffer's endian order.
    ///
    /// # Errors
    ///
    /// Returns `Underflow` if fewer than 8 bytes remain; the cursor is unchanged.
    pub fn read_u64(&mut self) -> Result<u64, StreamError> {
        self.read_bits(64)
    }

    /// Read an `i8` by sign-extending the 8-bit pattern.
    ///
    /// # Errors
    ///
    /// Returns `Underflow` if no byte is available; the cursor is unchanged.
    pub fn read_i8(&mut self) -> Result<i8, StreamError> {
        self.read_bits(8).map(|v| sign_extend(v, 8) as i8)
    }

    /// Read an `i16` by sign-extending the 16-bit pattern.
    ///
    /// # Errors
    ///
    /// Returns `Underflow` if fewer than 2 bytes remain; the cursor is unchanged.
    pub fn read_i16(&mut self) -> Result<i16, StreamError> {
        self.read_bits(16).map(|v| sign_extend(v, 16) as i16)
    }

    /// Read an `i32` by sign-extending the 32-bit pattern.
    ///
    /// # Errors
    ///
    /// Returns `Underflow` if fewer than 4 bytes remain; the cursor is unchanged.
    pub fn read_i32(&mut self) -> Result<i32, StreamError> {
        self.read_bits(32).map(|v| sign_extend(v, 32) as i32)
    }

    /// Read an `i64`.
    ///
    /// # Errors
    ///
    /// Returns `Underflow` if fewer than 8 bytes remain; the cursor is unchanged.
    pub fn read_i64(&mut self) -> Result<i64, StreamError> {
        self.read_bits(64).map(|v| v as i64)
    }

    /// Read an `f32` from its IEEE-754 bit pattern.
    ///
    /// # Errors
    ///
    /// Returns `Underflow` if fewer than 4 bytes remain; the cursor is unchanged.
    pub fn read_f32(&mut self) -> Result<f32, StreamError> {
        self.read_bits(32).map(|v| f32::from_bits(v as u32))
    }

    /// Read an `f64` from its IEEE-754 bit pattern.
    ///
    /// # Errors
    ///
    /// Returns `Underflow` if fewer than 8 bytes remain; the cursor is unchanged.
    pub fn read_f64(&mut self) -> Result<f64, StreamError> {
        self.read_bits(64).map(f64::from_bits)
    }

    /// Read a bool: any non-zero byte is true.
    ///
    /// # Errors
    ///
    /// Returns `Underflow` if no byte is available; the cursor is unchanged.
    pub fn read_bool(&mut self) -> Result<bool, StreamError> {
        self.read_u8().map(|v| v != 0)
    }

    /// Read exactly `dest.len()` raw bytes into `dest`, mirroring
    /// [`write_chars`](Self::write_chars).
    ///
    /// # Errors
    ///
    /// Returns `Underflow` if the run is not fully available; the cursor is
    /// unchanged and nothing is copied.
    pub fn read_chars(&mut self, dest: &mut [u8]) -> Result<(), StreamError> {
        if !self.can_read(dest.len()) {
            return Err(StreamError::new(ErrorCode::Underflow, self.read_pos));
        }
        let start = self.read_pos;
        dest.copy_from_slice(&self.buf.as_bytes()[start..start + dest.len()]);
        self.read_pos += dest.len();
        Ok(())
    }

    /// Read a length-prefixed string written by
    /// [`write_string`](Self::write_string) into `dest`, returning the
    /// decoded prefix of `dest`.
    ///
    /// Known asymmetry, preserved deliberately: the 16-bit length prefix is
    /// consumed through the ordinary integer read before the destination
    /// capacity is checked, so an `InvalidDestination` failure leaves the
    /// read cursor past the prefix even though no string bytes were
    /// consumed. All other failures leave the cursor where the failing
    /// sub-read found it.
    ///
    /// # Errors
    ///
    /// `Underflow` if the prefix or the string bytes are not available,
    /// `InvalidDestination` if `dest` is shorter than the prefixed length,
    /// `InvalidUtf8` if the decoded bytes are not valid UTF-8.
    pub fn read_string<'d>(&mut self, dest: &'d mut [u8]) -> Result<&'d str, StreamError> {
        let len = usize::from(self.read_u16()?);

        if dest.len() < len {
            return Err(StreamError::new(ErrorCode::InvalidDestination, self.read_pos));
        }

        self.read_chars(&mut dest[..len])?;

        core::str::from_utf8(&dest[..len])
            .map_err(|_| StreamError::new(ErrorCode::InvalidUtf8, self.read_pos))
    }

    fn write_bits(&mut self, val: u64, bit_size: u8) -> Result<(), StreamError> {
        check_width(bit_size, self.buf.len())?;
        if !self.can_write(usize::from(bit_size / 8)) {
            return Err(StreamError::new(ErrorCode::CapacityExceeded, self.buf.len()));
        }

        match self.buf.endianness() {
            Endian::Big => {
                let mut shift = bit_size - 8;
                loop {
                    self.buf.push((val >> shift) as u8)?;
                    if shift == 0 {
                        break;
                    }
                    shift -= 8;
                }
            }
            Endian::Little => {
                let mut shift = 0;
                while shift < bit_size {
                    self.buf.push((val >> shift) as u8)?;
                    shift += 8;
                }
            }
        }
        Ok(())
    }

    fn read_bits(&mut self, bit_size: u8) -> Result<u64, StreamError> {
        let value = self.read_bits_at(self.read_pos, bit_size)?;
        self.read_pos += usize::from(bit_size / 8);
        Ok(value)
    }

    /// Assemble `bit_size / 8` bytes starting at `pos` without moving any
    /// cursor. Shared by the consuming reads and the non-consuming peek.
    fn read_bits_at(&self, pos: usize, bit_size: u8) -> Result<u64, StreamError> {
        check_width(bit_size, pos)?;
        let count = usize::from(bit_size / 8);
        if pos + count > self.buf.len() {
            return Err(StreamError::new(ErrorCode::Underflow, pos));
        }

        let mut value = 0u64;
        match self.buf.endianness() {
            Endian::Big => {
                let mut shift = bit_size - 8;
                for i in 0..count {
                    let byte = self
                        .buf
                        .get(pos + i)
                        .ok_or_else(|| StreamError::new(ErrorCode::Underflow, pos + i))?;
                    value |= u64::from(byte) << shift;
                    shift = shift.saturating_sub(8);
                }
            }
            Endian::Little => {
                for i in 0..count {
                    let byte = self
                        .buf
                        .get(pos + i)
                        .ok_or_else(|| StreamError::new(ErrorCode::Underflow, pos + i))?;
                    value |= u64::from(byte) << (8 * i);
                }
            }
        }
        Ok(value)
    }
}

#[inline]
const fn check_width(bit_size: u8, offset: usize) -> Result<(), StreamError> {
    if bit_size == 0 || bit_size > 64 || bit_size % 8 != 0 {
        return Err(StreamError::new(ErrorCode::UnsupportedWidth, offset));
    }
    Ok(())
}
