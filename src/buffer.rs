use core::fmt;

use crate::{ErrorCode, StreamError};

/// Byte order of a buffer's wire representation.
///
/// `Big`: most significant byte first (network byte order).
/// `Little`: least significant byte first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    /// Least significant byte at the lowest offset.
    Little,
    /// Most significant byte at the lowest offset (network byte order).
    Big,
}

impl Endian {
    /// The byte order of the host architecture.
    #[must_use]
    pub const fn native() -> Self {
        if cfg!(target_endian = "little") {
            Self::Little
        } else {
            Self::Big
        }
    }
}

/// A bounds-checked view over a caller-owned fixed-capacity byte buffer.
///
/// `ByteBuffer` is the sole physical storage layer of serdelite. It borrows a
/// raw byte slice, tracks the written length against the slice's capacity,
/// and carries the [`Endian`] tag that the streams layered on top consult
/// for every multi-byte value. It never allocates and never outlives the
/// backing memory; the borrow checker enforces the lifetime discipline the
/// original design documents by convention.
///
/// All mutation funnels through [`push`](Self::push), which refuses to grow
/// past capacity, so `len <= capacity` holds at all times. The backing
/// bytes are zero-filled on construction.
pub struct ByteBuffer<'a> {
    bytes: &'a mut [u8],
    len: usize,
    order: Endian,
}

impl<'a> ByteBuffer<'a> {
    /// Wrap caller-owned memory. The full slice is zero-filled and the
    /// written length starts at 0.
    pub fn new(bytes: &'a mut [u8], order: Endian) -> Self {
        bytes.fill(0);
        Self {
            bytes,
            len: 0,
            order,
        }
    }

    /// Append a single byte.
    ///
    /// # Errors
    ///
    /// Returns `CapacityExceeded` iff the buffer is already full; nothing is
    /// mutated on failure.
    #[inline]
    pub fn push(&mut self, byte: u8) -> Result<(), StreamError> {
        if self.is_full() {
            return Err(StreamError::new(ErrorCode::CapacityExceeded, self.len));
        }
        self.bytes[self.len] = byte;
        self.len += 1;
        Ok(())
    }

    /// Manually set the written length, after external writes through
    /// [`raw_bytes_mut`](Self::raw_bytes_mut) or to truncate a detected
    /// partial write.
    ///
    /// # Errors
    ///
    /// Returns `CapacityExceeded` iff `new_len` exceeds the capacity.
    pub fn set_len(&mut self, new_len: usize) -> Result<(), StreamError> {
        if new_len > self.capacity() {
            return Err(StreamError::new(ErrorCode::CapacityExceeded, self.len));
        }
        self.len = new_len;
        Ok(())
    }

    /// Shrink the written length, discarding any bytes past `len`. No-op if
    /// `len` is not smaller than the current length. Infallible rollback
    /// primitive for the streams' snapshot/restore discipline.
    pub(crate) fn truncate(&mut self, len: usize) {
        if len < self.len {
            self.len = len;
        }
    }

    /// Reset the written length to 0 without touching the byte contents.
    ///
    /// Use [`erase`](Self::erase) to also zero the memory.
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Zero-fill the entire capacity and reset the written length to 0.
    pub fn erase(&mut self) {
        self.bytes.fill(0);
        self.len = 0;
    }

    /// Change the byte order tag.
    ///
    /// Must only be called before any write: data already in the buffer is
    /// not converted, so switching mid-stream corrupts every multi-byte
    /// value written so far. This is documented, not checked.
    pub fn set_endianness(&mut self, order: Endian) {
        self.order = order;
    }

    /// The byte order used for every multi-byte value in this buffer.
    #[inline]
    #[must_use]
    pub const fn endianness(&self) -> Endian {
        self.order
    }

    /// Number of bytes written so far.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no bytes have been written.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total capacity of the backing memory.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// Bytes still available for writing.
    #[inline]
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.bytes.len() - self.len
    }

    /// Returns `true` once `len == capacity`.
    #[inline]
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.len >= self.bytes.len()
    }

    /// Read the byte at `index`, or `None` past the written length.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<u8> {
        if index < self.len {
            Some(self.bytes[index])
        } else {
            None
        }
    }

    /// The written prefix of the backing memory.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// Mutable access to the full backing memory, written and unwritten.
    ///
    /// Intended for external producers that fill bytes directly and then
    /// record the result with [`set_len`](Self::set_len). Writing through
    /// this instead of [`push`](Self::push) bypasses the capacity cursor.
    pub fn raw_bytes_mut(&mut self) -> &mut [u8] {
        self.bytes
    }

    /// Render the written bytes as uppercase hex digits into `dest`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDestination` if `dest` is shorter than `2 * len`;
    /// nothing is written on failure.
    pub fn to_hex<'d>(&self, dest: &'d mut [u8]) -> Result<&'d str, StreamError> {
        if dest.len() < self.len * 2 {
            return Err(StreamError::new(ErrorCode::InvalidDestination, 0));
        }

        const HEX: &[u8; 16] = b"0123456789ABCDEF";
        let mut out = 0;
        for &byte in self.as_bytes() {
            dest[out] = HEX[usize::from(byte >> 4)];
            dest[out + 1] = HEX[usize::from(byte & 0x0f)];
            out += 2;
        }

        // Only ASCII hex digits were written.
        core::str::from_utf8(&dest[..out])
            .map_err(|_| StreamError::new(ErrorCode::InvalidDestination, 0))
    }

    /// Append bytes parsed from a hex string.
    ///
    /// Space, colon and dash separators between digit pairs are skipped, so
    /// `"DE:AD BE-EF"` imports as four bytes. On any malformed pair, or if
    /// the buffer fills up mid-import, the length is rolled back to its
    /// value before the call; a failed import never leaves a partial buffer.
    ///
    /// # Errors
    ///
    /// `MalformedHex` (offset = position in `hex`) for an odd-length or
    /// non-hex-digit run; `CapacityExceeded` if the decoded bytes do not fit.
    pub fn from_hex(&mut self, hex: &str) -> Result<(), StreamError> {
        let start_len = self.len;
        let raw = hex.as_bytes();
        let mut i = 0;

        let result = loop {
            if i >= raw.len() {
                break Ok(());
            }
            if matches!(raw[i], b' ' | b':' | b'-') {
                i += 1;
                continue;
            }
            if i + 1 >= raw.len() {
                break Err(StreamError::new(ErrorCode::MalformedHex, i));
            }
            let (Some(high), Some(low)) = (hex_nibble(raw[i]), hex_nibble(raw[i + 1])) else {
                break Err(StreamError::new(ErrorCode::MalformedHex, i));
            };
            if let Err(err) = self.push((high << 4) | low) {
                break Err(err);
            }
            i += 2;
        };

        if result.is_err() {
            self.len = start_len;
        }
        result
    }

    /// Lossy render of the written bytes into `dest`: printable ASCII
    /// (32..=126) passes through, everything else becomes `.`. Truncates to
    /// the destination. Debug aid, not part of any wire contract.
    pub fn to_printable<'d>(&self, dest: &'d mut [u8]) -> &'d str {
        let copy_len = self.len.min(dest.len());
        for (slot, &byte) in dest[..copy_len].iter_mut().zip(self.as_bytes()) {
            *slot = printable_or_dot(byte);
        }
        // Only printable ASCII and '.' were written.
        core::str::from_utf8(&dest[..copy_len]).unwrap_or("")
    }

    /// A [`Display`](core::fmt::Display) adapter rendering the classic
    /// hex + ASCII table: 16 bytes per row with an offset column. Debug aid.
    #[must_use]
    pub fn hex_dump(&self) -> HexDump<'_> {
        HexDump {
            data: self.as_bytes(),
        }
    }
}

impl fmt::Debug for ByteBuffer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteBuffer")
            .field("len", &self.len)
            .field("capacity", &self.capacity())
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}

#[inline]
const fn hex_nibble(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

#[inline]
const fn printable_or_dot(byte: u8) -> u8 {
    if byte >= 32 && byte <= 126 {
        byte
    } else {
        b'.'
    }
}

/// Hex + ASCII table renderer returned by [`ByteBuffer::hex_dump`].
pub struct HexDump<'a> {
    data: &'a [u8],
}

impl fmt::Display for HexDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- ByteBuffer Dump (Length: {}) ---", self.data.len())?;
        for (row, chunk) in self.data.chunks(16).enumerate() {
            write!(f, "{:04x}: ", row * 16)?;
            for col in 0..16 {
                match chunk.get(col) {
                    Some(byte) => write!(f, "{byte:02X} ")?,
                    None => write!(f, "   ")?,
                }
            }
            write!(f, " | ")?;
            for &byte in chunk {
                write!(f, "{}", char::from(printable_or_dot(byte)))?;
            }
            writeln!(f)?;
        }
        write!(f, "--------------------------------------")
    }
}
