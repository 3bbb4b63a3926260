use serdelite::{ByteBuffer, ByteStream, Endian, ErrorCode};

#[test]
fn u32_wire_bytes_big_endian() {
    let mut mem = [0u8; 8];
    let mut buf = ByteBuffer::new(&mut mem, Endian::Big);
    let mut stream = ByteStream::new(&mut buf);

    stream.write_u32(0x1234_5678).unwrap();
    assert_eq!(stream.buffer().as_bytes(), &[0x12, 0x34, 0x56, 0x78]);
}

#[test]
fn u32_wire_bytes_little_endian() {
    let mut mem = [0u8; 8];
    let mut buf = ByteBuffer::new(&mut mem, Endian::Little);
    let mut stream = ByteStream::new(&mut buf);

    stream.write_u32(0x1234_5678).unwrap();
    assert_eq!(stream.buffer().as_bytes(), &[0x78, 0x56, 0x34, 0x12]);
}

#[test]
fn string_wire_bytes_carry_u16_prefix() {
    let mut mem = [0u8; 16];
    let mut buf = ByteBuffer::new(&mut mem, Endian::Big);
    let mut stream = ByteStream::new(&mut buf);

    stream.write_string("Hero").unwrap();
    assert_eq!(
        stream.buffer().as_bytes(),
        &[0x00, 0x04, b'H', b'e', b'r', b'o']
    );
}

fn scalar_roundtrip(order: Endian) {
    let mut mem = [0u8; 128];
    let mut buf = ByteBuffer::new(&mut mem, order);
    let mut stream = ByteStream::new(&mut buf);

    stream.write_u8(0xAB).unwrap();
    stream.write_u16(0xBEEF).unwrap();
    stream.write_u32(0xDEAD_BEEF).unwrap();
    stream.write_u64(0x0123_4567_89AB_CDEF).unwrap();
    stream.write_i8(-5).unwrap();
    stream.write_i16(-12_345).unwrap();
    stream.write_i32(i32::MIN).unwrap();
    stream.write_i64(i64::MIN + 1).unwrap();
    stream.write_f32(3.5).unwrap();
    stream.write_f64(-0.125).unwrap();
    stream.write_bool(true).unwrap();
    stream.write_bool(false).unwrap();

    assert_eq!(stream.read_u8().unwrap(), 0xAB);
    assert_eq!(stream.read_u16().unwrap(), 0xBEEF);
    assert_eq!(stream.read_u32().unwrap(), 0xDEAD_BEEF);
    assert_eq!(stream.read_u64().unwrap(), 0x0123_4567_89AB_CDEF);
    assert_eq!(stream.read_i8().unwrap(), -5);
    assert_eq!(stream.read_i16().unwrap(), -12_345);
    assert_eq!(stream.read_i32().unwrap(), i32::MIN);
    assert_eq!(stream.read_i64().unwrap(), i64::MIN + 1);
    assert_eq!(stream.read_f32().unwrap(), 3.5);
    assert_eq!(stream.read_f64().unwrap(), -0.125);
    assert!(stream.read_bool().unwrap());
    assert!(!stream.read_bool().unwrap());
}

#[test]
fn scalar_roundtrip_big_endian() {
    scalar_roundtrip(Endian::Big);
}

#[test]
fn scalar_roundtrip_little_endian() {
    scalar_roundtrip(Endian::Little);
}

#[test]
fn negative_values_sign_extend_on_read() {
    let mut mem = [0u8; 8];
    let mut buf = ByteBuffer::new(&mut mem, Endian::Big);
    let mut stream = ByteStream::new(&mut buf);

    stream.write_i8(-1).unwrap();
    stream.write_i16(-2).unwrap();

    // The same bytes reinterpreted unsigned show the two's-complement
    // patterns the signed reads extend from.
    assert_eq!(stream.read_u8().unwrap(), 0xFF);
    assert_eq!(stream.read_u16().unwrap(), 0xFFFE);

    stream.reset_read_cursor();
    assert_eq!(stream.read_i8().unwrap(), -1);
    assert_eq!(stream.read_i16().unwrap(), -2);
}

#[test]
fn float_bit_patterns_survive_the_roundtrip() {
    let mut mem = [0u8; 16];
    let mut buf = ByteBuffer::new(&mut mem, Endian::Little);
    let mut stream = ByteStream::new(&mut buf);

    let odd_nan = f32::from_bits(0x7FC0_1234);
    stream.write_f32(odd_nan).unwrap();
    stream.write_f64(f64::NEG_INFINITY).unwrap();

    assert_eq!(stream.read_f32().unwrap().to_bits(), odd_nan.to_bits());
    assert_eq!(stream.read_f64().unwrap(), f64::NEG_INFINITY);
}

#[test]
fn read_past_written_length_underflows() {
    let mut mem = [0u8; 8];
    let mut buf = ByteBuffer::new(&mut mem, Endian::Big);
    let mut stream = ByteStream::new(&mut buf);

    let err = stream.read_u8().unwrap_err();
    assert_eq!(err.code, ErrorCode::Underflow);
    assert_eq!(stream.read_position(), 0);

    stream.write_u16(7).unwrap();
    let err = stream.read_u32().unwrap_err();
    assert_eq!(err.code, ErrorCode::Underflow);
    // A failed multi-byte read consumes nothing.
    assert_eq!(stream.read_position(), 0);
    assert_eq!(stream.read_u16().unwrap(), 7);
}

#[test]
fn full_buffer_write_is_a_no_op() {
    let mut mem = [0u8; 3];
    let mut buf = ByteBuffer::new(&mut mem, Endian::Big);
    let mut stream = ByteStream::new(&mut buf);

    let err = stream.write_u32(1).unwrap_err();
    assert_eq!(err.code, ErrorCode::CapacityExceeded);
    assert_eq!(stream.buffer().len(), 0);

    stream.write_u16(0x0102).unwrap();
    let err = stream.write_u16(0x0304).unwrap_err();
    assert_eq!(err.code, ErrorCode::CapacityExceeded);
    assert_eq!(stream.buffer().as_bytes(), &[0x01, 0x02]);
}

#[test]
fn chars_roundtrip_without_framing() {
    let mut mem = [0u8; 8];
    let mut buf = ByteBuffer::new(&mut mem, Endian::Big);
    let mut stream = ByteStream::new(&mut buf);

    stream.write_chars(b"tag!").unwrap();
    assert_eq!(stream.buffer().as_bytes(), b"tag!");

    let mut out = [0u8; 4];
    stream.read_chars(&mut out).unwrap();
    assert_eq!(&out, b"tag!");

    let mut too_many = [0u8; 5];
    let err = stream.read_chars(&mut too_many).unwrap_err();
    assert_eq!(err.code, ErrorCode::Underflow);
    assert_eq!(stream.read_position(), 4);
}

#[test]
fn string_roundtrip_including_empty() {
    let mut mem = [0u8; 32];
    let mut buf = ByteBuffer::new(&mut mem, Endian::Little);
    let mut stream = ByteStream::new(&mut buf);

    stream.write_string("").unwrap();
    stream.write_string("héllo").unwrap();

    let mut dest = [0u8; 16];
    assert_eq!(stream.read_string(&mut dest).unwrap(), "");
    assert_eq!(stream.read_string(&mut dest).unwrap(), "héllo");
}

#[test]
fn oversized_string_is_rejected_before_writing() {
    let mut mem = [0u8; 8];
    let mut buf = ByteBuffer::new(&mut mem, Endian::Big);
    let mut stream = ByteStream::new(&mut buf);

    let huge = "x".repeat(70_000);
    let err = stream.write_string(&huge).unwrap_err();
    assert_eq!(err.code, ErrorCode::StringTooLong);
    assert_eq!(stream.buffer().len(), 0);
}

#[test]
fn string_write_rolls_back_when_it_does_not_fit() {
    let mut mem = [0u8; 4];
    let mut buf = ByteBuffer::new(&mut mem, Endian::Big);
    let mut stream = ByteStream::new(&mut buf);
    stream.write_u8(0x7F).unwrap();

    let err = stream.write_string("Hero").unwrap_err();
    assert_eq!(err.code, ErrorCode::CapacityExceeded);
    assert_eq!(stream.buffer().as_bytes(), &[0x7F]);
}

#[test]
fn read_string_consumes_prefix_even_when_dest_is_short() {
    let mut mem = [0u8; 16];
    let mut buf = ByteBuffer::new(&mut mem, Endian::Big);
    let mut stream = ByteStream::new(&mut buf);
    stream.write_string("Hero").unwrap();

    let mut short = [0u8; 3];
    let err = stream.read_string(&mut short).unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidDestination);
    // The length prefix is gone; the string bytes are still there.
    assert_eq!(stream.read_position(), 2);

    let mut raw = [0u8; 4];
    stream.read_chars(&mut raw).unwrap();
    assert_eq!(&raw, b"Hero");
}

#[test]
fn read_string_rejects_invalid_utf8() {
    let mut mem = [0u8; 8];
    let mut buf = ByteBuffer::new(&mut mem, Endian::Big);
    let mut stream = ByteStream::new(&mut buf);
    stream.write_u16(2).unwrap();
    stream.write_chars(&[0xFF, 0xFE]).unwrap();

    let mut dest = [0u8; 8];
    let err = stream.read_string(&mut dest).unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidUtf8);
}

#[test]
fn reset_read_cursor_replays_the_stream() {
    let mut mem = [0u8; 8];
    let mut buf = ByteBuffer::new(&mut mem, Endian::Big);
    let mut stream = ByteStream::new(&mut buf);
    stream.write_u32(42).unwrap();

    assert_eq!(stream.read_u32().unwrap(), 42);
    assert_eq!(stream.read_position(), 4);
    stream.reset_read_cursor();
    assert_eq!(stream.read_u32().unwrap(), 42);
}

#[test]
fn can_read_and_can_write_report_remaining_room() {
    let mut mem = [0u8; 4];
    let mut buf = ByteBuffer::new(&mut mem, Endian::Big);
    let mut stream = ByteStream::new(&mut buf);

    assert!(stream.can_write(4));
    assert!(!stream.can_write(5));
    assert!(!stream.can_read(1));

    stream.write_u16(1).unwrap();
    assert!(stream.can_read(2));
    assert!(!stream.can_read(3));
    assert!(stream.can_write(2));
    assert!(!stream.can_write(3));
}
