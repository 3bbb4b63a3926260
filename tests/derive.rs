#![cfg(feature = "derive")]

use serdelite::{
    ByteBuffer, ByteDecode, ByteEncode, ByteStream, Endian, ErrorCode, JsonEncode, JsonStream,
};

#[derive(Debug, PartialEq, ByteEncode, ByteDecode, JsonEncode)]
struct Vec2 {
    x: i16,
    y: i16,
}

#[derive(Debug, PartialEq, ByteEncode, ByteDecode)]
struct Player {
    id: u32,
    pos: Vec2,
    vel: Vec2,
    health: i16,
    alive: bool,
    tag: [u8; 4],
    #[sdl(skip)]
    frame_counter: u64,
}

#[test]
fn derived_binary_roundtrip_with_nested_structs() {
    let player = Player {
        id: 7,
        pos: Vec2 { x: 10, y: -20 },
        vel: Vec2 { x: -1, y: 2 },
        health: 95,
        alive: true,
        tag: *b"ally",
        frame_counter: 99,
    };
    assert_eq!(serdelite::ByteEncode::byte_size(&player), 4 + 4 + 4 + 2 + 1 + 4);

    for order in [Endian::Big, Endian::Little] {
        let mut mem = [0u8; 64];
        let mut buf = ByteBuffer::new(&mut mem, order);
        let mut stream = ByteStream::new(&mut buf);

        stream.write_object(&player).unwrap();
        assert_eq!(stream.buffer().len(), 19);

        let decoded: Player = stream.read_object().unwrap();
        // Skipped fields come back from Default, not the wire.
        assert_eq!(decoded.frame_counter, 0);
        assert_eq!(decoded.id, player.id);
        assert_eq!(decoded.pos, player.pos);
        assert_eq!(decoded.vel, player.vel);
        assert_eq!(decoded.health, player.health);
        assert_eq!(decoded.alive, player.alive);
        assert_eq!(decoded.tag, player.tag);
    }
}

#[derive(Debug, PartialEq, ByteEncode, ByteDecode)]
struct Pair(u16, u16);

#[test]
fn derived_tuple_struct_roundtrip() {
    let mut mem = [0u8; 8];
    let mut buf = ByteBuffer::new(&mut mem, Endian::Big);
    let mut stream = ByteStream::new(&mut buf);

    stream.write_object(&Pair(1, 0xFFFF)).unwrap();
    assert_eq!(stream.buffer().as_bytes(), &[0x00, 0x01, 0xFF, 0xFF]);
    assert_eq!(stream.read_object::<Pair>().unwrap(), Pair(1, 0xFFFF));
}

#[test]
fn derived_decode_fails_cleanly_on_truncated_input() {
    let mut mem = [0u8; 8];
    let mut buf = ByteBuffer::new(&mut mem, Endian::Big);
    let mut stream = ByteStream::new(&mut buf);
    stream.write_u16(1).unwrap();

    let err = stream.read_object::<Pair>().unwrap_err();
    assert_eq!(err.code, ErrorCode::Underflow);
}

#[derive(JsonEncode)]
struct Status {
    #[sdl(rename = "id")]
    ident: u32,
    pos: Vec2,
    name: &'static str,
    ready: bool,
    #[sdl(skip)]
    secret: u32,
}

#[test]
fn derived_json_uses_renames_skips_and_nesting() {
    let status = Status {
        ident: 7,
        pos: Vec2 { x: 1, y: -2 },
        name: "hero",
        ready: true,
        secret: 0xDEAD,
    };

    let mut mem = [0u8; 128];
    let mut buf = ByteBuffer::new(&mut mem, Endian::Big);
    let mut stream = JsonStream::new(&mut buf).unwrap();
    status.json_fields(&mut stream).unwrap();
    let text = stream.finish().unwrap();

    assert_eq!(
        text.as_str(),
        r#"{"id":7,"pos":{"x":1,"y":-2},"name":"hero","ready":true}"#
    );
}
