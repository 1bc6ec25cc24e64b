use std::io::{Cursor, Read, Write};

use super::*;

#[test]
fn memory_stream_grows_on_write() {
    let mut stream = MemoryStream::new();

    stream.write_all(&[1, 2, 3]).unwrap();

    assert_eq!(stream.position(), 3);
    assert_eq!(stream.length(), 3);
    assert_eq!(stream.remaining(), 0);
    assert_eq!(stream.as_bytes(), &[1, 2, 3]);
}

#[test]
fn memory_stream_overwrites_in_the_middle() {
    let mut stream = MemoryStream::from_bytes(vec![1, 2, 3, 4]);

    stream.seek_to(1).unwrap();
    stream.write_all(&[9, 9, 9, 9]).unwrap();

    assert_eq!(stream.as_bytes(), &[1, 9, 9, 9, 9]);
    assert_eq!(stream.position(), 5);
}

#[test]
fn memory_stream_zero_fills_gap_after_seek() {
    let mut stream = MemoryStream::new();

    stream.seek_to(3).unwrap();
    stream.write_all(&[7]).unwrap();

    assert_eq!(stream.as_bytes(), &[0, 0, 0, 7]);
}

#[test]
fn memory_stream_short_read_at_end() {
    let mut stream = MemoryStream::from_bytes(vec![1, 2]);
    let mut buf = [0u8; 4];

    assert_eq!(stream.read(&mut buf).unwrap(), 2);
    assert_eq!(&buf[..2], &[1, 2]);
    assert_eq!(stream.read(&mut buf).unwrap(), 0);
}

#[test]
fn memory_stream_read_past_seeked_end() {
    let mut stream = MemoryStream::from_bytes(vec![1, 2]);
    let mut buf = [0u8; 1];

    stream.seek_to(10).unwrap();

    assert_eq!(stream.read(&mut buf).unwrap(), 0);
    assert_eq!(stream.remaining(), 0);
}

#[test]
fn cursor_is_a_stream() {
    let mut cursor = Cursor::new(Vec::new());

    cursor.write_all(&[5, 6]).unwrap();
    Stream::seek_to(&mut cursor, 1).unwrap();

    assert_eq!(Stream::position(&cursor), 1);
    assert_eq!(cursor.length(), 2);
    assert_eq!(cursor.remaining(), 1);
}

#[test]
fn io_stream_tracks_position_and_length() {
    let mut file = tempfile::tempfile().unwrap();
    file.write_all(&[1, 2, 3, 4]).unwrap();

    let mut stream = IoStream::open(file).unwrap();
    assert_eq!(stream.position(), 4);
    assert_eq!(stream.length(), 4);

    stream.write_all(&[5, 6]).unwrap();
    assert_eq!(stream.length(), 6);

    stream.seek_to(0).unwrap();
    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).unwrap();

    assert_eq!(buf, vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(stream.position(), 6);
}
