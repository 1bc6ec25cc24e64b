//! [`BitPacked`]: booleans eight to a byte.

use std::io::{Read, Write};

use super::{BitPacked, TagCodec};
use crate::{
    codec::{decode_len, encode_len, read_bytes, write_all},
    error::{Error, Result},
    log::LogSink,
};

fn pack(bits: &[bool]) -> Vec<u8> {
    let mut bytes = vec![0u8; bits.len().div_ceil(8)];
    for (index, _) in bits.iter().enumerate().filter(|(_, bit)| **bit) {
        bytes[index / 8] |= 1 << (index % 8);
    }
    bytes
}

/// Rejects set bits past the last flag so every flag set has exactly one
/// encoding.
fn check_padding(bytes: &[u8], count: usize) -> Result<()> {
    let used = count % 8;
    if used == 0 {
        return Ok(());
    }

    match bytes.last() {
        Some(last) if last >> used != 0 => Err(Error::invalid_data(format!(
            "non-zero padding bits after {count} packed flags"
        ))),
        _ => Ok(()),
    }
}

fn bit(bytes: &[u8], index: usize) -> bool {
    (bytes[index / 8] >> (index % 8)) & 1 == 1
}

impl<const N: usize> TagCodec<BitPacked> for [bool; N] {
    fn encode_tagged<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        write_all(writer, &pack(self))
    }

    fn decode_tagged<R: Read + ?Sized>(reader: &mut R) -> Result<Self> {
        let bytes = read_bytes(reader, N.div_ceil(8))?;
        check_padding(&bytes, N)?;

        Ok(std::array::from_fn(|index| bit(&bytes, index)))
    }

    fn log_tagged(&self, sink: &mut LogSink) { log_bits(self, sink); }
}

/// A `u32` flag count followed by the packed bytes.
impl TagCodec<BitPacked> for Vec<bool> {
    fn encode_tagged<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        encode_len(writer, self.len())?;
        write_all(writer, &pack(self))
    }

    fn decode_tagged<R: Read + ?Sized>(reader: &mut R) -> Result<Self> {
        let count = decode_len(reader)?;
        let bytes = read_bytes(reader, count.div_ceil(8))?;
        check_padding(&bytes, count)?;

        Ok((0..count).map(|index| bit(&bytes, index)).collect())
    }

    fn log_tagged(&self, sink: &mut LogSink) { log_bits(self, sink); }
}

/// Flags render as a bit string in index order, e.g. `0b101`.
fn log_bits(bits: &[bool], sink: &mut LogSink) {
    sink.push_str("0b");
    for flag in bits {
        sink.push_str(if *flag { "1" } else { "0" });
    }
}
