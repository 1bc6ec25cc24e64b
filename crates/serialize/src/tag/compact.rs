//! [`Compact`]: LEB128 varints for integers and lengths.
//!
//! Unsigned integers store seven bits per byte, least significant group
//! first, with the high bit marking continuation. Signed integers are zigzag
//! encoded first so small magnitudes of either sign stay short. Single-byte
//! types are written as-is.

use std::io::{Read, Write};

use super::{Compact, TagCodec};
use crate::{
    codec::{Codec, MAX_PREALLOCATION, read_array, read_bytes, utf8, write_all},
    error::{Error, Result},
    log::LogSink,
};

/// Longest varint this module produces (a `u128`).
const MAX_VARINT_BYTES: usize = 19;

#[allow(clippy::cast_possible_truncation)]
fn write_varint<W: Write + ?Sized>(writer: &mut W, mut value: u128) -> Result<()> {
    let mut buf = [0u8; MAX_VARINT_BYTES];
    let mut len = 0;

    while value >= 0x80 {
        buf[len] = (value as u8) | 0x80;
        value >>= 7;
        len += 1;
    }
    buf[len] = value as u8;

    write_all(writer, &buf[..=len])
}

/// Reads a varint that must fit in `bits` bits.
fn read_varint<R: Read + ?Sized>(reader: &mut R, bits: u32) -> Result<u128> {
    let mut result: u128 = 0;
    let mut shift = 0u32;

    loop {
        let [byte] = read_array::<1, _>(reader)?;

        if shift >= bits {
            return Err(Error::invalid_data(format!(
                "varint too long for a {bits}-bit integer"
            )));
        }

        let group = u128::from(byte & 0x7F);
        let shifted = group << shift;
        if shifted >> shift != group {
            return Err(Error::invalid_data(format!(
                "varint overflows a {bits}-bit integer"
            )));
        }
        result |= shifted;

        if byte & 0x80 == 0 {
            // A zero final group after the first byte adds nothing, so the
            // same value would have a shorter encoding.
            if byte == 0 && shift > 0 {
                return Err(Error::invalid_data(
                    "non-canonical varint with a trailing zero group",
                ));
            }
            return Ok(result);
        }

        shift += 7;
    }
}

#[inline]
#[allow(clippy::cast_sign_loss)]
const fn zigzag_encode(value: i128) -> u128 {
    ((value << 1) ^ (value >> 127)) as u128
}

#[inline]
#[allow(clippy::cast_possible_wrap)]
const fn zigzag_decode(value: u128) -> i128 {
    ((value >> 1) as i128) ^ (-((value & 1) as i128))
}

fn out_of_range(ty: &str) -> Error {
    Error::invalid_data(format!("varint out of range for {ty}"))
}

fn encode_len<W: Write + ?Sized>(writer: &mut W, len: usize) -> Result<()> {
    write_varint(writer, len as u128)
}

fn decode_len<R: Read + ?Sized>(reader: &mut R) -> Result<usize> {
    let len = read_varint(reader, usize::BITS)?;
    usize::try_from(len).map_err(|_| out_of_range("usize"))
}

macro_rules! impl_compact_unsigned {
    ($($ty:ty),+) => {
        $(
            impl TagCodec<Compact> for $ty {
                fn encode_tagged<W: Write + ?Sized>(
                    &self,
                    writer: &mut W,
                ) -> Result<()> {
                    write_varint(writer, *self as u128)
                }

                fn decode_tagged<R: Read + ?Sized>(
                    reader: &mut R,
                ) -> Result<Self> {
                    let value = read_varint(reader, <$ty>::BITS)?;
                    <$ty>::try_from(value)
                        .map_err(|_| out_of_range(stringify!($ty)))
                }

                fn log_tagged(&self, sink: &mut LogSink) {
                    Codec::log(self, sink);
                }
            }
        )+
    };
}

macro_rules! impl_compact_signed {
    ($($ty:ty),+) => {
        $(
            impl TagCodec<Compact> for $ty {
                fn encode_tagged<W: Write + ?Sized>(
                    &self,
                    writer: &mut W,
                ) -> Result<()> {
                    write_varint(writer, zigzag_encode(*self as i128))
                }

                fn decode_tagged<R: Read + ?Sized>(
                    reader: &mut R,
                ) -> Result<Self> {
                    let value = read_varint(reader, <$ty>::BITS)?;
                    <$ty>::try_from(zigzag_decode(value))
                        .map_err(|_| out_of_range(stringify!($ty)))
                }

                fn log_tagged(&self, sink: &mut LogSink) {
                    Codec::log(self, sink);
                }
            }
        )+
    };
}

impl_compact_unsigned!(u16, u32, u64, u128, usize);
impl_compact_signed!(i16, i32, i64, i128, isize);

macro_rules! impl_compact_single_byte {
    ($($ty:ty),+) => {
        $(
            impl TagCodec<Compact> for $ty {
                fn encode_tagged<W: Write + ?Sized>(
                    &self,
                    writer: &mut W,
                ) -> Result<()> {
                    self.encode(writer)
                }

                fn decode_tagged<R: Read + ?Sized>(
                    reader: &mut R,
                ) -> Result<Self> {
                    <$ty as Codec>::decode(reader)
                }

                fn log_tagged(&self, sink: &mut LogSink) {
                    Codec::log(self, sink);
                }
            }
        )+
    };
}

impl_compact_single_byte!(u8, i8, bool);

impl TagCodec<Compact> for String {
    fn encode_tagged<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        encode_len(writer, self.len())?;
        write_all(writer, self.as_bytes())
    }

    fn decode_tagged<R: Read + ?Sized>(reader: &mut R) -> Result<Self> {
        let len = decode_len(reader)?;
        utf8(read_bytes(reader, len)?)
    }

    fn log_tagged(&self, sink: &mut LogSink) { Codec::log(self, sink); }
}

/// Elements are compact too, so the element type needs its own impl.
impl<T: TagCodec<Compact>> TagCodec<Compact> for Vec<T> {
    fn encode_tagged<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        encode_len(writer, self.len())?;
        for item in self {
            <T as TagCodec<Compact>>::encode_tagged(item, writer)?;
        }
        Ok(())
    }

    fn decode_tagged<R: Read + ?Sized>(reader: &mut R) -> Result<Self> {
        let len = decode_len(reader)?;
        let mut items = Self::with_capacity(len.min(MAX_PREALLOCATION));
        for _ in 0..len {
            items.push(<T as TagCodec<Compact>>::decode_tagged(reader)?);
        }
        Ok(items)
    }

    fn log_tagged(&self, sink: &mut LogSink) {
        sink.push_str("[");
        crate::log::log_separated(
            sink,
            self,
            <T as TagCodec<Compact>>::log_tagged,
        );
        sink.push_str("]");
    }
}

impl<T: TagCodec<Compact>> TagCodec<Compact> for Option<T> {
    fn encode_tagged<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        match self {
            Some(value) => {
                true.encode(writer)?;
                <T as TagCodec<Compact>>::encode_tagged(value, writer)
            }
            None => false.encode(writer),
        }
    }

    fn decode_tagged<R: Read + ?Sized>(reader: &mut R) -> Result<Self> {
        if bool::decode(reader)? {
            <T as TagCodec<Compact>>::decode_tagged(reader).map(Some)
        } else {
            Ok(None)
        }
    }

    fn log_tagged(&self, sink: &mut LogSink) {
        match self {
            Some(value) => {
                sink.push_str("Some(");
                <T as TagCodec<Compact>>::log_tagged(value, sink);
                sink.push_str(")");
            }
            None => sink.push_str("None"),
        }
    }
}
