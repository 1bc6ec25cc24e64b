//! [`LengthPrefixed`]: the `u16`-counted layout used on the network.

use std::io::{Read, Write};

use super::{LengthPrefixed, TagCodec};
use crate::{
    codec::{Codec, MAX_PREALLOCATION, decode_array, read_bytes, utf8, write_all},
    error::{Error, Result},
    log::LogSink,
};

fn encode_count<W: Write + ?Sized>(writer: &mut W, len: usize) -> Result<()> {
    let count = u16::try_from(len).map_err(|_| Error::LengthOverflow {
        len,
        max: usize::from(u16::MAX),
    })?;
    count.encode(writer)
}

fn decode_count<R: Read + ?Sized>(reader: &mut R) -> Result<usize> {
    Ok(usize::from(u16::decode(reader)?))
}

impl<T: Codec> TagCodec<LengthPrefixed> for Vec<T> {
    fn encode_tagged<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        encode_count(writer, self.len())?;
        for item in self {
            item.encode(writer)?;
        }
        Ok(())
    }

    fn decode_tagged<R: Read + ?Sized>(reader: &mut R) -> Result<Self> {
        let count = decode_count(reader)?;
        let mut items = Self::with_capacity(count.min(MAX_PREALLOCATION));
        for _ in 0..count {
            items.push(T::decode(reader)?);
        }
        Ok(items)
    }

    fn log_tagged(&self, sink: &mut LogSink) { self.log(sink); }
}

/// The count is written even though `N` is known, and must match on decode.
impl<T: Codec, const N: usize> TagCodec<LengthPrefixed> for [T; N] {
    fn encode_tagged<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        encode_count(writer, N)?;
        for item in self {
            item.encode(writer)?;
        }
        Ok(())
    }

    fn decode_tagged<R: Read + ?Sized>(reader: &mut R) -> Result<Self> {
        let found = decode_count(reader)?;
        if found != N {
            return Err(Error::LengthMismatch { expected: N, found });
        }

        decode_array(reader, T::decode)
    }

    fn log_tagged(&self, sink: &mut LogSink) { self.log(sink); }
}

impl TagCodec<LengthPrefixed> for String {
    fn encode_tagged<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        encode_count(writer, self.len())?;
        write_all(writer, self.as_bytes())
    }

    fn decode_tagged<R: Read + ?Sized>(reader: &mut R) -> Result<Self> {
        let len = decode_count(reader)?;
        utf8(read_bytes(reader, len)?)
    }

    fn log_tagged(&self, sink: &mut LogSink) { self.log(sink); }
}
