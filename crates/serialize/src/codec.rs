//! The per-type codec contract and its implementations for standard types.
//!
//! Every type that can flow through a serializer implements [`Codec`]: one
//! function to write it, one to read it back, and one to describe it. The
//! serializers pick which of the three runs; the codec never needs to know.
//!
//! # Wire Layout
//!
//! Integers and floats are fixed-width big-endian (network byte order).
//! Variable-size values carry a `u32` length prefix. See the individual
//! implementations for details; alternative layouts are selected with
//! [`Tag`](crate::Tag).

use std::{
    collections::{BTreeMap, VecDeque},
    io::{self, Read, Write},
    time::Duration,
};

use crate::{
    error::{Error, Result},
    log::{LogSink, log_separated},
};

/// Upper bound on how many elements are reserved up front when decoding a
/// length-prefixed container. Larger containers grow as elements arrive, so a
/// corrupt length cannot force a huge allocation.
pub(crate) const MAX_PREALLOCATION: usize = 4096;

/// The encode/decode/log triple for one type.
///
/// # Contract
///
/// - `encode` writes a deterministic sequence of bytes whose extent `decode`
///   can determine on its own (fixed width or length-prefixed).
/// - `decode` consumes exactly the bytes `encode` wrote and returns a value
///   equal to the original. It fails with [`Error::Truncated`] if the stream
///   ends early rather than returning a default.
/// - `log` renders a human-readable form into a [`LogSink`]. It cannot fail
///   and never touches a binary stream.
///
/// # Example
///
/// ```ignore
/// struct Coords { x: i32, y: i32 }
///
/// impl Codec for Coords {
///     fn encode<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
///         self.x.encode(writer)?;
///         self.y.encode(writer)
///     }
///
///     fn decode<R: Read + ?Sized>(reader: &mut R) -> Result<Self> {
///         Ok(Self { x: i32::decode(reader)?, y: i32::decode(reader)? })
///     }
///
///     fn log(&self, sink: &mut LogSink) {
///         write!(sink, "({}, {})", self.x, self.y);
///     }
/// }
/// ```
pub trait Codec: Sized {
    /// Writes this value to `writer`.
    ///
    /// # Errors
    ///
    /// Returns an error if the writer fails or if the value cannot be
    /// represented (for example a container longer than its prefix allows).
    fn encode<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()>;

    /// Reads a value from `reader`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Truncated`] if the reader runs out of bytes, and
    /// [`Error::InvalidData`] if the bytes do not describe a valid value.
    fn decode<R: Read + ?Sized>(reader: &mut R) -> Result<Self>;

    /// Renders this value for diagnostics.
    fn log(&self, sink: &mut LogSink);
}

/// Fills `buf` completely from `reader`.
///
/// Unlike [`Read::read_exact`], a short stream is reported as
/// [`Error::Truncated`] with the number of bytes that were available.
///
/// # Errors
///
/// Returns [`Error::Truncated`] on a short read and [`Error::Io`] if the
/// reader fails.
pub fn read_exact<R: Read + ?Sized>(
    reader: &mut R,
    buf: &mut [u8],
) -> Result<()> {
    let mut filled = 0;

    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => {
                return Err(Error::Truncated {
                    needed: buf.len(),
                    available: filled,
                });
            }
            Ok(count) => filled += count,
            Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
            Err(error) => return Err(error.into()),
        }
    }

    Ok(())
}

/// Reads exactly `N` bytes into an array.
///
/// # Errors
///
/// See [`read_exact`].
pub fn read_array<const N: usize, R: Read + ?Sized>(
    reader: &mut R,
) -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    read_exact(reader, &mut buf)?;
    Ok(buf)
}

/// Writes all of `bytes` to `writer`.
///
/// # Errors
///
/// Returns [`Error::Io`] if the writer fails or stops accepting bytes.
pub fn write_all<W: Write + ?Sized>(writer: &mut W, bytes: &[u8]) -> Result<()> {
    writer.write_all(bytes)?;
    Ok(())
}

/// Reads `len` bytes into a vector without trusting `len` for allocation.
pub(crate) fn read_bytes<R: Read + ?Sized>(
    reader: &mut R,
    len: usize,
) -> Result<Vec<u8>> {
    let mut bytes = Vec::with_capacity(len.min(MAX_PREALLOCATION));
    let mut chunk = [0u8; 512];

    while bytes.len() < len {
        let want = (len - bytes.len()).min(chunk.len());

        match read_exact(reader, &mut chunk[..want]) {
            Ok(()) => bytes.extend_from_slice(&chunk[..want]),
            Err(Error::Truncated { available, .. }) => {
                return Err(Error::Truncated {
                    needed: len,
                    available: bytes.len() + available,
                });
            }
            Err(error) => return Err(error),
        }
    }

    Ok(bytes)
}

/// Converts raw bytes to a `String`, rejecting invalid UTF-8.
pub(crate) fn utf8(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes)
        .map_err(|error| Error::invalid_data(format!("invalid UTF-8: {error}")))
}

#[allow(clippy::cast_possible_truncation)]
const U32_PREFIX_MAX: usize = u32::MAX as usize;

/// Writes a `u32` length prefix.
pub(crate) fn encode_len<W: Write + ?Sized>(
    writer: &mut W,
    len: usize,
) -> Result<()> {
    let prefix = u32::try_from(len)
        .map_err(|_| Error::LengthOverflow { len, max: U32_PREFIX_MAX })?;
    prefix.encode(writer)
}

/// Reads a `u32` length prefix.
pub(crate) fn decode_len<R: Read + ?Sized>(reader: &mut R) -> Result<usize> {
    let prefix = u32::decode(reader)?;
    usize::try_from(prefix).map_err(|_| {
        Error::invalid_data(format!("length {prefix} exceeds this platform"))
    })
}

/// Encodes `value` into a fresh byte vector with its default codec.
///
/// # Errors
///
/// Propagates any error from [`Codec::encode`].
pub fn to_bytes<T: Codec>(value: &T) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    value.encode(&mut bytes)?;
    Ok(bytes)
}

/// Decodes a value of type `T` from the start of `bytes`.
///
/// Trailing bytes are left unread and are not an error.
///
/// # Errors
///
/// Propagates any error from [`Codec::decode`].
pub fn from_bytes<T: Codec>(mut bytes: &[u8]) -> Result<T> {
    T::decode(&mut bytes)
}

/// Renders `value` with its default codec into a new string.
#[must_use]
pub fn to_log_string<T: Codec>(value: &T) -> String {
    let mut sink = LogSink::new();
    value.log(&mut sink);
    sink.into_string()
}

// =============================================================================
// Primitives
// =============================================================================

macro_rules! impl_codec_int {
    ($($ty:ty),+) => {
        $(
            impl Codec for $ty {
                fn encode<W: Write + ?Sized>(
                    &self,
                    writer: &mut W,
                ) -> Result<()> {
                    write_all(writer, &self.to_be_bytes())
                }

                fn decode<R: Read + ?Sized>(reader: &mut R) -> Result<Self> {
                    Ok(Self::from_be_bytes(read_array(reader)?))
                }

                fn log(&self, sink: &mut LogSink) { write!(sink, "{self}"); }
            }
        )+
    };
}

impl_codec_int!(u8, u16, u32, u64, u128, i8, i16, i32, i64, i128);

impl Codec for usize {
    fn encode<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        // Always 64 bits so the layout does not depend on the platform.
        (*self as u64).encode(writer)
    }

    fn decode<R: Read + ?Sized>(reader: &mut R) -> Result<Self> {
        let value = u64::decode(reader)?;
        Self::try_from(value).map_err(|_| {
            Error::invalid_data(format!("usize {value} out of range"))
        })
    }

    fn log(&self, sink: &mut LogSink) { write!(sink, "{self}"); }
}

impl Codec for isize {
    fn encode<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        (*self as i64).encode(writer)
    }

    fn decode<R: Read + ?Sized>(reader: &mut R) -> Result<Self> {
        let value = i64::decode(reader)?;
        Self::try_from(value).map_err(|_| {
            Error::invalid_data(format!("isize {value} out of range"))
        })
    }

    fn log(&self, sink: &mut LogSink) { write!(sink, "{self}"); }
}

impl Codec for bool {
    fn encode<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        u8::from(*self).encode(writer)
    }

    fn decode<R: Read + ?Sized>(reader: &mut R) -> Result<Self> {
        match u8::decode(reader)? {
            0 => Ok(false),
            1 => Ok(true),
            byte => Err(Error::invalid_data(format!("invalid bool byte {byte}"))),
        }
    }

    fn log(&self, sink: &mut LogSink) { write!(sink, "{self}"); }
}

impl Codec for char {
    fn encode<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        u32::from(*self).encode(writer)
    }

    fn decode<R: Read + ?Sized>(reader: &mut R) -> Result<Self> {
        let code = u32::decode(reader)?;
        Self::from_u32(code).ok_or_else(|| {
            Error::invalid_data(format!("invalid Unicode scalar value {code}"))
        })
    }

    fn log(&self, sink: &mut LogSink) { write!(sink, "{self:?}"); }
}

impl Codec for f32 {
    fn encode<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        self.to_bits().encode(writer)
    }

    fn decode<R: Read + ?Sized>(reader: &mut R) -> Result<Self> {
        Ok(Self::from_bits(u32::decode(reader)?))
    }

    fn log(&self, sink: &mut LogSink) { write!(sink, "{self}"); }
}

impl Codec for f64 {
    fn encode<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        self.to_bits().encode(writer)
    }

    fn decode<R: Read + ?Sized>(reader: &mut R) -> Result<Self> {
        Ok(Self::from_bits(u64::decode(reader)?))
    }

    fn log(&self, sink: &mut LogSink) { write!(sink, "{self}"); }
}

impl Codec for String {
    fn encode<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        encode_len(writer, self.len())?;
        write_all(writer, self.as_bytes())
    }

    fn decode<R: Read + ?Sized>(reader: &mut R) -> Result<Self> {
        let len = decode_len(reader)?;
        utf8(read_bytes(reader, len)?)
    }

    fn log(&self, sink: &mut LogSink) { write!(sink, "{self:?}"); }
}

// =============================================================================
// Wrappers
// =============================================================================

impl<T: Codec> Codec for Option<T> {
    fn encode<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        match self {
            Some(value) => {
                true.encode(writer)?;
                value.encode(writer)
            }
            None => false.encode(writer),
        }
    }

    fn decode<R: Read + ?Sized>(reader: &mut R) -> Result<Self> {
        if bool::decode(reader)? { T::decode(reader).map(Some) } else { Ok(None) }
    }

    fn log(&self, sink: &mut LogSink) {
        match self {
            Some(value) => {
                sink.push_str("Some(");
                value.log(sink);
                sink.push_str(")");
            }
            None => sink.push_str("None"),
        }
    }
}

impl<T: Codec> Codec for Box<T> {
    fn encode<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        (**self).encode(writer)
    }

    fn decode<R: Read + ?Sized>(reader: &mut R) -> Result<Self> {
        T::decode(reader).map(Box::new)
    }

    fn log(&self, sink: &mut LogSink) { (**self).log(sink); }
}

impl Codec for Duration {
    fn encode<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        self.as_secs().encode(writer)?;
        self.subsec_nanos().encode(writer)
    }

    fn decode<R: Read + ?Sized>(reader: &mut R) -> Result<Self> {
        let secs = u64::decode(reader)?;
        let nanos = u32::decode(reader)?;

        if nanos >= 1_000_000_000 {
            return Err(Error::invalid_data(format!(
                "duration nanoseconds {nanos} out of range"
            )));
        }

        Ok(Self::new(secs, nanos))
    }

    fn log(&self, sink: &mut LogSink) { write!(sink, "{self:?}"); }
}

// =============================================================================
// Collections
// =============================================================================

impl<T: Codec> Codec for Vec<T> {
    fn encode<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        encode_len(writer, self.len())?;
        for item in self {
            item.encode(writer)?;
        }
        Ok(())
    }

    fn decode<R: Read + ?Sized>(reader: &mut R) -> Result<Self> {
        let len = decode_len(reader)?;
        let mut items = Self::with_capacity(len.min(MAX_PREALLOCATION));
        for _ in 0..len {
            items.push(T::decode(reader)?);
        }
        Ok(items)
    }

    fn log(&self, sink: &mut LogSink) {
        sink.push_str("[");
        log_separated(sink, self, T::log);
        sink.push_str("]");
    }
}

impl<T: Codec> Codec for VecDeque<T> {
    fn encode<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        encode_len(writer, self.len())?;
        for item in self {
            item.encode(writer)?;
        }
        Ok(())
    }

    fn decode<R: Read + ?Sized>(reader: &mut R) -> Result<Self> {
        let len = decode_len(reader)?;
        let mut items = Self::with_capacity(len.min(MAX_PREALLOCATION));
        for _ in 0..len {
            items.push_back(T::decode(reader)?);
        }
        Ok(items)
    }

    fn log(&self, sink: &mut LogSink) {
        sink.push_str("[");
        log_separated(sink, self, T::log);
        sink.push_str("]");
    }
}

/// Fixed-size arrays carry no prefix; the length is part of the type.
impl<T: Codec, const N: usize> Codec for [T; N] {
    fn encode<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        for item in self {
            item.encode(writer)?;
        }
        Ok(())
    }

    fn decode<R: Read + ?Sized>(reader: &mut R) -> Result<Self> {
        decode_array(reader, T::decode)
    }

    fn log(&self, sink: &mut LogSink) {
        sink.push_str("[");
        log_separated(sink, self, T::log);
        sink.push_str("]");
    }
}

/// Decodes `N` elements with `decode_item` into an array.
pub(crate) fn decode_array<T, R: Read + ?Sized, const N: usize>(
    reader: &mut R,
    mut decode_item: impl FnMut(&mut R) -> Result<T>,
) -> Result<[T; N]> {
    let mut items = Vec::with_capacity(N);
    for _ in 0..N {
        items.push(decode_item(reader)?);
    }

    items.try_into().map_err(|items: Vec<T>| Error::LengthMismatch {
        expected: N,
        found: items.len(),
    })
}

impl<K: Codec + Ord, V: Codec> Codec for BTreeMap<K, V> {
    fn encode<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        encode_len(writer, self.len())?;
        for (key, value) in self {
            key.encode(writer)?;
            value.encode(writer)?;
        }
        Ok(())
    }

    fn decode<R: Read + ?Sized>(reader: &mut R) -> Result<Self> {
        let len = decode_len(reader)?;
        let mut map = Self::new();
        for _ in 0..len {
            let key = K::decode(reader)?;
            let value = V::decode(reader)?;
            if map.insert(key, value).is_some() {
                return Err(Error::invalid_data(format!(
                    "duplicate key in map of {len} entries"
                )));
            }
        }
        Ok(map)
    }

    fn log(&self, sink: &mut LogSink) {
        sink.push_str("{");
        for (index, (key, value)) in self.iter().enumerate() {
            if index > 0 {
                sink.push_str(", ");
            }
            key.log(sink);
            sink.push_str(": ");
            value.log(sink);
        }
        sink.push_str("}");
    }
}

// =============================================================================
// Tuples
// =============================================================================

impl Codec for () {
    fn encode<W: Write + ?Sized>(&self, _writer: &mut W) -> Result<()> {
        Ok(())
    }

    fn decode<R: Read + ?Sized>(_reader: &mut R) -> Result<Self> { Ok(()) }

    fn log(&self, sink: &mut LogSink) { sink.push_str("()"); }
}

macro_rules! impl_codec_tuple {
    ($first:ident $(, $rest:ident)*) => {
        impl<$first: Codec $(, $rest: Codec)*> Codec for ($first, $($rest,)*) {
            #[allow(non_snake_case)]
            fn encode<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
                let ($first, $($rest,)*) = self;
                $first.encode(writer)?;
                $(
                    $rest.encode(writer)?;
                )*
                Ok(())
            }

            fn decode<R: Read + ?Sized>(reader: &mut R) -> Result<Self> {
                Ok(($first::decode(reader)?, $($rest::decode(reader)?,)*))
            }

            #[allow(non_snake_case)]
            fn log(&self, sink: &mut LogSink) {
                let ($first, $($rest,)*) = self;
                sink.push_str("(");
                $first.log(sink);
                $(
                    sink.push_str(", ");
                    $rest.log(sink);
                )*
                sink.push_str(")");
            }
        }
    };
}

impl_codec_tuple!(A);
impl_codec_tuple!(A, B);
impl_codec_tuple!(A, B, C);
impl_codec_tuple!(A, B, C, D);
impl_codec_tuple!(A, B, C, D, E);
impl_codec_tuple!(A, B, C, D, E, F);
impl_codec_tuple!(A, B, C, D, E, F, G);
impl_codec_tuple!(A, B, C, D, E, F, G, H);

#[cfg(test)]
mod test;
