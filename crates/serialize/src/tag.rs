//! Call-site selection of alternative codecs.
//!
//! A [`Tag`] wraps a mutable borrow of a value together with a zero-sized
//! [`Marker`] type. Passing the tag to
//! [`DataSerializer::serialize_tagged`](crate::DataSerializer::serialize_tagged)
//! routes the value through [`TagCodec<M>`] instead of its default [`Codec`],
//! without changing the value's type. The marker is part of the tag's type, so
//! the codec is chosen at compile time: a `(T, M)` pair without a `TagCodec`
//! implementation does not compile.
//!
//! # Markers
//!
//! | marker | effect |
//! | --- | --- |
//! | [`Plain`] | the default codec; useful to attach a log label |
//! | [`LengthPrefixed`] | `u16` length prefix on sequences and strings |
//! | [`Compact`] | LEB128 varints for integers and lengths |
//! | [`BitPacked`] | booleans packed eight to a byte |
//!
//! # Example
//!
//! ```ignore
//! let mut peeps: Vec<u32> = vec![1, 2, 3];
//! serializer.serialize_tagged(tag::<LengthPrefixed, _>(&mut peeps).labelled("peeps"))?;
//! ```

use std::{
    io::{Read, Write},
    marker::PhantomData,
};

use crate::{codec::Codec, error::Result, log::LogSink};

mod compact;
mod packed;
mod prefixed;

/// A type-level selector for an alternative codec.
pub trait Marker: 'static {
    /// Short name of the encoding, used in traces.
    const NAME: &'static str;
}

/// Selects the type's default [`Codec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Plain;

/// Sequences and strings carry a `u16` length prefix; fixed-size arrays gain
/// one and have it checked on decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LengthPrefixed;

/// Integers and lengths are written as LEB128 varints, signed integers
/// zigzag-encoded first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Compact;

/// Booleans are packed eight to a byte, least significant bit first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BitPacked;

impl Marker for Plain {
    const NAME: &'static str = "plain";
}

impl Marker for LengthPrefixed {
    const NAME: &'static str = "length-prefixed";
}

impl Marker for Compact {
    const NAME: &'static str = "compact";
}

impl Marker for BitPacked {
    const NAME: &'static str = "bit-packed";
}

/// The codec contract for a value of type `Self` under marker `M`.
///
/// Mirrors [`Codec`] and carries the same round-trip and totality
/// requirements.
pub trait TagCodec<M: Marker>: Sized {
    /// Writes this value using the `M` layout.
    ///
    /// # Errors
    ///
    /// Returns an error if the writer fails or the value cannot be
    /// represented in this layout.
    fn encode_tagged<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()>;

    /// Reads a value written with the `M` layout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Truncated`](crate::Error::Truncated) on a short
    /// stream and [`Error::InvalidData`](crate::Error::InvalidData) on
    /// malformed bytes.
    fn decode_tagged<R: Read + ?Sized>(reader: &mut R) -> Result<Self>;

    /// Renders this value for diagnostics.
    fn log_tagged(&self, sink: &mut LogSink);
}

impl<T: Codec> TagCodec<Plain> for T {
    fn encode_tagged<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        self.encode(writer)
    }

    fn decode_tagged<R: Read + ?Sized>(reader: &mut R) -> Result<Self> {
        T::decode(reader)
    }

    fn log_tagged(&self, sink: &mut LogSink) { self.log(sink); }
}

/// A non-owning annotation selecting the `M` codec for one value.
///
/// The tag holds the only mutable borrow of the value for as long as it
/// lives and is consumed by the dispatch call that receives it.
pub struct Tag<'a, T, M> {
    value: &'a mut T,
    label: Option<&'static str>,
    marker: PhantomData<fn() -> M>,
}

impl<'a, T, M: Marker> Tag<'a, T, M> {
    /// Wraps `value` for the `M` codec.
    pub const fn new(value: &'a mut T) -> Self {
        Self { value, label: None, marker: PhantomData }
    }

    /// Attaches a name shown in log output as `name = value; `.
    #[must_use]
    pub fn labelled(mut self, label: &'static str) -> Self {
        self.label = Some(label);
        self
    }

    /// Returns the label, if any.
    #[must_use]
    pub const fn label(&self) -> Option<&'static str> { self.label }

    /// Returns the wrapped value.
    #[must_use]
    pub const fn value(&self) -> &T { &*self.value }
}

impl<T: TagCodec<M>, M: Marker> Tag<'_, T, M> {
    /// Encodes the wrapped value with the `M` codec.
    ///
    /// # Errors
    ///
    /// See [`TagCodec::encode_tagged`].
    pub fn encode<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        <T as TagCodec<M>>::encode_tagged(&*self.value, writer)
    }

    /// Decodes a value with the `M` codec and stores it in the wrapped
    /// location.
    ///
    /// The destination is only overwritten once the whole value has been
    /// read.
    ///
    /// # Errors
    ///
    /// See [`TagCodec::decode_tagged`].
    pub fn decode_into<R: Read + ?Sized>(self, reader: &mut R) -> Result<()> {
        *self.value = <T as TagCodec<M>>::decode_tagged(reader)?;
        Ok(())
    }

    /// Logs the wrapped value, prefixed by its label when one is set.
    pub fn log(&self, sink: &mut LogSink) {
        match self.label {
            Some(label) => {
                write!(sink, "{label} = ");
                <T as TagCodec<M>>::log_tagged(&*self.value, sink);
                sink.push_str("; ");
            }
            None => <T as TagCodec<M>>::log_tagged(&*self.value, sink),
        }
    }
}

impl<T: std::fmt::Debug, M: Marker> std::fmt::Debug for Tag<'_, T, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tag")
            .field("marker", &M::NAME)
            .field("label", &self.label)
            .field("value", &self.value)
            .finish()
    }
}

/// Shorthand for [`Tag::new`] with the marker named first.
///
/// ```ignore
/// serializer.serialize_tagged(tag::<Compact, _>(&mut guest_count))?;
/// ```
pub const fn tag<M: Marker, T>(value: &mut T) -> Tag<'_, T, M> {
    Tag::new(value)
}

#[cfg(test)]
mod test;
