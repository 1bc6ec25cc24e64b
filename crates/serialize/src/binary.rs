//! Direction-fixed serializers over plain readers and writers.
//!
//! [`BinarySerializer`] is the lightweight counterpart of
//! [`DataSerializer`](crate::DataSerializer): it holds exactly one stream,
//! either an input or an output, and that choice is part of its type. There
//! is no logging and no tag support, which suits call sites where the reader
//! and writer are distinct objects anyway.
//!
//! The same routine can still drive both directions:
//!
//! ```ignore
//! fn sync_header<C: Channel>(s: &mut BinarySerializer<C>, h: &mut Header) -> Result<()> {
//!     s.serialize(&mut h.version)?.serialize(&mut h.flags)?;
//!     Ok(())
//! }
//!
//! sync_header(&mut BinaryWriter::new(&mut file), &mut header)?;
//! sync_header(&mut BinaryReader::new(&bytes[..]), &mut loaded)?;
//! ```

use std::io::{Read, Write};

use crate::{codec::Codec, error::Result};

mod sealed {
    pub trait Sealed {}

    impl<R> Sealed for super::Input<R> {}
    impl<W> Sealed for super::Output<W> {}
}

/// The stream half of a [`BinarySerializer`]: either [`Input`] or [`Output`].
///
/// This trait is sealed; the two implementations are the only directions.
pub trait Channel: sealed::Sealed {
    /// `true` for [`Input`], `false` for [`Output`].
    const IS_READING: bool;

    /// Moves one value across the channel: decodes into `value` for an input,
    /// encodes `value` for an output.
    ///
    /// # Errors
    ///
    /// Propagates the codec's error.
    fn transfer<T: Codec>(&mut self, value: &mut T) -> Result<()>;
}

/// A channel that reads from `R`.
#[derive(Debug)]
pub struct Input<R>(R);

/// A channel that writes to `W`.
#[derive(Debug)]
pub struct Output<W>(W);

impl<R: Read> Channel for Input<R> {
    const IS_READING: bool = true;

    fn transfer<T: Codec>(&mut self, value: &mut T) -> Result<()> {
        *value = T::decode(&mut self.0)?;
        Ok(())
    }
}

impl<W: Write> Channel for Output<W> {
    const IS_READING: bool = false;

    fn transfer<T: Codec>(&mut self, value: &mut T) -> Result<()> {
        value.encode(&mut self.0)
    }
}

/// A serializer whose direction is fixed by its channel type.
#[derive(Debug)]
pub struct BinarySerializer<C> {
    channel: C,
}

/// A [`BinarySerializer`] that decodes from a reader.
pub type BinaryReader<R> = BinarySerializer<Input<R>>;

/// A [`BinarySerializer`] that encodes to a writer.
pub type BinaryWriter<W> = BinarySerializer<Output<W>>;

impl<C: Channel> BinarySerializer<C> {
    /// Decodes into or encodes from `value`, depending on the direction.
    ///
    /// Returns `self` so calls can be chained.
    ///
    /// # Errors
    ///
    /// Returns the codec's error. When reading, `value` is left untouched
    /// if decoding fails.
    pub fn serialize<T: Codec>(&mut self, value: &mut T) -> Result<&mut Self> {
        self.channel.transfer(value)?;
        Ok(self)
    }

    /// Returns `true` if this serializer reads.
    #[must_use]
    pub const fn is_reading(&self) -> bool { C::IS_READING }

    /// Returns `true` if this serializer writes.
    #[must_use]
    pub const fn is_writing(&self) -> bool { !C::IS_READING }
}

impl<R: Read> BinaryReader<R> {
    /// Creates a reading serializer over `reader`.
    pub const fn new(reader: R) -> Self { Self { channel: Input(reader) } }

    /// Decodes and returns the next value.
    ///
    /// # Errors
    ///
    /// Returns the codec's error, including truncation.
    pub fn read<T: Codec>(&mut self) -> Result<T> { T::decode(&mut self.channel.0) }

    /// Returns a reference to the reader.
    #[must_use]
    pub const fn get_ref(&self) -> &R { &self.channel.0 }

    /// Returns a mutable reference to the reader.
    pub fn get_mut(&mut self) -> &mut R { &mut self.channel.0 }

    /// Consumes the serializer and returns the reader.
    #[must_use]
    pub fn into_inner(self) -> R { self.channel.0 }
}

impl<W: Write> BinaryWriter<W> {
    /// Creates a writing serializer over `writer`.
    pub const fn new(writer: W) -> Self { Self { channel: Output(writer) } }

    /// Encodes `value` without requiring mutable access to it.
    ///
    /// # Errors
    ///
    /// Returns the writer's error.
    pub fn write<T: Codec>(&mut self, value: &T) -> Result<&mut Self> {
        value.encode(&mut self.channel.0)?;
        Ok(self)
    }

    /// Returns a reference to the writer.
    #[must_use]
    pub const fn get_ref(&self) -> &W { &self.channel.0 }

    /// Returns a mutable reference to the writer.
    pub fn get_mut(&mut self) -> &mut W { &mut self.channel.0 }

    /// Consumes the serializer and returns the writer.
    #[must_use]
    pub fn into_inner(self) -> W { self.channel.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[derive(Debug, Default, PartialEq)]
    struct Header {
        version: u16,
        name: String,
        checksum: Option<u32>,
    }

    fn sync_header<C: Channel>(
        serializer: &mut BinarySerializer<C>,
        header: &mut Header,
    ) -> Result<()> {
        serializer
            .serialize(&mut header.version)?
            .serialize(&mut header.name)?
            .serialize(&mut header.checksum)?;
        Ok(())
    }

    #[test]
    fn same_routine_writes_and_reads() {
        let mut original = Header {
            version: 7,
            name: "six flags".to_string(),
            checksum: Some(0xC0FF_EE00),
        };

        let mut writer = BinaryWriter::new(Vec::new());
        sync_header(&mut writer, &mut original).unwrap();
        let bytes = writer.into_inner();

        let mut reader = BinaryReader::new(&bytes[..]);
        let mut loaded = Header::default();
        sync_header(&mut reader, &mut loaded).unwrap();

        assert_eq!(loaded, original);
        assert!(reader.get_ref().is_empty());
    }

    #[test]
    fn direction_queries() {
        let reader = BinaryReader::new(&[][..]);
        let writer = BinaryWriter::new(Vec::<u8>::new());

        assert!(reader.is_reading());
        assert!(!reader.is_writing());
        assert!(writer.is_writing());
        assert!(!writer.is_reading());
    }

    #[test]
    fn reader_truncation_keeps_value() {
        let mut reader = BinaryReader::new(&[0u8, 1][..]);
        let mut value = 99u32;

        let err = reader.serialize(&mut value).unwrap_err();

        assert!(matches!(err, Error::Truncated { needed: 4, available: 2 }));
        assert_eq!(value, 99);
    }

    #[test]
    fn read_and_write_helpers() {
        let mut writer = BinaryWriter::new(Vec::new());
        writer.write(&1u8).unwrap().write(&-1i32).unwrap();

        let bytes = writer.into_inner();
        let mut reader = BinaryReader::new(&bytes[..]);

        assert_eq!(reader.read::<u8>().unwrap(), 1);
        assert_eq!(reader.read::<i32>().unwrap(), -1);
        assert!(reader.read::<u8>().unwrap_err().is_truncation());
    }
}
