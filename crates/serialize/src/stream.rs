//! The byte stream capability that serializers drive.
//!
//! A [`Stream`] is anything that can read and write bytes and report where it
//! is. Codecs themselves only need [`Read`] or [`Write`]; the extra position
//! and length queries exist for the mode-switched
//! [`DataSerializer`](crate::DataSerializer) and for callers that step outside
//! per-value dispatch (bulk copies, seeking back to patch a header).
//!
//! Two streams are provided:
//!
//! - [`MemoryStream`]: a growable in-memory buffer.
//! - [`IoStream`]: an adapter over any `Read + Write + Seek`, typically a
//!   [`std::fs::File`].
//!
//! `io::Cursor<Vec<u8>>` also implements [`Stream`].

use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};

use crate::error::Result;

/// Minimal read/write/seek/length contract consumed by the serializers.
///
/// Reading at or past [`length`](Stream::length) must return a short count
/// (zero at the very end) rather than blocking or inventing bytes, so that a
/// decoder can report truncation.
pub trait Stream: Read + Write {
    /// Returns the current offset from the start of the stream.
    fn position(&self) -> u64;

    /// Moves the cursor to `offset` bytes from the start of the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying stream cannot reposition.
    fn seek_to(&mut self, offset: u64) -> Result<()>;

    /// Returns the total number of bytes in the stream.
    fn length(&self) -> u64;

    /// Returns the number of bytes between the cursor and the end.
    fn remaining(&self) -> u64 {
        self.length().saturating_sub(self.position())
    }
}

/// A growable in-memory byte stream.
///
/// Writes at the end grow the buffer, writes before the end overwrite. Seeking
/// past the end is allowed; the gap is zero-filled by the next write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStream {
    data: Vec<u8>,
    position: usize,
}

impl MemoryStream {
    /// Creates an empty stream.
    #[must_use]
    pub const fn new() -> Self { Self { data: Vec::new(), position: 0 } }

    /// Creates an empty stream with room for `capacity` bytes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self { data: Vec::with_capacity(capacity), position: 0 }
    }

    /// Creates a stream over existing bytes, positioned at the start.
    #[must_use]
    pub const fn from_bytes(data: Vec<u8>) -> Self { Self { data, position: 0 } }

    /// Returns every byte in the stream regardless of the cursor.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] { &self.data }

    /// Consumes the stream and returns its buffer.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> { self.data }
}

impl From<Vec<u8>> for MemoryStream {
    fn from(data: Vec<u8>) -> Self { Self::from_bytes(data) }
}

impl Read for MemoryStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        // The cursor may sit past the end after a seek.
        let Some(unread) = self.data.get(self.position..) else {
            return Ok(0);
        };
        let count = buf.len().min(unread.len());

        buf[..count].copy_from_slice(&unread[..count]);
        self.position += count;

        Ok(count)
    }
}

impl Write for MemoryStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.position > self.data.len() {
            self.data.resize(self.position, 0);
        }

        let overlap = (self.data.len() - self.position).min(buf.len());
        self.data[self.position..self.position + overlap]
            .copy_from_slice(&buf[..overlap]);
        self.data.extend_from_slice(&buf[overlap..]);
        self.position += buf.len();

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> { Ok(()) }
}

impl Stream for MemoryStream {
    fn position(&self) -> u64 { self.position as u64 }

    fn seek_to(&mut self, offset: u64) -> Result<()> {
        self.position = usize::try_from(offset).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("offset {offset} exceeds addressable memory"),
            )
        })?;

        Ok(())
    }

    fn length(&self) -> u64 { self.data.len() as u64 }
}

impl Stream for Cursor<Vec<u8>> {
    fn position(&self) -> u64 { Cursor::position(self) }

    fn seek_to(&mut self, offset: u64) -> Result<()> {
        self.set_position(offset);
        Ok(())
    }

    fn length(&self) -> u64 { self.get_ref().len() as u64 }
}

/// Adapts any `Read + Write + Seek` into a [`Stream`].
///
/// Position and length are tracked locally so that the queries do not need
/// mutable access to the inner stream.
///
/// # Example
///
/// ```ignore
/// let file = std::fs::OpenOptions::new()
///     .read(true)
///     .write(true)
///     .create(true)
///     .open("park.sav")?;
/// let mut stream = IoStream::open(file)?;
/// ```
#[derive(Debug)]
pub struct IoStream<T> {
    inner: T,
    position: u64,
    length: u64,
}

impl<T: Read + Write + Seek> IoStream<T> {
    /// Wraps `inner`, measuring its length and keeping its current position.
    ///
    /// # Errors
    ///
    /// Returns an error if the inner stream cannot seek.
    pub fn open(mut inner: T) -> io::Result<Self> {
        let position = inner.stream_position()?;
        let length = inner.seek(SeekFrom::End(0))?;
        inner.seek(SeekFrom::Start(position))?;

        Ok(Self { inner, position, length })
    }
}

impl<T> IoStream<T> {
    /// Returns a reference to the wrapped stream.
    #[must_use]
    pub const fn get_ref(&self) -> &T { &self.inner }

    /// Consumes the adapter and returns the wrapped stream.
    #[must_use]
    pub fn into_inner(self) -> T { self.inner }
}

impl<T: Read> Read for IoStream<T> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let count = self.inner.read(buf)?;
        self.position += count as u64;
        Ok(count)
    }
}

impl<T: Write> Write for IoStream<T> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let count = self.inner.write(buf)?;
        self.position += count as u64;
        self.length = self.length.max(self.position);
        Ok(count)
    }

    fn flush(&mut self) -> io::Result<()> { self.inner.flush() }
}

impl<T: Read + Write + Seek> Stream for IoStream<T> {
    fn position(&self) -> u64 { self.position }

    fn seek_to(&mut self, offset: u64) -> Result<()> {
        self.inner.seek(SeekFrom::Start(offset))?;
        self.position = offset;
        Ok(())
    }

    fn length(&self) -> u64 { self.length }
}

#[cfg(test)]
mod test;
