//! The mode-switched serializer.
//!
//! A [`DataSerializer`] runs one of three passes over a value, chosen when it
//! is constructed:
//!
//! - **saving**: each value is encoded to the stream;
//! - **loading**: each value is decoded from the stream and stored through
//!   the `&mut` the caller passed in;
//! - **logging**: each value is rendered into a [`LogSink`] and the stream is
//!   left untouched.
//!
//! Because every call site passes `&mut value`, one routine describes a
//! type's layout for all three passes:
//!
//! ```ignore
//! fn sync_park(s: &mut DataSerializer<'_>, park: &mut Park) -> Result<()> {
//!     s.field("name", &mut park.name)?
//!         .serialize_tagged(tag::<Compact, _>(&mut park.guests).labelled("guests"))?;
//!     Ok(())
//! }
//! ```
//!
//! The pass never changes over the serializer's lifetime: a serializer is
//! either saving or loading, and may additionally be logging, in which case
//! the direction is only kept for bookkeeping.

use std::any::type_name;

use bon::Builder;

use crate::{
    codec::Codec,
    error::{Error, Result},
    log::LogSink,
    stream::{MemoryStream, Stream},
    tag::{Marker, Plain, Tag, TagCodec},
};

/// The binary direction of a [`DataSerializer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Values flow from memory to the stream.
    Saving,
    /// Values flow from the stream to memory.
    Loading,
}

/// The pass a [`DataSerializer`] performs on every dispatched value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Encode to the stream.
    Saving,
    /// Decode from the stream.
    Loading,
    /// Render into the log sink.
    Logging,
}

impl From<Direction> for Mode {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Saving => Self::Saving,
            Direction::Loading => Self::Loading,
        }
    }
}

/// Construction options for a [`DataSerializer`].
///
/// # Example
///
/// ```ignore
/// let options = Options::builder()
///     .direction(Direction::Saving)
///     .stream(&mut file_stream)
///     .logging(true)
///     .log_limit(64 * 1024)
///     .build();
///
/// let mut serializer = DataSerializer::from_options(options);
/// ```
#[derive(Builder)]
pub struct Options<'a> {
    /// Whether values are saved or loaded.
    pub direction: Direction,

    /// The stream to drive. When absent the serializer owns a fresh
    /// [`MemoryStream`].
    pub stream: Option<&'a mut dyn Stream>,

    /// Render values into the log sink instead of touching the stream.
    #[builder(default)]
    pub logging: bool,

    /// Maximum number of bytes of log output to keep.
    pub log_limit: Option<usize>,
}

enum Storage<'a> {
    Owned(MemoryStream),
    Borrowed(&'a mut dyn Stream),
}

impl<'a> Storage<'a> {
    fn get(&self) -> &(dyn Stream + 'a) {
        match self {
            Self::Owned(stream) => stream,
            Self::Borrowed(stream) => &**stream,
        }
    }

    fn get_mut(&mut self) -> &mut (dyn Stream + 'a) {
        match self {
            Self::Owned(stream) => stream,
            Self::Borrowed(stream) => &mut **stream,
        }
    }

    const fn is_owned(&self) -> bool { matches!(self, Self::Owned(_)) }
}

/// A serializer whose pass (saving, loading or logging) is fixed at
/// construction.
///
/// The serializer either owns a [`MemoryStream`] or borrows any
/// [`Stream`] for `'a`.
pub struct DataSerializer<'a> {
    storage: Storage<'a>,
    direction: Direction,
    logging: bool,
    sink: LogSink,
}

impl<'a> DataSerializer<'a> {
    fn assemble(
        storage: Storage<'a>,
        direction: Direction,
        logging: bool,
        sink: LogSink,
    ) -> Self {
        let serializer = Self { storage, direction, logging, sink };

        tracing::debug!(
            mode = ?serializer.mode(),
            owned = serializer.storage.is_owned(),
            log_limit = ?serializer.sink.limit(),
            "created data serializer"
        );

        serializer
    }

    /// Creates a non-logging serializer over a fresh, owned
    /// [`MemoryStream`].
    #[must_use]
    pub fn new(direction: Direction) -> Self {
        Self::assemble(
            Storage::Owned(MemoryStream::new()),
            direction,
            false,
            LogSink::new(),
        )
    }

    /// Creates a loading serializer that owns `bytes`.
    #[must_use]
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self::assemble(
            Storage::Owned(MemoryStream::from_bytes(bytes)),
            Direction::Loading,
            false,
            LogSink::new(),
        )
    }

    /// Creates a non-logging serializer over a borrowed stream.
    ///
    /// Values are read or written at the stream's current position.
    pub fn with_stream(direction: Direction, stream: &'a mut dyn Stream) -> Self {
        Self::assemble(
            Storage::Borrowed(stream),
            direction,
            false,
            LogSink::new(),
        )
    }

    /// Creates a serializer from the full set of [`Options`].
    #[must_use]
    pub fn from_options(options: Options<'a>) -> Self {
        let storage = options.stream.map_or_else(
            || Storage::Owned(MemoryStream::new()),
            Storage::Borrowed,
        );
        let sink =
            options.log_limit.map_or_else(LogSink::new, LogSink::with_limit);

        Self::assemble(storage, options.direction, options.logging, sink)
    }

    /// Returns `true` if the direction is [`Direction::Saving`].
    ///
    /// Always the complement of [`is_loading`](Self::is_loading), logging or
    /// not.
    #[must_use]
    pub fn is_saving(&self) -> bool { self.direction == Direction::Saving }

    /// Returns `true` if the direction is [`Direction::Loading`].
    #[must_use]
    pub fn is_loading(&self) -> bool { self.direction == Direction::Loading }

    /// Returns `true` if dispatch renders into the log sink.
    #[must_use]
    pub const fn is_logging(&self) -> bool { self.logging }

    /// Returns the binary direction chosen at construction.
    #[must_use]
    pub const fn direction(&self) -> Direction { self.direction }

    /// Returns the pass performed on every dispatched value.
    #[must_use]
    pub fn mode(&self) -> Mode {
        if self.logging { Mode::Logging } else { Mode::from(self.direction) }
    }

    /// Saves, loads or logs `value` with its default [`Codec`].
    ///
    /// Returns `self` so calls can be chained.
    ///
    /// # Errors
    ///
    /// When saving, returns the stream's error. When loading, returns the
    /// decode error (truncation included) and leaves `value` untouched.
    /// Logging never fails.
    pub fn serialize<T: Codec>(&mut self, value: &mut T) -> Result<&mut Self> {
        let mode = self.mode();
        tracing::trace!(?mode, ty = type_name::<T>(), "serialize");

        match mode {
            Mode::Logging => value.log(&mut self.sink),
            Mode::Saving => value.encode(self.storage.get_mut())?,
            Mode::Loading => {
                let stream = self.storage.get_mut();
                let position = stream.position();

                *value = T::decode(stream).inspect_err(|error| {
                    report_decode_failure(position, type_name::<T>(), error);
                })?;
            }
        }

        Ok(self)
    }

    /// Saves, loads or logs the tagged value with the codec its marker
    /// selects.
    ///
    /// When logging, a labelled tag is rendered as `label = value; `.
    ///
    /// # Errors
    ///
    /// Same as [`serialize`](Self::serialize).
    pub fn serialize_tagged<T: TagCodec<M>, M: Marker>(
        &mut self,
        tag: Tag<'_, T, M>,
    ) -> Result<&mut Self> {
        let mode = self.mode();
        tracing::trace!(
            ?mode,
            ty = type_name::<T>(),
            marker = M::NAME,
            label = tag.label(),
            "serialize tagged"
        );

        match mode {
            Mode::Logging => tag.log(&mut self.sink),
            Mode::Saving => tag.encode(self.storage.get_mut())?,
            Mode::Loading => {
                let stream = self.storage.get_mut();
                let position = stream.position();

                tag.decode_into(stream).inspect_err(|error| {
                    report_decode_failure(position, type_name::<T>(), error);
                })?;
            }
        }

        Ok(self)
    }

    /// Shorthand for a labelled [`Plain`] tag: the default codec, with
    /// `label` shown in log output.
    ///
    /// # Errors
    ///
    /// Same as [`serialize`](Self::serialize).
    pub fn field<T: Codec>(
        &mut self,
        label: &'static str,
        value: &mut T,
    ) -> Result<&mut Self> {
        self.serialize_tagged(Tag::<T, Plain>::new(value).labelled(label))
    }

    /// Returns the underlying stream.
    #[must_use]
    pub fn stream(&self) -> &(dyn Stream + 'a) { self.storage.get() }

    /// Returns the underlying stream for raw access outside per-value
    /// dispatch.
    pub fn stream_mut(&mut self) -> &mut (dyn Stream + 'a) {
        self.storage.get_mut()
    }

    /// Returns the text produced by the logging pass so far.
    #[must_use]
    pub fn log_output(&self) -> &str { self.sink.as_str() }

    /// Takes the log sink, leaving an empty one with the same limit.
    pub fn take_log(&mut self) -> LogSink {
        let fresh =
            self.sink.limit().map_or_else(LogSink::new, LogSink::with_limit);
        std::mem::replace(&mut self.sink, fresh)
    }

    /// Consumes the serializer and returns the bytes of an owned stream.
    ///
    /// Returns `None` if the stream was borrowed.
    #[must_use]
    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self.storage {
            Storage::Owned(stream) => Some(stream.into_bytes()),
            Storage::Borrowed(_) => None,
        }
    }
}

impl std::fmt::Debug for DataSerializer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stream = self.storage.get();

        f.debug_struct("DataSerializer")
            .field("mode", &self.mode())
            .field("direction", &self.direction)
            .field("owned", &self.storage.is_owned())
            .field("position", &stream.position())
            .field("length", &stream.length())
            .finish_non_exhaustive()
    }
}

fn report_decode_failure(position: u64, ty: &str, error: &Error) {
    tracing::debug!(position, ty, %error, "failed to decode value");
}
