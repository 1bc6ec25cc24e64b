//! Tandem Serialization Library
//!
//! One piece of per-type codec logic, three passes: writing a value to a byte
//! stream, reading it back, and rendering it as human-readable text for
//! diagnostics.
//!
//! # Overview
//!
//! - [`Codec`]: the per-type contract (`encode`, `decode`, `log`).
//! - [`Tag`] and [`TagCodec`]: pick an alternative codec for one value at the
//!   call site, such as a `u16` length prefix or LEB128 varints.
//! - [`BinaryReader`] / [`BinaryWriter`]: direction-fixed serializers over
//!   any reader or writer.
//! - [`DataSerializer`]: a serializer whose pass (saving, loading or logging)
//!   is chosen at construction, so one routine describes a layout for all
//!   three.
//! - [`Stream`]: the byte stream the mode-switched serializer drives, with
//!   [`MemoryStream`] and [`IoStream`] provided.
//!
//! # Derive Macro
//!
//! `#[derive(Codec)]` implements [`Codec`] field by field:
//!
//! ```ignore
//! #[derive(Codec)]
//! struct Guest {
//!     name: String,
//!     #[codec(with = Compact)]
//!     cash: i32,
//!     #[codec(skip)]
//!     thoughts: Vec<Thought>, // Default::default() when decoding
//! }
//!
//! #[derive(Codec)]
//! enum Weather {
//!     Sunny,
//!     Rain { heavy: bool },
//! }
//! ```
//!
//! # Example
//!
//! ```ignore
//! struct Park { name: String, guests: u32, entrance_fee: u16 }
//!
//! fn sync_park(s: &mut DataSerializer<'_>, park: &mut Park) -> Result<()> {
//!     s.field("name", &mut park.name)?
//!         .serialize_tagged(tag::<Compact, _>(&mut park.guests).labelled("guests"))?
//!         .field("entrance_fee", &mut park.entrance_fee)?;
//!     Ok(())
//! }
//!
//! let mut saver = DataSerializer::new(Direction::Saving);
//! sync_park(&mut saver, &mut park)?;
//! let bytes = saver.into_bytes().unwrap();
//!
//! let mut loader = DataSerializer::from_bytes(bytes);
//! sync_park(&mut loader, &mut loaded)?;
//! ```

// Allow derive macros to reference this crate as `tandem_serialize` internally
extern crate self as tandem_serialize;

pub mod binary;
pub mod codec;
pub mod error;
pub mod log;
pub mod serializer;
pub mod stream;
pub mod tag;

// Re-export main traits and types at the crate root for convenience
pub use binary::{BinaryReader, BinarySerializer, BinaryWriter, Channel};
pub use codec::{Codec, from_bytes, to_bytes, to_log_string};
pub use error::{Error, Result};
pub use log::LogSink;
pub use serializer::{DataSerializer, Direction, Mode, Options};
pub use stream::{IoStream, MemoryStream, Stream};
pub use tag::{
    BitPacked, Compact, LengthPrefixed, Marker, Plain, Tag, TagCodec, tag,
};
// Re-export derive macro
pub use tandem_serialize_derive::Codec;
