//! The text sink written to by the logging pass.

use std::fmt::{self, Write as _};

/// Marker appended once when a limited sink runs out of room.
const TRUNCATION_MARKER: &str = "…";

/// An infallible, optionally bounded text buffer.
///
/// [`Codec::log`](crate::Codec::log) implementations write into a `LogSink`
/// with the usual `write!` macro. The sink provides an inherent `write_fmt`
/// returning `()`, so there is no `Result` to handle: a diagnostic dump can
/// never abort a pass.
///
/// When created with [`with_limit`](LogSink::with_limit), output beyond the
/// limit is dropped and a single `…` is appended in its place.
///
/// # Example
///
/// ```ignore
/// let mut sink = LogSink::new();
/// write!(sink, "speed = {}", 42);
/// assert_eq!(sink.as_str(), "speed = 42");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogSink {
    buffer: String,
    limit: Option<usize>,
    truncated: bool,
}

impl LogSink {
    /// Creates an unbounded sink.
    #[must_use]
    pub const fn new() -> Self {
        Self { buffer: String::new(), limit: None, truncated: false }
    }

    /// Creates a sink that keeps at most `max_bytes` bytes of output.
    #[must_use]
    pub const fn with_limit(max_bytes: usize) -> Self {
        Self { buffer: String::new(), limit: Some(max_bytes), truncated: false }
    }

    /// Appends formatted text. Used by `write!`.
    pub fn write_fmt(&mut self, args: fmt::Arguments<'_>) {
        // `Adapter` never reports an error, so the result carries nothing.
        let _ = Adapter(self).write_fmt(args);
    }

    /// Appends a string slice.
    pub fn push_str(&mut self, s: &str) {
        if self.truncated {
            return;
        }

        let Some(limit) = self.limit else {
            self.buffer.push_str(s);
            return;
        };

        let room = limit.saturating_sub(self.buffer.len());
        if s.len() <= room {
            self.buffer.push_str(s);
            return;
        }

        let mut cut = room;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }

        self.buffer.push_str(&s[..cut]);
        self.buffer.push_str(TRUNCATION_MARKER);
        self.truncated = true;
    }

    /// Returns the text written so far.
    #[must_use]
    pub fn as_str(&self) -> &str { &self.buffer }

    /// Consumes the sink and returns its text.
    #[must_use]
    pub fn into_string(self) -> String { self.buffer }

    /// Returns the byte limit, if any.
    #[must_use]
    pub const fn limit(&self) -> Option<usize> { self.limit }

    /// Returns `true` if output was dropped because of the limit.
    #[must_use]
    pub const fn is_truncated(&self) -> bool { self.truncated }

    /// Returns `true` if nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.buffer.is_empty() }

    /// Discards all text, keeping the limit.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.truncated = false;
    }
}

impl fmt::Display for LogSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.buffer)
    }
}

struct Adapter<'a>(&'a mut LogSink);

impl fmt::Write for Adapter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.push_str(s);
        Ok(())
    }
}

/// Writes `items` separated by `", "`, each rendered by `render`.
///
/// Shared by the sequence codecs so every collection logs the same way.
pub(crate) fn log_separated<'a, T: 'a>(
    sink: &mut LogSink,
    items: impl IntoIterator<Item = &'a T>,
    mut render: impl FnMut(&T, &mut LogSink),
) {
    for (index, item) in items.into_iter().enumerate() {
        if index > 0 {
            sink.push_str(", ");
        }
        render(item, sink);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_macro_is_infallible() {
        let mut sink = LogSink::new();

        write!(sink, "x = {}; ", 1);
        write!(sink, "y = {:?}", "two");

        assert_eq!(sink.as_str(), "x = 1; y = \"two\"");
        assert!(!sink.is_truncated());
    }

    #[test]
    fn limit_cuts_at_char_boundary() {
        let mut sink = LogSink::with_limit(4);

        sink.push_str("ab");
        sink.push_str("cé");
        sink.push_str("ignored");

        assert_eq!(sink.as_str(), "abc…");
        assert!(sink.is_truncated());
    }

    #[test]
    fn clear_resets_truncation() {
        let mut sink = LogSink::with_limit(1);

        sink.push_str("abc");
        sink.clear();
        sink.push_str("z");

        assert_eq!(sink.as_str(), "z");
        assert!(!sink.is_truncated());
    }
}
