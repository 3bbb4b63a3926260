use core::fmt;

/// Read-only snapshot of finished JSON text.
///
/// Returned by [`JsonStream::finish`](crate::JsonStream::finish), or
/// constructed directly around any already-valid JSON for re-formatting.
/// The view borrows the backing bytes: it must not be read after the
/// underlying buffer is mutated or erased.
#[derive(Debug, Clone, Copy)]
pub struct JsonText<'a> {
    data: &'a str,
}

impl<'a> JsonText<'a> {
    /// Wrap already-built JSON text.
    #[must_use]
    pub const fn new(data: &'a str) -> Self {
        Self { data }
    }

    /// The compact text.
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'a str {
        self.data
    }

    /// Length of the text in bytes.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` for an empty view.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// A [`Display`](core::fmt::Display) adapter reflowing the text with
    /// `indent` spaces per nesting level.
    ///
    /// The reformat is a single left-to-right scan that is quote-aware:
    /// structural characters inside string literals pass through untouched
    /// (a quote preceded by a backslash does not end the literal), and any
    /// pre-existing whitespace outside strings is dropped, so the input's
    /// own formatting is irrelevant. Rendering only; the text is not
    /// re-validated.
    #[must_use]
    pub const fn pretty(&self, indent: usize) -> PrettyJson<'a> {
        PrettyJson {
            text: self.data,
            indent,
        }
    }
}

impl fmt::Display for JsonText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.data)
    }
}

/// Indented renderer returned by [`JsonText::pretty`].
pub struct PrettyJson<'a> {
    text: &'a str,
    indent: usize,
}

impl PrettyJson<'_> {
    fn write_indent(&self, f: &mut fmt::Formatter<'_>, level: usize) -> fmt::Result {
        for _ in 0..level * self.indent {
            f.write_str(" ")?;
        }
        Ok(())
    }
}

impl fmt::Display for PrettyJson<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.text.as_bytes();
        let mut level = 0usize;
        let mut in_quotes = false;
        // Start of the pending pass-through run; runs are cut only at
        // ASCII structural characters, so the slices stay on char
        // boundaries.
        let mut run = 0usize;

        for (i, &c) in bytes.iter().enumerate() {
            if c == b'"' && (i == 0 || bytes[i - 1] != b'\\') {
                in_quotes = !in_quotes;
                continue;
            }
            if in_quotes {
                continue;
            }

            match c {
                b'{' | b'[' => {
                    f.write_str(&self.text[run..=i])?;
                    run = i + 1;
                    f.write_str("\n")?;
                    level += 1;
                    self.write_indent(f, level)?;
                }
                b'}' | b']' => {
                    f.write_str(&self.text[run..i])?;
                    run = i;
                    f.write_str("\n")?;
                    level = level.saturating_sub(1);
                    self.write_indent(f, level)?;
                }
                b',' => {
                    f.write_str(&self.text[run..=i])?;
                    run = i + 1;
                    f.write_str("\n")?;
                    self.write_indent(f, level)?;
                }
                b':' => {
                    f.write_str(&self.text[run..=i])?;
                    run = i + 1;
                    f.write_str(" ")?;
                }
                b' ' | b'\t' | b'\n' | b'\r' => {
                    f.write_str(&self.text[run..i])?;
                    run = i + 1;
                }
                _ => {}
            }
        }

        f.write_str(&self.text[run..])
    }
}
