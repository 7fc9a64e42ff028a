//! Source positions for line-oriented warnings.
//!
//! - [`Spanned`] attaches a byte range and a 1-based line number to a value.
//! - [`SpannedExt`] provides shorthand constructors so warning enums can be wrapped in place.

/// A value annotated with the source line it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Spanned<T> {
    /// Wrapped content value
    content: T,
    /// Line number in the source text, starts with 1.
    line: usize,
    /// Start byte index in the source string (inclusive)
    start: usize,
    /// End byte index in the source string (exclusive)
    end: usize,
}

impl<T> Spanned<T> {
    /// Instances a new `Spanned`.
    pub const fn new(content: T, line: usize, start: usize, end: usize) -> Self {
        Self {
            content,
            line,
            start,
            end,
        }
    }

    /// Returns the wrapped content.
    pub const fn content(&self) -> &T {
        &self.content
    }

    /// Leans the content out of the wrapper.
    pub fn into_content(self) -> T {
        self.content
    }

    /// Returns the line number, starts with 1.
    pub const fn line(&self) -> usize {
        self.line
    }

    /// Returns the source span as a byte range.
    pub const fn range(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }

    /// Maps the content of the wrapper, keeping its position.
    pub fn map<U, F>(self, f: F) -> Spanned<U>
    where
        F: FnOnce(T) -> U,
    {
        Spanned::new(f(self.content), self.line, self.start, self.end)
    }
}

impl<T: std::fmt::Display> std::fmt::Display for Spanned<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at line {}", self.content, self.line)
    }
}

impl<T: std::error::Error + 'static> std::error::Error for Spanned<T> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.content)
    }
}

/// Extension methods for wrapping any value into [`Spanned`].
pub trait SpannedExt {
    /// Wraps `self` with the position of an already located line.
    fn at_line(self, line: &SourceLine<'_>) -> Spanned<Self>
    where
        Self: Sized,
    {
        Spanned::new(self, line.number, line.start, line.end)
    }
}

impl<T> SpannedExt for T {}

/// A trimmed line of source text together with its location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLine<'a> {
    /// Line number, starts with 1.
    pub number: usize,
    /// Byte index where the trimmed content starts.
    pub start: usize,
    /// Byte index where the trimmed content ends (exclusive).
    pub end: usize,
    /// The trimmed content.
    pub text: &'a str,
}

/// Splits `source` into trimmed lines, tracking byte offsets. CRLF endings are handled.
pub fn source_lines(source: &str) -> impl Iterator<Item = SourceLine<'_>> {
    let mut offset = 0;
    source
        .split_inclusive('\n')
        .enumerate()
        .map(move |(idx, raw)| {
            let line_start = offset;
            offset += raw.len();
            let leading = raw.len() - raw.trim_start().len();
            let text = raw.trim();
            SourceLine {
                number: idx + 1,
                start: line_start + leading,
                end: line_start + leading + text.len(),
                text,
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_offsets_across_crlf() {
        let source = "[General]\r\n  Mode: 3\r\n\r\nlast";
        let lines: Vec<_> = source_lines(source).collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1].text, "Mode: 3");
        assert_eq!(lines[1].number, 2);
        assert_eq!(&source[lines[1].start..lines[1].end], "Mode: 3");
        assert_eq!(lines[2].text, "");
        assert_eq!(lines[3].text, "last");
        assert_eq!(&source[lines[3].start..lines[3].end], "last");
    }

    #[test]
    fn keeps_position_when_mapped() {
        let line = SourceLine {
            number: 7,
            start: 10,
            end: 20,
            text: "",
        };
        let spanned = "bad".at_line(&line).map(str::len);
        assert_eq!(*spanned.content(), 3);
        assert_eq!(spanned.line(), 7);
        assert_eq!(spanned.range(), 10..20);
    }
}
