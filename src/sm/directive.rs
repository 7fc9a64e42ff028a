//! Scanner of `#KEY:value;` directives in `.sm` text.

/// One `#KEY:value;` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive<'a> {
    /// The key, upper-case ASCII letters and digits.
    pub key: &'a str,
    /// The raw value between `:` and `;` (or the end of text), not trimmed.
    pub value: &'a str,
    /// Byte range of the whole directive in the source.
    pub range: std::ops::Range<usize>,
}

/// All directives of a `.sm` file, in source order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Directives<'a> {
    entries: Vec<Directive<'a>>,
}

impl<'a> Directives<'a> {
    /// Scans `source` for directives in one forward pass.
    ///
    /// `//` starts a comment running to the end of the line. Outside comments and values, a `#`
    /// followed by upper-case ASCII letters or digits and a `:` opens a directive; any other `#`
    /// is plain text. The value runs to the next `;`, or to the end of text when the terminator is
    /// missing.
    #[must_use]
    pub fn scan(source: &'a str) -> Self {
        let bytes = source.as_bytes();
        let mut entries = vec![];
        let mut pos = 0;
        while let Some(&byte) = bytes.get(pos) {
            match byte {
                b'/' if bytes.get(pos + 1) == Some(&b'/') => {
                    pos = line_end(bytes, pos);
                }
                b'#' => {
                    let key_start = pos + 1;
                    let key_end = bytes
                        .get(key_start..)
                        .unwrap_or_default()
                        .iter()
                        .position(|b| !(b.is_ascii_uppercase() || b.is_ascii_digit()))
                        .map_or(bytes.len(), |idx| key_start + idx);
                    if key_end == key_start || bytes.get(key_end) != Some(&b':') {
                        // The key bytes are ASCII, none of them can open a comment or directive.
                        pos = key_end;
                        continue;
                    }
                    let value_start = key_end + 1;
                    let value_end = source
                        .get(value_start..)
                        .and_then(|rest| rest.find(';'))
                        .map_or(source.len(), |idx| value_start + idx);
                    entries.push(Directive {
                        key: &source[key_start..key_end],
                        value: &source[value_start..value_end],
                        range: pos..value_end.saturating_add(1).min(source.len()),
                    });
                    pos = value_end.saturating_add(1);
                }
                _ => pos += 1,
            }
        }
        Self { entries }
    }

    /// The last directive with `key`.
    ///
    /// A file with several `#NOTES` blocks therefore yields its last chart.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Directive<'a>> {
        self.entries.iter().rev().find(|directive| directive.key == key)
    }

    /// The trimmed value of the last directive with `key`.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&'a str> {
        self.get(key).map(|directive| directive.value.trim())
    }

    /// Iterates over all directives.
    pub fn iter(&self) -> impl Iterator<Item = &Directive<'a>> {
        self.entries.iter()
    }
}

/// Index just past the newline ending the line at `pos`, or the end of text.
fn line_end(bytes: &[u8], pos: usize) -> usize {
    bytes
        .get(pos..)
        .unwrap_or_default()
        .iter()
        .position(|&b| b == b'\n')
        .map_or(bytes.len(), |idx| pos + idx + 1)
}
