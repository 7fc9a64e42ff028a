//! Section state of the line-oriented `.osu` parser.

/// The section the parser is currently in.
///
/// The parser starts in [`Section::Preamble`] and moves only on bracketed header lines; every
/// header is a valid transition, and headers that are not consumed lead to [`Section::Ignored`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Section {
    /// Before the first header, where the `osu file format vN` line lives.
    #[default]
    Preamble,
    /// `[General]`, `key: value` lines.
    General,
    /// `[Metadata]`, `key:value` lines.
    Metadata,
    /// `[Difficulty]`, `key:value` lines.
    Difficulty,
    /// `[TimingPoints]`, CSV lines.
    TimingPoints,
    /// `[HitObjects]`, CSV lines.
    HitObjects,
    /// Any other section (`[Editor]`, `[Events]`, `[Colours]`, ...).
    Ignored,
}

impl Section {
    /// Recognizes a header line like `[TimingPoints]`. Returns `None` if `line` is not a header.
    ///
    /// Names are compared case-insensitively.
    #[must_use]
    pub fn from_header(line: &str) -> Option<Self> {
        let name = line.strip_prefix('[')?.strip_suffix(']')?.trim();
        Some(match name.to_ascii_lowercase().as_str() {
            "general" => Self::General,
            "metadata" => Self::Metadata,
            "difficulty" => Self::Difficulty,
            "timingpoints" => Self::TimingPoints,
            "hitobjects" => Self::HitObjects,
            _ => Self::Ignored,
        })
    }

    /// The state after reading `line` in this state: a header switches sections, anything else
    /// keeps the current one.
    #[must_use]
    pub fn transition(self, line: &str) -> Self {
        Self::from_header(line).unwrap_or(self)
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Preamble => "preamble",
            Self::General => "[General]",
            Self::Metadata => "[Metadata]",
            Self::Difficulty => "[Difficulty]",
            Self::TimingPoints => "[TimingPoints]",
            Self::HitObjects => "[HitObjects]",
            Self::Ignored => "ignored section",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_switch_state() {
        let state = Section::default();
        let state = state.transition("osu file format v14");
        assert_eq!(state, Section::Preamble);
        let state = state.transition("[General]");
        assert_eq!(state, Section::General);
        let state = state.transition("AudioFilename: audio.mp3");
        assert_eq!(state, Section::General);
        let state = state.transition("[hitobjects]");
        assert_eq!(state, Section::HitObjects);
        let state = state.transition("[Colours]");
        assert_eq!(state, Section::Ignored);
        assert_eq!(state.transition("[ Metadata ]"), Section::Metadata);
    }

    #[test]
    fn non_headers_are_rejected() {
        assert_eq!(Section::from_header("[General"), None);
        assert_eq!(Section::from_header("General]"), None);
        assert_eq!(Section::from_header("256,192,1000,1,0"), None);
    }
}
