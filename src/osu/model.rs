//! Semantic objects of an osu! beatmap, as far as conversion needs them.

use crate::timeline::{Bpm, Timeline};

/// The sentinel used for every metadata text field the beatmap does not define.
pub const UNKNOWN: &str = "Unknown";

/// Hit object type flag marking a hold (long) note.
pub const HOLD_FLAG: u32 = 1 << 7;

/// The playfield width in osu! pixels; mania columns split this evenly.
pub const PLAYFIELD_WIDTH: i32 = 512;

/// Textual information of the beatmap.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Metadata {
    /// `Title` in `[Metadata]`.
    pub title: String,
    /// `Artist` in `[Metadata]`.
    pub artist: String,
    /// `Creator` in `[Metadata]`, the mapper.
    pub creator: String,
    /// `Version` in `[Metadata]`, the difficulty label.
    pub version: String,
    /// `AudioFilename` in `[General]`.
    pub audio_filename: String,
    /// `PreviewTime` in `[General]`, in milliseconds. Negative values mean no preview.
    pub preview_time_ms: Option<u32>,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            title: UNKNOWN.to_string(),
            artist: UNKNOWN.to_string(),
            creator: UNKNOWN.to_string(),
            version: UNKNOWN.to_string(),
            audio_filename: UNKNOWN.to_string(),
            preview_time_ms: None,
        }
    }
}

/// `Mode` in `[General]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GameplayMode {
    /// `0`, also assumed when `Mode` is missing.
    #[default]
    Standard,
    /// `1`.
    Taiko,
    /// `2`.
    Catch,
    /// `3`, the only mode which can be converted.
    Mania,
    /// Any other number.
    Other(i32),
}

impl From<i32> for GameplayMode {
    fn from(value: i32) -> Self {
        match value {
            0 => Self::Standard,
            1 => Self::Taiko,
            2 => Self::Catch,
            3 => Self::Mania,
            other => Self::Other(other),
        }
    }
}

impl From<GameplayMode> for i32 {
    fn from(value: GameplayMode) -> Self {
        match value {
            GameplayMode::Standard => 0,
            GameplayMode::Taiko => 1,
            GameplayMode::Catch => 2,
            GameplayMode::Mania => 3,
            GameplayMode::Other(other) => other,
        }
    }
}

impl std::fmt::Display for GameplayMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Standard => write!(f, "osu!standard (0)"),
            Self::Taiko => write!(f, "osu!taiko (1)"),
            Self::Catch => write!(f, "osu!catch (2)"),
            Self::Mania => write!(f, "osu!mania (3)"),
            Self::Other(mode) => write!(f, "unknown mode ({mode})"),
        }
    }
}

/// A row of `[TimingPoints]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimingPoint {
    /// Start time in milliseconds.
    pub time_ms: f64,
    /// Milliseconds per beat for uninherited points, a negative slider velocity multiplier otherwise.
    pub beat_length: f64,
    /// Beats per measure.
    pub meter: i32,
    /// Default sample set for hit objects.
    pub sample_set: i32,
    /// Custom sample index for hit objects.
    pub sample_index: i32,
    /// Volume percentage for hit objects.
    pub volume: i32,
    /// Whether this point defines a tempo (red line) instead of a scroll velocity (green line).
    pub uninherited: bool,
    /// Bit flags of extra effects.
    pub effects: i32,
}

impl TimingPoint {
    /// The tempo of this point, if it is an uninherited point with positive beat length.
    #[must_use]
    pub fn bpm(&self) -> Option<Bpm> {
        if self.uninherited {
            Bpm::from_beat_length(self.beat_length)
        } else {
            None
        }
    }
}

/// A row of `[HitObjects]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HitObject {
    /// Horizontal position, which selects the column in mania.
    pub x: i32,
    /// Vertical position, unused in mania.
    pub y: i32,
    /// Start time in milliseconds.
    pub time_ms: f64,
    /// Type bit flags, see [`HOLD_FLAG`].
    pub type_flags: u32,
    /// Hit sound bit flags.
    pub hit_sound: i32,
    /// End time in milliseconds, only for holds with a readable end time.
    pub end_time_ms: Option<f64>,
}

impl HitObject {
    /// Whether the type flags mark this object as a hold.
    #[must_use]
    pub const fn is_hold(&self) -> bool {
        self.type_flags & HOLD_FLAG != 0
    }

    /// Mania column of this object for a given key count.
    ///
    /// `floor(clamp(x, 0, 511) / 512 * key_count)`, clamped into `[0, key_count - 1]`.
    #[must_use]
    pub fn column(&self, key_count: u8) -> u8 {
        column_for_x(self.x, key_count)
    }
}

/// Maps an osu! x position into a mania column.
#[must_use]
pub fn column_for_x(x: i32, key_count: u8) -> u8 {
    let keys = key_count.max(1);
    let normalized = f64::from(x.clamp(0, PLAYFIELD_WIDTH - 1)) / f64::from(PLAYFIELD_WIDTH);
    let column = (normalized * f64::from(keys)).floor() as u8;
    column.min(keys - 1)
}

/// A parsed osu! beatmap.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Chart {
    /// Textual information.
    pub metadata: Metadata,
    /// Game mode of the beatmap.
    pub mode: GameplayMode,
    /// Column count, in `[1, 18]`.
    pub key_count: u8,
    /// Accepted uninherited timing points, in file order.
    pub timing_points: Vec<TimingPoint>,
    /// Tempo timeline built from [`Self::timing_points`].
    pub timeline: Timeline,
    /// Hit objects, in file order.
    pub hit_objects: Vec<HitObject>,
}

impl Default for Chart {
    fn default() -> Self {
        Self {
            metadata: Metadata::default(),
            mode: GameplayMode::default(),
            key_count: 4,
            timing_points: Vec::new(),
            timeline: Timeline::fallback(),
            hit_objects: Vec::new(),
        }
    }
}

impl Chart {
    /// Whether this chart is an osu!mania chart.
    #[must_use]
    pub fn is_mania(&self) -> bool {
        self.mode == GameplayMode::Mania
    }
}

/// Key count of a mania chart from its `CircleSize`.
#[must_use]
pub fn key_count_from_circle_size(circle_size: f64) -> u8 {
    if circle_size.is_finite() {
        circle_size.round().clamp(1.0, 18.0) as u8
    } else {
        4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_cover_the_playfield() {
        assert_eq!(column_for_x(0, 4), 0);
        assert_eq!(column_for_x(511, 4), 3);
        assert_eq!(column_for_x(64, 4), 0);
        assert_eq!(column_for_x(192, 4), 1);
        assert_eq!(column_for_x(320, 4), 2);
        assert_eq!(column_for_x(448, 4), 3);
        assert_eq!(column_for_x(-50, 7), 0);
        assert_eq!(column_for_x(9999, 7), 6);
    }

    #[test]
    fn circle_size_is_clamped() {
        assert_eq!(key_count_from_circle_size(4.0), 4);
        assert_eq!(key_count_from_circle_size(6.5), 7);
        assert_eq!(key_count_from_circle_size(0.0), 1);
        assert_eq!(key_count_from_circle_size(40.0), 18);
        assert_eq!(key_count_from_circle_size(f64::NAN), 4);
    }
}
