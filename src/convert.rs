//! Quantization of osu!mania hit objects onto a StepMania note grid.
//!
//! Every hit object is placed by its beat position on the chart's [`Timeline`]:
//!
//! - `measure = floor(beat / 4)`,
//! - `row_in_measure = round((beat mod 4) / 4 * quantization)`, clamped into the measure,
//! - `row = measure * quantization + row_in_measure`.
//!
//! Taps write `1`; holds write `2` on the head row and `3` on the tail row. When two objects hit
//! the same cell, the later one in file order wins.

pub mod directive;
pub mod grid;

use std::num::NonZeroU32;

use num::ToPrimitive;
use thiserror::Error;

use crate::{
    osu::{Chart, UnsupportedMode},
    timeline::Timeline,
};

pub use self::{
    directive::bpm_directive,
    grid::{BEATS_PER_MEASURE, Grid, NoteCell},
};

/// The default number of rows per measure, fine enough for 1/48 snaps.
pub const DEFAULT_QUANTIZATION: NonZeroU32 = match NonZeroU32::new(192) {
    Some(value) => value,
    None => panic!("192 is not zero"),
};

/// The default upper bound of measures in one output chart.
pub const DEFAULT_MAX_MEASURES: u64 = 10_000;

/// Conversion settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConvertOptions {
    /// Rows per measure of the output grid.
    pub quantization: NonZeroU32,
    /// Notes placed at or after this measure are dropped, which bounds the output size.
    pub max_measures: u64,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            quantization: DEFAULT_QUANTIZATION,
            max_measures: DEFAULT_MAX_MEASURES,
        }
    }
}

impl ConvertOptions {
    /// Sets the rows per measure.
    #[must_use]
    pub const fn with_quantization(mut self, quantization: NonZeroU32) -> Self {
        self.quantization = quantization;
        self
    }

    /// Sets the measure limit.
    #[must_use]
    pub const fn with_max_measures(mut self, max_measures: u64) -> Self {
        self.max_measures = max_measures;
        self
    }
}

/// A hit object resolved to its mania column.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HitEvent {
    /// Column index, in `[0, key_count - 1]`.
    pub column: u8,
    /// Start time in milliseconds.
    pub start_time_ms: f64,
    /// End time in milliseconds; present only for holds.
    pub end_time_ms: Option<f64>,
}

impl Chart {
    /// Hit objects resolved to columns, in file order.
    pub fn hit_events(&self) -> impl Iterator<Item = HitEvent> + '_ {
        self.hit_objects.iter().map(|object| HitEvent {
            column: object.column(self.key_count),
            start_time_ms: object.time_ms,
            end_time_ms: object.end_time_ms.filter(|_| object.is_hold()),
        })
    }
}

/// The StepMania game type of the notes block, chosen from the key count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GameType {
    /// `dance-single`, also the fallback for unmapped key counts.
    DanceSingle,
    /// `pump-single`.
    PumpSingle,
    /// `dance-solo`.
    DanceSolo,
    /// `kb7-single`.
    Kb7Single,
    /// `dance-double`.
    DanceDouble,
}

impl GameType {
    /// Picks the game type for a key count.
    #[must_use]
    pub const fn from_key_count(key_count: u8) -> Self {
        match key_count {
            5 => Self::PumpSingle,
            6 => Self::DanceSolo,
            7 | 9 => Self::Kb7Single,
            8 | 10 => Self::DanceDouble,
            _ => Self::DanceSingle,
        }
    }

    /// The label used in the notes block.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DanceSingle => "dance-single",
            Self::PumpSingle => "pump-single",
            Self::DanceSolo => "dance-solo",
            Self::Kb7Single => "kb7-single",
            Self::DanceDouble => "dance-double",
        }
    }
}

impl std::fmt::Display for GameType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-fatal problem found while placing notes.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConvertWarning {
    /// The note lies before beat 0 and has no row.
    #[error("note at {time_ms}ms in column {column} lies before the first measure and was dropped")]
    BeforeFirstMeasure {
        /// The column of the note.
        column: u8,
        /// The time of the note, or of the hold tail.
        time_ms: f64,
    },
    /// The note lies at or beyond the measure limit of [`ConvertOptions::max_measures`].
    #[error("note at {time_ms}ms in column {column} lies beyond the measure limit and was dropped")]
    BeyondLastMeasure {
        /// The column of the note.
        column: u8,
        /// The time of the note, or of the hold tail.
        time_ms: f64,
    },
}

/// Output of converting a chart into a grid.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[must_use]
pub struct ConvertOutput {
    /// The note grid.
    pub grid: Grid,
    /// The `#BPMS` directive.
    pub bpms: String,
    /// Game type of the notes block.
    pub game_type: GameType,
    /// Notes that could not be placed.
    pub warnings: Vec<ConvertWarning>,
}

/// Row of a beat position, or `None` if the beat lies before the first measure or the row
/// number would overflow.
///
/// ```
/// use std::num::NonZeroU32;
/// use osu2sm_rs::convert::beat_to_row;
///
/// let q = NonZeroU32::new(192).unwrap();
/// assert_eq!(beat_to_row(1.0, q), Some(48));
/// assert_eq!(beat_to_row(4.0, q), Some(192));
/// assert_eq!(beat_to_row(-0.5, q), None);
/// ```
#[must_use]
pub fn beat_to_row(beat: f64, quantization: NonZeroU32) -> Option<u64> {
    let quantization = u64::from(quantization.get());
    let measure = (beat / BEATS_PER_MEASURE).floor().to_u64()?;
    let beat_in_measure = beat.rem_euclid(BEATS_PER_MEASURE);
    let row_in_measure = (beat_in_measure / BEATS_PER_MEASURE * quantization as f64)
        .round()
        .to_u64()
        .unwrap_or(0)
        .min(quantization - 1);
    measure
        .checked_mul(quantization)?
        .checked_add(row_in_measure)
}

/// Converts an osu!mania chart into a StepMania grid.
///
/// # Errors
///
/// Returns [`UnsupportedMode`] before any placement if the chart is not an osu!mania chart.
pub fn convert(chart: &Chart, options: &ConvertOptions) -> Result<ConvertOutput, UnsupportedMode> {
    chart.ensure_mania()?;

    let timeline = &chart.timeline;
    if timeline.is_fallback() {
        log::warn!(
            "\"{}\" [{}] has no tempo points, assuming 120 BPM",
            chart.metadata.title,
            chart.metadata.version
        );
    }

    let mut grid = Grid::new(options.quantization, chart.key_count);
    let mut warnings = vec![];
    let row_limit = options
        .max_measures
        .saturating_mul(u64::from(options.quantization.get()));
    let mut place = |time_ms: f64, column: u8, cell: NoteCell| {
        match row_at(timeline, time_ms, options.quantization) {
            Some(row) if row < row_limit => grid.set(row, column, cell),
            Some(_) => warnings.push(ConvertWarning::BeyondLastMeasure { column, time_ms }),
            None => warnings.push(ConvertWarning::BeforeFirstMeasure { column, time_ms }),
        }
    };
    for event in chart.hit_events() {
        match event.end_time_ms {
            Some(end_time_ms) => {
                place(event.start_time_ms, event.column, NoteCell::HoldHead);
                place(end_time_ms, event.column, NoteCell::HoldTail);
            }
            None => place(event.start_time_ms, event.column, NoteCell::Tap),
        }
    }
    if !warnings.is_empty() {
        log::warn!(
            "{} notes lie outside the grid and were dropped",
            warnings.len()
        );
    }

    let game_type = GameType::from_key_count(chart.key_count);
    log::debug!(
        "converted into {} measures of {} rows ({}, {} occupied rows)",
        grid.measure_count(),
        options.quantization,
        game_type,
        grid.occupied_rows(),
    );
    Ok(ConvertOutput {
        bpms: bpm_directive(timeline),
        grid,
        game_type,
        warnings,
    })
}

fn row_at(timeline: &Timeline, time_ms: f64, quantization: NonZeroU32) -> Option<u64> {
    let beat = timeline.time_to_beat(time_ms);
    let row = beat_to_row(beat, quantization);
    log::trace!("{time_ms}ms -> beat {beat:.4} -> row {row:?}");
    row
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_clamp_into_their_measure() {
        let q = NonZeroU32::new(4).unwrap();
        assert_eq!(beat_to_row(0.0, q), Some(0));
        assert_eq!(beat_to_row(3.9, q), Some(3));
        assert_eq!(beat_to_row(4.4, q), Some(4));
        assert_eq!(beat_to_row(f64::NAN, q), None);
    }

    #[test]
    fn game_types() {
        assert_eq!(GameType::from_key_count(4).as_str(), "dance-single");
        assert_eq!(GameType::from_key_count(7).as_str(), "kb7-single");
        assert_eq!(GameType::from_key_count(10).as_str(), "dance-double");
        assert_eq!(GameType::from_key_count(18).as_str(), "dance-single");
    }
}
