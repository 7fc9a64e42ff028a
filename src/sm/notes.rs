//! Reconstruction of a timed note stream from `.sm` text.
//!
//! Raw `.sm` text == [`Directives::scan`] ==> `#BPMS`, `#OFFSET`, `#NOTES` == [`parse_note_stream`]
//! ==> [`NoteEvent`]s (in [`NoteStreamOutput`])
//!
//! Rows are timed through a [`Timeline`] rebuilt from `#BPMS`, one event per row holding a
//! bitmask of the columns with a tap or a hold head. Events are sorted, deduplicated by time and
//! finally thinned by the [`DensityFilter`].

pub mod density;

use std::collections::BTreeSet;

use thiserror::Error;

use super::directive::Directives;
use crate::{
    convert::BEATS_PER_MEASURE,
    timeline::{Bpm, Timeline},
};

pub use self::density::DensityFilter;

/// Maximum column count of a [`NoteEvent`] bitmask.
pub const MAX_COLUMNS: usize = 32;

/// One row of the note stream.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NoteEvent {
    /// Bit `i` is set when column `i` has a tap or a hold head in this row.
    pub bitmask: u32,
    /// Absolute time of the row, in seconds.
    pub time_seconds: f64,
}

impl NoteEvent {
    /// Number of notes in this row.
    #[must_use]
    pub const fn note_count(&self) -> u32 {
        self.bitmask.count_ones()
    }

    /// Whether column `column` has a note in this row.
    #[must_use]
    pub const fn has_column(&self, column: usize) -> bool {
        column < MAX_COLUMNS && self.bitmask & (1 << column) != 0
    }
}

/// Tunables of [`parse_note_stream`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NoteStreamConfig {
    /// Rows with more characters than this are treated as corrupt and skipped.
    pub max_row_width: usize,
    /// Length of the density-artifact window, in seconds.
    pub density_window_seconds: f64,
    /// Maximum notes admitted within one density-artifact window.
    pub density_limit: u32,
    /// `#BPMS` values above this are replaced by 120.
    pub max_bpm: f64,
    /// Events at or after this time are dropped, in seconds.
    pub max_time_seconds: f64,
}

impl Default for NoteStreamConfig {
    fn default() -> Self {
        Self {
            max_row_width: 100,
            density_window_seconds: 0.1,
            density_limit: 300,
            max_bpm: 1000.0,
            max_time_seconds: 3600.0,
        }
    }
}

impl NoteStreamConfig {
    /// Sets the corrupt row width.
    #[must_use]
    pub const fn with_max_row_width(mut self, max_row_width: usize) -> Self {
        self.max_row_width = max_row_width;
        self
    }

    /// Sets the density-artifact window and its note limit.
    #[must_use]
    pub const fn with_density(mut self, window_seconds: f64, limit: u32) -> Self {
        self.density_window_seconds = window_seconds;
        self.density_limit = limit;
        self
    }

    /// Sets the time limit of events.
    #[must_use]
    pub const fn with_max_time_seconds(mut self, max_time_seconds: f64) -> Self {
        self.max_time_seconds = max_time_seconds;
        self
    }

    /// Sets the suspicious tempo threshold.
    #[must_use]
    pub const fn with_max_bpm(mut self, max_bpm: f64) -> Self {
        self.max_bpm = max_bpm;
        self
    }
}

/// A non-fatal problem found while reconstructing the note stream.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NoteStreamWarning {
    /// `#BPMS` is missing or has no usable entry; 120 BPM from beat 0 is assumed.
    #[error("no usable `#BPMS`, assuming 120 BPM")]
    MissingTimeline,
    /// A `#BPMS` entry was not `beat=bpm`.
    #[error("invalid `#BPMS` entry {0:?}")]
    InvalidBpmEntry(String),
    /// A `#BPMS` tempo was out of range and replaced by 120.
    #[error("suspicious tempo {bpm} at beat {beat}, using 120 instead")]
    SuspiciousBpm {
        /// The beat of the entry.
        beat: f64,
        /// The rejected tempo.
        bpm: f64,
    },
    /// `#OFFSET` did not parse; 0 is assumed.
    #[error("invalid `#OFFSET` {0:?}, assuming 0")]
    InvalidOffset(String),
    /// There is no `#NOTES` directive.
    #[error("no `#NOTES` section")]
    MissingNotesSection,
    /// `#NOTES` has no note data.
    #[error("empty `#NOTES` section")]
    EmptyNotesSection,
    /// A row exceeded [`NoteStreamConfig::max_row_width`] and was skipped.
    #[error("corrupt row {row} of measure {measure}: {width} columns")]
    CorruptRow {
        /// Measure index, from 0.
        measure: usize,
        /// Row index in the measure, from 0.
        row: usize,
        /// Character count of the row.
        width: usize,
    },
    /// A hold was never closed by a tail.
    #[error("hold in column {column} has no tail")]
    UnclosedLongNote {
        /// Column index.
        column: usize,
    },
}

/// Counters of what the parser saw and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NoteStreamStats {
    /// Rows read from the notes section, including empty and corrupt ones.
    pub rows: usize,
    /// Tap notes (`1`).
    pub taps: usize,
    /// Hold heads (`2`).
    pub long_notes_opened: usize,
    /// Hold tails (`3`) which closed an open hold.
    pub long_notes_closed: usize,
    /// Events dropped for sharing the time of the previous event.
    pub duplicates_dropped: usize,
    /// Events dropped for a negative time or a time beyond the limit.
    pub out_of_range_dropped: usize,
    /// Events dropped by the density-artifact filter.
    pub artifacts_dropped: usize,
}

/// Output of [`parse_note_stream`].
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[must_use]
pub struct NoteStreamOutput {
    /// Time-ordered events, ready for scoring.
    pub events: Vec<NoteEvent>,
    /// Problems found on the way.
    pub warnings: Vec<NoteStreamWarning>,
    /// Counters.
    pub stats: NoteStreamStats,
}

/// Reconstructs the note stream of a `.sm` file.
///
/// Never fails: missing pieces fall back to defaults, and a missing or empty `#NOTES` yields an
/// empty stream, both flagged in [`NoteStreamOutput::warnings`].
///
/// # Example
///
/// ```
/// use osu2sm_rs::sm::{NoteStreamConfig, parse_note_stream};
///
/// let source = "#OFFSET:0;\n#BPMS:0=120;\n#NOTES:\n dance-single:\n :\n Challenge:\n 1:\n 0,0,0,0,0:\n1000\n0100\n0020\n0030\n;";
/// let output = parse_note_stream(source, &NoteStreamConfig::default());
/// let times: Vec<_> = output.events.iter().map(|ev| (ev.bitmask, ev.time_seconds)).collect();
/// assert_eq!(times, vec![(0b0001, 0.0), (0b0010, 0.5), (0b0100, 1.0)]);
/// ```
pub fn parse_note_stream(source: &str, config: &NoteStreamConfig) -> NoteStreamOutput {
    let directives = Directives::scan(source);
    let mut output = NoteStreamOutput::default();

    let timeline = parse_timeline(directives.value("BPMS"), config, &mut output.warnings);
    let offset_seconds = match directives.value("OFFSET") {
        None => 0.0,
        Some(raw) => raw.parse::<f64>().ok().filter(|offset| offset.is_finite()).unwrap_or_else(|| {
            output.warnings.push(NoteStreamWarning::InvalidOffset(raw.to_string()));
            0.0
        }),
    };

    let Some(notes) = directives.value("NOTES") else {
        log::warn!("no notes section found");
        output.warnings.push(NoteStreamWarning::MissingNotesSection);
        return output;
    };
    let measures = split_measures(note_data(notes));
    if measures.iter().all(Vec::is_empty) {
        log::warn!("empty notes section");
        output.warnings.push(NoteStreamWarning::EmptyNotesSection);
        return output;
    }
    log::debug!(
        "{} measures, {} tempo segments, offset {offset_seconds}",
        measures.len(),
        timeline.segments().len()
    );

    let mut events = vec![];
    let mut open_holds = BTreeSet::new();
    for (measure_idx, rows) in measures.iter().enumerate() {
        let rows_in_measure = rows.len();
        for (row_idx, row) in rows.iter().enumerate() {
            output.stats.rows += 1;
            let width = row.chars().count();
            if width > config.max_row_width {
                output.warnings.push(NoteStreamWarning::CorruptRow {
                    measure: measure_idx,
                    row: row_idx,
                    width,
                });
                continue;
            }
            let bitmask = read_row(row, &mut open_holds, &mut output.stats);
            if bitmask == 0 {
                continue;
            }
            let beat_in_measure = BEATS_PER_MEASURE * row_idx as f64 / rows_in_measure as f64;
            let beat = measure_idx as f64 * BEATS_PER_MEASURE + beat_in_measure;
            let time_seconds = timeline.beat_to_time(beat) / 1000.0 - offset_seconds;
            if !(0.0..config.max_time_seconds).contains(&time_seconds) {
                output.stats.out_of_range_dropped += 1;
                continue;
            }
            events.push(NoteEvent {
                bitmask,
                time_seconds,
            });
        }
    }
    output.warnings.extend(
        open_holds
            .into_iter()
            .map(|column| NoteStreamWarning::UnclosedLongNote { column }),
    );

    events.sort_by(|a, b| a.time_seconds.total_cmp(&b.time_seconds));
    let before_dedup = events.len();
    events.dedup_by(|later, earlier| later.time_seconds.total_cmp(&earlier.time_seconds).is_eq());
    output.stats.duplicates_dropped = before_dedup - events.len();

    let mut filter = DensityFilter::new(config.density_window_seconds, config.density_limit);
    for event in events {
        if filter.admit(&event) {
            output.events.push(event);
        } else {
            log::trace!(
                "high note density at {:.3}s, dropped as conversion artifact",
                event.time_seconds
            );
            output.stats.artifacts_dropped += 1;
        }
    }
    if output.stats.artifacts_dropped > 0 {
        log::warn!(
            "dropped {} events as suspected conversion artifacts",
            output.stats.artifacts_dropped
        );
    }
    if let (Some(first), Some(last)) = (output.events.first(), output.events.last()) {
        let length = last.time_seconds - first.time_seconds;
        log::debug!(
            "{} events from {:.3}s to {:.3}s",
            output.events.len(),
            first.time_seconds,
            last.time_seconds
        );
        if length > 1800.0 {
            log::warn!("very long chart ({length:.1}s), the timing may be broken");
        }
    }
    output
}

fn parse_timeline(
    bpms: Option<&str>,
    config: &NoteStreamConfig,
    warnings: &mut Vec<NoteStreamWarning>,
) -> Timeline {
    let mut points = vec![];
    for entry in bpms.unwrap_or_default().split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let parsed = entry.split_once('=').and_then(|(beat, bpm)| {
            let beat = beat.trim().parse::<f64>().ok().filter(|b| b.is_finite())?;
            let bpm = bpm.trim().parse::<f64>().ok().filter(|b| !b.is_nan())?;
            Some((beat, bpm))
        });
        let Some((beat, bpm)) = parsed else {
            log::warn!("invalid tempo entry {entry:?}");
            warnings.push(NoteStreamWarning::InvalidBpmEntry(entry.to_string()));
            continue;
        };
        let bpm = match Bpm::new(bpm).filter(|valid| valid.as_f64() <= config.max_bpm) {
            Some(valid) => valid,
            None => {
                log::warn!("suspicious tempo {bpm} at beat {beat}, using 120 instead");
                warnings.push(NoteStreamWarning::SuspiciousBpm { beat, bpm });
                Bpm::FALLBACK
            }
        };
        points.push((beat, bpm));
    }
    let timeline = Timeline::from_beat_points(points);
    if timeline.is_fallback() {
        log::warn!("no tempo found, using default 120 BPM");
        warnings.push(NoteStreamWarning::MissingTimeline);
    }
    timeline
}

/// Skips the five `:`-terminated metadata fields of a `#NOTES` value.
fn note_data(notes: &str) -> &str {
    let fields: Vec<&str> = notes.splitn(6, ':').collect();
    match fields.as_slice() {
        [_, _, _, _, _, data] => data,
        _ => notes,
    }
}

/// Splits note data into measures of trimmed rows, dropping comments and blank lines.
fn split_measures(data: &str) -> Vec<Vec<&str>> {
    let mut measures = vec![vec![]];
    for line in data.lines() {
        let line = line.split("//").next().unwrap_or_default();
        for (idx, piece) in line.split(',').enumerate() {
            if idx > 0 {
                measures.push(vec![]);
            }
            let row = piece.trim();
            if !row.is_empty()
                && let Some(current) = measures.last_mut()
            {
                current.push(row);
            }
        }
    }
    if measures.len() > 1 && measures.last().is_some_and(Vec::is_empty) {
        measures.pop();
    }
    measures
}

/// Reads one row into a bitmask, updating the open holds and counters.
fn read_row(row: &str, open_holds: &mut BTreeSet<usize>, stats: &mut NoteStreamStats) -> u32 {
    let mut bitmask = 0;
    for (column, cell) in row.chars().take(MAX_COLUMNS).enumerate() {
        match cell {
            '1' => {
                bitmask |= 1 << column;
                stats.taps += 1;
            }
            '2' => {
                bitmask |= 1 << column;
                stats.long_notes_opened += 1;
                open_holds.insert(column);
            }
            '3' => {
                if open_holds.remove(&column) {
                    stats.long_notes_closed += 1;
                }
            }
            _ => {}
        }
    }
    bitmask
}
