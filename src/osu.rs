//! The parser module of osu! beatmap (`.osu`) files.
//!
//! Parsing is line-oriented and section-scoped. The parser walks the trimmed lines of the source,
//! keeping an explicit [`Section`] state, and reads only what conversion needs:
//!
//! - `[General]`: `AudioFilename`, `PreviewTime`, `Mode`,
//! - `[Metadata]`: `Title`, `Artist`, `Creator`, `Version`,
//! - `[Difficulty]`: `CircleSize` (the key count in mania),
//! - `[TimingPoints]`: uninherited points with positive beat length,
//! - `[HitObjects]`: taps and holds.
//!
//! A line which cannot be read is skipped and reported as [`OsuWarning::MalformedField`]; parsing
//! never stops on a bad line. Whether the chart can be converted at all is decided afterwards by
//! [`Chart::ensure_mania`].

pub mod line;
pub mod model;
pub mod section;

use thiserror::Error;

use crate::{
    span::{SourceLine, Spanned, SpannedExt, source_lines},
    timeline::Timeline,
};

use self::line::{FieldError, parse_hit_object, parse_number, parse_timing_point, split_key_value};
pub use self::{
    model::{Chart, GameplayMode, HitObject, Metadata, TimingPoint},
    section::Section,
};

/// A non-fatal problem found while parsing a `.osu` file.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum OsuWarning {
    /// The line was skipped because one of its fields could not be read.
    #[error("malformed line in {section}: {reason}")]
    MalformedField {
        /// The section the line belongs to.
        section: Section,
        /// What was wrong with it.
        reason: FieldError,
    },
}

/// An [`OsuWarning`] with the position of the offending line.
pub type OsuWarningWithRange = Spanned<OsuWarning>;

/// The chart is not an osu!mania chart, so it cannot be converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[error("only osu!mania charts are supported, found {0}")]
pub struct UnsupportedMode(pub GameplayMode);

/// Output of parsing a `.osu` file.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[must_use]
pub struct OsuOutput {
    /// The parsed chart.
    pub chart: Chart,
    /// Lines that were skipped.
    pub warnings: Vec<OsuWarningWithRange>,
}

impl Chart {
    /// Checks the chart is an osu!mania chart.
    ///
    /// # Errors
    ///
    /// Returns [`UnsupportedMode`] for any other game mode.
    pub fn ensure_mania(&self) -> Result<(), UnsupportedMode> {
        if self.is_mania() {
            Ok(())
        } else {
            Err(UnsupportedMode(self.mode))
        }
    }
}

/// Parses a `.osu` file from source text.
///
/// # Example
///
/// ```
/// use osu2sm_rs::osu::{GameplayMode, OsuOutput, parse_osu};
///
/// let source = "osu file format v14\n[General]\nMode: 3\n[Difficulty]\nCircleSize:7\n";
/// let OsuOutput { chart, warnings } = parse_osu(source);
/// assert_eq!(chart.mode, GameplayMode::Mania);
/// assert_eq!(chart.key_count, 7);
/// assert_eq!(chart.metadata.title, "Unknown");
/// assert!(warnings.is_empty());
/// ```
pub fn parse_osu(source: &str) -> OsuOutput {
    let mut builder = ChartBuilder::default();
    let mut warnings = vec![];
    let mut section = Section::default();

    for line in source_lines(source) {
        let text = line.text.trim_start_matches('\u{feff}');
        if text.is_empty() || text.starts_with("//") {
            continue;
        }
        if Section::from_header(text).is_some() {
            section = section.transition(text);
            continue;
        }
        if let Err(reason) = builder.read_line(section, text) {
            log::trace!("skipped line {} in {section}: {reason}", line.number);
            warnings.push(OsuWarning::MalformedField { section, reason }.at_line(&line));
        }
    }

    let chart = builder.finish();
    log::debug!(
        "parsed \"{}\" [{}]: {}, {}K, {} timing points, {} hit objects, {} skipped lines",
        chart.metadata.title,
        chart.metadata.version,
        chart.mode,
        chart.key_count,
        chart.timing_points.len(),
        chart.hit_objects.len(),
        warnings.len(),
    );
    OsuOutput { chart, warnings }
}

/// Parses a `.osu` file and rejects it unless it is an osu!mania chart.
///
/// # Errors
///
/// Returns [`UnsupportedMode`] for charts of any other game mode.
pub fn parse_mania(source: &str) -> Result<OsuOutput, UnsupportedMode> {
    let output = parse_osu(source);
    output.chart.ensure_mania()?;
    Ok(output)
}

#[derive(Debug)]
struct ChartBuilder {
    metadata: Metadata,
    mode: GameplayMode,
    circle_size: f64,
    timing_points: Vec<TimingPoint>,
    hit_objects: Vec<HitObject>,
}

impl Default for ChartBuilder {
    fn default() -> Self {
        Self {
            metadata: Metadata::default(),
            mode: GameplayMode::default(),
            circle_size: 4.0,
            timing_points: vec![],
            hit_objects: vec![],
        }
    }
}

impl ChartBuilder {
    fn read_line(&mut self, section: Section, text: &str) -> Result<(), FieldError> {
        match section {
            Section::Preamble | Section::Ignored => Ok(()),
            Section::General => self.read_general(text),
            Section::Metadata => self.read_metadata(text),
            Section::Difficulty => self.read_difficulty(text),
            Section::TimingPoints => {
                let point = parse_timing_point(text)?;
                if point.uninherited {
                    self.timing_points.push(point);
                }
                Ok(())
            }
            Section::HitObjects => {
                self.hit_objects.push(parse_hit_object(text)?);
                Ok(())
            }
        }
    }

    fn read_general(&mut self, text: &str) -> Result<(), FieldError> {
        let (key, value) = split_key_value(text)?;
        match key {
            "AudioFilename" => self.metadata.audio_filename = value.to_string(),
            "PreviewTime" => {
                let preview: i64 = parse_number("PreviewTime", value)?;
                self.metadata.preview_time_ms = u32::try_from(preview).ok();
            }
            "Mode" => self.mode = GameplayMode::from(parse_number::<i32>("Mode", value)?),
            _ => {}
        }
        Ok(())
    }

    fn read_metadata(&mut self, text: &str) -> Result<(), FieldError> {
        let (key, value) = split_key_value(text)?;
        let field = match key {
            "Title" => &mut self.metadata.title,
            "Artist" => &mut self.metadata.artist,
            "Creator" => &mut self.metadata.creator,
            "Version" => &mut self.metadata.version,
            _ => return Ok(()),
        };
        value.clone_into(field);
        Ok(())
    }

    fn read_difficulty(&mut self, text: &str) -> Result<(), FieldError> {
        let (key, value) = split_key_value(text)?;
        if key == "CircleSize" {
            self.circle_size = parse_number("CircleSize", value)?;
        }
        Ok(())
    }

    fn finish(self) -> Chart {
        let key_count = if self.mode == GameplayMode::Mania {
            model::key_count_from_circle_size(self.circle_size)
        } else {
            4
        };
        let timeline = Timeline::from_time_points(
            self.timing_points
                .iter()
                .filter_map(|point| Some((point.time_ms, point.bpm()?))),
        );
        Chart {
            metadata: self.metadata,
            mode: self.mode,
            key_count,
            timing_points: self.timing_points,
            timeline,
            hit_objects: self.hit_objects,
        }
    }
}

/// Looks up the source line of a warning, for callers that render warnings without `ariadne`.
#[must_use]
pub fn warning_line<'a>(source: &'a str, warning: &OsuWarningWithRange) -> Option<SourceLine<'a>> {
    source_lines(source).nth(warning.line().checked_sub(1)?)
}
