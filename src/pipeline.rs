//! File-level conversion: `.osu` in, `.sm` out, and the way back to a scored note stream.
//!
//! Every function here handles one chart. Failures are returned as [`ConvertError`] so that a
//! batch of charts can report them one by one without stopping.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::{
    calc::{CalcError, Calculator, DifficultyEngine, MusicRate, ScoreGoal, Skillsets},
    convert::{ConvertOptions, ConvertWarning, convert},
    osu::{Chart, OsuOutput, OsuWarningWithRange, UnsupportedMode, parse_mania},
    sm::{NoteStreamConfig, NoteStreamOutput, parse_note_stream, to_sm_string},
};

/// Why a chart could not be converted.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The chart is not an osu!mania chart.
    #[error(transparent)]
    UnsupportedMode(#[from] UnsupportedMode),
    /// The input file does not exist.
    #[error("input file not found: {}", .0.display())]
    InputNotFound(PathBuf),
    /// Reading or writing a file failed.
    #[error("failed to access {}: {source}", path.display())]
    Io {
        /// The file being accessed.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },
}

/// What was converted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConversionSummary {
    /// Title of the song.
    pub title: String,
    /// Artist of the song.
    pub artist: String,
    /// Difficulty name.
    pub version: String,
    /// Column count.
    pub key_count: u8,
    /// Number of hit objects in the source.
    pub hit_objects: usize,
    /// Number of accepted timing points in the source.
    pub timing_points: usize,
    /// Where the `.sm` file was written, if it was.
    pub output_path: Option<PathBuf>,
}

impl ConversionSummary {
    fn of(chart: &Chart) -> Self {
        Self {
            title: chart.metadata.title.clone(),
            artist: chart.metadata.artist.clone(),
            version: chart.metadata.version.clone(),
            key_count: chart.key_count,
            hit_objects: chart.hit_objects.len(),
            timing_points: chart.timing_points.len(),
            output_path: None,
        }
    }
}

/// A chart converted in memory.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct Converted {
    /// The `.sm` text.
    pub sm: String,
    /// What was converted.
    pub summary: ConversionSummary,
    /// Lines of the `.osu` source that were skipped.
    pub osu_warnings: Vec<OsuWarningWithRange>,
    /// Notes that could not be placed.
    pub convert_warnings: Vec<ConvertWarning>,
}

/// Converts `.osu` text into `.sm` text.
///
/// # Errors
///
/// Returns [`ConvertError::UnsupportedMode`] for charts of any mode other than osu!mania.
///
/// # Example
///
/// ```
/// use osu2sm_rs::{convert::ConvertOptions, pipeline::convert_osu_text};
///
/// let source = "[General]\nMode: 3\n[Metadata]\nTitle:Song\n[Difficulty]\nCircleSize:4\n[TimingPoints]\n0,500,4,1,0,100,1,0\n[HitObjects]\n448,192,500,1,0\n";
/// let converted = convert_osu_text(source, &ConvertOptions::default()).unwrap();
/// assert!(converted.sm.starts_with("#TITLE:Song;\n"));
/// assert!(converted.sm.contains("#BPMS:0.000=120.000;"));
/// assert_eq!(converted.summary.hit_objects, 1);
/// ```
pub fn convert_osu_text(source: &str, options: &ConvertOptions) -> Result<Converted, ConvertError> {
    let OsuOutput { chart, warnings } = parse_mania(source)?;
    if !warnings.is_empty() {
        log::warn!("skipped {} malformed lines", warnings.len());
    }
    let converted = convert(&chart, options)?;
    let sm = to_sm_string(&chart, &converted);
    Ok(Converted {
        sm,
        summary: ConversionSummary::of(&chart),
        osu_warnings: warnings,
        convert_warnings: converted.warnings,
    })
}

/// Converts the `.osu` file at `input` and writes the `.sm` file to `output`.
///
/// # Errors
///
/// - [`ConvertError::InputNotFound`] if `input` does not exist.
/// - [`ConvertError::UnsupportedMode`] if the chart is not an osu!mania chart. Nothing is written.
/// - [`ConvertError::Io`] if `input` cannot be read or `output` cannot be written.
pub fn convert_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    options: &ConvertOptions,
) -> Result<ConversionSummary, ConvertError> {
    let (input, output) = (input.as_ref(), output.as_ref());
    let source = read_source(input)?;
    let Converted { sm, mut summary, .. } = convert_osu_text(&source, options)?;
    fs::write(output, sm).map_err(|source| ConvertError::Io {
        path: output.to_path_buf(),
        source,
    })?;
    log::info!(
        "converted {} into {}: \"{}\" [{}] {}K",
        input.display(),
        output.display(),
        summary.title,
        summary.version,
        summary.key_count,
    );
    summary.output_path = Some(output.to_path_buf());
    Ok(summary)
}

/// Reads the `.sm` file at `path` and rebuilds its note stream.
///
/// # Errors
///
/// - [`ConvertError::InputNotFound`] if `path` does not exist.
/// - [`ConvertError::Io`] if it cannot be read.
pub fn analyze_sm_file(
    path: impl AsRef<Path>,
    config: &NoteStreamConfig,
) -> Result<NoteStreamOutput, ConvertError> {
    let source = read_source(path.as_ref())?;
    Ok(parse_note_stream(&source, config))
}

/// Rebuilds the note stream of `.sm` text and rates it.
///
/// # Errors
///
/// Returns [`CalcError::EnginePoisoned`] if the engine is unusable.
pub fn score_sm_text<E: DifficultyEngine>(
    calculator: &Calculator<E>,
    source: &str,
    config: &NoteStreamConfig,
    rate: MusicRate,
    goal: ScoreGoal,
) -> Result<Skillsets, CalcError> {
    let stream = parse_note_stream(source, config);
    log::debug!(
        "rating {} events at {}x for {}",
        stream.events.len(),
        rate.get(),
        goal.0
    );
    calculator.ssr(&stream.events, rate, goal)
}

/// Reads a chart file. Text that is not valid UTF-8 is decoded as Windows-1252, the encoding of
/// older beatmaps with accented metadata.
fn read_source(path: &Path) -> Result<String, ConvertError> {
    let bytes = fs::read(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => ConvertError::InputNotFound(path.to_path_buf()),
        _ => ConvertError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;
    Ok(decode_chart_text(&bytes))
}

fn decode_chart_text(bytes: &[u8]) -> String {
    if let Some(text) = encoding_rs::UTF_8.decode_without_bom_handling_and_without_replacement(bytes)
    {
        return text.into_owned();
    }
    log::warn!("chart text is not valid UTF-8, decoding as Windows-1252");
    encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned()
}
