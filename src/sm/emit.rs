//! Serializes a converted chart into StepMania (`.sm`) text.

use std::fmt::{self, Write};

use crate::{
    convert::{ConvertOutput, GameType, Grid},
    osu::Chart,
};

/// `#SAMPLELENGTH` written to every chart, in seconds.
pub const SAMPLE_LENGTH_SECONDS: f64 = 12.0;

/// Header directives of a `.sm` file.
#[derive(Debug, Clone, PartialEq)]
pub struct SmHeader<'a> {
    /// `#TITLE`.
    pub title: &'a str,
    /// `#ARTIST`.
    pub artist: &'a str,
    /// `#CREDIT`, the mapper.
    pub credit: &'a str,
    /// `#MUSIC`, the audio file name.
    pub music: &'a str,
    /// `#OFFSET` in seconds: the negated audio time of beat 0.
    pub offset_seconds: f64,
    /// `#SAMPLESTART` in seconds.
    pub sample_start_seconds: f64,
    /// `#BPMS`.
    pub bpms: &'a str,
}

impl<'a> SmHeader<'a> {
    /// Collects the header of a converted chart.
    ///
    /// The offset places beat 0 on the first tempo point, so it is the negated time of that point.
    #[must_use]
    pub fn new(chart: &'a Chart, converted: &'a ConvertOutput) -> Self {
        let offset_seconds = if chart.timeline.is_fallback() {
            0.0
        } else {
            // `+ 0.0` turns a negated zero into a positive one.
            -chart.timeline.first().start_time_ms / 1000.0 + 0.0
        };
        Self {
            title: &chart.metadata.title,
            artist: &chart.metadata.artist,
            credit: &chart.metadata.creator,
            music: &chart.metadata.audio_filename,
            offset_seconds,
            sample_start_seconds: chart
                .metadata
                .preview_time_ms
                .map_or(0.0, |preview| f64::from(preview) / 1000.0),
            bpms: &converted.bpms,
        }
    }

    /// Writes the header directives followed by one blank line.
    ///
    /// # Errors
    ///
    /// Propagates errors of `out`.
    pub fn write_to(&self, out: &mut impl Write) -> fmt::Result {
        writeln!(out, "#TITLE:{};", self.title)?;
        writeln!(out, "#ARTIST:{};", self.artist)?;
        writeln!(out, "#CREDIT:{};", self.credit)?;
        writeln!(out, "#MUSIC:{};", self.music)?;
        writeln!(out, "#OFFSET:{:.6};", self.offset_seconds)?;
        writeln!(out, "#SAMPLESTART:{:.6};", self.sample_start_seconds)?;
        writeln!(out, "#SAMPLELENGTH:{SAMPLE_LENGTH_SECONDS:.3};")?;
        writeln!(out, "#SELECTABLE:YES;")?;
        writeln!(out, "#BPMS:{};", self.bpms)?;
        writeln!(out, "#STOPS:;")?;
        writeln!(out)
    }
}

/// Writes the `#NOTES` block of `grid`: the metadata fields, every row of every measure, a `,`
/// after each measure and the final `;`.
///
/// # Errors
///
/// Propagates errors of `out`.
pub fn write_notes(
    out: &mut impl Write,
    game_type: GameType,
    description: &str,
    grid: &Grid,
) -> fmt::Result {
    writeln!(out, "//---------------{game_type} - {description}----------------")?;
    writeln!(out, "#NOTES:")?;
    writeln!(out, "     {game_type}:")?;
    writeln!(out, "     :")?;
    writeln!(out, "     Challenge:")?;
    writeln!(out, "     1:")?;
    writeln!(out, "     0,0,0,0,0:")?;

    let quantization = u64::from(grid.quantization().get());
    let mut line = String::with_capacity(usize::from(grid.key_count()));
    for measure in 0..grid.measure_count() {
        for row_in_measure in 0..quantization {
            line.clear();
            grid.write_row(measure * quantization + row_in_measure, &mut line);
            writeln!(out, "{line}")?;
        }
        writeln!(out, ",")?;
    }
    writeln!(out, ";")
}

/// Writes a whole `.sm` file for a converted chart.
///
/// # Errors
///
/// Propagates errors of `out`.
pub fn write_sm(out: &mut impl Write, chart: &Chart, converted: &ConvertOutput) -> fmt::Result {
    SmHeader::new(chart, converted).write_to(out)?;
    write_notes(
        out,
        converted.game_type,
        &chart.metadata.version,
        &converted.grid,
    )
}

/// Renders a whole `.sm` file for a converted chart into a string.
#[must_use]
pub fn to_sm_string(chart: &Chart, converted: &ConvertOutput) -> String {
    let mut out = String::new();
    // Writing into a `String` cannot fail.
    let _ = write_sm(&mut out, chart, converted);
    out
}
