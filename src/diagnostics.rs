//! Rendering of `.osu` parser warnings with `ariadne`.
//!
//! The parser never stops at a bad line; it skips the line and records an
//! [`OsuWarningWithRange`](crate::osu::OsuWarningWithRange) holding the line's byte range. The
//! functions here turn those warnings into reports that underline the skipped line in the file.
//!
//! # Usage Example
//!
//! ```rust
//! # #[cfg(feature = "diagnostics")]
//! # {
//! use osu2sm_rs::{diagnostics::emit_osu_warnings, osu::parse_osu};
//!
//! let source = "[General]\nMode: 3\n[HitObjects]\n64,192\n";
//! let output = parse_osu(source);
//!
//! emit_osu_warnings("test.osu", source, &output.warnings);
//! # }
//! ```

#[cfg(feature = "diagnostics")]
use std::{fmt::Display, ops::Range};

#[cfg(feature = "diagnostics")]
use ariadne::{Color, Label, Report, ReportKind, Source};

#[cfg(feature = "diagnostics")]
use crate::{
    osu::{OsuWarning, OsuWarningWithRange},
    span::Spanned,
};

/// A chart file being reported on: its display name and its full text.
///
/// ```rust
/// use osu2sm_rs::diagnostics::ChartSource;
///
/// let text = "[Metadata]\nTitle:Song\n";
/// let chart = ChartSource::new("song.osu", text);
///
/// assert_eq!(chart.text(), text);
/// assert_eq!(chart.name(), "song.osu");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ChartSource<'a> {
    name: &'a str,
    text: &'a str,
}

impl<'a> ChartSource<'a> {
    /// Pairs a file name with the text that was parsed from it.
    #[must_use]
    pub const fn new(name: &'a str, text: &'a str) -> Self {
        Self { name, text }
    }

    /// The parsed text.
    #[must_use]
    pub const fn text(&self) -> &'a str {
        self.text
    }

    /// The name shown in report headers.
    #[must_use]
    pub const fn name(&self) -> &'a str {
        self.name
    }
}

/// A report over a named chart file.
#[cfg(feature = "diagnostics")]
pub type ChartReport<'a> = Report<'a, (String, Range<usize>)>;

/// Warnings that can be shown against the chart they came from.
#[cfg(feature = "diagnostics")]
pub trait ToAriadne {
    /// Builds the report. Rows and columns are derived by ariadne from the byte range.
    fn to_report<'a>(&self, src: &ChartSource<'a>) -> ChartReport<'a>;
}

/// Builds a report underlining the span of `warning`, labelled with its message and noting
/// its line number.
#[cfg(feature = "diagnostics")]
#[must_use]
pub fn spanned_report<'a, T: Display>(
    src: &ChartSource<'a>,
    kind: ReportKind<'a>,
    warning: &Spanned<T>,
    title: &str,
    color: Color,
) -> ChartReport<'a> {
    let filename = src.name().to_string();
    Report::build(kind, (filename.clone(), warning.range()))
        .with_message(title)
        .with_label(
            Label::new((filename, warning.range()))
                .with_message(warning.content().to_string())
                .with_color(color),
        )
        .with_note(format!("line {} was ignored", warning.line()))
        .finish()
}

#[cfg(feature = "diagnostics")]
impl ToAriadne for OsuWarningWithRange {
    fn to_report<'a>(&self, src: &ChartSource<'a>) -> ChartReport<'a> {
        let title = match self.content() {
            OsuWarning::MalformedField { section, .. } => format!("skipped line in {section}"),
        };
        spanned_report(src, ReportKind::Warning, self, &title, Color::Yellow)
    }
}

/// Prints a report for every warning to stderr.
///
/// `name` labels the file in the output; `source` must be the text the warnings were parsed from.
#[cfg(feature = "diagnostics")]
pub fn emit_osu_warnings<'a>(
    name: &'a str,
    source: &'a str,
    warnings: impl IntoIterator<Item = &'a OsuWarningWithRange>,
) {
    let chart = ChartSource::new(name, source);
    let cache = Source::from(source);
    for warning in warnings {
        let _ = warning
            .to_report(&chart)
            .eprint((name.to_string(), cache.clone()));
    }
}

/// Builds the reports of `warnings` without printing them.
#[cfg(feature = "diagnostics")]
#[must_use]
pub fn collect_osu_reports<'a>(
    name: &'a str,
    source: &'a str,
    warnings: impl IntoIterator<Item = &'a OsuWarningWithRange>,
) -> Vec<ChartReport<'a>> {
    let chart = ChartSource::new(name, source);
    warnings
        .into_iter()
        .map(|warning| warning.to_report(&chart))
        .collect()
}
