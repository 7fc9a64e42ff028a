//! `.osu` to `.sm` and back to a note stream.

use osu2sm_rs::{
    convert::{ConvertOptions, convert},
    osu::{Chart, parse_mania},
    sm::{NoteEvent, NoteStreamConfig, notes::MAX_COLUMNS, parse_note_stream, to_sm_string},
};
use pretty_assertions::assert_eq;

/// Tap and hold-head positions of the source chart, in seconds.
fn source_hits(chart: &Chart) -> Vec<(usize, f64)> {
    let mut hits: Vec<_> = chart
        .hit_events()
        .map(|event| (usize::from(event.column), event.start_time_ms / 1000.0))
        .collect();
    hits.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.total_cmp(&b.1)));
    hits
}

fn stream_hits(events: &[NoteEvent]) -> Vec<(usize, f64)> {
    let mut hits: Vec<_> = events
        .iter()
        .flat_map(|event| {
            (0..MAX_COLUMNS)
                .filter(|&column| event.has_column(column))
                .map(|column| (column, event.time_seconds))
        })
        .collect();
    hits.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.total_cmp(&b.1)));
    hits
}

/// Duration of one grid row at the slowest tempo of the chart, in seconds.
fn row_resolution(chart: &Chart, options: &ConvertOptions) -> f64 {
    let slowest_beat_ms = chart
        .timeline
        .segments()
        .iter()
        .map(|segment| segment.beat_length_ms())
        .fold(0.0, f64::max);
    4.0 * slowest_beat_ms / f64::from(options.quantization.get()) / 1000.0
}

fn assert_roundtrip(source: &str) {
    let chart = parse_mania(source).expect("mania chart").chart;
    let options = ConvertOptions::default();
    let converted = convert(&chart, &options).expect("mania chart");
    let sm = to_sm_string(&chart, &converted);
    let stream = parse_note_stream(&sm, &NoteStreamConfig::default());
    assert!(stream.warnings.is_empty(), "{:?}", stream.warnings);

    let expected = source_hits(&chart);
    let actual = stream_hits(&stream.events);
    assert_eq!(
        actual.iter().map(|hit| hit.0).collect::<Vec<_>>(),
        expected.iter().map(|hit| hit.0).collect::<Vec<_>>()
    );
    let tolerance = row_resolution(&chart, &options);
    for (actual, expected) in actual.iter().zip(&expected) {
        assert!(
            (actual.1 - expected.1).abs() <= tolerance,
            "column {}: {} vs {}",
            expected.0,
            actual.1,
            expected.1
        );
    }
}

#[test]
fn test_roundtrip_4k() {
    assert_roundtrip(include_str!("files/mania_4k.osu"));
}

#[test]
fn test_roundtrip_7k() {
    assert_roundtrip(include_str!("files/malformed_7k.osu"));
}

#[test]
fn test_sm_layout() {
    let chart = parse_mania(include_str!("files/mania_4k.osu"))
        .expect("mania chart")
        .chart;
    let converted = convert(&chart, &ConvertOptions::default()).expect("mania chart");
    let sm = to_sm_string(&chart, &converted);

    let lines: Vec<_> = sm.lines().collect();
    assert_eq!(
        lines[..18],
        [
            "#TITLE:Test Song;",
            "#ARTIST:Test Artist;",
            "#CREDIT:Mapper;",
            "#MUSIC:audio.mp3;",
            "#OFFSET:-1.000000;",
            "#SAMPLESTART:12.345000;",
            "#SAMPLELENGTH:12.000;",
            "#SELECTABLE:YES;",
            "#BPMS:0.000=120.000,4.000=180.000;",
            "#STOPS:;",
            "",
            "//---------------dance-single - Hard----------------",
            "#NOTES:",
            "     dance-single:",
            "     :",
            "     Challenge:",
            "     1:",
            "     0,0,0,0,0:",
        ]
    );
    // Two measures of 192 rows, each closed by `,`, then `;`.
    assert_eq!(lines.len(), 18 + 2 * 193 + 1);
    assert_eq!(lines[18], "1000");
    assert_eq!(lines[18 + 192], ",");
    assert_eq!(lines.last(), Some(&";"));
    assert!(lines[18..].iter().all(|line| line.len() == 4 || *line == "," || *line == ";"));
}

#[test]
fn test_offset_of_chart_starting_at_zero() {
    let chart = parse_mania(include_str!("files/malformed_7k.osu"))
        .expect("mania chart")
        .chart;
    let converted = convert(&chart, &ConvertOptions::default()).expect("mania chart");
    let sm = to_sm_string(&chart, &converted);
    assert!(sm.contains("#OFFSET:0.000000;\n"));
    assert!(sm.contains("#SAMPLESTART:0.000000;\n"));
    assert!(sm.contains("#BPMS:0.000=100.000,2.000=200.000;\n"));
    assert!(sm.contains("\n     kb7-single:\n"));
    assert!(sm.contains("#ARTIST:Unknown;\n"));
}
