use std::path::PathBuf;

use osu2sm_rs::{
    calc::{
        Calculator, DifficultyEngine, MsdForAllRates, MusicRate, NoteInfo, ScoreGoal, Skillsets,
    },
    convert::ConvertOptions,
    osu::{GameplayMode, UnsupportedMode},
    pipeline::{ConvertError, analyze_sm_file, convert_file, convert_osu_text, score_sm_text},
    sm::NoteStreamConfig,
};
use pretty_assertions::assert_eq;
use rayon::prelude::*;
use tempfile::TempDir;

const MANIA_4K: &str = include_str!("files/mania_4k.osu");
const MALFORMED_7K: &str = include_str!("files/malformed_7k.osu");
const TAIKO: &str = include_str!("files/taiko.osu");

fn write_input(dir: &TempDir, name: &str, source: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, source).expect("temp dir is writable");
    path
}

#[test]
fn test_convert_file() {
    let dir = TempDir::new().expect("temp dir");
    let input = write_input(&dir, "song.osu", MANIA_4K);
    let output = dir.path().join("song.sm");

    let summary = convert_file(&input, &output, &ConvertOptions::default()).expect("converts");
    assert_eq!(summary.title, "Test Song");
    assert_eq!(summary.artist, "Test Artist");
    assert_eq!(summary.version, "Hard");
    assert_eq!(summary.key_count, 4);
    assert_eq!(summary.hit_objects, 7);
    assert_eq!(summary.timing_points, 2);
    assert_eq!(summary.output_path.as_deref(), Some(output.as_path()));

    let written = std::fs::read_to_string(&output).expect("output exists");
    let in_memory = convert_osu_text(MANIA_4K, &ConvertOptions::default()).expect("converts");
    assert_eq!(written, in_memory.sm);

    let stream = analyze_sm_file(&output, &NoteStreamConfig::default()).expect("readable");
    assert_eq!(stream.events.len(), 6);
    assert_eq!(stream.stats.taps, 5);
    assert_eq!(stream.stats.long_notes_opened, 2);
    assert_eq!(stream.stats.long_notes_closed, 2);
}

#[test]
fn test_latin1_metadata_is_decoded() {
    let dir = TempDir::new().expect("temp dir");
    let input = dir.path().join("cafe.osu");
    let (before, after) = MANIA_4K.split_once("Title:Test Song").expect("title line");
    let bytes = [before.as_bytes(), b"Title:Caf\xE9".as_slice(), after.as_bytes()].concat();
    std::fs::write(&input, bytes).expect("temp dir is writable");
    let output = dir.path().join("cafe.sm");

    let summary = convert_file(&input, &output, &ConvertOptions::default()).expect("converts");
    assert_eq!(summary.title, "Café");
    assert_eq!(summary.hit_objects, 7);
    let written = std::fs::read_to_string(&output).expect("output is UTF-8");
    assert!(written.starts_with("#TITLE:Café;\n"));
}

#[test]
fn test_missing_input() {
    let dir = TempDir::new().expect("temp dir");
    let input = dir.path().join("nowhere.osu");
    let output = dir.path().join("nowhere.sm");
    let err = convert_file(&input, &output, &ConvertOptions::default()).unwrap_err();
    assert!(matches!(&err, ConvertError::InputNotFound(path) if path == &input));
    assert!(err.to_string().starts_with("input file not found: "));
    assert!(!output.exists());
}

#[test]
fn test_unsupported_mode_writes_nothing() {
    let dir = TempDir::new().expect("temp dir");
    let input = write_input(&dir, "drum.osu", TAIKO);
    let output = dir.path().join("drum.sm");
    let err = convert_file(&input, &output, &ConvertOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        ConvertError::UnsupportedMode(UnsupportedMode(GameplayMode::Taiko))
    ));
    assert_eq!(
        err.to_string(),
        "only osu!mania charts are supported, found osu!taiko (1)"
    );
    assert!(!output.exists());
}

#[test]
fn test_unwritable_output() {
    let dir = TempDir::new().expect("temp dir");
    let input = write_input(&dir, "song.osu", MANIA_4K);
    let output = dir.path().join("missing-dir").join("song.sm");
    let err = convert_file(&input, &output, &ConvertOptions::default()).unwrap_err();
    assert!(matches!(&err, ConvertError::Io { path, .. } if path == &output));
}

#[test]
fn test_warnings_are_collected() {
    let converted = convert_osu_text(MALFORMED_7K, &ConvertOptions::default()).expect("converts");
    assert_eq!(converted.osu_warnings.len(), 5);
    assert!(converted.convert_warnings.is_empty());
    assert_eq!(converted.summary.key_count, 7);
    assert_eq!(converted.summary.output_path, None);
}

#[test]
fn test_parallel_batch() {
    let dir = TempDir::new().expect("temp dir");
    let inputs: Vec<_> = (0..16)
        .map(|idx| {
            let source = match idx % 3 {
                0 => MANIA_4K,
                1 => MALFORMED_7K,
                _ => TAIKO,
            };
            write_input(&dir, &format!("chart{idx}.osu"), source)
        })
        .collect();

    let results: Vec<_> = inputs
        .par_iter()
        .map(|input| {
            let output = input.with_extension("sm");
            convert_file(input, &output, &ConvertOptions::default())
                .map(|summary| summary.key_count)
        })
        .collect();

    for (idx, result) in results.iter().enumerate() {
        match (idx % 3, result) {
            (0, Ok(keys)) => assert_eq!(*keys, 4),
            (1, Ok(keys)) => assert_eq!(*keys, 7),
            (2, Err(ConvertError::UnsupportedMode(_))) => {}
            (_, other) => panic!("chart{idx}: unexpected {other:?}"),
        }
    }
    let written = (0..16)
        .filter(|idx| dir.path().join(format!("chart{idx}.sm")).exists())
        .count();
    assert_eq!(written, 11);
}

struct CountingEngine;

impl DifficultyEngine for CountingEngine {
    fn version(&self) -> i32 {
        1
    }

    fn calc_ssr(&mut self, notes: &[NoteInfo], music_rate: f32, _score_goal: f32) -> Skillsets {
        Skillsets {
            overall: notes.len() as f32 * music_rate,
            ..Skillsets::default()
        }
    }

    fn calc_msd(&mut self, _notes: &[NoteInfo]) -> MsdForAllRates {
        MsdForAllRates::default()
    }
}

#[test]
fn test_score_converted_chart() {
    let converted = convert_osu_text(MANIA_4K, &ConvertOptions::default()).expect("converts");
    let calculator = Calculator::new(CountingEngine);
    let ssr = score_sm_text(
        &calculator,
        &converted.sm,
        &NoteStreamConfig::default(),
        MusicRate::new(2.0).expect("valid rate"),
        ScoreGoal::default(),
    )
    .expect("healthy engine");
    assert_eq!(ssr.overall, 12.0);
}
