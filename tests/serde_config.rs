#![cfg(feature = "serde")]

use osu2sm_rs::{
    convert::{ConvertOptions, convert},
    osu::parse_mania,
    pipeline::convert_osu_text,
    sm::NoteStreamConfig,
};
use pretty_assertions::assert_eq;

#[test]
fn test_options_from_json() {
    let options: ConvertOptions =
        serde_json::from_str(r#"{ "quantization": 48, "max_measures": 500 }"#).expect("valid");
    assert_eq!(options.quantization.get(), 48);
    assert_eq!(options.max_measures, 500);
    assert!(
        serde_json::from_str::<ConvertOptions>(r#"{ "quantization": 0, "max_measures": 1 }"#)
            .is_err()
    );

    let config: NoteStreamConfig = serde_json::from_value(serde_json::json!({
        "max_row_width": 64,
        "density_window_seconds": 0.2,
        "density_limit": 100,
        "max_bpm": 500.0,
        "max_time_seconds": 600.0,
    }))
    .expect("valid");
    assert_eq!(
        config,
        NoteStreamConfig::default()
            .with_max_row_width(64)
            .with_density(0.2, 100)
            .with_max_bpm(500.0)
            .with_max_time_seconds(600.0)
    );
}

#[test]
fn test_summary_to_json() {
    let converted =
        convert_osu_text(include_str!("files/mania_4k.osu"), &ConvertOptions::default())
            .expect("converts");
    let json = serde_json::to_value(&converted.summary).expect("serializable");
    assert_eq!(
        json,
        serde_json::json!({
            "title": "Test Song",
            "artist": "Test Artist",
            "version": "Hard",
            "key_count": 4,
            "hit_objects": 7,
            "timing_points": 2,
            "output_path": null,
        })
    );
}

#[test]
fn test_grid_to_json() {
    let chart = parse_mania(include_str!("files/mania_4k.osu"))
        .expect("mania chart")
        .chart;
    let converted = convert(&chart, &ConvertOptions::default()).expect("mania chart");
    let json = serde_json::to_value(&converted).expect("serializable");
    assert_eq!(json["game_type"], "DanceSingle");
    assert_eq!(json["bpms"], "0.000=120.000,4.000=180.000");
}
