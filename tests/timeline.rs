use osu2sm_rs::timeline::{Bpm, Timeline};

fn bpm(value: f64) -> Bpm {
    Bpm::new(value).expect("positive tempo")
}

#[test]
fn test_time_to_beat_is_monotonic() {
    let timelines = [
        Timeline::fallback(),
        Timeline::from_time_points([(0.0, bpm(120.0))]),
        Timeline::from_time_points([
            (250.0, bpm(200.0)),
            (1000.0, bpm(60.0)),
            (1001.0, bpm(999.0)),
            (5000.0, bpm(1.5)),
        ]),
        Timeline::from_beat_points([(0.0, bpm(150.0)), (8.0, bpm(75.0)), (12.5, bpm(300.0))]),
    ];
    for timeline in &timelines {
        let mut previous = f64::NEG_INFINITY;
        for step in -200..2000 {
            let time_ms = f64::from(step) * 5.0;
            let beat = timeline.time_to_beat(time_ms);
            assert!(
                beat >= previous,
                "time_to_beat went back at {time_ms}ms: {previous} -> {beat}"
            );
            previous = beat;
        }
    }
}

#[test]
fn test_beat_and_time_are_inverse() {
    let timeline = Timeline::from_time_points([
        (1000.0, bpm(120.0)),
        (3000.0, bpm(180.0)),
        (7000.0, bpm(90.0)),
    ]);
    for step in 0..100 {
        let beat = f64::from(step) * 0.37;
        let back = timeline.time_to_beat(timeline.beat_to_time(beat));
        assert!((back - beat).abs() < 1e-9, "{beat} -> {back}");
    }
}

#[test]
fn test_same_time_points_keep_the_last() {
    let timeline = Timeline::from_time_points([
        (0.0, bpm(100.0)),
        (2000.0, bpm(120.0)),
        (2000.0, bpm(240.0)),
    ]);
    let segments = timeline.segments();
    assert_eq!(segments.len(), 2);
    assert_eq!(segments[1].bpm, bpm(240.0));
    assert!(segments.windows(2).all(|pair| pair[0].start_time_ms < pair[1].start_time_ms));
}

#[test]
fn test_before_the_first_point_extrapolates() {
    let timeline = Timeline::from_time_points([(1000.0, bpm(120.0))]);
    assert_eq!(timeline.time_to_beat(500.0), -1.0);
    assert_eq!(timeline.time_to_beat(1500.0), 1.0);
}

#[test]
fn test_fallback_timeline() {
    let timeline = Timeline::from_time_points([]);
    assert!(timeline.is_fallback());
    assert_eq!(timeline.segments().len(), 1);
    assert_eq!(timeline.time_to_beat(500.0), 1.0);
    assert_eq!(timeline.bpm_at_beat(42.0), Bpm::FALLBACK);
}
