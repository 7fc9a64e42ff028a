//! Piecewise tempo timeline, converting between wall-clock milliseconds and beats.
//!
//! A [`Timeline`] is an immutable, time-sorted list of [`TempoSegment`]s. The beat position at the
//! start of every segment is computed once on construction, so both directions of conversion are a
//! binary search followed by one linear step within the found segment:
//!
//! - the beats of every fully elapsed segment are `(next.time - this.time) / this.beat_length`,
//! - inside the active segment the remainder is measured with that segment's own tempo,
//! - positions before the first segment extrapolate with the first tempo (beats may be negative).
//!
//! An empty timeline never exists: constructors fall back to one implicit 120 BPM segment at beat 0.

pub mod bpm;

use itertools::Itertools;

pub use self::bpm::{Bpm, InvalidBpmError};

/// An interval of constant tempo, beginning at a known time and beat.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TempoSegment {
    /// Beat position where this segment starts.
    pub start_beat: f64,
    /// Time where this segment starts, in milliseconds.
    pub start_time_ms: f64,
    /// The constant tempo of this segment.
    pub bpm: Bpm,
}

impl TempoSegment {
    /// The implicit segment used when no tempo is known.
    pub const FALLBACK: Self = Self {
        start_beat: 0.0,
        start_time_ms: 0.0,
        bpm: Bpm::FALLBACK,
    };

    /// Length of one beat in this segment, in milliseconds.
    #[must_use]
    pub fn beat_length_ms(&self) -> f64 {
        self.bpm.beat_length_ms()
    }

    /// Beat position of `time_ms`, measured with this segment's tempo.
    #[must_use]
    pub fn time_to_beat(&self, time_ms: f64) -> f64 {
        self.start_beat + (time_ms - self.start_time_ms) / self.beat_length_ms()
    }

    /// Time of `beat` in milliseconds, measured with this segment's tempo.
    #[must_use]
    pub fn beat_to_time(&self, beat: f64) -> f64 {
        self.start_time_ms + (beat - self.start_beat) * self.beat_length_ms()
    }
}

/// Immutable piecewise tempo function. Segments are strictly increasing in both time and beat.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timeline {
    segments: Vec<TempoSegment>,
    implicit: bool,
}

impl Default for Timeline {
    fn default() -> Self {
        Self::fallback()
    }
}

impl Timeline {
    /// A timeline of one implicit 120 BPM segment at beat 0, time 0.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            segments: vec![TempoSegment::FALLBACK],
            implicit: true,
        }
    }

    /// Builds a timeline anchored on times, as source charts define tempo.
    ///
    /// The first point (by time) is beat 0. Points are sorted by time; when several points share
    /// the same time the one given last wins. Non-finite times are dropped.
    #[must_use]
    pub fn from_time_points(points: impl IntoIterator<Item = (f64, Bpm)>) -> Self {
        let mut points: Vec<_> = points
            .into_iter()
            .filter(|(time, _)| time.is_finite())
            .collect();
        points.sort_by(|(a, _), (b, _)| a.total_cmp(b));
        let points = dedup_keep_last(points);

        let mut segments: Vec<TempoSegment> = Vec::with_capacity(points.len());
        for (time_ms, bpm) in points {
            let start_beat = segments
                .last()
                .map_or(0.0, |prev| prev.time_to_beat(time_ms));
            segments.push(TempoSegment {
                start_beat,
                start_time_ms: time_ms,
                bpm,
            });
        }
        Self::from_segments(segments)
    }

    /// Builds a timeline anchored on beats, as grid charts define tempo.
    ///
    /// Beat 0 is at time 0; a first point after beat 0 extends its tempo backwards. Points are
    /// sorted by beat; when several points share the same beat the one given last wins.
    #[must_use]
    pub fn from_beat_points(points: impl IntoIterator<Item = (f64, Bpm)>) -> Self {
        let mut points: Vec<_> = points
            .into_iter()
            .filter(|(beat, _)| beat.is_finite())
            .collect();
        points.sort_by(|(a, _), (b, _)| a.total_cmp(b));
        let points = dedup_keep_last(points);

        let mut segments: Vec<TempoSegment> = Vec::with_capacity(points.len());
        for (beat, bpm) in points {
            let start_time_ms = segments
                .last()
                .map_or_else(|| beat * bpm.beat_length_ms(), |prev| prev.beat_to_time(beat));
            segments.push(TempoSegment {
                start_beat: beat,
                start_time_ms,
                bpm,
            });
        }
        Self::from_segments(segments)
    }

    fn from_segments(segments: Vec<TempoSegment>) -> Self {
        if segments.is_empty() {
            return Self::fallback();
        }
        Self {
            segments,
            implicit: false,
        }
    }

    /// Whether this timeline is the implicit 120 BPM fallback.
    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        self.implicit
    }

    /// The segments, sorted by time. Never empty.
    #[must_use]
    pub fn segments(&self) -> &[TempoSegment] {
        &self.segments
    }

    /// The first segment, which anchors beat 0 for time-anchored timelines.
    #[must_use]
    pub fn first(&self) -> &TempoSegment {
        self.segments.first().unwrap_or(&TempoSegment::FALLBACK)
    }

    /// Converts a time in milliseconds into a beat position.
    ///
    /// Monotonic: `t1 < t2` implies `time_to_beat(t1) <= time_to_beat(t2)`.
    #[must_use]
    pub fn time_to_beat(&self, time_ms: f64) -> f64 {
        let idx = self
            .segments
            .partition_point(|seg| seg.start_time_ms <= time_ms);
        self.segment_before(idx).time_to_beat(time_ms)
    }

    /// Converts a beat position into a time in milliseconds. Inverse of [`Self::time_to_beat`].
    #[must_use]
    pub fn beat_to_time(&self, beat: f64) -> f64 {
        let idx = self.segments.partition_point(|seg| seg.start_beat <= beat);
        self.segment_before(idx).beat_to_time(beat)
    }

    /// Tempo active at `beat`.
    #[must_use]
    pub fn bpm_at_beat(&self, beat: f64) -> Bpm {
        let idx = self.segments.partition_point(|seg| seg.start_beat <= beat);
        self.segment_before(idx).bpm
    }

    /// Segment preceding a partition point, or the first one when the point is before it.
    fn segment_before(&self, partition: usize) -> &TempoSegment {
        self.segments
            .get(partition.saturating_sub(1))
            .unwrap_or_else(|| self.first())
    }
}

/// Removes consecutive entries with the same key, keeping the last of each run.
fn dedup_keep_last(points: Vec<(f64, Bpm)>) -> Vec<(f64, Bpm)> {
    points
        .into_iter()
        .coalesce(|prev, next| {
            if prev.0.total_cmp(&next.0).is_eq() {
                log::trace!(
                    "tempo {} at {} replaced by {} at the same position",
                    prev.1,
                    prev.0,
                    next.1
                );
                Ok(next)
            } else {
                Err((prev, next))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bpm(value: f64) -> Bpm {
        Bpm::new(value).unwrap()
    }

    #[test]
    fn empty_falls_back_to_120() {
        let timeline = Timeline::from_time_points([]);
        assert!(timeline.is_fallback());
        assert!((timeline.time_to_beat(1000.0) - 2.0).abs() < 1e-9);
        assert!((timeline.beat_to_time(3.0) - 1500.0).abs() < 1e-9);
    }

    #[test]
    fn accumulates_elapsed_segments() {
        // 120 BPM from 1000ms, 240 BPM from 3000ms.
        let timeline = Timeline::from_time_points([(1000.0, bpm(120.0)), (3000.0, bpm(240.0))]);
        assert!(!timeline.is_fallback());
        assert!((timeline.time_to_beat(1000.0)).abs() < 1e-9);
        assert!((timeline.time_to_beat(3000.0) - 4.0).abs() < 1e-9);
        assert!((timeline.time_to_beat(3500.0) - 6.0).abs() < 1e-9);
        // Before the first segment the first tempo extrapolates.
        assert!((timeline.time_to_beat(500.0) + 1.0).abs() < 1e-9);
    }

    #[test]
    fn same_time_keeps_last() {
        let timeline = Timeline::from_time_points([(0.0, bpm(100.0)), (0.0, bpm(200.0))]);
        assert_eq!(timeline.segments().len(), 1);
        assert_eq!(timeline.first().bpm, bpm(200.0));
    }

    #[test]
    fn beat_anchored_extends_first_tempo_backwards() {
        let timeline = Timeline::from_beat_points([(4.0, bpm(60.0)), (8.0, bpm(120.0))]);
        assert!((timeline.beat_to_time(0.0)).abs() < 1e-9);
        assert!((timeline.beat_to_time(4.0) - 4000.0).abs() < 1e-9);
        assert!((timeline.beat_to_time(8.0) - 8000.0).abs() < 1e-9);
        assert!((timeline.beat_to_time(10.0) - 9000.0).abs() < 1e-9);
        assert_eq!(timeline.bpm_at_beat(9.0), bpm(120.0));
    }
}
