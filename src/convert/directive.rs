//! Tempo directive (`#BPMS`) generation.

use itertools::Itertools;

use crate::timeline::Timeline;

/// Builds the `beat=bpm,beat=bpm,...` directive for a time-anchored timeline.
///
/// The beat of each change advances by `(next.time - this.time) / this.beat_length`, the gap to
/// the next change measured with the tempo being left. Both numbers use three decimals.
///
/// ```
/// use osu2sm_rs::{convert::bpm_directive, timeline::{Bpm, Timeline}};
///
/// let timeline = Timeline::from_time_points([
///     (250.0, Bpm::new(120.0).unwrap()),
///     (2250.0, Bpm::new(180.0).unwrap()),
/// ]);
/// assert_eq!(bpm_directive(&timeline), "0.000=120.000,4.000=180.000");
/// assert_eq!(bpm_directive(&Timeline::fallback()), "0.000=120.000");
/// ```
#[must_use]
pub fn bpm_directive(timeline: &Timeline) -> String {
    let segments = timeline.segments();
    let mut cumulative_beats = 0.0;
    let mut entries = Vec::with_capacity(segments.len());
    for (idx, this) in segments.iter().enumerate() {
        entries.push((cumulative_beats, this.bpm.as_f64()));
        if let Some(next) = segments.get(idx + 1) {
            cumulative_beats += (next.start_time_ms - this.start_time_ms) / this.beat_length_ms();
        }
    }
    entries
        .into_iter()
        .map(|(beat, bpm)| format!("{beat:.3}={bpm:.3}"))
        .join(",")
}
