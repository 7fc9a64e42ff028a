//! Density-artifact filter.
//!
//! Quantization of broken source timing can pile hundreds of notes into a few milliseconds. Such
//! bursts are assumed to be conversion artifacts rather than gameplay, and are thinned out before
//! scoring. This is a heuristic: extremely dense legitimate charts can lose notes too.

use std::collections::VecDeque;

use super::NoteEvent;

/// Sliding trailing window of accepted events.
#[derive(Debug, Clone)]
pub struct DensityFilter {
    window_seconds: f64,
    limit: u32,
    accepted: VecDeque<(f64, u32)>,
    notes_in_window: u32,
}

impl DensityFilter {
    /// Creates a filter admitting at most `limit` notes in any `window_seconds` interval.
    #[must_use]
    pub const fn new(window_seconds: f64, limit: u32) -> Self {
        Self {
            window_seconds,
            limit,
            accepted: VecDeque::new(),
            notes_in_window: 0,
        }
    }

    /// Decides whether `event` is admitted. Events must arrive in ascending time.
    ///
    /// The event is rejected if the notes of already accepted events within the trailing window,
    /// plus its own notes, exceed the limit.
    pub fn admit(&mut self, event: &NoteEvent) -> bool {
        while let Some(&(time, notes)) = self.accepted.front() {
            if event.time_seconds - time < self.window_seconds {
                break;
            }
            self.accepted.pop_front();
            self.notes_in_window -= notes;
        }
        let notes = event.note_count();
        let Some(total) = self
            .notes_in_window
            .checked_add(notes)
            .filter(|&total| total <= self.limit)
        else {
            return false;
        };
        self.accepted.push_back((event.time_seconds, notes));
        self.notes_in_window = total;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_only_what_overflows_the_window() {
        let mut filter = DensityFilter::new(0.1, 4);
        let event = |bitmask, time_seconds| NoteEvent {
            bitmask,
            time_seconds,
        };
        assert!(filter.admit(&event(0b11, 0.00)));
        assert!(filter.admit(&event(0b1, 0.01)));
        // 3 + 2 > 4
        assert!(!filter.admit(&event(0b11, 0.02)));
        assert!(filter.admit(&event(0b1, 0.03)));
        // The first event left the window.
        assert!(filter.admit(&event(0b11, 0.10)));
    }

    #[test]
    fn huge_limit_does_not_overflow() {
        let mut filter = DensityFilter::new(1.0, u32::MAX);
        filter.accepted.push_back((0.0, u32::MAX - 1));
        filter.notes_in_window = u32::MAX - 1;
        let chord = NoteEvent {
            bitmask: 0b11,
            time_seconds: 0.5,
        };
        assert!(!filter.admit(&chord));
        assert_eq!(filter.notes_in_window, u32::MAX - 1);
        let single = NoteEvent {
            bitmask: 0b1,
            time_seconds: 0.6,
        };
        assert!(filter.admit(&single));
        assert_eq!(filter.notes_in_window, u32::MAX);
    }
}
