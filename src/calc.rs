//! Boundary to the external difficulty engine.
//!
//! The engine itself is not part of this crate. It is plugged in through [`DifficultyEngine`],
//! whose records use the native `#[repr(C)]` layouts, and wrapped by [`Calculator`], which owns
//! the engine exclusively and serializes every call through a mutex. Dropping the calculator
//! releases the engine exactly once.

use std::sync::Mutex;

use thiserror::Error;

use crate::sm::NoteEvent;

/// Number of full rates the engine rates at once, `0.7..=2.0` in `0.1` steps.
pub const RATE_COUNT: usize = 14;

/// The lowest full rate of [`MsdForAllRates`].
pub const LOWEST_FULL_RATE: f32 = 0.7;

/// The highest accepted music rate.
pub const MAX_MUSIC_RATE: f32 = 3.0;

/// One row handed to the engine.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NoteInfo {
    /// Column bitmask of the row.
    pub notes: u32,
    /// Time of the row in seconds.
    pub row_time: f32,
}

impl From<&NoteEvent> for NoteInfo {
    fn from(event: &NoteEvent) -> Self {
        Self {
            notes: event.bitmask,
            // The engine works in single precision.
            row_time: event.time_seconds as f32,
        }
    }
}

/// The eight difficulty metrics of a chart.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Skillsets {
    /// Overall rating.
    pub overall: f32,
    /// Single-note streams.
    pub stream: f32,
    /// Streams of two-note chords.
    pub jumpstream: f32,
    /// Streams of three-note chords.
    pub handstream: f32,
    /// Endurance over long sections.
    pub stamina: f32,
    /// Fast repeats in one column.
    pub jackspeed: f32,
    /// Repeated chords.
    pub chordjack: f32,
    /// Irregular patterns.
    pub technical: f32,
}

impl Skillsets {
    /// All metrics zero, the rating of an empty chart.
    pub const ZERO: Self = Self {
        overall: 0.0,
        stream: 0.0,
        jumpstream: 0.0,
        handstream: 0.0,
        stamina: 0.0,
        jackspeed: 0.0,
        chordjack: 0.0,
        technical: 0.0,
    };
}

/// Ratings at every full rate.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MsdForAllRates {
    /// Entry `i` is the rating at rate `0.7 + 0.1 * i`.
    pub msds: [Skillsets; RATE_COUNT],
}

impl Default for MsdForAllRates {
    fn default() -> Self {
        Self {
            msds: [Skillsets::ZERO; RATE_COUNT],
        }
    }
}

impl MsdForAllRates {
    /// The entry of the full rate nearest to `rate`, or `None` outside `0.7..=2.0`.
    ///
    /// ```
    /// use osu2sm_rs::calc::{MsdForAllRates, Skillsets};
    ///
    /// let mut table = MsdForAllRates::default();
    /// table.msds[3].overall = 20.0;
    /// assert_eq!(table.at_rate(1.0).map(|ssr| ssr.overall), Some(20.0));
    /// assert!(table.at_rate(2.5).is_none());
    /// ```
    #[must_use]
    pub fn at_rate(&self, rate: f32) -> Option<&Skillsets> {
        let index = ((rate - LOWEST_FULL_RATE) * 10.0).round();
        if !(0.0..RATE_COUNT as f32).contains(&index) {
            return None;
        }
        self.msds.get(index as usize)
    }
}

/// A problem talking to the engine.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CalcError {
    /// The music rate is outside `(0, 3]`.
    #[error("music rate {0} is outside (0, 3]")]
    InvalidRate(f32),
    /// A previous call panicked while holding the engine.
    #[error("the difficulty engine was poisoned by a panic")]
    EnginePoisoned,
}

/// A playback rate in `(0, 3]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MusicRate(f32);

impl MusicRate {
    /// The normal rate.
    pub const NORMAL: Self = Self(1.0);

    /// Validates a rate.
    ///
    /// # Errors
    ///
    /// Returns [`CalcError::InvalidRate`] outside `(0, 3]`, including NaN.
    pub fn new(rate: f32) -> Result<Self, CalcError> {
        if rate > 0.0 && rate <= MAX_MUSIC_RATE {
            Ok(Self(rate))
        } else {
            Err(CalcError::InvalidRate(rate))
        }
    }

    /// The rate as a float.
    #[must_use]
    pub const fn get(self) -> f32 {
        self.0
    }
}

impl Default for MusicRate {
    fn default() -> Self {
        Self::NORMAL
    }
}

/// The accuracy the rating is computed for.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScoreGoal(pub f32);

impl Default for ScoreGoal {
    fn default() -> Self {
        Self(0.93)
    }
}

/// An external difficulty engine.
///
/// Implementations are not required to be thread safe; [`Calculator`] never calls them
/// concurrently.
pub trait DifficultyEngine {
    /// Version of the engine.
    fn version(&self) -> i32;

    /// Rates `notes` at one rate and score goal. `notes` is never empty.
    fn calc_ssr(&mut self, notes: &[NoteInfo], music_rate: f32, score_goal: f32) -> Skillsets;

    /// Rates `notes` at every full rate. `notes` is never empty.
    fn calc_msd(&mut self, notes: &[NoteInfo]) -> MsdForAllRates;
}

/// Exclusive owner of a [`DifficultyEngine`].
///
/// Shareable between threads when the engine is [`Send`]; calls are serialized.
#[derive(Debug)]
pub struct Calculator<E> {
    engine: Mutex<E>,
}

impl<E: DifficultyEngine> Calculator<E> {
    /// Takes ownership of `engine`.
    #[must_use]
    pub fn new(engine: E) -> Self {
        log::info!("difficulty engine version {}", engine.version());
        Self {
            engine: Mutex::new(engine),
        }
    }

    /// Version of the wrapped engine.
    ///
    /// # Errors
    ///
    /// Returns [`CalcError::EnginePoisoned`] if a previous call panicked.
    pub fn version(&self) -> Result<i32, CalcError> {
        let engine = self.engine.lock().map_err(|_| CalcError::EnginePoisoned)?;
        Ok(engine.version())
    }

    /// Rates `events` at `rate` for `goal`. An empty stream rates zero without calling the engine.
    ///
    /// # Errors
    ///
    /// Returns [`CalcError::EnginePoisoned`] if a previous call panicked.
    pub fn ssr(
        &self,
        events: &[NoteEvent],
        rate: MusicRate,
        goal: ScoreGoal,
    ) -> Result<Skillsets, CalcError> {
        let notes = sanitize(events);
        if notes.is_empty() {
            return Ok(Skillsets::ZERO);
        }
        let mut engine = self.engine.lock().map_err(|_| CalcError::EnginePoisoned)?;
        Ok(engine.calc_ssr(&notes, rate.get(), goal.0))
    }

    /// Rates `events` at every full rate. An empty stream rates zero without calling the engine.
    ///
    /// # Errors
    ///
    /// Returns [`CalcError::EnginePoisoned`] if a previous call panicked.
    pub fn msd(&self, events: &[NoteEvent]) -> Result<MsdForAllRates, CalcError> {
        let notes = sanitize(events);
        if notes.is_empty() {
            return Ok(MsdForAllRates::default());
        }
        let mut engine = self.engine.lock().map_err(|_| CalcError::EnginePoisoned)?;
        Ok(engine.calc_msd(&notes))
    }

    /// Releases the engine back to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`CalcError::EnginePoisoned`] if a previous call panicked.
    pub fn into_inner(self) -> Result<E, CalcError> {
        self.engine
            .into_inner()
            .map_err(|_| CalcError::EnginePoisoned)
    }
}

/// Converts events to engine records, clamping negative times to zero.
fn sanitize(events: &[NoteEvent]) -> Vec<NoteInfo> {
    events
        .iter()
        .enumerate()
        .map(|(idx, event)| {
            let mut info = NoteInfo::from(event);
            if info.row_time < 0.0 {
                log::warn!(
                    "negative row time {} at index {idx}, adjusting to 0",
                    info.row_time
                );
                info.row_time = 0.0;
            }
            info
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rates() {
        assert!(MusicRate::new(0.0).is_err());
        assert!(MusicRate::new(f32::NAN).is_err());
        assert!(MusicRate::new(3.0).is_ok());
        assert_eq!(MusicRate::new(3.5), Err(CalcError::InvalidRate(3.5)));
        assert_eq!(ScoreGoal::default().0, 0.93);
    }

    #[test]
    fn negative_times_are_clamped() {
        let notes = sanitize(&[
            NoteEvent {
                bitmask: 1,
                time_seconds: -0.25,
            },
            NoteEvent {
                bitmask: 2,
                time_seconds: 0.5,
            },
        ]);
        assert_eq!(
            notes,
            vec![
                NoteInfo {
                    notes: 1,
                    row_time: 0.0
                },
                NoteInfo {
                    notes: 2,
                    row_time: 0.5
                }
            ]
        );
    }

    #[test]
    fn full_rate_lookup() {
        let mut table = MsdForAllRates::default();
        for (idx, entry) in table.msds.iter_mut().enumerate() {
            entry.overall = idx as f32;
        }
        assert_eq!(table.at_rate(0.7).map(|s| s.overall), Some(0.0));
        assert_eq!(table.at_rate(2.0).map(|s| s.overall), Some(13.0));
        assert!(table.at_rate(0.5).is_none());
    }
}
