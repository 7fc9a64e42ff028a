//! Validated tempo value.

use thiserror::Error;

/// Milliseconds in one minute, the numerator of every BPM ↔ beat length conversion.
pub const MS_PER_MINUTE: f64 = 60_000.0;

/// Beats per minute, always finite and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct Bpm(f64);

impl Eq for Bpm {}
impl PartialOrd for Bpm {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Bpm {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl From<Bpm> for f64 {
    fn from(value: Bpm) -> Self {
        value.as_f64()
    }
}

/// Error type for `Bpm::try_from`.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("positive finite tempo expected: {0}")]
pub struct InvalidBpmError(pub(crate) f64);

impl TryFrom<f64> for Bpm {
    type Error = InvalidBpmError;
    fn try_from(value: f64) -> Result<Self, Self::Error> {
        (value.is_finite() && value > 0.0)
            .then_some(Self(value))
            .ok_or(InvalidBpmError(value))
    }
}

impl std::fmt::Display for Bpm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Bpm {
    /// The tempo used whenever a chart carries no usable tempo at all.
    pub const FALLBACK: Self = Self(120.0);

    /// Creates a new `Bpm` if `value` is finite and positive, otherwise returns `None`.
    #[inline]
    #[must_use]
    pub fn new(value: f64) -> Option<Self> {
        Self::try_from(value).ok()
    }

    /// Creates a `Bpm` from the length of one beat in milliseconds.
    #[must_use]
    pub fn from_beat_length(beat_length_ms: f64) -> Option<Self> {
        if beat_length_ms.is_finite() && beat_length_ms > 0.0 {
            Self::new(MS_PER_MINUTE / beat_length_ms)
        } else {
            None
        }
    }

    /// Gets the internal value.
    #[inline]
    #[must_use]
    pub const fn as_f64(self) -> f64 {
        self.0
    }

    /// Length of one beat at this tempo, in milliseconds.
    #[inline]
    #[must_use]
    pub fn beat_length_ms(self) -> f64 {
        MS_PER_MINUTE / self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_and_non_finite() {
        assert!(Bpm::new(0.0).is_none());
        assert!(Bpm::new(-120.0).is_none());
        assert!(Bpm::new(f64::NAN).is_none());
        assert!(Bpm::new(f64::INFINITY).is_none());
        assert!(Bpm::from_beat_length(0.0).is_none());
        assert!(Bpm::from_beat_length(-100.0).is_none());
    }

    #[test]
    fn converts_beat_length() {
        let bpm = Bpm::from_beat_length(500.0).unwrap();
        assert!((bpm.as_f64() - 120.0).abs() < 1e-12);
        assert!((Bpm::FALLBACK.beat_length_ms() - 500.0).abs() < 1e-12);
    }
}
