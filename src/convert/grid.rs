//! Sparse row/column note grid.

use std::{collections::BTreeMap, num::NonZeroU32};

/// Beats in one measure of the grid.
pub const BEATS_PER_MEASURE: f64 = 4.0;

/// The content of one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NoteCell {
    /// `0`, no note.
    #[default]
    Empty,
    /// `1`, a tap note.
    Tap,
    /// `2`, the head of a hold note.
    HoldHead,
    /// `3`, the tail of a hold note.
    HoldTail,
}

impl NoteCell {
    /// The character of this cell in a grid row.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Empty => '0',
            Self::Tap => '1',
            Self::HoldHead => '2',
            Self::HoldTail => '3',
        }
    }
}

/// A note grid: `quantization` rows per measure, `key_count` cells per row.
///
/// Only rows which received a note are stored; every other row reads as all [`NoteCell::Empty`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Grid {
    quantization: NonZeroU32,
    key_count: u8,
    rows: BTreeMap<u64, Vec<NoteCell>>,
}

impl Grid {
    /// Creates an empty grid.
    #[must_use]
    pub const fn new(quantization: NonZeroU32, key_count: u8) -> Self {
        Self {
            quantization,
            key_count,
            rows: BTreeMap::new(),
        }
    }

    /// Rows per measure.
    #[must_use]
    pub const fn quantization(&self) -> NonZeroU32 {
        self.quantization
    }

    /// Cells per row.
    #[must_use]
    pub const fn key_count(&self) -> u8 {
        self.key_count
    }

    /// Writes `cell` at `row`/`column`, replacing whatever was there.
    ///
    /// Columns outside the key count are ignored.
    pub fn set(&mut self, row: u64, column: u8, cell: NoteCell) {
        let width = usize::from(self.key_count);
        let cells = self
            .rows
            .entry(row)
            .or_insert_with(|| vec![NoteCell::Empty; width]);
        if let Some(slot) = cells.get_mut(usize::from(column)) {
            *slot = cell;
        }
    }

    /// The cells of `row`, or `None` if nothing was written there.
    #[must_use]
    pub fn row(&self, row: u64) -> Option<&[NoteCell]> {
        self.rows.get(&row).map(Vec::as_slice)
    }

    /// Number of rows that received at least one write.
    #[must_use]
    pub fn occupied_rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of measures needed to hold every written row, at least one.
    ///
    /// `ceil((max_row + 1) / quantization)`.
    #[must_use]
    pub fn measure_count(&self) -> u64 {
        let quantization = u64::from(self.quantization.get());
        self.rows
            .last_key_value()
            .map_or(1, |(&max_row, _)| (max_row + 1).div_ceil(quantization))
    }

    /// Writes the text of `row` into `out`, all zeros if nothing was written there.
    pub fn write_row(&self, row: u64, out: &mut String) {
        match self.rows.get(&row) {
            Some(cells) => out.extend(cells.iter().map(|cell| cell.as_char())),
            None => out.extend(std::iter::repeat_n(
                NoteCell::Empty.as_char(),
                usize::from(self.key_count),
            )),
        }
    }

    /// The text of `row`.
    #[must_use]
    pub fn row_string(&self, row: u64) -> String {
        let mut out = String::with_capacity(usize::from(self.key_count));
        self.write_row(row, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Grid {
        Grid::new(NonZeroU32::new(4).unwrap(), 4)
    }

    #[test]
    fn last_writer_wins() {
        let mut grid = grid();
        grid.set(1, 2, NoteCell::Tap);
        grid.set(1, 2, NoteCell::HoldHead);
        grid.set(1, 9, NoteCell::Tap);
        assert_eq!(grid.row_string(1), "0020");
        assert_eq!(grid.row_string(0), "0000");
    }

    #[test]
    fn measure_count_rounds_up() {
        let mut grid = grid();
        assert_eq!(grid.measure_count(), 1);
        grid.set(3, 0, NoteCell::Tap);
        assert_eq!(grid.measure_count(), 1);
        grid.set(4, 0, NoteCell::Tap);
        assert_eq!(grid.measure_count(), 2);
    }
}
