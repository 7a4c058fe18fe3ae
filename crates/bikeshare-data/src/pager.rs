//! Five-rows-at-a-time paging over a filtered trip sequence.

use bikeshare_core::models::TripRecord;

/// Rows returned by each [`RowPager::next_page`] call.
pub const PAGE_SIZE: usize = 5;

/// Cursor over one filtered sequence.
///
/// The cursor only moves forward; start over by creating a new pager.
#[derive(Debug, Clone)]
pub struct RowPager<'a> {
    rows: &'a [TripRecord],
    cursor: usize,
}

impl<'a> RowPager<'a> {
    pub fn new(rows: &'a [TripRecord]) -> Self {
        Self { rows, cursor: 0 }
    }

    /// The next up-to-[`PAGE_SIZE`] rows. Once the sequence is exhausted every
    /// call returns an empty slice.
    pub fn next_page(&mut self) -> &'a [TripRecord] {
        let start = self.cursor.min(self.rows.len());
        let end = (start + PAGE_SIZE).min(self.rows.len());
        self.cursor = end;
        &self.rows[start..end]
    }

    /// `true` when no rows remain.
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.rows.len()
    }

    /// Index of the first row the next page will contain.
    pub fn position(&self) -> usize {
        self.cursor
    }
}
