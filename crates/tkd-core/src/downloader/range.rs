//! Inclusive index range of parts to fetch.

use std::ops::RangeInclusive;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RangeError {
    #[error("the export has no parts (total_parts = 0)")]
    Empty,
    #[error("start index {start} is after end index {end}")]
    StartAfterEnd { start: usize, end: usize },
    #[error("index {index} is out of range (parts are 0-{last})")]
    OutOfRange { index: usize, last: usize },
}

/// Validated `start..=end` with `start <= end < total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartRange {
    start: usize,
    end: usize,
}

impl PartRange {
    /// Every part of an export with `total` parts.
    pub fn full(total: usize) -> Result<Self, RangeError> {
        Self::from_bounds(None, None, total)
    }

    /// Bounds from the command line; a missing bound defaults to the first / last part.
    pub fn from_bounds(
        start: Option<usize>,
        end: Option<usize>,
        total: usize,
    ) -> Result<Self, RangeError> {
        let last = total.checked_sub(1).ok_or(RangeError::Empty)?;
        let start = start.unwrap_or(0);
        let end = end.unwrap_or(last);
        for index in [start, end] {
            if index > last {
                return Err(RangeError::OutOfRange { index, last });
            }
        }
        if start > end {
            return Err(RangeError::StartAfterEnd { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    /// Number of parts in the range; at least one.
    pub fn count(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn indices(&self) -> RangeInclusive<usize> {
        self.start..=self.end
    }
}
