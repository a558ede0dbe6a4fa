//! Skip / resume / fresh decision from the local file length.
//!
//! No manifest is kept: whatever is on disk under the resolved filename is
//! taken as the prefix of the part.

/// What to do with one part after probing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPlan {
    /// Local file already holds the expected `len` bytes.
    Skip { len: u64 },
    /// Ranged GET appending from `offset`.
    Resume { offset: u64 },
    /// Full GET into a created or truncated file.
    Fresh,
}

impl FetchPlan {
    /// Byte offset the transfer starts at.
    pub fn offset(&self) -> u64 {
        match self {
            FetchPlan::Resume { offset } => *offset,
            FetchPlan::Skip { .. } | FetchPlan::Fresh => 0,
        }
    }
}

/// Decides the plan from the local length (`None` if missing) and the
/// expected length (`None` or `Some(0)` when the server did not say).
///
/// With an unknown size, any nonzero local file is resumed; the server's
/// `416` answer then tells the transfer the part was already complete.
pub fn plan(local_len: Option<u64>, expected: Option<u64>) -> FetchPlan {
    let expected = expected.filter(|&n| n > 0);
    match (local_len, expected) {
        (None, _) | (Some(0), _) => FetchPlan::Fresh,
        (Some(local), Some(total)) if local == total => FetchPlan::Skip { len: local },
        (Some(local), Some(total)) if local < total => FetchPlan::Resume { offset: local },
        (Some(_), Some(_)) => FetchPlan::Fresh,
        (Some(local), None) => FetchPlan::Resume { offset: local },
    }
}

/// `Range` header value for a resumed fetch.
pub fn range_header(offset: u64) -> String {
    format!("bytes={}-", offset)
}
