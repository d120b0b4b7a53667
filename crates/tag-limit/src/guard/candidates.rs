//! Pending tag text parsing.

/// Separator between tag names in the pending input.
pub const TAG_DELIMITER: char = ',';

/// Candidate tag names in the pending input, trimmed.
///
/// Blank tokens are skipped, so `""`, `"  "`, `"a,"` and `"a,,b"` yield
/// zero, zero, one and two candidates.
pub fn candidates(pending: &str) -> impl Iterator<Item = &str> {
    pending
        .split(TAG_DELIMITER)
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Number of candidate tag names in the pending input.
pub fn count_candidates(pending: &str) -> usize {
    candidates(pending).count()
}
