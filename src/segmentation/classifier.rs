use crate::models::{Spurt, SpurtCandidate};

/// Silence between the end of `prior` and `next_created_at`, clamped to zero.
///
/// Gaps are measured from where the earlier spurt's typing stopped, so a long
/// spurt never counts as silence on its own.
pub fn gap_ms(prior: &Spurt, next_created_at: i64) -> i64 {
    (next_created_at - prior.end_ms()).max(0)
}

/// Decides whether `candidate` opens a new paragraph in a stream whose last
/// stored spurt is `prior`.
///
/// The first spurt of a stream always opens a paragraph. Otherwise the
/// clamped gap must strictly exceed the threshold.
pub fn is_paragraph_start(
    candidate: &SpurtCandidate,
    prior: Option<&Spurt>,
    paragraph_threshold_ms: u64,
) -> bool {
    match prior {
        None => true,
        Some(prior) => (gap_ms(prior, candidate.created_at) as u64) > paragraph_threshold_ms,
    }
}
