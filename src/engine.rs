use crate::types::VoteEstimate;

/// Seconds in an hour.
pub const SECS_PER_HOUR: f64 = 60.0 * 60.0;

/// Submissions at or past this age (12 hours) leave the working set.
pub const MAX_AGE_SECS: f64 = 12.0 * SECS_PER_HOUR;

/// Current wall-clock time in fractional seconds since the epoch.
pub fn unix_now() -> f64 {
    chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

/// Estimate the up/down split of a net `score` from the platform's upvote ratio.
///
/// Solves `ups - downs = score` and `ups / (ups + downs) = ratio` for `ups`.
/// A ratio of exactly 0.5 carries no direction, so the score is split evenly.
/// Halves round to even.
///
/// The formula is kept as is and nothing is clamped. `downs` goes negative
/// whenever `ups` rounds below `score` (an even ratio with a positive score
/// gives `downs = -score / 2`), and ratios just off 0.5 produce very large
/// estimates. Non-finite values saturate in the integer cast.
pub fn estimate_votes(score: i64, ratio: f64) -> VoteEstimate {
    let score_f = score as f64;
    let raw = if ratio == 0.5 {
        score_f / 2.0
    } else {
        (ratio * score_f) / (2.0 * ratio - 1.0)
    };
    let ups = raw.round_ties_even() as i64;
    VoteEstimate {
        ups,
        downs: ups.saturating_sub(score),
    }
}

/// Age in hours, rounded to one decimal place, as shown in status lines.
pub fn age_hours(created_utc: f64, now: f64) -> f64 {
    round_tenths((now - created_utc) / SECS_PER_HOUR).abs()
}

/// Round to one decimal place.
pub fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}
