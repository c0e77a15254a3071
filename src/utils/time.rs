//! Time helpers

use chrono::{DateTime, Duration, DurationRound, Utc};

/// Drop seconds and sub-second precision
pub fn truncate_to_minute(at: DateTime<Utc>) -> DateTime<Utc> {
    // Rounding a UTC instant to a whole minute cannot overflow.
    at.duration_trunc(Duration::minutes(1)).unwrap_or(at)
}

/// The current instant at minute precision, used for `createdAt`
pub fn current_minute() -> DateTime<Utc> {
    truncate_to_minute(Utc::now())
}
