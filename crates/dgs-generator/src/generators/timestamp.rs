//! Timestamp and interval generators.

use chrono::{DateTime, Utc};
use rand::Rng;
use std::time::Duration;

/// Generate a random timestamp in `[min, max)` with whole second precision.
///
/// Returns `None` when the result is outside chrono's representable range.
pub fn generate_timestamp_range<R: Rng + ?Sized>(
    rng: &mut R,
    min: DateTime<Utc>,
    max: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    let (min_ts, max_ts) = (min.timestamp(), max.timestamp());
    let (min_ts, max_ts) = if min_ts > max_ts {
        (max_ts, min_ts)
    } else {
        (min_ts, max_ts)
    };

    if min_ts == max_ts {
        return DateTime::from_timestamp(min_ts, 0);
    }

    let offset = rng.random_range(0..max_ts - min_ts);
    DateTime::from_timestamp(min_ts + offset, 0)
}

/// Generate a random interval in `[min, max)` whole seconds.
pub fn generate_interval_range<R: Rng + ?Sized>(
    rng: &mut R,
    min: Duration,
    max: Duration,
) -> Duration {
    let (min, max) = (min.as_secs(), max.as_secs());
    let (min, max) = if min > max { (max, min) } else { (min, max) };

    if min == max {
        return Duration::from_secs(min);
    }

    Duration::from_secs(min + rng.random_range(0..max - min))
}
