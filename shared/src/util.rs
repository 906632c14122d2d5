use std::sync::atomic::{AtomicI64, Ordering};

/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Last id handed out by this process
static LAST_ID: AtomicI64 = AtomicI64::new(0);

/// Generate a Snowflake-style i64 for use as resource ID.
///
/// Layout (53 bits, fits in JavaScript's Number.MAX_SAFE_INTEGER):
///   - 41 bits: milliseconds since 2024-01-01 UTC (~69 years)
///   - 12 bits: random start, then a sequence
///
/// Ids are strictly increasing within a process: a candidate that is not
/// above the last id becomes `last + 1`, so bulk inserts in one millisecond
/// never repeat an id. Random low bits keep separate processes apart.
pub fn snowflake_id() -> i64 {
    use rand::Rng;
    // Custom epoch: 2024-01-01 00:00:00 UTC
    const EPOCH_MS: i64 = 1_704_067_200_000;
    let ts = (now_millis() - EPOCH_MS) & 0x1FF_FFFF_FFFF; // 41 bits
    let candidate = (ts << 12) | rand::thread_rng().gen_range(0..0x1000);
    let previous = LAST_ID
        .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |last| {
            Some(candidate.max(last + 1))
        })
        .unwrap_or_else(|last| last);
    candidate.max(previous + 1)
}

/// Millisecond timestamp of 00:00 (UTC+7, Asia/Jakarta) for the day containing `millis`
pub fn start_of_day_wib(millis: i64) -> i64 {
    const WIB_OFFSET_MS: i64 = 7 * 60 * 60 * 1000;
    const DAY_MS: i64 = 24 * 60 * 60 * 1000;
    let local = millis + WIB_OFFSET_MS;
    local - local.rem_euclid(DAY_MS) - WIB_OFFSET_MS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snowflake_fits_js_safe_integer() {
        let id = snowflake_id();
        assert!(id > 0);
        assert!(id < (1_i64 << 53));
    }

    #[test]
    fn snowflake_is_time_ordered() {
        let a = snowflake_id();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = snowflake_id();
        assert!(b > a);
    }

    #[test]
    fn snowflake_never_repeats_in_a_burst() {
        let ids: Vec<i64> = (0..20_000).map(|_| snowflake_id()).collect();
        assert!(ids.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn snowflake_is_unique_across_threads() {
        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(|| (0..2_000).map(|_| snowflake_id()).collect::<Vec<_>>()))
            .collect();
        let mut ids: Vec<i64> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        let count = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), count);
    }

    #[test]
    fn start_of_day_uses_jakarta_offset() {
        // 2025-03-10 18:30 UTC == 2025-03-11 01:30 WIB
        let t = 1_741_631_400_000;
        // 2025-03-11 00:00 WIB == 2025-03-10 17:00 UTC
        assert_eq!(start_of_day_wib(t), 1_741_626_000_000);
        assert_eq!(start_of_day_wib(1_741_626_000_000), 1_741_626_000_000);
    }
}
