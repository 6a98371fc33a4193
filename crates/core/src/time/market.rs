use anyhow::Context;
use chrono::{DateTime, Datelike, FixedOffset, Utc};

/// Market-local time for a fixed UTC offset in whole hours.
pub fn market_now(now_utc: DateTime<Utc>, utc_offset_hours: i32) -> anyhow::Result<DateTime<FixedOffset>> {
    anyhow::ensure!(
        (-12..=14).contains(&utc_offset_hours),
        "UTC offset must be within -12..=14 hours (got {utc_offset_hours})"
    );
    let offset = FixedOffset::east_opt(utc_offset_hours * 3600).context("invalid market UTC offset")?;
    Ok(now_utc.with_timezone(&offset))
}

/// Saturday and Sunday sessions do not exist; a weekend run reports the last close.
pub fn is_weekend(local: &DateTime<FixedOffset>) -> bool {
    matches!(local.weekday(), chrono::Weekday::Sat | chrono::Weekday::Sun)
}
