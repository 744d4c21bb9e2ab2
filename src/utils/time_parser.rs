use chrono::{DateTime, Duration, Utc};

use crate::errors::{PastelinkerError, Result};

/// 解析过期时间，支持：
/// - RFC3339：2026-10-01T12:00:00Z
/// - 相对时间：1d, 2w, 1h30m, 1d2h30m
/// - `now`：立即过期
pub fn parse_expire_time(input: &str) -> Result<DateTime<Utc>> {
    parse_expire_time_at(input, Utc::now())
}

pub fn parse_expire_time_at(input: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let input = input.trim();

    if input.eq_ignore_ascii_case("now") {
        return Ok(now);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    let duration = parse_relative(input)?;
    now.checked_add_signed(duration)
        .ok_or_else(|| PastelinkerError::validation(format!("Expire time out of range: '{}'", input)))
}

fn parse_relative(input: &str) -> Result<Duration> {
    let invalid = || PastelinkerError::validation(format!("Invalid time format: '{}'", input));

    let mut total = Duration::zero();
    let mut rest = input;

    while !rest.is_empty() {
        let digits = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        if digits == 0 {
            return Err(invalid());
        }
        let num: i64 = rest[..digits].parse().map_err(|_| invalid())?;
        rest = &rest[digits..];

        let unit_len = rest
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(rest.len());
        if unit_len == 0 {
            return Err(PastelinkerError::validation(format!(
                "Missing time unit after '{}' in '{}'",
                num, input
            )));
        }
        let unit = &rest[..unit_len];
        rest = &rest[unit_len..];

        // "M" 为月，其余单位不区分大小写
        let step = match unit {
            "M" => Duration::try_days(num.saturating_mul(30)),
            _ => match unit.to_ascii_lowercase().as_str() {
                "s" | "sec" | "second" | "seconds" => Duration::try_seconds(num),
                "m" | "min" | "minute" | "minutes" => Duration::try_minutes(num),
                "h" | "hour" | "hours" => Duration::try_hours(num),
                "d" | "day" | "days" => Duration::try_days(num),
                "w" | "week" | "weeks" => Duration::try_weeks(num),
                "month" | "months" => Duration::try_days(num.saturating_mul(30)),
                "y" | "year" | "years" => Duration::try_days(num.saturating_mul(365)),
                _ => {
                    return Err(PastelinkerError::validation(format!(
                        "Unsupported time unit: '{}'",
                        unit
                    )));
                }
            },
        };
        total = step
            .and_then(|step| total.checked_add(&step))
            .ok_or_else(invalid)?;
    }

    if total.is_zero() {
        return Err(PastelinkerError::validation("Time span must not be zero"));
    }
    Ok(total)
}

/// 距离过期的剩余时间，人类可读
pub fn format_remaining(now: DateTime<Utc>, until: DateTime<Utc>) -> String {
    let secs = until.signed_duration_since(now).num_seconds();
    if secs < 0 {
        return "expired".to_string();
    }

    let (days, hours, minutes) = (secs / 86400, (secs % 86400) / 3600, (secs % 3600) / 60);
    match (days, hours, minutes) {
        (0, 0, 0) => format!("{}s", secs),
        (0, 0, m) => format!("{}m", m),
        (0, h, 0) => format!("{}h", h),
        (0, h, m) => format!("{}h{}m", h, m),
        (d, 0, _) => format!("{}d", d),
        (d, h, _) => format!("{}d{}h", d, h),
    }
}
