//! Timestamp parsing and formatting
//!
//! Positions are exchanged with users as either plain seconds (`70`, `70.5`)
//! or colon separated clock values (`01:10`, `1:02:03`).

use thiserror::Error;

const SECS_PER_MINUTE: u64 = 60;
const SECS_PER_HOUR: u64 = 60 * SECS_PER_MINUTE;
const SECS_PER_DAY: u64 = 24 * SECS_PER_HOUR;

/// Timestamp parse failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid timestamp '{0}': expected seconds (70) or a clock value (01:10)")]
pub struct TimestampError(pub String);

/// Parse a user supplied position into seconds
///
/// Accepts `ss[.fff]`, `mm:ss[.fff]` and `hh:mm:ss[.fff]`. Minutes and seconds
/// after the leading component must be below 60.
pub fn parse(input: &str) -> Result<f64, TimestampError> {
    let trimmed = input.trim();
    let invalid = || TimestampError(input.to_string());

    if trimmed.is_empty() {
        return Err(invalid());
    }

    let parts: Vec<&str> = trimmed.split(':').collect();
    if parts.len() > 3 {
        return Err(invalid());
    }

    let (leading, rest) = parts.split_at(parts.len() - 1);
    let seconds: f64 = rest[0].parse().map_err(|_| invalid())?;
    if !seconds.is_finite() || seconds < 0.0 || rest[0].starts_with('+') {
        return Err(invalid());
    }
    if !leading.is_empty() && seconds >= 60.0 {
        return Err(invalid());
    }

    let mut total = seconds;
    for (i, part) in leading.iter().rev().enumerate() {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let value: u64 = part.parse().map_err(|_| invalid())?;
        // Minutes are bounded only when hours lead.
        let is_minutes = i == 0;
        if is_minutes && leading.len() == 2 && value >= 60 {
            return Err(invalid());
        }
        let unit = if is_minutes {
            SECS_PER_MINUTE
        } else {
            SECS_PER_HOUR
        };
        total += value.checked_mul(unit).ok_or_else(invalid)? as f64;
    }

    Ok(total)
}

/// Render a position in seconds as `mm:ss`, `hh:mm:ss` or `dd:hh:mm:ss`
///
/// Fractions are truncated.
pub fn format(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };

    let days = total / SECS_PER_DAY;
    let hours = total / SECS_PER_HOUR % 24;
    let minutes = total / SECS_PER_MINUTE % 60;
    let secs = total % 60;

    if days != 0 {
        format!("{:02}:{:02}:{:02}:{:02}", days, hours, minutes, secs)
    } else if hours != 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}
