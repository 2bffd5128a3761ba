//! ISO-8601 durations (`PT5M`, `P1D`, `PT1H30M`) as used by monitor
//! windows, time grains and cooldowns.

use chrono::Duration;

use crate::types::{AzureError, AzureResult};

pub fn format_duration(duration: Duration) -> String {
    let total = duration.num_seconds().max(0);
    if total == 0 {
        return "PT0S".into();
    }
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;

    let mut out = String::from("P");
    if days > 0 {
        out.push_str(&format!("{days}D"));
    }
    if hours > 0 || minutes > 0 || seconds > 0 {
        out.push('T');
        if hours > 0 {
            out.push_str(&format!("{hours}H"));
        }
        if minutes > 0 {
            out.push_str(&format!("{minutes}M"));
        }
        if seconds > 0 {
            out.push_str(&format!("{seconds}S"));
        }
    }
    out
}

/// Parse `PnWnDTnHnMnS` (any component optional, seconds may be
/// fractional and are truncated to milliseconds).
pub fn parse_duration(text: &str) -> AzureResult<Duration> {
    let invalid = || AzureError::validation(format!("Invalid ISO-8601 duration '{text}'"));

    let upper = text.trim().to_ascii_uppercase();
    let rest = upper.strip_prefix('P').ok_or_else(invalid)?;
    if rest.is_empty() {
        return Err(invalid());
    }

    let (date_part, time_part) = match rest.split_once('T') {
        Some((d, t)) if !t.is_empty() => (d, Some(t)),
        Some(_) => return Err(invalid()),
        None => (rest, None),
    };

    let mut millis: i64 = 0;
    let mut number = String::new();
    for c in date_part.chars() {
        match c {
            '0'..='9' => number.push(c),
            'W' | 'D' => {
                let n: i64 = number.parse().map_err(|_| invalid())?;
                let unit = if c == 'W' { 7 * 86_400_000 } else { 86_400_000 };
                millis += n * unit;
                number.clear();
            }
            _ => return Err(invalid()),
        }
    }
    if !number.is_empty() {
        return Err(invalid());
    }

    for c in time_part.unwrap_or("").chars() {
        match c {
            '0'..='9' | '.' => number.push(c),
            'H' | 'M' => {
                let n: i64 = number.parse().map_err(|_| invalid())?;
                millis += n * if c == 'H' { 3_600_000 } else { 60_000 };
                number.clear();
            }
            'S' => {
                let n: f64 = number.parse().map_err(|_| invalid())?;
                millis += (n * 1000.0) as i64;
                number.clear();
            }
            _ => return Err(invalid()),
        }
    }
    if !number.is_empty() {
        return Err(invalid());
    }

    Ok(Duration::milliseconds(millis))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_common_windows() {
        assert_eq!(format_duration(Duration::minutes(5)), "PT5M");
        assert_eq!(format_duration(Duration::days(1)), "P1D");
        assert_eq!(format_duration(Duration::minutes(90)), "PT1H30M");
        assert_eq!(format_duration(Duration::seconds(0)), "PT0S");
        assert_eq!(
            format_duration(Duration::days(2) + Duration::seconds(5)),
            "P2DT5S"
        );
    }

    #[test]
    fn parses_common_windows() {
        assert_eq!(parse_duration("PT5M").unwrap(), Duration::minutes(5));
        assert_eq!(parse_duration("P1D").unwrap(), Duration::days(1));
        assert_eq!(parse_duration("pt1h30m").unwrap(), Duration::minutes(90));
        assert_eq!(parse_duration("P1W").unwrap(), Duration::days(7));
        assert_eq!(parse_duration("PT1.5S").unwrap(), Duration::milliseconds(1500));
    }

    #[test]
    fn rejects_malformed() {
        for bad in ["", "5M", "P", "PT", "P5", "PT5X", "P1H"] {
            assert!(parse_duration(bad).is_err(), "{bad}");
        }
    }
}
