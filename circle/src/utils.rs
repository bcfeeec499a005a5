//! Utility functions

use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, TimeZone};
use chrono_tz::Tz;

use crate::errors::{CircleError, Result};

/// Render a byte count with a binary unit, truncating to a whole number
pub fn human_bytes(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = KIB * 1024;
    const GIB: u64 = MIB * 1024;

    if bytes < KIB {
        format!("{}B", bytes)
    } else if bytes < MIB {
        format!("{}KiB", bytes / KIB)
    } else if bytes < GIB {
        format!("{}MiB", bytes / MIB)
    } else {
        format!("{}GiB", bytes / GIB)
    }
}

/// Bytes per second over `elapsed`, as [`human_bytes`]
pub fn human_rate(bytes: u64, elapsed: std::time::Duration) -> String {
    let secs = elapsed.as_secs_f64();
    if secs <= 0.0 {
        return human_bytes(bytes);
    }
    human_bytes((bytes as f64 / secs) as u64)
}

/// Parse durations such as `90s`, `5m10s` or `1h30m`
pub fn parse_duration(input: &str) -> Result<Duration> {
    let invalid = || CircleError::Config(format!("Invalid duration: {:?}", input));

    let mut total = Duration::zero();
    let mut digits = String::new();
    for c in input.trim().chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }

        let amount: i64 = digits.parse().map_err(|_| invalid())?;
        digits.clear();
        let unit = match c {
            'h' => Duration::hours(amount),
            'm' => Duration::minutes(amount),
            's' => Duration::seconds(amount),
            _ => return Err(invalid()),
        };
        total = total + unit;
    }

    if !digits.is_empty() || total.is_zero() {
        return Err(invalid());
    }
    Ok(total)
}

/// Zone in which the caller reads and writes wall-clock times
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    /// The system's local zone
    Local,

    /// An IANA zone such as `America/Los_Angeles`
    Named(Tz),

    /// A fixed UTC offset
    Fixed(FixedOffset),
}

impl std::str::FromStr for Zone {
    type Err = CircleError;

    /// Accepts `local`, an IANA name like `Europe/Paris` or `UTC`, or an
    /// offset like `+02:00`, `-0800`
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || CircleError::Config(format!("Invalid time zone: {:?}", s));

        if s.is_empty() || s.eq_ignore_ascii_case("local") {
            return Ok(Zone::Local);
        }

        let (sign, rest) = match s.as_bytes().first() {
            Some(b'+') => (1, &s[1..]),
            Some(b'-') => (-1, &s[1..]),
            _ if s.eq_ignore_ascii_case("utc") => return Ok(Zone::Named(Tz::UTC)),
            _ => return s.parse::<Tz>().map(Zone::Named).map_err(|_| invalid()),
        };
        let digits: String = rest.chars().filter(|c| *c != ':').collect();
        if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let hours: i32 = digits[..2].parse().map_err(|_| invalid())?;
        let minutes: i32 = digits[2..].parse().map_err(|_| invalid())?;
        FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
            .map(Zone::Fixed)
            .ok_or_else(invalid)
    }
}

/// Interpret a wall-clock time in `zone`, taking the earlier reading when a
/// DST fold makes it ambiguous
pub fn localize<Z: TimeZone>(zone: &Z, naive: NaiveDateTime) -> Result<DateTime<Z>> {
    zone.from_local_datetime(&naive).earliest().ok_or_else(|| {
        CircleError::Config(format!("{} does not exist in the requested zone", naive))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_bytes() {
        assert_eq!(human_bytes(0), "0B");
        assert_eq!(human_bytes(1023), "1023B");
        assert_eq!(human_bytes(1024), "1KiB");
        assert_eq!(human_bytes(5 * 1024 * 1024 + 1), "5MiB");
        assert_eq!(human_bytes(3 * 1024 * 1024 * 1024), "3GiB");
    }

    #[test]
    fn test_human_rate() {
        let rate = human_rate(4096, std::time::Duration::from_secs(2));
        assert_eq!(rate, "2KiB");
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("90s").unwrap(), Duration::seconds(90));
        assert_eq!(parse_duration("5m10s").unwrap(), Duration::seconds(310));
        assert_eq!(parse_duration("1h30m").unwrap(), Duration::minutes(90));
        assert!(parse_duration("").is_err());
        assert!(parse_duration("10").is_err());
        assert!(parse_duration("1d").is_err());
        assert!(parse_duration("h").is_err());
    }

    #[test]
    fn test_parse_zone() {
        assert_eq!("local".parse::<Zone>().unwrap(), Zone::Local);
        assert_eq!("UTC".parse::<Zone>().unwrap(), Zone::Named(Tz::UTC));
        assert_eq!("utc".parse::<Zone>().unwrap(), Zone::Named(Tz::UTC));
        assert_eq!(
            "America/Los_Angeles".parse::<Zone>().unwrap(),
            Zone::Named(chrono_tz::America::Los_Angeles)
        );
        assert_eq!(
            "-08:00".parse::<Zone>().unwrap(),
            Zone::Fixed(FixedOffset::west_opt(8 * 3600).unwrap())
        );
        assert_eq!(
            "+0530".parse::<Zone>().unwrap(),
            Zone::Fixed(FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap())
        );
        assert!("Mars/Olympus_Mons".parse::<Zone>().is_err());
        assert!("+8".parse::<Zone>().is_err());
    }

    #[test]
    fn test_localize_fixed() {
        let offset = FixedOffset::east_opt(3600).unwrap();
        let naive =
            NaiveDateTime::parse_from_str("Jan 02 2024 15:04:05", "%b %d %Y %H:%M:%S").unwrap();
        let time = localize(&offset, naive).unwrap();
        assert_eq!(time.to_rfc3339(), "2024-01-02T15:04:05+01:00");
    }

    #[test]
    fn test_localize_named_follows_dst() {
        let la = chrono_tz::America::Los_Angeles;
        let winter = NaiveDateTime::parse_from_str("2024-03-09 12:00", "%Y-%m-%d %H:%M").unwrap();
        let summer = NaiveDateTime::parse_from_str("2024-03-11 12:00", "%Y-%m-%d %H:%M").unwrap();
        assert_eq!(localize(&la, winter).unwrap().to_rfc3339(), "2024-03-09T12:00:00-08:00");
        assert_eq!(localize(&la, summer).unwrap().to_rfc3339(), "2024-03-11T12:00:00-07:00");

        // 02:30 is skipped when clocks spring forward
        let gap = NaiveDateTime::parse_from_str("2024-03-10 02:30", "%Y-%m-%d %H:%M").unwrap();
        assert!(localize(&la, gap).is_err());
    }
}
