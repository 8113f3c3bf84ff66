//! UTC datetime utilities without timezone dependencies.
//!
//! Provides a lightweight `DateTimeUtc` struct for the dates that drive
//! permalinks (`:year/:month/:day`) and post ordering.
//!
//! # Examples
//!
//! ```ignore
//! let dt = DateTimeUtc::parse("2024-06-15").unwrap();
//! let dt = DateTimeUtc::parse("2024-06-15T14:30:45Z").unwrap();
//! let (dt, rest) = DateTimeUtc::split_filename_prefix("2024-06-15-hello").unwrap();
//! assert_eq!(rest, "hello");
//! ```

use anyhow::{Result, bail};

/// UTC datetime without timezone complexity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DateTimeUtc {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl DateTimeUtc {
    pub const fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    pub const fn from_ymd(year: u16, month: u8, day: u8) -> Self {
        Self::new(year, month, day, 0, 0, 0)
    }

    /// Parse from "YYYY-MM-DD", "YYYY-MM-DD HH:MM:SS" or "YYYY-MM-DDTHH:MM:SSZ".
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let (date, time) = match s.len() {
            10 => (s, None),
            19 => (s.get(..10)?, Some(s.get(11..)?)),
            20 if s.ends_with('Z') => (s.get(..10)?, Some(s.get(11..19)?)),
            _ => return None,
        };
        if time.is_some() && !matches!(s.as_bytes()[10], b'T' | b' ') {
            return None;
        }

        let [year, month, day] = fields::<3>(date, '-', &[4, 2, 2])?;
        let [hour, minute, second] = match time {
            Some(time) => fields::<3>(time, ':', &[2, 2, 2])?,
            None => [0; 3],
        };

        let dt = Self::new(
            u16::try_from(year).ok()?,
            u8::try_from(month).ok()?,
            u8::try_from(day).ok()?,
            u8::try_from(hour).ok()?,
            u8::try_from(minute).ok()?,
            u8::try_from(second).ok()?,
        );
        dt.validate().ok()?;
        Some(dt)
    }

    /// Split a Jekyll-style `YYYY-MM-DD-` prefix off a file stem.
    ///
    /// Returns the date and the remaining stem, or `None` without a valid prefix.
    pub fn split_filename_prefix(stem: &str) -> Option<(Self, &str)> {
        let prefix = stem.get(..11)?;
        if !prefix.ends_with('-') {
            return None;
        }
        let date = Self::parse(&prefix[..10])?;
        let rest = &stem[11..];
        (!rest.is_empty()).then_some((date, rest))
    }

    pub fn validate(&self) -> Result<()> {
        let Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        } = *self;

        if !(1..=12).contains(&month) {
            bail!("month is invalid: {month}");
        }

        let max_days = Self::days_in_month(year, month);
        if day == 0 || day > max_days {
            bail!("day is invalid: {day}");
        }
        if hour > 23 {
            bail!("hour is invalid: {hour}");
        }
        if minute > 59 {
            bail!("minute is invalid: {minute}");
        }
        if second > 59 {
            bail!("second is invalid: {second}");
        }

        Ok(())
    }

    #[inline]
    #[allow(clippy::manual_is_multiple_of)] // Manual impl for const fn
    const fn is_leap_year(year: u16) -> bool {
        year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
    }

    #[inline]
    const fn days_in_month(year: u16, month: u8) -> u8 {
        match month {
            1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
            4 | 6 | 9 | 11 => 30,
            2 if Self::is_leap_year(year) => 29,
            2 => 28,
            _ => 0,
        }
    }
}

/// Split `text` on `sep` into exactly `N` all-digit fields of the given widths.
fn fields<const N: usize>(text: &str, sep: char, widths: &[usize; N]) -> Option<[u32; N]> {
    let mut out = [0; N];
    let mut parts = text.split(sep);
    for (slot, &width) in out.iter_mut().zip(widths) {
        let part = parts.next()?;
        if part.len() != width || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *slot = part.parse().ok()?;
    }
    parts.next().is_none().then_some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_only() {
        assert_eq!(
            DateTimeUtc::parse("2024-06-15"),
            Some(DateTimeUtc::from_ymd(2024, 6, 15))
        );
    }

    #[test]
    fn test_parse_with_time() {
        let expected = Some(DateTimeUtc::new(2024, 6, 15, 14, 30, 45));
        assert_eq!(DateTimeUtc::parse("2024-06-15T14:30:45Z"), expected);
        assert_eq!(DateTimeUtc::parse("2024-06-15 14:30:45"), expected);
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(DateTimeUtc::parse("2024-13-01"), None);
        assert_eq!(DateTimeUtc::parse("2023-02-29"), None);
        assert_eq!(DateTimeUtc::parse("June 15"), None);
        assert_eq!(DateTimeUtc::parse("2024-06-15T14:30:45+02:00"), None);
    }

    #[test]
    fn test_split_filename_prefix() {
        let (date, rest) = DateTimeUtc::split_filename_prefix("2024-06-15-hello-world").unwrap();
        assert_eq!(date, DateTimeUtc::from_ymd(2024, 6, 15));
        assert_eq!(rest, "hello-world");

        assert!(DateTimeUtc::split_filename_prefix("hello-world").is_none());
        assert!(DateTimeUtc::split_filename_prefix("2024-06-15-").is_none());
        assert!(DateTimeUtc::split_filename_prefix("2024-06-15").is_none());
    }

    #[test]
    fn test_validate_leap_year() {
        assert!(DateTimeUtc::new(2024, 2, 29, 12, 0, 0).validate().is_ok());
        assert!(DateTimeUtc::new(2000, 2, 29, 12, 0, 0).validate().is_ok());
        assert!(DateTimeUtc::new(2023, 2, 29, 12, 0, 0).validate().is_err());
        assert!(DateTimeUtc::new(1900, 2, 29, 12, 0, 0).validate().is_err());
    }

    #[test]
    fn test_validate_time_bounds() {
        assert!(DateTimeUtc::new(2024, 6, 15, 24, 0, 0).validate().is_err());
        assert!(DateTimeUtc::new(2024, 6, 15, 12, 60, 0).validate().is_err());
        assert!(DateTimeUtc::new(2024, 6, 15, 12, 30, 60).validate().is_err());
    }
}
