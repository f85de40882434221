//! Fixed-offset time zones.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A fixed UTC offset.
///
/// Parsed from and rendered as `UTC` or `+HH:MM` / `-HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeZone {
    offset_seconds: i32,
}

impl TimeZone {
    pub const UTC: TimeZone = TimeZone { offset_seconds: 0 };

    const MAX_OFFSET_SECONDS: i32 = 18 * 3600;

    /// A zone `offset_seconds` east of UTC. Offsets beyond ±18h, or that
    /// are not whole minutes, are rejected.
    pub fn fixed(offset_seconds: i32) -> Result<Self, Error> {
        if offset_seconds.unsigned_abs() > Self::MAX_OFFSET_SECONDS.unsigned_abs() {
            return Err(Error::config(format!(
                "time zone offset {offset_seconds}s is out of range"
            )));
        }
        if offset_seconds % 60 != 0 {
            return Err(Error::config(format!(
                "time zone offset {offset_seconds}s is not a whole number of minutes"
            )));
        }
        Ok(Self { offset_seconds })
    }

    pub const fn offset_seconds(&self) -> i32 {
        self.offset_seconds
    }

    pub const fn is_utc(&self) -> bool {
        self.offset_seconds == 0
    }
}

impl Default for TimeZone {
    fn default() -> Self {
        Self::UTC
    }
}

impl fmt::Display for TimeZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_utc() {
            return write!(f, "UTC");
        }
        let sign = if self.offset_seconds < 0 { '-' } else { '+' };
        let abs = self.offset_seconds.unsigned_abs();
        write!(f, "{}{:02}:{:02}", sign, abs / 3600, (abs % 3600) / 60)
    }
}

impl FromStr for TimeZone {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if matches!(s, "UTC" | "utc" | "Z" | "GMT" | "Etc/UTC") {
            return Ok(Self::UTC);
        }

        let invalid = || Error::config(format!("invalid time zone '{s}'"));
        let (sign, rest) = match s.chars().next() {
            Some('+') => (1, &s[1..]),
            Some('-') => (-1, &s[1..]),
            _ => return Err(invalid()),
        };
        let (hours, minutes) = rest.split_once(':').ok_or_else(invalid)?;
        let hours = two_digits(hours).ok_or_else(invalid)?;
        let minutes = two_digits(minutes).ok_or_else(invalid)?;
        if hours > 18 || minutes >= 60 {
            return Err(invalid());
        }
        Self::fixed(sign * (i32::from(hours) * 3600 + i32::from(minutes) * 60))
    }
}

/// One or two ASCII digits, no sign.
fn two_digits(s: &str) -> Option<u8> {
    if s.is_empty() || s.len() > 2 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

impl TryFrom<String> for TimeZone {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeZone> for String {
    fn from(tz: TimeZone) -> Self {
        tz.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display() {
        assert_eq!("UTC".parse::<TimeZone>().unwrap(), TimeZone::UTC);
        assert_eq!("Z".parse::<TimeZone>().unwrap(), TimeZone::UTC);

        let ist: TimeZone = "+05:30".parse().unwrap();
        assert_eq!(ist.offset_seconds(), 19_800);
        assert_eq!(ist.to_string(), "+05:30");

        let west: TimeZone = "-08:00".parse().unwrap();
        assert_eq!(west.to_string(), "-08:00");
    }

    #[test]
    fn rejects_garbage() {
        assert!("Mars/Olympus".parse::<TimeZone>().is_err());
        assert!("+25:00".parse::<TimeZone>().is_err());
        assert!("+01:75".parse::<TimeZone>().is_err());
    }

    #[test]
    fn out_of_range_input_is_an_error() {
        for input in ["+1000000:00", "+-05:00", "-+05:00", "+05:-1", "+5:", "+:30", "+005:00"] {
            assert!(
                matches!(input.parse::<TimeZone>(), Err(Error::Config(_))),
                "accepted {input}"
            );
        }
        assert!(matches!(TimeZone::fixed(i32::MIN), Err(Error::Config(_))));
        assert!(matches!(TimeZone::fixed(i32::MAX), Err(Error::Config(_))));
        assert_eq!("+18:00".parse::<TimeZone>().unwrap().offset_seconds(), 64_800);
        assert!("+18:01".parse::<TimeZone>().is_err());
        assert_eq!("-5:00".parse::<TimeZone>().unwrap().offset_seconds(), -18_000);
    }

    #[test]
    fn offsets_are_whole_minutes() {
        assert!(TimeZone::fixed(90).is_err());
        let tz = TimeZone::fixed(-5_400).unwrap();
        let back: TimeZone = tz.to_string().parse().unwrap();
        assert_eq!(back, tz);
    }

    #[test]
    fn serde_uses_string_form() {
        let json = serde_json::to_string(&TimeZone::UTC).unwrap();
        assert_eq!(json, "\"UTC\"");
        let back: TimeZone = serde_json::from_str("\"+01:00\"").unwrap();
        assert_eq!(back.offset_seconds(), 3600);
    }
}
