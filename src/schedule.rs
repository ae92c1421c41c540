//! Schedule string parsing and derived search fields.
//!
//! Catalog sections carry two compact strings: a day code like `"MWF"` or
//! `"TuTh"` and a 12-hour time range like `"9:30a-10:45a"`. This module
//! expands them into the fields the search filters operate on: full day
//! names, a coarse [`TimeOfDay`] bucket, and minute-of-day start/end values.
//!
//! All functions here are pure; a given input string always produces the
//! same output.

use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Coarse bucket for a section's start time, used as an exact-match filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
}

impl TimeOfDay {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOfDay::Morning => "morning",
            TimeOfDay::Afternoon => "afternoon",
            TimeOfDay::Evening => "evening",
        }
    }

    /// Bucket a 24-hour start hour.
    fn from_start_hour(hour: u32) -> Self {
        if hour < 12 {
            TimeOfDay::Morning
        } else if hour < 17 {
            TimeOfDay::Afternoon
        } else {
            TimeOfDay::Evening
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeOfDay {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "morning" => Ok(TimeOfDay::Morning),
            "afternoon" => Ok(TimeOfDay::Afternoon),
            "evening" => Ok(TimeOfDay::Evening),
            other => bail!("unknown time of day: '{}'. Use morning, afternoon, or evening.", other),
        }
    }
}

/// Derived schedule fields attached to a normalized record before indexing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// Full day names in day-code order, e.g. `["Monday", "Wednesday", "Friday"]`.
    pub expanded_days: Vec<String>,
    pub time_of_day: TimeOfDay,
    /// Minutes since midnight, in `[0, 1439]`.
    pub time_start: u32,
    /// Minutes since midnight, in `[0, 1439]`.
    pub time_end: u32,
}

impl Schedule {
    /// Derive all schedule fields from a raw day code and time range.
    ///
    /// The time-of-day bucket and the minute range are parsed independently
    /// from the same range string; both share [`parse_clock`]'s 12-hour
    /// conversion rule.
    pub fn derive(days: &str, time: &str) -> Result<Self> {
        let expanded_days = expand_days(days);
        let time_of_day = time_of_day(time)?;
        let (time_start, time_end) = parse_time_range(time)?;
        Ok(Schedule {
            expanded_days,
            time_of_day,
            time_start,
            time_end,
        })
    }
}

/// Expand a concatenated day code (`"MWF"`, `"TuTh"`) into full day names.
///
/// Scans left to right. Two-letter tokens `Tu` and `Th` are checked before
/// the single-letter fallbacks `M`/`W`/`F`; unrecognized characters are
/// skipped. Repeated tokens produce repeated names.
pub fn expand_days(days: &str) -> Vec<String> {
    let chars: Vec<char> = days.chars().collect();
    let mut names = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        if i + 1 < chars.len() {
            let pair: String = chars[i..i + 2].iter().collect();
            if pair == "Tu" {
                names.push("Tuesday".to_string());
                i += 2;
                continue;
            }
            if pair == "Th" {
                names.push("Thursday".to_string());
                i += 2;
                continue;
            }
        }
        match chars[i] {
            'M' => names.push("Monday".to_string()),
            'W' => names.push("Wednesday".to_string()),
            'F' => names.push("Friday".to_string()),
            _ => {}
        }
        i += 1;
    }
    names
}

/// Bucket a time-range string by its start time.
pub fn time_of_day(time: &str) -> Result<TimeOfDay> {
    let start = time.split('-').next().unwrap_or(time);
    let minutes = parse_clock(start)?;
    Ok(TimeOfDay::from_start_hour(minutes / 60))
}

/// Parse a `"<start>-<end>"` range into minutes since midnight.
///
/// End is not required to be after start; overnight ranges are stored
/// as given.
pub fn parse_time_range(time: &str) -> Result<(u32, u32)> {
    let (start, end) = time
        .split_once('-')
        .with_context(|| format!("time range '{}' has no '-' separator", time))?;
    Ok((parse_clock(start)?, parse_clock(end)?))
}

/// Parse a single 12-hour clock time (`"9:30a"`, `"2p"`) into minutes
/// since midnight.
///
/// Minutes default to 0 when absent. The trailing `a`/`p` marker is
/// required: without it the 12-hour value is ambiguous.
pub fn parse_clock(clock: &str) -> Result<u32> {
    let clock = clock.trim();
    let (digits, meridiem) = match clock.char_indices().last() {
        Some((idx, c)) if c.eq_ignore_ascii_case(&'a') || c.eq_ignore_ascii_case(&'p') => {
            (&clock[..idx], c.to_ascii_lowercase())
        }
        _ => bail!("time '{}' is missing its am/pm marker", clock),
    };

    let (hour_str, minute_str) = match digits.split_once(':') {
        Some((h, m)) => (h, m),
        None => (digits, "0"),
    };

    let hour: u32 = hour_str
        .parse()
        .with_context(|| format!("bad hour in time '{}'", clock))?;
    let minute: u32 = minute_str
        .parse()
        .with_context(|| format!("bad minutes in time '{}'", clock))?;
    if !(1..=12).contains(&hour) || minute > 59 {
        bail!("time '{}' is out of range", clock);
    }

    // 12a is midnight, 12p is noon; otherwise "p" shifts into the afternoon.
    let hour24 = match (hour, meridiem) {
        (12, 'a') => 0,
        (12, 'p') => 12,
        (h, 'p') => h + 12,
        (h, _) => h,
    };

    Ok(hour24 * 60 + minute)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_single_and_double_letter_tokens() {
        assert_eq!(expand_days("MWF"), vec!["Monday", "Wednesday", "Friday"]);
        assert_eq!(expand_days("TuTh"), vec!["Tuesday", "Thursday"]);
        assert_eq!(
            expand_days("MTuWThF"),
            vec!["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"]
        );
    }

    #[test]
    fn expand_skips_unrecognized_characters() {
        assert_eq!(expand_days("MXF"), vec!["Monday", "Friday"]);
        // Lone 'T' is not a valid token.
        assert_eq!(expand_days("T"), Vec::<String>::new());
        assert_eq!(expand_days(""), Vec::<String>::new());
    }

    #[test]
    fn expand_preserves_duplicates() {
        assert_eq!(expand_days("MM"), vec!["Monday", "Monday"]);
    }

    #[test]
    fn expand_round_trips_token_codes() {
        // Re-concatenating day-name prefixes reproduces the input code.
        for code in ["MWF", "TuTh", "MTuWThF", "W", "F"] {
            let rebuilt: String = expand_days(code)
                .iter()
                .map(|name| match name.as_str() {
                    "Tuesday" => "Tu",
                    "Thursday" => "Th",
                    other => &other[..1],
                })
                .collect();
            assert_eq!(rebuilt, code);
        }
    }

    #[test]
    fn clock_parses_minutes_and_defaults() {
        assert_eq!(parse_clock("9:30a").unwrap(), 570);
        assert_eq!(parse_clock("2p").unwrap(), 840);
        assert_eq!(parse_clock("12a").unwrap(), 0);
        assert_eq!(parse_clock("12:00p").unwrap(), 720);
        assert_eq!(parse_clock("11:59P").unwrap(), 23 * 60 + 59);
    }

    #[test]
    fn clock_rejects_malformed_input() {
        assert!(parse_clock("9:30").is_err()); // no am/pm marker
        assert!(parse_clock("x:30a").is_err());
        assert!(parse_clock("13:00a").is_err());
        assert!(parse_clock("").is_err());
    }

    #[test]
    fn time_range_examples() {
        assert_eq!(parse_time_range("9:30a-10:45a").unwrap(), (570, 645));
        assert_eq!(parse_time_range("2p-3:15p").unwrap(), (840, 915));
        assert!(parse_time_range("9:30a").is_err());
    }

    #[test]
    fn bucket_boundaries() {
        assert_eq!(time_of_day("11:59a-1p").unwrap(), TimeOfDay::Morning);
        assert_eq!(time_of_day("12:00p-1p").unwrap(), TimeOfDay::Afternoon);
        assert_eq!(time_of_day("4:59p-6p").unwrap(), TimeOfDay::Afternoon);
        assert_eq!(time_of_day("5:00p-6p").unwrap(), TimeOfDay::Evening);
    }

    #[test]
    fn derive_is_idempotent() {
        let a = Schedule::derive("MWF", "9:00a-9:50a").unwrap();
        let b = Schedule::derive("MWF", "9:00a-9:50a").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.expanded_days, vec!["Monday", "Wednesday", "Friday"]);
        assert_eq!(a.time_of_day, TimeOfDay::Morning);
        assert_eq!(a.time_start, 540);
        assert_eq!(a.time_end, 590);
    }

    #[test]
    fn derive_fails_on_malformed_time() {
        assert!(Schedule::derive("MWF", "9:00-9:50").is_err());
        assert!(Schedule::derive("MWF", "TBA").is_err());
    }
}
