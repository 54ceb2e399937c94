//! Trading session windows

use chrono::{DateTime, Timelike, Utc};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const MINUTES_PER_DAY: u16 = 24 * 60;

/// Malformed session window
#[derive(Debug, Error, PartialEq)]
#[error("Invalid session window {input:?}: {reason}")]
pub struct SessionParseError {
    input: String,
    reason: &'static str,
}

/// A UTC time-of-day window, inclusive at both ends at minute resolution.
///
/// A window whose start is after its end wraps past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct SessionWindow {
    start: u16,
    end: u16,
}

impl SessionWindow {
    /// Window from minutes after midnight; values wrap at one day
    pub fn from_minutes(start: u16, end: u16) -> Self {
        Self {
            start: start % MINUTES_PER_DAY,
            end: end % MINUTES_PER_DAY,
        }
    }

    /// Whether `minute` (minutes after midnight) falls inside the window
    pub fn contains_minute(&self, minute: u16) -> bool {
        if self.start <= self.end {
            (self.start..=self.end).contains(&minute)
        } else {
            minute >= self.start || minute <= self.end
        }
    }

    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        self.contains_minute(minute_of_day(now))
    }
}

fn minute_of_day(now: DateTime<Utc>) -> u16 {
    (now.hour() * 60 + now.minute()) as u16
}

fn parse_clock(input: &str, clock: &str) -> Result<u16, SessionParseError> {
    let err = |reason| SessionParseError {
        input: input.to_string(),
        reason,
    };
    let (hours, minutes) = clock.trim().split_once(':').ok_or_else(|| err("expected HH:MM"))?;
    let hours: u16 = hours.parse().map_err(|_| err("hour is not a number"))?;
    let minutes: u16 = minutes.parse().map_err(|_| err("minute is not a number"))?;
    if hours > 23 {
        return Err(err("hour out of range"));
    }
    if minutes > 59 {
        return Err(err("minute out of range"));
    }
    Ok(hours * 60 + minutes)
}

impl FromStr for SessionWindow {
    type Err = SessionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s.split_once('-').ok_or_else(|| SessionParseError {
            input: s.to_string(),
            reason: "expected HH:MM-HH:MM",
        })?;
        Ok(Self {
            start: parse_clock(s, start)?,
            end: parse_clock(s, end)?,
        })
    }
}

impl TryFrom<String> for SessionWindow {
    type Error = SessionParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for SessionWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}-{:02}:{:02}",
            self.start / 60,
            self.start % 60,
            self.end / 60,
            self.end % 60
        )
    }
}

/// Set of trading windows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionWindows {
    windows: Vec<SessionWindow>,
}

impl SessionWindows {
    pub fn new(windows: Vec<SessionWindow>) -> Self {
        Self { windows }
    }

    /// True inside any window, or always when no windows are configured
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.windows.is_empty() || self.windows.iter().any(|w| w.contains(now))
    }
}
