//! Slot expansion -- converts an event interval into fixed-granularity time-of-day slots.
//!
//! Expansion works on wall-clock (naive) datetimes already projected into the
//! reference calendar, using plain second/minute arithmetic from the midnight of
//! the start date. No calendar library is involved past that projection, so the
//! produced labels never drift with locale or offset changes.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::AvailabilityError;

/// Granularity of a bookable slot, in minutes.
pub const SLOT_MINUTES: u16 = 30;

/// Number of slots that fit in one calendar day.
pub const SLOTS_PER_DAY: usize = (MINUTES_PER_DAY / SLOT_MINUTES) as usize;

const MINUTES_PER_DAY: u16 = 24 * 60;
const SECONDS_PER_DAY: i64 = 86_400;
const SLOT_SECONDS: i64 = SLOT_MINUTES as i64 * 60;

/// A time of day at minute resolution, rendered as an `H:mm` label.
///
/// Ordering follows the clock, so `"9:30" < "10:00"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotTime(u16);

impl SlotTime {
    pub const MIN: SlotTime = SlotTime(0);
    pub const MAX: SlotTime = SlotTime(MINUTES_PER_DAY - 1);

    /// Build from minutes past midnight. Returns `None` outside `0..1440`.
    pub fn from_minutes(minute_of_day: u16) -> Option<Self> {
        (minute_of_day < MINUTES_PER_DAY).then_some(Self(minute_of_day))
    }

    /// Build from an hour and a minute. Returns `None` if either is out of range.
    pub fn from_hm(hour: u16, minute: u16) -> Option<Self> {
        if hour >= 24 || minute >= 60 {
            return None;
        }
        Some(Self(hour * 60 + minute))
    }

    pub fn minute_of_day(self) -> u16 {
        self.0
    }

    pub fn hour(self) -> u16 {
        self.0 / 60
    }

    pub fn minute(self) -> u16 {
        self.0 % 60
    }
}

impl fmt::Display for SlotTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for SlotTime {
    type Err = AvailabilityError;

    /// Parses `H:mm` or `HH:mm`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AvailabilityError::InvalidArgument(format!("invalid slot label: '{}'", s));

        let (hour, minute) = s.split_once(':').ok_or_else(invalid)?;
        if hour.is_empty() || hour.len() > 2 || minute.len() != 2 {
            return Err(invalid());
        }
        let hour: u16 = hour.parse().map_err(|_| invalid())?;
        let minute: u16 = minute.parse().map_err(|_| invalid())?;
        Self::from_hm(hour, minute).ok_or_else(invalid)
    }
}

impl Serialize for SlotTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SlotTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        label.parse().map_err(serde::de::Error::custom)
    }
}

/// One expanded slot: its time of day and how many days after the interval's
/// start date it falls on (intervals crossing midnight wrap to offset 1, 2, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpandedSlot {
    pub day_offset: u32,
    pub time: SlotTime,
}

/// Lazy iterator over the slots of a half-open interval.
///
/// Positions are seconds since midnight of the start date.
#[derive(Debug, Clone)]
pub struct SlotIter {
    cursor: i64,
    end: i64,
}

impl Iterator for SlotIter {
    type Item = ExpandedSlot;

    fn next(&mut self) -> Option<ExpandedSlot> {
        if self.cursor >= self.end {
            return None;
        }
        let position = self.cursor;
        self.cursor += SLOT_SECONDS;

        let day_offset = u32::try_from(position / SECONDS_PER_DAY).ok()?;
        // Bounded by SECONDS_PER_DAY / 60, so always a valid minute of day.
        let minute_of_day = ((position % SECONDS_PER_DAY) / 60) as u16;
        Some(ExpandedSlot {
            day_offset,
            time: SlotTime(minute_of_day),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.cursor >= self.end {
            0
        } else {
            ((self.end - self.cursor + SLOT_SECONDS - 1) / SLOT_SECONDS) as usize
        };
        (remaining, Some(remaining))
    }
}

/// Iterate over the slots covering `[starts_at, ends_at)`.
///
/// The first slot starts exactly at `starts_at`'s time of day (seconds
/// truncated) and each following slot is [`SLOT_MINUTES`] later. A slot
/// starting at or after `ends_at` is excluded. An empty or inverted interval
/// yields nothing.
pub fn expand_interval(starts_at: NaiveDateTime, ends_at: NaiveDateTime) -> SlotIter {
    let time = starts_at.time();
    let start = i64::from(time.num_seconds_from_midnight() - time.second());
    let length = (ends_at - starts_at).num_seconds();
    let end = if length > 0 {
        start + i64::from(time.second()) + length
    } else {
        start
    };

    SlotIter { cursor: start, end }
}

/// Time-of-day labels covering `[starts_at, ends_at)`, in order.
///
/// Convenience wrapper over [`expand_interval`] that drops the day offsets.
pub fn expand_slots(starts_at: NaiveDateTime, ends_at: NaiveDateTime) -> Vec<SlotTime> {
    expand_interval(starts_at, ends_at).map(|slot| slot.time).collect()
}
