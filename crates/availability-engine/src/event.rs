//! Calendar events as delivered by an event source, and their validated form.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{AvailabilityError, Result};

/// What an event says about the resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// The resource is offered for booking.
    Opening,
    /// The resource is already booked.
    Appointment,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Opening => "opening",
            EventKind::Appointment => "appointment",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = AvailabilityError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "opening" => Ok(EventKind::Opening),
            "appointment" => Ok(EventKind::Appointment),
            other => Err(AvailabilityError::MalformedEvent(format!(
                "unknown event kind '{}'",
                other
            ))),
        }
    }
}

/// An event row exactly as the data source returned it.
///
/// Every field is optional and timestamps are kept as text so that one bad row
/// never prevents the rest of a batch from loading. Validation happens in
/// [`Event::try_from`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawEvent {
    pub kind: Option<String>,
    /// RFC 3339 timestamp.
    pub starts_at: Option<String>,
    /// RFC 3339 timestamp.
    pub ends_at: Option<String>,
    pub weekly_recurring: Option<bool>,
}

impl RawEvent {
    /// Build a well-formed row from typed values.
    pub fn new(
        kind: EventKind,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
        weekly_recurring: bool,
    ) -> Self {
        Self {
            kind: Some(kind.as_str().to_string()),
            starts_at: Some(starts_at.to_rfc3339()),
            ends_at: Some(ends_at.to_rfc3339()),
            weekly_recurring: Some(weekly_recurring),
        }
    }

    /// `ends_at` parsed as a UTC instant, if present and well-formed.
    pub fn ends_at_utc(&self) -> Option<DateTime<Utc>> {
        self.ends_at.as_deref().and_then(|s| parse_timestamp(s).ok())
    }

    pub fn is_weekly_recurring(&self) -> bool {
        self.weekly_recurring.unwrap_or(false)
    }
}

/// A validated event: known kind and a non-empty interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub weekly_recurring: bool,
}

impl Event {
    /// Build and validate an event.
    ///
    /// # Errors
    /// Returns `AvailabilityError::MalformedEvent` if `ends_at <= starts_at`.
    pub fn new(
        kind: EventKind,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
        weekly_recurring: bool,
    ) -> Result<Self> {
        if ends_at <= starts_at {
            return Err(AvailabilityError::MalformedEvent(format!(
                "{} ends at {} which is not after its start {}",
                kind, ends_at, starts_at
            )));
        }
        Ok(Self {
            kind,
            starts_at,
            ends_at,
            weekly_recurring,
        })
    }

    /// Wall-clock start in the reference calendar.
    pub fn local_start(&self, calendar: &Tz) -> NaiveDateTime {
        self.starts_at.with_timezone(calendar).naive_local()
    }

    /// Wall-clock end in the reference calendar.
    pub fn local_end(&self, calendar: &Tz) -> NaiveDateTime {
        self.ends_at.with_timezone(calendar).naive_local()
    }
}

impl TryFrom<&RawEvent> for Event {
    type Error = AvailabilityError;

    fn try_from(raw: &RawEvent) -> Result<Self> {
        let kind: EventKind = raw
            .kind
            .as_deref()
            .ok_or_else(|| missing("kind"))?
            .parse()?;
        let starts_at = raw
            .starts_at
            .as_deref()
            .ok_or_else(|| missing("starts_at"))
            .and_then(parse_timestamp)?;
        let ends_at = raw
            .ends_at
            .as_deref()
            .ok_or_else(|| missing("ends_at"))
            .and_then(parse_timestamp)?;

        Event::new(kind, starts_at, ends_at, raw.is_weekly_recurring())
    }
}

impl TryFrom<RawEvent> for Event {
    type Error = AvailabilityError;

    fn try_from(raw: RawEvent) -> Result<Self> {
        Event::try_from(&raw)
    }
}

fn missing(field: &str) -> AvailabilityError {
    AvailabilityError::MalformedEvent(format!("missing field '{}'", field))
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AvailabilityError::MalformedEvent(format!("invalid timestamp '{}': {}", s, e)))
}
