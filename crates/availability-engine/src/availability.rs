//! Availability computation: window, retrieval, reduction.
//!
//! A computation validates its arguments, awaits the event source exactly once,
//! then reduces the returned rows synchronously. Nothing survives between calls:
//! each one owns a fresh [`Window`] and blocked-slot set.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::{AvailabilityError, Result};
use crate::event::RawEvent;
use crate::reducer::reduce_events;
use crate::source::{EventQuery, EventSource};
use crate::window::{init_window, DayBucket, Window};

/// Computes per-day bookable slots from the events of an [`EventSource`].
#[derive(Debug, Clone)]
pub struct AvailabilityEngine<S> {
    source: S,
    config: EngineConfig,
}

impl<S: EventSource> AvailabilityEngine<S> {
    /// Engine with the default configuration (7 days, UTC).
    pub fn new(source: S) -> Self {
        Self::with_config(source, EngineConfig::default())
    }

    pub fn with_config(source: S, config: EngineConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Compute `number_of_days` buckets starting at `reference_date`.
    ///
    /// # Errors
    /// Returns `AvailabilityError::InvalidArgument` if `number_of_days` is zero,
    /// before the source is queried. Returns `AvailabilityError::Source` if
    /// retrieval fails; the source's error is preserved as the cause.
    pub async fn compute_availabilities(
        &self,
        reference_date: NaiveDate,
        number_of_days: u32,
    ) -> Result<Vec<DayBucket>> {
        let calendar = self.config.timezone;
        let mut window = init_window(reference_date, number_of_days)?;
        let query = EventQuery::new(start_of_day(reference_date, calendar)?);

        let events = self
            .source
            .fetch_events(&query)
            .await
            .map_err(|e| AvailabilityError::Source(Box::new(e)))?;
        debug!(
            reference_date = %reference_date,
            number_of_days,
            events = events.len(),
            "events retrieved"
        );

        reduce_events(&mut window, &events, calendar);
        Ok(window.into_buckets())
    }

    /// Like [`compute_availabilities`](Self::compute_availabilities) with the
    /// configured number of days.
    pub async fn compute_default(&self, reference_date: NaiveDate) -> Result<Vec<DayBucket>> {
        self.compute_availabilities(reference_date, self.config.number_of_days)
            .await
    }
}

/// Reduce an already-retrieved event list. The rows are used as given: no
/// source filtering is applied.
pub fn compute_from_events(
    reference_date: NaiveDate,
    number_of_days: u32,
    events: &[RawEvent],
    calendar: Tz,
) -> Result<Vec<DayBucket>> {
    let mut window: Window = init_window(reference_date, number_of_days)?;
    reduce_events(&mut window, events, calendar);
    Ok(window.into_buckets())
}

/// Parse a reference date given as `YYYY-MM-DD` or as an RFC 3339 timestamp.
///
/// A timestamp is read as a date in `calendar`.
///
/// # Errors
/// Returns `AvailabilityError::InvalidArgument` if neither form parses.
pub fn parse_reference_date(input: &str, calendar: Tz) -> Result<NaiveDate> {
    let input = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(input)
        .map(|dt| dt.with_timezone(&calendar).date_naive())
        .map_err(|_| {
            AvailabilityError::InvalidArgument(format!(
                "cannot parse reference date '{}': expected YYYY-MM-DD or RFC 3339",
                input
            ))
        })
}

/// The first instant of `date` in `calendar`.
///
/// Where midnight is skipped by a DST transition, the first valid instant of
/// the following hour is used.
pub fn start_of_day(date: NaiveDate, calendar: Tz) -> Result<DateTime<Utc>> {
    let midnight = date.and_time(NaiveTime::MIN);
    calendar
        .from_local_datetime(&midnight)
        .earliest()
        .or_else(|| {
            calendar
                .from_local_datetime(&(midnight + TimeDelta::hours(1)))
                .earliest()
        })
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| {
            AvailabilityError::InvalidArgument(format!(
                "{} has no start of day in {}",
                date, calendar
            ))
        })
}
