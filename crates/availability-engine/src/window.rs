//! The per-day result skeleton for a span of consecutive calendar days.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{AvailabilityError, Result};
use crate::expander::SlotTime;

/// Number of days computed when the caller does not ask for a specific span.
pub const DEFAULT_NUMBER_OF_DAYS: u32 = 7;

/// Bookable start times for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayBucket {
    pub date: NaiveDate,
    /// Unique, in the order they were contributed.
    pub slots: Vec<SlotTime>,
}

impl DayBucket {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            slots: Vec::new(),
        }
    }
}

/// `number_of_days` consecutive [`DayBucket`]s starting at a reference date.
///
/// Lookup is by calendar date: the bucket for `date` lives at index
/// `date - start`, which holds because the dates are consecutive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    start: NaiveDate,
    buckets: Vec<DayBucket>,
}

impl Window {
    /// Build an empty window for `start, start + 1, ..., start + number_of_days - 1`.
    ///
    /// # Errors
    /// Returns `AvailabilityError::InvalidArgument` when `number_of_days` is zero
    /// or the last day falls outside the supported calendar range.
    pub fn new(start: NaiveDate, number_of_days: u32) -> Result<Self> {
        if number_of_days < 1 {
            return Err(AvailabilityError::InvalidArgument(format!(
                "number of days must be at least 1, got {}",
                number_of_days
            )));
        }

        let buckets = (0..number_of_days)
            .map(|offset| {
                start
                    .checked_add_days(Days::new(u64::from(offset)))
                    .map(DayBucket::new)
                    .ok_or_else(|| {
                        AvailabilityError::InvalidArgument(format!(
                            "{} + {} days is out of range",
                            start, offset
                        ))
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { start, buckets })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// The last date covered by the window.
    pub fn end(&self) -> NaiveDate {
        self.buckets.last().map_or(self.start, |bucket| bucket.date)
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.index_of(date).is_some()
    }

    pub fn get(&self, date: NaiveDate) -> Option<&DayBucket> {
        let index = self.index_of(date)?;
        self.buckets.get(index)
    }

    pub fn get_mut(&mut self, date: NaiveDate) -> Option<&mut DayBucket> {
        let index = self.index_of(date)?;
        self.buckets.get_mut(index)
    }

    pub fn buckets(&self) -> &[DayBucket] {
        &self.buckets
    }

    pub fn buckets_mut(&mut self) -> impl Iterator<Item = &mut DayBucket> {
        self.buckets.iter_mut()
    }

    /// Consume the window, yielding its buckets in date order.
    pub fn into_buckets(self) -> Vec<DayBucket> {
        self.buckets
    }

    fn index_of(&self, date: NaiveDate) -> Option<usize> {
        let offset = (date - self.start).num_days();
        usize::try_from(offset)
            .ok()
            .filter(|&index| index < self.buckets.len())
    }
}

/// Build an empty window; see [`Window::new`].
pub fn init_window(reference_date: NaiveDate, number_of_days: u32) -> Result<Window> {
    Window::new(reference_date, number_of_days)
}
