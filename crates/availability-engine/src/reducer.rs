//! Applies opening and appointment events to a [`Window`], in input order.
//!
//! Openings overwrite the slots of every bucket they touch, so when several
//! openings hit the same day the last one processed wins. Appointments only
//! ever remove: they subtract from the bucket directly and are remembered in a
//! [`BlockedSlotSet`] so that openings applied later cannot bring the slot back.
//!
//! An event's slots all belong to its start date, whatever its kind, so an
//! opening and an appointment that both cross midnight agree on where each
//! wrapped label lives.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use chrono_tz::Tz;
use tracing::{debug, warn};

use crate::event::{Event, EventKind, RawEvent};
use crate::expander::{expand_interval, SlotTime, SLOTS_PER_DAY};
use crate::window::Window;

/// `(date, time of day)` pairs already consumed by appointments.
///
/// Lives for a single computation only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockedSlotSet {
    slots: BTreeSet<(NaiveDate, SlotTime)>,
}

impl BlockedSlotSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the pair was not already blocked.
    pub fn insert(&mut self, date: NaiveDate, time: SlotTime) -> bool {
        self.slots.insert((date, time))
    }

    pub fn contains(&self, date: NaiveDate, time: SlotTime) -> bool {
        self.slots.contains(&(date, time))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Blocked times on `date`, in clock order.
    pub fn on(&self, date: NaiveDate) -> impl Iterator<Item = SlotTime> + '_ {
        self.slots
            .range((date, SlotTime::MIN)..=(date, SlotTime::MAX))
            .map(|&(_, time)| time)
    }
}

/// Counters from one reduction pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReduceStats {
    pub applied: usize,
    pub skipped: usize,
}

/// Reduction state: the window being filled and the slots blocked so far.
#[derive(Debug)]
pub struct SlotReducer<'w> {
    window: &'w mut Window,
    blocked: BlockedSlotSet,
    calendar: Tz,
    stats: ReduceStats,
}

impl<'w> SlotReducer<'w> {
    /// Start a reduction over `window`, reading dates and times in `calendar`.
    pub fn new(window: &'w mut Window, calendar: Tz) -> Self {
        Self {
            window,
            blocked: BlockedSlotSet::new(),
            calendar,
            stats: ReduceStats::default(),
        }
    }

    /// Validate and apply one raw row. Malformed rows are logged and skipped.
    pub fn apply_raw(&mut self, raw: &RawEvent) {
        match Event::try_from(raw) {
            Ok(event) => self.apply(&event),
            Err(e) => {
                warn!(error = %e, "skipping event");
                self.stats.skipped += 1;
            }
        }
    }

    /// Apply one validated event.
    pub fn apply(&mut self, event: &Event) {
        debug!(
            kind = %event.kind,
            starts_at = %event.starts_at,
            ends_at = %event.ends_at,
            weekly_recurring = event.weekly_recurring,
            "applying event"
        );
        match (event.kind, event.weekly_recurring) {
            (EventKind::Opening, false) => self.apply_opening(event),
            (EventKind::Opening, true) => self.apply_recurring_opening(event),
            // Appointments are always tied to their own date.
            (EventKind::Appointment, _) => self.apply_appointment(event),
        }
        self.stats.applied += 1;
    }

    pub fn blocked(&self) -> &BlockedSlotSet {
        &self.blocked
    }

    pub fn stats(&self) -> ReduceStats {
        self.stats
    }

    /// Slots of an event, limited to one day's worth so labels stay unique.
    ///
    /// Every slot belongs to the event's start date, including labels that
    /// wrap past midnight.
    fn event_slots(&self, event: &Event) -> Vec<SlotTime> {
        expand_interval(event.local_start(&self.calendar), event.local_end(&self.calendar))
            .take(SLOTS_PER_DAY)
            .map(|slot| slot.time)
            .collect()
    }

    fn apply_opening(&mut self, event: &Event) {
        let date = event.local_start(&self.calendar).date();
        let slots = self.event_slots(event);
        // Dates outside the window are a no-op.
        if let Some(bucket) = self.window.get_mut(date) {
            bucket.slots = unblocked(&slots, date, &self.blocked);
        }
    }

    fn apply_recurring_opening(&mut self, event: &Event) {
        // Every day of the window is eligible, whatever the event's weekday.
        let slots = self.event_slots(event);
        let blocked = &self.blocked;
        for bucket in self.window.buckets_mut() {
            bucket.slots = unblocked(&slots, bucket.date, blocked);
        }
    }

    fn apply_appointment(&mut self, event: &Event) {
        let date = event.local_start(&self.calendar).date();
        let slots = self.event_slots(event);
        // No opening can land on a date outside the window, so nothing to block.
        let Some(bucket) = self.window.get_mut(date) else {
            return;
        };
        bucket.slots.retain(|existing| !slots.contains(existing));
        for &time in &slots {
            self.blocked.insert(date, time);
        }
    }
}

fn unblocked(slots: &[SlotTime], date: NaiveDate, blocked: &BlockedSlotSet) -> Vec<SlotTime> {
    slots
        .iter()
        .copied()
        .filter(|&time| !blocked.contains(date, time))
        .collect()
}

/// Apply `events` to `window` in order, reading timestamps in `calendar`.
///
/// Never fails: malformed rows contribute nothing and the pass continues.
pub fn reduce_events<'a, I>(window: &mut Window, events: I, calendar: Tz) -> ReduceStats
where
    I: IntoIterator<Item = &'a RawEvent>,
{
    let mut reducer = SlotReducer::new(window, calendar);
    for raw in events {
        reducer.apply_raw(raw);
    }
    let stats = reducer.stats();
    debug!(
        applied = stats.applied,
        skipped = stats.skipped,
        blocked = reducer.blocked().len(),
        "reduction complete"
    );
    stats
}
