//! # availability-engine
//!
//! Per-day bookable slot computation for a rolling window of calendar days.
//!
//! Two kinds of calendar events feed the engine: *openings* (the resource is
//! offered for booking, once or weekly) and *appointments* (the resource is
//! already booked). The engine reduces them, in input order, into a list of
//! 30-minute start times per day, with appointments always taking precedence.
//!
//! ## Modules
//!
//! - [`window`] — per-day result skeleton keyed by calendar date
//! - [`expander`] — interval → fixed-granularity time-of-day slots
//! - [`reducer`] — applies openings and appointments to a window
//! - [`event`] — raw event rows and their validated form
//! - [`source`] — event retrieval (`EventSource`, in-memory and JSON file sources)
//! - [`availability`] — end-to-end computation (`AvailabilityEngine`)
//! - [`config`] — engine settings
//! - [`error`] — Error types

pub mod availability;
pub mod config;
pub mod error;
pub mod event;
pub mod expander;
pub mod reducer;
pub mod source;
pub mod window;

pub use availability::{compute_from_events, parse_reference_date, AvailabilityEngine};
pub use config::EngineConfig;
pub use error::AvailabilityError;
pub use event::{Event, EventKind, RawEvent};
pub use expander::{expand_interval, expand_slots, SlotTime, SLOT_MINUTES};
pub use reducer::{reduce_events, BlockedSlotSet, SlotReducer};
pub use source::{EventQuery, EventSource, JsonFileSource, MemorySource, SourceError};
pub use window::{init_window, DayBucket, Window, DEFAULT_NUMBER_OF_DAYS};
