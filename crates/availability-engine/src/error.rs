//! Error types for availability computation.

use thiserror::Error;

/// Boxed error raised by an [`EventSource`](crate::source::EventSource).
pub type BoxedSourceError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum AvailabilityError {
    /// A caller-supplied argument is unusable (day count, reference date).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A single event row could not be validated. Never escapes a reduction;
    /// the offending event is skipped instead.
    #[error("Malformed event: {0}")]
    MalformedEvent(String),

    /// The event source failed. The original error is kept as the source.
    #[error("Event retrieval failed: {0}")]
    Source(#[source] BoxedSourceError),
}

pub type Result<T> = std::result::Result<T, AvailabilityError>;
