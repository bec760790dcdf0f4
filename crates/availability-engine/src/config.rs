//! Engine settings.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{AvailabilityError, Result};
use crate::window::DEFAULT_NUMBER_OF_DAYS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Days per computation when the caller does not specify one.
    pub number_of_days: u32,
    /// Calendar in which event timestamps are read as dates and times of day.
    pub timezone: Tz,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            number_of_days: DEFAULT_NUMBER_OF_DAYS,
            timezone: Tz::UTC,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.number_of_days < 1 {
            return Err(AvailabilityError::InvalidArgument(
                "number_of_days must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
