use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Class sent to the pricing model when the search carried none.
pub const DEFAULT_FLIGHT_CLASS: &str = "Economy";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlightId(pub String);

impl fmt::Display for FlightId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Coarse time-of-day category the pricing model is trained on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeBucket {
    #[serde(rename = "Early_Morning")]
    EarlyMorning,
    Morning,
    Afternoon,
    Evening,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no hour component in clock value {0:?}")]
pub struct ClockParseError(pub String);

impl TimeBucket {
    pub const ALL: [TimeBucket; 4] = [
        TimeBucket::EarlyMorning,
        TimeBucket::Morning,
        TimeBucket::Afternoon,
        TimeBucket::Evening,
    ];

    /// Total over every hour value; anything from 18 upwards is evening.
    pub fn from_hour(hour: u8) -> Self {
        if hour < 6 {
            TimeBucket::EarlyMorning
        } else if hour < 12 {
            TimeBucket::Morning
        } else if hour < 18 {
            TimeBucket::Afternoon
        } else {
            TimeBucket::Evening
        }
    }

    /// Buckets an `HH:MM` clock value by the digits preceding the first colon.
    ///
    /// Leading whitespace is skipped and trailing garbage after the digits is
    /// ignored, so `"7:05"`, `"07:05"` and `"07h"` all land in `Morning`.
    pub fn from_clock(clock: &str) -> Result<Self, ClockParseError> {
        let hour_part = clock.split(':').next().unwrap_or_default().trim_start();
        let digits: String = hour_part
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        if digits.is_empty() {
            return Err(ClockParseError(clock.to_string()));
        }
        // Long digit runs saturate into the evening bucket.
        let hour = digits.parse::<u8>().unwrap_or(u8::MAX);
        Ok(Self::from_hour(hour))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimeBucket::EarlyMorning => "Early_Morning",
            TimeBucket::Morning => "Morning",
            TimeBucket::Afternoon => "Afternoon",
            TimeBucket::Evening => "Evening",
        }
    }
}

impl fmt::Display for TimeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCriteria {
    pub source: String,
    pub destination: String,
    pub flight_class: String,
}

impl SearchCriteria {
    pub fn new(
        source: impl Into<String>,
        destination: impl Into<String>,
        flight_class: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            flight_class: flight_class.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        [&self.source, &self.destination, &self.flight_class]
            .iter()
            .all(|field| !field.trim().is_empty())
    }
}

/// One row of a search result. Read-only once received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flight_id: Option<FlightId>,
    pub airline: String,
    pub departure_time: String,
    pub arrival_time: String,
    pub seats_left: u32,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stops: Option<String>,
}
