use shared::{domain::TimeBucket, protocol::ExplainRequest};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    #[error("unknown airline: {0}")]
    UnknownAirline(String),
    #[error("invalid {field}: {reason}")]
    InvalidFeature {
        field: &'static str,
        reason: String,
    },
}

/// Produces the demand multiplier applied to the base fare.
pub trait MultiplierModel: Send + Sync {
    fn predict(&self, features: &ExplainRequest) -> Result<f64, PricingError>;
}

/// Deterministic stand-in for the trained regressor.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicModel;

impl HeuristicModel {
    fn airline_factor(airline: &str) -> Result<f64, PricingError> {
        match airline {
            "IndiGo" => Ok(0.95),
            "Vistara" => Ok(1.10),
            "Air India" => Ok(1.05),
            "Akasa" => Ok(0.92),
            "SpiceJet" => Ok(0.93),
            other => Err(PricingError::UnknownAirline(other.to_string())),
        }
    }

    fn days_factor(days_left: u32) -> f64 {
        match days_left {
            0..=3 => 1.35,
            4..=7 => 1.20,
            8..=14 => 1.08,
            15..=21 => 1.00,
            _ => 0.95,
        }
    }

    fn departure_factor(bucket: TimeBucket) -> f64 {
        match bucket {
            TimeBucket::EarlyMorning => 0.92,
            TimeBucket::Morning => 1.05,
            TimeBucket::Afternoon => 1.00,
            TimeBucket::Evening => 1.08,
        }
    }
}

impl MultiplierModel for HeuristicModel {
    fn predict(&self, features: &ExplainRequest) -> Result<f64, PricingError> {
        if features.days_left == 0 {
            return Err(PricingError::InvalidFeature {
                field: "days_left",
                reason: "must be at least 1".into(),
            });
        }
        if !features.demand_index.is_finite() || features.demand_index <= 0.0 {
            return Err(PricingError::InvalidFeature {
                field: "demand_index",
                reason: format!("{} is not a positive number", features.demand_index),
            });
        }
        if !features.duration.is_finite() || features.duration <= 0.0 {
            return Err(PricingError::InvalidFeature {
                field: "duration",
                reason: format!("{} is not a positive number of hours", features.duration),
            });
        }

        let demand_sensitivity = 1.0 + (features.demand_index - 1.0) * 0.1;
        let stops_discount = 1.0 - 0.05 * f64::from(features.stops.min(3));

        Ok(Self::airline_factor(&features.airline)?
            * Self::days_factor(features.days_left)
            * Self::departure_factor(features.departure_time)
            * demand_sensitivity
            * stops_discount)
    }
}
