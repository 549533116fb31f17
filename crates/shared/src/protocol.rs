use serde::{Deserialize, Serialize};

use crate::domain::{FlightSummary, SearchCriteria, TimeBucket};

/// Flight duration in hours sent with every pricing request.
pub const FIXED_DURATION_HOURS: f64 = 2.1;
/// Stop count sent with every pricing request; only non-stop flights are modelled.
pub const FIXED_STOPS: u32 = 0;

pub type SearchRequest = SearchCriteria;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub route: String,
    #[serde(rename = "class", default, skip_serializing_if = "Option::is_none")]
    pub flight_class: Option<String>,
    pub flights: Vec<FlightSummary>,
}

/// Feature vector accepted by `/explain`, `/predict` and the `/simulate*` endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplainRequest {
    pub airline: String,
    pub route: String,
    pub departure_time: TimeBucket,
    pub arrival_time: TimeBucket,
    #[serde(rename = "class_")]
    pub flight_class: String,
    pub days_left: u32,
    pub duration: f64,
    pub stops: u32,
    pub seats_left: u32,
    pub demand_index: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FareBreakdown {
    pub base_fare: f64,
    pub ml_multiplier: f64,
    pub seat_factor: f64,
    pub demand_factor: f64,
    pub final_price: f64,
    #[serde(default)]
    pub explanation: Vec<String>,
}

/// `/explain` answers 200 either way; a soft error carries only an `error` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExplainResponse {
    SoftError { error: String },
    Breakdown(FareBreakdown),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    pub route: String,
    #[serde(rename = "class")]
    pub flight_class: String,
    pub base_fare: f64,
    pub price_multiplier: f64,
    pub final_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaysSimulationPoint {
    pub days_left: u32,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaysSimulationResponse {
    pub route: String,
    #[serde(rename = "class")]
    pub flight_class: String,
    pub simulation: Vec<DaysSimulationPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeatSimulationPoint {
    pub seats_left: u32,
    pub ml_multiplier: f64,
    pub seat_factor: f64,
    pub final_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeatSimulationResponse {
    pub route: String,
    #[serde(rename = "class")]
    pub flight_class: String,
    pub seat_pressure_simulation: Vec<SeatSimulationPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandSimulationPoint {
    pub demand_index: f64,
    pub ml_multiplier: f64,
    pub demand_factor: f64,
    pub final_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandSimulationResponse {
    pub route: String,
    #[serde(rename = "class")]
    pub flight_class: String,
    pub demand_simulation: Vec<DemandSimulationPoint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}
