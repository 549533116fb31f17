use std::sync::Arc;

use shared::{
    domain::{FlightId, FlightSummary, TimeBucket},
    error::ApiError,
    protocol::{
        DaysSimulationPoint, DaysSimulationResponse, DemandSimulationPoint,
        DemandSimulationResponse, ExplainRequest, ExplainResponse, FareBreakdown,
        PredictResponse, SearchRequest, SearchResponse, SeatSimulationPoint,
        SeatSimulationResponse, FIXED_DURATION_HOURS, FIXED_STOPS,
    },
};
use tracing::{debug, warn};

mod model;
pub mod rules;

pub use model::{HeuristicModel, MultiplierModel, PricingError};
use rules::{
    base_fare, demand_pressure_adjustment, round_to, route_label, seat_pressure_adjustment,
    EXPLANATION_LINES,
};

const SEARCH_DAYS_LEFT: u32 = 10;
const SIMULATED_DAYS: [u32; 5] = [30, 14, 7, 3, 1];
const SIMULATED_SEATS: [u32; 5] = [150, 100, 50, 20, 5];
const SIMULATED_DEMAND: [f64; 5] = [0.7, 0.9, 1.0, 1.2, 1.4];

struct FlightTemplate {
    airline: &'static str,
    departure_hour: u8,
    arrival_hour: u8,
}

const FLIGHT_TEMPLATES: [FlightTemplate; 5] = [
    FlightTemplate {
        airline: "IndiGo",
        departure_hour: 6,
        arrival_hour: 8,
    },
    FlightTemplate {
        airline: "Vistara",
        departure_hour: 9,
        arrival_hour: 11,
    },
    FlightTemplate {
        airline: "Air India",
        departure_hour: 13,
        arrival_hour: 15,
    },
    FlightTemplate {
        airline: "IndiGo",
        departure_hour: 18,
        arrival_hour: 20,
    },
    FlightTemplate {
        airline: "Akasa",
        departure_hour: 22,
        arrival_hour: 0,
    },
];

#[derive(Clone)]
pub struct PricingContext {
    pub model: Arc<dyn MultiplierModel>,
}

impl PricingContext {
    pub fn new(model: Arc<dyn MultiplierModel>) -> Self {
        Self { model }
    }
}

impl Default for PricingContext {
    fn default() -> Self {
        Self::new(Arc::new(HeuristicModel))
    }
}

pub fn search_flights(
    ctx: &PricingContext,
    req: &SearchRequest,
) -> Result<SearchResponse, ApiError> {
    if !req.is_complete() {
        return Err(ApiError::validation(
            "source, destination and flight_class are required",
        ));
    }
    let route = route_label(&req.source, &req.destination);
    let flight_class = req.flight_class.trim().to_string();
    let fare = base_fare(&route, &flight_class);

    let mut flights = Vec::with_capacity(FLIGHT_TEMPLATES.len());
    for template in &FLIGHT_TEMPLATES {
        let (seats_left, demand_index) = scenario_pressure(&route, template);
        let features = ExplainRequest {
            airline: template.airline.to_string(),
            route: route.clone(),
            departure_time: TimeBucket::from_hour(template.departure_hour),
            arrival_time: TimeBucket::from_hour(template.arrival_hour),
            flight_class: flight_class.clone(),
            days_left: SEARCH_DAYS_LEFT,
            duration: FIXED_DURATION_HOURS,
            stops: FIXED_STOPS,
            seats_left,
            demand_index,
        };
        let multiplier = ctx.model.predict(&features).map_err(internal)?;
        let price = fare
            * multiplier
            * seat_pressure_adjustment(seats_left)
            * demand_pressure_adjustment(demand_index);

        flights.push(FlightSummary {
            flight_id: Some(flight_id(template)),
            airline: template.airline.to_string(),
            departure_time: format!("{:02}:00", template.departure_hour),
            arrival_time: format!("{:02}:00", template.arrival_hour),
            seats_left,
            price: round_to(price, 2),
            duration: Some("2h 10m".to_string()),
            stops: Some("Non-stop".to_string()),
        });
    }
    flights.sort_by(|a, b| a.price.total_cmp(&b.price));
    debug!(%route, flights = flights.len(), "search priced");

    Ok(SearchResponse {
        route,
        flight_class: Some(flight_class),
        flights,
    })
}

pub fn predict(ctx: &PricingContext, req: &ExplainRequest) -> Result<PredictResponse, ApiError> {
    let multiplier = ctx.model.predict(req).map_err(invalid)?;
    let fare = base_fare(&req.route, &req.flight_class);
    Ok(PredictResponse {
        route: req.route.clone(),
        flight_class: req.flight_class.clone(),
        base_fare: fare,
        price_multiplier: round_to(multiplier, 3),
        final_price: round_to(fare * multiplier, 2),
    })
}

pub fn simulate_days(
    ctx: &PricingContext,
    req: &ExplainRequest,
) -> Result<DaysSimulationResponse, ApiError> {
    let fare = base_fare(&req.route, &req.flight_class);
    let simulation = SIMULATED_DAYS
        .iter()
        .map(|&days_left| {
            let features = ExplainRequest {
                days_left,
                ..req.clone()
            };
            let multiplier = ctx.model.predict(&features).map_err(invalid)?;
            Ok(DaysSimulationPoint {
                days_left,
                price: round_to(fare * multiplier, 2),
            })
        })
        .collect::<Result<Vec<_>, ApiError>>()?;

    Ok(DaysSimulationResponse {
        route: req.route.clone(),
        flight_class: req.flight_class.clone(),
        simulation,
    })
}

pub fn simulate_seats(
    ctx: &PricingContext,
    req: &ExplainRequest,
) -> Result<SeatSimulationResponse, ApiError> {
    let fare = base_fare(&req.route, &req.flight_class);
    let seat_pressure_simulation = SIMULATED_SEATS
        .iter()
        .map(|&seats_left| {
            let features = ExplainRequest {
                seats_left,
                ..req.clone()
            };
            let multiplier = ctx.model.predict(&features).map_err(invalid)?;
            let seat_factor = seat_pressure_adjustment(seats_left);
            Ok(SeatSimulationPoint {
                seats_left,
                ml_multiplier: round_to(multiplier, 3),
                seat_factor,
                final_price: round_to(fare * multiplier * seat_factor, 2),
            })
        })
        .collect::<Result<Vec<_>, ApiError>>()?;

    Ok(SeatSimulationResponse {
        route: req.route.clone(),
        flight_class: req.flight_class.clone(),
        seat_pressure_simulation,
    })
}

pub fn simulate_demand(
    ctx: &PricingContext,
    req: &ExplainRequest,
) -> Result<DemandSimulationResponse, ApiError> {
    let fare = base_fare(&req.route, &req.flight_class);
    let demand_simulation = SIMULATED_DEMAND
        .iter()
        .map(|&demand_index| {
            let features = ExplainRequest {
                demand_index,
                ..req.clone()
            };
            let multiplier = ctx.model.predict(&features).map_err(invalid)?;
            let demand_factor = demand_pressure_adjustment(demand_index);
            Ok(DemandSimulationPoint {
                demand_index,
                ml_multiplier: round_to(multiplier, 3),
                demand_factor,
                final_price: round_to(fare * multiplier * demand_factor, 2),
            })
        })
        .collect::<Result<Vec<_>, ApiError>>()?;

    Ok(DemandSimulationResponse {
        route: req.route.clone(),
        flight_class: req.flight_class.clone(),
        demand_simulation,
    })
}

/// Model failures come back as a soft `{ "error": .. }` body rather than an HTTP error.
pub fn explain(ctx: &PricingContext, req: &ExplainRequest) -> ExplainResponse {
    let multiplier = match ctx.model.predict(req) {
        Ok(multiplier) => multiplier,
        Err(error) => {
            warn!(route = %req.route, airline = %req.airline, %error, "explain failed");
            return ExplainResponse::SoftError {
                error: error.to_string(),
            };
        }
    };
    let fare = base_fare(&req.route, &req.flight_class);
    let seat_factor = seat_pressure_adjustment(req.seats_left);
    let demand_factor = demand_pressure_adjustment(req.demand_index);

    ExplainResponse::Breakdown(FareBreakdown {
        base_fare: fare,
        ml_multiplier: round_to(multiplier, 3),
        seat_factor,
        demand_factor,
        final_price: round_to(fare * multiplier * seat_factor * demand_factor, 2),
        explanation: EXPLANATION_LINES.iter().map(|line| line.to_string()).collect(),
    })
}

fn flight_id(template: &FlightTemplate) -> FlightId {
    let airline = template.airline.to_ascii_lowercase().replace(' ', "-");
    FlightId(format!("{airline}-{:02}00", template.departure_hour))
}

/// Seats in 3..=60 and demand in 0.90..=1.40, fixed for a given route and departure.
fn scenario_pressure(route: &str, template: &FlightTemplate) -> (u32, f64) {
    let hash = fnv1a(&[
        route.as_bytes(),
        template.airline.as_bytes(),
        &[template.departure_hour],
    ]);

    let seats_left = 3 + (hash % 58) as u32;
    let demand_index = 0.9 + ((hash >> 16) % 51) as f64 / 100.0;
    (seats_left, round_to(demand_index, 2))
}

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// 64-bit FNV-1a over the concatenated parts.
fn fnv1a(parts: &[&[u8]]) -> u64 {
    parts
        .iter()
        .flat_map(|part| part.iter())
        .fold(FNV_OFFSET_BASIS, |hash, byte| {
            (hash ^ u64::from(*byte)).wrapping_mul(FNV_PRIME)
        })
}

fn invalid(err: PricingError) -> ApiError {
    ApiError::validation(err.to_string())
}

fn internal(err: PricingError) -> ApiError {
    ApiError::internal(err.to_string())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
