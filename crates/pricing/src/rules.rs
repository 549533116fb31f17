//! Business rules layered on top of the model multiplier.

pub const DEFAULT_BASE_FARE: f64 = 5000.0;

const BASE_FARE_TABLE: [(&str, &str, f64); 6] = [
    ("Delhi_Mumbai", "Economy", 5000.0),
    ("Delhi_Mumbai", "Business", 12000.0),
    ("Mumbai_Bangalore", "Economy", 4500.0),
    ("Mumbai_Bangalore", "Business", 11000.0),
    ("Delhi_Bangalore", "Economy", 6000.0),
    ("Delhi_Bangalore", "Business", 14000.0),
];

pub const EXPLANATION_LINES: [&str; 4] = [
    "Base fare determined by route and class",
    "ML model estimates demand pressure",
    "Seat scarcity rule increases price as seats reduce",
    "Demand surge rule amplifies high demand situations",
];

pub fn route_label(source: &str, destination: &str) -> String {
    format!("{}_{}", source.trim(), destination.trim())
}

/// Unknown route/class pairs fall back to [`DEFAULT_BASE_FARE`].
pub fn base_fare(route: &str, flight_class: &str) -> f64 {
    BASE_FARE_TABLE
        .iter()
        .find(|(r, c, _)| *r == route && *c == flight_class)
        .map(|(_, _, fare)| *fare)
        .unwrap_or(DEFAULT_BASE_FARE)
}

pub fn seat_pressure_adjustment(seats_left: u32) -> f64 {
    match seats_left {
        0..=10 => 1.20,
        11..=20 => 1.10,
        21..=50 => 1.05,
        _ => 1.00,
    }
}

pub fn demand_pressure_adjustment(demand_index: f64) -> f64 {
    if demand_index >= 1.4 {
        1.25
    } else if demand_index >= 1.2 {
        1.15
    } else if demand_index >= 1.0 {
        1.05
    } else {
        1.00
    }
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}
