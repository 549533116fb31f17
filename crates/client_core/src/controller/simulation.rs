//! Per-flight fare simulation: input state, request derivation and the
//! Idle/Loading/Success/Failure lifecycle of explanation requests.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use shared::{
    domain::{FlightSummary, TimeBucket, DEFAULT_FLIGHT_CLASS},
    protocol::{ExplainRequest, ExplainResponse, FareBreakdown, FIXED_DURATION_HOURS, FIXED_STOPS},
};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::FareService;

pub const DEFAULT_DAYS_LEFT: u32 = 10;
pub const MIN_DAYS_LEFT: u32 = 1;
pub const MAX_DAYS_LEFT: u32 = 30;
pub const MIN_SEATS_LEFT: u32 = 1;
pub const MAX_SEATS_LEFT: u32 = 150;
pub const DEFAULT_DEMAND_INDEX: f64 = 1.0;
// Demand is stored on a 0.1 grid, expressed here in tenths.
const MIN_DEMAND_TENTHS: f64 = 7.0;
const MAX_DEMAND_TENTHS: f64 = 15.0;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// User-visible failure of one recalculation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecalcError {
    #[error("Route information not available")]
    MissingRouteContext,
    #[error("{0}")]
    ServiceSoftError(String),
    #[error("Failed to recalculate price")]
    TransportFailure,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestLifecycle {
    Idle,
    Loading,
    Success(FareBreakdown),
    Failure(RecalcError),
}

/// Route from the search that produced the flight, and the currently selected cabin class.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimulationContext {
    pub route: Option<String>,
    pub flight_class: Option<String>,
}

impl SimulationContext {
    fn resolved_route(&self) -> Option<&str> {
        self.route.as_deref().filter(|route| !route.trim().is_empty())
    }

    fn resolved_class(&self) -> &str {
        self.flight_class
            .as_deref()
            .filter(|class| !class.trim().is_empty())
            .unwrap_or(DEFAULT_FLIGHT_CLASS)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationInputs {
    selected_date: Option<NaiveDate>,
    days_left_slider: u32,
    seats_left: u32,
    demand_index: f64,
}

impl SimulationInputs {
    pub fn for_flight(flight: &FlightSummary) -> Self {
        Self {
            selected_date: None,
            days_left_slider: DEFAULT_DAYS_LEFT,
            seats_left: flight.seats_left.clamp(MIN_SEATS_LEFT, MAX_SEATS_LEFT),
            demand_index: DEFAULT_DEMAND_INDEX,
        }
    }

    pub fn selected_date(&self) -> Option<NaiveDate> {
        self.selected_date
    }

    pub fn days_left_slider(&self) -> u32 {
        self.days_left_slider
    }

    pub fn seats_left(&self) -> u32 {
        self.seats_left
    }

    pub fn demand_index(&self) -> f64 {
        self.demand_index
    }
}

/// Ticket for an issued explain request. Only the newest ticket may complete.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRecalc {
    pub seq: u64,
    pub request: ExplainRequest,
}

/// Whole days from `now` until midnight UTC of `date`, rounded up and never below one.
pub fn days_until(date: NaiveDate, now: DateTime<Utc>) -> u32 {
    let departure = Utc.from_utc_datetime(&date.and_time(NaiveTime::default()));
    let millis = (departure - now).num_milliseconds();
    let days =
        millis.div_euclid(MILLIS_PER_DAY) + i64::from(millis.rem_euclid(MILLIS_PER_DAY) != 0);
    u32::try_from(days.max(i64::from(MIN_DAYS_LEFT))).unwrap_or(u32::MAX)
}

#[derive(Debug, Clone)]
pub struct FareSimulationController {
    flight: FlightSummary,
    context: SimulationContext,
    inputs: SimulationInputs,
    expanded: bool,
    lifecycle: RequestLifecycle,
    issued_seq: u64,
}

impl FareSimulationController {
    pub fn new(flight: FlightSummary, context: SimulationContext) -> Self {
        let inputs = SimulationInputs::for_flight(&flight);
        Self {
            flight,
            context,
            inputs,
            expanded: false,
            lifecycle: RequestLifecycle::Idle,
            issued_seq: 0,
        }
    }

    pub fn flight(&self) -> &FlightSummary {
        &self.flight
    }

    pub fn context(&self) -> &SimulationContext {
        &self.context
    }

    pub fn inputs(&self) -> &SimulationInputs {
        &self.inputs
    }

    pub fn lifecycle(&self) -> &RequestLifecycle {
        &self.lifecycle
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.lifecycle, RequestLifecycle::Loading)
    }

    /// UIs should disable their recalculate trigger while this is false.
    pub fn can_recalc(&self) -> bool {
        !self.is_loading()
    }

    pub fn result(&self) -> Option<&FareBreakdown> {
        match &self.lifecycle {
            RequestLifecycle::Success(breakdown) => Some(breakdown),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&RecalcError> {
        match &self.lifecycle {
            RequestLifecycle::Failure(err) => Some(err),
            _ => None,
        }
    }

    pub fn latest_seq(&self) -> u64 {
        self.issued_seq
    }

    /// Follows the live class selection. Blank falls back to the default class.
    pub fn set_flight_class(&mut self, flight_class: &str) {
        self.context.flight_class = Some(flight_class.trim().to_string())
            .filter(|class| !class.is_empty());
    }

    pub fn toggle(&mut self) {
        self.expanded = !self.expanded;
    }

    /// `None` clears the date and hands control back to the slider.
    pub fn set_selected_date(&mut self, date: Option<NaiveDate>) {
        self.inputs.selected_date = date;
    }

    /// Ignored while a date is selected; the stored slider value is kept for later.
    pub fn set_days_left_slider(&mut self, days: u32) {
        if self.inputs.selected_date.is_some() {
            debug!(days, "slider suppressed while a travel date is selected");
            return;
        }
        self.inputs.days_left_slider = days.clamp(MIN_DAYS_LEFT, MAX_DAYS_LEFT);
    }

    pub fn set_seats_left(&mut self, seats: u32) {
        self.inputs.seats_left = seats.clamp(MIN_SEATS_LEFT, MAX_SEATS_LEFT);
    }

    pub fn set_demand_index(&mut self, demand_index: f64) {
        if !demand_index.is_finite() {
            debug!(demand_index, "ignoring non-finite demand index");
            return;
        }
        let tenths = (demand_index * 10.0)
            .round()
            .clamp(MIN_DEMAND_TENTHS, MAX_DEMAND_TENTHS);
        self.inputs.demand_index = tenths / 10.0;
    }

    pub fn effective_days_left(&self) -> u32 {
        self.effective_days_left_at(Utc::now())
    }

    pub fn effective_days_left_at(&self, now: DateTime<Utc>) -> u32 {
        match self.inputs.selected_date {
            Some(date) => days_until(date, now),
            None => self.inputs.days_left_slider,
        }
    }

    /// Normalized request for the current inputs. Pure; nothing is recorded.
    pub fn explain_request_at(&self, now: DateTime<Utc>) -> Result<ExplainRequest, RecalcError> {
        let route = self
            .context
            .resolved_route()
            .ok_or(RecalcError::MissingRouteContext)?;
        let departure_time = bucket_for(&self.flight.departure_time)?;
        let arrival_time = bucket_for(&self.flight.arrival_time)?;

        Ok(ExplainRequest {
            airline: self.flight.airline.clone(),
            route: route.to_string(),
            departure_time,
            arrival_time,
            flight_class: self.context.resolved_class().to_string(),
            days_left: self.effective_days_left_at(now),
            duration: FIXED_DURATION_HOURS,
            stops: FIXED_STOPS,
            seats_left: self.inputs.seats_left,
            demand_index: self.inputs.demand_index,
        })
    }

    pub fn begin_recalc(&mut self) -> Option<PendingRecalc> {
        self.begin_recalc_at(Utc::now())
    }

    /// Moves to `Loading` and issues a ticket, or records the failure that
    /// prevents a request from being sent at all.
    ///
    /// A new ticket supersedes any request still in flight; the superseded
    /// response is dropped by [`Self::complete_recalc`].
    pub fn begin_recalc_at(&mut self, now: DateTime<Utc>) -> Option<PendingRecalc> {
        self.issued_seq += 1;
        match self.explain_request_at(now) {
            Ok(request) => {
                debug!(seq = self.issued_seq, ?request, "explain payload");
                self.lifecycle = RequestLifecycle::Loading;
                Some(PendingRecalc {
                    seq: self.issued_seq,
                    request,
                })
            }
            Err(err) => {
                warn!(airline = %self.flight.airline, %err, "recalculation not sent");
                self.lifecycle = RequestLifecycle::Failure(err);
                None
            }
        }
    }

    /// Applies a service outcome. Returns `false` when the ticket is stale.
    pub fn complete_recalc(
        &mut self,
        seq: u64,
        outcome: anyhow::Result<ExplainResponse>,
    ) -> bool {
        if seq != self.issued_seq || !self.is_loading() {
            debug!(
                seq,
                latest = self.issued_seq,
                "discarding stale explain response"
            );
            return false;
        }

        self.lifecycle = match outcome {
            Ok(ExplainResponse::Breakdown(breakdown)) => RequestLifecycle::Success(breakdown),
            Ok(ExplainResponse::SoftError { error }) => {
                warn!(airline = %self.flight.airline, %error, "pricing service rejected request");
                RequestLifecycle::Failure(RecalcError::ServiceSoftError(error))
            }
            Err(err) => {
                error!(airline = %self.flight.airline, error = %format!("{err:#}"), "explain request failed");
                RequestLifecycle::Failure(RecalcError::TransportFailure)
            }
        };
        true
    }

    pub async fn recalc(&mut self, service: &dyn FareService) {
        let Some(pending) = self.begin_recalc() else {
            return;
        };
        let outcome = service.explain(&pending.request).await;
        self.complete_recalc(pending.seq, outcome);
    }

    pub fn card_at(&self, now: DateTime<Utc>) -> FlightCard<'_> {
        FlightCard {
            controller: self,
            now,
        }
    }
}

fn bucket_for(clock: &str) -> Result<TimeBucket, RecalcError> {
    TimeBucket::from_clock(clock).map_err(|err| {
        error!(%err, "flight carries an unreadable clock value");
        RecalcError::TransportFailure
    })
}

/// Plain-text rendering of one flight card.
pub struct FlightCard<'a> {
    controller: &'a FareSimulationController,
    now: DateTime<Utc>,
}

impl fmt::Display for FlightCard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = self.controller;
        let flight = &c.flight;
        writeln!(
            f,
            "{}  {} → {}  seats left: {}  ₹{}",
            flight.airline,
            flight.departure_time,
            flight.arrival_time,
            flight.seats_left,
            flight.price
        )?;
        if !c.expanded {
            return Ok(());
        }

        match c.inputs.selected_date {
            Some(date) => writeln!(f, "  Travel date: {date}")?,
            None => writeln!(f, "  Travel date: -")?,
        }
        writeln!(
            f,
            "  Days to departure: {}",
            c.effective_days_left_at(self.now)
        )?;
        writeln!(f, "  Seats left: {}", c.inputs.seats_left)?;
        writeln!(f, "  Demand index: {:.1}", c.inputs.demand_index)?;
        if c.is_loading() {
            writeln!(f, "  [Calculating...]")?;
        } else {
            writeln!(f, "  [Recalculate]")?;
        }

        match &c.lifecycle {
            RequestLifecycle::Idle | RequestLifecycle::Loading => {}
            RequestLifecycle::Failure(err) => writeln!(f, "  Error: {err}")?,
            RequestLifecycle::Success(breakdown) => {
                writeln!(f, "  Base Fare: ₹{}", breakdown.base_fare)?;
                writeln!(f, "  ML Multiplier: {}", breakdown.ml_multiplier)?;
                writeln!(f, "  Seat Factor: {}", breakdown.seat_factor)?;
                writeln!(f, "  Demand Factor: {}", breakdown.demand_factor)?;
                writeln!(f, "  Final Price: ₹{}", breakdown.final_price)?;
                for line in &breakdown.explanation {
                    writeln!(f, "  - {line}")?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/simulation_tests.rs"]
mod tests;
