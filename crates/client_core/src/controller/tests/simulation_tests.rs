use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Duration;
use shared::protocol::{SearchRequest, SearchResponse};
use tokio::sync::Mutex;

use super::*;

fn indigo() -> FlightSummary {
    FlightSummary {
        flight_id: None,
        airline: "IndiGo".into(),
        departure_time: "05:30".into(),
        arrival_time: "07:40".into(),
        seats_left: 42,
        price: 4500.0,
        duration: None,
        stops: None,
    }
}

fn delhi_mumbai() -> SimulationContext {
    SimulationContext {
        route: Some("Delhi-Mumbai".into()),
        flight_class: Some("Economy".into()),
    }
}

fn breakdown(final_price: f64) -> FareBreakdown {
    FareBreakdown {
        base_fare: 5000.0,
        ml_multiplier: 0.944,
        seat_factor: 1.05,
        demand_factor: 1.05,
        final_price,
        explanation: vec!["Base fare determined by route and class".into()],
    }
}

fn at(raw: &str) -> DateTime<Utc> {
    raw.parse().expect("timestamp")
}

fn date(raw: &str) -> NaiveDate {
    raw.parse().expect("date")
}

/// Replays scripted outcomes in order and records every request it sees.
struct ScriptedService {
    outcomes: Mutex<Vec<Result<ExplainResponse>>>,
    requests: Arc<Mutex<Vec<ExplainRequest>>>,
}

impl ScriptedService {
    fn new(outcomes: Vec<Result<ExplainResponse>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    async fn request_count(&self) -> usize {
        self.requests.lock().await.len()
    }
}

#[async_trait]
impl FareService for ScriptedService {
    async fn search(&self, _request: &SearchRequest) -> Result<SearchResponse> {
        Err(anyhow!("search is not scripted"))
    }

    async fn explain(&self, request: &ExplainRequest) -> Result<ExplainResponse> {
        self.requests.lock().await.push(request.clone());
        let mut outcomes = self.outcomes.lock().await;
        if outcomes.is_empty() {
            return Err(anyhow!("no scripted outcome left"));
        }
        outcomes.remove(0)
    }
}

/// Prices purely from the request so repeated calls are comparable.
struct DeterministicService;

#[async_trait]
impl FareService for DeterministicService {
    async fn search(&self, _request: &SearchRequest) -> Result<SearchResponse> {
        Err(anyhow!("search is not supported"))
    }

    async fn explain(&self, request: &ExplainRequest) -> Result<ExplainResponse> {
        let price = 5000.0 + f64::from(request.days_left) * 10.0 + f64::from(request.seats_left)
            - request.demand_index * 100.0;
        Ok(ExplainResponse::Breakdown(breakdown(price)))
    }
}

#[test]
fn starts_collapsed_and_idle_with_default_inputs() {
    let controller = FareSimulationController::new(indigo(), delhi_mumbai());
    assert!(!controller.is_expanded());
    assert_eq!(controller.lifecycle(), &RequestLifecycle::Idle);
    assert_eq!(controller.inputs().selected_date(), None);
    assert_eq!(controller.inputs().days_left_slider(), 10);
    assert_eq!(controller.inputs().seats_left(), 42);
    assert_eq!(controller.inputs().demand_index(), 1.0);
    assert!(controller.can_recalc());
}

#[test]
fn initial_seats_are_clamped_into_slider_range() {
    let mut flight = indigo();
    flight.seats_left = 400;
    let controller = FareSimulationController::new(flight.clone(), delhi_mumbai());
    assert_eq!(controller.inputs().seats_left(), 150);
    assert_eq!(controller.flight().seats_left, 400);

    flight.seats_left = 0;
    let controller = FareSimulationController::new(flight, delhi_mumbai());
    assert_eq!(controller.inputs().seats_left(), 1);
}

#[test]
fn toggle_flips_visibility_without_touching_state() {
    let mut controller = FareSimulationController::new(indigo(), delhi_mumbai());
    controller.set_seats_left(12);
    let pending = controller.begin_recalc().expect("pending");
    controller.complete_recalc(pending.seq, Ok(ExplainResponse::Breakdown(breakdown(6000.0))));

    controller.toggle();
    assert!(controller.is_expanded());
    controller.toggle();
    assert!(!controller.is_expanded());
    assert_eq!(controller.inputs().seats_left(), 12);
    assert_eq!(controller.result(), Some(&breakdown(6000.0)));
}

#[test]
fn setters_clamp_into_their_ranges() {
    let mut controller = FareSimulationController::new(indigo(), delhi_mumbai());

    controller.set_days_left_slider(0);
    assert_eq!(controller.inputs().days_left_slider(), 1);
    controller.set_days_left_slider(45);
    assert_eq!(controller.inputs().days_left_slider(), 30);

    controller.set_seats_left(0);
    assert_eq!(controller.inputs().seats_left(), 1);
    controller.set_seats_left(999);
    assert_eq!(controller.inputs().seats_left(), 150);

    controller.set_demand_index(0.2);
    assert_eq!(controller.inputs().demand_index(), 0.7);
    controller.set_demand_index(3.0);
    assert_eq!(controller.inputs().demand_index(), 1.5);
    controller.set_demand_index(1.26);
    assert_eq!(controller.inputs().demand_index(), 1.3);
    controller.set_demand_index(f64::NAN);
    assert_eq!(controller.inputs().demand_index(), 1.3);
}

#[test]
fn selected_date_overrides_slider_and_preserves_it() {
    let now = at("2026-10-19T10:00:00Z");
    let mut controller = FareSimulationController::new(indigo(), delhi_mumbai());
    controller.set_days_left_slider(20);

    controller.set_selected_date(Some(date("2026-10-24")));
    assert_eq!(controller.effective_days_left_at(now), 5);

    controller.set_days_left_slider(3);
    assert_eq!(controller.inputs().days_left_slider(), 20);

    controller.set_selected_date(None);
    assert_eq!(controller.effective_days_left_at(now), 20);
}

#[test]
fn days_until_rounds_partial_days_up() {
    let now = at("2026-10-19T10:00:00Z");
    assert_eq!(days_until(date("2026-10-20"), now), 1);
    assert_eq!(days_until(date("2026-10-22"), now), 3);

    let midnight = at("2026-10-19T00:00:00Z");
    assert_eq!(days_until(date("2026-10-21"), midnight), 2);
}

#[test]
fn effective_days_left_never_drops_below_one() {
    let now = at("2026-10-19T23:59:59Z");
    let mut controller = FareSimulationController::new(indigo(), delhi_mumbai());
    for offset in -400..=400 {
        let travel = now.date_naive() + Duration::days(offset);
        controller.set_selected_date(Some(travel));
        let days = controller.effective_days_left_at(now);
        assert!(days >= 1, "offset {offset} gave {days}");
    }

    controller.set_selected_date(Some(now.date_naive()));
    assert_eq!(controller.effective_days_left_at(now), 1);
    controller.set_selected_date(Some(date("2020-01-01")));
    assert_eq!(controller.effective_days_left_at(now), 1);
}

#[test]
fn request_buckets_departure_and_arrival_times() {
    let mut flight = indigo();
    flight.arrival_time = "09:45".into();
    let controller = FareSimulationController::new(flight, delhi_mumbai());
    let request = controller
        .explain_request_at(at("2026-10-19T10:00:00Z"))
        .expect("request");
    assert_eq!(request.departure_time, TimeBucket::EarlyMorning);
    assert_eq!(request.arrival_time, TimeBucket::Morning);
}

#[test]
fn request_defaults_class_to_economy() {
    let context = SimulationContext {
        route: Some("Delhi_Mumbai".into()),
        flight_class: Some(String::new()),
    };
    let controller = FareSimulationController::new(indigo(), context);
    let request = controller
        .explain_request_at(at("2026-10-19T10:00:00Z"))
        .expect("request");
    assert_eq!(request.flight_class, "Economy");

    let context = SimulationContext {
        route: Some("Delhi_Mumbai".into()),
        flight_class: Some("Business".into()),
    };
    let controller = FareSimulationController::new(indigo(), context);
    let request = controller
        .explain_request_at(at("2026-10-19T10:00:00Z"))
        .expect("request");
    assert_eq!(request.flight_class, "Business");
}

#[tokio::test]
async fn recalc_without_route_never_calls_service() {
    for route in [None, Some(String::new())] {
        let service = ScriptedService::new(vec![Ok(ExplainResponse::Breakdown(breakdown(1.0)))]);
        let mut controller = FareSimulationController::new(
            indigo(),
            SimulationContext {
                route,
                flight_class: None,
            },
        );
        controller.recalc(&service).await;

        assert_eq!(service.request_count().await, 0);
        assert_eq!(
            controller.lifecycle(),
            &RequestLifecycle::Failure(RecalcError::MissingRouteContext)
        );
        assert_eq!(
            controller.failure().map(ToString::to_string).as_deref(),
            Some("Route information not available")
        );
    }
}

#[tokio::test]
async fn soft_error_replaces_previous_success() {
    let service = ScriptedService::new(vec![
        Ok(ExplainResponse::Breakdown(breakdown(5203.36))),
        Ok(ExplainResponse::SoftError { error: "x".into() }),
    ]);
    let mut controller = FareSimulationController::new(indigo(), delhi_mumbai());

    controller.recalc(&service).await;
    assert_eq!(controller.result(), Some(&breakdown(5203.36)));

    controller.recalc(&service).await;
    assert_eq!(
        controller.lifecycle(),
        &RequestLifecycle::Failure(RecalcError::ServiceSoftError("x".into()))
    );
    assert_eq!(controller.result(), None);
    assert_eq!(controller.failure().map(ToString::to_string).as_deref(), Some("x"));
}

#[tokio::test]
async fn transport_fault_surfaces_generic_message() {
    let service = ScriptedService::new(vec![Err(anyhow!("connection refused"))]);
    let mut controller = FareSimulationController::new(indigo(), delhi_mumbai());
    controller.recalc(&service).await;

    assert_eq!(
        controller.lifecycle(),
        &RequestLifecycle::Failure(RecalcError::TransportFailure)
    );
    assert_eq!(
        controller.failure().map(ToString::to_string).as_deref(),
        Some("Failed to recalculate price")
    );
}

#[tokio::test]
async fn failure_is_cleared_when_next_request_starts() {
    let service = ScriptedService::new(vec![
        Err(anyhow!("timed out")),
        Ok(ExplainResponse::Breakdown(breakdown(4000.0))),
    ]);
    let mut controller = FareSimulationController::new(indigo(), delhi_mumbai());
    controller.recalc(&service).await;
    assert!(controller.failure().is_some());

    let pending = controller.begin_recalc().expect("pending");
    assert_eq!(controller.lifecycle(), &RequestLifecycle::Loading);
    assert!(controller.failure().is_none());
    assert!(!controller.can_recalc());

    let outcome = service.explain(&pending.request).await;
    assert!(controller.complete_recalc(pending.seq, outcome));
    assert_eq!(controller.result(), Some(&breakdown(4000.0)));
}

#[tokio::test]
async fn repeated_recalc_with_same_inputs_is_idempotent() {
    let mut controller = FareSimulationController::new(indigo(), delhi_mumbai());
    controller.set_seats_left(30);
    controller.set_demand_index(1.2);

    controller.recalc(&DeterministicService).await;
    let first = controller.result().cloned().expect("first");
    controller.recalc(&DeterministicService).await;
    let second = controller.result().cloned().expect("second");
    assert_eq!(first, second);
}

#[tokio::test]
async fn recalc_leaves_inputs_and_flight_untouched() {
    let service = ScriptedService::new(vec![Ok(ExplainResponse::Breakdown(breakdown(1.0)))]);
    let mut controller = FareSimulationController::new(indigo(), delhi_mumbai());
    controller.set_selected_date(Some(date("2030-01-01")));
    controller.set_seats_left(7);
    let inputs_before = controller.inputs().clone();

    controller.recalc(&service).await;
    assert_eq!(controller.inputs(), &inputs_before);
    assert_eq!(controller.flight(), &indigo());
}

#[tokio::test]
async fn delhi_mumbai_scenario_sends_normalized_payload() {
    let service = ScriptedService::new(vec![Ok(ExplainResponse::Breakdown(breakdown(1.0)))]);
    let mut controller = FareSimulationController::new(indigo(), delhi_mumbai());
    controller.toggle();
    controller.set_seats_left(42);
    controller.set_demand_index(1.0);
    controller.set_days_left_slider(10);
    controller.recalc(&service).await;

    let requests = service.requests.lock().await;
    assert_eq!(requests.len(), 1);
    let body = serde_json::to_value(&requests[0]).expect("json");
    assert_eq!(
        body,
        serde_json::json!({
            "airline": "IndiGo",
            "route": "Delhi-Mumbai",
            "departure_time": "Early_Morning",
            "arrival_time": "Morning",
            "class_": "Economy",
            "days_left": 10,
            "duration": 2.1,
            "stops": 0,
            "seats_left": 42,
            "demand_index": 1.0
        })
    );
}

#[test]
fn superseded_ticket_cannot_overwrite_newer_result() {
    let mut controller = FareSimulationController::new(indigo(), delhi_mumbai());
    let first = controller.begin_recalc().expect("first");
    controller.set_seats_left(5);
    let second = controller.begin_recalc().expect("second");
    assert_eq!(controller.latest_seq(), second.seq);
    assert!(second.seq > first.seq);
    assert_eq!(second.request.seats_left, 5);

    assert!(!controller.complete_recalc(
        first.seq,
        Ok(ExplainResponse::Breakdown(breakdown(1111.0)))
    ));
    assert!(controller.is_loading());

    assert!(controller.complete_recalc(
        second.seq,
        Ok(ExplainResponse::Breakdown(breakdown(2222.0)))
    ));
    assert!(!controller.complete_recalc(
        first.seq,
        Ok(ExplainResponse::Breakdown(breakdown(1111.0)))
    ));
    assert_eq!(controller.result(), Some(&breakdown(2222.0)));
}

#[test]
fn duplicate_completion_is_ignored() {
    let mut controller = FareSimulationController::new(indigo(), delhi_mumbai());
    let pending = controller.begin_recalc().expect("pending");
    assert!(controller.complete_recalc(
        pending.seq,
        Ok(ExplainResponse::Breakdown(breakdown(1.0)))
    ));
    assert!(!controller.complete_recalc(pending.seq, Err(anyhow!("late duplicate"))));
    assert_eq!(controller.result(), Some(&breakdown(1.0)));
}

#[tokio::test]
async fn unreadable_flight_time_fails_without_calling_service() {
    let service = ScriptedService::new(vec![Ok(ExplainResponse::Breakdown(breakdown(1.0)))]);
    let mut flight = indigo();
    flight.departure_time = "TBD".into();
    let mut controller = FareSimulationController::new(flight, delhi_mumbai());
    controller.recalc(&service).await;

    assert_eq!(service.request_count().await, 0);
    assert_eq!(
        controller.lifecycle(),
        &RequestLifecycle::Failure(RecalcError::TransportFailure)
    );
}

#[test]
fn card_renders_summary_and_expanded_breakdown() {
    let now = at("2026-10-19T10:00:00Z");
    let mut controller = FareSimulationController::new(indigo(), delhi_mumbai());
    let collapsed = controller.card_at(now).to_string();
    assert_eq!(collapsed, "IndiGo  05:30 → 07:40  seats left: 42  ₹4500\n");

    controller.toggle();
    let pending = controller.begin_recalc_at(now).expect("pending");
    let loading = controller.card_at(now).to_string();
    assert!(loading.contains("[Calculating...]"));
    assert!(loading.contains("Days to departure: 10"));

    controller.complete_recalc(pending.seq, Ok(ExplainResponse::Breakdown(breakdown(5203.36))));
    let rendered = controller.card_at(now).to_string();
    assert!(rendered.contains("[Recalculate]"));
    assert!(rendered.contains("Demand index: 1.0"));
    assert!(rendered.contains("Base Fare: ₹5000"));
    assert!(rendered.contains("Final Price: ₹5203.36"));
    assert!(rendered.contains("  - Base fare determined by route and class"));
}

#[test]
fn card_shows_failure_message() {
    let now = at("2026-10-19T10:00:00Z");
    let mut controller = FareSimulationController::new(indigo(), SimulationContext::default());
    controller.toggle();
    controller.begin_recalc_at(now);
    let rendered = controller.card_at(now).to_string();
    assert!(rendered.contains("Error: Route information not available"));
}
