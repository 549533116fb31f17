use std::{collections::HashSet, fmt};

use chrono::{DateTime, Utc};
use shared::domain::{FlightId, FlightSummary};
use tracing::debug;

use crate::controller::{
    search::SearchController,
    simulation::{FareSimulationController, FlightCard},
};

/// Identity of a flight card within one result set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FlightKey {
    Id(FlightId),
    Position(usize),
}

impl fmt::Display for FlightKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlightKey::Id(id) => write!(f, "{id}"),
            FlightKey::Position(index) => write!(f, "#{index}"),
        }
    }
}

/// One simulation controller per displayed flight, in result order.
#[derive(Debug, Default)]
pub struct FlightCatalog {
    generation: Option<u64>,
    cards: Vec<(FlightKey, FareSimulationController)>,
}

impl FlightCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the cards only when `search` holds a new result set, so
    /// per-flight state survives unrelated refreshes. Returns whether it rebuilt.
    pub fn sync(&mut self, search: &SearchController) -> bool {
        if self.generation == Some(search.generation()) {
            return false;
        }

        let context = search.simulation_context();
        self.cards = keyed_flights(search.flights())
            .map(|(key, flight)| {
                (
                    key,
                    FareSimulationController::new(flight.clone(), context.clone()),
                )
            })
            .collect();
        self.generation = Some(search.generation());
        debug!(
            generation = search.generation(),
            cards = self.cards.len(),
            "flight catalog rebuilt"
        );
        true
    }

    /// Applies the form's current cabin class to every card in place.
    pub fn set_flight_class(&mut self, flight_class: &str) {
        for (_, controller) in &mut self.cards {
            controller.set_flight_class(flight_class);
        }
        debug!(flight_class, cards = self.cards.len(), "cabin class updated");
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &FlightKey> {
        self.cards.iter().map(|(key, _)| key)
    }

    pub fn key_at(&self, index: usize) -> Option<&FlightKey> {
        self.cards.get(index).map(|(key, _)| key)
    }

    pub fn get(&self, key: &FlightKey) -> Option<&FareSimulationController> {
        self.cards
            .iter()
            .find(|(candidate, _)| candidate == key)
            .map(|(_, controller)| controller)
    }

    pub fn get_mut(&mut self, key: &FlightKey) -> Option<&mut FareSimulationController> {
        self.cards
            .iter_mut()
            .find(|(candidate, _)| candidate == key)
            .map(|(_, controller)| controller)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FlightKey, &FareSimulationController)> {
        self.cards.iter().map(|(key, controller)| (key, controller))
    }

    pub fn cards_at(&self, now: DateTime<Utc>) -> impl Iterator<Item = FlightCard<'_>> {
        self.cards
            .iter()
            .map(move |(_, controller)| controller.card_at(now))
    }
}

/// Uses the service's flight id when present and unique, list position otherwise.
fn keyed_flights(flights: &[FlightSummary]) -> impl Iterator<Item = (FlightKey, &FlightSummary)> {
    let mut seen = HashSet::new();
    flights.iter().enumerate().map(move |(index, flight)| {
        let key = match &flight.flight_id {
            Some(id) if seen.insert(id.clone()) => FlightKey::Id(id.clone()),
            _ => FlightKey::Position(index),
        };
        (key, flight)
    })
}

#[cfg(test)]
#[path = "tests/catalog_tests.rs"]
mod tests;
