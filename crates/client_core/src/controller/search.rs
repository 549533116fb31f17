use anyhow::{Context, Result};
use shared::domain::{FlightSummary, SearchCriteria};
use tracing::{debug, info};

use crate::{controller::simulation::SimulationContext, FareService};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Criteria were incomplete; nothing was sent.
    Skipped,
    Loaded { flights: usize },
}

/// Last executed search and its results.
#[derive(Debug, Clone, Default)]
pub struct SearchController {
    criteria: SearchCriteria,
    flights: Vec<FlightSummary>,
    route: Option<String>,
    generation: u64,
}

impl SearchController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Incomplete criteria are a silent no-op. On failure the previous
    /// result set stays in place.
    pub async fn search(
        &mut self,
        criteria: SearchCriteria,
        service: &dyn FareService,
    ) -> Result<SearchOutcome> {
        if !criteria.is_complete() {
            debug!(?criteria, "search skipped: criteria incomplete");
            return Ok(SearchOutcome::Skipped);
        }

        let response = service.search(&criteria).await.with_context(|| {
            format!(
                "flight search {} -> {} failed",
                criteria.source, criteria.destination
            )
        })?;

        info!(
            route = %response.route,
            flights = response.flights.len(),
            "search results loaded"
        );
        self.criteria = criteria;
        self.flights = response.flights;
        self.route = Some(response.route);
        self.generation += 1;
        Ok(SearchOutcome::Loaded {
            flights: self.flights.len(),
        })
    }

    pub fn criteria(&self) -> &SearchCriteria {
        &self.criteria
    }

    pub fn flights(&self) -> &[FlightSummary] {
        &self.flights
    }

    /// Route label exactly as the service returned it.
    pub fn route(&self) -> Option<&str> {
        self.route.as_deref()
    }

    /// Bumped once per successful search; identifies the current result set.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn simulation_context(&self) -> SimulationContext {
        SimulationContext {
            route: self.route.clone(),
            flight_class: Some(self.criteria.flight_class.clone())
                .filter(|class| !class.trim().is_empty()),
        }
    }
}

#[cfg(test)]
#[path = "tests/search_tests.rs"]
mod tests;
