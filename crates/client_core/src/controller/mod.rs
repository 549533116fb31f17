//! Controller layer: search form state, search results, and one fare
//! simulation state machine per displayed flight.

pub mod catalog;
pub mod form;
pub mod search;
pub mod simulation;
