use shared::{
    catalog::{find_airport, find_flight_class, CatalogEntry, AIRPORTS, FLIGHT_CLASSES},
    domain::SearchCriteria,
};

/// Editable search criteria backing the search bar.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchForm {
    criteria: SearchCriteria,
}

impl SearchForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn criteria(&self) -> &SearchCriteria {
        &self.criteria
    }

    /// Picking the current destination as source clears the destination.
    pub fn set_source(&mut self, source: impl Into<String>) {
        let source = source.into();
        if self.criteria.destination == source {
            self.criteria.destination.clear();
        }
        self.criteria.source = source;
    }

    /// Returns `false` and keeps the old value when `destination` equals the source.
    pub fn set_destination(&mut self, destination: impl Into<String>) -> bool {
        let destination = destination.into();
        if !destination.is_empty() && destination == self.criteria.source {
            return false;
        }
        self.criteria.destination = destination;
        true
    }

    pub fn set_flight_class(&mut self, flight_class: impl Into<String>) {
        self.criteria.flight_class = flight_class.into();
    }

    pub fn source_options(&self) -> Vec<&'static CatalogEntry> {
        AIRPORTS.iter().collect()
    }

    pub fn destination_options(&self) -> Vec<&'static CatalogEntry> {
        AIRPORTS
            .iter()
            .filter(|entry| entry.code != self.criteria.source)
            .collect()
    }

    pub fn class_options(&self) -> Vec<&'static CatalogEntry> {
        FLIGHT_CLASSES.iter().collect()
    }

    pub fn is_ready(&self) -> bool {
        self.criteria.is_complete()
    }

    /// Names of filled-in fields whose value is not one of the offered options.
    pub fn unknown_fields(&self) -> Vec<&'static str> {
        let criteria = &self.criteria;
        let mut unknown = Vec::new();
        if !criteria.source.is_empty() && find_airport(&criteria.source).is_none() {
            unknown.push("source");
        }
        if !criteria.destination.is_empty() && find_airport(&criteria.destination).is_none() {
            unknown.push("destination");
        }
        if !criteria.flight_class.is_empty() && find_flight_class(&criteria.flight_class).is_none()
        {
            unknown.push("class");
        }
        unknown
    }
}
