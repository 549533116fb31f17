//! Static airport and cabin-class options offered by the search form.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub code: &'static str,
    pub label: &'static str,
}

pub const AIRPORTS: [CatalogEntry; 3] = [
    CatalogEntry {
        code: "Delhi",
        label: "Delhi (DEL)",
    },
    CatalogEntry {
        code: "Mumbai",
        label: "Mumbai (BOM)",
    },
    CatalogEntry {
        code: "Bangalore",
        label: "Bangalore (BLR)",
    },
];

pub const FLIGHT_CLASSES: [CatalogEntry; 2] = [
    CatalogEntry {
        code: "Economy",
        label: "Economy",
    },
    CatalogEntry {
        code: "Business",
        label: "Business",
    },
];

pub fn find_airport(code: &str) -> Option<&'static CatalogEntry> {
    AIRPORTS.iter().find(|entry| entry.code == code)
}

pub fn find_flight_class(code: &str) -> Option<&'static CatalogEntry> {
    FLIGHT_CLASSES.iter().find(|entry| entry.code == code)
}
