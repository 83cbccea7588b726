//! Named places offered for pickup and dropoff, and the catalog search filter.

use serde::{Deserialize, Serialize};

use crate::geo::Coordinates;

pub const CURRENT_LOCATION_ID: &str = "current";
pub const CURRENT_LOCATION_NAME: &str = "Current Location";
pub const CURRENT_LOCATION_ADDRESS: &str = "Your current position";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub name: String,
    pub address: String,
    pub coordinates: Coordinates,
}

impl Location {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        address: impl Into<String>,
        coordinates: Coordinates,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            address: address.into(),
            coordinates,
        }
    }

    /// Entry for the device's own position.
    pub fn current_position(coordinates: Coordinates) -> Self {
        Self::new(
            CURRENT_LOCATION_ID,
            CURRENT_LOCATION_NAME,
            CURRENT_LOCATION_ADDRESS,
            coordinates,
        )
    }

    pub fn is_current_position(&self) -> bool {
        self.id == CURRENT_LOCATION_ID
    }

    /// `needle` must already be lowercase.
    fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.address.to_lowercase().contains(needle)
    }
}

/// Read-only list of popular places.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationCatalog {
    entries: Vec<Location>,
}

impl LocationCatalog {
    pub fn new(entries: Vec<Location>) -> Self {
        Self { entries }
    }

    /// Popular places around Accra.
    pub fn popular() -> Self {
        Self::new(vec![
            Location::new(
                "1",
                "Accra Mall",
                "Tetteh Quarshie Interchange, Accra",
                Coordinates::new(5.6037, -0.1870),
            ),
            Location::new(
                "2",
                "Kotoka International Airport",
                "Airport City, Accra",
                Coordinates::new(5.6052, -0.1668),
            ),
            Location::new(
                "3",
                "Osu Oxford Street",
                "Osu, Accra",
                Coordinates::new(5.5560, -0.1764),
            ),
            Location::new(
                "4",
                "Labadi Beach",
                "Labadi, Accra",
                Coordinates::new(5.6037, -0.1870),
            ),
            Location::new(
                "5",
                "University of Ghana",
                "Legon, Accra",
                Coordinates::new(5.6500, -0.1870),
            ),
        ])
    }

    pub fn entries(&self) -> &[Location] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Location> {
        self.entries.iter().find(|location| location.id == id)
    }

    /// Case-insensitive substring match on name or address. A blank query
    /// returns the whole catalog in catalog order.
    pub fn filter(&self, query: &str) -> Vec<Location> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.entries.clone();
        }
        self.entries
            .iter()
            .filter(|location| location.matches(&needle))
            .cloned()
            .collect()
    }
}

impl Default for LocationCatalog {
    fn default() -> Self {
        Self::popular()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(locations: &[Location]) -> Vec<&str> {
        locations.iter().map(|location| location.id.as_str()).collect()
    }

    #[test]
    fn blank_query_returns_full_catalog() {
        let catalog = LocationCatalog::popular();
        assert_eq!(catalog.filter(""), catalog.entries());
        assert_eq!(catalog.filter("   "), catalog.entries());
    }

    #[test]
    fn filter_ignores_letter_case() {
        let catalog = LocationCatalog::popular();
        for query in ["accra", "ACCRA", "AcCrA", "osu", "OSU", "legon", "LeGoN"] {
            let lower = catalog.filter(&query.to_lowercase());
            let upper = catalog.filter(&query.to_uppercase());
            assert_eq!(ids(&catalog.filter(query)), ids(&lower));
            assert_eq!(ids(&lower), ids(&upper));
        }
    }

    #[test]
    fn filter_matches_name_or_address() {
        let catalog = LocationCatalog::popular();
        assert_eq!(ids(&catalog.filter("airport")), vec!["2"]);
        assert_eq!(ids(&catalog.filter("labadi")), vec!["4"]);
        assert_eq!(ids(&catalog.filter("legon")), vec!["5"]);
        assert_eq!(catalog.filter("accra").len(), 5);
        assert!(catalog.filter("kumasi").is_empty());
    }

    #[test]
    fn filtering_leaves_catalog_untouched() {
        let catalog = LocationCatalog::popular();
        let before = catalog.clone();
        let _ = catalog.filter("mall");
        assert_eq!(catalog, before);
    }

    #[test]
    fn current_position_entry_is_tagged() {
        let here = Location::current_position(Coordinates::new(5.6, -0.18));
        assert!(here.is_current_position());
        assert_eq!(here.name, "Current Location");
        assert!(!LocationCatalog::popular().entries()[0].is_current_position());
    }
}
