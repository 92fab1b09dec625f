//! Destination catalog
//!
//! The catalog is read once at startup and never mutated. The data file's
//! `destinations` array replaces the built-in list when it is non-empty.

use serde::{Deserialize, Serialize};

/// A bookable destination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    pub id: u32,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub color: String,
    pub price: u32,
    pub description: String,
}

/// Read-only destination list
#[derive(Debug, Clone)]
pub struct Catalog {
    destinations: Vec<Destination>,
}

impl Catalog {
    pub fn new(destinations: Vec<Destination>) -> Self {
        Self { destinations }
    }

    /// Use `loaded` when non-empty, else the built-in list.
    pub fn from_loaded(loaded: Vec<Destination>) -> Self {
        if loaded.is_empty() {
            Self::new(builtin_destinations())
        } else {
            tracing::info!(count = loaded.len(), "Using destinations from data file");
            Self::new(loaded)
        }
    }

    pub fn all(&self) -> &[Destination] {
        &self.destinations
    }

    pub fn get(&self, id: u32) -> Option<&Destination> {
        self.destinations.iter().find(|d| d.id == id)
    }

    pub fn len(&self) -> usize {
        self.destinations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(builtin_destinations())
    }
}

fn destination(
    id: u32,
    name: &str,
    (lat, lng): (f64, f64),
    color: &str,
    price: u32,
    description: &str,
) -> Destination {
    Destination {
        id,
        name: name.to_string(),
        lat,
        lng,
        color: color.to_string(),
        price,
        description: description.to_string(),
    }
}

/// Destinations shipped with Ares Travel
pub fn builtin_destinations() -> Vec<Destination> {
    vec![
        destination(1, "Tokyo, Giappone", (35.6762, 139.6503), "#ff6b6b", 2500, "Metropoli futuristica e cultura millenaria"),
        destination(2, "Santorini, Grecia", (36.3932, 25.4615), "#4ecdc4", 1800, "Tramonti mozzafiato sul Mar Egeo"),
        destination(3, "Machu Picchu, Perù", (-13.1631, -72.5450), "#45b7d1", 2200, "Cittadella inca nelle Ande"),
        destination(4, "Maldive", (3.2028, 73.2207), "#f9ca24", 3500, "Atolli paradisiaci nell'Oceano Indiano"),
        destination(5, "Reykjavík, Islanda", (64.1466, -21.9426), "#6c5ce7", 2800, "Aurora boreale e paesaggi vulcanici"),
    ]
}
