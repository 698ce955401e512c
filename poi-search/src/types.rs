//! Geographic input types shared by the search pipeline

use std::fmt;

/// WGS84 point in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lon)
    }
}

/// Circle around an origin that a search is scoped to
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchArea {
    pub origin: Coordinate,
    /// Radius in meters
    pub radius: u32,
}
