//! Query string parsing shared by the search endpoints
//!
//! Parameters are taken as raw strings so that every validation failure is
//! reported through the service's own JSON error envelope.

use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::types::{Coordinate, SearchArea};

/// `GET /api/facilities` parameters
#[derive(Debug, Default, Deserialize)]
pub struct FacilityQuery {
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub radius: Option<String>,
    /// Comma-separated amenity values
    pub amenities: Option<String>,
    /// Free text, resolved by the keyword service
    pub keyword: Option<String>,
}

/// `/api/category-search` parameters
#[derive(Debug, Default, Deserialize)]
pub struct CategoryQuery {
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub radius: Option<String>,
    /// Comma-separated dictionary category names
    pub categories: Option<String>,
}

/// Validate coordinates and radius into a search area
///
/// An absent or empty `radius` takes `default_radius`.
pub fn parse_area(
    lat: Option<&str>,
    lon: Option<&str>,
    radius: Option<&str>,
    default_radius: u32,
) -> ApiResult<SearchArea> {
    let lat = parse_degrees("lat", lat, 90.0)?;
    let lon = parse_degrees("lon", lon, 180.0)?;

    let radius = match radius.map(str::trim) {
        None | Some("") => default_radius,
        Some(raw) => match raw.parse::<u32>() {
            Ok(0) => {
                return Err(ApiError::BadRequest(
                    "radius must be greater than zero".to_string(),
                ))
            }
            Ok(meters) => meters,
            Err(_) => {
                return Err(ApiError::BadRequest(format!(
                    "radius must be a whole number of meters, got '{}'",
                    raw
                )))
            }
        },
    };

    Ok(SearchArea {
        origin: Coordinate::new(lat, lon),
        radius,
    })
}

fn parse_degrees(name: &str, raw: Option<&str>, limit: f64) -> ApiResult<f64> {
    let raw = match raw.map(str::trim) {
        None | Some("") => {
            return Err(ApiError::BadRequest(
                "lat and lon query parameters are required".to_string(),
            ))
        }
        Some(raw) => raw,
    };

    let value: f64 = raw
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("{} must be a number, got '{}'", name, raw)))?;

    if !value.is_finite() || value.abs() > limit {
        return Err(ApiError::BadRequest(format!(
            "{} must be between -{} and {}, got '{}'",
            name, limit, limit, raw
        )));
    }
    Ok(value)
}

/// Split a comma-separated list, dropping blanks and repeats
pub fn split_list(raw: &str) -> Vec<String> {
    let mut items: Vec<String> = Vec::new();
    for item in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !items.iter().any(|existing| existing == item) {
            items.push(item.to_string());
        }
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_area_defaults_radius() {
        let area = parse_area(Some("35.68"), Some("139.76"), None, 1000).unwrap();
        assert_eq!(area.origin, Coordinate::new(35.68, 139.76));
        assert_eq!(area.radius, 1000);

        let area = parse_area(Some("35.68"), Some("139.76"), Some(""), 1000).unwrap();
        assert_eq!(area.radius, 1000);

        let area = parse_area(Some("35.68"), Some("139.76"), Some(" 250 "), 1000).unwrap();
        assert_eq!(area.radius, 250);
    }

    #[test]
    fn test_parse_area_rejects_bad_coordinates() {
        for (lat, lon) in [
            (None, Some("139.0")),
            (Some("35.0"), None),
            (Some(""), Some("139.0")),
            (Some("abc"), Some("139.0")),
            (Some("NaN"), Some("139.0")),
            (Some("inf"), Some("139.0")),
            (Some("91"), Some("139.0")),
            (Some("35.0"), Some("-180.5")),
        ] {
            assert!(
                matches!(parse_area(lat, lon, None, 1000), Err(ApiError::BadRequest(_))),
                "accepted lat={:?} lon={:?}",
                lat,
                lon
            );
        }
    }

    #[test]
    fn test_parse_area_rejects_bad_radius() {
        for radius in ["abc", "-5", "1.5", "0"] {
            assert!(parse_area(Some("35"), Some("139"), Some(radius), 1000).is_err());
        }
    }

    #[test]
    fn test_split_list() {
        assert_eq!(
            split_list(" cafe, ,restaurant,cafe,"),
            vec!["cafe".to_string(), "restaurant".to_string()]
        );
        assert!(split_list(" , ").is_empty());
    }
}
