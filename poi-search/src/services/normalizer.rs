//! Reshapes Overpass elements into flat facility records

use poi_common::Facility;

use super::overpass_client::OverpassElement;

/// Category used when an element has neither `cuisine` nor `amenity`
pub const UNKNOWN_CATEGORY: &str = "unknown";

/// Convert elements to facilities, preserving input order
///
/// Elements without a `name` tag, or with a blank one, are dropped. Coordinates come from the
/// element itself, then its `center`, then fall back to `0,0`.
pub fn normalize(elements: Vec<OverpassElement>) -> Vec<Facility> {
    elements.into_iter().filter_map(to_facility).collect()
}

fn to_facility(element: OverpassElement) -> Option<Facility> {
    let mut tags = element.tags.unwrap_or_default();
    let name = tags.remove("name").filter(|n| !n.trim().is_empty())?;

    let (lat, lon) = match (element.lat, element.lon, element.center) {
        (Some(lat), Some(lon), _) => (lat, lon),
        (_, _, Some(center)) => (center.lat, center.lon),
        _ => {
            tracing::debug!(
                id = element.id,
                element_type = %element.element_type,
                "Element has no coordinates, using 0,0"
            );
            (0.0, 0.0)
        }
    };

    let category = tags
        .remove("cuisine")
        .or_else(|| tags.remove("amenity"))
        .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string());

    Some(Facility {
        id: element.id,
        name,
        lat,
        lon,
        category,
    })
}
