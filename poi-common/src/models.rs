//! Flat value types shared by the search service and its clients

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Normalized point-of-interest record returned by the search API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    /// OSM element id
    pub id: i64,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    /// Most specific tag available (`cuisine`, then `amenity`)
    pub category: String,
}

/// Facility with driving distance from the search origin
///
/// `distance` is serialized as `null` when the routing service could not
/// produce a route; the key is always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedFacility {
    #[serde(flatten)]
    pub facility: Facility,
    /// Meters along the first route returned by the routing service
    pub distance: Option<f64>,
}

/// Single OSM key/value constraint, e.g. `amenity=cafe`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagFilter {
    pub key: String,
    pub value: String,
}

impl TagFilter {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Set of tag filters that must all match one element
///
/// Several search terms express a logical OR. On the wire a term is
/// `{"tags": {"amenity": "cafe", ...}}`; the single-pair form
/// `{"key": "amenity", "value": "cafe"}` is also accepted when reading.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "SearchTermWire", into = "SearchTermTags")]
pub struct SearchTerm {
    filters: Vec<TagFilter>,
}

impl SearchTerm {
    pub fn new(filters: Vec<TagFilter>) -> Self {
        Self { filters }
    }

    /// Term matching a single `amenity=<value>` filter
    pub fn amenity(value: impl Into<String>) -> Self {
        Self::new(vec![TagFilter::new("amenity", value)])
    }

    pub fn filters(&self) -> &[TagFilter] {
        &self.filters
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SearchTermWire {
    Tags { tags: BTreeMap<String, String> },
    Pair(TagFilter),
}

#[derive(Serialize)]
struct SearchTermTags {
    tags: BTreeMap<String, String>,
}

impl From<SearchTermWire> for SearchTerm {
    fn from(wire: SearchTermWire) -> Self {
        match wire {
            SearchTermWire::Tags { tags } => Self::new(
                tags.into_iter()
                    .map(|(key, value)| TagFilter { key, value })
                    .collect(),
            ),
            SearchTermWire::Pair(filter) => Self::new(vec![filter]),
        }
    }
}

impl From<SearchTerm> for SearchTermTags {
    fn from(term: SearchTerm) -> Self {
        Self {
            tags: term
                .filters
                .into_iter()
                .map(|f| (f.key, f.value))
                .collect(),
        }
    }
}
