//! Outbound clients and the search pipeline stages

pub mod distance;
pub mod keyword_client;
pub mod normalizer;
pub mod overpass_client;
pub mod query_builder;
pub mod tag_dictionary;

pub use distance::{sort_by_distance, DistanceEnricher, RoutingClient, RoutingError};
pub use keyword_client::{KeywordClient, KeywordError, KeywordOutcome};
pub use normalizer::normalize;
pub use overpass_client::{OverpassClient, OverpassElement, OverpassError};
pub use query_builder::{QueryBuildError, QueryBuilder};
pub use tag_dictionary::{CategoryDictionary, DictionaryError, Expansion};

/// Sent on every outbound request
pub const USER_AGENT: &str = concat!("poi-search/", env!("CARGO_PKG_VERSION"));
