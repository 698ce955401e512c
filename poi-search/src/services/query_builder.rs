//! Overpass QL query construction
//!
//! Each search term becomes three clauses (node, way, relation) scoped with
//! an `around` filter; all clauses share one union so terms are OR'd. The
//! query ends with `out center;` so ways and relations carry a centroid.
//!
//! Keys and values are caller- or upstream-controlled, so they are trimmed,
//! stripped of control characters, and have `\` and `"` escaped before being
//! placed inside the quoted Overpass strings.

use poi_common::SearchTerm;
use std::fmt::Write;
use thiserror::Error;

use crate::types::SearchArea;

/// Element kinds queried for every search term
const ELEMENT_KINDS: [&str; 3] = ["node", "way", "relation"];

/// Query construction errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryBuildError {
    #[error("No search terms supplied")]
    NoSearchTerms,

    #[error("Search term {0} has no tag filters")]
    EmptySearchTerm(usize),

    #[error("Search term {0} has a tag filter with an empty key")]
    EmptyKey(usize),

    #[error("Search term {0} has a tag filter with an empty value")]
    EmptyValue(usize),
}

/// Builds Overpass QL for proximity searches
#[derive(Debug, Clone, Copy)]
pub struct QueryBuilder {
    timeout_secs: u64,
}

impl QueryBuilder {
    /// `timeout_secs` is written into the `[timeout:N]` header so the server
    /// gives up no later than the client does.
    pub fn new(timeout_secs: u64) -> Self {
        Self { timeout_secs }
    }

    /// Build the query for `terms` around `area`
    pub fn build(&self, area: &SearchArea, terms: &[SearchTerm]) -> Result<String, QueryBuildError> {
        if terms.is_empty() {
            return Err(QueryBuildError::NoSearchTerms);
        }

        let around = format!(
            "(around:{},{},{})",
            area.radius, area.origin.lat, area.origin.lon
        );

        let mut clauses = String::new();
        for (index, term) in terms.iter().enumerate() {
            let filters = render_filters(index, term)?;
            for kind in ELEMENT_KINDS {
                // Writing to a String cannot fail
                let _ = writeln!(clauses, "  {}{}{};", kind, filters, around);
            }
        }

        Ok(format!(
            "[out:json][timeout:{}];\n(\n{});\nout center;\n",
            self.timeout_secs, clauses
        ))
    }
}

/// Render one term as `["k1"="v1"]["k2"="v2"]`
fn render_filters(index: usize, term: &SearchTerm) -> Result<String, QueryBuildError> {
    if term.is_empty() {
        return Err(QueryBuildError::EmptySearchTerm(index));
    }

    let mut rendered = String::new();
    for filter in term.filters() {
        let key = sanitize(&filter.key);
        let value = sanitize(&filter.value);
        if key.is_empty() {
            return Err(QueryBuildError::EmptyKey(index));
        }
        if value.is_empty() {
            return Err(QueryBuildError::EmptyValue(index));
        }
        let _ = write!(rendered, "[\"{}\"=\"{}\"]", key, value);
    }
    Ok(rendered)
}

/// Make a value safe to place between double quotes in Overpass QL
pub fn sanitize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.trim().chars().filter(|c| !c.is_control()) {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            _ => out.push(c),
        }
    }
    out
}
