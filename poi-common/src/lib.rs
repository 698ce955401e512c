//! # POI Common Library
//!
//! Shared code for the nearby facility search workspace:
//! - Error type used across crates
//! - Bootstrap configuration (TOML file, overrides, compiled defaults)
//! - Flat value types returned by the search API (facilities, tag filters)

pub mod config;
pub mod error;
pub mod models;

pub use error::{Error, Result};
pub use models::{Facility, RankedFacility, SearchTerm, TagFilter};
