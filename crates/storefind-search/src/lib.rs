//! Adaptive multi-strategy retail store search.
//!
//! One call to [`StoreSearch::search`] performs one provider query chosen
//! from the session state the caller sends back, filters and deduplicates the
//! results, enriches them with contact details, and returns the next session
//! state. The server holds nothing between calls.

pub mod capabilities;
pub mod config;
pub mod dedup;
pub mod enrich;
pub mod error;
pub mod fetch;
pub mod geo;
pub mod orchestrator;
pub mod query;
pub mod session;
pub mod strategy;

#[cfg(test)]
mod test_support;

pub use capabilities::{Geocoder, PlacesProvider, ProductClassifier};
pub use config::SearchConfig;
pub use enrich::EnrichedStore;
pub use error::SearchError;
pub use orchestrator::{LiveSearch, StoreSearch};
pub use session::{SearchDebug, SearchRequest, SearchResponse, SearchSession, SeenIds, Strategy};
