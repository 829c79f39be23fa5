//! Wire request/response and the session state decoded from them.
//!
//! The server keeps no state between calls. Everything the next call needs
//! (strategy, distance range, category, center, continuation token, seen place
//! ids) travels in the response and comes back in the following request.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use storefind_core::LatLng;

use crate::enrich::EnrichedStore;
use crate::error::SearchError;

pub const SOURCE: &str = "Google Places API with DeepSeek categorization";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    #[default]
    Primary,
    Grid,
    Keyword,
    Type,
    Fallback,
    /// Set after an extended search adopted results. Replayed inbound, it
    /// builds the same query as [`Strategy::Fallback`].
    Extended,
}

impl Strategy {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Primary => "primary",
            Strategy::Grid => "grid",
            Strategy::Keyword => "keyword",
            Strategy::Type => "type",
            Strategy::Fallback => "fallback",
            Strategy::Extended => "extended",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_page() -> u32 {
    1
}

fn default_range() -> u32 {
    1
}

/// Body of `POST /api/search-stores`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default)]
    pub retail_store: Option<String>,
    #[serde(default, alias = "zipCode")]
    pub postal_code: String,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default)]
    pub base_radius: Option<u32>,
    #[serde(default)]
    pub seen_ids: Vec<String>,
    #[serde(default)]
    pub search_strategy: Strategy,
    #[serde(default = "default_range")]
    pub current_distance_range: u32,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub next_page_token: Option<String>,
    #[serde(default)]
    pub location: Option<LatLng>,
}

impl SearchRequest {
    /// First-page request for a new session.
    #[must_use]
    pub fn new(product: Option<String>, retail_store: Option<String>, postal_code: &str) -> Self {
        Self {
            product,
            retail_store,
            postal_code: postal_code.to_owned(),
            page: 1,
            base_radius: None,
            seen_ids: Vec::new(),
            search_strategy: Strategy::Primary,
            current_distance_range: 1,
            category: None,
            next_page_token: None,
            location: None,
        }
    }

    /// The request for the next page: this request's immutable fields plus
    /// the session state carried by `response`.
    #[must_use]
    pub fn follow_up(&self, response: &SearchResponse) -> Self {
        Self {
            product: self.product.clone(),
            retail_store: self.retail_store.clone(),
            postal_code: self.postal_code.clone(),
            page: response.page.saturating_add(1),
            base_radius: self.base_radius,
            seen_ids: response.seen_ids.clone(),
            search_strategy: response.search_strategy,
            current_distance_range: response.current_distance_range,
            category: Some(response.category.clone()),
            next_page_token: response.next_page_token.clone(),
            location: Some(response.location),
        }
    }
}

/// Place ids in order of first appearance, without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeenIds {
    order: Vec<String>,
    index: HashSet<String>,
}

impl SeenIds {
    #[must_use]
    pub fn contains(&self, place_id: &str) -> bool {
        self.index.contains(place_id)
    }

    /// Returns `false` when the id was already present.
    pub fn insert(&mut self, place_id: &str) -> bool {
        if self.index.contains(place_id) {
            return false;
        }
        self.index.insert(place_id.to_owned());
        self.order.push(place_id.to_owned());
        true
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        self.order
    }
}

impl<S: AsRef<str>> FromIterator<S> for SeenIds {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut seen = SeenIds::default();
        for id in iter {
            seen.insert(id.as_ref());
        }
        seen
    }
}

/// Validated state for one call.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSession {
    pub product: Option<String>,
    pub retail_store: Option<String>,
    pub postal_code: String,
    pub category: Option<String>,
    pub center: Option<LatLng>,
    pub page: u32,
    pub strategy: Strategy,
    pub distance_range: u32,
    pub base_radius_m: u32,
    pub continuation_token: Option<String>,
    pub seen_ids: SeenIds,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

impl SearchSession {
    /// Decodes and validates a request.
    ///
    /// # Errors
    ///
    /// [`SearchError::Input`] when neither product nor retail store is given,
    /// the postal code is blank, `page` or `currentDistanceRange` is zero, or
    /// `baseRadius` is zero.
    pub fn from_request(
        request: SearchRequest,
        default_base_radius_m: u32,
    ) -> Result<Self, SearchError> {
        let product = non_blank(request.product);
        let retail_store = non_blank(request.retail_store);
        if product.is_none() && retail_store.is_none() {
            return Err(SearchError::Input(
                "product or retailStore is required".to_owned(),
            ));
        }

        let postal_code = request.postal_code.trim().to_owned();
        if postal_code.is_empty() {
            return Err(SearchError::Input("postalCode is required".to_owned()));
        }
        if request.page == 0 {
            return Err(SearchError::Input("page must be at least 1".to_owned()));
        }
        if request.current_distance_range == 0 {
            return Err(SearchError::Input(
                "currentDistanceRange must be at least 1".to_owned(),
            ));
        }
        let base_radius_m = request.base_radius.unwrap_or(default_base_radius_m);
        if base_radius_m == 0 {
            return Err(SearchError::Input(
                "baseRadius must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            product,
            retail_store,
            postal_code,
            category: non_blank(request.category),
            center: request.location,
            page: request.page,
            strategy: request.search_strategy,
            distance_range: request.current_distance_range,
            base_radius_m,
            continuation_token: non_blank(request.next_page_token),
            seen_ids: request.seen_ids.into_iter().collect(),
        })
    }
}

/// Counters describing how one call narrowed its results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchDebug {
    pub strategy: Strategy,
    pub range: u32,
    pub places_found: usize,
    pub new_places: usize,
    pub after_distance_filter: usize,
    pub has_next_page_token: bool,
    pub unique_stores_count: usize,
}

/// Response body of `POST /api/search-stores`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub results: Vec<EnrichedStore>,
    pub next_page_token: Option<String>,
    pub seen_ids: Vec<String>,
    pub page: u32,
    pub search_query: String,
    pub location: LatLng,
    pub search_strategy: Strategy,
    pub current_distance_range: u32,
    pub has_more: bool,
    pub category: String,
    pub source: String,
    pub debug: SearchDebug,
}
