//! One search step: decode the session, query, filter, advance, enrich.

use storefind_classifier::CategoryClassifier;
use storefind_core::LatLng;
use storefind_places::{Place, PlacesClient};

use crate::capabilities::{Geocoder, PlacesProvider, ProductClassifier};
use crate::config::{SearchConfig, ENRICH_BATCH_SIZE};
use crate::dedup::{contact_pass, identity_pass};
use crate::enrich::{enrich_places, Pacing};
use crate::error::SearchError;
use crate::fetch::{extended_search, fetch_page, ExtendedQuery};
use crate::geo::{distance_km, Annulus};
use crate::query::{extended_lookup_names, plan_query, search_query, QueryContext};
use crate::session::{
    SearchDebug, SearchRequest, SearchResponse, SearchSession, Strategy, SOURCE,
};
use crate::strategy::{advance, Observation};

/// Page and range past which a dry `type` search escalates to an extended
/// search.
const EXTENDED_MIN_PAGE: u32 = 40;
const EXTENDED_MIN_RANGE: u32 = 8;

/// The production wiring.
pub type LiveSearch = StoreSearch<CategoryClassifier, PlacesClient, PlacesClient>;

/// Stateless search orchestrator. Holds only configuration and clients;
/// all per-session state arrives in the request.
pub struct StoreSearch<C, G, P> {
    classifier: C,
    geocoder: G,
    places: P,
    config: SearchConfig,
}

impl<C, G, P> StoreSearch<C, G, P>
where
    C: ProductClassifier,
    G: Geocoder,
    P: PlacesProvider,
{
    #[must_use]
    pub fn new(classifier: C, geocoder: G, places: P, config: SearchConfig) -> Self {
        Self {
            classifier,
            geocoder,
            places,
            config,
        }
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    pub fn geocoder(&self) -> &G {
        &self.geocoder
    }

    pub fn places(&self) -> &P {
        &self.places
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Category replayed from the session, else classified on page 1, else
    /// the product text. Classification failures fall back to the product.
    async fn resolve_category(&self, session: &SearchSession) -> String {
        if let Some(category) = &session.category {
            return category.clone();
        }
        let Some(product) = session.product.as_deref() else {
            return String::new();
        };
        if session.page != 1 {
            return product.to_owned();
        }
        match self.classifier.classify(product).await {
            Ok(category) => {
                tracing::debug!(product, category = %category, "category resolved");
                category
            }
            Err(e) => {
                tracing::warn!(product, error = %e, "classification failed, using product text");
                product.to_owned()
            }
        }
    }

    async fn resolve_center(&self, session: &SearchSession) -> Result<LatLng, SearchError> {
        if let Some(center) = session.center {
            return Ok(center);
        }
        let center = self
            .geocoder
            .geocode(&session.postal_code)
            .await
            .map_err(|source| {
                tracing::error!(
                    postal_code = %session.postal_code,
                    error = %source,
                    "geocoding failed"
                );
                SearchError::Geocoding {
                    postal_code: session.postal_code.clone(),
                    source,
                }
            })?;
        tracing::debug!(postal_code = %session.postal_code, %center, "postal code geocoded");
        Ok(center)
    }

    /// Runs one step of the search described by `request`.
    ///
    /// # Errors
    ///
    /// - [`SearchError::Input`] for an invalid request (no provider calls made).
    /// - [`SearchError::Geocoding`] when the postal code cannot be resolved.
    /// - [`SearchError::Upstream`] when the search call fails.
    pub async fn search(&self, request: SearchRequest) -> Result<SearchResponse, SearchError> {
        let mut session = SearchSession::from_request(request, self.config.base_radius_m)?;

        let category = self.resolve_category(&session).await;
        let center = self.resolve_center(&session).await?;

        let annulus = Annulus::new(session.distance_range, session.base_radius_m);
        let query = plan_query(&QueryContext {
            strategy: session.strategy,
            page: session.page,
            annulus,
            center,
            product: session.product.as_deref(),
            retail_store: session.retail_store.as_deref(),
            category: &category,
        });
        let search_query = search_query(session.retail_store.as_deref(), &category);

        let fetched = fetch_page(
            &self.places,
            &query,
            session.continuation_token.as_deref(),
            self.config.token_retry_delay,
        )
        .await?;
        let next_page_token = fetched.next_page_token;
        let places_found = fetched.places.len();
        let fetched_ids: Vec<String> = fetched.places.iter().map(|p| p.place_id.clone()).collect();

        let mut fresh: Vec<(Place, f64)> = identity_pass(fetched.places, &session.seen_ids)
            .into_iter()
            .map(|p| {
                let d = distance_km(center, p.location());
                (p, d)
            })
            .filter(|(_, d)| !query.annulus_filter || annulus.contains(*d))
            .collect();
        fresh.sort_by(|a, b| a.1.total_cmp(&b.1));
        let after_distance_filter = fresh.len();
        let mut new_places: Vec<Place> = fresh.into_iter().map(|(p, _)| p).collect();

        let mut strategy = session.strategy;
        let mut pacing = Pacing::Concurrent;
        if new_places.is_empty()
            && session.strategy == Strategy::Type
            && session.distance_range > EXTENDED_MIN_RANGE
            && session.page > EXTENDED_MIN_PAGE
        {
            tracing::info!(page = session.page, "attempting extended search");
            let lookup_names = extended_lookup_names(
                session.retail_store.as_deref(),
                &category,
                session.product.as_deref(),
            );
            let extended = extended_search(
                &self.places,
                &ExtendedQuery {
                    search_query: &search_query,
                    center,
                    radius_m: annulus.outer_radius_m(),
                    lookup_names: &lookup_names,
                },
                &session.seen_ids,
            )
            .await;
            if let Some(places) = extended {
                new_places = places;
                strategy = Strategy::Extended;
                pacing = Pacing::Batched {
                    size: ENRICH_BATCH_SIZE,
                    pause: self.config.enrich_batch_pause,
                };
            }
        }

        let next = advance(&Observation {
            strategy,
            distance_range: session.distance_range,
            page: session.page,
            new_places: new_places.len(),
            inbound_token: session.continuation_token.is_some(),
            token_returned: next_page_token.is_some(),
        });

        for id in &fetched_ids {
            session.seen_ids.insert(id);
        }
        if strategy == Strategy::Extended {
            for place in &new_places {
                session.seen_ids.insert(&place.place_id);
            }
        }

        let stores = enrich_places(&self.places, &new_places, center, session.page, pacing).await;
        let results = contact_pass(stores);

        tracing::info!(
            page = session.page,
            strategy = %next.strategy,
            range = next.distance_range,
            results = results.len(),
            has_more = next.has_more,
            places_found,
            new_places = new_places.len(),
            after_distance_filter,
            has_next_page_token = next_page_token.is_some(),
            "search step complete"
        );

        let debug = SearchDebug {
            strategy: next.strategy,
            range: next.distance_range,
            places_found,
            new_places: new_places.len(),
            after_distance_filter,
            has_next_page_token: next_page_token.is_some(),
            unique_stores_count: results.len(),
        };

        Ok(SearchResponse {
            results,
            next_page_token,
            seen_ids: session.seen_ids.into_vec(),
            page: session.page,
            search_query,
            location: center,
            search_strategy: next.strategy,
            current_distance_range: next.distance_range,
            has_more: next.has_more,
            category,
            source: SOURCE.to_owned(),
            debug,
        })
    }
}

#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod tests;
