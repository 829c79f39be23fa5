//! Provider calls for one search step.

use std::time::Duration;

use storefind_core::LatLng;
use storefind_places::{
    ApiStatus, NearbySearchRequest, Place, PlacesError, SearchPage, TextSearchRequest,
};

use crate::capabilities::PlacesProvider;
use crate::config::FIND_PLACE_ATTEMPTS;
use crate::dedup::identity_pass;
use crate::error::SearchError;
use crate::query::PlannedQuery;
use crate::session::SeenIds;

const NEARBY_ENDPOINT: &str = "place/nearbysearch";

fn ensure_success(page: SearchPage, endpoint: &str) -> Result<SearchPage, SearchError> {
    if page.status.is_success() {
        Ok(page)
    } else {
        tracing::error!(endpoint, status = %page.status, "places search failed");
        Err(SearchError::Upstream(PlacesError::Api {
            endpoint: endpoint.to_owned(),
            status: page.status,
            message: page.error_message,
        }))
    }
}

/// Runs the continuation query when `token` is present, otherwise the
/// planned nearby search.
///
/// A token the provider has not activated yet answers `INVALID_REQUEST`;
/// that is retried exactly once after `token_retry_delay` and the retried
/// answer is taken as final.
///
/// # Errors
///
/// [`SearchError::Upstream`] on transport failure or a status other than
/// `OK`/`ZERO_RESULTS`.
pub async fn fetch_page<P: PlacesProvider>(
    provider: &P,
    query: &PlannedQuery,
    token: Option<&str>,
    token_retry_delay: Duration,
) -> Result<SearchPage, SearchError> {
    let page = if let Some(token) = token {
        let first = provider
            .next_page(token)
            .await
            .map_err(SearchError::Upstream)?;
        if first.status == ApiStatus::InvalidRequest {
            tracing::debug!(
                delay_ms = token_retry_delay.as_millis(),
                "continuation token not ready, retrying once"
            );
            tokio::time::sleep(token_retry_delay).await;
            provider
                .next_page(token)
                .await
                .map_err(SearchError::Upstream)?
        } else {
            first
        }
    } else {
        tracing::debug!(
            keyword = %query.keyword,
            center = %query.center,
            radius_m = query.radius_m,
            place_type = query.place_type.unwrap_or("-"),
            "nearby search"
        );
        provider
            .nearby_search(&NearbySearchRequest {
                location: query.center,
                radius_m: query.radius_m,
                keyword: query.keyword.clone(),
                place_type: query.place_type.map(str::to_owned),
            })
            .await
            .map_err(SearchError::Upstream)?
    };

    ensure_success(page, NEARBY_ENDPOINT)
}

/// Inputs for the last-resort search once the ordinary strategies run dry.
#[derive(Debug, Clone)]
pub struct ExtendedQuery<'a> {
    pub search_query: &'a str,
    pub center: LatLng,
    pub radius_m: u32,
    pub lookup_names: &'a [String],
}

/// Text search first, then single-name lookups. Returns the unseen places of
/// the first attempt that found any. Failed attempts are logged and skipped.
pub async fn extended_search<P: PlacesProvider>(
    provider: &P,
    query: &ExtendedQuery<'_>,
    seen: &SeenIds,
) -> Option<Vec<Place>> {
    let text = provider
        .text_search(&TextSearchRequest {
            query: query.search_query.to_owned(),
            location: query.center,
            radius_m: query.radius_m,
            place_type: Some("store".to_owned()),
        })
        .await;

    match text {
        Ok(page) if page.status == ApiStatus::Ok => {
            let unseen = identity_pass(page.places, seen);
            tracing::debug!(unseen = unseen.len(), "extended text search");
            if !unseen.is_empty() {
                return Some(unseen);
            }
        }
        Ok(page) => {
            tracing::debug!(status = %page.status, "extended text search found nothing");
        }
        Err(e) => {
            tracing::warn!(error = %e, "extended text search failed");
        }
    }

    for name in query.lookup_names.iter().take(FIND_PLACE_ATTEMPTS) {
        match provider
            .find_place(name, query.center, query.radius_m)
            .await
        {
            Ok(page) if page.status == ApiStatus::Ok => {
                let unseen = identity_pass(page.places, seen);
                if !unseen.is_empty() {
                    tracing::debug!(name = %name, unseen = unseen.len(), "extended lookup hit");
                    return Some(unseen);
                }
            }
            Ok(page) => {
                tracing::debug!(name = %name, status = %page.status, "extended lookup miss");
            }
            Err(e) => {
                tracing::warn!(name = %name, error = %e, "extended lookup failed");
            }
        }
    }

    None
}
