//! HTTP client for the Google Places and Geocoding JSON APIs.
//!
//! Every endpoint answers HTTP 200 with a `"status"` field in the body. Search
//! endpoints hand that status back inside [`SearchPage`] so the caller can
//! decide what is fatal; geocoding and details turn anything other than `OK`
//! into [`PlacesError::Api`]. `OVER_QUERY_LIMIT` is mapped to
//! [`PlacesError::RateLimited`] so it goes through the back-off policy.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use storefind_core::LatLng;

use crate::error::PlacesError;
use crate::retry::{retry_with_backoff, RetryPolicy};
use crate::types::{
    ApiStatus, DetailsEnvelope, FindPlaceEnvelope, GeocodeEnvelope, NearbySearchRequest,
    PlaceDetails, SearchEnvelope, SearchPage, TextSearchRequest,
};

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/";

const DETAILS_FIELDS: &str = "name,formatted_address,formatted_phone_number,website,url,geometry,international_phone_number,opening_hours,photos,rating";
const FIND_PLACE_FIELDS: &str = "place_id,name,geometry,formatted_address,types";
const PHOTO_MAX_WIDTH: &str = "400";

/// Client for the Places and Geocoding web services.
///
/// Use [`PlacesClient::new`] for production or [`PlacesClient::with_base_url`]
/// to point at a mock server in tests.
#[derive(Clone)]
pub struct PlacesClient {
    client: Client,
    api_key: String,
    base_url: Url,
    retry: RetryPolicy,
}

impl std::fmt::Debug for PlacesClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlacesClient")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"[redacted]")
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl PlacesClient {
    /// Creates a client pointed at the production Google Maps API.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
        retry: RetryPolicy,
    ) -> Result<Self, PlacesError> {
        Self::with_base_url(api_key, timeout_secs, user_agent, retry, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`PlacesError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
        retry: RetryPolicy,
        base_url: &str,
    ) -> Result<Self, PlacesError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash so `Url::join` appends instead of
        // replacing the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| PlacesError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
            retry,
        })
    }

    /// Resolves a free-form address (here: a postal code) to a coordinate.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::Api`] when the status is not `OK` or no result came back.
    /// - Transport errors after retries are exhausted.
    pub async fn geocode(&self, address: &str) -> Result<LatLng, PlacesError> {
        let url = self.build_url("geocode/json", &[("address", address)])?;
        let envelope: GeocodeEnvelope = self.get_json(&url, "geocode").await?;

        if envelope.status != ApiStatus::Ok {
            return Err(PlacesError::Api {
                endpoint: "geocode".to_owned(),
                status: envelope.status,
                message: envelope.error_message,
            });
        }

        envelope
            .results
            .first()
            .map(|r| r.geometry.location)
            .ok_or_else(|| PlacesError::Api {
                endpoint: "geocode".to_owned(),
                status: ApiStatus::ZeroResults,
                message: envelope.error_message,
            })
    }

    /// Nearby search: everything within `radius_m` of `location` matching
    /// the keyword and optional place type.
    ///
    /// # Errors
    ///
    /// Transport or decode errors. Non-`OK` statuses are returned in the page.
    pub async fn nearby_search(
        &self,
        request: &NearbySearchRequest,
    ) -> Result<SearchPage, PlacesError> {
        let location = request.location.to_string();
        let radius = request.radius_m.to_string();
        let mut params = vec![
            ("location", location.as_str()),
            ("radius", radius.as_str()),
            ("keyword", request.keyword.as_str()),
        ];
        if let Some(place_type) = request.place_type.as_deref() {
            params.push(("type", place_type));
        }

        let url = self.build_url("place/nearbysearch/json", &params)?;
        let envelope: SearchEnvelope = self.get_json(&url, "place/nearbysearch").await?;
        Ok(envelope.into())
    }

    /// Fetches the next page of a previous nearby search.
    ///
    /// A freshly issued token answers `INVALID_REQUEST` for a short while;
    /// that status is returned as-is for the caller to retry.
    ///
    /// # Errors
    ///
    /// Transport or decode errors.
    pub async fn next_page(&self, page_token: &str) -> Result<SearchPage, PlacesError> {
        let url = self.build_url("place/nearbysearch/json", &[("pagetoken", page_token)])?;
        let envelope: SearchEnvelope = self.get_json(&url, "place/nearbysearch").await?;
        Ok(envelope.into())
    }

    /// Free-text search biased to a circle.
    ///
    /// # Errors
    ///
    /// Transport or decode errors. Non-`OK` statuses are returned in the page.
    pub async fn text_search(&self, request: &TextSearchRequest) -> Result<SearchPage, PlacesError> {
        let location = request.location.to_string();
        let radius = request.radius_m.to_string();
        let mut params = vec![
            ("query", request.query.as_str()),
            ("location", location.as_str()),
            ("radius", radius.as_str()),
        ];
        if let Some(place_type) = request.place_type.as_deref() {
            params.push(("type", place_type));
        }

        let url = self.build_url("place/textsearch/json", &params)?;
        let envelope: SearchEnvelope = self.get_json(&url, "place/textsearch").await?;
        Ok(envelope.into())
    }

    /// Single-candidate lookup of a literal name, biased to a circle.
    ///
    /// # Errors
    ///
    /// Transport or decode errors. Non-`OK` statuses are returned in the page.
    pub async fn find_place_from_text(
        &self,
        input: &str,
        bias_center: LatLng,
        bias_radius_m: u32,
    ) -> Result<SearchPage, PlacesError> {
        let bias = format!("circle:{bias_radius_m}@{bias_center}");
        let url = self.build_url(
            "place/findplacefromtext/json",
            &[
                ("input", input),
                ("inputtype", "textquery"),
                ("locationbias", bias.as_str()),
                ("fields", FIND_PLACE_FIELDS),
            ],
        )?;
        let envelope: FindPlaceEnvelope = self.get_json(&url, "place/findplacefromtext").await?;
        Ok(envelope.into())
    }

    /// Contact and presentation details for one place.
    ///
    /// # Errors
    ///
    /// [`PlacesError::Api`] for any status other than `OK`, plus transport
    /// and decode errors.
    pub async fn place_details(&self, place_id: &str) -> Result<PlaceDetails, PlacesError> {
        let url = self.build_url(
            "place/details/json",
            &[("place_id", place_id), ("fields", DETAILS_FIELDS)],
        )?;
        let envelope: DetailsEnvelope = self.get_json(&url, "place/details").await?;

        match (envelope.status, envelope.result) {
            (ApiStatus::Ok, Some(details)) => Ok(details),
            (status, _) => Err(PlacesError::Api {
                endpoint: "place/details".to_owned(),
                status,
                message: envelope.error_message,
            }),
        }
    }

    /// URL of the photo endpoint for a photo reference. The API key is part
    /// of the URL because the browser fetches it directly.
    #[must_use]
    pub fn photo_url(&self, photo_reference: &str) -> Option<String> {
        self.build_url(
            "place/photo",
            &[
                ("maxwidth", PHOTO_MAX_WIDTH),
                ("photoreference", photo_reference),
            ],
        )
        .ok()
        .map(String::from)
    }

    /// Joins `path` onto the base URL and appends `key` plus `extra` as
    /// percent-encoded query parameters.
    fn build_url(&self, path: &str, extra: &[(&str, &str)]) -> Result<Url, PlacesError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| PlacesError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: format!("cannot join \"{path}\": {e}"),
            })?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("key", &self.api_key);
            for (k, v) in extra {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    /// GET `url` under the retry policy and decode the body as `T`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &Url,
        endpoint: &str,
    ) -> Result<T, PlacesError> {
        let body = retry_with_backoff(self.retry, || async move {
            let response = self.client.get(url.clone()).send().await?;
            let status = response.status();

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                let retry_after_secs = response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(1);
                return Err(PlacesError::RateLimited {
                    endpoint: endpoint.to_owned(),
                    retry_after_secs,
                });
            }

            if !status.is_success() {
                return Err(PlacesError::UnexpectedStatus {
                    status: status.as_u16(),
                    endpoint: endpoint.to_owned(),
                });
            }

            let text = response.text().await?;
            let body: serde_json::Value =
                serde_json::from_str(&text).map_err(|e| PlacesError::Deserialize {
                    context: endpoint.to_owned(),
                    source: e,
                })?;

            if body.get("status").and_then(serde_json::Value::as_str) == Some("OVER_QUERY_LIMIT")
            {
                return Err(PlacesError::RateLimited {
                    endpoint: endpoint.to_owned(),
                    retry_after_secs: 1,
                });
            }

            Ok(body)
        })
        .await?;

        tracing::debug!(endpoint, "places response received");

        serde_json::from_value(body).map_err(|e| PlacesError::Deserialize {
            context: endpoint.to_owned(),
            source: e,
        })
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
