//! Wire types for the Places and Geocoding JSON responses.

use serde::{Deserialize, Serialize};
use storefind_core::LatLng;

/// The `status` field every Places/Geocoding response carries.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum ApiStatus {
    Ok,
    ZeroResults,
    /// Also what a continuation token returns before it becomes valid.
    InvalidRequest,
    OverQueryLimit,
    RequestDenied,
    NotFound,
    UnknownError,
    Other(String),
}

impl ApiStatus {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            ApiStatus::Ok => "OK",
            ApiStatus::ZeroResults => "ZERO_RESULTS",
            ApiStatus::InvalidRequest => "INVALID_REQUEST",
            ApiStatus::OverQueryLimit => "OVER_QUERY_LIMIT",
            ApiStatus::RequestDenied => "REQUEST_DENIED",
            ApiStatus::NotFound => "NOT_FOUND",
            ApiStatus::UnknownError => "UNKNOWN_ERROR",
            ApiStatus::Other(raw) => raw,
        }
    }

    /// `OK` and `ZERO_RESULTS` are the only non-fatal search outcomes.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, ApiStatus::Ok | ApiStatus::ZeroResults)
    }
}

impl From<String> for ApiStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "OK" => ApiStatus::Ok,
            "ZERO_RESULTS" => ApiStatus::ZeroResults,
            "INVALID_REQUEST" => ApiStatus::InvalidRequest,
            "OVER_QUERY_LIMIT" => ApiStatus::OverQueryLimit,
            "REQUEST_DENIED" => ApiStatus::RequestDenied,
            "NOT_FOUND" => ApiStatus::NotFound,
            "UNKNOWN_ERROR" => ApiStatus::UnknownError,
            _ => ApiStatus::Other(raw),
        }
    }
}

impl std::fmt::Display for ApiStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OpeningHours {
    #[serde(default)]
    pub open_now: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    pub photo_reference: String,
}

/// One result from nearby search, text search, or find-place-from-text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub place_id: String,
    #[serde(default)]
    pub name: String,
    pub geometry: Geometry,
    #[serde(default)]
    pub vicinity: Option<String>,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub opening_hours: Option<OpeningHours>,
    #[serde(default)]
    pub photos: Vec<Photo>,
    #[serde(default)]
    pub types: Vec<String>,
}

impl Place {
    #[must_use]
    pub fn location(&self) -> LatLng {
        self.geometry.location
    }

    /// Nearby search fills `vicinity`; find-place and text search fill
    /// `formatted_address`.
    #[must_use]
    pub fn address(&self) -> Option<&str> {
        self.vicinity
            .as_deref()
            .or(self.formatted_address.as_deref())
    }
}

/// Result of the place details endpoint, restricted to the requested fields.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlaceDetails {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub formatted_phone_number: Option<String>,
    #[serde(default)]
    pub international_phone_number: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub opening_hours: Option<OpeningHours>,
    #[serde(default)]
    pub photos: Vec<Photo>,
    #[serde(default)]
    pub rating: Option<f64>,
}

/// A page of search results, with the status left for the caller to judge.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPage {
    pub status: ApiStatus,
    pub places: Vec<Place>,
    pub next_page_token: Option<String>,
    pub error_message: Option<String>,
}

impl SearchPage {
    #[must_use]
    pub fn empty(status: ApiStatus) -> Self {
        Self {
            status,
            places: Vec::new(),
            next_page_token: None,
            error_message: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NearbySearchRequest {
    pub location: LatLng,
    pub radius_m: u32,
    pub keyword: String,
    pub place_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextSearchRequest {
    pub query: String,
    pub location: LatLng,
    pub radius_m: u32,
    pub place_type: Option<String>,
}

// ---------------------------------------------------------------------------
// Response envelopes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct SearchEnvelope {
    pub status: ApiStatus,
    #[serde(default)]
    pub results: Vec<Place>,
    #[serde(default)]
    pub next_page_token: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl From<SearchEnvelope> for SearchPage {
    fn from(envelope: SearchEnvelope) -> Self {
        Self {
            status: envelope.status,
            places: envelope.results,
            next_page_token: envelope.next_page_token.filter(|t| !t.is_empty()),
            error_message: envelope.error_message,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct FindPlaceEnvelope {
    pub status: ApiStatus,
    #[serde(default)]
    pub candidates: Vec<Place>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl From<FindPlaceEnvelope> for SearchPage {
    fn from(envelope: FindPlaceEnvelope) -> Self {
        Self {
            status: envelope.status,
            places: envelope.candidates,
            next_page_token: None,
            error_message: envelope.error_message,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct DetailsEnvelope {
    pub status: ApiStatus,
    #[serde(default)]
    pub result: Option<PlaceDetails>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeocodeEnvelope {
    pub status: ApiStatus,
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeocodeResult {
    pub geometry: Geometry,
}
