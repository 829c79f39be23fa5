use storefind_places::PlacesError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    /// The request itself is unusable; no provider call was made.
    #[error("invalid search request: {0}")]
    Input(String),

    #[error("geocoding failed for postal code {postal_code}: {source}")]
    Geocoding {
        postal_code: String,
        #[source]
        source: PlacesError,
    },

    #[error("places search failed: {0}")]
    Upstream(#[source] PlacesError),
}

impl SearchError {
    /// True when the provider refused the call for quota reasons.
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        matches!(
            self,
            SearchError::Upstream(PlacesError::RateLimited { .. })
                | SearchError::Geocoding {
                    source: PlacesError::RateLimited { .. },
                    ..
                }
        )
    }

    /// Message suitable for an API error body. Upstream failures carry the
    /// provider's own message when it sent one.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            SearchError::Input(message) => message.clone(),
            SearchError::Geocoding { postal_code, source } => {
                format!(
                    "geocoding failed for postal code {postal_code}: {}",
                    source.upstream_message()
                )
            }
            SearchError::Upstream(source) => source.upstream_message(),
        }
    }
}

#[cfg(test)]
mod tests {
    use storefind_places::ApiStatus;

    use super::*;

    #[test]
    fn rate_limited_is_detected_through_both_variants() {
        let limited = || PlacesError::RateLimited {
            endpoint: "geocode".to_owned(),
            retry_after_secs: 1,
        };
        assert!(SearchError::Upstream(limited()).is_rate_limited());
        assert!(SearchError::Geocoding {
            postal_code: "90210".to_owned(),
            source: limited(),
        }
        .is_rate_limited());
        assert!(!SearchError::Input("x".to_owned()).is_rate_limited());
    }

    #[test]
    fn public_message_prefers_provider_text() {
        let err = SearchError::Upstream(PlacesError::Api {
            endpoint: "place/nearbysearch".to_owned(),
            status: ApiStatus::RequestDenied,
            message: Some("This API project is not authorized.".to_owned()),
        });
        assert_eq!(err.public_message(), "This API project is not authorized.");
    }
}
