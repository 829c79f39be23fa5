//! The external services the search depends on, as traits.
//!
//! Production wires in [`PlacesClient`] and [`CategoryClassifier`]; tests use
//! in-process fakes.

use std::future::Future;

use storefind_classifier::{CategoryClassifier, ClassifierError};
use storefind_core::LatLng;
use storefind_places::{
    NearbySearchRequest, PlaceDetails, PlacesClient, PlacesError, SearchPage, TextSearchRequest,
};

pub trait ProductClassifier: Send + Sync {
    fn classify(&self, product: &str) -> impl Future<Output = Result<String, ClassifierError>> + Send;
}

pub trait Geocoder: Send + Sync {
    fn geocode(&self, postal_code: &str) -> impl Future<Output = Result<LatLng, PlacesError>> + Send;
}

/// Search and detail endpoints of a places provider.
pub trait PlacesProvider: Send + Sync {
    fn nearby_search(
        &self,
        request: &NearbySearchRequest,
    ) -> impl Future<Output = Result<SearchPage, PlacesError>> + Send;

    fn next_page(&self, token: &str) -> impl Future<Output = Result<SearchPage, PlacesError>> + Send;

    fn text_search(
        &self,
        request: &TextSearchRequest,
    ) -> impl Future<Output = Result<SearchPage, PlacesError>> + Send;

    fn find_place(
        &self,
        input: &str,
        bias_center: LatLng,
        bias_radius_m: u32,
    ) -> impl Future<Output = Result<SearchPage, PlacesError>> + Send;

    fn place_details(
        &self,
        place_id: &str,
    ) -> impl Future<Output = Result<PlaceDetails, PlacesError>> + Send;

    fn photo_url(&self, photo_reference: &str) -> Option<String>;
}

impl ProductClassifier for CategoryClassifier {
    async fn classify(&self, product: &str) -> Result<String, ClassifierError> {
        CategoryClassifier::classify(self, product).await
    }
}

impl Geocoder for PlacesClient {
    async fn geocode(&self, postal_code: &str) -> Result<LatLng, PlacesError> {
        PlacesClient::geocode(self, postal_code).await
    }
}

impl PlacesProvider for PlacesClient {
    async fn nearby_search(&self, request: &NearbySearchRequest) -> Result<SearchPage, PlacesError> {
        PlacesClient::nearby_search(self, request).await
    }

    async fn next_page(&self, token: &str) -> Result<SearchPage, PlacesError> {
        PlacesClient::next_page(self, token).await
    }

    async fn text_search(&self, request: &TextSearchRequest) -> Result<SearchPage, PlacesError> {
        PlacesClient::text_search(self, request).await
    }

    async fn find_place(
        &self,
        input: &str,
        bias_center: LatLng,
        bias_radius_m: u32,
    ) -> Result<SearchPage, PlacesError> {
        self.find_place_from_text(input, bias_center, bias_radius_m)
            .await
    }

    async fn place_details(&self, place_id: &str) -> Result<PlaceDetails, PlacesError> {
        PlacesClient::place_details(self, place_id).await
    }

    fn photo_url(&self, photo_reference: &str) -> Option<String> {
        PlacesClient::photo_url(self, photo_reference)
    }
}
