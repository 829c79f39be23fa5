//! Client for the Google Places and Geocoding web services.
//!
//! Covers the endpoints the store search drives: nearby search and its
//! `pagetoken` continuation, text search, find-place-from-text, place
//! details, geocoding, and photo URL construction.

pub mod client;
pub mod error;
pub mod retry;
pub mod types;

pub use client::PlacesClient;
pub use error::PlacesError;
pub use retry::RetryPolicy;
pub use types::{
    ApiStatus, Geometry, NearbySearchRequest, OpeningHours, Photo, Place, PlaceDetails,
    SearchPage, TextSearchRequest,
};
