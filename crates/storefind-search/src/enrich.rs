//! Turns raw places into output stores by looking up their details.

use std::time::Duration;

use futures::stream::{self, StreamExt};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use storefind_core::LatLng;
use storefind_places::{Place, PlaceDetails};

use crate::capabilities::PlacesProvider;
use crate::config::ENRICH_CONCURRENCY;
use crate::geo::distance_km;

/// Placeholder for a missing phone number or email.
pub const NOT_AVAILABLE: &str = "N/A";

/// One store in a search response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedStore {
    /// `place-<page>-<index>`; unique within one response only.
    pub id: String,
    pub place_id: String,
    pub name: String,
    pub address: Option<String>,
    pub phone: String,
    /// `contact@<website host>` or `"N/A"`.
    pub email: String,
    pub contact: String,
    pub website: Option<String>,
    pub location: LatLng,
    pub google_maps_url: String,
    #[serde(rename = "distance")]
    pub distance_km: f64,
    pub distance_text: String,
    pub open_now: Option<bool>,
    pub rating: Option<f64>,
    pub photo_url: Option<String>,
    /// False when the detail lookup failed and only search fields are shown.
    pub verified: bool,
}

/// How detail lookups are paced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    /// All lookups in flight together.
    Concurrent,
    /// `size` lookups at a time with `pause` between groups.
    Batched { size: usize, pause: Duration },
}

/// Placeholder contact address derived from a website's host.
#[must_use]
pub fn derive_email(website: Option<&str>) -> String {
    let Some(website) = website else {
        return NOT_AVAILABLE.to_owned();
    };
    match Url::parse(website) {
        Ok(url) => match url.host_str() {
            Some(host) => {
                let domain = host.strip_prefix("www.").unwrap_or(host);
                format!("contact@{domain}")
            }
            None => {
                tracing::warn!(website, "website has no host");
                NOT_AVAILABLE.to_owned()
            }
        },
        Err(e) => {
            tracing::warn!(website, error = %e, "failed to parse website");
            NOT_AVAILABLE.to_owned()
        }
    }
}

fn google_maps_fallback(place_id: &str) -> String {
    format!("https://www.google.com/maps/place/?q=place_id:{place_id}")
}

fn store_id(page: u32, index: usize) -> String {
    format!("place-{page}-{index}")
}

fn verified_store<P: PlacesProvider>(
    provider: &P,
    place: &Place,
    details: PlaceDetails,
    id: String,
    distance: f64,
) -> EnrichedStore {
    let email = derive_email(details.website.as_deref());
    let photo_url = details
        .photos
        .first()
        .or(place.photos.first())
        .and_then(|p| provider.photo_url(&p.photo_reference));

    EnrichedStore {
        id,
        place_id: place.place_id.clone(),
        name: details.name.unwrap_or_else(|| place.name.clone()),
        address: details
            .formatted_address
            .or_else(|| place.address().map(str::to_owned)),
        phone: details
            .formatted_phone_number
            .or(details.international_phone_number)
            .unwrap_or_else(|| NOT_AVAILABLE.to_owned()),
        contact: email.clone(),
        email,
        website: details.website,
        location: details
            .geometry
            .map_or_else(|| place.location(), |g| g.location),
        google_maps_url: details
            .url
            .unwrap_or_else(|| google_maps_fallback(&place.place_id)),
        distance_km: distance,
        distance_text: format!("{distance:.1} km"),
        open_now: details
            .opening_hours
            .and_then(|h| h.open_now)
            .or_else(|| place.opening_hours.as_ref().and_then(|h| h.open_now)),
        rating: details.rating.or(place.rating),
        photo_url,
        verified: true,
    }
}

fn unverified_store<P: PlacesProvider>(
    provider: &P,
    place: &Place,
    id: String,
    distance: f64,
) -> EnrichedStore {
    EnrichedStore {
        id,
        place_id: place.place_id.clone(),
        name: place.name.clone(),
        address: place.address().map(str::to_owned),
        phone: NOT_AVAILABLE.to_owned(),
        email: NOT_AVAILABLE.to_owned(),
        contact: NOT_AVAILABLE.to_owned(),
        website: None,
        location: place.location(),
        google_maps_url: google_maps_fallback(&place.place_id),
        distance_km: distance,
        distance_text: format!("{distance:.1} km"),
        open_now: place.opening_hours.as_ref().and_then(|h| h.open_now),
        rating: place.rating,
        photo_url: place
            .photos
            .first()
            .and_then(|p| provider.photo_url(&p.photo_reference)),
        verified: false,
    }
}

async fn enrich_one<P: PlacesProvider>(
    provider: &P,
    place: &Place,
    index: usize,
    center: LatLng,
    page: u32,
) -> EnrichedStore {
    let id = store_id(page, index);
    let distance = distance_km(center, place.location());
    match provider.place_details(&place.place_id).await {
        Ok(details) => verified_store(provider, place, details, id, distance),
        Err(e) => {
            tracing::warn!(
                place_id = %place.place_id,
                error = %e,
                "place details unavailable, returning search fields only"
            );
            unverified_store(provider, place, id, distance)
        }
    }
}

/// Looks up details for every place. Output order matches `places`; the
/// n-th store gets id `place-<page>-<n>`.
pub async fn enrich_places<P: PlacesProvider>(
    provider: &P,
    places: &[Place],
    center: LatLng,
    page: u32,
    pacing: Pacing,
) -> Vec<EnrichedStore> {
    match pacing {
        Pacing::Concurrent => {
            // Futures are built before streaming; a borrowing closure inside
            // the stream makes the caller's future fail the `Send` bound.
            let pending: Vec<_> = places
                .iter()
                .enumerate()
                .map(|(index, place)| enrich_one(provider, place, index, center, page))
                .collect();
            stream::iter(pending)
                .buffered(ENRICH_CONCURRENCY)
                .collect()
                .await
        }
        Pacing::Batched { size, pause } => {
            let size = size.max(1);
            let mut stores = Vec::with_capacity(places.len());
            for (batch, chunk) in places.chunks(size).enumerate() {
                if batch > 0 {
                    tokio::time::sleep(pause).await;
                }
                let offset = batch * size;
                let enriched = futures::future::join_all(
                    chunk
                        .iter()
                        .enumerate()
                        .map(|(i, place)| enrich_one(provider, place, offset + i, center, page)),
                )
                .await;
                stores.extend(enriched);
            }
            stores
        }
    }
}
