//! In-process fakes of the capability traits.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use storefind_classifier::ClassifierError;
use storefind_core::LatLng;
use storefind_places::{
    ApiStatus, Geometry, NearbySearchRequest, Place, PlaceDetails, PlacesError, SearchPage,
    TextSearchRequest,
};

use crate::capabilities::{Geocoder, PlacesProvider, ProductClassifier};
use crate::enrich::EnrichedStore;

pub(crate) fn place(id: &str, lat: f64, lng: f64) -> Place {
    Place {
        place_id: id.to_owned(),
        name: format!("Store {id}"),
        geometry: Geometry {
            location: LatLng::new(lat, lng),
        },
        vicinity: Some("123 Main St".to_owned()),
        formatted_address: None,
        rating: None,
        opening_hours: None,
        photos: Vec::new(),
        types: vec!["store".to_owned()],
    }
}

pub(crate) fn ok_page(places: Vec<Place>, token: Option<&str>) -> SearchPage {
    SearchPage {
        status: ApiStatus::Ok,
        places,
        next_page_token: token.map(str::to_owned),
        error_message: None,
    }
}

pub(crate) fn store(place_id: &str, distance_km: f64, phone: &str, email: &str) -> EnrichedStore {
    EnrichedStore {
        id: format!("place-1-{place_id}"),
        place_id: place_id.to_owned(),
        name: format!("Store {place_id}"),
        address: None,
        phone: phone.to_owned(),
        email: email.to_owned(),
        contact: email.to_owned(),
        website: None,
        location: LatLng::new(0.0, 0.0),
        google_maps_url: String::new(),
        distance_km,
        distance_text: format!("{distance_km:.1} km"),
        open_now: None,
        rating: None,
        photo_url: None,
        verified: true,
    }
}

/// Scripted places provider. Empty queues answer `ZERO_RESULTS`; unknown
/// place ids answer `NOT_FOUND` from details.
#[derive(Default)]
pub(crate) struct FakePlaces {
    nearby: Mutex<VecDeque<SearchPage>>,
    next_pages: Mutex<VecDeque<SearchPage>>,
    text: Mutex<VecDeque<SearchPage>>,
    find_place: Mutex<VecDeque<Result<SearchPage, PlacesError>>>,
    details: Mutex<HashMap<String, PlaceDetails>>,
    nearby_log: Mutex<Vec<NearbySearchRequest>>,
    find_place_log: Mutex<Vec<String>>,
    next_page_count: AtomicUsize,
    details_count: AtomicUsize,
}

impl FakePlaces {
    pub(crate) fn push_nearby(&self, page: SearchPage) {
        self.nearby.lock().unwrap().push_back(page);
    }

    pub(crate) fn push_next_page(&self, page: SearchPage) {
        self.next_pages.lock().unwrap().push_back(page);
    }

    pub(crate) fn push_text(&self, page: SearchPage) {
        self.text.lock().unwrap().push_back(page);
    }

    pub(crate) fn push_find_place(&self, result: Result<SearchPage, PlacesError>) {
        self.find_place.lock().unwrap().push_back(result);
    }

    pub(crate) fn set_details(&self, place_id: &str, details: PlaceDetails) {
        self.details
            .lock()
            .unwrap()
            .insert(place_id.to_owned(), details);
    }

    pub(crate) fn nearby_calls(&self) -> Vec<NearbySearchRequest> {
        self.nearby_log.lock().unwrap().clone()
    }

    pub(crate) fn find_place_calls(&self) -> Vec<String> {
        self.find_place_log.lock().unwrap().clone()
    }

    pub(crate) fn next_page_calls(&self) -> usize {
        self.next_page_count.load(Ordering::SeqCst)
    }

    pub(crate) fn details_calls(&self) -> usize {
        self.details_count.load(Ordering::SeqCst)
    }

    fn pop(queue: &Mutex<VecDeque<SearchPage>>) -> SearchPage {
        queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| SearchPage::empty(ApiStatus::ZeroResults))
    }
}

impl PlacesProvider for FakePlaces {
    async fn nearby_search(&self, request: &NearbySearchRequest) -> Result<SearchPage, PlacesError> {
        self.nearby_log.lock().unwrap().push(request.clone());
        Ok(Self::pop(&self.nearby))
    }

    async fn next_page(&self, _token: &str) -> Result<SearchPage, PlacesError> {
        self.next_page_count.fetch_add(1, Ordering::SeqCst);
        Ok(Self::pop(&self.next_pages))
    }

    async fn text_search(&self, _request: &TextSearchRequest) -> Result<SearchPage, PlacesError> {
        Ok(Self::pop(&self.text))
    }

    async fn find_place(
        &self,
        input: &str,
        _bias_center: LatLng,
        _bias_radius_m: u32,
    ) -> Result<SearchPage, PlacesError> {
        self.find_place_log.lock().unwrap().push(input.to_owned());
        self.find_place
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(SearchPage::empty(ApiStatus::ZeroResults)))
    }

    async fn place_details(&self, place_id: &str) -> Result<PlaceDetails, PlacesError> {
        self.details_count.fetch_add(1, Ordering::SeqCst);
        self.details
            .lock()
            .unwrap()
            .get(place_id)
            .cloned()
            .ok_or_else(|| PlacesError::Api {
                endpoint: "place/details".to_owned(),
                status: ApiStatus::NotFound,
                message: None,
            })
    }

    fn photo_url(&self, photo_reference: &str) -> Option<String> {
        Some(format!("photo:{photo_reference}"))
    }
}

/// Geocoder answering one fixed coordinate, or failing when `center` is
/// `None`.
pub(crate) struct FakeGeocoder {
    pub center: Option<LatLng>,
    calls: AtomicUsize,
}

impl FakeGeocoder {
    pub(crate) fn at(center: LatLng) -> Self {
        Self {
            center: Some(center),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            center: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Geocoder for FakeGeocoder {
    async fn geocode(&self, _postal_code: &str) -> Result<LatLng, PlacesError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.center.ok_or_else(|| PlacesError::Api {
            endpoint: "geocode".to_owned(),
            status: ApiStatus::ZeroResults,
            message: None,
        })
    }
}

/// Classifier answering a fixed category, or failing when `answer` is `None`.
pub(crate) struct FakeClassifier {
    pub answer: Option<String>,
    calls: AtomicUsize,
}

impl FakeClassifier {
    pub(crate) fn answering(category: &str) -> Self {
        Self {
            answer: Some(category.to_owned()),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            answer: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ProductClassifier for FakeClassifier {
    async fn classify(&self, _product: &str) -> Result<String, ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer.clone().ok_or(ClassifierError::EmptyResponse)
    }
}
