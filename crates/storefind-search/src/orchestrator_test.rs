use std::time::Duration;

use storefind_places::{ApiStatus, PlaceDetails, SearchPage};

use super::*;
use crate::test_support::{ok_page, place, FakeClassifier, FakeGeocoder, FakePlaces};

const BEVERLY_HILLS: LatLng = LatLng {
    lat: 34.09,
    lng: -118.4,
};

type FakeSearch = StoreSearch<FakeClassifier, FakeGeocoder, FakePlaces>;

fn test_config() -> SearchConfig {
    SearchConfig {
        base_radius_m: 5000,
        token_retry_delay: Duration::ZERO,
        enrich_batch_pause: Duration::from_millis(1000),
    }
}

fn search_with(classifier: FakeClassifier) -> FakeSearch {
    StoreSearch::new(
        classifier,
        FakeGeocoder::at(BEVERLY_HILLS),
        FakePlaces::default(),
        test_config(),
    )
}

fn vacuum_request() -> SearchRequest {
    SearchRequest::new(Some("vacuum cleaner".to_owned()), None, "90210")
}

fn details(phone: &str, website: Option<&str>) -> PlaceDetails {
    PlaceDetails {
        formatted_phone_number: Some(phone.to_owned()),
        website: website.map(str::to_owned),
        ..PlaceDetails::default()
    }
}

#[tokio::test]
async fn vacuum_cleaner_in_90210_first_page() {
    let search = search_with(FakeClassifier::answering("home_goods_store"));
    let places = search.places();
    places.push_nearby(ok_page(
        vec![
            place("far", 34.153, -118.4),
            place("dup", 34.12, -118.4),
            place("near", 34.10, -118.4),
        ],
        None,
    ));
    places.set_details("near", details("(310) 555-0100", Some("https://www.vacuumworld.com")));
    places.set_details("dup", details("(310) 555-0100", None));
    places.set_details("far", details("(310) 555-0199", None));

    let response = search.search(vacuum_request()).await.unwrap();

    let call = &places.nearby_calls()[0];
    assert_eq!(call.keyword, "home_goods_store");
    assert_eq!(call.radius_m, 5000);
    assert_eq!(call.place_type.as_deref(), Some("store"));
    assert_eq!(call.location, BEVERLY_HILLS);

    assert_eq!(response.category, "home_goods_store");
    assert_eq!(response.search_query, "home_goods_store");
    assert_eq!(response.location, BEVERLY_HILLS);
    assert_eq!(response.page, 1);
    assert_eq!(response.search_strategy, Strategy::Primary);
    assert_eq!(response.current_distance_range, 1);
    assert!(response.has_more);
    assert_eq!(response.seen_ids, vec!["far", "dup", "near"]);

    assert_eq!(response.results.len(), 1);
    let store = &response.results[0];
    assert_eq!(store.place_id, "near");
    assert_eq!(store.email, "contact@vacuumworld.com");
    assert_eq!(store.id, "place-1-0");

    assert_eq!(response.debug.places_found, 3);
    assert_eq!(response.debug.after_distance_filter, 2);
    assert_eq!(response.debug.new_places, 2);
    assert_eq!(response.debug.unique_stores_count, 1);
    assert!(!response.debug.has_next_page_token);
    assert_eq!(response.source, SOURCE);
}

#[tokio::test]
async fn in_range_stores_come_back_nearest_first() {
    let search = search_with(FakeClassifier::answering("vacuum store"));
    let places = search.places();
    places.push_nearby(ok_page(
        vec![
            place("mid", 34.12, -118.4),
            place("far", 34.16, -118.4),
            place("near", 34.10, -118.4),
        ],
        None,
    ));
    places.set_details("mid", details("(310) 555-0102", Some("https://mid.example")));
    places.set_details("far", details("(310) 555-0103", Some("https://far.example")));
    places.set_details("near", details("(310) 555-0101", Some("https://near.example")));

    let response = search.search(vacuum_request()).await.unwrap();

    let ids: Vec<&str> = response.results.iter().map(|s| s.place_id.as_str()).collect();
    assert_eq!(ids, vec!["near", "mid"]);
    assert!(response.results[0].distance_km < response.results[1].distance_km);
    assert_eq!(response.category, "vacuum store");
    assert!(response.has_more);
    assert_eq!(response.seen_ids, vec!["mid", "far", "near"]);
}

#[tokio::test]
async fn empty_first_page_widens_range() {
    let search = search_with(FakeClassifier::answering("vacuum store"));
    let response = search.search(vacuum_request()).await.unwrap();

    assert!(response.results.is_empty());
    assert_eq!(response.search_strategy, Strategy::Primary);
    assert_eq!(response.current_distance_range, 2);
    assert!(response.has_more);
    assert!(response.seen_ids.is_empty());
}

#[tokio::test]
async fn fifteen_dry_pages_reach_the_grid() {
    let search = search_with(FakeClassifier::answering("vacuum store"));
    let mut request = vacuum_request();
    let mut response = search.search(request.clone()).await.unwrap();
    for _ in 2..=14 {
        request = request.follow_up(&response);
        response = search.search(request.clone()).await.unwrap();
    }
    assert_eq!(response.page, 14);
    assert_eq!(response.search_strategy, Strategy::Primary);
    assert_eq!(response.current_distance_range, 15);

    request = request.follow_up(&response);
    response = search.search(request).await.unwrap();
    assert_eq!(response.page, 15);
    assert_eq!(response.search_strategy, Strategy::Grid);
    assert_eq!(response.current_distance_range, 1);
    assert!(response.has_more);

    // Category and center were resolved once and replayed.
    assert_eq!(search.classifier().calls(), 1);
    assert_eq!(search.geocoder().calls(), 1);
    let radii: Vec<u32> = search.places().nearby_calls().iter().map(|c| c.radius_m).collect();
    assert_eq!(radii[0], 5000);
    assert_eq!(radii[14], 75_000);
}

#[tokio::test]
async fn seen_ids_only_grow_across_calls() {
    let search = search_with(FakeClassifier::answering("vacuum store"));
    let places = search.places();
    places.push_nearby(ok_page(vec![place("a", 34.10, -118.4)], None));
    places.push_nearby(ok_page(
        vec![place("a", 34.10, -118.4), place("b", 34.11, -118.4)],
        None,
    ));
    places.push_nearby(ok_page(vec![place("c", 34.6, -118.4)], None));

    let mut request = vacuum_request();
    let mut previous: Vec<String> = Vec::new();
    for _ in 0..3 {
        let response = search.search(request.clone()).await.unwrap();
        assert!(response.seen_ids.starts_with(&previous));
        let mut unique = response.seen_ids.clone();
        unique.dedup();
        assert_eq!(unique.len(), response.seen_ids.len());
        previous.clone_from(&response.seen_ids);
        request = request.follow_up(&response);
    }
    assert_eq!(previous, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn replaying_a_request_is_idempotent() {
    let run = || async {
        let search = search_with(FakeClassifier::answering("vacuum store"));
        search
            .places()
            .push_nearby(ok_page(vec![place("a", 34.10, -118.4)], Some("T")));
        search
            .places()
            .set_details("a", details("(310) 555-0100", Some("https://a.example")));
        let mut request = vacuum_request();
        request.page = 4;
        request.category = Some("vacuum store".to_owned());
        request.location = Some(BEVERLY_HILLS);
        request.seen_ids = vec!["z".to_owned()];
        search.search(request).await.unwrap()
    };

    let first = run().await;
    let second = run().await;
    assert_eq!(first, second);
    assert_eq!(first.next_page_token.as_deref(), Some("T"));
    assert_eq!(first.seen_ids, vec!["z", "a"]);
}

#[tokio::test]
async fn continuation_token_replaces_the_planned_query() {
    let search = search_with(FakeClassifier::answering("unused"));
    let places = search.places();
    places.push_next_page(ok_page(vec![place("p", 34.10, -118.4)], None));

    let mut request = vacuum_request();
    request.page = 2;
    request.category = Some("vacuum store".to_owned());
    request.location = Some(BEVERLY_HILLS);
    request.next_page_token = Some("T1".to_owned());

    let response = search.search(request).await.unwrap();
    assert!(places.nearby_calls().is_empty());
    assert_eq!(places.next_page_calls(), 1);
    assert_eq!(search.classifier().calls(), 0);
    assert_eq!(search.geocoder().calls(), 0);

    // The chain ended before page 3: escalate even though places came back.
    assert_eq!(response.results.len(), 1);
    assert_eq!(response.current_distance_range, 2);
    assert!(response.has_more);
    assert!(response.next_page_token.is_none());
}

#[tokio::test]
async fn missing_postal_code_makes_no_provider_calls() {
    let search = search_with(FakeClassifier::answering("x"));
    let mut request = vacuum_request();
    request.postal_code = "  ".to_owned();

    let err = search.search(request).await.unwrap_err();
    assert!(matches!(err, SearchError::Input(_)));
    assert_eq!(search.classifier().calls(), 0);
    assert_eq!(search.geocoder().calls(), 0);
    assert!(search.places().nearby_calls().is_empty());
}

#[tokio::test]
async fn geocoding_failure_is_fatal() {
    let search = StoreSearch::new(
        FakeClassifier::answering("x"),
        FakeGeocoder::failing(),
        FakePlaces::default(),
        test_config(),
    );
    let err = search.search(vacuum_request()).await.unwrap_err();
    assert!(matches!(err, SearchError::Geocoding { .. }));
    assert!(search.places().nearby_calls().is_empty());
}

#[tokio::test]
async fn search_status_failure_is_fatal() {
    let search = search_with(FakeClassifier::answering("x"));
    search
        .places()
        .push_nearby(SearchPage::empty(ApiStatus::RequestDenied));
    let err = search.search(vacuum_request()).await.unwrap_err();
    assert!(matches!(err, SearchError::Upstream(_)));
}

#[tokio::test]
async fn classifier_failure_falls_back_to_product() {
    let search = search_with(FakeClassifier::failing());
    let response = search.search(vacuum_request()).await.unwrap();
    assert_eq!(response.category, "vacuum cleaner");
    assert_eq!(search.places().nearby_calls()[0].keyword, "vacuum cleaner");
}

#[tokio::test]
async fn later_pages_without_category_use_product_unclassified() {
    let search = search_with(FakeClassifier::answering("x"));
    let mut request = vacuum_request();
    request.page = 3;
    let response = search.search(request).await.unwrap();
    assert_eq!(response.category, "vacuum cleaner");
    assert_eq!(search.classifier().calls(), 0);
}

#[tokio::test]
async fn retailer_only_search_skips_classification() {
    let search = search_with(FakeClassifier::answering("x"));
    let request = SearchRequest::new(None, Some("Target".to_owned()), "90210");
    let response = search.search(request).await.unwrap();
    assert_eq!(search.classifier().calls(), 0);
    assert_eq!(response.category, "");
    assert_eq!(response.search_query, "Target");
    assert_eq!(search.places().nearby_calls()[0].keyword, "Target");
}

fn late_type_request(page: u32, range: u32) -> SearchRequest {
    let mut request = vacuum_request();
    request.page = page;
    request.current_distance_range = range;
    request.search_strategy = Strategy::Type;
    request.category = Some("vacuum store".to_owned());
    request.location = Some(BEVERLY_HILLS);
    request
}

#[tokio::test(start_paused = true)]
async fn dry_late_type_search_escalates_to_extended() {
    let search = search_with(FakeClassifier::answering("x"));
    let places = search.places();
    let found: Vec<_> = (0..6)
        .map(|i| place(&format!("x{i}"), 34.2, -118.4))
        .collect();
    places.push_text(ok_page(found, None));

    let response = search.search(late_type_request(41, 9)).await.unwrap();

    assert_eq!(response.search_strategy, Strategy::Extended);
    assert_eq!(response.current_distance_range, 9);
    assert!(response.has_more);
    assert_eq!(response.results.len(), 6);
    assert_eq!(places.details_calls(), 6);
    assert_eq!(response.seen_ids.len(), 6);
    assert!(response.results.iter().all(|s| !s.verified));
    assert!(response.results.iter().any(|s| s.id == "place-41-5"));
}

#[tokio::test]
async fn exhausted_search_stops_after_page_fifty() {
    let search = search_with(FakeClassifier::answering("x"));
    let response = search.search(late_type_request(51, 12)).await.unwrap();

    assert!(!response.has_more);
    assert_eq!(response.search_strategy, Strategy::Type);
    assert_eq!(search.places().find_place_calls().len(), 5);
}

#[tokio::test]
async fn wide_type_search_skips_the_annulus_filter() {
    let search = search_with(FakeClassifier::answering("x"));
    // ~1 km away: outside range 4's ring, kept because the filter is off.
    search
        .places()
        .push_nearby(ok_page(vec![place("close", 34.10, -118.4)], None));
    let response = search.search(late_type_request(10, 4)).await.unwrap();
    assert_eq!(response.debug.after_distance_filter, 1);
    assert_eq!(response.results.len(), 1);
}
