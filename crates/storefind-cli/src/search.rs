//! The `search` command: drives one search session from the first page until
//! the search is exhausted or the page cap is reached.

use storefind_classifier::CategoryClassifier;
use storefind_core::AppConfig;
use storefind_places::{PlacesClient, RetryPolicy};
use storefind_search::{EnrichedStore, LiveSearch, SearchConfig, SearchRequest, SearchResponse};

#[derive(Debug)]
pub(crate) struct SearchOptions {
    pub product: Option<String>,
    pub retail_store: Option<String>,
    pub postal_code: String,
    pub max_pages: u32,
    pub base_radius: Option<u32>,
    pub json: bool,
}

fn build_search(config: &AppConfig) -> anyhow::Result<LiveSearch> {
    let places = PlacesClient::with_base_url(
        &config.google_api_key,
        config.http_timeout_secs,
        &config.user_agent,
        RetryPolicy::new(config.max_retries, config.retry_backoff_base_ms),
        &config.places_base_url,
    )?;
    let classifier = CategoryClassifier::from_config(config)?;
    Ok(LiveSearch::new(
        classifier,
        places.clone(),
        places,
        SearchConfig::from(config),
    ))
}

fn store_line(page: u32, store: &EnrichedStore) -> String {
    format!(
        "{page:>3}  {:<40}  {:>8}  {:<16}  {:<32}  {}",
        store.name,
        store.distance_text,
        store.phone,
        store.email,
        store.address.as_deref().unwrap_or("-"),
    )
}

fn print_page(response: &SearchResponse, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(response)?);
    } else {
        for store in &response.results {
            println!("{}", store_line(response.page, store));
        }
    }
    Ok(())
}

/// True when the session should request another page.
fn should_continue(response: &SearchResponse, max_pages: u32) -> bool {
    response.has_more && response.page < max_pages
}

/// Runs pages until `hasMore` turns false or `max_pages` pages have been
/// fetched.
///
/// # Errors
///
/// Returns an error if the clients cannot be built or any page fails.
pub(crate) async fn run_search(config: &AppConfig, options: SearchOptions) -> anyhow::Result<()> {
    let search = build_search(config)?;

    let mut request = SearchRequest::new(
        options.product,
        options.retail_store,
        &options.postal_code,
    );
    request.base_radius = options.base_radius;

    let mut total = 0usize;
    loop {
        let response = search.search(request.clone()).await?;
        total += response.results.len();
        tracing::info!(
            page = response.page,
            strategy = %response.search_strategy,
            range = response.current_distance_range,
            stores = response.results.len(),
            "page fetched"
        );
        print_page(&response, options.json)?;

        if !should_continue(&response, options.max_pages) {
            break;
        }
        request = request.follow_up(&response);
    }

    if !options.json {
        println!("{total} stores found");
    }
    Ok(())
}
