use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use storefind_search::{SearchError, SearchRequest, SearchResponse};

use super::{ApiError, AppState};
use crate::middleware::RequestId;

fn map_search_error(request_id: String, error: &SearchError) -> ApiError {
    let code = match error {
        SearchError::Input(_) => "bad_request",
        e if e.is_rate_limited() => "rate_limited",
        SearchError::Geocoding { .. } | SearchError::Upstream(_) => "upstream_error",
    };
    if code == "bad_request" {
        tracing::debug!(error = %error, "rejected search request");
    } else {
        tracing::error!(error = %error, "store search failed");
    }
    ApiError::new(request_id, code, error.public_message())
}

/// One step of a store search. The body is the previous response's session
/// fields plus the next page number; the reply is the flat session body.
pub(super) async fn search_stores(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        ApiError::new(req_id.0.clone(), "bad_request", rejection.body_text())
    })?;

    tracing::info!(
        request_id = %req_id.0,
        page = request.page,
        strategy = %request.search_strategy,
        "search-stores request"
    );

    state
        .search
        .search(request)
        .await
        .map(Json)
        .map_err(|e| map_search_error(req_id.0, &e))
}
