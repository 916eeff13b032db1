//! A minimal `GET /prices?pair=BASE/QUOTE` route over [`query`](crate::query).

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::routing::get;
use axum::Router;
use oracle_core::{Node, Pair};
use serde::Deserialize;

use crate::result::query;

/// Shared state handed to the route: the already-built, never-mutated root
/// table. Rebuilding the DAG (e.g. after a config reload) means swapping in
/// a new `AppState`, not mutating this one.
#[derive(Clone)]
pub struct AppState {
    roots: Arc<HashMap<Pair, Node>>,
}

impl AppState {
    /// Wrap a built root table for use by [`router`].
    #[must_use]
    pub fn new(roots: HashMap<Pair, Node>) -> Self {
        Self {
            roots: Arc::new(roots),
        }
    }
}

/// Build the `/prices` route over `state`. Callers merge this into their own
/// `axum::Router` alongside whatever other routes they serve.
#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new().route("/prices", get(prices)).with_state(state)
}

#[derive(Debug, Deserialize)]
struct PricesQuery {
    pair: String,
}

#[tracing::instrument(name = "oracle_query::http::prices", skip(state), fields(pair = %params.pair))]
async fn prices(State(state): State<AppState>, Query(params): Query<PricesQuery>) -> impl IntoResponse {
    let Some((base, quote)) = params.pair.split_once('/') else {
        return (StatusCode::BAD_REQUEST, Json(serde_json::json!({ "error": "pair must be BASE/QUOTE" }))).into_response();
    };
    let Some(pair) = Pair::new(base, quote) else {
        return (StatusCode::BAD_REQUEST, Json(serde_json::json!({ "error": "invalid pair symbols" }))).into_response();
    };

    let result = query(&state.roots, pair, chrono::Utc::now());
    let status = if result.error.is_some() { StatusCode::NOT_FOUND } else { StatusCode::OK };
    (status, Json(result)).into_response()
}
