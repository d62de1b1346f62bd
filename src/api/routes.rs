use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, Uri},
    response::IntoResponse,
};

use crate::api::handler::{self, HandlerOptions, OrderRequest};
use crate::store::SharedOrderStore;

// Shared state handed to every request
#[derive(Clone)]
pub struct AppState {
    pub store: SharedOrderStore,
    pub options: HandlerOptions,
}

impl AppState {
    pub fn new(store: SharedOrderStore, options: HandlerOptions) -> Self {
        Self { store, options }
    }
}

/// Every method and path goes through `handler::handle`, which owns routing,
/// so `/orders/` is matched by containment rather than a route template.
pub fn app_router(state: AppState) -> Router {
    Router::new().fallback(orders_endpoint).with_state(state)
}

async fn orders_endpoint(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let body = (!body.is_empty()).then_some(body);
    let req = OrderRequest {
        method,
        path: uri.path().to_string(),
        headers,
        body,
    };
    handler::handle(&state.store, req, &state.options).await
}
