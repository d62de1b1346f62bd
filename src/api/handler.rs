//! Request dispatch for the order endpoint.
//!
//! `handle` takes a method, path, headers and optional body and always
//! produces a response: route misses and unknown ids become 404, every other
//! fault becomes a 500 carrying the fault's description.

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::error::OrderError;
use crate::store::SharedOrderStore;
use crate::types::order::{NewOrder, Order, OrderUpdate};

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_HEADERS: &str = "Content-Type";
pub const ALLOW_METHODS: &str = "GET,POST,PUT,DELETE,OPTIONS";

const COLLECTION_PATH: &str = "/orders";
const MEMBER_MARKER: &str = "/orders/";

/// Behaviour switches for the handler, normally taken from `Config`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HandlerOptions {
    /// Report missing create fields as 400 instead of 500.
    pub strict_validation: bool,
    /// Recompute `total_amount` when an update changes quantity or price.
    pub recompute_total_on_update: bool,
}

#[derive(Debug, Clone)]
pub struct OrderRequest {
    pub method: Method,
    pub path: String,
    /// Carried with the request but not consulted: routing is by method and
    /// path only, and bodies are parsed as JSON regardless of content type.
    pub headers: HeaderMap,
    /// Raw body bytes; UTF-8 is checked when the JSON is parsed.
    pub body: Option<Bytes>,
}

impl OrderRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct OrderResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl OrderResponse {
    fn empty(status: StatusCode) -> Self {
        Self {
            status,
            headers: cors_headers(),
            body: String::new(),
        }
    }

    fn json<T: Serialize>(status: StatusCode, payload: &T) -> Self {
        match serde_json::to_string(payload) {
            Ok(body) => {
                let mut headers = cors_headers();
                headers.insert(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                );
                Self {
                    status,
                    headers,
                    body,
                }
            }
            Err(e) => {
                error!(error = %e, "failed to serialize response body");
                Self::empty(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }

    fn from_error(err: &OrderError, opts: &HandlerOptions) -> Self {
        let status = err.status_code(opts.strict_validation);
        match err {
            OrderError::Validation(v) if status == StatusCode::BAD_REQUEST => Self::json(
                status,
                &FieldErrorBody {
                    error: err.to_string(),
                    field: &v.field,
                },
            ),
            _ => Self::json(
                status,
                &ErrorBody {
                    error: err.to_string(),
                },
            ),
        }
    }
}

impl IntoResponse for OrderResponse {
    fn into_response(self) -> Response {
        // `Body` rather than `String` so no implicit text/plain content type is added.
        (self.status, self.headers, Body::from(self.body)).into_response()
    }
}

#[derive(Serialize)]
struct MessageBody {
    message: &'static str,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Serialize)]
struct FieldErrorBody<'a> {
    error: String,
    field: &'a str,
}

/// The permissive CORS header set attached to every response.
pub fn cors_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static(ALLOW_ORIGIN),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers
}

enum Route<'a> {
    Preflight,
    List,
    Create,
    Update(&'a str),
    Cancel(&'a str),
    NotFound,
}

fn route<'a>(method: &Method, path: &'a str) -> Route<'a> {
    match *method {
        Method::OPTIONS => Route::Preflight,
        Method::GET if path == COLLECTION_PATH => Route::List,
        Method::POST if path == COLLECTION_PATH => Route::Create,
        Method::PUT if path.contains(MEMBER_MARKER) => Route::Update(trailing_segment(path)),
        Method::DELETE if path.contains(MEMBER_MARKER) => Route::Cancel(trailing_segment(path)),
        _ => Route::NotFound,
    }
}

/// Last `/`-separated segment; empty when the path ends with `/`.
fn trailing_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or_default()
}

fn parse_body(body: Option<&[u8]>) -> Result<serde_json::Value, OrderError> {
    let body = body.ok_or(OrderError::EmptyBody)?;
    Ok(serde_json::from_slice(body)?)
}

/// Route one request against the store.
pub async fn handle(
    store: &SharedOrderStore,
    req: OrderRequest,
    opts: &HandlerOptions,
) -> OrderResponse {
    let matched = route(&req.method, &req.path);
    match dispatch(store, matched, req.body.as_deref(), opts).await {
        Ok(resp) => resp,
        Err(err) => {
            match &err {
                OrderError::RouteNotFound => {
                    debug!(method = %req.method, path = %req.path, "no route")
                }
                OrderError::OrderNotFound(id) => warn!(order_id = %id, "order not found"),
                OrderError::Validation(v) => warn!(field = %v.field, "create rejected"),
                other => error!(method = %req.method, path = %req.path, error = %other, "request failed"),
            }
            OrderResponse::from_error(&err, opts)
        }
    }
}

async fn dispatch(
    store: &SharedOrderStore,
    route: Route<'_>,
    body: Option<&[u8]>,
    opts: &HandlerOptions,
) -> Result<OrderResponse, OrderError> {
    match route {
        Route::Preflight => Ok(OrderResponse::empty(StatusCode::OK)),
        Route::List => {
            let orders: Vec<Order> = store.read().await.list();
            debug!(count = orders.len(), "listing orders");
            Ok(OrderResponse::json(StatusCode::OK, &orders))
        }
        Route::Create => {
            let new_order = NewOrder::from_json(&parse_body(body)?)?;
            let order = Order::create(new_order)?;
            let mut guard = store.write().await;
            let created = guard.insert(order)?;
            info!(order_id = %created.order_id, total_amount = %created.total_amount, "order created");
            Ok(OrderResponse::json(StatusCode::CREATED, created))
        }
        Route::Update(order_id) => {
            let update = OrderUpdate::from_json(&parse_body(body)?)?;
            let mut guard = store.write().await;
            let updated = guard.update(order_id, update, opts.recompute_total_on_update)?;
            info!(order_id = %updated.order_id, status = %updated.status.as_str(), "order updated");
            Ok(OrderResponse::json(
                StatusCode::OK,
                &MessageBody {
                    message: "Order updated successfully",
                },
            ))
        }
        Route::Cancel(order_id) => {
            let mut guard = store.write().await;
            let cancelled = guard.cancel(order_id)?;
            info!(order_id = %cancelled.order_id, "order cancelled");
            Ok(OrderResponse::json(
                StatusCode::OK,
                &MessageBody {
                    message: "Order cancelled successfully",
                },
            ))
        }
        Route::NotFound => Err(OrderError::RouteNotFound),
    }
}
