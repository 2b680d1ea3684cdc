//! Integration tests for RocketShoes.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rocketshoes-integration-tests
//! ```
//!
//! The tests need no external services: [`FakeCatalogServer`] serves the
//! catalog endpoints from memory on an ephemeral local port.
//!
//! # Test Categories
//!
//! - `cart_http` - `CartStore` driven through `HttpCatalog` and `FileStorage`

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use url::Url;

/// How the fake catalog answers requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CatalogMode {
    #[default]
    Normal,
    /// Every request fails with 500.
    Failing,
    /// Every request fails with 429 and `Retry-After: 7`.
    RateLimited,
}

#[derive(Debug, Default)]
struct CatalogData {
    products: HashMap<u32, Value>,
    stock: HashMap<u32, i64>,
    mode: CatalogMode,
    product_requests: usize,
    stock_requests: usize,
    authorization: Option<String>,
}

#[derive(Clone, Default)]
struct CatalogState {
    data: Arc<Mutex<CatalogData>>,
}

impl CatalogState {
    fn lock(&self) -> MutexGuard<'_, CatalogData> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// In-memory catalog service listening on `127.0.0.1`.
///
/// The server task is aborted when the value is dropped.
pub struct FakeCatalogServer {
    addr: SocketAddr,
    state: CatalogState,
    task: JoinHandle<()>,
}

impl FakeCatalogServer {
    /// Bind an ephemeral port and start serving.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn start() -> std::io::Result<Self> {
        let state = CatalogState::default();

        let app = Router::new()
            .route("/products/{id}", get(product))
            .route("/stock/{id}", get(stock))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self { addr, state, task })
    }

    /// Base URL to configure `HttpCatalog` with.
    #[must_use]
    pub fn base_url(&self) -> Url {
        Url::parse(&format!("http://{}/", self.addr)).expect("socket address forms a valid URL")
    }

    /// Register a product with the standard shoe fixture fields.
    pub fn add_product(&self, id: u32, title: &str, price: f64, stock: i64) {
        self.add_product_record(
            id,
            json!({
                "id": id,
                "title": title,
                "price": price,
                "image": format!("https://cdn.example.com/shoes/{id}.jpg"),
            }),
        );
        self.set_stock(id, stock);
    }

    /// Register the raw JSON record served at `/products/{id}`.
    pub fn add_product_record(&self, id: u32, record: Value) {
        self.state.lock().products.insert(id, record);
    }

    pub fn set_stock(&self, id: u32, amount: i64) {
        self.state.lock().stock.insert(id, amount);
    }

    pub fn set_mode(&self, mode: CatalogMode) {
        self.state.lock().mode = mode;
    }

    /// Number of `/products/{id}` requests received.
    #[must_use]
    pub fn product_requests(&self) -> usize {
        self.state.lock().product_requests
    }

    /// Number of `/stock/{id}` requests received.
    #[must_use]
    pub fn stock_requests(&self) -> usize {
        self.state.lock().stock_requests
    }

    /// `Authorization` header of the most recent request.
    #[must_use]
    pub fn last_authorization(&self) -> Option<String> {
        self.state.lock().authorization.clone()
    }
}

impl Drop for FakeCatalogServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn failure(mode: CatalogMode) -> Option<Response> {
    match mode {
        CatalogMode::Normal => None,
        CatalogMode::Failing => {
            Some((StatusCode::INTERNAL_SERVER_ERROR, "catalog exploded").into_response())
        }
        CatalogMode::RateLimited => Some(
            (
                StatusCode::TOO_MANY_REQUESTS,
                [(header::RETRY_AFTER, "7")],
                "slow down",
            )
                .into_response(),
        ),
    }
}

fn record_authorization(data: &mut CatalogData, headers: &HeaderMap) {
    data.authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
}

async fn product(
    State(state): State<CatalogState>,
    Path(id): Path<u32>,
    headers: HeaderMap,
) -> Response {
    let mut data = state.lock();
    data.product_requests += 1;
    record_authorization(&mut data, &headers);

    if let Some(response) = failure(data.mode) {
        return response;
    }

    data.products.get(&id).map_or_else(
        || StatusCode::NOT_FOUND.into_response(),
        |record| Json(record.clone()).into_response(),
    )
}

async fn stock(
    State(state): State<CatalogState>,
    Path(id): Path<u32>,
    headers: HeaderMap,
) -> Response {
    let mut data = state.lock();
    data.stock_requests += 1;
    record_authorization(&mut data, &headers);

    if let Some(response) = failure(data.mode) {
        return response;
    }

    data.stock.get(&id).map_or_else(
        || StatusCode::NOT_FOUND.into_response(),
        |amount| Json(json!({ "id": id, "amount": amount })).into_response(),
    )
}
