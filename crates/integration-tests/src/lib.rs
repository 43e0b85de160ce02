//! Integration tests for Stockbook.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process tests against the memory store
//! cargo test -p stockbook-integration-tests
//!
//! # Include the PostgreSQL tests (needs STOCKBOOK_TEST_DATABASE_URL)
//! cargo test -p stockbook-integration-tests -- --include-ignored
//! ```
//!
//! `TestApp` drives the real router in process with `tower::ServiceExt::oneshot`
//! over the memory store. It carries the session cookie between requests the
//! way a browser would, so flash messages survive a redirect.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::missing_panics_doc, clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Request, StatusCode, header};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tower::ServiceExt;
use tower_sessions::MemoryStore;

use stockbook_core::{LocationId, NewLocation, NewProduct, ProductId};
use stockbook_web::app;
use stockbook_web::config::WebConfig;
use stockbook_web::db::{InventoryStore, MemoryInventoryStore};
use stockbook_web::middleware::create_session_layer;
use stockbook_web::seed::{SeedSummary, load_sample_data};
use stockbook_web::state::AppState;

/// A response with its body read to a string.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// The redirect target, if any.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Whether the body contains `needle`.
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.body.contains(needle)
    }
}

/// The application wired to a fresh memory store and memory sessions.
pub struct TestApp {
    router: Router,
    store: Arc<MemoryInventoryStore>,
    cookie: Option<String>,
}

impl TestApp {
    /// An application with empty tables.
    #[must_use]
    pub fn new() -> Self {
        let config = WebConfig::from_lookup(|key| match key {
            "STOCKBOOK_STORE" => Some("memory".to_owned()),
            _ => None,
        })
        .expect("memory configuration needs no environment");

        let store = Arc::new(MemoryInventoryStore::new());
        let shared: Arc<dyn InventoryStore> = store.clone();
        let state = AppState::new(shared);
        let router = app::router(state, create_session_layer(MemoryStore::default(), &config));

        Self {
            router,
            store,
            cookie: None,
        }
    }

    /// An application loaded with the sample data set.
    pub async fn seeded() -> (Self, SeedSummary) {
        let app = Self::new();
        let summary = load_sample_data(
            app.store.as_ref(),
            &mut StdRng::seed_from_u64(2024),
            chrono::Utc::now(),
        )
        .await
        .expect("sample data loads into an empty store");
        (app, summary)
    }

    /// An application with two products (`PROD001`, `PROD002`) and three
    /// locations (`WH001`, `WH002`, `STORE01`) but no movements.
    pub async fn with_catalog() -> Self {
        let app = Self::new();
        for (id, name) in [("PROD001", "Laptop"), ("PROD002", "Monitor")] {
            app.store
                .create_product(&NewProduct {
                    id: ProductId::new(id),
                    name: name.to_owned(),
                    description: None,
                })
                .await
                .expect("product is new");
        }
        for (id, name) in [
            ("WH001", "Main Warehouse"),
            ("WH002", "Secondary Warehouse"),
            ("STORE01", "Downtown Store"),
        ] {
            app.store
                .create_location(&NewLocation {
                    id: LocationId::new(id),
                    name: name.to_owned(),
                    address: None,
                })
                .await
                .expect("location is new");
        }
        app
    }

    /// Direct access to the backing store for arranging and asserting state.
    #[must_use]
    pub fn store(&self) -> &MemoryInventoryStore {
        &self.store
    }

    pub async fn get(&mut self, path: &str) -> TestResponse {
        let request = Request::get(path);
        self.send(request, Body::empty()).await
    }

    /// Submit an urlencoded form.
    pub async fn post_form(&mut self, path: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = fields
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        let request = Request::post(path).header(
            header::CONTENT_TYPE,
            "application/x-www-form-urlencoded",
        );
        self.send(request, Body::from(body)).await
    }

    /// Submit a form and follow the redirect it answers with.
    ///
    /// Panics if the response is not a 303.
    pub async fn post_form_and_follow(
        &mut self,
        path: &str,
        fields: &[(&str, &str)],
    ) -> TestResponse {
        let response = self.post_form(path, fields).await;
        assert_eq!(
            response.status,
            StatusCode::SEE_OTHER,
            "expected a redirect, got body: {}",
            response.body
        );
        let to = response.location().expect("redirect has a location").to_owned();
        self.get(&to).await
    }

    async fn send(&mut self, mut request: axum::http::request::Builder, body: Body) -> TestResponse {
        if let Some(cookie) = &self.cookie {
            request = request.header(header::COOKIE, cookie);
        }
        let request = request.body(body).expect("valid request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        self.remember_cookie(response.headers());

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body is readable");

        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    fn remember_cookie(&mut self, headers: &HeaderMap) {
        let Some(set_cookie) = headers
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
        else {
            return;
        };

        if set_cookie.contains("Max-Age=0") {
            self.cookie = None;
        } else if let Some(pair) = set_cookie.split(';').next() {
            self.cookie = Some(pair.trim().to_owned());
        }
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}
