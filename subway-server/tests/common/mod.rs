//! Shared harness for HTTP acceptance tests.

#![allow(dead_code)]

use std::net::SocketAddr;

use reqwest::{Response, StatusCode};
use serde_json::json;
use subway_server::registry::StationRegistry;
use subway_server::web::{AppState, StationResponse, create_router};
use tokio::net::TcpListener;

/// A server running on a random local port.
pub struct TestApp {
    pub base_url: String,
    registry: StationRegistry,
}

impl TestApp {
    /// Spawn a server backed by a fresh in-memory registry.
    pub async fn spawn() -> Self {
        Self::spawn_with(StationRegistry::in_memory()).await
    }

    /// Spawn a server around an existing registry.
    pub async fn spawn_with(registry: StationRegistry) -> Self {
        let app = create_router(AppState::new(registry.clone()));
        let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0))
            .await
            .expect("bind test listener");
        let addr: SocketAddr = listener.local_addr().expect("local addr");

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("server error: {}", e);
            }
        });

        let app = Self {
            base_url: format!("http://{}", addr),
            registry,
        };
        app.reset().await;
        app
    }

    /// Empty the registry before a scenario.
    pub async fn reset(&self) {
        self.registry.reset().await.expect("reset registry");
    }

    pub fn client(&self) -> StationsClient {
        StationsClient::new(&self.base_url)
    }
}

/// HTTP client for the `/stations` endpoints.
pub struct StationsClient {
    http: reqwest::Client,
    base_url: String,
}

impl StationsClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    pub async fn create(&self, name: &str) -> Response {
        self.http
            .post(format!("{}/stations", self.base_url))
            .json(&json!({ "name": name }))
            .send()
            .await
            .expect("POST /stations")
    }

    pub async fn list(&self) -> Response {
        self.http
            .get(format!("{}/stations", self.base_url))
            .send()
            .await
            .expect("GET /stations")
    }

    pub async fn delete(&self, id: impl std::fmt::Display) -> Response {
        self.http
            .delete(format!("{}/stations/{}", self.base_url, id))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .expect("DELETE /stations/{id}")
    }

    /// List stations and return their names.
    pub async fn names(&self) -> Vec<String> {
        let response = self.list().await;
        assert_eq!(response.status(), StatusCode::OK);
        let stations: Vec<StationResponse> = response.json().await.expect("station list JSON");
        stations.into_iter().map(|s| s.name).collect()
    }
}
