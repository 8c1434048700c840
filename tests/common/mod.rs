//! Common test utilities: local stand-ins for the trigger endpoint and the
//! video search API.

#![allow(dead_code)]

use axum::extract::{RawQuery, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Json, Router, routing};
use reqwest::Url;
use serde_json::Value;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

pub type QueryPairs = Vec<(String, String)>;

fn parse_query(query: Option<String>) -> QueryPairs {
    let url = Url::parse(&format!("http://stub/?{}", query.unwrap_or_default())).unwrap();
    url.query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Trigger endpoint that records every query it receives.
pub struct TriggerStub {
    pub url: String,
    hits: Arc<Mutex<Vec<QueryPairs>>>,
}

struct TriggerStubState {
    hits: Arc<Mutex<Vec<QueryPairs>>>,
    status: StatusCode,
}

async fn record_trigger(
    State(state): State<Arc<TriggerStubState>>,
    RawQuery(query): RawQuery,
) -> StatusCode {
    state.hits.lock().unwrap().push(parse_query(query));
    state.status
}

impl TriggerStub {
    pub async fn start() -> Self {
        Self::with_status(StatusCode::OK).await
    }

    pub async fn with_status(status: StatusCode) -> Self {
        let hits = Arc::new(Mutex::new(Vec::new()));
        let state = Arc::new(TriggerStubState {
            hits: hits.clone(),
            status,
        });
        let app = Router::new()
            .route("/trigger", routing::get(record_trigger))
            .with_state(state);
        let addr = serve(app).await;

        Self {
            url: format!("http://{}/trigger", addr),
            hits,
        }
    }

    pub fn hits(&self) -> Vec<QueryPairs> {
        self.hits.lock().unwrap().clone()
    }

    /// Value of `name` in the only recorded hit.
    pub fn single_param(&self, name: &str) -> Option<String> {
        let hits = self.hits();
        assert_eq!(hits.len(), 1, "expected exactly one trigger call");
        hits[0]
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    }
}

/// Search API serving canned pages keyed by `pageToken` ("" for the first).
pub struct SearchStub {
    pub base_url: String,
    requests: Arc<Mutex<Vec<QueryPairs>>>,
}

struct SearchStubState {
    pages: HashMap<String, (StatusCode, Value)>,
    requests: Arc<Mutex<Vec<QueryPairs>>>,
}

async fn serve_search(
    State(state): State<Arc<SearchStubState>>,
    RawQuery(query): RawQuery,
) -> impl IntoResponse {
    let pairs = parse_query(query);
    let token = pairs
        .iter()
        .find(|(k, _)| k == "pageToken")
        .map(|(_, v)| v.clone())
        .unwrap_or_default();
    state.requests.lock().unwrap().push(pairs);

    match state.pages.get(&token) {
        Some((status, body)) => (*status, Json(body.clone())),
        None => (StatusCode::NOT_FOUND, Json(serde_json::json!({}))),
    }
}

impl SearchStub {
    pub async fn start(pages: Vec<(&str, StatusCode, Value)>) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = Arc::new(SearchStubState {
            pages: pages
                .into_iter()
                .map(|(token, status, body)| (token.to_string(), (status, body)))
                .collect(),
            requests: requests.clone(),
        });
        let app = Router::new()
            .route("/v3/search", routing::get(serve_search))
            .with_state(state);
        let addr = serve(app).await;

        Self {
            base_url: format!("http://{}/v3", addr),
            requests,
        }
    }

    pub fn requests(&self) -> Vec<QueryPairs> {
        self.requests.lock().unwrap().clone()
    }
}
