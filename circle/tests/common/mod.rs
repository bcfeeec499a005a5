//! Shared helpers for integration tests: a fake Circle backend on wiremock
#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use circle::app::options::ClientOptions;
use circle::models::activity::format_activity_id;
use circle::HttpClient;
use serde_json::json;
use wiremock::{Request, Respond, ResponseTemplate};

/// Client pointed at the mock server, reaching nodes over plain HTTP
pub fn client_for(base_url: &str) -> HttpClient {
    let options = ClientOptions {
        node_scheme: "http".to_string(),
        ..ClientOptions::with_base_url(base_url)
    };
    HttpClient::new(&options).expect("client should build")
}

/// `count` activity ids, one every `step` starting at `first`
pub fn activity_ids(first: DateTime<Utc>, step: Duration, count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format_activity_id(&(first + step * i as i32)))
        .collect()
}

/// Cookie header value as the login endpoint sends it
pub fn session_cookie(value: &str, expiry: DateTime<Utc>) -> String {
    format!(
        "prod_session={}; Path=/; Expires={}; HttpOnly; Secure",
        value,
        expiry.format("%a, %d %b %Y %H:%M:%S GMT")
    )
}

/// Answers activity page queries from a fixed, ascending list of ids,
/// honouring `startActivityId` (inclusive) and `limit` like the real API
pub struct ActivityBackend {
    pub ids: Vec<String>,

    /// Largest page handed out regardless of the requested limit
    pub cap: Option<usize>,
}

impl ActivityBackend {
    pub fn new(mut ids: Vec<String>) -> Self {
        ids.sort();
        Self { ids, cap: None }
    }

    pub fn with_cap(mut self, cap: usize) -> Self {
        self.cap = Some(cap);
        self
    }
}

impl Respond for ActivityBackend {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: serde_json::Value = match serde_json::from_slice(&request.body) {
            Ok(body) => body,
            Err(_) => return ResponseTemplate::new(400),
        };
        let cursor = body["startActivityId"].as_str().unwrap_or_default();
        let mut limit = body["limit"].as_u64().unwrap_or(100) as usize;
        if let Some(cap) = self.cap {
            limit = limit.min(cap);
        }
        if body["operator"] != ">=" {
            return ResponseTemplate::new(400);
        }

        let activities: Vec<_> = self
            .ids
            .iter()
            .filter(|id| id.as_str() >= cursor)
            .take(limit)
            .map(|id| json!({ "activityId": id, "relevanceLevel": 1 }))
            .collect();

        ResponseTemplate::new(200).set_body_json(json!({ "activities": activities }))
    }
}
