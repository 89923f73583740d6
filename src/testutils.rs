// src/testutils.rs
//! Test utilities for the REST API.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::repository::memory::MemoryStore;
use crate::routes::app;
use crate::state::AppState;

pub(crate) struct TestContext {
    app: Router,
}

impl TestContext {
    pub(crate) fn setup() -> Self {
        let app = app(AppState::new(MemoryStore::default()));
        Self { app }
    }

    /// Sends a request and returns the status and the JSON body, or `Value::Null`
    /// when the body is empty. Non-JSON bodies come back as a string.
    pub(crate) async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let body = body.map(|b| b.to_string()).unwrap_or_default();
        self.send_raw(method, uri, &body).await
    }

    pub(crate) async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        body: &str,
    ) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, json)
    }

    pub(crate) async fn create_driver(&self, name: &str, license: &str, active: bool) -> i64 {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/driver",
                Some(json!({"name": name, "licenseNumber": license})),
            )
            .await;
        assert_eq!(StatusCode::CREATED, status, "{body}");
        let id = body["data"]["id"].as_i64().unwrap();

        if active {
            let (status, body) = self
                .send(Method::PUT, "/api/driver", Some(json!({"id": id, "isActive": true})))
                .await;
            assert_eq!(StatusCode::OK, status, "{body}");
        }
        id
    }

    pub(crate) async fn create_truck(&self, plate: &str) -> i64 {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/truck",
                Some(json!({"licensePlate": plate, "fuelUsed": "10.5", "distanceTraveled": "0"})),
            )
            .await;
        assert_eq!(StatusCode::CREATED, status, "{body}");
        body["data"]["id"].as_i64().unwrap()
    }

    pub(crate) async fn assign(&self, truck: i64, driver: i64) {
        let route = format!("/api/truck/update-driver/{truck}?driverId={driver}");
        let (status, body) = self.send(Method::POST, &route, None).await;
        assert_eq!(StatusCode::OK, status, "{body}");
    }
}
