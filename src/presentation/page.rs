//! Page payloads for the single-page front end.
//!
//! Every screen is served as a JSON page object naming the client component
//! to mount and the props to hydrate it with:
//!
//! ```json
//! { "component": "hospital/index", "props": { ... }, "url": "/hospitals", "version": "1" }
//! ```
//!
//! When a client announces an asset version that differs from ours, a GET is
//! answered with `409 Conflict` and an `X-Inertia-Location` header so the
//! browser performs a full reload.

use crate::domain::user::User;
use crate::presentation::handlers::ApiError;
use actix_web::http::{Method, StatusCode, header};
use actix_web::{HttpRequest, HttpResponse};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

pub const INERTIA_HEADER: &str = "x-inertia";
pub const VERSION_HEADER: &str = "x-inertia-version";
pub const LOCATION_HEADER: &str = "x-inertia-location";

#[derive(Debug, Serialize)]
struct PagePayload {
    component: &'static str,
    props: Map<String, Value>,
    url: String,
    version: String,
}

#[derive(Debug)]
pub struct Page {
    component: &'static str,
    props: Map<String, Value>,
}

impl Page {
    pub fn new(component: &'static str) -> Self {
        Self {
            component,
            props: Map::new(),
        }
    }

    pub fn prop(mut self, key: &str, value: impl Serialize) -> Result<Self, ApiError> {
        let value = serde_json::to_value(value)
            .map_err(|e| ApiError::Internal(format!("Failed to serialize page props: {}", e)))?;
        self.props.insert(key.to_string(), value);
        Ok(self)
    }

    pub fn render(
        mut self,
        req: &HttpRequest,
        version: &str,
        user: Option<&User>,
    ) -> Result<HttpResponse, ApiError> {
        let url = req.uri().to_string();

        if let Some(stale) = stale_client_version(req, version) {
            debug!(client_version = %stale, server_version = version, "Asset version mismatch");
            return Ok(HttpResponse::build(StatusCode::CONFLICT)
                .insert_header((LOCATION_HEADER, url))
                .finish());
        }

        // Shared props every component receives
        let user = serde_json::to_value(user)
            .map_err(|e| ApiError::Internal(format!("Failed to serialize user: {}", e)))?;
        self.props
            .insert("auth".to_string(), serde_json::json!({ "user": user }));
        self.props
            .entry("errors")
            .or_insert_with(|| Value::Object(Map::new()));

        let payload = PagePayload {
            component: self.component,
            props: self.props,
            url,
            version: version.to_string(),
        };

        Ok(HttpResponse::Ok()
            .insert_header((INERTIA_HEADER, "true"))
            .insert_header((header::VARY, "X-Inertia"))
            .json(payload))
    }
}

fn stale_client_version(req: &HttpRequest, version: &str) -> Option<String> {
    if req.method() != Method::GET || !req.headers().contains_key(INERTIA_HEADER) {
        return None;
    }
    let client = req.headers().get(VERSION_HEADER)?.to_str().ok()?;
    (client != version).then(|| client.to_string())
}
