//! HTTP surface.
//!
//! | Request                                        | Response                       |
//! |------------------------------------------------|--------------------------------|
//! | `GET /grants/{value}?expired=..&src=..`        | 200 with the player's grants   |
//! | unknown player                                 | 204, empty body                |
//! | missing or invalid `expired`, `src` or value   | 400 `{"message": ..}`          |
//! | lookup failure                                 | 500 `{"message": "<svc>: .."}` |
//!
//! `src` is `id` or `name`; `gt` is accepted as an older spelling of `name`.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::service::GrantService;

/// How the lookup value identifies a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Id,
    Name,
}

impl Source {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "id" => Some(Source::Id),
            "name" | "gt" => Some(Source::Name),
            _ => None,
        }
    }
}

/// Validated query parameters of a grants lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LookupParams {
    include_expired: bool,
    source: Source,
}

impl LookupParams {
    /// Validate in the order clients see errors: `expired`, then `src`.
    fn parse(params: &HashMap<String, String>) -> Result<Self, &'static str> {
        let include_expired = match params.get("expired").map(String::as_str) {
            None | Some("") => return Err("No expired provided"),
            Some("true") => true,
            Some("false") => false,
            Some(_) => return Err("Invalid state provided"),
        };

        let source = match params.get("src").map(String::as_str) {
            None | Some("") => return Err("No source provided"),
            Some(raw) => Source::parse(raw).ok_or("Invalid source provided")?,
        };

        Ok(Self {
            include_expired,
            source,
        })
    }
}

/// Routes for the grants API, bound to a service.
pub fn router(service: Arc<GrantService>) -> Router {
    Router::new()
        .route("/grants/{value}", get(lookup))
        .route("/grants/", get(lookup_without_value))
        .route("/grants", get(lookup_without_value))
        .with_state(service)
}

async fn lookup(
    State(service): State<Arc<GrantService>>,
    Path(value): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    respond(&service, Some(value), &params).await
}

async fn lookup_without_value(
    State(service): State<Arc<GrantService>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    respond(&service, None, &params).await
}

async fn respond(
    service: &GrantService,
    value: Option<String>,
    params: &HashMap<String, String>,
) -> Response {
    let params = match LookupParams::parse(params) {
        Ok(params) => params,
        Err(message) => return message_response(StatusCode::BAD_REQUEST, message),
    };

    let Some(value) = value.filter(|v| !v.is_empty()) else {
        return message_response(StatusCode::BAD_REQUEST, "No value provided");
    };

    match service
        .handle_lookup(&value, params.source == Source::Id)
        .await
    {
        Ok(Some(tracker)) => {
            (StatusCode::OK, Json(tracker.snapshot(params.include_expired))).into_response()
        }
        Ok(None) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            tracing::warn!(value = %value, error = %e, "grant lookup failed");
            let message = format!("{}: {}", service.config().service_id, e);
            message_response(StatusCode::INTERNAL_SERVER_ERROR, &message)
        }
    }
}

fn message_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}
