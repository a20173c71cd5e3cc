//! HTTP handlers.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use pipeline::{process_event, ChangeEvent, ChangeProcessor, DeliveryId};
use tracing::{info, warn};

use crate::credentials::CredentialQuery;
use crate::AppState;

const JSON_CONTENT_TYPE: &str = "application/json";

/// Health check for load balancers.
pub(crate) async fn health() -> &'static str {
    "ok"
}

/// Tracker activity webhook.
///
/// Answers `200` when every change was processed, `502` with the category of
/// the first failure when any change failed, and `4xx` for requests that are
/// rejected before processing starts.
pub(crate) async fn tracker_activity(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    uri: Uri,
    body: Bytes,
) -> Response {
    if !state.credentials.matches(&headers, &credential_query(&uri)) {
        warn!("Rejecting request due to bad credentials");
        return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    }

    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !is_json(content_type) {
        warn!(content_type, "Request had wrong Content-Type");
        return (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            format!("Request had wrong Content-Type: {content_type}"),
        )
            .into_response();
    }

    let event = match ChangeEvent::from_json(&body) {
        Ok(event) => event,
        Err(err) => {
            warn!(error = %err, "Error parsing request body");
            return (StatusCode::BAD_REQUEST, "can't parse json body").into_response();
        }
    };

    let delivery = DeliveryId::new_random();
    info!(%delivery, changes = event.changes.len(), "Received Tracker activity");

    let processor = ChangeProcessor::new(
        state.resolver.as_ref(),
        state.issues.as_ref(),
        state.owners.as_ref(),
    );
    let report = process_event(&processor, delivery, &event).await;

    match report.first_failure_category() {
        None => StatusCode::OK.into_response(),
        Some(category) => {
            warn!(
                delivery = %report.delivery,
                received_at = %report.received_at,
                failed = report.failures.len(),
                %category,
                "Answering with bad gateway"
            );
            (StatusCode::BAD_GATEWAY, category.message()).into_response()
        }
    }
}

/// Reads the credential query parameters, treating an unparseable query string
/// as carrying no credentials so the request is answered with `401`.
fn credential_query(uri: &Uri) -> CredentialQuery {
    Query::try_from_uri(uri)
        .map(|Query(query)| query)
        .unwrap_or_default()
}

/// Accepts `application/json` with or without parameters such as a charset.
fn is_json(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case(JSON_CONTENT_TYPE))
}
