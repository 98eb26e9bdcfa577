//! HTTP surface of the static map service.
//!
//! | Route                | Response                                        |
//! |----------------------|-------------------------------------------------|
//! | `/`, `/staticmap`    | PNG (200), accepted (202) or error text         |
//! | `/status`            | plain-text metrics snapshot                     |

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use slipee::provider::TileSource;
use slipee::service::{ServiceError, StaticMapService, StitchOutcome};
use tracing::{debug, error};

use crate::query::MapQuery;

/// Builds the router over a shared service.
pub fn router<S: TileSource + 'static>(service: Arc<StaticMapService<S>>) -> Router {
    Router::new()
        .route("/", get(static_map::<S>))
        .route("/staticmap", get(static_map::<S>))
        .route("/status", get(status::<S>))
        .with_state(service)
}

async fn static_map<S: TileSource + 'static>(
    State(service): State<Arc<StaticMapService<S>>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let query = match MapQuery::from_params(&params) {
        Ok(query) => query,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };

    // Detached so a client hanging up does not cancel the build
    if query.bypass {
        return match service.generate_detached(query.request).await {
            Ok(path) => png_file(&path).await,
            Err(e) => error_response(&e),
        };
    }

    match service.stitch(query.request).await {
        Ok(StitchOutcome::Ready(path)) => png_file(&path).await,
        Ok(StitchOutcome::Pending) => StatusCode::ACCEPTED.into_response(),
        Err(e) => error_response(&e),
    }
}

async fn status<S: TileSource + 'static>(
    State(service): State<Arc<StaticMapService<S>>>,
) -> String {
    service.metrics().snapshot().to_string()
}

async fn png_file(path: &Path) -> Response {
    match tokio::fs::read(path).await {
        Ok(data) => ([(CONTENT_TYPE, "image/png")], data).into_response(),
        Err(e) => {
            error!(path = %path.display(), error = %e, "Cannot read cached map");
            (StatusCode::INTERNAL_SERVER_ERROR, "cannot read cached map").into_response()
        }
    }
}

fn error_response(e: &ServiceError) -> Response {
    let status = status_for(e);
    if status.is_server_error() {
        error!(error = %e, "Request failed");
    } else {
        debug!(error = %e, "Request rejected");
    }
    (status, e.to_string()).into_response()
}

fn status_for(e: &ServiceError) -> StatusCode {
    match e {
        ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
        ServiceError::Stitch(_) => StatusCode::BAD_GATEWAY,
        ServiceError::QueueFull | ServiceError::WorkerStopped => StatusCode::SERVICE_UNAVAILABLE,
        ServiceError::Cache(_) | ServiceError::Config(_) | ServiceError::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
