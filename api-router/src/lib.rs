use api_state::ApiState;
use axum::{
    extract::{DefaultBodyLimit, FromRef},
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use routes::{ask::ask_question, liveness::live, readiness::ready, upload::upload_files};
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

pub mod api_state;
pub mod error;
mod routes;

/// Router for the upload and ask endpoints plus probe routes.
pub fn api_routes<S>(app_state: &ApiState) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    ApiState: FromRef<S>,
{
    Router::new()
        .route(
            "/upload",
            post(upload_files).layer(DefaultBodyLimit::max(
                app_state.config.upload_max_body_bytes,
            )),
        )
        .route("/ask", post(ask_question))
        .route("/live", get(live))
        .route("/ready", get(ready))
        .layer(cors_layer(&app_state.config.allowed_origins))
}

/// Fixed allow-list of origins; all methods and headers for those origins.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let mut origins: Vec<HeaderValue> = Vec::with_capacity(allowed_origins.len());
    for origin in allowed_origins {
        match origin.parse() {
            Ok(value) => origins.push(value),
            Err(_) => warn!(%origin, "ignoring unparseable CORS origin"),
        }
    }

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}
