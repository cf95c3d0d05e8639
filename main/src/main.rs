use std::sync::Arc;

use api_router::{api_routes, api_state::ApiState};
use axum::Router;
use common::utils::config::get_config;
use file_search::FileSearchClient;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set up tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .try_init()
        .ok();

    // Get config
    let config = get_config()?;

    // Set up the service client; handlers only see this injected handle
    let search = Arc::new(FileSearchClient::from_config(&config)?);
    let api_state = ApiState::new(config.clone(), search);

    let app = Router::new()
        .merge(api_routes(&api_state))
        .with_state(api_state);

    info!("Starting server listening on 0.0.0.0:{}", config.http_port);
    let serve_address = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(serve_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use common::utils::config::AppConfig;
    use file_search::testing::MockBackend;
    use serde_json::Value;
    use tower::ServiceExt;

    fn test_app(backend: Arc<MockBackend>) -> Router {
        let config = AppConfig {
            import_poll_interval_ms: 1,
            ..Default::default()
        };
        let api_state = ApiState::new(config, backend);
        Router::new()
            .merge(api_routes(&api_state))
            .with_state(api_state)
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("response body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn live_and_ready_probes_respond() {
        let app = test_app(Arc::new(MockBackend::default()));

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/live")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router response");
        assert_eq!(response.status(), StatusCode::OK);

        let ready_response = app
            .oneshot(
                Request::builder()
                    .uri("/ready")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("ready response");
        assert_eq!(ready_response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn ready_reports_unavailable_when_service_is_down() {
        let app = test_app(Arc::new(
            MockBackend::default().with_list_error("connection refused"),
        ));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/ready")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router response");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn ask_with_missing_prompt_is_a_client_error_not_500() {
        let app = test_app(Arc::new(MockBackend::default()));

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/ask")
                    .header("content-type", "application/x-www-form-urlencoded")
                    .body(Body::from("unrelated=value"))
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn ask_round_trip_returns_question_and_answer() {
        let app = test_app(Arc::new(MockBackend::default()));

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/ask")
                    .header("content-type", "application/x-www-form-urlencoded")
                    .body(Body::from("prompt=Tell%20me%20about%20this%20document"))
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["question"], "Tell me about this document");
        assert!(!body["answer"].as_str().expect("answer text").is_empty());
    }

    #[tokio::test]
    async fn upload_round_trip_reports_each_file() {
        let app = test_app(Arc::new(MockBackend::default().with_failing_file("b.txt")));

        let boundary = "test-boundary-7MA4YWxkTrZu0gW";
        let mut body = String::new();
        for (name, contents) in [("a.txt", "first"), ("b.txt", "second")] {
            body.push_str(&format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"{name}\"\r\nContent-Type: text/plain\r\n\r\n{contents}\r\n"
            ));
        }
        body.push_str(&format!("--{boundary}--\r\n"));

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/upload")
                    .header(
                        "content-type",
                        format!("multipart/form-data; boundary={boundary}"),
                    )
                    .body(Body::from(body))
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "partial");
        let uploaded = body["uploaded"].as_array().expect("outcome array");
        assert_eq!(uploaded.len(), 2);
        assert_eq!(uploaded[0]["file"], "a.txt");
        assert_eq!(uploaded[0]["status"], "uploaded");
        assert_eq!(uploaded[1]["file"], "b.txt");
        assert_eq!(uploaded[1]["status"], "failed");
    }
}
