use axum::{extract::State, http::StatusCode, response::IntoResponse, Form, Json};
use file_search::{answer_query, resolve_or_create_store};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::{api_state::ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct AskParams {
    pub prompt: String,
}

/// Answer a question about the documents in the configured store.
pub async fn ask_question(
    State(state): State<ApiState>,
    Form(input): Form<AskParams>,
) -> Result<impl IntoResponse, ApiError> {
    let prompt = input.prompt.trim();
    if prompt.is_empty() {
        return Err(ApiError::ValidationError(
            "prompt must not be empty".to_string(),
        ));
    }

    info!(prompt_bytes = prompt.len(), "received question");

    let store_id =
        resolve_or_create_store(state.search.as_ref(), &state.config.store_display_name).await?;
    let answer = answer_query(state.search.as_ref(), std::slice::from_ref(&store_id), prompt).await?;

    Ok((
        StatusCode::OK,
        Json(json!({ "question": prompt, "answer": answer })),
    ))
}
