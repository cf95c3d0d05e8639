use common::error::AppError;
use tracing::info;

use crate::backend::FileSearchBackend;

/// Formatting instructions carried inside the prompt text itself; the
/// service offers no structured parameter for answer shape.
const ANSWER_STYLE: &str =
    "(Return your answer in markdown with sections and bullet points. Keep paragraphs short and to the point.)";

pub fn build_prompt(question: &str) -> String {
    format!("{question}\n{ANSWER_STYLE}\nANSWER:\n")
}

/// Answer a question with retrieval scoped to the given stores. One
/// blocking round trip; citation mechanics are internal to the service.
pub async fn answer_query(
    backend: &dyn FileSearchBackend,
    store_ids: &[String],
    question: &str,
) -> Result<String, AppError> {
    if question.trim().is_empty() {
        return Err(AppError::Validation("prompt must not be empty".to_string()));
    }
    if store_ids.is_empty() {
        return Err(AppError::Validation(
            "at least one store is required".to_string(),
        ));
    }

    info!(stores = store_ids.len(), "dispatching retrieval query");
    backend
        .generate_answer(store_ids, &build_prompt(question))
        .await
}
