use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use axum_typed_multipart::{FieldData, TryFromMultipart, TypedMultipart};
use bytes::Bytes;
use common::error::AppError;
use file_search::{resolve_or_create_store, upload_and_wait, FileSearchBackend, ImportPolicy};
use serde::Serialize;
use serde_json::json;
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::{api_state::ApiState, error::ApiError};

#[derive(Debug, TryFromMultipart)]
pub struct UploadParams {
    #[form_data(limit = "25000000")]
    #[form_data(default)]
    pub files: Vec<FieldData<NamedTempFile>>,
}

#[derive(Debug, Serialize)]
pub struct FileOutcome {
    pub file: String,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Upload one or more files into the configured store.
///
/// Files are staged on disk by the multipart extractor (one unique temp
/// path per field, removed on drop whichever way the request ends) and
/// imported one at a time. A failing file does not abort the batch; the
/// response carries one outcome per file.
pub async fn upload_files(
    State(state): State<ApiState>,
    TypedMultipart(input): TypedMultipart<UploadParams>,
) -> Result<impl IntoResponse, ApiError> {
    let file_count = input.files.len();
    info!(file_count, "received upload request");

    if input.files.is_empty() {
        return Err(ApiError::ValidationError(
            "at least one file is required".to_string(),
        ));
    }

    let store_id =
        resolve_or_create_store(state.search.as_ref(), &state.config.store_display_name).await?;
    let policy = ImportPolicy::from_config(&state.config);

    let mut outcomes = Vec::with_capacity(file_count);
    for (index, field) in input.files.into_iter().enumerate() {
        let display_name = field
            .metadata
            .file_name
            .clone()
            .unwrap_or_else(|| format!("upload-{index}"));

        let outcome = match import_one(
            state.search.as_ref(),
            &store_id,
            field,
            &display_name,
            &policy,
        )
        .await
        {
            Ok(()) => FileOutcome {
                file: display_name,
                status: "uploaded",
                error: None,
            },
            Err(err) => {
                warn!(file = %display_name, error = %err, "file import failed");
                FileOutcome {
                    file: display_name,
                    status: "failed",
                    error: Some(err.to_string()),
                }
            }
        };
        outcomes.push(outcome);
    }

    let status = if outcomes.iter().any(|outcome| outcome.status == "failed") {
        "partial"
    } else {
        "success"
    };

    Ok((
        StatusCode::OK,
        Json(json!({ "status": status, "uploaded": outcomes })),
    ))
}

async fn import_one(
    backend: &dyn FileSearchBackend,
    store_id: &str,
    field: FieldData<NamedTempFile>,
    display_name: &str,
    policy: &ImportPolicy,
) -> Result<(), AppError> {
    // The staged file is owned by this scope; it is deleted on drop on
    // every exit path.
    let staged = field.contents;
    let payload = tokio::fs::read(staged.path())
        .await
        .map_err(|e| AppError::Staging(format!("reading staged '{display_name}': {e}")))?;

    upload_and_wait(backend, store_id, Bytes::from(payload), display_name, policy).await?;
    Ok(())
}
