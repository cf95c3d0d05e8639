use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use common::{error::AppError, utils::config::AppConfig};
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::backend::{FileSearchBackend, ImportOperation, OperationError, StoreInfo};

const API_KEY_HEADER: &str = "x-goog-api-key";
const REQUEST_TIMEOUT_SECS: u64 = 120;
const LIST_PAGE_SIZE: u32 = 100;

/// Reqwest-backed client for the remote file-search service.
///
/// Owns serde structs for exactly the fields this system reads; the rest of
/// the provider's wire format is opaque.
pub struct FileSearchClient {
    http: reqwest::Client,
    api_base: String,
    upload_base: String,
    api_key: String,
    answer_model: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StorePayload {
    name: String,
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreListPayload {
    #[serde(default)]
    file_search_stores: Vec<StorePayload>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateStoreRequest<'a> {
    display_name: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OperationPayload {
    name: String,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<StatusPayload>,
}

#[derive(Debug, Deserialize)]
struct StatusPayload {
    #[serde(default)]
    code: Option<i32>,
    #[serde(default)]
    message: String,
}

#[derive(Serialize, Deserialize)]
struct TextPart {
    text: String,
}

#[derive(Serialize, Deserialize)]
struct Content {
    parts: Vec<TextPart>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FileSearchTool {
    file_search_store_names: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    file_search: FileSearchTool,
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    tools: Vec<Tool>,
}

#[derive(Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl FileSearchClient {
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            api_base: validated_base(&config.api_base_url)?,
            upload_base: validated_base(&config.upload_base_url)?,
            api_key: config.gemini_api_key.clone(),
            answer_model: config.answer_model.clone(),
        })
    }
}

fn validated_base(raw: &str) -> Result<String, AppError> {
    Url::parse(raw)
        .map_err(|e| AppError::Validation(format!("invalid service base url '{raw}': {e}")))?;
    Ok(raw.trim_end_matches('/').to_string())
}

/// Decode a JSON response, turning non-2xx statuses and undecodable bodies
/// into a message the caller wraps in its own error variant.
async fn expect_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, String> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        return Err(format!("service returned {status}: {body}"));
    }
    response
        .json::<T>()
        .await
        .map_err(|e| format!("invalid response body: {e}"))
}

fn store_from(payload: StorePayload) -> StoreInfo {
    StoreInfo {
        display_name: payload.display_name.unwrap_or_default(),
        name: payload.name,
    }
}

fn operation_from(payload: OperationPayload) -> ImportOperation {
    ImportOperation {
        name: payload.name,
        done: payload.done,
        error: payload.error.map(|status| OperationError {
            code: status.code,
            message: status.message,
        }),
    }
}

/// Concatenated candidate text, or None when the response carries nothing
/// usable.
fn answer_text(payload: GenerateResponse) -> Option<String> {
    let text = payload
        .candidates
        .into_iter()
        .next()?
        .content?
        .parts
        .into_iter()
        .map(|part| part.text)
        .collect::<String>();
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

#[async_trait]
impl FileSearchBackend for FileSearchClient {
    async fn list_stores(&self) -> Result<Vec<StoreInfo>, AppError> {
        let mut stores = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .http
                .get(format!("{}/fileSearchStores", self.api_base))
                .header(API_KEY_HEADER, &self.api_key)
                .query(&[("pageSize", LIST_PAGE_SIZE.to_string())]);
            if let Some(token) = page_token.as_deref() {
                request = request.query(&[("pageToken", token)]);
            }

            let response = request
                .send()
                .await
                .map_err(|e| AppError::StoreLookup(e.to_string()))?;
            let page: StoreListPayload =
                expect_json(response).await.map_err(AppError::StoreLookup)?;

            stores.extend(page.file_search_stores.into_iter().map(store_from));

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(stores)
    }

    async fn create_store(&self, display_name: &str) -> Result<StoreInfo, AppError> {
        let response = self
            .http
            .post(format!("{}/fileSearchStores", self.api_base))
            .header(API_KEY_HEADER, &self.api_key)
            .json(&CreateStoreRequest { display_name })
            .send()
            .await
            .map_err(|e| AppError::StoreCreation(e.to_string()))?;

        let store: StorePayload = expect_json(response).await.map_err(AppError::StoreCreation)?;
        Ok(store_from(store))
    }

    async fn begin_import(
        &self,
        store_id: &str,
        payload: Bytes,
        display_name: &str,
    ) -> Result<ImportOperation, AppError> {
        let mime = mime_guess::from_path(display_name).first_or_octet_stream();
        let metadata = serde_json::json!({ "displayName": display_name });

        let form = Form::new()
            .part(
                "metadata",
                Part::text(metadata.to_string())
                    .mime_str("application/json")
                    .map_err(|e| AppError::UploadInitiation(e.to_string()))?,
            )
            .part(
                "file",
                Part::stream(payload)
                    .file_name(display_name.to_string())
                    .mime_str(mime.as_ref())
                    .map_err(|e| AppError::UploadInitiation(e.to_string()))?,
            );

        let response = self
            .http
            .post(format!(
                "{}/{store_id}:uploadToFileSearchStore",
                self.upload_base
            ))
            .header(API_KEY_HEADER, &self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::UploadInitiation(e.to_string()))?;

        let operation: OperationPayload = expect_json(response)
            .await
            .map_err(AppError::UploadInitiation)?;
        Ok(operation_from(operation))
    }

    async fn fetch_operation(&self, operation_name: &str) -> Result<ImportOperation, AppError> {
        let response = self
            .http
            .get(format!("{}/{operation_name}", self.api_base))
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| AppError::PollingTransport(e.to_string()))?;

        let operation: OperationPayload = expect_json(response)
            .await
            .map_err(AppError::PollingTransport)?;
        Ok(operation_from(operation))
    }

    async fn generate_answer(
        &self,
        store_ids: &[String],
        prompt: &str,
    ) -> Result<String, AppError> {
        let request_body = GenerateRequest {
            contents: vec![Content {
                parts: vec![TextPart {
                    text: prompt.to_string(),
                }],
            }],
            tools: vec![Tool {
                file_search: FileSearchTool {
                    file_search_store_names: store_ids.to_vec(),
                },
            }],
        };

        let response = self
            .http
            .post(format!(
                "{}/models/{}:generateContent",
                self.api_base, self.answer_model
            ))
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| AppError::Query(e.to_string()))?;

        let payload: GenerateResponse = expect_json(response).await.map_err(AppError::Query)?;
        answer_text(payload)
            .ok_or_else(|| AppError::Query("no answer text in generation response".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_base_url() {
        assert!(validated_base("not a url").is_err());
    }

    #[test]
    fn strips_trailing_slash_from_base_url() {
        let base = validated_base("https://example.com/v1beta/").expect("valid url");
        assert_eq!(base, "https://example.com/v1beta");
    }

    #[test]
    fn decodes_operation_with_error_status() {
        let payload: OperationPayload = serde_json::from_str(
            r#"{"name":"operations/abc","done":true,"error":{"code":13,"message":"import rejected"}}"#,
        )
        .expect("valid operation json");
        let operation = operation_from(payload);
        assert!(operation.done);
        let error = operation.error.expect("error present");
        assert_eq!(error.code, Some(13));
        assert_eq!(error.message, "import rejected");
    }

    #[test]
    fn decodes_pending_operation_without_done_field() {
        let payload: OperationPayload =
            serde_json::from_str(r#"{"name":"operations/abc"}"#).expect("valid operation json");
        let operation = operation_from(payload);
        assert!(!operation.done);
        assert!(operation.error.is_none());
    }

    #[test]
    fn joins_candidate_parts_into_answer() {
        let payload: GenerateResponse = serde_json::from_str(
            r###"{"candidates":[{"content":{"parts":[{"text":"## Summary"},{"text":"\n- point"}]}}]}"###,
        )
        .expect("valid generation json");
        assert_eq!(answer_text(payload), Some("## Summary\n- point".to_string()));
    }

    #[test]
    fn empty_candidates_yield_no_answer() {
        assert_eq!(answer_text(GenerateResponse::default()), None);
    }
}
