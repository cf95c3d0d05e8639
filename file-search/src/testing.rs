//! Scriptable in-memory stand-in for the remote service, shared by the
//! orchestration unit tests and the router tests.

use std::collections::VecDeque;

use async_trait::async_trait;
use bytes::Bytes;
use common::error::AppError;
use tokio::sync::Mutex;

use crate::backend::{FileSearchBackend, ImportOperation, OperationError, StoreInfo};

/// One captured `begin_import` call.
#[derive(Debug, Clone)]
pub struct RecordedImport {
    pub store: String,
    pub display_name: String,
    pub payload: Bytes,
}

/// One captured `generate_answer` call.
#[derive(Debug, Clone)]
pub struct RecordedQuery {
    pub store_ids: Vec<String>,
    pub prompt: String,
}

pub struct MockBackend {
    pub stores: Mutex<Vec<StoreInfo>>,
    pub calls: Mutex<Vec<&'static str>>,
    pub imports: Mutex<Vec<RecordedImport>>,
    pub queries: Mutex<Vec<RecordedQuery>>,
    /// Operations returned by successive `fetch_operation` calls; once
    /// drained, `default_fetch` is returned forever.
    pub fetch_script: Mutex<VecDeque<ImportOperation>>,
    pub default_fetch: ImportOperation,
    pub initial_operation: ImportOperation,
    /// Display names whose `begin_import` is rejected outright.
    pub failing_files: Vec<String>,
    pub list_error: Option<String>,
    pub answer_error: Option<String>,
    pub answer_text: String,
}

pub fn pending_operation() -> ImportOperation {
    ImportOperation {
        name: "operations/import-1".to_string(),
        done: false,
        error: None,
    }
}

pub fn completed_operation() -> ImportOperation {
    ImportOperation {
        name: "operations/import-1".to_string(),
        done: true,
        error: None,
    }
}

pub fn failed_operation(message: &str) -> ImportOperation {
    ImportOperation {
        name: "operations/import-1".to_string(),
        done: true,
        error: Some(OperationError {
            code: Some(13),
            message: message.to_string(),
        }),
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self {
            stores: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            imports: Mutex::new(Vec::new()),
            queries: Mutex::new(Vec::new()),
            fetch_script: Mutex::new(VecDeque::new()),
            default_fetch: completed_operation(),
            initial_operation: pending_operation(),
            failing_files: Vec::new(),
            list_error: None,
            answer_error: None,
            answer_text: "## Summary\n- a test answer".to_string(),
        }
    }
}

impl MockBackend {
    pub fn with_store(mut self, name: &str, display_name: &str) -> Self {
        self.stores.get_mut().push(StoreInfo {
            name: name.to_string(),
            display_name: display_name.to_string(),
        });
        self
    }

    pub fn with_fetch_script(mut self, script: Vec<ImportOperation>) -> Self {
        *self.fetch_script.get_mut() = script.into();
        self
    }

    pub fn with_default_fetch(mut self, operation: ImportOperation) -> Self {
        self.default_fetch = operation;
        self
    }

    pub fn with_initial_operation(mut self, operation: ImportOperation) -> Self {
        self.initial_operation = operation;
        self
    }

    pub fn with_failing_file(mut self, display_name: &str) -> Self {
        self.failing_files.push(display_name.to_string());
        self
    }

    pub fn with_list_error(mut self, message: &str) -> Self {
        self.list_error = Some(message.to_string());
        self
    }

    pub fn with_answer_error(mut self, message: &str) -> Self {
        self.answer_error = Some(message.to_string());
        self
    }

    pub async fn call_count(&self, name: &'static str) -> usize {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|call| **call == name)
            .count()
    }
}

#[async_trait]
impl FileSearchBackend for MockBackend {
    async fn list_stores(&self) -> Result<Vec<StoreInfo>, AppError> {
        self.calls.lock().await.push("list_stores");
        if let Some(message) = &self.list_error {
            return Err(AppError::StoreLookup(message.clone()));
        }
        Ok(self.stores.lock().await.clone())
    }

    async fn create_store(&self, display_name: &str) -> Result<StoreInfo, AppError> {
        self.calls.lock().await.push("create_store");
        let mut stores = self.stores.lock().await;
        let store = StoreInfo {
            name: format!("fileSearchStores/mock-{}", stores.len()),
            display_name: display_name.to_string(),
        };
        stores.push(store.clone());
        Ok(store)
    }

    async fn begin_import(
        &self,
        store_id: &str,
        payload: Bytes,
        display_name: &str,
    ) -> Result<ImportOperation, AppError> {
        self.calls.lock().await.push("begin_import");
        if self.failing_files.iter().any(|file| file == display_name) {
            return Err(AppError::UploadInitiation(format!(
                "service rejected '{display_name}'"
            )));
        }
        self.imports.lock().await.push(RecordedImport {
            store: store_id.to_string(),
            display_name: display_name.to_string(),
            payload,
        });
        Ok(self.initial_operation.clone())
    }

    async fn fetch_operation(&self, _operation_name: &str) -> Result<ImportOperation, AppError> {
        self.calls.lock().await.push("fetch_operation");
        let scripted = self.fetch_script.lock().await.pop_front();
        Ok(scripted.unwrap_or_else(|| self.default_fetch.clone()))
    }

    async fn generate_answer(
        &self,
        store_ids: &[String],
        prompt: &str,
    ) -> Result<String, AppError> {
        self.calls.lock().await.push("generate_answer");
        if let Some(message) = &self.answer_error {
            return Err(AppError::Query(message.clone()));
        }
        self.queries.lock().await.push(RecordedQuery {
            store_ids: store_ids.to_vec(),
            prompt: prompt.to_string(),
        });
        Ok(self.answer_text.clone())
    }
}
