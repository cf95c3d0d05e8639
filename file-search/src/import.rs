use std::time::Duration;

use bytes::Bytes;
use common::{error::AppError, utils::config::AppConfig};
use tokio::time::sleep;
use tokio_retry::{
    strategy::{jitter, ExponentialBackoff},
    Retry,
};
use tracing::{debug, info};

use crate::backend::{FileSearchBackend, ImportOperation};

/// Bounds for the import polling loop. The original behavior here was an
/// unbounded sleep-and-refetch; both knobs come from configuration.
#[derive(Debug, Clone, Copy)]
pub struct ImportPolicy {
    pub poll_interval: Duration,
    pub max_polls: u32,
}

impl ImportPolicy {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            poll_interval: Duration::from_millis(config.import_poll_interval_ms),
            max_polls: config.import_max_polls,
        }
    }
}

/// Proof that a document finished importing into a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReceipt {
    pub file: String,
    pub store: String,
}

/// Upload a document and block until its import operation is terminal.
///
/// A terminal operation carrying an error surfaces as `Import`, never as a
/// success receipt. Exceeding `max_polls` surfaces as `ImportTimeout`.
pub async fn upload_and_wait(
    backend: &dyn FileSearchBackend,
    store_id: &str,
    payload: Bytes,
    display_name: &str,
    policy: &ImportPolicy,
) -> Result<ImportReceipt, AppError> {
    let mut operation = backend.begin_import(store_id, payload, display_name).await?;
    info!(file = display_name, operation = %operation.name, "import started");

    let mut polls: u32 = 0;
    while !operation.done {
        if polls >= policy.max_polls {
            return Err(AppError::ImportTimeout {
                file: display_name.to_string(),
                polls,
            });
        }
        sleep(policy.poll_interval).await;
        polls = polls.saturating_add(1);
        operation = fetch_with_retry(backend, &operation.name).await?;
        debug!(file = display_name, polls, done = operation.done, "polled import operation");
    }

    match operation.error {
        Some(error) => Err(AppError::Import {
            file: display_name.to_string(),
            message: error.message,
        }),
        None => {
            info!(file = display_name, polls, "import finished");
            Ok(ImportReceipt {
                file: display_name.to_string(),
                store: store_id.to_string(),
            })
        }
    }
}

/// One poll read, with a short backoff absorbing transient transport
/// failures. A poll that exhausts its retries propagates the transport
/// error from mid-loop.
async fn fetch_with_retry(
    backend: &dyn FileSearchBackend,
    operation_name: &str,
) -> Result<ImportOperation, AppError> {
    let retry_strategy = ExponentialBackoff::from_millis(100).map(jitter).take(3);

    Retry::spawn(retry_strategy, || backend.fetch_operation(operation_name)).await
}
