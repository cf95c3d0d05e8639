use async_trait::async_trait;
use bytes::Bytes;
use common::error::AppError;

/// Reference to a named server-side document store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreInfo {
    /// Opaque resource identifier, e.g. `fileSearchStores/abc123`.
    pub name: String,
    /// Human-readable label, used as the lookup key by the resolver.
    pub display_name: String,
}

/// Terminal error reported by an import operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationError {
    pub code: Option<i32>,
    pub message: String,
}

/// A long-running document import as observed through the service API.
///
/// The operation is terminal once `done` is true; only then is `error`
/// meaningful.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOperation {
    pub name: String,
    pub done: bool,
    pub error: Option<OperationError>,
}

/// The remote file-search service, seen as five operations. The concrete
/// client lives in [`crate::client`]; tests substitute a scripted mock.
#[async_trait]
pub trait FileSearchBackend: Send + Sync {
    /// Every store known to the service, across all listing pages.
    async fn list_stores(&self) -> Result<Vec<StoreInfo>, AppError>;

    /// Create a store with the given display name.
    async fn create_store(&self, display_name: &str) -> Result<StoreInfo, AppError>;

    /// Upload a document into a store, returning the initial state of the
    /// import operation.
    async fn begin_import(
        &self,
        store_id: &str,
        payload: Bytes,
        display_name: &str,
    ) -> Result<ImportOperation, AppError>;

    /// Re-read an import operation by its resource name.
    async fn fetch_operation(&self, operation_name: &str) -> Result<ImportOperation, AppError>;

    /// One generation round trip with retrieval scoped to the given stores.
    async fn generate_answer(&self, store_ids: &[String], prompt: &str)
        -> Result<String, AppError>;
}
