#![allow(clippy::missing_docs_in_private_items)]

pub mod backend;
pub mod client;
pub mod import;
pub mod query;
pub mod resolver;
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use backend::{FileSearchBackend, ImportOperation, OperationError, StoreInfo};
pub use client::FileSearchClient;
pub use import::{upload_and_wait, ImportPolicy, ImportReceipt};
pub use query::answer_query;
pub use resolver::resolve_or_create_store;
