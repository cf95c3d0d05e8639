use thiserror::Error;

// Core internal errors, one variant per failure kind. The HTTP boundary
// maps these to status codes in api-router.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Store lookup failed: {0}")]
    StoreLookup(String),
    #[error("Store creation failed: {0}")]
    StoreCreation(String),
    #[error("Upload initiation failed: {0}")]
    UploadInitiation(String),
    #[error("Import of '{file}' failed: {message}")]
    Import { file: String, message: String },
    #[error("Import of '{file}' timed out after {polls} polls")]
    ImportTimeout { file: String, polls: u32 },
    #[error("Polling transport error: {0}")]
    PollingTransport(String),
    #[error("Query failed: {0}")]
    Query(String),
    #[error("Staging error: {0}")]
    Staging(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("IoError: {0}")]
    Io(#[from] std::io::Error),
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}
