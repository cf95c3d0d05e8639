use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Clone, Deserialize, Debug)]
pub struct AppConfig {
    pub gemini_api_key: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_upload_base_url")]
    pub upload_base_url: String,
    pub http_port: u16,
    #[serde(default = "default_store_display_name")]
    pub store_display_name: String,
    #[serde(default = "default_answer_model")]
    pub answer_model: String,
    #[serde(default = "default_import_poll_interval_ms")]
    pub import_poll_interval_ms: u64,
    #[serde(default = "default_import_max_polls")]
    pub import_max_polls: u32,
    #[serde(default = "default_upload_max_body_bytes")]
    pub upload_max_body_bytes: usize,
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

fn default_api_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_upload_base_url() -> String {
    "https://generativelanguage.googleapis.com/upload/v1beta".to_string()
}

fn default_store_display_name() -> String {
    "inspection-agent".to_string()
}

fn default_answer_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_import_poll_interval_ms() -> u64 {
    3000
}

fn default_import_max_polls() -> u32 {
    100
}

fn default_upload_max_body_bytes() -> usize {
    25_000_000
}

fn default_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost:3001".to_string(),
        "http://127.0.0.1:3000".to_string(),
        "http://127.0.0.1:3001".to_string(),
    ]
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: String::new(),
            api_base_url: default_api_base_url(),
            upload_base_url: default_upload_base_url(),
            http_port: 0,
            store_display_name: default_store_display_name(),
            answer_model: default_answer_model(),
            import_poll_interval_ms: default_import_poll_interval_ms(),
            import_max_polls: default_import_max_polls(),
            upload_max_body_bytes: default_upload_max_body_bytes(),
            allowed_origins: default_allowed_origins(),
        }
    }
}

pub fn get_config() -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::with_name("config").required(false))
        .add_source(Environment::default())
        .build()?;

    config.try_deserialize()
}
