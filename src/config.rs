use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_base_url: String,
    pub database_url: String,
    pub persist_debounce_ms: u64,
    pub submit_timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            api_base_url: env::var("API_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:5000".to_string()),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "detailbook.db".to_string()),
            persist_debounce_ms: env::var("PERSIST_DEBOUNCE_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(120),
            submit_timeout_secs: env::var("SUBMIT_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
        }
    }
}
