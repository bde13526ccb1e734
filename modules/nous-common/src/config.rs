use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the model-inference sidecar.
    pub inference_url: String,
    /// Optional bearer token for the sidecar.
    pub inference_api_key: Option<String>,

    // Web server
    pub api_host: String,
    pub api_port: u16,

    /// Target language assumed when detection fails or none is requested.
    pub default_language: String,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        Self {
            inference_url: required_env("INFERENCE_URL"),
            inference_api_key: env::var("INFERENCE_API_KEY").ok(),
            api_host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            api_port: env::var("API_PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .expect("API_PORT must be a number"),
            default_language: env::var("DEFAULT_LANGUAGE").unwrap_or_else(|_| "en".to_string()),
        }
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}
