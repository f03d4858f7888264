use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::pagination::QUESTIONS_PER_PAGE;

/// Runtime settings: built-in defaults, then `trivia.toml` (or the file
/// given on the command line), then `TRIVIA_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub questions_per_page: usize,
    pub log_level: String,
}

impl Settings {
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        let file = match path {
            Some(path) => File::from(path),
            None => File::with_name("trivia").required(false),
        };
        Config::builder()
            .set_default("database_url", "sqlite:trivia.db?mode=rwc")?
            .set_default("host", "0.0.0.0")?
            .set_default("port", 8080)?
            .set_default("questions_per_page", QUESTIONS_PER_PAGE as u64)?
            .set_default("log_level", "info")?
            .add_source(file)
            .add_source(Environment::with_prefix("TRIVIA").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
