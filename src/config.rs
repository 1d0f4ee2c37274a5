use std::path::Path;
use std::time::Duration;

use tracing::warn;

use crate::{OcrError, Result};

pub const MATHPIX_TEXT_ENDPOINT: &str = "https://api.mathpix.com/v3/text";
pub const MATHPIX_APP_ID: &str = "app";
pub const API_KEY_VAR: &str = "APIKEY";
pub const ENV_FILE: &str = ".env";

const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub app_id: String,
    pub endpoint: String,
    pub timeout: Duration,
}

impl Config {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            app_id: MATHPIX_APP_ID.to_string(),
            endpoint: MATHPIX_TEXT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Reads `APIKEY` from the `.env` file in `dir`.
    ///
    /// Only the file is consulted, never the process environment. An
    /// unreadable file is logged; a missing or empty key is an error.
    pub fn from_env_file(dir: &Path) -> Result<Self> {
        let path = dir.join(ENV_FILE);
        let api_key = match read_api_key(&path) {
            Ok(key) => key,
            Err(e) => {
                warn!("cannot load {}: {e}", path.display());
                None
            }
        };

        api_key
            .filter(|key| !key.is_empty())
            .map(Self::new)
            .ok_or(OcrError::MissingApiKey)
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

fn read_api_key(path: &Path) -> std::result::Result<Option<String>, dotenvy::Error> {
    let mut api_key = None;
    for item in dotenvy::from_path_iter(path)? {
        let (key, value) = item?;
        // Last assignment wins.
        if key == API_KEY_VAR {
            api_key = Some(value);
        }
    }
    Ok(api_key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn dir_with_env(contents: &str) -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(ENV_FILE), contents).unwrap();
        dir
    }

    #[test]
    fn reads_api_key() {
        let dir = dir_with_env("# mathpix\nOTHER=1\nAPIKEY=secret-key\n");
        let config = Config::from_env_file(dir.path()).unwrap();
        assert_eq!(config.api_key, "secret-key");
        assert_eq!(config.app_id, "app");
        assert_eq!(config.endpoint, MATHPIX_TEXT_ENDPOINT);
    }

    #[test]
    fn quoted_values_are_unquoted() {
        let dir = dir_with_env("APIKEY=\"quoted key\"\n");
        let config = Config::from_env_file(dir.path()).unwrap();
        assert_eq!(config.api_key, "quoted key");
    }

    #[test]
    fn missing_file_is_missing_key() {
        let dir = TempDir::new().unwrap();
        let err = Config::from_env_file(dir.path()).unwrap_err();
        assert!(matches!(err, OcrError::MissingApiKey));
    }

    #[test]
    fn empty_key_is_missing_key() {
        let dir = dir_with_env("APIKEY=\n");
        let err = Config::from_env_file(dir.path()).unwrap_err();
        assert!(matches!(err, OcrError::MissingApiKey));
    }

    #[test]
    fn absent_key_is_missing_key() {
        let dir = dir_with_env("APP_KEY=nope\n");
        let err = Config::from_env_file(dir.path()).unwrap_err();
        assert!(matches!(err, OcrError::MissingApiKey));
    }

    #[test]
    fn builder_overrides() {
        let config = Config::new("k")
            .with_endpoint("http://127.0.0.1:9/v3/text")
            .with_timeout(Duration::from_secs(3));
        assert_eq!(config.endpoint, "http://127.0.0.1:9/v3/text");
        assert_eq!(config.timeout, Duration::from_secs(3));
    }
}
