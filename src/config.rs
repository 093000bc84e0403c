//! Configuration types for kontext-client

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Environment variable holding the API credential
pub const API_KEY_ENV: &str = "KONTEXT_API_KEY";

/// Main configuration for [`KontextClient`](crate::KontextClient)
///
/// All fields have sensible defaults except the API credential, which must be
/// supplied by the caller or sourced from the environment via
/// [`Config::from_env`]. The credential is a deployment secret and is never
/// embedded in the library.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Bearer credential attached to every request (default: empty, must be set)
    #[serde(default)]
    pub api_key: String,

    /// Base URL of the generation API (default: the public Kontext endpoint)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// URL of the file-stream upload endpoint
    #[serde(default = "default_upload_url")]
    pub upload_url: String,

    /// Remote directory uploads are stored under (default: "images/user-uploads")
    #[serde(default = "default_upload_path")]
    pub upload_path: String,

    /// Base URL that non-absolute source references resolve against
    ///
    /// Catalog filenames are resolved to `{asset_base_url}/images/paintings/{filename}`.
    /// When `None`, only absolute source URLs are accepted.
    #[serde(default)]
    pub asset_base_url: Option<String>,

    /// Delay between consecutive status queries (default: 3 seconds)
    #[serde(default = "default_poll_interval", with = "duration_serde")]
    pub poll_interval: Duration,

    /// Wall-clock ceiling for one poll loop (default: 5 minutes)
    #[serde(default = "default_poll_timeout", with = "duration_serde")]
    pub poll_timeout: Duration,

    /// Timeout for a single HTTP request (default: 30 seconds)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,

    /// Maximum accepted upload size in bytes (default: 10 MiB)
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            upload_url: default_upload_url(),
            upload_path: default_upload_path(),
            asset_base_url: None,
            poll_interval: default_poll_interval(),
            poll_timeout: default_poll_timeout(),
            request_timeout: default_request_timeout(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl Config {
    /// Build a configuration from environment variables
    ///
    /// Reads the credential from `KONTEXT_API_KEY` (required) and optional
    /// overrides from `KONTEXT_BASE_URL`, `KONTEXT_UPLOAD_URL` and
    /// `KONTEXT_ASSET_BASE_URL`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| Error::Config {
            message: format!("{API_KEY_ENV} is not set"),
            key: Some("api_key".to_string()),
        })?;

        let mut config = Config {
            api_key,
            ..Default::default()
        };
        if let Ok(base_url) = std::env::var("KONTEXT_BASE_URL") {
            config.base_url = base_url;
        }
        if let Ok(upload_url) = std::env::var("KONTEXT_UPLOAD_URL") {
            config.upload_url = upload_url;
        }
        if let Ok(asset_base_url) = std::env::var("KONTEXT_ASSET_BASE_URL") {
            config.asset_base_url = Some(asset_base_url);
        }
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration, returning the first problem found
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(Error::Config {
                message: "api_key must not be empty".to_string(),
                key: Some("api_key".to_string()),
            });
        }
        Url::parse(&self.base_url).map_err(|e| Error::Config {
            message: format!("base_url is not a valid URL: {e}"),
            key: Some("base_url".to_string()),
        })?;
        Url::parse(&self.upload_url).map_err(|e| Error::Config {
            message: format!("upload_url is not a valid URL: {e}"),
            key: Some("upload_url".to_string()),
        })?;
        if let Some(asset_base_url) = &self.asset_base_url {
            Url::parse(asset_base_url).map_err(|e| Error::Config {
                message: format!("asset_base_url is not a valid URL: {e}"),
                key: Some("asset_base_url".to_string()),
            })?;
        }
        if self.poll_interval.is_zero() {
            return Err(Error::Config {
                message: "poll_interval must be greater than zero".to_string(),
                key: Some("poll_interval".to_string()),
            });
        }
        if self.poll_timeout < self.poll_interval {
            return Err(Error::Config {
                message: "poll_timeout must be at least poll_interval".to_string(),
                key: Some("poll_timeout".to_string()),
            });
        }
        if self.max_upload_bytes == 0 {
            return Err(Error::Config {
                message: "max_upload_bytes must be greater than zero".to_string(),
                key: Some("max_upload_bytes".to_string()),
            });
        }
        Ok(())
    }
}

fn default_base_url() -> String {
    "https://api.kie.ai/api/v1/flux/kontext".to_string()
}

fn default_upload_url() -> String {
    "https://kieai.redpandaai.co/api/file-stream-upload".to_string()
}

fn default_upload_path() -> String {
    "images/user-uploads".to_string()
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(3)
}

fn default_poll_timeout() -> Duration {
    Duration::from_secs(300)
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_max_upload_bytes() -> u64 {
    10 * 1024 * 1024
}

// Duration serialization helper (seconds as u64)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        Config {
            api_key: "test-key".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn default_config_has_documented_timings() {
        let config = Config::default();
        assert_eq!(config.poll_interval, Duration::from_secs(3));
        assert_eq!(config.poll_timeout, Duration::from_secs(300));
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn validate_rejects_empty_api_key() {
        let config = Config::default();
        let err = config.validate().unwrap_err();
        match err {
            Error::Config { key, .. } => assert_eq!(key.as_deref(), Some("api_key")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn validate_rejects_bad_urls() {
        let mut config = valid_config();
        config.base_url = "not a url".to_string();
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.asset_base_url = Some("also not a url".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_interval() {
        let mut config = valid_config();
        config.poll_interval = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_timeout_below_interval() {
        let mut config = valid_config();
        config.poll_timeout = Duration::from_secs(1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_accepts_defaults_with_key() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn config_deserializes_durations_as_seconds() {
        let config: Config =
            serde_json::from_str(r#"{"api_key":"k","poll_interval":1,"poll_timeout":60}"#).unwrap();
        assert_eq!(config.poll_interval, Duration::from_secs(1));
        assert_eq!(config.poll_timeout, Duration::from_secs(60));
        assert_eq!(config.base_url, default_base_url());
    }
}
