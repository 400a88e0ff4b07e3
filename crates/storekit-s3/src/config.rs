//! S3 backend configuration.
//!
//! Provides [`S3Config`], the connection settings for an S3-compatible
//! backend. Values can be built in code (via the typed builder), deserialized,
//! or loaded from environment variables.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Connection settings for an S3-compatible object storage.
///
/// # Examples
///
/// ```
/// use storekit_s3::S3Config;
///
/// let config = S3Config::builder()
///     .s3_endpoint_url("http://localhost:4566".into())
///     .s3_access_key_id("test".into())
///     .s3_secret_access_key("test".into())
///     .build();
/// assert_eq!(config.region, "us-east-1");
/// assert!(config.force_path_style);
/// ```
#[derive(Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct S3Config {
    /// URL of the S3 API (e.g. `"http://localhost:4566"`).
    pub s3_endpoint_url: String,

    /// Access key id used to sign requests.
    pub s3_access_key_id: String,

    /// Secret access key used to sign requests.
    pub s3_secret_access_key: String,

    /// Optional session token for temporary credentials.
    #[builder(default)]
    #[serde(default)]
    pub s3_session_token: Option<String>,

    /// Optional AWS shared-config file with advanced client settings
    /// (retry mode, max attempts, region, ...).
    #[builder(default)]
    #[serde(default)]
    pub aws_config_ini: Option<PathBuf>,

    /// Region used for signing when the shared-config file sets none.
    #[builder(default = String::from("us-east-1"))]
    #[serde(default = "default_region")]
    pub region: String,

    /// Address buckets as `endpoint/bucket` instead of `bucket.endpoint`.
    #[builder(default = true)]
    #[serde(default = "default_force_path_style")]
    pub force_path_style: bool,

    /// Log level filter string (e.g. `"info"`, `"debug"`).
    #[builder(default = String::from("info"))]
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            s3_endpoint_url: String::from("http://localhost:4566"),
            s3_access_key_id: String::from("test"),
            s3_secret_access_key: String::from("test"),
            s3_session_token: None,
            aws_config_ini: None,
            region: default_region(),
            force_path_style: default_force_path_style(),
            log_level: default_log_level(),
        }
    }
}

// Secrets stay out of logs.
impl fmt::Debug for S3Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3Config")
            .field("s3_endpoint_url", &self.s3_endpoint_url)
            .field("s3_access_key_id", &self.s3_access_key_id)
            .field("s3_secret_access_key", &"***")
            .field(
                "s3_session_token",
                &self.s3_session_token.as_ref().map(|_| "***"),
            )
            .field("aws_config_ini", &self.aws_config_ini)
            .field("region", &self.region)
            .field("force_path_style", &self.force_path_style)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl S3Config {
    /// Load configuration from environment variables.
    ///
    /// Reads the following environment variables (falling back to defaults):
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `S3_ENDPOINT_URL` | `http://localhost:4566` |
    /// | `S3_ACCESS_KEY_ID` | `test` |
    /// | `S3_SECRET_ACCESS_KEY` | `test` |
    /// | `S3_SESSION_TOKEN` | *(unset)* |
    /// | `AWS_CONFIG_INI` | *(unset)* |
    /// | `S3_REGION` | `us-east-1` |
    /// | `S3_FORCE_PATH_STYLE` | `true` |
    /// | `LOG_LEVEL` | `info` |
    ///
    /// # Examples
    ///
    /// ```
    /// use storekit_s3::S3Config;
    ///
    /// let config = S3Config::from_env();
    /// assert!(!config.s3_endpoint_url.is_empty());
    /// ```
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("S3_ENDPOINT_URL") {
            config.s3_endpoint_url = v;
        }
        if let Ok(v) = std::env::var("S3_ACCESS_KEY_ID") {
            config.s3_access_key_id = v;
        }
        if let Ok(v) = std::env::var("S3_SECRET_ACCESS_KEY") {
            config.s3_secret_access_key = v;
        }
        if let Ok(v) = std::env::var("S3_SESSION_TOKEN") {
            config.s3_session_token = Some(v);
        }
        if let Ok(v) = std::env::var("AWS_CONFIG_INI") {
            config.aws_config_ini = Some(PathBuf::from(v));
        }
        if let Ok(v) = std::env::var("S3_REGION") {
            config.region = v;
        }
        if let Ok(v) = std::env::var("S3_FORCE_PATH_STYLE") {
            config.force_path_style = parse_bool(&v);
        }
        if let Ok(v) = std::env::var("LOG_LEVEL") {
            config.log_level = v;
        }

        config
    }
}

fn default_region() -> String {
    String::from("us-east-1")
}

fn default_force_path_style() -> bool {
    true
}

fn default_log_level() -> String {
    String::from("info")
}

/// Parse a string as a boolean, accepting `"1"` and `"true"` (case-insensitive).
fn parse_bool(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}
