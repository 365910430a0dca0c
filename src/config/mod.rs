use std::collections::HashMap;
use std::env;
use std::time::Duration;

use reqwest::header::{HeaderName, HeaderValue};
use thiserror::Error;
use url::Url;

use crate::partition::{BatchSize, DEFAULT_BATCH_SIZE};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("REMOTE_WRITE_ENDPOINT is required but not set")]
    EndpointMissing,

    #[error("REMOTE_WRITE_ENDPOINT is not a valid URL: {0}")]
    EndpointInvalidUrl(String),

    #[error("REMOTE_WRITE_ENDPOINT must use http or https: {0}")]
    EndpointUnsupportedScheme(String),

    #[error("{0} has invalid value: {1}")]
    InvalidNumeric(String, String),

    #[error("REMOTE_WRITE_HEADERS has an invalid header: {0}")]
    InvalidHeader(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub endpoint: Url,
    pub timeout: Duration,
    pub batch_size: BatchSize,
    pub headers: Vec<(String, String)>,
}

impl Config {
    /// A config with defaults for everything but the endpoint.
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            timeout: Duration::from_millis(1000),
            batch_size: BatchSize::default(),
            headers: Vec::new(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let vars: HashMap<String, String> = env::vars()
            .filter(|(k, _)| k.starts_with("REMOTE_WRITE_"))
            .collect();
        Self::parse(&vars)
    }

    fn parse(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let endpoint = parse_endpoint(vars)?;
        let timeout = parse_duration_ms(vars, "REMOTE_WRITE_TIMEOUT_MS", 1000)?;
        let batch_size = parse_batch_size(vars, "REMOTE_WRITE_BATCH_SIZE")?;
        let headers = parse_headers(vars)?;

        Ok(Self {
            endpoint,
            timeout,
            batch_size,
            headers,
        })
    }
}

fn parse_endpoint(vars: &HashMap<String, String>) -> Result<Url, ConfigError> {
    let raw = vars
        .get("REMOTE_WRITE_ENDPOINT")
        .filter(|s| !s.is_empty())
        .ok_or(ConfigError::EndpointMissing)?;

    let url = Url::parse(raw).map_err(|_| ConfigError::EndpointInvalidUrl(raw.clone()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(ConfigError::EndpointUnsupportedScheme(raw.clone())),
    }
}

fn parse_duration_ms(
    vars: &HashMap<String, String>,
    name: &str,
    default_ms: u64,
) -> Result<Duration, ConfigError> {
    match vars.get(name) {
        Some(val) => {
            let ms: u64 = val
                .parse()
                .map_err(|_| ConfigError::InvalidNumeric(name.to_owned(), val.clone()))?;
            Ok(Duration::from_millis(ms))
        }
        None => Ok(Duration::from_millis(default_ms)),
    }
}

fn parse_batch_size(vars: &HashMap<String, String>, name: &str) -> Result<BatchSize, ConfigError> {
    match vars.get(name) {
        Some(val) => {
            let raw: i64 = val
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidNumeric(name.to_owned(), val.clone()))?;
            Ok(BatchSize::from_raw(raw))
        }
        None => Ok(BatchSize::Samples(DEFAULT_BATCH_SIZE)),
    }
}

fn parse_headers(vars: &HashMap<String, String>) -> Result<Vec<(String, String)>, ConfigError> {
    let Some(raw) = vars.get("REMOTE_WRITE_HEADERS").filter(|s| !s.is_empty()) else {
        return Ok(Vec::new());
    };

    let mut headers = Vec::new();
    for pair in raw.split(',') {
        let Some((k, v)) = pair.split_once('=') else {
            continue;
        };
        let k = k.trim();
        let v = v.trim();
        if k.is_empty() {
            continue;
        }
        if HeaderName::from_bytes(k.as_bytes()).is_err() || HeaderValue::from_str(v).is_err() {
            return Err(ConfigError::InvalidHeader(k.to_owned()));
        }
        headers.push((k.to_owned(), v.to_owned()));
    }
    Ok(headers)
}
