use std::time::Duration;

use async_trait::async_trait;

// ── Constants ────────────────────────────────────────────────────────────────

const USER_AGENT: &str = "gocomics-fetch/0.1";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_REDIRECTS: usize = 10;

const INSECURE_SSL_ENV: &str = "GOCOMICS_INSECURE_SSL";
const TIMEOUT_ENV: &str = "GOCOMICS_TIMEOUT_SECS";

// ── Error type ───────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("{0}")]
    Request(String),
}

// ── Fetcher seam ─────────────────────────────────────────────────────────────

/// Raw outcome of a GET. Status checking is left to the caller.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError>;
}

// ── Configuration ────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub connect_timeout: Duration,
    pub timeout: Duration,
    pub insecure: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: USER_AGENT.to_string(),
            connect_timeout: CONNECT_TIMEOUT,
            timeout: REQUEST_TIMEOUT,
            insecure: false,
        }
    }
}

impl FetchConfig {
    /// Reads `GOCOMICS_INSECURE_SSL=1` and `GOCOMICS_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let insecure = lookup(INSECURE_SSL_ENV).as_deref() == Some("1");
        let timeout = match lookup(TIMEOUT_ENV).map(|v| v.trim().parse::<u64>()) {
            Some(Ok(secs)) if secs > 0 => Duration::from_secs(secs),
            Some(_) => {
                tracing::warn!("ignoring invalid {}", TIMEOUT_ENV);
                REQUEST_TIMEOUT
            }
            None => REQUEST_TIMEOUT,
        };
        Self {
            insecure,
            timeout,
            ..Self::default()
        }
    }
}

// ── HTTP fetcher ─────────────────────────────────────────────────────────────

pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static(
                "text/html,application/xhtml+xml,image/*;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            reqwest::header::HeaderValue::from_static("en-US,en;q=0.9"),
        );

        let mut builder = reqwest::ClientBuilder::new()
            .connect_timeout(config.connect_timeout)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(config.user_agent.as_str())
            .default_headers(headers);

        if config.insecure {
            tracing::warn!("TLS certificate validation disabled");
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder
            .build()
            .map_err(|e| FetchError::Request(e.to_string()))?;
        Ok(Self { client })
    }

    pub fn from_env() -> Result<Self, FetchError> {
        Self::new(&FetchConfig::from_env())
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let response = self.client.get(url).send().await.map_err(request_error)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(request_error)?;
        tracing::debug!(url, status, len = body.len(), "fetched");
        Ok(FetchResponse {
            status,
            body: body.to_vec(),
        })
    }
}

fn request_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Request(format!("TimeoutError: {}", e))
    } else if e.is_connect() {
        FetchError::Request(format!("ConnectError: {}", e))
    } else {
        FetchError::Request(format!("RequestError: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> FetchConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        FetchConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_env() {
        let cfg = config(&[]);
        assert!(!cfg.insecure);
        assert_eq!(cfg.timeout, REQUEST_TIMEOUT);
        assert_eq!(cfg.connect_timeout, CONNECT_TIMEOUT);
        assert_eq!(cfg.user_agent, USER_AGENT);
    }

    #[test]
    fn insecure_only_when_set_to_one() {
        assert!(config(&[(INSECURE_SSL_ENV, "1")]).insecure);
        assert!(!config(&[(INSECURE_SSL_ENV, "true")]).insecure);
    }

    #[test]
    fn timeout_override() {
        assert_eq!(
            config(&[(TIMEOUT_ENV, " 30 ")]).timeout,
            Duration::from_secs(30)
        );
        assert_eq!(config(&[(TIMEOUT_ENV, "0")]).timeout, REQUEST_TIMEOUT);
        assert_eq!(config(&[(TIMEOUT_ENV, "soon")]).timeout, REQUEST_TIMEOUT);
    }

    #[test]
    fn client_builds_from_default_config() {
        assert!(HttpFetcher::new(&FetchConfig::default()).is_ok());
    }
}
