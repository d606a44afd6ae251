use crate::error::{AppError, ErrorKind};
use reqwest::Url;
use std::time::Duration;

/// Backend address used when the page is served from a development host.
pub const LOOPBACK_API_URL: &str = "http://127.0.0.1:8000";

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_DISMISS_DELAY: Duration = Duration::from_secs(5);
const DEFAULT_DOWNLOAD_RESET_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: Url,
    pub request_timeout: Duration,
    /// How long an error banner stays up before reverting.
    pub dismiss_delay: Duration,
    /// How long the download button shows its outcome before resetting.
    pub download_reset_delay: Duration,
}

impl ClientConfig {
    pub fn new(api_url: Url) -> Self {
        Self {
            api_url,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            dismiss_delay: DEFAULT_DISMISS_DELAY,
            download_reset_delay: DEFAULT_DOWNLOAD_RESET_DELAY,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Join an endpoint path onto the base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url, AppError> {
        self.api_url.join(path).map_err(|e| AppError {
            kind: ErrorKind::Other,
            message: format!("Invalid endpoint {}: {}", path, e),
        })
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(Url::parse(LOOPBACK_API_URL).expect("loopback URL is valid"))
    }
}

/// Pick the backend for a page served from `origin`: development hosts talk
/// to the loopback server, anything else is same-origin.
pub fn resolve_api_url(origin: &str) -> Result<Url, AppError> {
    let origin = Url::parse(origin).map_err(|e| AppError {
        kind: ErrorKind::Other,
        message: format!("Invalid origin {}: {}", origin, e),
    })?;

    match origin.host_str() {
        Some("localhost") | Some("127.0.0.1") => Url::parse(LOOPBACK_API_URL)
            .map_err(|e| AppError::from(format!("Invalid loopback URL: {}", e))),
        _ => {
            let mut base = origin;
            base.set_path("/");
            base.set_query(None);
            base.set_fragment(None);
            Ok(base)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn development_hosts_use_loopback() {
        for origin in ["http://localhost:5500/index.html", "http://127.0.0.1:3000"] {
            let url = resolve_api_url(origin).unwrap();
            assert_eq!(url.as_str(), "http://127.0.0.1:8000/");
        }
    }

    #[test]
    fn other_hosts_are_same_origin() {
        let url = resolve_api_url("https://bins.example.org/app/?tab=stats#top").unwrap();
        assert_eq!(url.as_str(), "https://bins.example.org/");
    }

    #[test]
    fn endpoint_joins_on_base() {
        let config = ClientConfig::default();
        assert_eq!(
            config.endpoint("predict").unwrap().as_str(),
            "http://127.0.0.1:8000/predict"
        );
    }

    #[test]
    fn rejects_garbage_origin() {
        assert!(resolve_api_url("not a url").is_err());
    }
}
