use std::time::Duration;

use reqwest::Client;
use reqwest::header::{self, HeaderMap, HeaderValue};
use tracing::{debug, info};
use url::Url;

use crate::error::FetchError;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.5";

/// Fetches page markup with browser-like headers and a bounded timeout.
#[derive(Clone)]
pub struct Hands {
    client: Client,
    timeout: Duration,
}

impl Hands {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static(ACCEPT));
        headers.insert(
            header::ACCEPT_LANGUAGE,
            HeaderValue::from_static(ACCEPT_LANGUAGE),
        );
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(Self { client, timeout })
    }

    /// GET the page and return its body text.
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let url = parse_page_url(url)?;
        info!("Fetching {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        if let Some(content_type) = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
        {
            if !is_markup(content_type) {
                return Err(FetchError::NotMarkup {
                    content_type: content_type.to_string(),
                });
            }
        }

        let body = response.text().await.map_err(|e| self.classify(e))?;
        debug!("Fetched {} bytes from {}", body.len(), url);
        Ok(body)
    }

    fn classify(&self, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout(self.timeout.as_secs())
        } else {
            FetchError::Network(e.to_string())
        }
    }
}

/// Only absolute http(s) URLs are fetched.
pub fn parse_page_url(raw: &str) -> Result<Url, FetchError> {
    let url = Url::parse(raw.trim()).map_err(|e| FetchError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(FetchError::UnsupportedScheme(other.to_string())),
    }
}

fn is_markup(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime.starts_with("text/") || mime.contains("html") || mime.contains("xml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_page_url() {
        assert!(parse_page_url("https://example.com/pricing").is_ok());
        assert!(parse_page_url("  http://example.com  ").is_ok());
        assert!(matches!(
            parse_page_url("example.com"),
            Err(FetchError::InvalidUrl { .. })
        ));
        assert!(matches!(
            parse_page_url("ftp://example.com/file"),
            Err(FetchError::UnsupportedScheme(s)) if s == "ftp"
        ));
        assert!(matches!(
            parse_page_url("file:///etc/passwd"),
            Err(FetchError::UnsupportedScheme(_))
        ));
    }

    #[test]
    fn test_is_markup() {
        assert!(is_markup("text/html; charset=utf-8"));
        assert!(is_markup("application/xhtml+xml"));
        assert!(is_markup("TEXT/PLAIN"));
        assert!(!is_markup("application/pdf"));
        assert!(!is_markup("image/png"));
        assert!(!is_markup("application/json"));
    }
}
