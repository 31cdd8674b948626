//! Fetches item images from the image host on behalf of the browser.

use std::time::Duration;

/// Only images on this host are proxied.
pub const ALLOWED_IMAGE_PREFIX: &str = "https://i.postimg.cc/";

/// Largest image relayed, in bytes.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("URL is not on the allowed image host")]
    Disallowed,
    #[error("image not found upstream (status {0})")]
    NotFound(reqwest::StatusCode),
    #[error("image exceeds {0} bytes")]
    TooLarge(usize),
    #[error("image fetch failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// A fetched image.
#[derive(Debug)]
pub struct ProxiedImage {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Clone)]
pub struct ImageProxy {
    http: reqwest::Client,
    allowed_prefix: String,
    max_bytes: usize,
}

impl ImageProxy {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        Self::build(timeout, ALLOWED_IMAGE_PREFIX.to_string(), MAX_IMAGE_BYTES)
    }

    fn build(
        timeout: Duration,
        allowed_prefix: String,
        max_bytes: usize,
    ) -> Result<Self, reqwest::Error> {
        // Redirects are not followed; the allow-list only vouches for the first hop
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self {
            http,
            allowed_prefix,
            max_bytes,
        })
    }

    pub fn is_allowed(&self, url: &str) -> bool {
        url.starts_with(&self.allowed_prefix)
    }

    pub async fn fetch(&self, url: &str) -> Result<ProxiedImage, ProxyError> {
        if !self.is_allowed(url) {
            return Err(ProxyError::Disallowed);
        }

        let mut response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(ProxyError::NotFound(response.status()));
        }

        if response
            .content_length()
            .is_some_and(|len| len > self.max_bytes as u64)
        {
            return Err(ProxyError::TooLarge(self.max_bytes));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/png")
            .to_string();

        // Content-Length may be absent, so the cap is also enforced while reading
        let mut bytes = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if bytes.len() + chunk.len() > self.max_bytes {
                return Err(ProxyError::TooLarge(self.max_bytes));
            }
            bytes.extend_from_slice(&chunk);
        }

        Ok(ProxiedImage {
            content_type,
            bytes,
        })
    }
}
