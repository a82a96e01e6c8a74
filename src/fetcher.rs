use std::time::Instant;

use anyhow::Result;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, REFERER, USER_AGENT};
use reqwest::StatusCode;
use tracing::debug;

use crate::config::Config;
use crate::error::FetchError;
use crate::parser;
use crate::problem::{Problem, ProblemId};

const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
const SITE_REFERER: &str = "https://www.luogu.com.cn/";
const LANGUAGE: &str = "zh-CN,zh;q=0.9";

/// Plain HTTP client for problem pages. One request at a time, no retries.
pub struct Fetcher {
    client: reqwest::Client,
    base_url: String,
    use_structured_data: bool,
}

impl Fetcher {
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(REFERER, HeaderValue::from_static(SITE_REFERER));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(LANGUAGE));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            use_structured_data: config.use_structured_data,
        })
    }

    /// Raw page body; anything but 200 is an error.
    pub async fn fetch_page(&self, id: ProblemId) -> Result<String, FetchError> {
        let url = format!("{}{}", self.base_url, id);
        let start = Instant::now();
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status(status));
        }
        let body = response.text().await?;
        debug!(
            "GET {} -> {} ({} bytes, {} ms)",
            url,
            status,
            body.len(),
            start.elapsed().as_millis()
        );
        Ok(body)
    }

    /// Fetch and extract one problem.
    pub async fn fetch_problem(&self, id: ProblemId) -> Result<Problem, FetchError> {
        let page = self.fetch_page(id).await?;
        parser::extract(id, &page, self.use_structured_data).ok_or(FetchError::MissingContent)
    }
}
