#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),
    #[error("no problem content on page")]
    MissingContent,
}

/// Why the embedded JSON could not be used. Never surfaced past the
/// extractor, which falls back to scraping instead.
#[derive(Debug, thiserror::Error)]
pub enum StructuredDataError {
    #[error("no lentille-context script on page")]
    Missing,
    #[error("malformed context JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("context JSON has no problem content")]
    NoProblem,
}
