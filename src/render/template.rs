use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::{Captures, Regex};
use tracing::{info, warn};

pub const CANONICAL_URL: &str = "CANONICAL_URL_PLACEHOLDER";
pub const TITLE: &str = "TITLE_PLACEHOLDER";
pub const ARTICLE_CONTENT: &str = "ARTICLE_CONTENT_PLACEHOLDER";
pub const CSS_VARS: &str = "CSS_VARS_PLACEHOLDER";
pub const KATEX_CONFIG: &str = "KATEX_CONFIG_PLACEHOLDER";

// one pass over the template, so substituted text is never re-scanned
static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        "CANONICAL_URL_PLACEHOLDER|TITLE_PLACEHOLDER|ARTICLE_CONTENT_PLACEHOLDER|CSS_VARS_PLACEHOLDER|KATEX_CONFIG_PLACEHOLDER",
    )
    .unwrap()
});

const CSS_VARS_VALUE: &str = r#"{ --md-text-font: "Roboto"; --md-code-font: "Roboto Mono" }"#;

const KATEX_CONFIG_VALUE: &str = r#"{
          delimiters: [
            {"left":"$$","right":"$$","display":true},
            {"left":"$","right":"$","display":false},
            {"left":"\\(","right":"\\)","display":false},
            {"left":"\\[","right":"\\]","display":true}
          ],
          throwOnError: false,
          strict: false,
          trust: true
        }"#;

const BUILTIN_TEMPLATE: &str = r#"<!doctype html>
<html lang="zh-CN">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>TITLE_PLACEHOLDER</title>
  <link rel="canonical" href="CANONICAL_URL_PLACEHOLDER">
</head>
<body>
  <article class="md-content">
ARTICLE_CONTENT_PLACEHOLDER
  </article>
</body>
</html>
"#;

/// Values for one page. Empty values leave their placeholder untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct Page<'a> {
    pub canonical_url: &'a str,
    pub title: &'a str,
    pub article: &'a str,
}

#[derive(Debug, Clone)]
pub struct Template {
    source: String,
}

impl Template {
    /// Read the page template, or use the built-in one when the file is absent.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!("Template {} not found, using built-in page", path.display());
            return Ok(Self::builtin());
        }
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read template {}", path.display()))?;
        info!("Loaded template {}", path.display());
        Ok(Self { source })
    }

    pub fn builtin() -> Self {
        Self::from_source(BUILTIN_TEMPLATE)
    }

    pub fn from_source(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn compose(&self, page: &Page<'_>) -> String {
        let title = html_escape::encode_double_quoted_attribute(page.title);
        PLACEHOLDER_RE
            .replace_all(&self.source, |caps: &Captures| {
                let token = &caps[0];
                let value: &str = match token {
                    CANONICAL_URL => page.canonical_url,
                    TITLE => title.as_ref(),
                    ARTICLE_CONTENT => page.article,
                    CSS_VARS => CSS_VARS_VALUE,
                    KATEX_CONFIG => KATEX_CONFIG_VALUE,
                    _ => "",
                };
                if value.is_empty() {
                    token.to_string()
                } else {
                    value.to_string()
                }
            })
            .into_owned()
    }
}

// ── Tests ──
