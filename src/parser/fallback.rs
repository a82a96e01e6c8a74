use std::sync::LazyLock;

use htmd::options::{CodeBlockStyle, HeadingStyle, Options};
use htmd::HtmlToMarkdown;
use scraper::{Html, Selector};
use tracing::warn;

use crate::problem::{compose_title, Body, Problem, ProblemId};

static ANY_H1: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1").unwrap());
static ARTICLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("article").unwrap());

/// Scrape the rendered page: title from the `<h1>` tagged with the id (or the
/// first `<h1>`), body from `<article>` converted to Markdown.
pub fn extract(id: ProblemId, document: &Html) -> Option<Problem> {
    let article = document.select(&ARTICLE).next()?;

    let title = find_title(id, document)
        .map(|name| compose_title(id, &name))
        .unwrap_or_else(|| id.to_string());

    let markup = match html_to_markdown(&article.html()) {
        Ok(md) => md,
        Err(e) => {
            warn!("{}: markdown conversion failed: {}", id, e);
            return None;
        }
    };

    Some(Problem {
        id,
        title,
        body: Body::Markup(markup),
    })
}

fn find_title(id: ProblemId, document: &Html) -> Option<String> {
    let tagged = Selector::parse(&format!("h1[id=\"{}\"]", id)).ok();
    let heading = tagged
        .as_ref()
        .and_then(|sel| document.select(sel).next())
        .or_else(|| document.select(&ANY_H1).next())?;

    let text = heading.text().collect::<String>().trim().to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Generic HTML to Markdown with `#` headings and fenced code.
pub fn html_to_markdown(html: &str) -> std::io::Result<String> {
    let converter = HtmlToMarkdown::builder()
        .options(Options {
            heading_style: HeadingStyle::Atx,
            code_block_style: CodeBlockStyle::Fenced,
            ..Default::default()
        })
        .build();
    converter.convert(html)
}

// ── Tests ──
