pub mod fallback;
pub mod structured;

use scraper::Html;
use tracing::debug;

use crate::problem::{ProblemId, Problem};

/// Two-path extraction: embedded JSON first, rendered markup second.
/// `None` means the page holds no problem.
pub fn extract(id: ProblemId, page: &str, use_structured_data: bool) -> Option<Problem> {
    let document = Html::parse_document(page);

    if use_structured_data {
        match structured::extract(id, &document) {
            Ok(problem) => return Some(problem),
            Err(e) => debug!("{}: {}, scraping rendered page", id, e),
        }
    }

    fallback::extract(id, &document)
}
