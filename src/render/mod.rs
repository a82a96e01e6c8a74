pub mod html;
pub mod markup;
pub mod template;

use crate::config::RenderStyle;
use crate::problem::Problem;

/// A problem ready to be written: the `index.md` text and the HTML fragment.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub document: String,
    pub fragment: String,
}

/// Sections → Markdown → HTML fragment.
pub fn render_problem(problem: &Problem, style: RenderStyle) -> Rendered {
    let markup = markup::body_to_markup(&problem.body);
    let fragment = html::render(&markup, style);
    Rendered {
        document: markup::document(&problem.title, &markup),
        fragment,
    }
}
