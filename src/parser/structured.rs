use std::sync::LazyLock;

use scraper::{Html, Selector};
use serde::Deserialize;

use crate::error::StructuredDataError;
use crate::problem::{compose_title, Body, Problem, ProblemId, Sample, Sections};

static CONTEXT_SCRIPT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("script#lentille-context").unwrap());

#[derive(Debug, Deserialize)]
struct LentilleContext {
    data: Option<ContextData>,
}

#[derive(Debug, Deserialize)]
struct ContextData {
    problem: Option<ProblemData>,
}

#[derive(Debug, Deserialize)]
struct ProblemData {
    content: Option<Content>,
    // older pages use the French key
    contenu: Option<Content>,
    #[serde(default)]
    samples: Option<Vec<Vec<Option<String>>>>,
}

#[derive(Debug, Default, Deserialize)]
struct Content {
    name: Option<String>,
    background: Option<String>,
    description: Option<String>,
    #[serde(rename = "formatI")]
    format_input: Option<String>,
    #[serde(rename = "formatO")]
    format_output: Option<String>,
    hint: Option<String>,
}

pub fn extract(id: ProblemId, document: &Html) -> Result<Problem, StructuredDataError> {
    let script = document
        .select(&CONTEXT_SCRIPT)
        .next()
        .ok_or(StructuredDataError::Missing)?;
    let raw: String = script.text().collect();
    let context: LentilleContext = serde_json::from_str(&raw)?;
    from_context(id, context)
}

fn from_context(id: ProblemId, context: LentilleContext) -> Result<Problem, StructuredDataError> {
    let problem = context
        .data
        .and_then(|d| d.problem)
        .ok_or(StructuredDataError::NoProblem)?;
    let content = problem
        .content
        .or(problem.contenu)
        .ok_or(StructuredDataError::NoProblem)?;

    let title = compose_title(id, content.name.as_deref().unwrap_or_default());

    let samples = problem
        .samples
        .unwrap_or_default()
        .into_iter()
        .map(|pair| {
            let mut halves = pair.into_iter().map(Option::unwrap_or_default);
            Sample {
                input: halves.next().unwrap_or_default(),
                output: halves.next().unwrap_or_default(),
            }
        })
        .collect();

    let sections = Sections {
        background: content.background.unwrap_or_default(),
        description: content.description.unwrap_or_default(),
        input_format: content.format_input.unwrap_or_default(),
        output_format: content.format_output.unwrap_or_default(),
        samples,
        hint: content.hint.unwrap_or_default(),
    };

    Ok(Problem {
        id,
        title,
        body: Body::Sections(sections),
    })
}

// ── Tests ──
