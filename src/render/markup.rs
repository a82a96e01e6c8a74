use crate::problem::{Body, Sample, SectionKind, Sections};

/// Serialize sections to Markdown: one `##` heading per non-empty section in
/// fixed order, samples expanded into numbered fenced blocks.
pub fn sections_to_markup(sections: &Sections) -> String {
    let mut parts: Vec<String> = Vec::new();

    for kind in SectionKind::ORDER {
        match sections.text(kind) {
            Some(text) if !text.trim().is_empty() => {
                parts.push(format!("## {}\n\n{}", kind.heading(), text));
            }
            Some(_) => {}
            None => push_samples(&mut parts, &sections.samples),
        }
    }

    parts.join("\n\n")
}

fn push_samples(parts: &mut Vec<String>, samples: &[Sample]) {
    if samples.is_empty() {
        return;
    }
    parts.push(format!("## {}", SectionKind::Samples.heading()));
    for (i, sample) in samples.iter().enumerate() {
        let n = i + 1;
        parts.push(format!("### 样例 #{}", n));
        parts.push(format!("#### 样例输入 #{}", n));
        parts.push(fenced(&sample.input));
        parts.push(format!("#### 样例输出 #{}", n));
        parts.push(fenced(&sample.output));
    }
}

fn fenced(text: &str) -> String {
    format!("```\n{}\n```", text.trim_end())
}

pub fn body_to_markup(body: &Body) -> String {
    match body {
        Body::Sections(sections) => sections_to_markup(sections),
        Body::Markup(md) => md.trim().to_string(),
    }
}

/// Whether a saved document carries a samples section.
pub fn has_samples(markup: &str) -> bool {
    let heading = format!("## {}", SectionKind::Samples.heading());
    markup.lines().any(|line| line.trim_end() == heading)
}

/// Content of a saved `index.md`.
pub fn document(title: &str, markup: &str) -> String {
    format!("# {}\n\n{}\n", title, markup)
}

/// Split a saved `index.md` into its title line and body. The body starts on
/// the third line; a file without a `# ` title line is all body.
pub fn split_document(text: &str) -> (Option<String>, String) {
    let mut lines = text.split('\n');
    let first = lines.next().unwrap_or_default();
    match first.strip_prefix("# ") {
        Some(title) => {
            lines.next();
            let body = lines.collect::<Vec<_>>().join("\n");
            (Some(title.trim().to_string()), body)
        }
        None => (None, text.to_string()),
    }
}

// ── Tests ──
