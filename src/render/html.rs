use std::collections::HashMap;

use html_escape::encode_text;
use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag, TagEnd};

use crate::config::RenderStyle;

/// Render Markdown to an HTML fragment.
pub fn render(markup: &str, style: RenderStyle) -> String {
    match style {
        RenderStyle::Standard => render_events(markup, false),
        RenderStyle::Guarded => render_events(&isolate_fenced_blocks(markup), true),
    }
}

fn options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_MATH
}

fn render_events(markup: &str, hljs_inline: bool) -> String {
    let mut events: Vec<Event> = Parser::new_ext(markup, options())
        .map(|event| match event {
            // keep the delimiters so KaTeX auto-render finds them
            Event::InlineMath(tex) => {
                Event::InlineHtml(format!("${}$", encode_text(&*tex)).into())
            }
            Event::DisplayMath(tex) => {
                Event::InlineHtml(format!("$${}$$", encode_text(&*tex)).into())
            }
            Event::Code(code) if hljs_inline => Event::InlineHtml(
                format!("<code class=\"hljs inline\">{}</code>", encode_text(&*code)).into(),
            ),
            other => other,
        })
        .collect();

    assign_heading_ids(&mut events);

    let mut out = String::with_capacity(markup.len() * 3 / 2);
    html::push_html(&mut out, events.into_iter());
    out
}

/// Table-of-contents anchors: every heading without an explicit id gets a
/// slug of its text, suffixed `_1`, `_2`, ... on repeats.
fn assign_heading_ids(events: &mut [Event<'_>]) {
    let mut seen: HashMap<String, usize> = HashMap::new();

    for i in 0..events.len() {
        if !matches!(&events[i], Event::Start(Tag::Heading { id: None, .. })) {
            continue;
        }

        let mut text = String::new();
        for event in &events[i + 1..] {
            match event {
                Event::End(TagEnd::Heading(_)) => break,
                Event::Text(t) | Event::Code(t) => text.push_str(t),
                _ => {}
            }
        }

        let base = slugify(&text);
        let count = seen.entry(base.clone()).or_insert(0);
        let slug = if *count == 0 {
            base
        } else {
            format!("{}_{}", base, count)
        };
        *count += 1;

        if let Event::Start(Tag::Heading { id, .. }) = &mut events[i] {
            *id = Some(CowStr::from(slug));
        }
    }
}

fn slugify(text: &str) -> String {
    let mut slug = String::new();
    for c in text.trim().chars() {
        if c.is_alphanumeric() || c == '_' {
            slug.extend(c.to_lowercase());
        } else if (c.is_whitespace() || c == '-') && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_matches('-').to_string();
    if slug.is_empty() {
        "section".to_string()
    } else {
        slug
    }
}

/// Pre-pass for saved Markdown: fenced blocks are pulled out and emitted as
/// ready-made `<pre>` HTML so the renderer never touches their content.
pub fn isolate_fenced_blocks(markup: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut in_code = false;
    let mut indent = 0;
    let mut code: Vec<&str> = Vec::new();

    for line in markup.split('\n') {
        if line.trim().starts_with("```") {
            if in_code {
                out.push(pre_block(&code));
                out.push(String::new());
                code.clear();
            } else {
                indent = leading_spaces(line);
                if out.last().is_some_and(|l| !l.trim().is_empty()) {
                    out.push(String::new());
                }
            }
            in_code = !in_code;
        } else if in_code {
            // code lines lose the indentation of their opening fence
            code.push(&line[leading_spaces(line).min(indent)..]);
        } else {
            out.push(line.to_string());
        }
    }

    // unterminated fence runs to the end of the document
    if in_code {
        out.push(pre_block(&code));
        out.push(String::new());
    }

    out.join("\n")
}

fn leading_spaces(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

fn pre_block(lines: &[&str]) -> String {
    let escaped = encode_text(&lines.join("\n"))
        .replace("\\*", "*")
        .replace("\\{", "{")
        .replace("\\}", "}")
        .replace("  ", "&nbsp;&nbsp;");
    format!("<pre class=\"hljs\"><code class=\"hljs\">{}</code></pre>", escaped)
}

// ── Tests ──
