use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use super::{write_json, ProblemFeatures, DATE_FORMAT, TIMESTAMP_FORMAT};

pub const RECOMMENDATION_FILE: &str = "daily_recommendation.json";
pub const DAILY_COUNT: usize = 3;

pub const START_MARKER: &str = "<!-- 每日推荐题目开始 -->";
pub const END_MARKER: &str = "<!-- 每日推荐题目结束 -->";
pub const ACTIONS_MARKER: &str = "<!-- 操作按钮 -->";

const TAG_STYLE: &str = "padding: 0.2rem 0.5rem; border-radius: 4px; font-size: 0.8rem;";

#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub date: String,
    pub problems: Vec<ProblemFeatures>,
    pub generated_at: String,
}

/// Per-day ordering key: the same date always ranks problems the same way.
fn daily_rank(date: NaiveDate, id: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(date.format(DATE_FORMAT).to_string().as_bytes());
    hasher.update(b":");
    hasher.update(id.as_bytes());
    hasher.finalize().into()
}

/// Pick up to `count` problems: one with math, one with samples, then any
/// non-interactive ones. No problem is picked twice.
pub fn select(problems: &[ProblemFeatures], date: NaiveDate, count: usize) -> Vec<ProblemFeatures> {
    let mut ranked: Vec<&ProblemFeatures> = problems.iter().collect();
    ranked.sort_by_cached_key(|p| daily_rank(date, &p.id));

    let mut selected = Vec::new();
    let firsts: [fn(&ProblemFeatures) -> bool; 2] = [|p| p.has_math, |p| p.has_samples];
    for want in firsts {
        if selected.len() < count {
            pick(&ranked, &mut selected, want);
        }
    }
    while selected.len() < count && pick(&ranked, &mut selected, |p| !p.is_interactive) {}

    selected.into_iter().cloned().collect()
}

/// Append the best-ranked problem matching `want` that is not selected yet.
fn pick<'a>(
    ranked: &[&'a ProblemFeatures],
    selected: &mut Vec<&'a ProblemFeatures>,
    want: impl Fn(&ProblemFeatures) -> bool,
) -> bool {
    let next = ranked
        .iter()
        .copied()
        .find(|p| want(*p) && !selected.iter().any(|s| s.id == p.id));
    match next {
        Some(p) => {
            selected.push(p);
            true
        }
        None => false,
    }
}

fn tag(label: &str, background: &str, color: &str) -> String {
    format!(
        r#"<span style="background: {}; color: {}; {}">{}</span>"#,
        background,
        color,
        TAG_STYLE,
        html_escape::encode_text(label)
    )
}

/// HTML block announcing the day's picks.
pub fn snippet(problems: &[ProblemFeatures], date: NaiveDate) -> String {
    if problems.is_empty() {
        return "<p>暂无推荐题目</p>".to_string();
    }
    let today = date.format("%Y年%m月%d日");

    let mut html = format!(
        r#"
<!-- 每日推荐题目 - {today} -->
<div class="daily-recommendation" style="background: #f8f9fa; border-radius: 8px; padding: 1.5rem; margin: 2rem 0; border-left: 4px solid #28a745;">
  <h3 style="color: #28a745; margin-bottom: 1rem;">🌟 今日推荐题目 ({today})</h3>
  <div class="problem-grid" style="display: grid; gap: 1rem;">
"#
    );

    for (i, problem) in problems.iter().enumerate() {
        let mut tags = Vec::new();
        if problem.has_math {
            tags.push(tag("数学", "#e3f2fd", "#1976d2"));
        }
        if problem.is_interactive {
            tags.push(tag("交互", "#fff3e0", "#f57c00"));
        }
        if problem.has_samples {
            tags.push(tag("样例", "#e8f5e8", "#2e7d32"));
        }
        for hint in &problem.difficulty_hints {
            tags.push(tag(hint, "#fce4ec", "#c2185b"));
        }

        html.push_str(&format!(
            r#"
    <div class="recommended-problem" style="background: white; padding: 1rem; border-radius: 6px; border: 1px solid #dee2e6;">
      <div style="display: flex; justify-content: space-between; align-items: flex-start;">
        <div>
          <h4 style="margin: 0 0 0.5rem 0;">
            <a href="problem/{id}/" style="color: #2c3e50; text-decoration: none;">{title}</a>
          </h4>
          <div style="margin-top: 0.5rem;">{tags}</div>
        </div>
        <span style="background: #28a745; color: white; padding: 0.3rem 0.6rem; border-radius: 4px; font-size: 0.8rem;">推荐 #{n}</span>
      </div>
    </div>
"#,
            id = problem.id,
            title = html_escape::encode_text(&problem.title),
            tags = tags.join(" "),
            n = i + 1,
        ));
    }

    html.push_str(
        r#"
  </div>
  <p style="margin-top: 1rem; color: #6c757d; font-size: 0.9rem; text-align: center;">
    💡 每日推荐涵盖不同类型的题目
  </p>
</div>
"#,
    );
    html
}

/// Put `snippet` between the recommendation markers, or in front of the
/// action buttons when the markers are missing. `None` if neither exists.
pub fn splice(homepage: &str, snippet: &str) -> Option<String> {
    let block = format!("{}\n{}\n{}", START_MARKER, snippet, END_MARKER);

    if let (Some(start), Some(end)) = (homepage.find(START_MARKER), homepage.find(END_MARKER)) {
        if start < end {
            let tail = &homepage[end + END_MARKER.len()..];
            return Some(format!("{}{}{}", &homepage[..start], block, tail));
        }
    }

    let anchor = homepage.find(ACTIONS_MARKER)?;
    Some(format!(
        "{}{}\n\n{}",
        &homepage[..anchor],
        block,
        &homepage[anchor..]
    ))
}

/// Rewrite the recommendation block of `path` in place. Returns whether the
/// file changed.
pub fn update_homepage(path: &Path, snippet: &str) -> Result<bool> {
    if !path.exists() {
        warn!("Homepage {} not found, skipping", path.display());
        return Ok(false);
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let Some(updated) = splice(&content, snippet) else {
        warn!("No recommendation slot in {}, skipping", path.display());
        return Ok(false);
    };
    fs::write(path, updated).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Updated recommendation block in {}", path.display());
    Ok(true)
}

/// Select today's problems, optionally splice them into `homepage` and write
/// `daily_recommendation.json`.
pub fn write(
    dir: &Path,
    problems: &[ProblemFeatures],
    now: NaiveDateTime,
    homepage: Option<&Path>,
) -> Result<Recommendation> {
    let date = now.date();
    let selected = select(problems, date, DAILY_COUNT);

    if let Some(path) = homepage {
        update_homepage(path, &snippet(&selected, date))?;
    }

    let recommendation = Recommendation {
        date: date.format(DATE_FORMAT).to_string(),
        problems: selected,
        generated_at: now.format(TIMESTAMP_FORMAT).to_string(),
    };
    write_json(dir, RECOMMENDATION_FILE, &recommendation)?;
    Ok(recommendation)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::ProblemId;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 20).unwrap()
    }

    fn problem(n: u32, doc: &str) -> ProblemFeatures {
        ProblemFeatures::from_document(ProblemId::new(n), &format!("# P{} T{}\n\n{}", n, n, doc))
    }

    fn ids(selected: &[ProblemFeatures]) -> Vec<&str> {
        selected.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn picks_math_then_samples_then_others() {
        let problems = vec![
            problem(1000, "plain"),
            problem(1001, "$x$"),
            problem(1002, "## 输入输出样例\n\n```\n1\n```"),
            problem(1003, "交互"),
        ];
        let selected = select(&problems, date(), DAILY_COUNT);
        assert_eq!(selected.len(), 3);
        assert_eq!(selected[0].id, "P1001");
        assert_eq!(selected[1].id, "P1002");
        assert_eq!(selected[2].id, "P1000");
    }

    #[test]
    fn same_day_same_choice_and_no_repeats() {
        let problems: Vec<ProblemFeatures> = (1000..1030).map(|n| problem(n, "$m$")).collect();
        let first = select(&problems, date(), DAILY_COUNT);
        let again = select(&problems, date(), DAILY_COUNT);
        assert_eq!(ids(&first), ids(&again));

        let mut unique = ids(&first);
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 3);
    }

    #[test]
    fn interactive_only_archive() {
        let problems = vec![problem(1000, "交互"), problem(1001, "交互 $x$")];
        let selected = select(&problems, date(), DAILY_COUNT);
        assert_eq!(ids(&selected), vec!["P1001"]);
        assert!(select(&[], date(), DAILY_COUNT).is_empty());
    }

    #[test]
    fn snippet_lists_problems_with_tags() {
        let html = snippet(&[problem(1001, "$x$ 图论")], date());
        assert!(html.contains("2024年05月20日"));
        assert!(html.contains(r#"<a href="problem/P1001/""#));
        assert!(html.contains("P1001 T1001"));
        assert!(html.contains(">数学</span>"));
        assert!(html.contains(">图论</span>"));
        assert!(html.contains("推荐 #1"));
        assert_eq!(snippet(&[], date()), "<p>暂无推荐题目</p>");
    }

    #[test]
    fn splice_replaces_existing_block() {
        let page = format!("<body>{}\nold\n{}<footer></footer></body>", START_MARKER, END_MARKER);
        let out = splice(&page, "new").unwrap();
        assert_eq!(
            out,
            format!("<body>{}\nnew\n{}<footer></footer></body>", START_MARKER, END_MARKER)
        );
        assert_eq!(splice(&out, "new").unwrap(), out);
    }

    #[test]
    fn splice_inserts_before_actions() {
        let page = format!("<main></main>{}<div>buttons</div>", ACTIONS_MARKER);
        let out = splice(&page, "new").unwrap();
        assert_eq!(
            out,
            format!(
                "<main></main>{}\nnew\n{}\n\n{}<div>buttons</div>",
                START_MARKER, END_MARKER, ACTIONS_MARKER
            )
        );
        assert!(splice("<main></main>", "new").is_none());
    }

    #[test]
    fn homepage_and_json_written() {
        let dir = tempfile::tempdir().unwrap();
        let homepage = dir.path().join("index.html");
        fs::write(&homepage, format!("<p>hi</p>{}", ACTIONS_MARKER)).unwrap();
        let now = date().and_hms_opt(6, 0, 0).unwrap();
        let out = dir.path().join("stats");

        let rec = write(&out, &[problem(1000, "$x$")], now, Some(&homepage)).unwrap();
        assert_eq!(rec.date, "2024-05-20");
        assert!(fs::read_to_string(&homepage).unwrap().contains("P1000 T1000"));

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(out.join(RECOMMENDATION_FILE)).unwrap()).unwrap();
        assert_eq!(json["problems"][0]["id"], "P1000");
        assert_eq!(json["generated_at"], "2024-05-20 06:00:00");
        assert!(json["problems"][0].get("number").is_none());
    }

    #[test]
    fn missing_homepage_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!update_homepage(&dir.path().join("absent.html"), "x").unwrap());
    }
}
