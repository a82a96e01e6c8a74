use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::Config;
use crate::problem::ProblemId;
use crate::render::template::{Page, Template};
use crate::store::{Store, PAGE_FILE};

pub const LIST_TITLE: &str = "题目列表";
const DEFAULT_TITLE: &str = "题目";

const GRID_STYLE: &str = r#"<style>
  .problem-stats {
    text-align: center;
    margin: 2rem 0;
    padding: 1rem;
    background: linear-gradient(135deg, #f8f9ff 0%, #e9ecef 100%);
    border-radius: 8px;
    border: 1px solid #dee2e6;
  }
  .problem-stats p { margin: 0; font-size: 1.1rem; font-weight: 600; }
  .problem-grid {
    display: grid;
    grid-template-columns: repeat(auto-fill, minmax(350px, 1fr));
    gap: 1.5rem;
    margin: 2rem 0;
  }
  .problem-card {
    background: linear-gradient(135deg, #ffffff 0%, #f8f9ff 100%);
    color: #2c3e50;
    padding: 1.5rem;
    border-radius: 12px;
    text-decoration: none;
    box-shadow: 0 4px 20px rgba(0, 0, 0, 0.1);
    border: 1px solid #e1e8ed;
    transition: all 0.3s;
    display: flex;
    flex-direction: column;
    align-items: flex-start;
  }
  .problem-card:hover {
    transform: translateY(-2px);
    box-shadow: 0 8px 30px rgba(0, 0, 0, 0.15);
    border-color: #667eea;
  }
  .problem-id {
    font-weight: bold;
    font-size: 1.2rem;
    margin-bottom: 0.5rem;
    background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
    color: white;
    padding: 0.3rem 0.8rem;
    border-radius: 20px;
  }
  .problem-title { font-size: 1rem; font-weight: 500; line-height: 1.4; color: #5a6c7d; }
  @keyframes fadeInUp {
    from { opacity: 0; transform: translateY(30px); }
    to { opacity: 1; transform: translateY(0); }
  }
</style>"#;

const GRID_SCRIPT: &str = r#"
  const problemGrid = document.getElementById('problem-grid');
  const problemCountEl = document.getElementById('problem-count');
  if (problemGrid) {
    problemCountEl.textContent = `共收录 ${problemData.length} 道洛谷题目，持续更新中...`;
    problemData.forEach((problem, index) => {
      const card = document.createElement('a');
      card.className = 'problem-card';
      card.href = problem.url;
      const idElement = document.createElement('div');
      idElement.className = 'problem-id';
      idElement.textContent = problem.id;
      const titleElement = document.createElement('div');
      titleElement.className = 'problem-title';
      titleElement.textContent = problem.title;
      card.appendChild(idElement);
      card.appendChild(titleElement);
      card.style.animationDelay = `${index * 0.02}s`;
      card.style.animation = 'fadeInUp 0.6s ease-out forwards';
      problemGrid.appendChild(card);
    });
  }
"#;

/// One card on the listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingEntry {
    pub id: String,
    pub title: String,
    pub url: String,
}

impl ListingEntry {
    fn new(id: ProblemId, title: String) -> Self {
        Self {
            id: id.to_string(),
            title,
            url: format!("../{}/{}", id, PAGE_FILE),
        }
    }
}

/// Page title with the leading id (once or twice) removed.
pub fn display_title(id: ProblemId, page_title: Option<&str>) -> String {
    let Some(full) = page_title.map(str::trim) else {
        return DEFAULT_TITLE.to_string();
    };
    let id = id.to_string();
    let twice = format!("{} {} ", id, id);
    let once = format!("{} ", id);
    let title = full
        .strip_prefix(&twice)
        .or_else(|| full.strip_prefix(&once))
        .unwrap_or(full)
        .trim();

    if title.is_empty() || title == id {
        DEFAULT_TITLE.to_string()
    } else {
        title.to_string()
    }
}

pub fn collect_entries(store: &Store) -> Result<Vec<ListingEntry>> {
    let entries = store
        .index()?
        .into_iter()
        .map(|id| {
            let title = match store.page_title(id) {
                Ok(title) => display_title(id, title.as_deref()),
                Err(e) => {
                    warn!("Failed to read title of {}: {:#}", id, e);
                    DEFAULT_TITLE.to_string()
                }
            };
            ListingEntry::new(id, title)
        })
        .collect();
    Ok(entries)
}

/// Article content of the listing page: heading, counter, grid and a hidden
/// table of links for clients without JavaScript.
pub fn listing_fragment(entries: &[ListingEntry]) -> Result<String> {
    // `</` inside a script body would end the element early
    let data = serde_json::to_string(entries)?.replace("</", "<\\/");

    let rows: Vec<String> = entries
        .iter()
        .map(|e| {
            format!(
                "<tr><td><a href=\"{}\">{}</a></td></tr>",
                html_escape::encode_double_quoted_attribute(&e.url),
                html_escape::encode_text(&e.id)
            )
        })
        .collect();

    Ok(format!(
        r#"<h1>{LIST_TITLE}</h1>

<div class="problem-stats">
  <p id="problem-count">正在加载题目统计...</p>
</div>

<div id="problem-grid" class="problem-grid"></div>
<table style="display: none;">
  <thead><tr><th>题号</th></tr></thead>
  <tbody>
{rows}
  </tbody>
</table>
{GRID_STYLE}
<script>
  const problemData = {data};
{GRID_SCRIPT}</script>"#,
        rows = rows.join("\n"),
    ))
}

/// Rebuild `<problem_dir>/list/index.html` from the directories on disk.
pub fn write_listing(store: &Store, template: &Template, config: &Config) -> Result<PathBuf> {
    let entries = collect_entries(store)?;
    let fragment = listing_fragment(&entries)?;
    let canonical = config.list_canonical_url();
    let page = template.compose(&Page {
        canonical_url: &canonical,
        title: LIST_TITLE,
        article: &fragment,
    });

    let dir = config.list_dir();
    fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    let path = dir.join(PAGE_FILE);
    fs::write(&path, page).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Listed {} problems", entries.len());
    Ok(path)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_title_strips_leading_ids() {
        let id = ProblemId::new(1001);
        assert_eq!(display_title(id, Some("P1001 P1001 A+B Problem")), "A+B Problem");
        assert_eq!(display_title(id, Some("P1001 A+B Problem")), "A+B Problem");
        assert_eq!(display_title(id, Some("A+B Problem")), "A+B Problem");
        assert_eq!(display_title(id, Some("P1001")), "题目");
        assert_eq!(display_title(id, Some("  ")), "题目");
        assert_eq!(display_title(id, None), "题目");
    }

    #[test]
    fn fragment_embeds_escaped_json() {
        let entries = vec![ListingEntry::new(
            ProblemId::new(1000),
            "</script><b>x</b>".to_string(),
        )];
        let html = listing_fragment(&entries).unwrap();
        assert!(html.contains("const problemData = [{\"id\":\"P1000\""));
        assert!(html.contains("<\\/script>"));
        assert_eq!(html.matches("</script>").count(), 1);
        assert!(html.contains("<tr><td><a href=\"../P1000/index.html\">P1000</a></td></tr>"));
    }

    #[test]
    fn listing_written_under_problem_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::for_root(dir.path());
        let store = Store::new(&config.problem_dir);
        for (name, page) in [
            ("P1002", Some("<title>P1002 P1002 Knight Moves</title>")),
            ("P1000", Some("<title>P1000 Sum</title>")),
            ("P1001", None),
        ] {
            let problem = config.problem_dir.join(name);
            fs::create_dir_all(&problem).unwrap();
            if let Some(page) = page {
                fs::write(problem.join(PAGE_FILE), page).unwrap();
            }
        }

        let entries = collect_entries(&store).unwrap();
        let titles: Vec<(&str, &str)> =
            entries.iter().map(|e| (e.id.as_str(), e.title.as_str())).collect();
        assert_eq!(
            titles,
            vec![("P1000", "Sum"), ("P1001", "题目"), ("P1002", "Knight Moves")]
        );

        let path = write_listing(&store, &Template::builtin(), &config).unwrap();
        assert_eq!(path, config.problem_dir.join("list/index.html"));
        let page = fs::read_to_string(path).unwrap();
        assert!(page.contains("<title>题目列表</title>"));
        assert!(page.contains("https://example.test/problem/list/"));
        assert!(page.contains("\"url\":\"../P1002/index.html\""));
    }
}
