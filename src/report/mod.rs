//! JSON artifacts describing the archive: daily statistics, seasonal theme
//! and the daily problem recommendation.

pub mod recommend;
pub mod stats;
pub mod theme;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use crate::problem::ProblemId;
use crate::render::markup;
use crate::store::Store;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const HINT_KEYWORDS: [(&str, &[&str]); 4] = [
    ("NOIP", &["NOIP"]),
    ("DP", &["动态规划", "DP"]),
    ("图论", &["图论"]),
    ("数学", &["数学"]),
];

/// What the reports know about one saved problem, read from its `index.md`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProblemFeatures {
    #[serde(skip)]
    pub number: u32,
    pub id: String,
    pub title: String,
    pub has_samples: bool,
    pub has_math: bool,
    pub is_interactive: bool,
    /// Characters in the whole document.
    pub length: usize,
    pub difficulty_hints: Vec<String>,
}

impl ProblemFeatures {
    pub fn from_document(id: ProblemId, text: &str) -> Self {
        let (title, _) = markup::split_document(text);
        let difficulty_hints = HINT_KEYWORDS
            .iter()
            .filter(|(_, words)| words.iter().any(|w| text.contains(w)))
            .map(|(hint, _)| hint.to_string())
            .collect();

        Self {
            number: id.number(),
            id: id.to_string(),
            title: title.unwrap_or_else(|| id.to_string()),
            has_samples: markup::has_samples(text),
            has_math: text.contains('$') || text.contains("\\("),
            is_interactive: text.contains("交互"),
            length: text.chars().count(),
            difficulty_hints,
        }
    }
}

/// Features of every problem with an `index.md`, in id order. Unreadable
/// documents are logged and left out.
pub fn scan(store: &Store) -> Result<Vec<ProblemFeatures>> {
    let mut features = Vec::new();
    for id in store.index()? {
        if !store.has_markup(id) {
            continue;
        }
        match store.read_markup_raw(id) {
            Ok(text) => features.push(ProblemFeatures::from_document(id, &text)),
            Err(e) => warn!("Skipping {} in reports: {:#}", id, e),
        }
    }
    Ok(features)
}

/// Pretty-print `value` to `<dir>/<name>`, creating `dir` if needed.
pub fn write_json<T: Serialize>(dir: &Path, name: &str, value: &T) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    let path = dir.join(name);
    let json = serde_json::to_string_pretty(value)?;
    fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Wrote {}", path.display());
    Ok(path)
}

// ── Tests ──

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Write `index.md` for each `(number, document)` pair under `store`.
    pub(crate) fn seed(store: &Store, docs: &[(u32, &str)]) {
        for (number, doc) in docs {
            let dir = store.problem_dir(ProblemId::new(*number));
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join("index.md"), doc).unwrap();
        }
    }

    #[test]
    fn features_from_document() {
        let doc = "# P1005 矩阵取数游戏\n\n## 题目描述\n\nNOIP 2007，动态规划，$n \\le 80$\n\n## 输入输出样例\n\n```\n1\n```\n";
        let f = ProblemFeatures::from_document(ProblemId::new(1005), doc);
        assert_eq!(f.id, "P1005");
        assert_eq!(f.title, "P1005 矩阵取数游戏");
        assert!(f.has_samples);
        assert!(f.has_math);
        assert!(!f.is_interactive);
        assert_eq!(f.length, doc.chars().count());
        assert_eq!(f.difficulty_hints, vec!["NOIP", "DP"]);
    }

    #[test]
    fn untitled_document_uses_id() {
        let f = ProblemFeatures::from_document(ProblemId::new(1010), "这是一道交互题");
        assert_eq!(f.title, "P1010");
        assert!(f.is_interactive);
        assert!(!f.has_math);
        assert!(f.difficulty_hints.is_empty());
    }

    #[test]
    fn scan_skips_dirs_without_markup() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());
        seed(&store, &[(1002, "# P1002 B\n\nb\n"), (1000, "# P1000 A\n\na\n")]);
        fs::create_dir_all(dir.path().join("P1001")).unwrap();

        let ids: Vec<String> = scan(&store).unwrap().into_iter().map(|f| f.id).collect();
        assert_eq!(ids, vec!["P1000", "P1002"]);
    }

    #[test]
    fn write_json_creates_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("stats");
        let path = write_json(&out, "x.json", &serde_json::json!({"题": 1})).unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "{\n  \"题\": 1\n}");
    }
}
