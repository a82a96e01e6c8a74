use std::fs;
use std::path::PathBuf;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use scraper::{Html, Selector};

use crate::problem::{ProblemId, FIRST_ID};
use crate::render::markup;

pub const MARKUP_FILE: &str = "index.md";
pub const PAGE_FILE: &str = "index.html";

static TITLE_TAG: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());

/// A saved `index.md`, split into title and body.
#[derive(Debug, Clone)]
pub struct SavedMarkup {
    pub title: String,
    pub body: String,
}

/// One directory per problem under `root`; the directory listing is the index.
#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
}

impl Store {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn problem_dir(&self, id: ProblemId) -> PathBuf {
        self.root.join(id.to_string())
    }

    /// Write both files for a problem, replacing any previous version.
    pub fn save(&self, id: ProblemId, document: &str, page: &str) -> Result<()> {
        let dir = self.problem_dir(id);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        fs::write(dir.join(MARKUP_FILE), document)
            .with_context(|| format!("Failed to write {}/{}", dir.display(), MARKUP_FILE))?;
        self.save_page(id, page)
    }

    pub fn save_page(&self, id: ProblemId, page: &str) -> Result<()> {
        let path = self.problem_dir(id).join(PAGE_FILE);
        fs::write(&path, page).with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Sorted ids of every `P<digits>` directory on disk.
    pub fn index(&self) -> Result<Vec<ProblemId>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let entries = fs::read_dir(&self.root)
            .with_context(|| format!("Failed to list {}", self.root.display()))?;

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            if let Some(id) = entry.file_name().to_str().and_then(ProblemId::from_dir_name) {
                ids.push(id);
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// Highest id on disk, or the one just before the first problem.
    pub fn last_id(&self) -> Result<ProblemId> {
        Ok(self
            .index()?
            .last()
            .copied()
            .unwrap_or(ProblemId::new(FIRST_ID - 1)))
    }

    pub fn has_markup(&self, id: ProblemId) -> bool {
        self.problem_dir(id).join(MARKUP_FILE).is_file()
    }

    pub fn read_markup(&self, id: ProblemId) -> Result<SavedMarkup> {
        let path = self.problem_dir(id).join(MARKUP_FILE);
        let text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let (title, body) = markup::split_document(&text);
        Ok(SavedMarkup {
            title: title.unwrap_or_else(|| id.to_string()),
            body,
        })
    }

    pub fn read_markup_raw(&self, id: ProblemId) -> Result<String> {
        let path = self.problem_dir(id).join(MARKUP_FILE);
        fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))
    }

    /// Text of the `<title>` element of a saved page, if any.
    pub fn page_title(&self, id: ProblemId) -> Result<Option<String>> {
        let path = self.problem_dir(id).join(PAGE_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let page = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let document = Html::parse_document(&page);
        Ok(document
            .select(&TITLE_TAG)
            .next()
            .map(|t| t.text().collect::<String>().trim().to_string()))
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_is_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        for name in ["P1010", "P1002", "P999", "list", "Pabc"] {
            fs::create_dir_all(root.join(name)).unwrap();
        }
        fs::write(root.join("P2000"), "a file, not a problem").unwrap();

        let store = Store::new(root);
        let ids: Vec<String> = store.index().unwrap().iter().map(|i| i.to_string()).collect();
        assert_eq!(ids, vec!["P999", "P1002", "P1010"]);
        assert_eq!(store.last_id().unwrap(), ProblemId::new(1010));
    }

    #[test]
    fn empty_or_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("nothing-here"));
        assert!(store.index().unwrap().is_empty());
        assert_eq!(store.last_id().unwrap(), ProblemId::new(999));
    }

    #[test]
    fn save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());
        let id = ProblemId::new(1000);

        store.save(id, "# P1000 Old\n\nold\n", "<title>P1000 Old</title>").unwrap();
        store.save(id, "# P1000 New\n\nnew\n", "<title>P1000 New</title>").unwrap();

        let saved = store.read_markup(id).unwrap();
        assert_eq!(saved.title, "P1000 New");
        assert_eq!(saved.body, "new\n");
        assert_eq!(store.page_title(id).unwrap().as_deref(), Some("P1000 New"));
        assert!(store.has_markup(id));
        assert!(!store.has_markup(ProblemId::new(1001)));
    }

    #[test]
    fn page_title_missing_page() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());
        assert_eq!(store.page_title(ProblemId::new(1000)).unwrap(), None);
    }
}
