use anyhow::{anyhow, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info, warn};

use crate::config::{Config, RenderStyle};
use crate::error::FetchError;
use crate::fetcher::Fetcher;
use crate::listing;
use crate::problem::{ProblemId, FIRST_ID};
use crate::render::markup::has_samples;
use crate::render::template::{Page, Template};
use crate::render::{html, render_problem};
use crate::store::Store;

/// Which ids a crawl visits.
#[derive(Debug, Clone)]
pub enum CrawlPlan {
    /// `count` ids after the highest one on disk.
    Continue { count: u32 },
    /// `count` ids starting at the first problem.
    FromHead { count: u32 },
    /// An explicit list (single id, range or comma list).
    Ids(Vec<ProblemId>),
}

impl CrawlPlan {
    pub fn resolve(&self, store: &Store) -> Result<Vec<ProblemId>> {
        let run = |start: u32, count: u32| -> Vec<ProblemId> {
            (start..start.saturating_add(count)).map(ProblemId::new).collect()
        };
        Ok(match self {
            CrawlPlan::Continue { count } => {
                let last = store.last_id()?;
                let start = last
                    .number()
                    .checked_add(1)
                    .ok_or_else(|| anyhow!("No problem ids left after {}", last))?;
                run(start, *count)
            }
            CrawlPlan::FromHead { count } => run(FIRST_ID, *count),
            CrawlPlan::Ids(ids) => ids.clone(),
        })
    }

    /// Batch crawls pause after every request, explicit lists only between.
    fn pause_after_last(&self) -> bool {
        !matches!(self, CrawlPlan::Ids(_))
    }
}

#[derive(Debug)]
pub enum Outcome {
    Saved { has_samples: bool },
    NotFound(FetchError),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CrawlStats {
    pub total: usize,
    pub ok: usize,
    pub skipped: usize,
    pub with_samples: usize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RefreshStats {
    pub refreshed: usize,
    pub failed: usize,
}

/// Fetch → extract → render → compose → save, over a problem directory.
pub struct Archive {
    config: Config,
    store: Store,
    template: Template,
    fetcher: Fetcher,
}

impl Archive {
    /// Loads the page template once for the whole run.
    pub fn open(config: Config) -> Result<Self> {
        let store = Store::new(&config.problem_dir);
        let template = Template::load(&config.template_path())?;
        let fetcher = Fetcher::new(&config)?;
        Ok(Self {
            config,
            store,
            template,
            fetcher,
        })
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Fetch one problem and write its files. A fetch failure touches nothing
    /// on disk; only a write failure is an `Err`.
    pub async fn crawl_one(&self, id: ProblemId) -> Result<Outcome> {
        let problem = match self.fetcher.fetch_problem(id).await {
            Ok(problem) => problem,
            Err(e) => return Ok(Outcome::NotFound(e)),
        };

        let rendered = render_problem(&problem, self.config.render_style);
        let canonical = self.config.canonical_url(problem.id);
        let page = self.template.compose(&Page {
            canonical_url: &canonical,
            title: &problem.title,
            article: &rendered.fragment,
        });
        self.store.save(problem.id, &rendered.document, &page)?;

        Ok(Outcome::Saved {
            has_samples: has_samples(&rendered.document),
        })
    }

    /// Sequential crawl with a fixed pause between requests, then rebuild the
    /// listing page.
    pub async fn crawl(&self, plan: &CrawlPlan) -> Result<CrawlStats> {
        let ids = plan.resolve(&self.store)?;
        let mut stats = CrawlStats {
            total: ids.len(),
            ..Default::default()
        };
        if let (Some(first), Some(last)) = (ids.first(), ids.last()) {
            info!("Crawling {} problems ({}..={})", ids.len(), first, last);
        }

        let pb = progress_bar(ids.len());
        for (i, &id) in ids.iter().enumerate() {
            pb.set_message(id.to_string());
            match self.crawl_one(id).await {
                Ok(Outcome::Saved { has_samples }) => {
                    stats.ok += 1;
                    if has_samples {
                        stats.with_samples += 1;
                    } else {
                        info!("{} saved without samples", id);
                    }
                }
                Ok(Outcome::NotFound(e)) => {
                    stats.skipped += 1;
                    warn!("Skipping {}: {}", id, e);
                }
                Err(e) => {
                    stats.skipped += 1;
                    error!("Failed to save {}: {:#}", id, e);
                }
            }
            pb.inc(1);

            let is_last = i + 1 == ids.len();
            if !is_last || plan.pause_after_last() {
                tokio::time::sleep(self.config.request_delay).await;
            }
        }
        pb.finish_and_clear();

        self.write_listing()?;
        Ok(stats)
    }

    /// Re-render every saved `index.md` without fetching, then rebuild the
    /// listing page. One broken problem does not stop the run.
    pub fn refresh(&self) -> Result<RefreshStats> {
        let ids: Vec<ProblemId> = self
            .store
            .index()?
            .into_iter()
            .filter(|id| self.store.has_markup(*id))
            .collect();
        info!("Refreshing {} problems", ids.len());

        let mut stats = RefreshStats::default();
        let pb = progress_bar(ids.len());
        for id in ids {
            pb.set_message(id.to_string());
            match self.refresh_one(id) {
                Ok(()) => stats.refreshed += 1,
                Err(e) => {
                    stats.failed += 1;
                    error!("Failed to refresh {}: {:#}", id, e);
                }
            }
            pb.inc(1);
        }
        pb.finish_and_clear();

        self.write_listing()?;
        Ok(stats)
    }

    fn refresh_one(&self, id: ProblemId) -> Result<()> {
        let saved = self.store.read_markup(id)?;
        let fragment = html::render(&saved.body, RenderStyle::Guarded);
        let canonical = self.config.canonical_url(id);
        let page = self.template.compose(&Page {
            canonical_url: &canonical,
            title: &saved.title,
            article: &fragment,
        });
        self.store.save_page(id, &page)
    }

    pub fn write_listing(&self) -> Result<usize> {
        let path = listing::write_listing(&self.store, &self.template, &self.config)?;
        info!("Listing page written to {}", path.display());
        Ok(self.store.index()?.len())
    }
}

fn progress_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    if let Ok(style) =
        ProgressStyle::default_bar().template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg} (eta {eta})")
    {
        pb.set_style(style.progress_chars("=> "));
    }
    pb
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::fetcher::tests::{config_for, serve};
    use crate::parser::tests::fixture;

    #[tokio::test]
    async fn http_404_leaves_disk_untouched() {
        let addr = serve("404 Not Found", String::new()).await;
        let dir = tempfile::tempdir().unwrap();
        let archive = Archive::open(config_for(addr, dir.path())).unwrap();
        let id = ProblemId::new(1000);

        let outcome = archive.crawl_one(id).await.unwrap();
        assert!(matches!(outcome, Outcome::NotFound(FetchError::Status(_))));
        assert!(!archive.store().problem_dir(id).exists());
    }

    #[tokio::test]
    async fn crawl_saves_markup_and_page() {
        let addr = serve("200 OK", fixture("p1000_structured.html")).await;
        let dir = tempfile::tempdir().unwrap();
        let archive = Archive::open(config_for(addr, dir.path())).unwrap();
        let id = ProblemId::new(1000);

        let stats = archive.crawl(&CrawlPlan::Ids(vec![id])).await.unwrap();
        assert_eq!(
            stats,
            CrawlStats {
                total: 1,
                ok: 1,
                skipped: 0,
                with_samples: 1
            }
        );

        let problem_dir = archive.store().problem_dir(id);
        let md = fs::read_to_string(problem_dir.join("index.md")).unwrap();
        assert!(md.starts_with("# P1000 Sum of Two Numbers\n\n## 题目描述"));
        assert!(md.contains("#### 样例输入 #1\n\n```\n1 2\n```"));
        assert!(md.contains("#### 样例输出 #1\n\n```\n3\n```"));
        assert!(!md.contains("题目背景"));

        let page = fs::read_to_string(problem_dir.join("index.html")).unwrap();
        assert!(page.contains("<title>P1000 Sum of Two Numbers</title>"));
        assert!(page.contains("https://example.test/problem/P1000/"));
        assert!(page.contains("<pre><code>1 2\n</code></pre>"));

        let list = fs::read_to_string(dir.path().join("problem/list/index.html")).unwrap();
        assert!(list.contains("\"id\":\"P1000\""));
    }

    #[tokio::test]
    async fn continue_plan_starts_after_last_saved() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());
        fs::create_dir_all(dir.path().join("P1041")).unwrap();

        let ids = CrawlPlan::Continue { count: 3 }.resolve(&store).unwrap();
        assert_eq!(ids.first(), Some(&ProblemId::new(1042)));
        assert_eq!(ids.len(), 3);

        let ids = CrawlPlan::FromHead { count: 2 }.resolve(&store).unwrap();
        assert_eq!(ids, vec![ProblemId::new(1000), ProblemId::new(1001)]);

        let empty = Store::new(dir.path().join("none"));
        let ids = CrawlPlan::Continue { count: 1 }.resolve(&empty).unwrap();
        assert_eq!(ids, vec![ProblemId::new(1000)]);
    }

    #[test]
    fn continue_after_highest_possible_id_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());
        fs::create_dir_all(dir.path().join(format!("P{}", u32::MAX))).unwrap();

        let err = CrawlPlan::Continue { count: 1 }.resolve(&store).unwrap_err();
        assert!(err.to_string().contains("P4294967295"));
    }

    #[tokio::test]
    async fn http_404_keeps_existing_files() {
        let addr = serve("404 Not Found", String::new()).await;
        let dir = tempfile::tempdir().unwrap();
        let archive = Archive::open(config_for(addr, dir.path())).unwrap();
        let id = ProblemId::new(1000);
        let problem_dir = archive.store().problem_dir(id);
        fs::create_dir_all(&problem_dir).unwrap();
        fs::write(problem_dir.join("index.md"), "# P1000 Kept\n\nold body\n").unwrap();
        fs::write(problem_dir.join("index.html"), "<title>P1000 Kept</title>").unwrap();

        let outcome = archive.crawl_one(id).await.unwrap();
        assert!(matches!(outcome, Outcome::NotFound(FetchError::Status(_))));
        assert_eq!(
            fs::read(problem_dir.join("index.md")).unwrap(),
            b"# P1000 Kept\n\nold body\n"
        );
        assert_eq!(
            fs::read(problem_dir.join("index.html")).unwrap(),
            b"<title>P1000 Kept</title>"
        );
    }

    #[test]
    fn refresh_rewrites_pages_and_skips_broken() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::for_root(dir.path());
        let root = config.problem_dir.clone();

        let good = root.join("P1001");
        fs::create_dir_all(&good).unwrap();
        fs::write(
            good.join("index.md"),
            "# P1001 A+B Problem\n\n## 输入输出样例\n\n```\n20  30\n```\n",
        )
        .unwrap();
        fs::write(good.join("index.html"), "stale").unwrap();

        // markup that is not UTF-8 cannot be read
        let bad = root.join("P1002");
        fs::create_dir_all(&bad).unwrap();
        fs::write(bad.join("index.md"), [0xff, 0xfe, 0x00]).unwrap();

        // no markup at all: not part of the refresh
        fs::create_dir_all(root.join("P1003")).unwrap();

        let archive = Archive::open(config).unwrap();
        let stats = archive.refresh().unwrap();
        assert_eq!(stats, RefreshStats { refreshed: 1, failed: 1 });

        let page = fs::read_to_string(good.join("index.html")).unwrap();
        assert!(page.contains("<title>P1001 A+B Problem</title>"));
        assert!(page.contains("<pre class=\"hljs\"><code class=\"hljs\">20&nbsp;&nbsp;30</code></pre>"));

        let first = page.clone();
        archive.refresh().unwrap();
        assert_eq!(fs::read_to_string(good.join("index.html")).unwrap(), first);

        assert!(root.join("list/index.html").exists());
    }
}
