use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, ValueEnum};

use crate::problem::ProblemId;

pub const TEMPLATE_FILE: &str = "html_template_material.html";
pub const LIST_DIR: &str = "list";

/// How saved Markdown is turned into HTML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RenderStyle {
    /// Plain CommonMark rendering, used right after a fetch.
    Standard,
    /// Fenced blocks are escaped by hand before rendering, used on refresh.
    Guarded,
}

/// Global options shared by every subcommand.
#[derive(Debug, Clone, Args)]
pub struct ConfigArgs {
    /// Directory holding one sub-directory per problem
    #[arg(long, global = true, env = "LUOGU_PROBLEM_DIR", default_value = "problem")]
    pub problem_dir: PathBuf,

    /// Directory for the JSON run reports
    #[arg(long, global = true, env = "LUOGU_STATS_DIR", default_value = "stats")]
    pub stats_dir: PathBuf,

    /// Problem page URL prefix; the id is appended
    #[arg(
        long,
        global = true,
        env = "LUOGU_BASE_URL",
        default_value = "https://www.luogu.com.cn/problem/"
    )]
    pub base_url: String,

    /// Public site root used for canonical links
    #[arg(
        long,
        global = true,
        env = "LUOGU_SITE_URL",
        default_value = "https://luogu.cb-x2-jun.run.place"
    )]
    pub site_url: String,

    /// Pause after each request, in milliseconds
    #[arg(long, global = true, env = "LUOGU_DELAY_MS", default_value = "1000")]
    pub delay_ms: u64,

    /// Per-request timeout, in seconds
    #[arg(long, global = true, env = "LUOGU_TIMEOUT_SECS", default_value = "10")]
    pub timeout_secs: u64,

    /// Skip the embedded JSON and always scrape the rendered page
    #[arg(long, global = true)]
    pub no_structured_data: bool,

    /// Renderer used for freshly fetched problems
    #[arg(long, global = true, value_enum, default_value_t = RenderStyle::Standard)]
    pub render_style: RenderStyle,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub problem_dir: PathBuf,
    pub stats_dir: PathBuf,
    pub base_url: String,
    pub site_url: String,
    pub request_delay: Duration,
    pub request_timeout: Duration,
    pub use_structured_data: bool,
    pub render_style: RenderStyle,
}

impl From<ConfigArgs> for Config {
    fn from(args: ConfigArgs) -> Self {
        Self {
            problem_dir: args.problem_dir,
            stats_dir: args.stats_dir,
            base_url: args.base_url,
            site_url: args.site_url.trim_end_matches('/').to_string(),
            request_delay: Duration::from_millis(args.delay_ms),
            request_timeout: Duration::from_secs(args.timeout_secs),
            use_structured_data: !args.no_structured_data,
            render_style: args.render_style,
        }
    }
}

impl Config {
    pub fn template_path(&self) -> PathBuf {
        self.problem_dir.join(TEMPLATE_FILE)
    }

    pub fn list_dir(&self) -> PathBuf {
        self.problem_dir.join(LIST_DIR)
    }

    pub fn canonical_url(&self, id: ProblemId) -> String {
        format!("{}/problem/{}/", self.site_url, id)
    }

    pub fn list_canonical_url(&self) -> String {
        format!("{}/problem/{}/", self.site_url, LIST_DIR)
    }

    /// Defaults rooted at `root`, for tests.
    #[cfg(test)]
    pub fn for_root(root: &std::path::Path) -> Self {
        Self {
            problem_dir: root.join("problem"),
            stats_dir: root.join("stats"),
            base_url: "https://www.luogu.com.cn/problem/".to_string(),
            site_url: "https://example.test".to_string(),
            request_delay: Duration::ZERO,
            request_timeout: Duration::from_secs(5),
            use_structured_data: true,
            render_style: RenderStyle::Standard,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_built_from_config() {
        let config = Config::for_root(std::path::Path::new("/tmp/x"));
        let id = ProblemId::new(1001);
        assert_eq!(config.canonical_url(id), "https://example.test/problem/P1001/");
        assert_eq!(config.list_canonical_url(), "https://example.test/problem/list/");
        assert_eq!(
            config.template_path(),
            std::path::Path::new("/tmp/x/problem/html_template_material.html")
        );
    }
}
