mod config;
mod error;
mod fetcher;
mod listing;
mod parser;
mod pipeline;
mod problem;
mod render;
mod report;
mod store;

use std::future::Future;
use std::path::PathBuf;
use std::time::Instant;

use chrono::Local;
use clap::{Parser, Subcommand};

use config::{Config, ConfigArgs};
use pipeline::{Archive, CrawlPlan};
use problem::{ParseIdError, ProblemId};
use store::Store;

#[derive(Parser)]
#[command(name = "luogu_archive", about = "Luogu problem archiver: fetch, render and index problem pages")]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Explicit ids from a range or comma list.
#[derive(Debug, Clone)]
struct IdList(Vec<ProblemId>);

fn parse_range(s: &str) -> Result<IdList, ParseIdError> {
    problem::parse_range(s).map(IdList)
}

fn parse_list(s: &str) -> Result<IdList, ParseIdError> {
    problem::parse_list(s).map(IdList)
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl the next problems after the last one saved
    Crawl {
        /// Number of problems to fetch
        #[arg(default_value = "20")]
        count: u32,
        /// Start from P1000 instead of continuing
        #[arg(short = 'f', long)]
        from_head: bool,
    },
    /// Fetch a single problem (e.g. 1098 or P1098)
    Problem { id: ProblemId },
    /// Fetch an inclusive range (e.g. 1098-1128)
    Range {
        #[arg(value_parser = parse_range)]
        range: IdList,
    },
    /// Fetch a comma separated list (e.g. 1098,1100,1102)
    List {
        #[arg(value_parser = parse_list)]
        ids: IdList,
    },
    /// Re-render every saved problem page from its Markdown
    Refresh,
    /// Rebuild the problem listing page
    Index,
    /// Write daily statistics and badge data
    Stats,
    /// Write the theme recommended for today
    Theme,
    /// Pick today's recommended problems
    Recommend {
        /// Homepage whose recommendation block is updated
        #[arg(long)]
        homepage: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let config = Config::from(cli.config);

    let result = match until_interrupted(run(cli.command, config), tokio::signal::ctrl_c()).await {
        Some(result) => result,
        None => {
            eprintln!("\nInterrupted");
            std::process::exit(130);
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

async fn run(command: Commands, config: Config) -> anyhow::Result<()> {
    match command {
        Commands::Crawl { count, from_head } => {
            let plan = if from_head {
                CrawlPlan::FromHead { count }
            } else {
                CrawlPlan::Continue { count }
            };
            crawl(config, plan).await
        }
        Commands::Problem { id } => crawl(config, CrawlPlan::Ids(vec![id])).await,
        Commands::Range { range } => crawl(config, CrawlPlan::Ids(range.0)).await,
        Commands::List { ids } => crawl(config, CrawlPlan::Ids(ids.0)).await,
        Commands::Refresh => {
            let archive = Archive::open(config)?;
            let stats = blocking(move || archive.refresh()).await?;
            println!(
                "Refreshed {} pages ({} failed).",
                stats.refreshed, stats.failed
            );
            Ok(())
        }
        Commands::Index => {
            let archive = Archive::open(config)?;
            let (entries, total) = blocking(move || {
                let entries = listing::collect_entries(archive.store())?;
                let total = archive.write_listing()?;
                Ok((entries, total))
            })
            .await?;
            if entries.is_empty() {
                println!("No problems saved yet. Run 'crawl' first.");
            }
            for e in &entries {
                println!("{:<8} | {}", e.id, truncate(&e.title, 40));
            }
            println!("\nListed {} problems.", total);
            Ok(())
        }
        Commands::Stats => {
            let s = blocking(move || {
                let problems = report::scan(&Store::new(&config.problem_dir))?;
                report::stats::write(&config.stats_dir, &problems, Local::now().naive_local())
            })
            .await?;
            println!("Total:        {}", s.total_problems);
            println!("Samples:      {} ({})", s.problems_with_samples, s.sample_rate());
            println!("Math:         {}", s.math_problems);
            println!("Interactive:  {}", s.interactive_problems);
            println!("Avg length:   {}", s.avg_problem_length);
            Ok(())
        }
        Commands::Theme => {
            let info = report::theme::write(&config.stats_dir, Local::now().naive_local())?;
            let holidays: Vec<String> = info
                .current_holidays
                .iter()
                .map(|h| format!("{:?}", h))
                .collect();
            println!("Season:   {:?}", info.current_season);
            println!(
                "Holidays: {}",
                if holidays.is_empty() { "-".to_string() } else { holidays.join(", ") }
            );
            println!("Theme:    {:?} ({})", info.recommended_theme, info.theme_colors.primary);
            Ok(())
        }
        Commands::Recommend { homepage } => {
            let (rec, total) = blocking(move || {
                let problems = report::scan(&Store::new(&config.problem_dir))?;
                let rec = report::recommend::write(
                    &config.stats_dir,
                    &problems,
                    Local::now().naive_local(),
                    homepage.as_deref(),
                )?;
                Ok((rec, problems.len()))
            })
            .await?;
            println!("Recommended {} of {} problems for {}:", rec.problems.len(), total, rec.date);
            for (i, p) in rec.problems.iter().enumerate() {
                println!("  {}. {}", i + 1, truncate(&p.title, 60));
            }
            Ok(())
        }
    }
}

/// Resolve to `None` as soon as `interrupt` fires. The interrupt is polled
/// first, so its handler is in place before any work starts.
async fn until_interrupted<T>(
    work: impl Future<Output = T>,
    interrupt: impl Future,
) -> Option<T> {
    tokio::select! {
        biased;
        _ = interrupt => None,
        out = work => Some(out),
    }
}

/// Run filesystem-bound work off the runtime thread so the interrupt stays
/// responsive.
async fn blocking<T, F>(work: F) -> anyhow::Result<T>
where
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await?
}

async fn crawl(config: Config, plan: CrawlPlan) -> anyhow::Result<()> {
    let archive = Archive::open(config)?;
    let stats = archive.crawl(&plan).await?;
    println!(
        "Done: {}/{} saved ({} skipped), {} with samples.",
        stats.ok, stats.total, stats.skipped, stats.with_samples
    );
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

// ── Tests ──
