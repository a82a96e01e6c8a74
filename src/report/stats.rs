use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use chrono::NaiveDateTime;
use serde::Serialize;

use super::{write_json, ProblemFeatures, TIMESTAMP_FORMAT};

pub const STATS_FILE: &str = "daily_stats.json";
pub const BADGES_FILE: &str = "badges.json";

const RECENT_COUNT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyStats {
    pub total_problems: usize,
    pub problems_with_samples: usize,
    /// Keyword hint → number of problems carrying it.
    pub tag_distribution: BTreeMap<String, usize>,
    /// Highest problem numbers first.
    pub recent_problems: Vec<u32>,
    pub problem_lengths: Vec<usize>,
    pub math_problems: usize,
    pub interactive_problems: usize,
    pub update_date: String,
    pub avg_problem_length: usize,
}

impl DailyStats {
    pub fn collect(problems: &[ProblemFeatures], now: NaiveDateTime) -> Self {
        let count = |pred: fn(&ProblemFeatures) -> bool| problems.iter().filter(|p| pred(p)).count();

        let mut tag_distribution = BTreeMap::new();
        for hint in problems.iter().flat_map(|p| &p.difficulty_hints) {
            *tag_distribution.entry(hint.clone()).or_insert(0) += 1;
        }

        let mut recent_problems: Vec<u32> = problems.iter().map(|p| p.number).collect();
        recent_problems.sort_unstable_by(|a, b| b.cmp(a));
        recent_problems.truncate(RECENT_COUNT);

        let problem_lengths: Vec<usize> = problems.iter().map(|p| p.length).collect();
        let avg_problem_length = match problem_lengths.len() {
            0 => 0,
            n => problem_lengths.iter().sum::<usize>() / n,
        };

        Self {
            total_problems: problems.len(),
            problems_with_samples: count(|p| p.has_samples),
            tag_distribution,
            recent_problems,
            problem_lengths,
            math_problems: count(|p| p.has_math),
            interactive_problems: count(|p| p.is_interactive),
            update_date: now.format(TIMESTAMP_FORMAT).to_string(),
            avg_problem_length,
        }
    }

    /// Share of problems with samples, e.g. `"66.7%"`.
    pub fn sample_rate(&self) -> String {
        if self.total_problems == 0 {
            return "0%".to_string();
        }
        let rate = self.problems_with_samples as f64 / self.total_problems as f64 * 100.0;
        format!("{:.1}%", rate)
    }
}

/// Short summary for README badges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Badges {
    pub total_problems: usize,
    pub problems_with_samples: usize,
    pub sample_rate: String,
    pub math_problems: usize,
    pub last_update: String,
}

impl From<&DailyStats> for Badges {
    fn from(stats: &DailyStats) -> Self {
        Self {
            total_problems: stats.total_problems,
            problems_with_samples: stats.problems_with_samples,
            sample_rate: stats.sample_rate(),
            math_problems: stats.math_problems,
            last_update: stats.update_date.clone(),
        }
    }
}

/// Write `daily_stats.json` and `badges.json` into `dir`.
pub fn write(dir: &Path, problems: &[ProblemFeatures], now: NaiveDateTime) -> Result<DailyStats> {
    let stats = DailyStats::collect(problems, now);
    write_json(dir, STATS_FILE, &stats)?;
    write_json(dir, BADGES_FILE, &Badges::from(&stats))?;
    Ok(stats)
}

// ── Tests ──
