use std::fmt;
use std::str::FromStr;

/// Prefix shared by every problem id (`P1000`, `P1001`, ...).
pub const ID_PREFIX: &str = "P";

/// First id of the archive; a fresh crawl starts here.
pub const FIRST_ID: u32 = 1000;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseIdError {
    #[error("invalid problem id '{0}'")]
    InvalidId(String),
    #[error("invalid range '{0}', expected START-END")]
    InvalidRange(String),
    #[error("range start {0} is greater than end {1}")]
    ReversedRange(u32, u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProblemId(u32);

impl ProblemId {
    pub fn new(number: u32) -> Self {
        Self(number)
    }

    pub fn number(self) -> u32 {
        self.0
    }

    /// Parse a directory name such as `P1001`. Bare numbers are rejected.
    pub fn from_dir_name(name: &str) -> Option<Self> {
        let digits = name.strip_prefix(ID_PREFIX)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok().map(Self)
    }
}

impl fmt::Display for ProblemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", ID_PREFIX, self.0)
    }
}

impl FromStr for ProblemId {
    type Err = ParseIdError;

    /// Accepts `1098` or `P1098`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed.strip_prefix(ID_PREFIX).unwrap_or(trimmed);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseIdError::InvalidId(s.to_string()));
        }
        digits
            .parse()
            .map(Self)
            .map_err(|_| ParseIdError::InvalidId(s.to_string()))
    }
}

/// Inclusive id range given as `START-END`, e.g. `1098-1128` or `P1098-P1128`.
pub fn parse_range(s: &str) -> Result<Vec<ProblemId>, ParseIdError> {
    let (start, end) = s
        .split_once('-')
        .ok_or_else(|| ParseIdError::InvalidRange(s.to_string()))?;
    let start: ProblemId = start
        .parse()
        .map_err(|_| ParseIdError::InvalidRange(s.to_string()))?;
    let end: ProblemId = end
        .parse()
        .map_err(|_| ParseIdError::InvalidRange(s.to_string()))?;
    if start > end {
        return Err(ParseIdError::ReversedRange(start.number(), end.number()));
    }
    Ok((start.number()..=end.number()).map(ProblemId::new).collect())
}

/// Comma separated ids, e.g. `1098,P1100, 1733`.
pub fn parse_list(s: &str) -> Result<Vec<ProblemId>, ParseIdError> {
    s.split(',').map(str::parse).collect()
}

/// Title shown for a problem: the name prefixed with the id unless it already
/// starts with it.
pub fn compose_title(id: ProblemId, name: &str) -> String {
    let display = id.to_string();
    let name = name.trim();
    if name.is_empty() {
        display
    } else if name.starts_with(&display) {
        name.to_string()
    } else {
        format!("{} {}", display, name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Background,
    Description,
    InputFormat,
    OutputFormat,
    Samples,
    Hint,
}

impl SectionKind {
    /// Emission order of sections in the normalized markup.
    pub const ORDER: [SectionKind; 6] = [
        SectionKind::Background,
        SectionKind::Description,
        SectionKind::InputFormat,
        SectionKind::OutputFormat,
        SectionKind::Samples,
        SectionKind::Hint,
    ];

    pub fn heading(self) -> &'static str {
        match self {
            SectionKind::Background => "题目背景",
            SectionKind::Description => "题目描述",
            SectionKind::InputFormat => "输入格式",
            SectionKind::OutputFormat => "输出格式",
            SectionKind::Samples => "输入输出样例",
            SectionKind::Hint => "说明/提示",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sample {
    pub input: String,
    pub output: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sections {
    pub background: String,
    pub description: String,
    pub input_format: String,
    pub output_format: String,
    pub samples: Vec<Sample>,
    pub hint: String,
}

impl Sections {
    /// Text of a prose section. `None` for samples, which are structured.
    pub fn text(&self, kind: SectionKind) -> Option<&str> {
        match kind {
            SectionKind::Background => Some(&self.background),
            SectionKind::Description => Some(&self.description),
            SectionKind::InputFormat => Some(&self.input_format),
            SectionKind::OutputFormat => Some(&self.output_format),
            SectionKind::Hint => Some(&self.hint),
            SectionKind::Samples => None,
        }
    }
}

/// Statement body, either parsed into sections or already converted to
/// Markdown by the scraping fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Sections(Sections),
    Markup(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    pub id: ProblemId,
    pub title: String,
    pub body: Body,
}

// ── Tests ──
