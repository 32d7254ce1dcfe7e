//! Line-level status classification.

use once_cell::sync::Lazy;
use regex::Regex;

use coursescope_core::StatusLabel;

use crate::config::AuditParsingConfig;

/// What a single line says about course status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSignal {
    /// A status keyword: becomes the new sticky section status.
    Keyword(StatusLabel),
    /// No keyword, but a standalone letter grade: this line reads as
    /// completed without changing the section status.
    Grade,
    /// Nothing recognizable; the line inherits the section status.
    Neutral,
}

impl LineSignal {
    /// The sticky status after this line.
    pub fn next_section(self, current: Option<StatusLabel>) -> Option<StatusLabel> {
        match self {
            LineSignal::Keyword(status) => Some(status),
            LineSignal::Grade | LineSignal::Neutral => current,
        }
    }

    /// The status this line's courses start from.
    pub fn line_status(self, current: Option<StatusLabel>) -> Option<StatusLabel> {
        match self {
            LineSignal::Keyword(status) => Some(status),
            LineSignal::Grade => Some(StatusLabel::Completed),
            LineSignal::Neutral => current,
        }
    }
}

static GRADE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[ABCDF][+-]?\b").unwrap());

/// True for page footers and boilerplate title lines.
pub fn is_ignorable(line: &str, config: &AuditParsingConfig) -> bool {
    config.ignore_patterns.iter().any(|re| re.is_match(line))
}

/// Classify one (already trimmed) line.
///
/// Rules are checked in table order; the first rule with a matching keyword
/// wins. Only when no rule fires is the grade fallback consulted.
pub fn classify_line(line: &str, config: &AuditParsingConfig) -> LineSignal {
    let lower = line.to_lowercase();
    if let Some(rule) = config
        .status_rules
        .iter()
        .find(|r| config.rule_matches(r, &lower))
    {
        return LineSignal::Keyword(rule.status);
    }
    if GRADE_RE.is_match(line) {
        return LineSignal::Grade;
    }
    LineSignal::Neutral
}
