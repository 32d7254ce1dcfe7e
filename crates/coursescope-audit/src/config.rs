use once_cell::sync::Lazy;
use regex::Regex;

use coursescope_core::StatusLabel;

use crate::course::{DEFAULT_SEMESTER_COURSE_RE, semester_course_pattern};

/// Controls how a list of patterns/values is overridden from its defaults.
#[derive(Debug, Clone, Default)]
pub enum ListOverride<T> {
    /// Use the built-in defaults.
    #[default]
    Default,
    /// Completely replace the defaults with these values.
    Replace(Vec<T>),
    /// Append these values to the defaults.
    Extend(Vec<T>),
}

impl<T: Clone> ListOverride<T> {
    /// Resolve this override against the given defaults.
    pub fn resolve(&self, defaults: &[T]) -> Vec<T> {
        match self {
            ListOverride::Default => defaults.to_vec(),
            ListOverride::Replace(v) => v.clone(),
            ListOverride::Extend(v) => {
                let mut result = defaults.to_vec();
                result.extend(v.iter().cloned());
                result
            }
        }
    }
}

/// One entry of the status keyword table.
///
/// Rules are evaluated in list order and the first one with a matching
/// keyword decides the status, so the order of the list is the tie-break.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRule {
    pub status: StatusLabel,
    keywords: Vec<String>,
}

impl StatusRule {
    pub fn new<S: AsRef<str>>(status: StatusLabel, keywords: &[S]) -> Self {
        Self {
            status,
            keywords: keywords
                .iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// `line_lower` must already be lowercased. Every keyword matches as a
    /// substring, so "ip" also fires inside "equipment".
    pub fn matches(&self, line_lower: &str) -> bool {
        self.keywords.iter().any(|kw| line_lower.contains(kw.as_str()))
    }

    /// Like [`matches`](Self::matches), but two-letter keywords ("ip", "ok")
    /// must stand alone as a token.
    pub fn matches_short_as_tokens(&self, line_lower: &str) -> bool {
        self.keywords.iter().any(|kw| {
            if kw.chars().count() <= 2 {
                line_lower
                    .split(|c: char| !c.is_alphanumeric())
                    .any(|token| token == kw)
            } else {
                line_lower.contains(kw.as_str())
            }
        })
    }
}

/// The built-in keyword table, in tie-break order.
pub fn default_status_rules() -> Vec<StatusRule> {
    vec![
        StatusRule::new(
            StatusLabel::InProgress,
            &["In Progress", "IP", "In-Progress", "CURRENT"],
        ),
        StatusRule::new(
            StatusLabel::Completed,
            &["Completed", "Satisfied", "OK", "Earned"],
        ),
        StatusRule::new(StatusLabel::Planned, &["Planned", "PLAN", "Future"]),
        StatusRule::new(
            StatusLabel::Needed,
            &["Needed", "Not Met", "Remaining", "Still Needed"],
        ),
    ]
}

static DEFAULT_IGNORE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"^Page \d+ of \d+").unwrap(),
        Regex::new(r"^Academic Audit").unwrap(),
    ]
});

/// Two-letter tokens that show up next to short numbers as flags (honors,
/// in-progress, transfer...) rather than as departments.
pub const DEFAULT_ADMIN_CODES: &[&str] = &["IP", "OK", "HN", "TR", "NC", "CR", "AU", "WD"];

/// Term prefixes used by the registrar (`FA24`, `SP23`...).
pub const DEFAULT_TERM_CODES: &[&str] = &["FA", "SP", "SU", "WS", "SS"];

/// Configuration for the audit extraction pipeline.
///
/// Use [`AuditParsingConfigBuilder`] to construct with string patterns.
#[derive(Debug, Clone)]
pub struct AuditParsingConfig {
    // ── classify.rs ──
    /// Status keyword table in tie-break order.
    pub(crate) status_rules: Vec<StatusRule>,
    /// Lines matching any of these are dropped before classification.
    pub(crate) ignore_patterns: Vec<Regex>,
    /// Two-letter keywords only match whole tokens when set.
    pub(crate) short_keywords_whole_token: bool,

    // ── course.rs ──
    /// Semester-prefixed course pattern, built from `term_codes` unless set
    /// explicitly. Must define the named groups `dept`, `num` and optionally
    /// `suffix`. `None` when there are no term codes.
    pub(crate) semester_course_re: Option<Regex>,
    /// Bare course pattern, same named groups. `None` means the built-in one.
    pub(crate) bare_course_re: Option<Regex>,
    /// Uppercase term prefixes; also rejected as departments.
    pub(crate) term_codes: Vec<String>,
    /// Uppercase administrative codes rejected before 2-digit numbers.
    pub(crate) admin_codes: Vec<String>,

    // ── extractor.rs ──
    /// Record planned/needed courses instead of dropping them.
    pub(crate) track_planned_and_needed: bool,
}

impl Default for AuditParsingConfig {
    fn default() -> Self {
        Self {
            status_rules: default_status_rules(),
            ignore_patterns: DEFAULT_IGNORE_PATTERNS.clone(),
            short_keywords_whole_token: false,
            semester_course_re: Some(DEFAULT_SEMESTER_COURSE_RE.clone()),
            bare_course_re: None,
            term_codes: DEFAULT_TERM_CODES.iter().map(|s| s.to_string()).collect(),
            admin_codes: DEFAULT_ADMIN_CODES.iter().map(|s| s.to_string()).collect(),
            track_planned_and_needed: false,
        }
    }
}

impl AuditParsingConfig {
    pub fn status_rules(&self) -> &[StatusRule] {
        &self.status_rules
    }

    pub fn track_planned_and_needed(&self) -> bool {
        self.track_planned_and_needed
    }

    /// Whether `rule` fires on the lowercased line under this config.
    pub fn rule_matches(&self, rule: &StatusRule, line_lower: &str) -> bool {
        if self.short_keywords_whole_token {
            rule.matches_short_as_tokens(line_lower)
        } else {
            rule.matches(line_lower)
        }
    }
}

/// Builder for [`AuditParsingConfig`].
///
/// Accepts string patterns that are compiled to `Regex` in [`build()`](Self::build).
/// Fails fast with `regex::Error` if any pattern is invalid.
#[derive(Debug, Clone, Default)]
pub struct AuditParsingConfigBuilder {
    status_rules: ListOverride<StatusRule>,
    ignore_patterns: ListOverride<String>,
    short_keywords_whole_token: Option<bool>,
    semester_course_re: Option<String>,
    bare_course_re: Option<String>,
    admin_codes: ListOverride<String>,
    term_codes: ListOverride<String>,
    track_planned_and_needed: Option<bool>,
}

impl AuditParsingConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Status keywords ──

    pub fn set_status_rules(mut self, rules: Vec<StatusRule>) -> Self {
        self.status_rules = ListOverride::Replace(rules);
        self
    }

    /// Append a rule after the built-in ones (it loses every tie).
    pub fn add_status_rule(mut self, rule: StatusRule) -> Self {
        match &mut self.status_rules {
            ListOverride::Extend(v) | ListOverride::Replace(v) => v.push(rule),
            ListOverride::Default => self.status_rules = ListOverride::Extend(vec![rule]),
        }
        self
    }

    /// Require two-letter keywords to stand alone as a token. Off by default.
    pub fn short_keywords_whole_token(mut self, whole_token: bool) -> Self {
        self.short_keywords_whole_token = Some(whole_token);
        self
    }

    // ── Ignore patterns ──

    pub fn set_ignore_patterns(mut self, patterns: Vec<String>) -> Self {
        self.ignore_patterns = ListOverride::Replace(patterns);
        self
    }

    pub fn add_ignore_pattern(mut self, pattern: String) -> Self {
        match &mut self.ignore_patterns {
            ListOverride::Extend(v) | ListOverride::Replace(v) => v.push(pattern),
            ListOverride::Default => self.ignore_patterns = ListOverride::Extend(vec![pattern]),
        }
        self
    }

    // ── Course patterns ──

    pub fn semester_course_regex(mut self, pattern: &str) -> Self {
        self.semester_course_re = Some(pattern.to_string());
        self
    }

    pub fn bare_course_regex(mut self, pattern: &str) -> Self {
        self.bare_course_re = Some(pattern.to_string());
        self
    }

    pub fn set_admin_codes(mut self, codes: Vec<String>) -> Self {
        self.admin_codes = ListOverride::Replace(codes);
        self
    }

    pub fn add_admin_code(mut self, code: String) -> Self {
        match &mut self.admin_codes {
            ListOverride::Extend(v) | ListOverride::Replace(v) => v.push(code),
            ListOverride::Default => self.admin_codes = ListOverride::Extend(vec![code]),
        }
        self
    }

    pub fn set_term_codes(mut self, codes: Vec<String>) -> Self {
        self.term_codes = ListOverride::Replace(codes);
        self
    }

    // ── Scalars ──

    pub fn track_planned_and_needed(mut self, track: bool) -> Self {
        self.track_planned_and_needed = Some(track);
        self
    }

    /// Compile all string patterns into regexes and produce an [`AuditParsingConfig`].
    pub fn build(self) -> Result<AuditParsingConfig, regex::Error> {
        let compile = |opt: Option<String>| -> Result<Option<Regex>, regex::Error> {
            opt.map(|p| Regex::new(&p)).transpose()
        };

        let ignore_patterns = match self.ignore_patterns {
            ListOverride::Default => DEFAULT_IGNORE_PATTERNS.clone(),
            ListOverride::Replace(patterns) => patterns
                .iter()
                .map(|p| Regex::new(p))
                .collect::<Result<Vec<_>, _>>()?,
            ListOverride::Extend(patterns) => {
                let mut all = DEFAULT_IGNORE_PATTERNS.clone();
                for p in &patterns {
                    all.push(Regex::new(p)?);
                }
                all
            }
        };

        let upper = |codes: Vec<String>| -> Vec<String> {
            codes.into_iter().map(|c| c.to_ascii_uppercase()).collect()
        };
        let default_admin: Vec<String> = DEFAULT_ADMIN_CODES.iter().map(|s| s.to_string()).collect();
        let default_terms: Vec<String> = DEFAULT_TERM_CODES.iter().map(|s| s.to_string()).collect();
        let term_codes = upper(self.term_codes.resolve(&default_terms));

        let semester_course_re = match self.semester_course_re {
            Some(pattern) => Some(Regex::new(&pattern)?),
            None if term_codes.is_empty() => None,
            None => Some(Regex::new(&semester_course_pattern(term_codes.as_slice()))?),
        };

        Ok(AuditParsingConfig {
            status_rules: self.status_rules.resolve(&default_status_rules()),
            ignore_patterns,
            short_keywords_whole_token: self.short_keywords_whole_token.unwrap_or(false),
            semester_course_re,
            bare_course_re: compile(self.bare_course_re)?,
            term_codes,
            admin_codes: upper(self.admin_codes.resolve(&default_admin)),
            track_planned_and_needed: self.track_planned_and_needed.unwrap_or(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AuditParsingConfig::default();
        assert_eq!(config.status_rules.len(), 4);
        assert_eq!(config.status_rules[0].status, StatusLabel::InProgress);
        assert_eq!(config.ignore_patterns.len(), 2);
        assert!(!config.track_planned_and_needed);
    }

    #[test]
    fn test_builder_extends_ignore_patterns() {
        let config = AuditParsingConfigBuilder::new()
            .add_ignore_pattern(r"^Printed on".to_string())
            .track_planned_and_needed(true)
            .build()
            .unwrap();
        assert_eq!(config.ignore_patterns.len(), 3);
        assert!(config.track_planned_and_needed);
    }

    #[test]
    fn test_builder_invalid_regex() {
        let result = AuditParsingConfigBuilder::new()
            .add_ignore_pattern(r"[invalid".to_string())
            .build();
        assert!(result.is_err());

        let result = AuditParsingConfigBuilder::new()
            .bare_course_regex(r"(?P<dept>[A-Z")
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_term_codes_build_semester_pattern() {
        let config = AuditParsingConfigBuilder::new()
            .set_term_codes(vec!["wi".to_string()])
            .build()
            .unwrap();
        assert_eq!(config.term_codes, vec!["WI".to_string()]);
        let re = config.semester_course_re.as_ref().unwrap();
        assert!(re.is_match("WI24 CS 251"));
        assert!(!re.is_match("FA24 CS 251"));

        let default = AuditParsingConfig::default();
        let re = default.semester_course_re.as_ref().unwrap();
        assert!(re.is_match("SS22 HIST 103"));
    }

    #[test]
    fn test_builder_admin_codes_uppercased() {
        let config = AuditParsingConfigBuilder::new()
            .add_admin_code("ex".to_string())
            .build()
            .unwrap();
        assert!(config.admin_codes.contains(&"EX".to_string()));
        assert!(config.admin_codes.contains(&"IP".to_string()));
    }

    #[test]
    fn test_status_rule_short_keywords_match_substrings() {
        let rule = StatusRule::new(StatusLabel::InProgress, &["IP"]);
        assert!(rule.matches("cs 251 ip 4.0"));
        assert!(rule.matches("equipment safety"));
        assert!(rule.matches("relationship electives"));
    }

    #[test]
    fn test_status_rule_short_keywords_as_tokens() {
        let rule = StatusRule::new(StatusLabel::InProgress, &["IP"]);
        assert!(rule.matches_short_as_tokens("cs 251 ip 4.0"));
        assert!(rule.matches_short_as_tokens("(ip)"));
        assert!(!rule.matches_short_as_tokens("equipment safety"));
    }

    #[test]
    fn test_builder_short_keywords_whole_token() {
        let rule = StatusRule::new(StatusLabel::Completed, &["OK"]);
        let default = AuditParsingConfig::default();
        assert!(default.rule_matches(&rule, "handbook"));

        let strict = AuditParsingConfigBuilder::new()
            .short_keywords_whole_token(true)
            .build()
            .unwrap();
        assert!(!strict.rule_matches(&rule, "handbook"));
        assert!(strict.rule_matches(&rule, "cs 111 ok"));
    }

    #[test]
    fn test_status_rule_long_keywords_match_substrings() {
        let rule = StatusRule::new(StatusLabel::Needed, &["Still Needed"]);
        assert!(rule.matches("requirements still needed:"));
        let rule = StatusRule::new(StatusLabel::Completed, &["Completed"]);
        assert!(rule.matches("uncompleted"));
    }

    #[test]
    fn test_list_override_resolve() {
        let defaults = vec!["a".to_string(), "b".to_string()];

        let d: ListOverride<String> = ListOverride::Default;
        assert_eq!(d.resolve(&defaults), defaults);

        let r: ListOverride<String> = ListOverride::Replace(vec!["x".to_string()]);
        assert_eq!(r.resolve(&defaults), vec!["x".to_string()]);

        let e: ListOverride<String> = ListOverride::Extend(vec!["c".to_string()]);
        assert_eq!(
            e.resolve(&defaults),
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
    }
}
