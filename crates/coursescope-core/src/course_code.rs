use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Serialize, Serializer};

/// A normalized course identifier such as `CS251` or `HON101H`.
///
/// The canonical form is uppercase with no separating space. The catalog
/// stores the spaced form (`CS 251`); [`CourseCode::spaced`] and
/// [`catalog_key`] convert between the two.
///
/// Equality, hashing and ordering all go through the canonical string, so a
/// `BTreeSet<CourseCode>` iterates in plain lexicographic order.
#[derive(Debug, Clone)]
pub struct CourseCode {
    canonical: String,
    dept_len: usize,
}

static CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z]{2,4})\s?(\d{2,3})([A-Za-z]{1,2})?$").unwrap());

impl CourseCode {
    /// Build a code from already-separated parts.
    ///
    /// Returns `None` if the parts violate the shape invariant: 2–4 letter
    /// department, 2–3 digit number, optional 1–2 letter suffix.
    pub fn new(dept: &str, number: &str, suffix: Option<&str>) -> Option<Self> {
        let suffix = suffix.unwrap_or("");
        let dept_ok = (2..=4).contains(&dept.len()) && dept.chars().all(|c| c.is_ascii_alphabetic());
        let number_ok =
            (2..=3).contains(&number.len()) && number.chars().all(|c| c.is_ascii_digit());
        let suffix_ok = suffix.len() <= 2 && suffix.chars().all(|c| c.is_ascii_alphabetic());
        if !(dept_ok && number_ok && suffix_ok) {
            return None;
        }

        let canonical = format!("{}{}{}", dept, number, suffix).to_ascii_uppercase();
        Some(Self {
            canonical,
            dept_len: dept.len(),
        })
    }

    /// Parse either representation (`"CS 251"`, `"cs251"`, `"HON 101H"`).
    pub fn parse(s: &str) -> Option<Self> {
        let caps = CODE_RE.captures(s.trim())?;
        Self::new(&caps[1], &caps[2], caps.get(3).map(|m| m.as_str()))
    }

    /// Canonical form: `CS251`.
    pub fn as_str(&self) -> &str {
        &self.canonical
    }

    /// Department letters: `CS`.
    pub fn dept(&self) -> &str {
        &self.canonical[..self.dept_len]
    }

    /// Number plus optional suffix: `251`, `101H`.
    pub fn number(&self) -> &str {
        &self.canonical[self.dept_len..]
    }

    /// Catalog form with a single space: `CS 251`.
    pub fn spaced(&self) -> String {
        format!("{} {}", self.dept(), self.number())
    }
}

/// Normalize any course-code string to the key used for set comparisons.
///
/// Strips all whitespace and uppercases, so `"CS 251"`, `"cs251"` and
/// `CourseCode` values for CS251 all compare equal. Strings that are not
/// well-formed codes still get a stable key.
pub fn catalog_key(code: &str) -> String {
    code.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_uppercase()
}

impl PartialEq for CourseCode {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for CourseCode {}

impl Hash for CourseCode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl PartialOrd for CourseCode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CourseCode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical.cmp(&other.canonical)
    }
}

impl fmt::Display for CourseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

impl Serialize for CourseCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.canonical)
    }
}
