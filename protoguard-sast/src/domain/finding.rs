//! Finding types for prototype-pollution analysis

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

/// Line of a finding; `Unknown` when the source node carried no location.
///
/// Known lines order numerically and every known line sorts before `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Line {
    Known(u32),
    Unknown,
}

impl Line {
    pub fn number(&self) -> Option<u32> {
        match self {
            Line::Known(n) => Some(*n),
            Line::Unknown => None,
        }
    }
}

impl From<Option<u32>> for Line {
    fn from(line: Option<u32>) -> Self {
        line.map_or(Line::Unknown, Line::Known)
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Line::Known(n) => write!(f, "{}", n),
            Line::Unknown => write!(f, "unknown"),
        }
    }
}

impl Serialize for Line {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Line::Known(n) => serializer.serialize_u32(*n),
            Line::Unknown => serializer.serialize_str("unknown"),
        }
    }
}

impl<'de> Deserialize<'de> for Line {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(u32),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Number(n) => Ok(Line::Known(n)),
            Repr::Text(s) if s == "unknown" => Ok(Line::Unknown),
            Repr::Text(s) => Err(serde::de::Error::custom(format!(
                "expected a line number or \"unknown\", got {:?}",
                s
            ))),
        }
    }
}

/// Finding severity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    #[default]
    High,
    Medium,
    Low,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Critical => write!(f, "critical"),
            Severity::High => write!(f, "high"),
            Severity::Medium => write!(f, "medium"),
            Severity::Low => write!(f, "low"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// One reported risk instance
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Finding {
    pub rule_name: String,
    pub line: Line,
    /// 0-based column of the offending property in UTF-16 code units, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
    pub property_name: String,
    /// Best-effort rendering such as `obj.__proto__`
    pub snippet: String,
    #[serde(default)]
    pub severity: Severity,
}

impl Finding {
    /// Ordering key: line, then rule name, then property name
    pub fn sort_key(&self) -> (Line, &str, &str) {
        (self.line, &self.rule_name, &self.property_name)
    }

    /// Key under which two findings count as duplicates
    pub fn dedup_key(&self) -> (&str, Line, &str, &str) {
        (&self.rule_name, self.line, &self.property_name, &self.snippet)
    }

    pub fn cmp_by_key(&self, other: &Finding) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Line {}: Access to '{}' → {}",
            self.line, self.property_name, self.snippet
        )
    }
}

/// Ordered, deduplicated findings of one scan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScanResult {
    findings: Vec<Finding>,
}

impl ScanResult {
    /// Wrap findings that are already deduplicated and ordered
    pub(crate) fn from_ordered(findings: Vec<Finding>) -> Self {
        Self { findings }
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn into_findings(self) -> Vec<Finding> {
        self.findings
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Finding> {
        self.findings.iter()
    }
}

impl IntoIterator for ScanResult {
    type Item = Finding;
    type IntoIter = std::vec::IntoIter<Finding>;

    fn into_iter(self) -> Self::IntoIter {
        self.findings.into_iter()
    }
}

impl<'a> IntoIterator for &'a ScanResult {
    type Item = &'a Finding;
    type IntoIter = std::slice::Iter<'a, Finding>;

    fn into_iter(self) -> Self::IntoIter {
        self.findings.iter()
    }
}
