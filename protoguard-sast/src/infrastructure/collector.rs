//! Finding collector
//!
//! Accumulates findings in discovery order, drops structural duplicates and
//! orders the survivors by line. The sort is stable, so findings on the same
//! line keep their discovery order.

use std::collections::HashSet;

use crate::domain::{Finding, Line, ScanResult};

type DedupKey = (String, Line, String, String);

#[derive(Debug, Default)]
pub struct FindingCollector {
    seen: HashSet<DedupKey>,
    findings: Vec<Finding>,
    duplicates: usize,
}

impl FindingCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a finding; returns false when an identical one was already collected
    pub fn push(&mut self, finding: Finding) -> bool {
        let (rule, line, property, snippet) = finding.dedup_key();
        let key = (
            rule.to_string(),
            line,
            property.to_string(),
            snippet.to_string(),
        );
        if self.seen.insert(key) {
            self.findings.push(finding);
            true
        } else {
            self.duplicates += 1;
            false
        }
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    /// Number of findings dropped as duplicates so far
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    pub fn finish(self) -> ScanResult {
        let mut findings = self.findings;
        findings.sort_by_key(|f| f.line);
        ScanResult::from_ordered(findings)
    }
}

impl Extend<Finding> for FindingCollector {
    fn extend<T: IntoIterator<Item = Finding>>(&mut self, iter: T) {
        for finding in iter {
            self.push(finding);
        }
    }
}
