//! Ordered, append-only collection of findings for one session.
//!
//! # Single writer
//!
//! Insertion takes `&mut self`. The orchestrator lends the store to exactly one
//! validator worker at a time (a scoped thread that is joined before the next
//! validator starts), so the borrow checker guarantees at most one writer and
//! no internal locking is needed. Running validators in parallel would require
//! wrapping the store in a lock or giving each worker its own store and merging
//! in list order.

use std::sync::Arc;

use tracing::debug;

use crate::exclusion::ExclusionList;
use crate::finding::Finding;
use crate::store::StoreReader;

pub struct FindingsStore {
    store: Arc<dyn StoreReader>,
    exclusions: ExclusionList,
    findings: Vec<Finding>,
    stale: usize,
    excluded: usize,
}

impl FindingsStore {
    #[must_use]
    pub fn new(store: Arc<dyn StoreReader>, exclusions: ExclusionList) -> Self {
        Self {
            store,
            exclusions,
            findings: Vec::new(),
            stale: 0,
            excluded: 0,
        }
    }

    /// Record a finding for the key at `path`.
    ///
    /// Returns `false` without recording anything when the path is covered by
    /// the exclusion list or when the key no longer exists (it was enumerated
    /// but vanished before validation finished).
    pub fn store(&mut self, problem: &str, path: &str, value_name: Option<&str>) -> bool {
        if self.exclusions.is_excluded(path) {
            debug!(path, problem, "finding suppressed by exclusion list");
            self.excluded += 1;
            return false;
        }

        if !self.store.exists(path) {
            debug!(path, problem, "finding rejected: key no longer exists");
            self.stale += 1;
            return false;
        }

        self.findings.push(Finding::new(problem, path, value_name));
        true
    }

    /// The most recently recorded finding.
    #[must_use]
    pub fn last(&self) -> Option<&Finding> {
        self.findings.last()
    }

    /// Findings in insertion order.
    #[must_use]
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.findings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    /// Insertions rejected because the key had vanished.
    #[must_use]
    pub fn stale_count(&self) -> usize {
        self.stale
    }

    /// Insertions rejected by the exclusion list.
    #[must_use]
    pub fn excluded_count(&self) -> usize {
        self.excluded
    }

    #[must_use]
    pub fn into_findings(self) -> Vec<Finding> {
        self.findings
    }
}
