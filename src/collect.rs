// src/collect.rs
//! Acquisition orchestrator.
//!
//! For each category the adapters are tried in order until one yields at
//! least one usable record:
//!
//! ```text
//! Pending(0) ──ok──▶ Collected
//!     │ fail / empty
//!     ▼
//! Pending(1) ──ok──▶ Collected
//!     │ …
//!     ▼
//! Pending(n) ──────▶ Collected   (whatever was gathered, possibly nothing)
//! ```
//!
//! `network` failures are retried on the same adapter before moving on.
//! Results are merged in category order, de-duplicated by id and stripped of
//! private-negotiated contracts.

use std::collections::HashMap;

use crate::config::options::RetryPolicy;
use crate::error::{AdapterFailure, FailureReason};
use crate::model::{BidRecord, Category, DateRange, SourceKind};
use crate::normalize::{normalize_all, RawRecord};
use crate::progress::{NullProgress, Progress};
use crate::sources::SourceAdapter;
use crate::summary::Summary;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CategoryState {
    Pending(usize),
    Collected,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Adapter produced this many normalized records.
    Collected(usize),
    /// Adapter answered, but nothing survived normalization.
    Rejected(usize),
    Failed(AdapterFailure),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attempt {
    pub source: SourceKind,
    /// Calls made, retries included.
    pub tries: u32,
    pub outcome: AttemptOutcome,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryOutcome {
    pub category: Category,
    /// Adapter that settled the category, if any.
    pub method: Option<SourceKind>,
    pub attempts: Vec<Attempt>,
}

/// Which acquisition path produced the data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AcquisitionMethod {
    Single(SourceKind),
    Mixed,
    Nothing,
}

impl std::fmt::Display for AcquisitionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AcquisitionMethod::Single(k) => f.write_str(k.label()),
            AcquisitionMethod::Mixed => f.write_str("mixed"),
            AcquisitionMethod::Nothing => f.write_str("none"),
        }
    }
}

/// Final ordered record set. Every count is derived from `records`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollectionResult {
    records: Vec<BidRecord>,
    outcomes: Vec<CategoryOutcome>,
    duplicates: usize,
    filtered: usize,
    rejected: usize,
}

impl CollectionResult {
    /// Build from already-merged records: dedup and filter are applied here.
    pub fn from_records(
        merged: Vec<BidRecord>,
        outcomes: Vec<CategoryOutcome>,
        rejected: usize,
    ) -> Self {
        let (unique, duplicates) = dedup(merged);
        let (records, filtered) = drop_private_negotiated(unique);
        Self { records, outcomes, duplicates, filtered, rejected }
    }

    pub fn records(&self) -> &[BidRecord] {
        &self.records
    }

    pub fn outcomes(&self) -> &[CategoryOutcome] {
        &self.outcomes
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    pub fn filtered(&self) -> usize {
        self.filtered
    }

    pub fn rejected(&self) -> usize {
        self.rejected
    }

    /// One label if every settled category agrees, else `mixed`. A reloaded
    /// cache has no outcomes and reports the records' own sources.
    pub fn acquisition_method(&self) -> AcquisitionMethod {
        let mut methods = self.outcomes.iter().filter_map(|o| o.method);
        let first = match methods.next() {
            Some(m) => m,
            None if self.outcomes.is_empty() && !self.records.is_empty() => {
                let mut kinds = self.records.iter().map(|r| r.source);
                let k = kinds.next().unwrap_or(SourceKind::Cache);
                return if kinds.all(|x| x == k) {
                    AcquisitionMethod::Single(k)
                } else {
                    AcquisitionMethod::Mixed
                };
            }
            None => return AcquisitionMethod::Nothing,
        };
        if methods.all(|m| m == first) {
            AcquisitionMethod::Single(first)
        } else {
            AcquisitionMethod::Mixed
        }
    }

    pub fn summary(&self, top_n: usize) -> Summary {
        Summary::from_result(self, top_n)
    }
}

/// Collapse records sharing an id. The higher-priority source wins; within
/// one source the later record wins. The survivor keeps the position of the
/// first occurrence. Returns the number of records collapsed.
pub fn dedup(records: Vec<BidRecord>) -> (Vec<BidRecord>, usize) {
    let mut out: Vec<BidRecord> = Vec::with_capacity(records.len());
    let mut index: HashMap<String, usize> = HashMap::with_capacity(records.len());
    let mut collapsed = 0;

    for rec in records {
        match index.get(&rec.id) {
            Some(&slot) => {
                collapsed += 1;
                if rec.source.priority() <= out[slot].source.priority() {
                    out[slot] = rec;
                }
            }
            None => {
                index.insert(rec.id.clone(), out.len());
                out.push(rec);
            }
        }
    }
    (out, collapsed)
}

/// Remove private-negotiated contracts. Returns the number removed.
pub fn drop_private_negotiated(records: Vec<BidRecord>) -> (Vec<BidRecord>, usize) {
    let before = records.len();
    let kept: Vec<BidRecord> = records
        .into_iter()
        .filter(|r| !r.contract_method.is_private_negotiated())
        .collect();
    let removed = before - kept.len();
    (kept, removed)
}

pub struct Orchestrator {
    adapters: Vec<Box<dyn SourceAdapter>>,
    retry: RetryPolicy,
}

impl Orchestrator {
    pub fn new(adapters: Vec<Box<dyn SourceAdapter>>, retry: RetryPolicy) -> Self {
        Self { adapters, retry }
    }

    pub fn adapter_kinds(&self) -> Vec<SourceKind> {
        self.adapters.iter().map(|a| a.kind()).collect()
    }

    /// Run every category, then release adapter resources.
    pub async fn collect(
        &mut self,
        range: &DateRange,
        categories: &[Category],
        progress: Option<&mut dyn Progress>,
    ) -> CollectionResult {
        let mut null = NullProgress;
        let progress: &mut dyn Progress = match progress {
            Some(p) => p,
            None => &mut null,
        };
        progress.begin(categories.len());
        logf!(
            "collecting {} categories {} → {} via {:?}",
            categories.len(),
            range.start.format("%Y-%m-%d %H:%M"),
            range.end.format("%Y-%m-%d %H:%M"),
            self.adapter_kinds()
        );

        let mut merged: Vec<BidRecord> = Vec::new();
        let mut outcomes = Vec::with_capacity(categories.len());
        let mut rejected = 0;

        for &category in categories {
            let outcome = self
                .collect_category(range, category, &mut merged, &mut rejected, &mut *progress)
                .await;
            progress.item_done(category, outcome.method);
            outcomes.push(outcome);
        }

        for adapter in self.adapters.iter_mut() {
            adapter.shutdown().await;
        }

        let result = CollectionResult::from_records(merged, outcomes, rejected);
        logf!(
            "collected {} records ({} duplicates collapsed, {} private-negotiated filtered, {} rejected)",
            result.len(),
            result.duplicates(),
            result.filtered(),
            result.rejected()
        );
        progress.finish();
        result
    }

    async fn collect_category(
        &mut self,
        range: &DateRange,
        category: Category,
        merged: &mut Vec<BidRecord>,
        rejected: &mut usize,
        progress: &mut dyn Progress,
    ) -> CategoryOutcome {
        let mut outcome = CategoryOutcome { category, method: None, attempts: Vec::new() };
        let mut state = CategoryState::Pending(0);

        while let CategoryState::Pending(i) = state {
            let Some(adapter) = self.adapters.get_mut(i) else {
                logw!("{category}: every source exhausted");
                state = CategoryState::Collected;
                continue;
            };
            let kind = adapter.kind();
            progress.log(&format!("{category}: trying {kind}"));

            let (tries, result) = run_with_retry(adapter.as_mut(), &self.retry, range, category).await;
            let attempt_outcome = match result {
                Ok(raws) => {
                    let mut dropped = 0;
                    let records = normalize_all(&raws, &mut dropped);
                    *rejected += dropped;
                    if records.is_empty() {
                        logw!("{category}: {kind} returned {} rows, none usable", raws.len());
                        AttemptOutcome::Rejected(dropped)
                    } else {
                        logf!("{category}: {} records from {kind}", records.len());
                        let n = records.len();
                        merged.extend(records);
                        outcome.method = Some(kind);
                        AttemptOutcome::Collected(n)
                    }
                }
                Err(failure) => {
                    let msg = format!("{category}: {kind} failed {failure}");
                    match failure.reason {
                        FailureReason::NoData => logf!("{msg}"),
                        _ => logw!("{msg}"),
                    }
                    progress.log(&msg);
                    AttemptOutcome::Failed(failure)
                }
            };

            state = match attempt_outcome {
                AttemptOutcome::Collected(_) => CategoryState::Collected,
                _ => CategoryState::Pending(i + 1),
            };
            outcome.attempts.push(Attempt { source: kind, tries, outcome: attempt_outcome });
        }
        outcome
    }
}

/// One adapter call plus bounded retries for retryable failures.
/// An empty success is reported as `no-data`.
async fn run_with_retry(
    adapter: &mut dyn SourceAdapter,
    retry: &RetryPolicy,
    range: &DateRange,
    category: Category,
) -> (u32, Result<Vec<RawRecord>, AdapterFailure>) {
    let mut tries = 1;
    loop {
        let result = match adapter.collect(range, category).await {
            Ok(raws) if raws.is_empty() => {
                Err(AdapterFailure::no_data(format!("{} returned nothing", adapter.kind())))
            }
            other => other,
        };
        match result {
            Err(f) if f.reason.is_retryable() && tries < retry.max_attempts => {
                let delay = retry.delay_for(tries);
                logw!(
                    "{category}: {} attempt {tries}/{} failed ({}); retrying in {}ms",
                    adapter.kind(),
                    retry.max_attempts,
                    f.message,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
                tries += 1;
            }
            other => return (tries, other),
        }
    }
}
