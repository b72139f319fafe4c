// src/summary.rs
//! Statistics derived from a [`CollectionResult`], computed on demand.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::NaiveDate;

use crate::collect::{AcquisitionMethod, CollectionResult};
use crate::model::{Category, SourceKind};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub acquisition: AcquisitionMethod,
    /// Per category, in `Category::ALL` order; zero counts omitted.
    pub by_category: Vec<(Category, usize)>,
    /// Per contract method label, most frequent first.
    pub by_method: Vec<(String, usize)>,
    /// Top-N announcing institutions, most frequent first.
    pub top_institutions: Vec<(String, usize)>,
    /// Per publication date, oldest first.
    pub by_date: Vec<(NaiveDate, usize)>,
    pub by_source: Vec<(SourceKind, usize)>,
    pub duplicates: usize,
    pub filtered: usize,
    pub rejected: usize,
}

/// Count desc, then key asc.
fn ranked(counts: HashMap<String, usize>) -> Vec<(String, usize)> {
    let mut v: Vec<_> = counts.into_iter().collect();
    v.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    v
}

impl Summary {
    pub fn from_result(result: &CollectionResult, top_n: usize) -> Self {
        let records = result.records();

        let mut categories: BTreeMap<Category, usize> = BTreeMap::new();
        let mut methods: HashMap<String, usize> = HashMap::new();
        let mut institutions: HashMap<String, usize> = HashMap::new();
        let mut dates: BTreeMap<NaiveDate, usize> = BTreeMap::new();
        let mut sources: BTreeMap<SourceKind, usize> = BTreeMap::new();

        for r in records {
            *categories.entry(r.category).or_default() += 1;
            *methods.entry(r.contract_method.label().to_string()).or_default() += 1;
            if let Some(inst) = &r.institution {
                *institutions.entry(inst.clone()).or_default() += 1;
            }
            *dates.entry(r.published.date()).or_default() += 1;
            *sources.entry(r.source).or_default() += 1;
        }

        let mut top_institutions = ranked(institutions);
        top_institutions.truncate(top_n);

        Self {
            total: records.len(),
            acquisition: result.acquisition_method(),
            by_category: categories.into_iter().collect(),
            by_method: ranked(methods),
            top_institutions,
            by_date: dates.into_iter().collect(),
            by_source: sources.into_iter().collect(),
            duplicates: result.duplicates(),
            filtered: result.filtered(),
            rejected: result.rejected(),
        }
    }

    pub fn category_count(&self, category: Category) -> usize {
        self.by_category.iter().find(|(c, _)| *c == category).map_or(0, |(_, n)| *n)
    }

    pub fn method_count(&self, label: &str) -> usize {
        self.by_method.iter().find(|(m, _)| m == label).map_or(0, |(_, n)| *n)
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Collection summary ===")?;
        writeln!(f, "Total records: {}", self.total)?;
        writeln!(f, "Acquisition method: {}", self.acquisition)?;

        writeln!(f, "By category:")?;
        for (c, n) in &self.by_category {
            writeln!(f, "  {c}: {n}")?;
        }
        writeln!(f, "By contract method:")?;
        for (m, n) in &self.by_method {
            writeln!(f, "  {m}: {n}")?;
        }
        if !self.top_institutions.is_empty() {
            writeln!(f, "Top institutions:")?;
            for (i, n) in &self.top_institutions {
                writeln!(f, "  {i}: {n}")?;
            }
        }
        writeln!(f, "By publication date:")?;
        for (d, n) in &self.by_date {
            writeln!(f, "  {}: {n}", d.format("%Y-%m-%d"))?;
        }
        writeln!(f, "By source:")?;
        for (s, n) in &self.by_source {
            writeln!(f, "  {s}: {n}")?;
        }
        writeln!(
            f,
            "Duplicates collapsed: {} | private-negotiated filtered: {} | rejected: {}",
            self.duplicates, self.filtered, self.rejected
        )
    }
}
