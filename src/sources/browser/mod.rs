// src/sources/browser/mod.rs
//! Browser-automation adapter: render the public G2B list pages in headless
//! Chromium and read the announcement table out of the DOM.

pub mod chromium;
pub mod layout;

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;

use self::layout::{find_bid_table, BidTable};
use super::SourceAdapter;
use crate::config::options::CollectOptions;
use crate::error::{AdapterFailure, FailureReason};
use crate::model::{Category, DateRange, SourceKind};
use crate::normalize::{positional_key, RawRecord};

/// Something that can turn a URL into rendered HTML.
#[async_trait]
pub trait PageSource: Send {
    async fn fetch_html(&mut self, url: &str, timeout: Duration) -> Result<String, AdapterFailure>;

    async fn close(&mut self) {}
}

enum Pages {
    /// Not launched yet; launch on first use.
    Idle { chrome_path: Option<PathBuf> },
    Ready(Box<dyn PageSource>),
    /// Launch failed once. Remembered so later categories fail fast.
    Broken(AdapterFailure),
}

pub struct BrowserAdapter {
    pages: Pages,
    urls: Vec<String>,
    page_timeout: Duration,
    /// The list pages are not category-specific; extract once per run.
    table: Option<BidTable>,
    /// Rows without a category cell already handed to an earlier category.
    unlabeled_served: HashSet<usize>,
}

impl BrowserAdapter {
    pub fn chromium(opts: &CollectOptions) -> Self {
        Self {
            pages: Pages::Idle { chrome_path: opts.chrome_path.clone() },
            urls: opts.browser_pages.clone(),
            page_timeout: opts.page_load_timeout,
            table: None,
            unlabeled_served: HashSet::new(),
        }
    }

    /// Adapter over an already-open page source.
    pub fn with_source(source: Box<dyn PageSource>, urls: Vec<String>, page_timeout: Duration) -> Self {
        Self {
            pages: Pages::Ready(source),
            urls,
            page_timeout,
            table: None,
            unlabeled_served: HashSet::new(),
        }
    }

    async fn pages(&mut self) -> Result<&mut Box<dyn PageSource>, AdapterFailure> {
        if let Pages::Idle { chrome_path } = &self.pages {
            self.pages = match chromium::ChromiumPages::launch(chrome_path.clone()).await {
                Ok(p) => Pages::Ready(Box::new(p)),
                Err(f) => Pages::Broken(f),
            };
        }
        match &mut self.pages {
            Pages::Ready(p) => Ok(p),
            Pages::Broken(f) => Err(f.clone()),
            Pages::Idle { .. } => Err(AdapterFailure::unavailable("browser not started")),
        }
    }

    async fn load_table(&mut self) -> Result<BidTable, AdapterFailure> {
        if let Some(t) = &self.table {
            return Ok(t.clone());
        }
        let urls = self.urls.clone();
        let timeout = self.page_timeout;
        let pages = self.pages().await?;

        let mut reached = 0usize;
        let mut last_err: Option<AdapterFailure> = None;
        for url in &urls {
            match pages.fetch_html(url, timeout).await {
                Ok(html) => {
                    reached += 1;
                    match find_bid_table(&html) {
                        Some(t) => {
                            logf!("browser: table at {} via `{}` ({} rows)", url, t.selector, t.rows.len());
                            self.table = Some(t.clone());
                            return Ok(t);
                        }
                        None => logd!("browser: no bid table on {url}"),
                    }
                }
                Err(f) => {
                    logw!("browser: {url}: {f}");
                    last_err = Some(f);
                }
            }
        }

        if reached == 0 {
            let detail = last_err.map(|f| f.message).unwrap_or_else(|| s!("no candidate pages configured"));
            return Err(AdapterFailure::network(format!("every page load failed ({detail})")));
        }
        Err(AdapterFailure::parse_mismatch(format!(
            "layout mismatch: no bid table on {reached} page(s)"
        )))
    }
}

/// Header-keyed cells followed by positional keys for the leading cells.
fn row_to_raw(headers: &[String], cells: &[String], category: Category) -> RawRecord {
    let mut raw = RawRecord::new(SourceKind::Browser, category);
    for (i, cell) in cells.iter().enumerate() {
        match headers.get(i).filter(|h| !h.is_empty()) {
            Some(h) => raw.push(h.clone(), cell.clone()),
            None => raw.push(positional_key(i), cell.clone()),
        }
    }
    for (i, cell) in cells.iter().enumerate().take(3) {
        if i < headers.len() {
            raw.push(positional_key(i), cell.clone());
        }
    }
    raw
}

/// Rows for `category`. A row without a recognisable category cell goes to
/// the first category that asks for it and is never handed out again.
fn rows_for(table: &BidTable, category: Category, unlabeled_served: &mut HashSet<usize>) -> Vec<RawRecord> {
    let cat_col = table
        .headers
        .iter()
        .position(|h| h.contains("구분") || h.contains("업무"));
    table
        .rows
        .iter()
        .enumerate()
        .filter(|(i, cells)| {
            match cat_col.and_then(|c| cells.get(c)).and_then(|c| Category::from_text(c)) {
                Some(c) => c == category,
                None => unlabeled_served.insert(*i),
            }
        })
        .map(|(_, cells)| row_to_raw(&table.headers, cells, category))
        .collect()
}

#[async_trait]
impl SourceAdapter for BrowserAdapter {
    fn kind(&self) -> SourceKind {
        SourceKind::Browser
    }

    async fn collect(
        &mut self,
        _range: &DateRange,
        category: Category,
    ) -> Result<Vec<RawRecord>, AdapterFailure> {
        let table = self.load_table().await?;
        let rows = rows_for(&table, category, &mut self.unlabeled_served);
        if rows.is_empty() {
            return Err(AdapterFailure::new(
                FailureReason::NoData,
                format!("bid table has no {category} rows"),
            ));
        }
        Ok(rows)
    }

    async fn shutdown(&mut self) {
        if let Pages::Ready(p) = &mut self.pages {
            p.close().await;
        }
        self.pages = Pages::Broken(AdapterFailure::unavailable("browser closed"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> BidTable {
        BidTable {
            selector: "table",
            score: 30,
            headers: vec![s!("공고번호"), s!("업무구분"), s!("공고명")],
            rows: vec![
                vec![s!("A-1"), s!("물품"), s!("의자 구매"), s!("extra")],
                vec![s!("A-2"), s!("공사"), s!("도로 포장")],
                vec![s!("A-3"), s!(""), s!("미분류")],
            ],
        }
    }

    #[test]
    fn rows_follow_category_cell() {
        let mut served = HashSet::new();
        let goods = rows_for(&table(), Category::Goods, &mut served);
        let ids: Vec<_> = goods.iter().map(|r| r.get("공고번호").unwrap()).collect();
        assert_eq!(ids, vec!["A-1", "A-3"]);
        assert_eq!(goods[0].get("#3"), Some("extra"));
        assert_eq!(goods[0].get("#0"), Some("A-1"));

        let works = rows_for(&table(), Category::Construction, &mut served);
        let ids: Vec<_> = works.iter().map(|r| r.get("공고번호").unwrap()).collect();
        assert_eq!(ids, vec!["A-2"], "unlabeled A-3 went to goods already");
    }
}
