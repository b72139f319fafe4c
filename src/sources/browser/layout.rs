// src/sources/browser/layout.rs
//! Locate the announcement table in a rendered G2B page.
//!
//! The site has shipped several list layouts over the years, so instead of one
//! selector we try a list of candidates, keep the tables that look like bid
//! lists, and score them.

use std::collections::HashSet;

use scraper::{ElementRef, Html, Selector};

use crate::core::sanitize::normalize_ws;

/// Candidate table selectors, most specific first.
pub const TABLE_SELECTORS: &[&str] = &[
    "table[summary*='입찰']",
    "table[summary*='공고']",
    "table[class*='table']",
    "table[class*='list']",
    "table[class*='grid']",
    "table[class*='result']",
    ".table-responsive table",
    ".data-table table",
    ".list-container table",
    "table",
];

/// At least one must appear somewhere in a candidate's text.
const BID_KEYWORDS: &[&str] = &["공고", "입찰", "기관", "마감"];

/// Each one found in the header row adds `HEADER_WEIGHT` to the score.
const HEADER_KEYWORDS: &[&str] = &["공고명", "공고번호", "기관", "마감", "개찰", "입찰"];
const HEADER_WEIGHT: usize = 5;

/// Rows shorter than this are separators or pager rows.
const MIN_CELLS: usize = 3;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BidTable {
    pub selector: &'static str,
    pub score: usize,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

fn cell_text(el: ElementRef<'_>) -> String {
    normalize_ws(&el.text().collect::<Vec<_>>().join(" "))
}

pub fn score(row_count: usize, header_line: &str) -> usize {
    let rows = if row_count > 5 { row_count } else { 0 };
    let hits = HEADER_KEYWORDS.iter().filter(|k| header_line.contains(*k)).count();
    rows + HEADER_WEIGHT * hits
}

/// Best-scoring bid table in `html`, if any candidate qualifies.
pub fn find_bid_table(html: &str) -> Option<BidTable> {
    let doc = Html::parse_document(html);
    let tr = Selector::parse("tr").ok()?;
    let th = Selector::parse("th").ok()?;
    let td = Selector::parse("td").ok()?;

    let mut seen = HashSet::new();
    let mut best: Option<BidTable> = None;

    for sel_text in TABLE_SELECTORS {
        let Ok(sel) = Selector::parse(sel_text) else {
            logd!("browser: skipping bad selector {sel_text}");
            continue;
        };
        for table in doc.select(&sel) {
            if !seen.insert(table.id()) {
                continue;
            }
            let rows: Vec<ElementRef> = table.select(&tr).collect();
            if rows.len() <= 2 {
                continue;
            }
            let text = table.text().collect::<String>();
            if !BID_KEYWORDS.iter().any(|k| text.contains(k)) {
                continue;
            }

            let mut header_cells: Vec<String> = rows[0].select(&th).map(cell_text).collect();
            if header_cells.is_empty() {
                header_cells = rows[0].select(&td).map(cell_text).collect();
            }
            let header_line = header_cells.join(" ");

            let body: Vec<Vec<String>> = rows[1..]
                .iter()
                .map(|r| r.select(&td).map(cell_text).collect::<Vec<_>>())
                .filter(|cells| cells.len() >= MIN_CELLS)
                .collect();
            if body.is_empty() {
                continue;
            }

            let s = score(rows.len(), &header_line);
            logd!("browser: candidate {sel_text} rows={} score={s}", rows.len());
            if best.as_ref().is_none_or(|b| s > b.score) {
                best = Some(BidTable { selector: sel_text, score: s, headers: header_cells, rows: body });
            }
        }
    }
    best
}
