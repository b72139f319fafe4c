// src/file.rs

use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{NaiveDate, NaiveDateTime, Timelike};

use crate::collect::CollectionResult;
use crate::config::consts::CSV_SEP;
use crate::config::options::ExportOptions;
use crate::csv::rows_to_string;
use crate::error::ExportError;
use crate::model::BidRecord;
use crate::normalize::CANONICAL_FIELDS;

/// Spreadsheet apps need it to detect UTF-8.
pub const UTF8_BOM: &str = "\u{feff}";

fn fmt_dt(dt: &NaiveDateTime) -> String {
    if dt.second() == 0 {
        dt.format("%Y-%m-%d %H:%M").to_string()
    } else {
        dt.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// One CSV row, in `CANONICAL_FIELDS` order.
pub fn record_row(r: &BidRecord) -> Vec<String> {
    vec![
        r.id.clone(),
        r.title.clone(),
        r.institution.clone().unwrap_or_default(),
        r.demand_institution.clone().unwrap_or_default(),
        r.category.label().to_string(),
        r.contract_method.label().to_string(),
        fmt_dt(&r.published),
        r.deadline.as_ref().map(fmt_dt).unwrap_or_default(),
        r.opening.as_ref().map(fmt_dt).unwrap_or_default(),
        r.estimated_price.clone().unwrap_or_default(),
        r.link.clone(),
        r.source.label().to_string(),
    ]
}

/// Full file contents: BOM, header, one row per record. Same input, same bytes.
pub fn render_csv(records: &[BidRecord]) -> String {
    let rows: Vec<Vec<String>> = records.iter().map(record_row).collect();
    let mut out = s!(UTF8_BOM);
    out.push_str(&rows_to_string(&CANONICAL_FIELDS, &rows, CSV_SEP));
    out
}

pub fn write_csv(path: &Path, records: &[BidRecord]) -> Result<(), ExportError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_directory(parent)?;
        }
    }
    fs::write(path, render_csv(records)).map_err(|e| ExportError::io(path, e))
}

/// Write `<label>_<YYYYMMDD>.csv` into the output dir (created if absent).
/// Returns the final path written to.
pub fn write_export(
    result: &CollectionResult,
    export: &ExportOptions,
    date: NaiveDate,
) -> Result<PathBuf, ExportError> {
    ensure_directory(&export.out_dir)?;
    let path = export.out_path(date);
    write_csv(&path, result.records())?;
    logf!("wrote {} records to {}", result.len(), path.display());
    Ok(path)
}

pub fn ensure_directory(dir: &Path) -> Result<(), ExportError> {
    if dir.exists() && !dir.is_dir() {
        return Err(ExportError::NotADirectory(dir.to_path_buf()));
    }
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|e| ExportError::io(dir, e))?;
    }
    Ok(())
}
