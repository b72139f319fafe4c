// src/store.rs
//! Local cache of the last collected record set (`.store/bids.csv`).
//! Same CSV shape as the export; reloads go back through the normalizer.

use std::{fs, io, path::{Path, PathBuf}};

use crate::collect::CollectionResult;
use crate::config::consts::{CACHE_FILE, CSV_SEP, STORE_DIR};
use crate::csv::parse_rows;
use crate::error::ExportError;
use crate::file::{write_csv, UTF8_BOM};
use crate::model::{BidRecord, Category, SourceKind};
use crate::normalize::{normalize_all, RawRecord};

pub fn cache_path() -> PathBuf {
    PathBuf::from(STORE_DIR).join(CACHE_FILE)
}

pub fn save_records_to(path: &Path, records: &[BidRecord]) -> Result<(), ExportError> {
    write_csv(path, records)
}

/// Records from a cache file. Rows that no longer normalize are skipped.
pub fn load_records_from(path: &Path) -> io::Result<Vec<BidRecord>> {
    let text = fs::read_to_string(path)?;
    let text = text.strip_prefix(UTF8_BOM).unwrap_or(&text);

    let mut rows = parse_rows(text, CSV_SEP).into_iter();
    let Some(headers) = rows.next() else {
        return Ok(Vec::new());
    };

    // Category is a placeholder; every cached row carries its own.
    let raws: Vec<RawRecord> = rows
        .map(|row| {
            let fields = headers.iter().cloned().zip(row).collect();
            RawRecord::with_fields(SourceKind::Cache, Category::Goods, fields)
        })
        .collect();

    let mut rejected = 0;
    let records = normalize_all(&raws, &mut rejected);
    if rejected > 0 {
        logw!("cache {}: skipped {} unreadable rows", path.display(), rejected);
    }
    Ok(records)
}

pub fn save_result(result: &CollectionResult) -> Result<PathBuf, ExportError> {
    let path = cache_path();
    save_records_to(&path, result.records())?;
    logd!("cached {} records at {}", result.len(), path.display());
    Ok(path)
}

/// Last cached result, if a cache exists.
pub fn load_cached() -> io::Result<Option<CollectionResult>> {
    let path = cache_path();
    if !path.exists() {
        return Ok(None);
    }
    let records = load_records_from(&path)?;
    Ok(Some(CollectionResult::from_records(records, Vec::new(), 0)))
}
