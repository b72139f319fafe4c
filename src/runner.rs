// src/runner.rs
//! Glue between frontends and the library: options → orchestrator → export.

use std::path::PathBuf;

use chrono::Local;
use tokio::runtime::{Builder, Runtime};

use crate::collect::{CollectionResult, Orchestrator};
use crate::config::options::{AppOptions, CollectOptions};
use crate::error::{ExportError, RuntimeError};
use crate::file;
use crate::progress::Progress;
use crate::sources;
use crate::store;

/// Everything is sequential; one thread is plenty.
pub fn runtime() -> Result<Runtime, RuntimeError> {
    Ok(Builder::new_current_thread().enable_all().build()?)
}

/// Summary of what was produced.
pub struct RunSummary {
    pub result: CollectionResult,
    pub csv_path: PathBuf,
    pub cache_path: Option<PathBuf>,
}

/// Collect only. Never fails: adapter trouble ends in fallback, not an error.
pub async fn collect(options: &CollectOptions, progress: Option<&mut dyn Progress>) -> CollectionResult {
    let range = options.date_range(Local::now().naive_local());
    let mut orchestrator = Orchestrator::new(sources::default_adapters(options), options.retry.clone());
    orchestrator.collect(&range, &options.categories, progress).await
}

/// Collect, export the dated CSV and refresh the cache.
/// `progress` can be None (no UI updates) or Some(&mut impl Progress).
pub async fn run(options: &AppOptions, progress: Option<&mut dyn Progress>) -> Result<RunSummary, ExportError> {
    let result = collect(&options.collect, progress).await;
    let csv_path = file::write_export(&result, &options.export, Local::now().date_naive())?;

    let cache_path = if options.export.cache {
        match store::save_result(&result) {
            Ok(p) => Some(p),
            Err(e) => {
                logw!("cache not updated: {e}");
                None
            }
        }
    } else {
        None
    };

    Ok(RunSummary { result, csv_path, cache_path })
}
