// src/cli.rs
use std::path::PathBuf;
use std::time::Duration;

use chrono::Local;
use clap::Parser;
use color_eyre::eyre::{eyre, Result};

use crate::config::consts::*;
use crate::config::options::{AppOptions, CollectOptions, ExportOptions, RetryPolicy};
use crate::model::Category;
use crate::progress::ConsoleProgress;
use crate::sources::demo::DemoSet;
use crate::{file, runner, store};

/// Collect public procurement bid announcements (G2B) into a dated CSV.
///
/// Sources are tried per category in order: public API (needs G2B_API_KEY),
/// headless browser, demo data.
#[derive(Parser, Debug)]
#[command(name = "g2b_collect", version, about)]
pub struct Cli {
    /// Search window in days, ending now
    #[arg(long, default_value_t = SEARCH_DAYS, value_parser = clap::value_parser!(i64).range(1..))]
    pub days: i64,

    /// Category to collect (repeatable): goods, services, construction, foreign-capital
    #[arg(long = "category", short = 'c')]
    pub categories: Vec<Category>,

    /// Output directory (created if missing)
    #[arg(long, short = 'o', default_value = DEFAULT_OUT_DIR)]
    pub out_dir: PathBuf,

    /// File label; the export is `<label>_<YYYYMMDD>.csv`
    #[arg(long, default_value = DEFAULT_LABEL)]
    pub label: String,

    /// Do not try the public API
    #[arg(long)]
    pub skip_api: bool,

    /// Do not try the headless browser
    #[arg(long)]
    pub skip_browser: bool,

    /// Demo records used as the last fallback: sample | full
    #[arg(long, default_value = "sample")]
    pub demo_set: DemoSet,

    /// Institutions listed in the summary
    #[arg(long, default_value_t = TOP_INSTITUTIONS)]
    pub top: usize,

    /// API rows per page
    #[arg(long, default_value_t = PAGE_SIZE)]
    pub page_size: u32,

    /// API page limit per category
    #[arg(long, default_value_t = MAX_PAGES)]
    pub max_pages: u32,

    /// Attempts per source on network errors (1 = no retry)
    #[arg(long, default_value_t = RETRY_ATTEMPTS, value_parser = clap::value_parser!(u32).range(1..))]
    pub retries: u32,

    /// Do not update the local cache
    #[arg(long)]
    pub no_cache: bool,

    /// Re-export the cached records instead of collecting
    #[arg(long, conflicts_with_all = ["skip_api", "skip_browser"])]
    pub from_cache: bool,

    /// Debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn into_options(self) -> AppOptions {
        let base = CollectOptions::from_env();
        let categories = if self.categories.is_empty() {
            Category::ALL.to_vec()
        } else {
            let mut c = self.categories;
            c.sort();
            c.dedup();
            c
        };
        AppOptions {
            collect: CollectOptions {
                categories,
                days: self.days,
                use_api: !self.skip_api,
                use_browser: !self.skip_browser,
                page_size: self.page_size,
                max_pages: self.max_pages,
                demo_set: self.demo_set,
                retry: RetryPolicy {
                    max_attempts: self.retries,
                    base_delay: Duration::from_millis(RETRY_BASE_MS),
                },
                ..base
            },
            export: ExportOptions {
                out_dir: self.out_dir,
                label: self.label,
                top_n: self.top,
                cache: !self.no_cache,
            },
        }
    }
}

pub fn run(cli: Cli) -> Result<()> {
    let from_cache = cli.from_cache;
    let options = cli.into_options();
    if options.collect.api_key.is_none() && options.collect.use_api && !from_cache {
        logw!("{API_KEY_ENV} is not set; the public API will be skipped as an authentication failure");
    }

    if from_cache {
        let result = store::load_cached()?
            .ok_or_else(|| eyre!("no cache at {}; run a collection first", store::cache_path().display()))?;
        let path = file::write_export(&result, &options.export, Local::now().date_naive())?;
        println!("Saved {}", path.display());
        print!("{}", result.summary(options.export.top_n));
        return Ok(());
    }

    let rt = runner::runtime()?;
    let mut progress = ConsoleProgress::default();
    let summary = rt.block_on(runner::run(&options, Some(&mut progress)))?;

    println!("Saved {}", summary.csv_path.display());
    if let Some(cache) = &summary.cache_path {
        println!("Cache {}", cache.display());
    }
    print!("{}", summary.result.summary(options.export.top_n));
    Ok(())
}
