// src/config/options.rs
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};

use super::consts::*;
use crate::core::sanitize::sanitize_label;
use crate::model::{Category, DateRange};
use crate::sources::demo::DemoSet;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppOptions {
    pub collect: CollectOptions,
    pub export: ExportOptions,
}

/// Bounded retry for `network` failures on one adapter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total tries including the first. `1` disables retry.
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: RETRY_ATTEMPTS,
            base_delay: Duration::from_millis(RETRY_BASE_MS),
        }
    }
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self { max_attempts: 1, base_delay: Duration::ZERO }
    }

    /// Delay before retry number `attempt` (1-based): base · 2^(attempt-1).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollectOptions {
    pub categories: Vec<Category>,
    pub days: i64,

    // Public API
    pub use_api: bool,
    pub api_key: Option<String>,
    pub api_base_url: String,
    pub page_size: u32,
    pub max_pages: u32,
    pub request_timeout: Duration,

    // Browser
    pub use_browser: bool,
    pub browser_pages: Vec<String>,
    pub chrome_path: Option<PathBuf>,
    pub page_load_timeout: Duration,

    pub demo_set: DemoSet,
    pub retry: RetryPolicy,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            categories: Category::ALL.to_vec(),
            days: SEARCH_DAYS,
            use_api: true,
            api_key: None,
            api_base_url: s!(API_BASE_URL),
            page_size: PAGE_SIZE,
            max_pages: MAX_PAGES,
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            use_browser: true,
            browser_pages: BROWSER_PAGES.iter().map(|u| s!(*u)).collect(),
            chrome_path: None,
            page_load_timeout: Duration::from_secs(PAGE_LOAD_TIMEOUT_SECS),
            demo_set: DemoSet::default(),
            retry: RetryPolicy::default(),
        }
    }
}

impl CollectOptions {
    /// Defaults plus whatever the environment provides (API key, browser path).
    pub fn from_env() -> Self {
        Self {
            api_key: env::var(API_KEY_ENV).ok().filter(|k| !k.trim().is_empty()),
            chrome_path: env::var_os(CHROME_PATH_ENV).map(PathBuf::from),
            ..Self::default()
        }
    }

    pub fn date_range(&self, now: NaiveDateTime) -> DateRange {
        DateRange::last_days(self.days, now)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportOptions {
    pub out_dir: PathBuf,
    pub label: String,
    pub top_n: usize,
    /// Also persist the record set to the local cache.
    pub cache: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            label: s!(DEFAULT_LABEL),
            top_n: TOP_INSTITUTIONS,
            cache: true,
        }
    }
}

impl ExportOptions {
    /// `<label>_<YYYYMMDD>.csv`
    pub fn file_name(&self, date: NaiveDate) -> String {
        format!("{}_{}.csv", sanitize_label(&self.label, DEFAULT_LABEL), date.format("%Y%m%d"))
    }

    pub fn out_path(&self, date: NaiveDate) -> PathBuf {
        self.out_dir.join(self.file_name(date))
    }
}
