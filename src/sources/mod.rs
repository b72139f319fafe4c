// src/sources/mod.rs
//! Source adapters. Each one answers "give me raw records for this window and
//! category" or explains why it could not.

pub mod api;
pub mod browser;
pub mod demo;

use async_trait::async_trait;

use crate::config::options::CollectOptions;
use crate::error::AdapterFailure;
use crate::model::{Category, DateRange, SourceKind};
use crate::normalize::RawRecord;

#[async_trait]
pub trait SourceAdapter: Send {
    fn kind(&self) -> SourceKind;

    /// Raw records for one category. An empty `Ok` is treated like `no-data`.
    async fn collect(
        &mut self,
        range: &DateRange,
        category: Category,
    ) -> Result<Vec<RawRecord>, AdapterFailure>;

    /// Release external resources once every category is resolved.
    async fn shutdown(&mut self) {}
}

/// Adapters in fallback order. Demo is always last and always present.
pub fn default_adapters(opts: &CollectOptions) -> Vec<Box<dyn SourceAdapter>> {
    let mut adapters: Vec<Box<dyn SourceAdapter>> = Vec::with_capacity(3);
    if opts.use_api {
        adapters.push(Box::new(api::PublicApiAdapter::new(opts)));
    }
    if opts.use_browser {
        adapters.push(Box::new(browser::BrowserAdapter::chromium(opts)));
    }
    adapters.push(Box::new(demo::DemoAdapter::new(opts.demo_set)));
    adapters
}
