// src/progress.rs
use crate::model::{Category, SourceKind};

/// Lightweight progress reporting used by a collection run.
/// Frontends (GUI/CLI) implement this to surface status to users.
pub trait Progress {
    /// Called at the start with the number of categories to resolve.
    fn begin(&mut self, _total: usize) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// Called when one category is resolved, with the adapter that settled it.
    fn item_done(&mut self, _category: Category, _method: Option<SourceKind>) {}

    /// Called at the end, successful or not.
    fn finish(&mut self) {}
}

/// A no-op progress sink.
pub struct NullProgress;
impl Progress for NullProgress {}

/// Plain stdout lines for the CLI.
#[derive(Default)]
pub struct ConsoleProgress {
    done: usize,
    total: usize,
}

impl Progress for ConsoleProgress {
    fn begin(&mut self, total: usize) {
        self.total = total;
        println!("Collecting {} categories…", total);
    }
    fn item_done(&mut self, category: Category, method: Option<SourceKind>) {
        self.done += 1;
        let via = method.map_or("nothing collected", |m| m.label());
        println!("[{}/{}] {} ({}): {}", self.done, self.total, category, category.local_name(), via);
    }
    fn finish(&mut self) {
        println!("Collection complete ({}/{})", self.done, self.total);
    }
}
