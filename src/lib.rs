// src/lib.rs

#[macro_use]
pub mod macros;
#[macro_use]
pub mod log;

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod model;

pub mod collect;
pub mod csv;
pub mod file;
pub mod normalize;
pub mod progress;
pub mod runner;
pub mod sources;
pub mod store;
pub mod summary;

#[cfg(feature = "gui")]
pub mod gui;
