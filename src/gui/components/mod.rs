// src/gui/components/mod.rs
pub mod bid_table;
pub mod category_panel;
pub mod export_bar;
pub mod stats_panel;
