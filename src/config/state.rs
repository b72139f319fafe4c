// src/config/state.rs
use super::options::{AppOptions, CollectOptions};
use crate::model::Category;

#[derive(Clone, Debug)]
pub struct GuiState {
    /// Category checkboxes in the left panel, indexed like `Category::ALL`
    pub selected_categories: [bool; 4],

    pub window_w: u32,
    pub window_h: u32,

    /// Free-text filter over id / title / institution
    pub search: String,
    /// Table filter (None = all)
    pub category_filter: Option<Category>,

    /// Editable copies of export settings
    pub out_dir_text: String,
    pub label_text: String,
}

impl Default for GuiState {
    fn default() -> Self {
        Self {
            selected_categories: [true; 4],
            window_w: 1200,
            window_h: 760,
            search: s!(),
            category_filter: None,
            out_dir_text: s!(super::consts::DEFAULT_OUT_DIR),
            label_text: s!(super::consts::DEFAULT_LABEL),
        }
    }
}

impl GuiState {
    pub fn categories(&self) -> Vec<Category> {
        Category::ALL
            .into_iter()
            .zip(self.selected_categories)
            .filter_map(|(c, on)| on.then_some(c))
            .collect()
    }
}

#[derive(Clone, Debug)]
pub struct AppState {
    pub options: AppOptions,
    pub gui: GuiState,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            options: AppOptions { collect: CollectOptions::from_env(), ..AppOptions::default() },
            gui: GuiState::default(),
        }
    }
}
