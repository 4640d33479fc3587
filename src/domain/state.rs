use crate::domain::Article;

pub const DEFAULT_COUNTRY: &str = "us";

/// The presentation-facing snapshot. Every transition replaces the whole
/// value through the view model's watch channel; subscribers never observe
/// a partially-updated record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub news_list: Vec<Article>,
    pub search_query: String,
    pub selected_country: String,
    pub is_grid: bool,
    pub is_loading: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            news_list: Vec::new(),
            search_query: String::new(),
            selected_country: DEFAULT_COUNTRY.to_string(),
            is_grid: false,
            is_loading: false,
        }
    }
}
