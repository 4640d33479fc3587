pub mod article;
pub mod state;

pub use article::{Article, FavoriteArticle};
pub use state::{ViewState, DEFAULT_COUNTRY};
