pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "gazette")]
#[command(about = "A country-scoped headline reader", long_about = None)]
pub struct Cli {
    /// Two-letter country code (overrides the configured default)
    #[arg(short, long, global = true)]
    pub country: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch fresh top headlines into the cache
    Refresh,
    /// Show cached headlines
    List {
        /// Filter by case-insensitive substring of title or description
        #[arg(short, long)]
        query: Option<String>,
    },
    /// Show a cached article's detail view
    Show {
        /// URL of the article to show
        url: String,
        /// Flip the article's favorite status before rendering
        #[arg(long)]
        toggle_favorite: bool,
    },
    /// Show favorited articles
    Favorites,
    /// Favorite a cached article by URL
    Favorite {
        /// URL of the article to favorite
        url: String,
    },
    /// Remove an article from favorites by URL
    Unfavorite {
        /// URL of the article to unfavorite
        url: String,
    },
    /// Empty the headline cache (favorites are kept)
    ClearCache,
    /// Show or change the list/grid display format
    Layout {
        #[arg(value_enum, default_value_t = LayoutAction::Show)]
        action: LayoutAction,
    },
    /// Open an article URL in the system browser
    Open {
        /// URL to open
        url: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LayoutAction {
    Show,
    Grid,
    List,
    Toggle,
}
