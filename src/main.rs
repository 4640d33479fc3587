use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use gazette::app::AppContext;
use gazette::cli::{commands, Cli, Commands};
use gazette::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;
    let ctx = AppContext::new(config, None)?;
    let country = cli.country.as_deref();

    match cli.command {
        Commands::Refresh => {
            commands::refresh(&ctx, country).await?;
        }
        Commands::List { query } => {
            commands::list(&ctx, country, query.as_deref()).await?;
        }
        Commands::Show {
            url,
            toggle_favorite,
        } => {
            commands::show(&ctx, &url, toggle_favorite).await?;
        }
        Commands::Favorites => {
            commands::favorites(&ctx).await?;
        }
        Commands::Favorite { url } => {
            commands::favorite(&ctx, &url).await?;
        }
        Commands::Unfavorite { url } => {
            commands::unfavorite(&ctx, &url).await?;
        }
        Commands::ClearCache => {
            commands::clear_cache(&ctx)?;
        }
        Commands::Layout { action } => {
            commands::layout(&ctx, action)?;
        }
        Commands::Open { url } => {
            commands::open_in_browser(&url);
        }
    }

    Ok(())
}
