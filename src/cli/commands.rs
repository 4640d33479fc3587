use tokio::sync::watch;
use tracing::warn;

use crate::app::{AppContext, GazetteError, Result};
use crate::cli::LayoutAction;
use crate::domain::{Article, ViewState};
use crate::viewmodel::NewsViewModel;

/// Wait until the snapshot settles (not loading) and `pred` holds.
async fn settled(
    rx: &mut watch::Receiver<ViewState>,
    pred: impl Fn(&ViewState) -> bool,
) -> Result<ViewState> {
    loop {
        {
            let state = rx.borrow_and_update();
            if !state.is_loading && pred(&state) {
                return Ok(state.clone());
            }
        }
        rx.changed()
            .await
            .map_err(|_| GazetteError::Other("view state channel closed".into()))?;
    }
}

pub async fn refresh(ctx: &AppContext, country: Option<&str>) -> Result<()> {
    let country = country.unwrap_or(&ctx.config.default_country);
    let vm = NewsViewModel::new(ctx.repository.clone());
    vm.update_selected_country(country);

    // Subscribe before the call: notices are at-most-once broadcasts.
    let mut notices = vm.refresh_notices();
    vm.refresh_news().await;

    let count = notices
        .recv()
        .await
        .map_err(|_| GazetteError::Other("refresh notice channel closed".into()))?;
    println!("Updated with {} articles", count);
    Ok(())
}

pub async fn list(ctx: &AppContext, country: Option<&str>, query: Option<&str>) -> Result<()> {
    let country = country.unwrap_or(&ctx.config.default_country);
    let vm = NewsViewModel::new(ctx.repository.clone());
    vm.update_selected_country(country);
    if let Some(query) = query {
        vm.update_search_query(query);
    }

    let mut rx = vm.subscribe();
    let want_country = country.to_string();
    let want_query = query.unwrap_or("").to_string();
    let state = settled(&mut rx, |s| {
        s.selected_country == want_country && s.search_query == want_query
    })
    .await?;

    if state.news_list.is_empty() {
        println!("No cached headlines for '{}'", state.selected_country);
        return Ok(());
    }

    if state.is_grid {
        render_grid(&state.news_list);
    } else {
        render_list(&state.news_list);
    }
    Ok(())
}

fn render_list(articles: &[Article]) {
    for article in articles {
        println!("{}", article.title);
        println!("  {} ({})", article.source_name, article.display_author());
        if let Some(published_at) = &article.published_at {
            println!("  {}", published_at);
        }
        println!("  {}", article.url);
        println!();
    }
}

fn render_grid(articles: &[Article]) {
    const CELL: usize = 38;
    for pair in articles.chunks(2) {
        let left = truncate(&pair[0].title, CELL);
        let right = pair.get(1).map(|a| truncate(&a.title, CELL));
        match right {
            Some(right) => println!("{:<width$}  {}", left, right, width = CELL),
            None => println!("{}", left),
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

/// Detail view for one cached article: select it, derive its favorite
/// status through the view model, optionally toggle, then render.
pub async fn show(ctx: &AppContext, url: &str, toggle_favorite: bool) -> Result<()> {
    let article = ctx
        .repository
        .get_cached_article(url)?
        .ok_or_else(|| GazetteError::ArticleNotFound(url.to_string()))?;

    let vm = NewsViewModel::new(ctx.repository.clone());

    // Subscribe before selecting so the first derivation is not missed.
    let mut flag = vm.selected_is_favorite();
    vm.select_news(article.clone());
    flag.changed()
        .await
        .map_err(|_| GazetteError::Other("favorite channel closed".into()))?;
    let mut is_favorite = *flag.borrow_and_update();

    if toggle_favorite {
        vm.toggle_favorite(&article)?;
        while *flag.borrow_and_update() == is_favorite {
            flag.changed()
                .await
                .map_err(|_| GazetteError::Other("favorite channel closed".into()))?;
        }
        is_favorite = !is_favorite;
    }

    render_detail(&article, is_favorite);
    Ok(())
}

fn render_detail(article: &Article, is_favorite: bool) {
    println!("{}", article.title);
    println!("  {} ({})", article.source_name, article.display_author());
    println!("  Published: {}", article.display_published_at());
    println!("  Favorite: {}", if is_favorite { "yes" } else { "no" });
    println!();
    println!("{}", article.display_description());
    println!();
    println!("{}", article.display_content());
    println!();
    println!("  {}", article.url);
}

pub async fn favorites(ctx: &AppContext) -> Result<()> {
    let mut live = ctx.repository.watch_favorite_news();
    let favorites = match live.next().await {
        Some(result) => result?,
        None => Vec::new(),
    };

    if favorites.is_empty() {
        println!("No favorites");
        return Ok(());
    }

    for favorite in favorites {
        println!("{}", favorite.title);
        println!("  {}", favorite.url);
    }
    Ok(())
}

pub async fn favorite(ctx: &AppContext, url: &str) -> Result<()> {
    let article = ctx
        .repository
        .get_cached_article(url)?
        .ok_or_else(|| GazetteError::ArticleNotFound(url.to_string()))?;

    ctx.repository.add_favorite(&article)?;
    println!("Favorited: {}", article.title);
    Ok(())
}

pub async fn unfavorite(ctx: &AppContext, url: &str) -> Result<()> {
    // The article may have left the cache; favorites only need the URL.
    let article = match ctx.repository.get_cached_article(url)? {
        Some(article) => article,
        None => {
            let mut live = ctx.repository.watch_favorite_news();
            let favorites = live.next().await.unwrap_or(Ok(Vec::new()))?;
            let favorite = favorites
                .into_iter()
                .find(|f| f.url == url)
                .ok_or_else(|| GazetteError::ArticleNotFound(url.to_string()))?;
            Article {
                url: favorite.url,
                title: favorite.title,
                description: favorite.description,
                author: favorite.author,
                source_name: favorite.source_name,
                url_to_image: favorite.url_to_image,
                published_at: favorite.published_at,
                content: favorite.content,
                country: String::new(),
            }
        }
    };

    ctx.repository.remove_favorite(&article)?;
    println!("Unfavorited: {}", article.title);
    Ok(())
}

pub fn clear_cache(ctx: &AppContext) -> Result<()> {
    ctx.repository.clear_all_news()?;
    println!("Headline cache cleared");
    Ok(())
}

pub fn layout(ctx: &AppContext, action: LayoutAction) -> Result<()> {
    let current = *ctx.repository.grid_layout().borrow();
    let next = match action {
        LayoutAction::Show => {
            println!("{}", if current { "grid" } else { "list" });
            return Ok(());
        }
        LayoutAction::Grid => true,
        LayoutAction::List => false,
        LayoutAction::Toggle => !current,
    };

    ctx.repository.set_grid_layout(next)?;
    println!("Display format: {}", if next { "grid" } else { "list" });
    Ok(())
}

/// Fire-and-forget: a browser that fails to launch is only logged.
pub fn open_in_browser(url: &str) {
    if let Err(e) = open::that(url) {
        warn!(url, error = %e, "failed to open browser");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::prefs::Preferences;
    use crate::remote::{HttpNewsSource, NewsSource};
    use crate::repository::NewsRepository;
    use crate::store::{SqliteStore, Store};
    use std::sync::Arc;

    const CACHED_URL: &str = "https://example.com/cached";

    /// Context with one article already cached; the remote client points
    /// nowhere and is never called.
    fn context_with_cached_article() -> AppContext {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        store
            .insert_articles(&[Article {
                url: CACHED_URL.into(),
                title: "Cached headline".into(),
                description: None,
                author: None,
                source_name: "Example Times".into(),
                url_to_image: None,
                published_at: None,
                content: None,
                country: "us".into(),
            }])
            .unwrap();

        let source: Arc<dyn NewsSource + Send + Sync> =
            Arc::new(HttpNewsSource::new("http://127.0.0.1:1/", "test-key".into()).unwrap());
        let repository = Arc::new(NewsRepository::new(
            store,
            source,
            Arc::new(Preferences::in_memory()),
        ));

        AppContext {
            repository,
            config: Config::default(),
        }
    }

    #[tokio::test]
    async fn test_show_renders_cached_article() {
        let ctx = context_with_cached_article();
        show(&ctx, CACHED_URL, false).await.unwrap();

        // Viewing alone leaves favorites untouched
        let mut live = ctx.repository.watch_is_favorite(CACHED_URL);
        assert!(!live.next().await.unwrap().unwrap());
    }

    #[tokio::test]
    async fn test_show_toggle_favorites_and_back() {
        let ctx = context_with_cached_article();

        show(&ctx, CACHED_URL, true).await.unwrap();
        let mut live = ctx.repository.watch_is_favorite(CACHED_URL);
        assert!(live.next().await.unwrap().unwrap());

        show(&ctx, CACHED_URL, true).await.unwrap();
        let mut live = ctx.repository.watch_is_favorite(CACHED_URL);
        assert!(!live.next().await.unwrap().unwrap());
    }

    #[tokio::test]
    async fn test_show_unknown_url_errors() {
        let ctx = context_with_cached_article();
        let result = show(&ctx, "https://example.com/not-cached", false).await;
        assert!(matches!(result, Err(GazetteError::ArticleNotFound(_))));
    }

    #[test]
    fn test_truncate_short_string_unchanged() {
        assert_eq!(truncate("short", 10), "short");
    }

    #[test]
    fn test_truncate_long_string_ellipsized() {
        let out = truncate("a very long headline indeed", 10);
        assert_eq!(out.chars().count(), 10);
        assert!(out.ends_with('…'));
    }
}
