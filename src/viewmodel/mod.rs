//! The view state holder: single owner of presentation-facing state.
//!
//! Every user intent funnels through [`NewsViewModel`], which talks to the
//! repository and publishes complete [`ViewState`] snapshots on a watch
//! channel. Background work runs in owned tasks; replacing a subscription
//! always aborts the old task before installing the new one, so a stale
//! emission can never overwrite a newer snapshot.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::warn;

use crate::app::Result;
use crate::domain::{Article, ViewState};
use crate::repository::NewsRepository;

const REFRESH_NOTICE_CAPACITY: usize = 8;

pub struct NewsViewModel {
    repository: Arc<NewsRepository>,
    state: watch::Sender<ViewState>,
    selected: watch::Sender<Option<Article>>,
    selected_is_favorite: watch::Sender<bool>,
    refresh_count: broadcast::Sender<usize>,
    news_task: Mutex<Option<JoinHandle<()>>>,
    favorite_task: Mutex<Option<JoinHandle<()>>>,
    prefs_task: Mutex<Option<JoinHandle<()>>>,
}

impl NewsViewModel {
    pub fn new(repository: Arc<NewsRepository>) -> Self {
        let (state, _) = watch::channel(ViewState::default());
        let (selected, _) = watch::channel(None);
        let (selected_is_favorite, _) = watch::channel(false);
        let (refresh_count, _) = broadcast::channel(REFRESH_NOTICE_CAPACITY);

        let vm = Self {
            repository,
            state,
            selected,
            selected_is_favorite,
            refresh_count,
            news_task: Mutex::new(None),
            favorite_task: Mutex::new(None),
            prefs_task: Mutex::new(None),
        };

        vm.watch_preferences();
        let country = vm.state.borrow().selected_country.clone();
        vm.load_news(&country);
        vm
    }

    /// Snapshot stream. The receiver always holds the current snapshot.
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.subscribe()
    }

    pub fn selected_news(&self) -> watch::Receiver<Option<Article>> {
        self.selected.subscribe()
    }

    /// Derived favorite flag for the current selection. Constant `false`
    /// while nothing is selected.
    pub fn selected_is_favorite(&self) -> watch::Receiver<bool> {
        self.selected_is_favorite.subscribe()
    }

    /// One-shot "updated with N articles" notices. Broadcast semantics: a
    /// subscriber attaching after an emission misses it.
    pub fn refresh_notices(&self) -> broadcast::Receiver<usize> {
        self.refresh_count.subscribe()
    }

    /// Mirror the persisted grid preference into the snapshot for the
    /// holder's lifetime.
    fn watch_preferences(&self) {
        let mut rx = self.repository.grid_layout();
        let state = self.state.clone();
        let handle = tokio::spawn(async move {
            loop {
                let is_grid = *rx.borrow_and_update();
                state.send_modify(|s| s.is_grid = is_grid);
                if rx.changed().await.is_err() {
                    break;
                }
            }
        });
        *lock(&self.prefs_task) = Some(handle);
    }

    /// Subscribe to the cached headlines for `country`, filtering each
    /// emission by the snapshot's current search query.
    ///
    /// Latest query wins: the previous news task is aborted before the
    /// replacement is installed.
    fn load_news(&self, country: &str) {
        self.state.send_modify(|s| s.is_loading = true);

        let mut guard = lock(&self.news_task);
        if let Some(old) = guard.take() {
            old.abort();
        }

        let mut live = self.repository.watch_news(country);
        let state = self.state.clone();
        *guard = Some(tokio::spawn(async move {
            while let Some(result) = live.next().await {
                match result {
                    Ok(articles) => state.send_modify(|s| {
                        s.news_list = articles
                            .iter()
                            .filter(|a| a.matches_query(&s.search_query))
                            .cloned()
                            .collect();
                        s.is_loading = false;
                    }),
                    Err(e) => {
                        warn!(error = %e, "news subscription failed");
                        break;
                    }
                }
            }
        }));
    }

    /// Fetch fresh headlines for the selected country, then announce the
    /// fetched count on the notice stream.
    pub async fn refresh_news(&self) {
        let country = self.state.borrow().selected_country.clone();
        self.state.send_modify(|s| s.is_loading = true);

        let fetched = self.repository.refresh_news(&country).await;

        self.state.send_modify(|s| s.is_loading = false);
        let _ = self.refresh_count.send(fetched.len());
    }

    pub fn update_search_query(&self, query: &str) {
        self.state
            .send_modify(|s| s.search_query = query.to_string());
        let country = self.state.borrow().selected_country.clone();
        self.load_news(&country);
    }

    pub fn update_selected_country(&self, country: &str) {
        self.state
            .send_modify(|s| s.selected_country = country.to_string());
        self.load_news(country);
    }

    pub fn toggle_display_format(&self) -> Result<()> {
        let is_grid = !self.state.borrow().is_grid;
        self.repository.set_grid_layout(is_grid)?;
        self.state.send_modify(|s| s.is_grid = is_grid);
        Ok(())
    }

    /// Install `article` as the selection and re-derive the favorite flag
    /// from a fresh favorites subscription.
    pub fn select_news(&self, article: Article) {
        let url = article.url.clone();
        self.selected.send_replace(Some(article));

        let mut guard = lock(&self.favorite_task);
        if let Some(old) = guard.take() {
            old.abort();
        }

        let mut live = self.repository.watch_is_favorite(&url);
        let flag = self.selected_is_favorite.clone();
        *guard = Some(tokio::spawn(async move {
            while let Some(result) = live.next().await {
                match result {
                    Ok(is_favorite) => {
                        flag.send_replace(is_favorite);
                    }
                    Err(e) => {
                        warn!(error = %e, "favorite subscription failed");
                        break;
                    }
                }
            }
        }));
    }

    /// Check-then-act on the derived favorite flag. A concurrent double
    /// invocation can double-add or double-remove; both store operations
    /// are idempotent, so the race has no observable effect.
    pub fn toggle_favorite(&self, article: &Article) -> Result<()> {
        if *self.selected_is_favorite.borrow() {
            self.repository.remove_favorite(article)
        } else {
            self.repository.add_favorite(article)
        }
    }

    /// Drops the article cache. Favorites, the search query, and the
    /// selected country stay as they are.
    pub fn clear_cache(&self) -> Result<()> {
        self.repository.clear_all_news()
    }
}

impl Drop for NewsViewModel {
    fn drop(&mut self) {
        for slot in [&self.news_task, &self.favorite_task, &self.prefs_task] {
            if let Some(task) = lock(slot).take() {
                task.abort();
            }
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{GazetteError, Result};
    use crate::prefs::Preferences;
    use crate::remote::{ApiArticle, ApiSource, HeadlinesResponse, NewsSource};
    use crate::store::SqliteStore;
    use async_trait::async_trait;
    use std::time::Duration;

    struct FixedSource {
        articles: Vec<(String, String, Option<String>)>,
    }

    #[async_trait]
    impl NewsSource for FixedSource {
        async fn top_headlines(&self, _country: &str) -> Result<HeadlinesResponse> {
            let articles: Vec<ApiArticle> = self
                .articles
                .iter()
                .map(|(url, title, description)| ApiArticle {
                    source: ApiSource {
                        id: None,
                        name: Some("Example Times".into()),
                    },
                    author: None,
                    title: Some(title.clone()),
                    description: description.clone(),
                    url: Some(url.clone()),
                    url_to_image: None,
                    published_at: None,
                    content: None,
                })
                .collect();
            Ok(HeadlinesResponse {
                status: "ok".into(),
                total_results: articles.len() as u64,
                articles,
            })
        }
    }

    struct FailingSource;

    #[async_trait]
    impl NewsSource for FailingSource {
        async fn top_headlines(&self, _country: &str) -> Result<HeadlinesResponse> {
            Err(GazetteError::Other("network down".into()))
        }
    }

    fn view_model(source: Arc<dyn NewsSource + Send + Sync>) -> NewsViewModel {
        let repository = Arc::new(NewsRepository::new(
            Arc::new(SqliteStore::in_memory().unwrap()),
            source,
            Arc::new(Preferences::in_memory()),
        ));
        NewsViewModel::new(repository)
    }

    async fn wait_for(
        rx: &mut watch::Receiver<ViewState>,
        pred: impl Fn(&ViewState) -> bool,
    ) -> ViewState {
        tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                {
                    let state = rx.borrow_and_update();
                    if pred(&state) {
                        return state.clone();
                    }
                }
                rx.changed().await.expect("view model dropped");
            }
        })
        .await
        .expect("timed out waiting for snapshot")
    }

    fn two_headlines() -> Arc<FixedSource> {
        Arc::new(FixedSource {
            articles: vec![
                (
                    "https://e.com/1".into(),
                    "Breaking News Today".into(),
                    Some("Markets move".into()),
                ),
                (
                    "https://e.com/2".into(),
                    "Quiet afternoon".into(),
                    Some("Nothing happened".into()),
                ),
            ],
        })
    }

    #[tokio::test]
    async fn test_refresh_populates_snapshot_and_notice() {
        let vm = view_model(two_headlines());
        let mut rx = vm.subscribe();
        let mut notices = vm.refresh_notices();

        vm.refresh_news().await;

        assert_eq!(notices.recv().await.unwrap(), 2);
        let state = wait_for(&mut rx, |s| s.news_list.len() == 2).await;
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn test_search_filters_title_and_description() {
        let vm = view_model(two_headlines());
        let mut rx = vm.subscribe();
        vm.refresh_news().await;
        wait_for(&mut rx, |s| s.news_list.len() == 2).await;

        // "news" hits only the first title
        vm.update_search_query("news");
        let state = wait_for(&mut rx, |s| s.news_list.len() == 1).await;
        assert_eq!(state.news_list[0].url, "https://e.com/1");

        // "nothing" hits only the second article, via its description
        vm.update_search_query("NOTHING");
        let state = wait_for(&mut rx, |s| {
            s.news_list.len() == 1 && s.news_list[0].url == "https://e.com/2"
        })
        .await;
        assert_eq!(state.search_query, "NOTHING");

        vm.update_search_query("");
        wait_for(&mut rx, |s| s.news_list.len() == 2).await;
    }

    #[tokio::test]
    async fn test_country_change_supersedes_subscription() {
        let vm = view_model(two_headlines());
        let mut rx = vm.subscribe();
        vm.refresh_news().await;
        wait_for(&mut rx, |s| s.news_list.len() == 2).await;

        // Nothing cached under "fr": latest subscription wins, list empties.
        vm.update_selected_country("fr");
        let state = wait_for(&mut rx, |s| {
            s.selected_country == "fr" && s.news_list.is_empty()
        })
        .await;
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn test_refresh_failure_yields_zero_notice() {
        let vm = view_model(Arc::new(FailingSource));
        let mut rx = vm.subscribe();
        let mut notices = vm.refresh_notices();

        vm.refresh_news().await;

        assert_eq!(notices.recv().await.unwrap(), 0);
        let state = wait_for(&mut rx, |s| !s.is_loading).await;
        assert!(state.news_list.is_empty());
    }

    #[tokio::test]
    async fn test_select_and_toggle_favorite() {
        let vm = view_model(two_headlines());
        let mut rx = vm.subscribe();
        vm.refresh_news().await;
        let state = wait_for(&mut rx, |s| s.news_list.len() == 2).await;

        let article = state.news_list[0].clone();
        vm.select_news(article.clone());

        let mut flag = vm.selected_is_favorite();
        tokio::time::timeout(Duration::from_secs(2), async {
            // Initial derivation for a fresh selection is false
            while *flag.borrow_and_update() {
                flag.changed().await.unwrap();
            }
        })
        .await
        .unwrap();

        vm.toggle_favorite(&article).unwrap();
        tokio::time::timeout(Duration::from_secs(2), async {
            while !*flag.borrow_and_update() {
                flag.changed().await.unwrap();
            }
        })
        .await
        .unwrap();

        vm.toggle_favorite(&article).unwrap();
        tokio::time::timeout(Duration::from_secs(2), async {
            while *flag.borrow_and_update() {
                flag.changed().await.unwrap();
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_clear_cache_keeps_favorites_and_query() {
        let vm = view_model(two_headlines());
        let mut rx = vm.subscribe();
        vm.refresh_news().await;
        let state = wait_for(&mut rx, |s| s.news_list.len() == 2).await;

        let article = state.news_list[0].clone();
        vm.select_news(article.clone());
        vm.toggle_favorite(&article).unwrap();
        vm.update_search_query("news");
        wait_for(&mut rx, |s| s.news_list.len() == 1).await;

        vm.clear_cache().unwrap();

        let state = wait_for(&mut rx, |s| s.news_list.is_empty()).await;
        assert_eq!(state.search_query, "news");
        assert_eq!(state.selected_country, "us");

        let mut favorites = vm.repository.watch_favorite_news();
        assert_eq!(favorites.next().await.unwrap().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_toggle_display_format_persists() {
        let vm = view_model(two_headlines());
        let mut rx = vm.subscribe();

        vm.toggle_display_format().unwrap();
        let state = wait_for(&mut rx, |s| s.is_grid).await;
        assert!(state.is_grid);
        assert!(*vm.repository.grid_layout().borrow());

        vm.toggle_display_format().unwrap();
        wait_for(&mut rx, |s| !s.is_grid).await;
        assert!(!*vm.repository.grid_layout().borrow());
    }

    #[tokio::test]
    async fn test_late_notice_subscriber_misses_emission() {
        let vm = view_model(two_headlines());
        vm.refresh_news().await;

        // Attached after the emission: nothing buffered for us.
        let mut notices = vm.refresh_notices();
        assert!(matches!(
            notices.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }
}
