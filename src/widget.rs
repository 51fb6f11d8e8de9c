//! The widget lifecycle: load the feed, page through it, show a random spotlight
//! and per-author modals.
//!
//! A [`WidgetSession`] lives in a caller-owned [`WidgetSlot`]. Every call to
//! [`WidgetController::initialize`] replaces the session with a fresh one under a new
//! generation; loads that complete for an older generation are dropped.

pub mod author;
pub mod paginator;
pub mod random;
pub mod view;

use std::num::NonZeroUsize;
use std::sync::{Mutex, PoisonError};

use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::{debug, error, info, warn};

use crate::cache::KvStore;
use crate::feed::FeedSnapshot;
use crate::loader::{FeedLoader, FeedSource};

use self::author::{articles_by_author, DEFAULT_AUTHOR_LIMIT};
use self::paginator::Paginator;
use self::random::pick_random;
use self::view::{avatar_or, CardView, ModalView, SpotlightView, WidgetView};

pub const DEFAULT_PAGE_SIZE: NonZeroUsize = match NonZeroUsize::new(20) {
    Some(n) => n,
    None => unreachable!(),
};

pub const DEFAULT_ERROR_IMG: &str =
    "https://fastly.jsdelivr.net/gh/willow-god/Friend-Circle-Lite@latest/static/favicon.ico";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetConfig {
    pub private_api_url: String,
    pub page_turning_number: NonZeroUsize,
    pub error_img: String,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            private_api_url: String::new(),
            page_turning_number: DEFAULT_PAGE_SIZE,
            error_img: DEFAULT_ERROR_IMG.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetState {
    Uninitialized,
    Loading,
    Ready,
    LoadingMore,
    Failed,
}

pub struct WidgetSession {
    generation: u64,
    state: WidgetState,
    config: WidgetConfig,
    snapshot: Option<FeedSnapshot>,
    paginator: Paginator,
    rng: SmallRng,
    view: WidgetView,
}

impl WidgetSession {
    fn new(generation: u64, config: WidgetConfig) -> Self {
        let view = WidgetView {
            error_img: config.error_img.clone(),
            ..Default::default()
        };

        Self {
            generation,
            state: WidgetState::Uninitialized,
            paginator: Paginator::new(config.page_turning_number),
            config,
            snapshot: None,
            rng: SmallRng::from_entropy(),
            view,
        }
    }

    fn is_exhausted(&self) -> bool {
        self.snapshot
            .as_ref()
            .map_or(true, |snapshot| self.paginator.is_exhausted(&snapshot.articles))
    }

    /// Stores a freshly loaded snapshot and renders statistics, the spotlight and the next page.
    ///
    /// "Load more" goes through here as well, so statistics and the spotlight are re-rendered on
    /// every page.
    fn apply(&mut self, snapshot: FeedSnapshot) {
        self.snapshot = Some(snapshot);
        self.state = WidgetState::Ready;
        self.render_statistics();
        self.render_spotlight();
        self.render_next_page();
    }

    fn render_statistics(&mut self) {
        self.view.statistics = self.snapshot.as_ref().map(|s| s.statistics.clone());
    }

    fn render_spotlight(&mut self) {
        let Some(snapshot) = &self.snapshot else {
            return;
        };

        self.view.spotlight = match pick_random(&snapshot.articles, &mut self.rng) {
            Ok(article) => Some(SpotlightView::from(article)),

            Err(e) => {
                debug!("Omitting the spotlight: {e}");
                None
            }
        };
    }

    fn render_next_page(&mut self) {
        let Some(snapshot) = &self.snapshot else {
            return;
        };

        let page = self.paginator.next_page(&snapshot.articles);
        let error_img = &self.config.error_img;
        self.view
            .cards
            .extend(page.items.iter().map(|article| CardView::new(article, error_img)));
        self.view.load_more = !page.exhausted;

        debug!(
            cursor = self.paginator.cursor(),
            rendered = page.items.len(),
            exhausted = page.exhausted,
            "Rendered a page"
        );
    }

    fn fail(&mut self) {
        self.state = WidgetState::Failed;
        self.view.load_more = false;
        self.view.loading = false;
    }
}

#[cfg(test)]
impl WidgetSession {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn state(&self) -> WidgetState {
        self.state
    }

    pub fn snapshot(&self) -> Option<&FeedSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn paginator(&self) -> &Paginator {
        &self.paginator
    }
}

/// Holds the current session. Never locked across an `.await`.
pub struct WidgetSlot(Mutex<WidgetSession>);

impl WidgetSlot {
    pub fn new() -> Self {
        Self(Mutex::new(WidgetSession::new(0, WidgetConfig::default())))
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut WidgetSession) -> R) -> R {
        let mut session = self.0.lock().unwrap_or_else(PoisonError::into_inner);

        f(&mut session)
    }

    pub fn view(&self) -> WidgetView {
        self.with(|session| session.view.clone())
    }
}

impl Default for WidgetSlot {
    fn default() -> Self {
        Self::new()
    }
}

pub struct WidgetController<F, S> {
    loader: FeedLoader<F, S>,
}

impl<F: FeedSource, S: KvStore> WidgetController<F, S> {
    pub fn new(loader: FeedLoader<F, S>) -> Self {
        Self { loader }
    }

    /// Tears down the current session and loads the feed into a new one.
    pub async fn initialize(&self, slot: &WidgetSlot, config: &WidgetConfig) {
        let generation = slot.with(|session| {
            let generation = session.generation + 1;
            *session = WidgetSession::new(generation, config.clone());
            session.state = WidgetState::Loading;
            session.view.loading = true;

            generation
        });
        info!(generation, "Initializing the widget");

        let result = self.loader.load(&config.private_api_url).await;

        slot.with(|session| {
            if session.generation != generation {
                debug!(
                    generation,
                    current = session.generation,
                    "Discarding a feed load for a replaced session"
                );
                return;
            }

            session.view.loading = false;

            match result {
                Ok(snapshot) => {
                    info!(generation, "Loaded {} articles", snapshot.articles.len());
                    session.apply(snapshot);
                }

                Err(e) => {
                    error!("Could not initialize the widget: {:#}", anyhow::Error::from(e));
                    session.fail();
                }
            }
        })
    }

    /// Appends the next page. Returns whether anything was rendered.
    pub async fn request_more(&self, slot: &WidgetSlot) -> bool {
        let pending = slot.with(|session| {
            if session.state != WidgetState::Ready {
                debug!(state = ?session.state, "Ignoring a load-more request");
                return None;
            }

            if session.is_exhausted() {
                debug!("Ignoring a load-more request: no more articles");
                return None;
            }

            session.state = WidgetState::LoadingMore;
            session.view.loading = true;

            Some((session.generation, session.config.private_api_url.clone()))
        });
        let Some((generation, base_url)) = pending else {
            return false;
        };

        let result = self.loader.load(&base_url).await;

        slot.with(|session| {
            if session.generation != generation {
                debug!(
                    generation,
                    current = session.generation,
                    "Discarding a load-more result for a replaced session"
                );
                return false;
            }

            session.state = WidgetState::Ready;
            session.view.loading = false;

            match result {
                Ok(snapshot) => {
                    session.apply(snapshot);
                    true
                }

                Err(e) => {
                    warn!("Could not load more articles: {:#}", anyhow::Error::from(e));
                    false
                }
            }
        })
    }

    pub fn refresh_spotlight(&self, slot: &WidgetSlot) {
        slot.with(|session| session.render_spotlight())
    }

    /// Opens the author modal, reusing it if one is already open.
    /// Returns `false` if the current feed has no articles by `author`.
    pub fn open_author(&self, slot: &WidgetSlot, author: &str) -> bool {
        slot.with(|session| {
            let Some(snapshot) = &session.snapshot else {
                return false;
            };

            let articles = articles_by_author(&snapshot.articles, author, DEFAULT_AUTHOR_LIMIT);
            let Some(first) = articles.first() else {
                debug!(%author, "No articles by this author");
                return false;
            };

            let modal = ModalView {
                author: author.into(),
                avatar: avatar_or(first, &session.config.error_img),
                site: first.site(),
                articles: articles.iter().map(|&article| article.into()).collect(),
            };

            if session.view.modal.replace(modal).is_some() {
                debug!(%author, "Reusing the open author modal");
            }

            true
        })
    }

    pub fn close_author(&self, slot: &WidgetSlot) -> bool {
        slot.with(|session| session.view.modal.take().is_some())
    }
}
