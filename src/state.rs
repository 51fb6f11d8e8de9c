use std::sync::Arc;

use anyhow::Result;
use handlebars::Handlebars;

use crate::cache::{CacheKey, FeedCache};
use crate::config::Config;
use crate::loader::{FeedLoader, HttpSource};
use crate::session::Sessions;
use crate::storage::Storage;
use crate::template;
use crate::widget::{WidgetConfig, WidgetController};

pub type Controller = WidgetController<HttpSource, Storage>;

#[derive(Clone)]
pub struct State {
    pub cfg: Arc<Config>,
    pub widget_cfg: Arc<WidgetConfig>,
    pub controller: Arc<Controller>,
    pub sessions: Arc<Sessions>,
    pub template: Arc<Handlebars<'static>>,
}

impl State {
    pub async fn new(cfg: Config) -> Result<Self> {
        let storage = Storage::new(&cfg.db_path).await?;
        let loader = FeedLoader::new(
            HttpSource::new()?,
            FeedCache::new(storage),
            CacheKey::for_instance(&cfg.instance),
            cfg.cache_ttl.into(),
        );
        let controller = Arc::new(WidgetController::new(loader));
        let widget_cfg = Arc::new(cfg.widget());
        let sessions = Arc::new(Sessions::new(cfg.session_idle.into()));
        let cfg = Arc::new(cfg);
        let template = Arc::new(template::new());

        Ok(State {
            cfg,
            widget_cfg,
            controller,
            sessions,
            template,
        })
    }
}
