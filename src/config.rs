mod types;

use std::fs::File;
use std::io::{self, Read};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use take_mut::take;
use tracing::{debug, info};

use crate::loader::DEFAULT_TTL;
use crate::session::DEFAULT_IDLE_TIMEOUT;
use crate::widget::{WidgetConfig, DEFAULT_ERROR_IMG, DEFAULT_PAGE_SIZE};

pub use self::types::*;

fn default_bind_addr() -> String {
    Config::default().bind_addr
}

fn default_db_path() -> PathBuf {
    Config::default().db_path
}

fn default_instance() -> String {
    Config::default().instance
}

fn default_cache_ttl() -> Duration {
    Config::default().cache_ttl
}

fn default_session_idle() -> Duration {
    Config::default().session_idle
}

fn default_page_turning_number() -> NonZeroUsize {
    DEFAULT_PAGE_SIZE
}

fn default_error_img() -> String {
    DEFAULT_ERROR_IMG.into()
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Namespace for the persistent cache keys.
    #[serde(default = "default_instance")]
    pub instance: String,

    #[serde(default = "default_cache_ttl")]
    pub cache_ttl: Duration,

    /// How long a visitor's widget session survives without requests.
    #[serde(default = "default_session_idle")]
    pub session_idle: Duration,

    #[serde(default, alias = "private_api_url")]
    pub private_api_url: String,

    #[serde(default = "default_page_turning_number", alias = "page_turning_number")]
    pub page_turning_number: NonZeroUsize,

    #[serde(default = "default_error_img", alias = "error_img")]
    pub error_img: String,
}

impl Config {
    pub fn update(&mut self, args: crate::cli::Args) {
        fn set_if_some<T>(dst: &mut T, v: Option<T>) {
            if let Some(v) = v {
                *dst = v;
            }
        }

        set_if_some(&mut self.bind_addr, args.bind_addr);
        set_if_some(&mut self.db_path, args.db_path);
        set_if_some(&mut self.private_api_url, args.api_url);
    }

    pub fn resolve_relative_paths(&mut self, config_dir: impl AsRef<Path>) {
        let config_dir = config_dir.as_ref();

        take(self, |this| Self {
            bind_addr: this.bind_addr,
            db_path: config_dir.join(&this.db_path),
            instance: this.instance,
            cache_ttl: this.cache_ttl,
            session_idle: this.session_idle,
            private_api_url: this.private_api_url,
            page_turning_number: this.page_turning_number,
            error_img: this.error_img,
        })
    }

    pub fn widget(&self) -> WidgetConfig {
        WidgetConfig {
            private_api_url: self.private_api_url.clone(),
            page_turning_number: self.page_turning_number,
            error_img: self.error_img.clone(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind_addr: "127.0.0.1:20655".into(),
            db_path: "./fclite.sqlite3".into(),
            instance: "friend-circle-lite".into(),
            cache_ttl: DEFAULT_TTL.into(),
            session_idle: DEFAULT_IDLE_TIMEOUT.into(),
            private_api_url: String::new(),
            page_turning_number: default_page_turning_number(),
            error_img: default_error_img(),
        }
    }
}

pub fn load(search_paths: &[PathBuf]) -> Result<Config> {
    for path in search_paths {
        debug!("Trying to load {}", path.display());
        let mut contents = String::new();

        {
            let mut f = match File::open(path) {
                Ok(f) => f,

                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    debug!(file = %path.display(), "File not found, skipping");
                    continue;
                }

                Err(e) => {
                    return Err(e)
                        .context(anyhow!("could not load a config file `{}`", path.display()));
                }
            };

            f.read_to_string(&mut contents).with_context(|| {
                anyhow!(
                    "could not read the contents of a config file `{}`",
                    path.display()
                )
            })?;
        }

        let mut cfg: Config = toml::from_str(&contents)
            .with_context(|| anyhow!("could not load the config file `{}`", path.display()))?;

        if let Some(parent) = path.parent() {
            cfg.resolve_relative_paths(parent);
        }

        info!("Loaded a config file `{}`", path.display());

        return Ok(cfg);
    }

    info!("Using the default config");

    Ok(Default::default())
}
