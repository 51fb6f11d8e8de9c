use thiserror::Error;

/// Failures the widget can run into. None of them are fatal to the host page.
#[derive(Debug, Error)]
pub enum WidgetError {
    #[error("the feed at `{url}` is unavailable")]
    FeedUnavailable {
        url: String,

        #[source]
        source: FetchError,
    },

    #[error("the cached feed is corrupt: {0}")]
    CacheCorrupt(String),

    #[error("the feed has no articles")]
    EmptyFeed,

    #[error("could not persist the feed cache")]
    StorageWriteFailed(#[source] anyhow::Error),
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("`{url}` is not a valid URL: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("the request failed")]
    Request(#[from] reqwest::Error),

    #[error("the response body is not a valid feed")]
    Decode(#[from] serde_json::Error),
}
