use serde::Serialize;

use crate::feed::{Article, FeedStatistics};

/// What the widget has rendered into its region of the host page.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct WidgetView {
    pub statistics: Option<FeedStatistics>,
    pub spotlight: Option<SpotlightView>,
    pub cards: Vec<CardView>,
    pub load_more: bool,
    /// Set while a load is pending. Actions only redirect once their load is done, so this is
    /// seen by renders that overlap a load, such as a second tab of the same session.
    pub loading: bool,
    pub modal: Option<ModalView>,
    pub error_img: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CardView {
    pub title: String,
    pub link: String,
    pub author: String,
    pub author_url: String,
    pub avatar: String,
    pub date: String,
}

impl CardView {
    pub fn new(article: &Article, error_img: &str) -> Self {
        Self {
            title: article.title.clone(),
            link: article.link.clone(),
            author: article.author.clone(),
            author_url: author_url(&article.author),
            avatar: avatar_or(article, error_img),
            date: article.created_date().into(),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SpotlightView {
    pub title: String,
    pub author: String,
    pub link: String,
}

impl From<&Article> for SpotlightView {
    fn from(article: &Article) -> Self {
        Self {
            title: article.title.clone(),
            author: article.author.clone(),
            link: article.link.clone(),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ModalView {
    pub author: String,
    pub avatar: String,
    pub site: Option<String>,
    pub articles: Vec<ModalArticleView>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ModalArticleView {
    pub title: String,
    pub link: String,
    pub date: String,
}

impl From<&Article> for ModalArticleView {
    fn from(article: &Article) -> Self {
        Self {
            title: article.title.clone(),
            link: article.link.clone(),
            date: article.created_date().into(),
        }
    }
}

pub fn avatar_or(article: &Article, error_img: &str) -> String {
    match article.avatar.as_deref() {
        Some(avatar) if !avatar.is_empty() => avatar.into(),
        _ => error_img.into(),
    }
}

pub fn author_url(author: &str) -> String {
    format!("/widget/authors/{}", urlencoding::encode(author))
}
