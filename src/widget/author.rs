use crate::feed::Article;

pub const DEFAULT_AUTHOR_LIMIT: usize = 4;

/// The first `limit` articles by exactly `author`, in feed order.
pub fn articles_by_author<'a>(articles: &'a [Article], author: &str, limit: usize) -> Vec<&'a Article> {
    articles
        .iter()
        .filter(|article| article.author == author)
        .take(limit)
        .collect()
}
