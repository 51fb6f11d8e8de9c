use reqwest::Url;
use serde::{Deserialize, Serialize};

/// A single friend article as served by the feed endpoint.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub link: String,
    pub author: String,

    #[serde(default)]
    pub avatar: Option<String>,

    /// ISO-8601 date-time, kept verbatim.
    pub created: String,
}

impl Article {
    /// The `YYYY-MM-DD` part of the creation timestamp.
    pub fn created_date(&self) -> &str {
        match self.created.char_indices().nth(10) {
            Some((idx, _)) => &self.created[..idx],
            None => &self.created,
        }
    }

    /// The origin of the article link, used as the author's site.
    pub fn site(&self) -> Option<String> {
        let url = Url::parse(&self.link).ok()?;
        let host = url.host_str()?;

        Some(match url.port() {
            Some(port) => format!("{}://{host}:{port}", url.scheme()),
            None => format!("{}://{host}", url.scheme()),
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FeedStatistics {
    pub friends_num: u64,
    pub active_num: u64,
    pub article_num: u64,
    pub last_updated_time: String,
}

/// One fetched copy of the feed. Articles stay in feed order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FeedSnapshot {
    #[serde(rename = "article_data")]
    pub articles: Vec<Article>,

    #[serde(rename = "statistical_data")]
    pub statistics: FeedStatistics,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub fn article(idx: usize, author: &str) -> Article {
        Article {
            title: format!("Article #{idx}"),
            link: format!("https://{author}.example.com/posts/{idx}"),
            author: author.into(),
            avatar: Some(format!("https://{author}.example.com/avatar.png")),
            created: "2024-08-01T12:30:00+08:00".into(),
        }
    }

    pub fn snapshot(count: usize) -> FeedSnapshot {
        let authors = ["alice", "bob", "carol"];
        let articles = (0..count)
            .map(|idx| article(idx, authors[idx % authors.len()]))
            .collect::<Vec<_>>();

        FeedSnapshot {
            statistics: FeedStatistics {
                friends_num: 3,
                active_num: 3,
                article_num: articles.len() as u64,
                last_updated_time: "2024-08-01 12:30:00".into(),
            },
            articles,
        }
    }

    #[test]
    fn parses_endpoint_json() {
        let body = r#"{
            "article_data": [
                {
                    "title": "Hello",
                    "link": "https://blog.example.com:8443/hello/",
                    "author": "Alice",
                    "avatar": "https://blog.example.com/a.png",
                    "created": "2024-07-30 10:00"
                },
                {
                    "title": "No avatar",
                    "link": "https://other.example.org/x",
                    "author": "Bob",
                    "avatar": null,
                    "created": "2024-07-29"
                },
                {
                    "title": "Missing avatar",
                    "link": "not a url",
                    "author": "Carol",
                    "created": "2024-07-28T00:00:00Z"
                }
            ],
            "statistical_data": {
                "friends_num": 10,
                "active_num": 7,
                "article_num": 3,
                "last_updated_time": "2024-07-30 12:00:00"
            }
        }"#;

        let snapshot: FeedSnapshot = serde_json::from_str(body).unwrap();

        assert_eq!(snapshot.articles.len(), 3);
        assert_eq!(snapshot.statistics.friends_num, 10);
        assert_eq!(snapshot.articles[0].created_date(), "2024-07-30");
        assert_eq!(snapshot.articles[1].created_date(), "2024-07-29");
        assert_eq!(snapshot.articles[1].avatar, None);
        assert_eq!(snapshot.articles[2].avatar, None);
        assert_eq!(
            snapshot.articles[0].site().as_deref(),
            Some("https://blog.example.com:8443")
        );
        assert_eq!(snapshot.articles[2].site(), None);
    }

    #[test]
    fn rejects_missing_statistics() {
        let body = r#"{ "article_data": [] }"#;

        assert!(serde_json::from_str::<FeedSnapshot>(body).is_err());
    }
}
