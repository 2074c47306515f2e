use serde::{Deserialize, Serialize};

/// One article as returned by the news API; only title and url are kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    pub url: String,
}
