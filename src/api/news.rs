use crate::error::{Error, Result};
use crate::models::NewsArticle;
use log::error;
use reqwest::Client;
use serde::Deserialize;

const API_BASE_URL: &str = "https://newsapi.org/v2";
/// Articles per reply, newest first as the upstream sorts them.
pub const PAGE_SIZE: usize = 5;
/// The news search is restricted to German-language articles.
const LANGUAGE: &str = "de";

#[derive(Debug, Deserialize)]
struct EverythingResponse {
    #[serde(default)]
    articles: Vec<NewsArticle>,
}

/// Client for the NewsAPI "everything" search. Zero matching articles is a
/// valid empty result, distinct from a failed request.
#[derive(Debug, Clone)]
pub struct NewsClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl NewsClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(API_BASE_URL.to_string(), api_key)
    }

    pub fn with_base_url(base_url: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_key,
        }
    }

    pub async fn get_recent_news(&self, term: &str) -> Result<Vec<NewsArticle>> {
        let url = format!(
            "{}/everything?q={}&sortBy=publishedAt&pageSize={}&language={}&apiKey={}",
            self.base_url, term, PAGE_SIZE, LANGUAGE, self.api_key
        );
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            let msg = format!("news request failed with status {}", response.status());
            error!("{}", msg);
            return Err(Error::Upstream(msg));
        }

        let body: EverythingResponse = response.json().await?;
        let mut articles = body.articles;
        articles.truncate(PAGE_SIZE);
        Ok(articles)
    }
}
