//! Search Client: the single point of entry for SerpAPI web searches.
//!
//! Results are only ever interpolated into the market-analysis prompt.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const SERPAPI_URL: &str = "https://serpapi.com/search.json";
/// Upper bound on snippets forwarded to the LLM.
pub const MAX_RESULTS: usize = 8;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("API key rejected: {0}")]
    InvalidKey(String),
}

/// One ranked search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub position: u32,
    pub title: String,
    pub link: Option<String>,
    pub snippet: String,
}

#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, api_key: &str, query: &str) -> Result<Vec<SearchResult>, SearchError>;
}

#[derive(Debug, Deserialize)]
struct SerpResponse {
    error: Option<String>,
    answer_box: Option<AnswerBox>,
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
}

#[derive(Debug, Deserialize)]
struct AnswerBox {
    title: Option<String>,
    answer: Option<String>,
    snippet: Option<String>,
    link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    position: Option<u32>,
    title: Option<String>,
    link: Option<String>,
    snippet: Option<String>,
}

/// Google search through SerpAPI, localised to India.
#[derive(Clone)]
pub struct SerpApiClient {
    client: Client,
}

impl SerpApiClient {
    pub fn new() -> Result<Self, SearchError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()?,
        })
    }
}

#[async_trait]
impl SearchProvider for SerpApiClient {
    async fn search(&self, api_key: &str, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        let response = self
            .client
            .get(SERPAPI_URL)
            .query(&[
                ("engine", "google"),
                ("google_domain", "google.com"),
                ("gl", "in"),
                ("hl", "en"),
                ("q", query),
                ("api_key", api_key),
            ])
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        let results = parse_response(status, &body)?;
        debug!("Search for '{query}' returned {} results", results.len());
        Ok(results)
    }
}

fn parse_response(status: u16, body: &str) -> Result<Vec<SearchResult>, SearchError> {
    let parsed: Option<SerpResponse> = serde_json::from_str(body).ok();
    let error = parsed.as_ref().and_then(|p| p.error.clone());

    if status == 401 || status == 403 {
        return Err(SearchError::InvalidKey(
            error.unwrap_or_else(|| body.to_string()),
        ));
    }
    if !(200..300).contains(&status) {
        return Err(SearchError::Api {
            status,
            message: error.unwrap_or_else(|| body.to_string()),
        });
    }

    let parsed = parsed.ok_or_else(|| SearchError::Api {
        status,
        message: "Malformed search response".to_string(),
    })?;

    // SerpAPI reports "no results" through the error field with a 200.
    if let Some(message) = parsed.error {
        if message.contains("hasn't returned any results") {
            return Ok(Vec::new());
        }
        return Err(SearchError::Api { status, message });
    }

    let mut results = Vec::new();
    if let Some(answer) = parsed.answer_box {
        let snippet = answer.answer.or(answer.snippet).unwrap_or_default();
        if !snippet.trim().is_empty() {
            results.push(SearchResult {
                position: 0,
                title: answer.title.unwrap_or_else(|| "Answer".to_string()),
                link: answer.link,
                snippet,
            });
        }
    }

    let mut organic: Vec<_> = parsed
        .organic_results
        .into_iter()
        .filter_map(|r| {
            Some(SearchResult {
                position: r.position.unwrap_or(u32::MAX),
                title: r.title?,
                link: r.link,
                snippet: r.snippet.unwrap_or_default(),
            })
        })
        .collect();
    organic.sort_by_key(|r| r.position);
    results.extend(organic);
    results.truncate(MAX_RESULTS);

    Ok(results)
}

/// Renders results as a numbered markdown list for prompt interpolation.
pub fn format_results(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return "No live search results were available.".to_string();
    }
    results
        .iter()
        .enumerate()
        .map(|(i, r)| match &r.link {
            Some(link) => format!("{}. {} ({}): {}", i + 1, r.title, link, r.snippet),
            None => format!("{}. {}: {}", i + 1, r.title, r.snippet),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
