//! In-process fakes for the provider traits, shared by unit tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::config::Config;
use crate::llm_client::{CompletionProvider, LlmError};
use crate::search_client::{SearchError, SearchProvider, SearchResult};
use crate::state::AppState;

#[derive(Default)]
pub struct FakeLlm {
    pub prompts: Mutex<Vec<String>>,
    pub fail: bool,
}

impl FakeLlm {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl CompletionProvider for FakeLlm {
    async fn complete(
        &self,
        _api_key: &str,
        prompt: &str,
        _system: &str,
    ) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if self.fail {
            return Err(LlmError::Api {
                status: 400,
                message: "quota exhausted".to_string(),
            });
        }
        Ok("content='## Answer\\nBuild Python and statistics skills.'".to_string())
    }
}

#[derive(Default)]
pub struct FakeSearch {
    pub queries: Mutex<Vec<String>>,
}

impl FakeSearch {
    pub fn calls(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

#[async_trait]
impl SearchProvider for FakeSearch {
    async fn search(&self, _api_key: &str, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        self.queries.lock().unwrap().push(query.to_string());
        Ok(vec![SearchResult {
            position: 1,
            title: "Hiring outlook".to_string(),
            link: Some("https://jobs.example.in/outlook".to_string()),
            snippet: "Openings grew 22% year on year".to_string(),
        }])
    }
}

pub fn config_with_keys() -> Config {
    Config {
        gemini_api_key: Some("test-gemini".to_string()),
        serpapi_api_key: Some("test-serp".to_string()),
        ..Config::default()
    }
}

pub fn test_state(config: Config, llm: Arc<FakeLlm>, search: Arc<FakeSearch>) -> AppState {
    AppState::new(config, llm, search)
}
