// Career guidance: prompt templates, provider orchestration and handlers.
// All Gemini calls go through llm_client and all searches through search_client.

pub mod generator;
pub mod handlers;
pub mod prompts;
