//! Guidance generator: builds prompts from session state, calls the
//! providers, and commits the results back to the session.
//!
//! Every flow follows the same shape: snapshot the session, validate and
//! resolve credentials, call out with no lock held, then commit.

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::guidance::prompts::{
    career_insights_prompt, chat_prompt, college_recommendations_prompt, market_analysis_prompt,
    market_search_query, resume_feedback_prompt, PromptParams,
};
use crate::llm_client::prompts::ADVISOR_SYSTEM;
use crate::llm_client::tidy_markdown;
use crate::session::credentials::SessionCredentials;
use crate::session::models::{CachedReport, ChatTurn, InsightKind, ReportKind, Role, Session};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub reply: String,
    pub turn_count: usize,
}

struct Snapshot {
    params: PromptParams,
    credentials: SessionCredentials,
}

async fn snapshot(state: &AppState, session_id: Uuid) -> Result<Snapshot, AppError> {
    state
        .sessions
        .with_session(session_id, |session| Snapshot {
            params: PromptParams::new(session.selection().cloned(), session.history().to_vec()),
            credentials: session.credentials().clone(),
        })
        .await
}

/// Writes provider output back to the session. A session discarded or
/// expired mid-call is reported as not found and the output is dropped.
async fn commit<T>(
    state: &AppState,
    session_id: Uuid,
    f: impl FnOnce(&mut Session) -> T,
) -> Result<T, AppError> {
    state
        .sessions
        .with_session(session_id, f)
        .await
        .inspect_err(|_| {
            warn!("Session {session_id} went away during generation; discarding the answer")
        })
}

async fn complete(state: &AppState, api_key: &str, prompt: &str) -> Result<String, AppError> {
    let raw = state.llm.complete(api_key, prompt, ADVISOR_SYSTEM).await?;
    Ok(tidy_markdown(&raw))
}

/// Generates one of the selection-driven reports and caches it in the session.
pub async fn generate_report(
    state: &AppState,
    session_id: Uuid,
    kind: InsightKind,
) -> Result<CachedReport, AppError> {
    let Snapshot {
        params,
        credentials,
    } = snapshot(state, session_id).await?;
    let selection = params.require_selection()?.clone();
    let gemini_key = credentials.resolve_gemini(state.config.gemini_api_key.as_deref())?;

    let prompt = match kind {
        InsightKind::Career => career_insights_prompt(&params)?,
        InsightKind::Colleges => college_recommendations_prompt(&params)?,
        InsightKind::Market => {
            let serp_key =
                credentials.resolve_serpapi(state.config.serpapi_api_key.as_deref())?;
            let query = market_search_query(&params)?;
            let results = state.search.search(&serp_key, &query).await?;
            market_analysis_prompt(&params, &results)?
        }
    };

    info!(
        "Generating {:?} report for session {session_id} ({})",
        kind,
        selection.label()
    );
    let markdown = complete(state, &gemini_key, &prompt).await?;

    commit(state, session_id, |session| {
        session.store_report(kind.into(), markdown, selection.label())
    })
    .await
}

/// Reviews a resume against the given target role, or the selected role
/// when none is given. The resume text is never stored.
pub async fn generate_resume_feedback(
    state: &AppState,
    session_id: Uuid,
    resume_text: &str,
    target_role: Option<&str>,
) -> Result<CachedReport, AppError> {
    let Snapshot {
        params,
        credentials,
    } = snapshot(state, session_id).await?;

    let target_role = target_role
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .or_else(|| params.selection.as_ref().map(|s| s.role()))
        .unwrap_or_default()
        .to_string();
    let prompt = resume_feedback_prompt(resume_text, &target_role)?;
    let gemini_key = credentials.resolve_gemini(state.config.gemini_api_key.as_deref())?;

    info!("Reviewing resume for session {session_id} (target: {target_role})");
    let markdown = complete(state, &gemini_key, &prompt).await?;

    commit(state, session_id, |session| {
        session.store_report(ReportKind::Resume, markdown, target_role)
    })
    .await
}

/// Answers a chat question. Both turns are appended together once the
/// provider has answered; a failure leaves the history untouched.
pub async fn chat(
    state: &AppState,
    session_id: Uuid,
    question: &str,
) -> Result<ChatReply, AppError> {
    let question = question.trim();
    if question.is_empty() {
        return Err(AppError::Validation("Question cannot be empty".to_string()));
    }

    let Snapshot {
        mut params,
        credentials,
    } = snapshot(state, session_id).await?;
    let gemini_key = credentials.resolve_gemini(state.config.gemini_api_key.as_deref())?;

    params.history.push(ChatTurn::new(Role::User, question));
    let prompt = chat_prompt(&params, question, state.config.history_window);
    let reply = complete(state, &gemini_key, &prompt).await?;

    let turn_count = commit(state, session_id, |session| {
        session.append_turn(Role::User, question);
        session.append_turn(Role::Assistant, reply.clone());
        session.history().len()
    })
    .await?;

    Ok(ChatReply { reply, turn_count })
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::*;
    use crate::llm_client::{CompletionProvider, LlmError};
    use crate::session::store::SessionStore;
    use crate::test_support::{config_with_keys, FakeSearch};

    /// Answers normally but discards the session before returning.
    #[derive(Default)]
    struct DiscardingLlm {
        target: Mutex<Option<(SessionStore, Uuid)>>,
    }

    #[async_trait]
    impl CompletionProvider for DiscardingLlm {
        async fn complete(&self, _: &str, _: &str, _: &str) -> Result<String, LlmError> {
            let target = self.target.lock().unwrap().clone();
            if let Some((sessions, id)) = target {
                sessions.remove(id).await.unwrap();
            }
            Ok("Learn SQL.".to_string())
        }
    }

    async fn state_with_discarding_llm() -> (AppState, Uuid) {
        let llm = Arc::new(DiscardingLlm::default());
        let state = AppState::new(config_with_keys(), llm.clone(), Arc::new(FakeSearch::default()));
        let id = state.sessions.create().await;
        *llm.target.lock().unwrap() = Some((state.sessions.clone(), id));
        (state, id)
    }

    #[tokio::test]
    async fn test_chat_on_session_discarded_mid_call_is_not_found() {
        let (state, id) = state_with_discarding_llm().await;

        let err = chat(&state, id, "What skills do I need?").await.unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(state.sessions.live_count().await, 0);
    }

    #[tokio::test]
    async fn test_resume_feedback_on_session_discarded_mid_call_is_not_found() {
        let (state, id) = state_with_discarding_llm().await;
        let resume = "Analyst with five years of SQL, Python and dashboard experience. ".repeat(3);

        let err = generate_resume_feedback(&state, id, &resume, Some("Data Scientist"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }
}
