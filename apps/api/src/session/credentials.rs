use std::fmt;

use crate::config::{GEMINI_KEY_VAR, SERPAPI_KEY_VAR};
use crate::errors::AppError;

/// Keys entered interactively for one session. They take precedence over
/// the process-wide keys from the environment.
#[derive(Clone, Default)]
pub struct SessionCredentials {
    gemini: Option<String>,
    serpapi: Option<String>,
}

// Keys must never reach the logs.
impl fmt::Debug for SessionCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCredentials")
            .field("gemini", &self.gemini.as_ref().map(|_| "<redacted>"))
            .field("serpapi", &self.serpapi.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl SessionCredentials {
    pub fn gemini(&self) -> Option<&str> {
        self.gemini.as_deref()
    }

    pub fn serpapi(&self) -> Option<&str> {
        self.serpapi.as_deref()
    }

    pub fn set_gemini(&mut self, key: Option<String>) {
        self.gemini = normalize(key);
    }

    pub fn set_serpapi(&mut self, key: Option<String>) {
        self.serpapi = normalize(key);
    }

    /// Picks the session key, then the environment key, or reports which one
    /// is missing. Callers run this before any network call.
    pub fn resolve_gemini(&self, fallback: Option<&str>) -> Result<String, AppError> {
        resolve(self.gemini(), fallback, "Gemini", GEMINI_KEY_VAR)
    }

    pub fn resolve_serpapi(&self, fallback: Option<&str>) -> Result<String, AppError> {
        resolve(self.serpapi(), fallback, "SerpAPI", SERPAPI_KEY_VAR)
    }
}

fn normalize(key: Option<String>) -> Option<String> {
    key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty())
}

fn resolve(
    session: Option<&str>,
    fallback: Option<&str>,
    provider: &str,
    env_var: &str,
) -> Result<String, AppError> {
    session
        .or(fallback)
        .filter(|k| !k.trim().is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            AppError::MissingCredential(format!(
                "No {provider} API key configured. Set {env_var} or provide it via \
                 PUT /api/v1/sessions/{{id}}/credentials."
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_key_wins_over_environment() {
        let mut creds = SessionCredentials::default();
        creds.set_gemini(Some(" session-key ".into()));
        assert_eq!(creds.resolve_gemini(Some("env-key")).unwrap(), "session-key");
    }

    #[test]
    fn test_environment_key_used_as_fallback() {
        let creds = SessionCredentials::default();
        assert_eq!(creds.resolve_serpapi(Some("env-key")).unwrap(), "env-key");
    }

    #[test]
    fn test_missing_key_names_env_var() {
        let creds = SessionCredentials::default();
        match creds.resolve_gemini(None) {
            Err(AppError::MissingCredential(msg)) => assert!(msg.contains(GEMINI_KEY_VAR)),
            other => panic!("expected MissingCredential, got {other:?}"),
        }
    }

    #[test]
    fn test_blank_key_is_treated_as_missing() {
        let mut creds = SessionCredentials::default();
        creds.set_gemini(Some("   ".into()));
        assert!(creds.gemini().is_none());
        assert!(creds.resolve_gemini(Some("")).is_err());
    }

    #[test]
    fn test_debug_redacts_keys() {
        let mut creds = SessionCredentials::default();
        creds.set_gemini(Some("super-secret".into()));
        assert!(!format!("{creds:?}").contains("super-secret"));
    }
}
