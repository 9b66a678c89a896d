use anyhow::{Context, Result};
use tracing::warn;

pub const GEMINI_KEY_VAR: &str = "GEMINI_API_KEY";
pub const SERPAPI_KEY_VAR: &str = "SERPAPI_API_KEY";
/// Longest idle TTL accepted for a session (one year).
pub const MAX_SESSION_TTL_MINUTES: i64 = 525_600;

/// Application configuration loaded from environment variables.
///
/// Provider keys are optional: a session may supply its own through the
/// credentials endpoint, so a missing key is reported per request instead of
/// failing startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub serpapi_api_key: Option<String>,
    pub port: u16,
    pub rust_log: String,
    /// Number of most recent turns rendered into a chat prompt.
    pub history_window: usize,
    /// Maximum turns retained per session; older turns are dropped first.
    pub max_session_turns: usize,
    pub session_ttl_minutes: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            serpapi_api_key: None,
            port: 8080,
            rust_log: "info".to_string(),
            history_window: 8,
            max_session_turns: 100,
            session_ttl_minutes: 120,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();
        let config = Config {
            gemini_api_key: optional_env(GEMINI_KEY_VAR),
            serpapi_api_key: optional_env(SERPAPI_KEY_VAR),
            port: parse_env("PORT", defaults.port)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
            history_window: parse_env("HISTORY_WINDOW", defaults.history_window)?,
            max_session_turns: parse_env("MAX_SESSION_TURNS", defaults.max_session_turns)?,
            session_ttl_minutes: parse_env("SESSION_TTL_MINUTES", defaults.session_ttl_minutes)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Rejects numeric settings that parse but cannot drive the service.
    pub fn validate(&self) -> Result<()> {
        if self.max_session_turns == 0 {
            anyhow::bail!("MAX_SESSION_TURNS must be at least 1");
        }
        if !(1..=MAX_SESSION_TTL_MINUTES).contains(&self.session_ttl_minutes) {
            anyhow::bail!(
                "SESSION_TTL_MINUTES must be between 1 and {MAX_SESSION_TTL_MINUTES}, got {}",
                self.session_ttl_minutes
            );
        }
        Ok(())
    }

    /// Logs which provider keys are missing so operators notice before users do.
    pub fn warn_missing_keys(&self) {
        if self.gemini_api_key.is_none() {
            warn!("{GEMINI_KEY_VAR} is not set; sessions must supply a Gemini key");
        }
        if self.serpapi_api_key.is_none() {
            warn!("{SERPAPI_KEY_VAR} is not set; market analysis needs a session key");
        }
    }
}

/// Reads an env var, treating blank values as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_zero_turn_cap_is_rejected() {
        let config = Config {
            max_session_turns: 0,
            ..Config::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("MAX_SESSION_TURNS"));
    }

    #[test]
    fn test_ttl_out_of_range_is_rejected() {
        for ttl in [0, -5, MAX_SESSION_TTL_MINUTES + 1, i64::MAX] {
            let config = Config {
                session_ttl_minutes: ttl,
                ..Config::default()
            };
            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains("SESSION_TTL_MINUTES"), "ttl {ttl}");
        }
    }

    #[test]
    fn test_parse_env_reads_and_trims() {
        std::env::set_var("CAREER_API_TEST_PARSE_OK", " 42 ");
        assert_eq!(parse_env("CAREER_API_TEST_PARSE_OK", 8usize).unwrap(), 42);
    }

    #[test]
    fn test_parse_env_falls_back_when_unset() {
        std::env::remove_var("CAREER_API_TEST_PARSE_UNSET");
        assert_eq!(parse_env("CAREER_API_TEST_PARSE_UNSET", 120i64).unwrap(), 120);
    }

    #[test]
    fn test_parse_env_invalid_number_names_the_variable() {
        std::env::set_var("CAREER_API_TEST_PARSE_BAD", "eight");
        let err = parse_env("CAREER_API_TEST_PARSE_BAD", 8usize).unwrap_err();
        assert_eq!(
            err.to_string(),
            "CAREER_API_TEST_PARSE_BAD must be a valid number, got 'eight'"
        );
    }

    #[test]
    fn test_blank_key_counts_as_unset() {
        std::env::set_var("CAREER_API_TEST_BLANK_KEY", "   ");
        assert_eq!(optional_env("CAREER_API_TEST_BLANK_KEY"), None);

        std::env::set_var("CAREER_API_TEST_SET_KEY", " abc ");
        assert_eq!(
            optional_env("CAREER_API_TEST_SET_KEY").as_deref(),
            Some("abc")
        );
    }
}
