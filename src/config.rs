use base64::Engine;
use std::env;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("JIRA_BOARD_ID must be a number, got {0:?}")]
    InvalidBoardId(String),
}

/// Connection settings for the Jira server. Built once at start-up and handed
/// to the client; nothing reads the environment after that.
#[derive(Clone, Debug)]
pub struct JiraConfig {
    pub base_url: String,
    pub user: String,
    pub api_key: String,
}

impl JiraConfig {
    pub fn new(base_url: &str, user: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            user: user.to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Missing variables are left empty on purpose: the first request then
    /// fails with an authentication or transport error.
    pub fn from_env() -> Self {
        Self::new(
            &env_or_empty("JIRA_BASE_URL"),
            &env_or_empty("JIRA_USER"),
            &env_or_empty("JIRA_API_KEY"),
        )
    }

    pub fn basic_auth_header(&self) -> String {
        let credentials = format!("{}:{}", self.user, self.api_key);
        format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode(credentials)
        )
    }
}

fn env_or_empty(name: &str) -> String {
    env::var(name).unwrap_or_else(|_| {
        tracing::warn!("{name} is not set");
        String::new()
    })
}

#[derive(Clone, Debug)]
pub struct ReportSettings {
    pub jql: Option<String>,
    pub board_id: Option<u64>,
    pub bind_address: String,
}

impl ReportSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_values(
            env::var("JIRA_JQL").ok(),
            env::var("JIRA_BOARD_ID").ok(),
            env::var("BIND_ADDRESS").ok(),
        )
    }

    fn from_values(
        jql: Option<String>,
        board_id: Option<String>,
        bind_address: Option<String>,
    ) -> Result<Self, ConfigError> {
        let board_id = match board_id.filter(|id| !id.trim().is_empty()) {
            Some(id) => Some(
                id.trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidBoardId(id))?,
            ),
            None => None,
        };

        Ok(Self {
            jql: jql.filter(|jql| !jql.trim().is_empty()),
            board_id,
            bind_address: bind_address.unwrap_or_else(|| "0.0.0.0:8080".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_auth_header_encodes_user_and_key() {
        let config = JiraConfig::new("https://example.atlassian.net/", "alice", "secret");
        // base64("alice:secret")
        assert_eq!(config.basic_auth_header(), "Basic YWxpY2U6c2VjcmV0");
        assert_eq!(config.base_url, "https://example.atlassian.net");
    }

    #[test]
    fn settings_defaults() {
        let settings = ReportSettings::from_values(None, None, None).unwrap();
        assert!(settings.jql.is_none());
        assert!(settings.board_id.is_none());
        assert_eq!(settings.bind_address, "0.0.0.0:8080");
    }

    #[test]
    fn settings_parse_board_id() {
        let settings =
            ReportSettings::from_values(Some("project = ABC".into()), Some(" 42 ".into()), None)
                .unwrap();
        assert_eq!(settings.board_id, Some(42));
        assert_eq!(settings.jql.as_deref(), Some("project = ABC"));
    }

    #[test]
    fn settings_reject_bad_board_id() {
        let err = ReportSettings::from_values(None, Some("board-7".into()), None).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBoardId(id) if id == "board-7"));
    }

    #[test]
    fn blank_values_are_ignored() {
        let settings =
            ReportSettings::from_values(Some("  ".into()), Some("".into()), None).unwrap();
        assert!(settings.jql.is_none());
        assert!(settings.board_id.is_none());
    }
}
