//! Server settings
//!
//! Read from the process environment (after an optional `.env` file has been
//! loaded). Blank values count as unset.

use std::path::PathBuf;

use crew_core::agent::DEFAULT_AGENT_MODEL;
use crew_runner::{ChatConfig, DEFAULT_CHAT_BASE_URL};
use page_fetcher::FetcherConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid API_PORT '{value}': expected a port number")]
    InvalidPort { value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    /// CORS origins; the CORS layer is only installed when this is non-empty
    pub allowed_origins: Vec<String>,
    pub data_dir: PathBuf,
    pub chat_api_key: Option<String>,
    pub chat_model: String,
    pub chat_base_url: String,
    pub rich_enabled: bool,
    pub rich_orchestrator_url: Option<String>,
    pub scrape_user_agent: String,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build settings from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let port = match var("API_PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| ConfigError::InvalidPort { value: raw })?,
            None => 8000,
        };

        let allowed_origins = var("ALLOWED_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            host: var("API_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
            allowed_origins,
            data_dir: var("CREW_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".crew-data")),
            chat_api_key: var("CHAT_API_KEY"),
            chat_model: var("CHAT_MODEL").unwrap_or_else(|| DEFAULT_AGENT_MODEL.to_string()),
            chat_base_url: var("CHAT_BASE_URL")
                .unwrap_or_else(|| DEFAULT_CHAT_BASE_URL.to_string()),
            rich_enabled: parse_flag(var("RICH_ORCHESTRATION_ENABLED").as_deref(), true),
            rich_orchestrator_url: var("RICH_ORCHESTRATOR_URL"),
            scrape_user_agent: var("SCRAPE_USER_AGENT")
                .unwrap_or_else(|| FetcherConfig::default().user_agent),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn chat_config(&self) -> ChatConfig {
        ChatConfig {
            api_key: self.chat_api_key.clone(),
            model: self.chat_model.clone(),
            base_url: self.chat_base_url.clone(),
            ..Default::default()
        }
    }

    pub fn fetcher_config(&self) -> FetcherConfig {
        FetcherConfig {
            user_agent: self.scrape_user_agent.clone(),
            ..Default::default()
        }
    }
}

fn parse_flag(raw: Option<&str>, default: bool) -> bool {
    match raw {
        Some(raw) => match raw.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let s = settings(&[]).unwrap();
        assert_eq!(s.bind_addr(), "127.0.0.1:8000");
        assert!(s.allowed_origins.is_empty());
        assert_eq!(s.data_dir, PathBuf::from(".crew-data"));
        assert_eq!(s.chat_api_key, None);
        assert_eq!(s.chat_model, "llama3-8b-8192");
        assert_eq!(s.chat_base_url, "https://api.groq.com/openai/v1");
        assert!(s.rich_enabled);
        assert_eq!(s.rich_orchestrator_url, None);
        assert_eq!(s.scrape_user_agent, "CrewScout/1.0");
    }

    #[test]
    fn test_overrides() {
        let s = settings(&[
            ("API_HOST", "0.0.0.0"),
            ("API_PORT", "9100"),
            ("ALLOWED_ORIGINS", "http://localhost:3000, https://app.example.com,,"),
            ("CREW_DATA_DIR", "/var/lib/crew"),
            ("CHAT_API_KEY", "gsk-test"),
            ("CHAT_MODEL", "mixtral-8x7b"),
            ("RICH_ORCHESTRATION_ENABLED", "off"),
            ("RICH_ORCHESTRATOR_URL", "http://worker:9000"),
            ("SCRAPE_USER_AGENT", "TestBot/2.0"),
        ])
        .unwrap();

        assert_eq!(s.bind_addr(), "0.0.0.0:9100");
        assert_eq!(
            s.allowed_origins,
            vec!["http://localhost:3000", "https://app.example.com"]
        );
        assert_eq!(s.data_dir, PathBuf::from("/var/lib/crew"));
        assert!(!s.rich_enabled);
        assert_eq!(s.rich_orchestrator_url.as_deref(), Some("http://worker:9000"));

        let chat = s.chat_config();
        assert_eq!(chat.api_key.as_deref(), Some("gsk-test"));
        assert_eq!(chat.model, "mixtral-8x7b");
        assert_eq!(s.fetcher_config().user_agent, "TestBot/2.0");
    }

    #[test]
    fn test_blank_values_are_unset() {
        let s = settings(&[("CHAT_API_KEY", "   "), ("API_PORT", "")]).unwrap();
        assert_eq!(s.chat_api_key, None);
        assert_eq!(s.port, 8000);
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        assert!(matches!(
            settings(&[("API_PORT", "eighty")]),
            Err(ConfigError::InvalidPort { .. })
        ));
    }

    #[test]
    fn test_flag_parsing() {
        assert!(parse_flag(Some("YES"), false));
        assert!(parse_flag(Some("1"), false));
        assert!(!parse_flag(Some("No"), true));
        assert!(parse_flag(Some("maybe"), true));
        assert!(!parse_flag(None, false));
    }
}
