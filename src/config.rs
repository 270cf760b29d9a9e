use thiserror::Error;

const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),
    #[error("PORT is not a valid port number: {0}")]
    InvalidPort(String),
}

/// Everything the process reads from the environment. Both secrets are
/// required; startup must abort without them.
pub struct Config {
    pub telegram_token: String,
    pub claude_api_key: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let telegram_token = require("TELEGRAM_TOKEN")?;
        let claude_api_key = require("CLAUDE_API_KEY")?;
        let port = match std::env::var("PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            Err(_) => DEFAULT_PORT,
        };
        Ok(Self {
            telegram_token,
            claude_api_key,
            port,
        })
    }
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingVar(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env vars are process-global, so the whole lifecycle lives in one test.
    #[test]
    fn from_env_requires_both_secrets_and_defaults_the_port() {
        std::env::remove_var("TELEGRAM_TOKEN");
        std::env::remove_var("CLAUDE_API_KEY");
        std::env::remove_var("PORT");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::MissingVar("TELEGRAM_TOKEN"))
        ));

        std::env::set_var("TELEGRAM_TOKEN", "tg-token");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::MissingVar("CLAUDE_API_KEY"))
        ));

        std::env::set_var("CLAUDE_API_KEY", "api-key");
        let config = Config::from_env().unwrap();
        assert_eq!(config.telegram_token, "tg-token");
        assert_eq!(config.claude_api_key, "api-key");
        assert_eq!(config.port, DEFAULT_PORT);

        std::env::set_var("PORT", "8080");
        assert_eq!(Config::from_env().unwrap().port, 8080);

        std::env::set_var("PORT", "no-un-puerto");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::InvalidPort(_))
        ));
    }
}
