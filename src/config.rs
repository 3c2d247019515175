use serde::Deserialize;
use std::path::PathBuf;

use crate::error::{FlickError, Result};

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    pub api_key: Option<String>,
    pub language: Option<String>,
}

fn config_path() -> Option<PathBuf> {
    let config_dir = dirs::config_dir()?;
    Some(config_dir.join("flick").join("config.toml"))
}

impl Config {
    pub fn load() -> Self {
        let Some(path) = config_path() else {
            return Config::default();
        };

        let Ok(content) = std::fs::read_to_string(&path) else {
            return Config::default();
        };

        toml::from_str::<Config>(&content).unwrap_or_default()
    }
}

/// Fully resolved runtime settings: CLI flag > environment > config file.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: String,
    pub language: Option<String>,
}

impl Settings {
    pub fn resolve(
        config: Config,
        cli_api_key: Option<String>,
        cli_language: Option<String>,
    ) -> Result<Self> {
        let env_key = std::env::var("TMDB_API_KEY").ok().filter(|k| !k.is_empty());
        let api_key = pick(cli_api_key, env_key, config.api_key).ok_or_else(|| {
            FlickError::Config(
                "no TMDB API key: set TMDB_API_KEY, pass --api-key, or add api_key \
                 to the config file"
                    .to_string(),
            )
        })?;

        Ok(Settings {
            api_key,
            language: cli_language.or(config.language),
        })
    }
}

fn pick(cli: Option<String>, env: Option<String>, file: Option<String>) -> Option<String> {
    cli.or(env).or(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_config() {
        let toml_str = r#"
api_key = "201c3209762c5d4a8baf2a743dd97ddc"
language = "en-US"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.api_key.as_deref(),
            Some("201c3209762c5d4a8baf2a743dd97ddc")
        );
        assert_eq!(config.language.as_deref(), Some("en-US"));
    }

    #[test]
    fn parse_partial_config() {
        let config: Config = toml::from_str(r#"api_key = "abc""#).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("abc"));
        assert_eq!(config.language, None);
    }

    #[test]
    fn invalid_config_falls_back_to_default() {
        let config = toml::from_str::<Config>("api_key = [1, 2]").unwrap_or_default();
        assert!(config.api_key.is_none());
    }

    #[test]
    fn cli_key_wins_over_env_and_file() {
        assert_eq!(
            pick(
                Some("cli".to_string()),
                Some("env".to_string()),
                Some("file".to_string())
            ),
            Some("cli".to_string())
        );
    }

    #[test]
    fn env_key_wins_over_file() {
        assert_eq!(
            pick(None, Some("env".to_string()), Some("file".to_string())),
            Some("env".to_string())
        );
    }

    #[test]
    fn file_key_is_the_fallback() {
        assert_eq!(
            pick(None, None, Some("file".to_string())),
            Some("file".to_string())
        );
    }

    #[test]
    fn missing_key_everywhere_is_none() {
        assert_eq!(pick(None, None, None), None);
    }
}
