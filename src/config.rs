use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

const DEFAULT_CONTENT_DIR: &str = "content";
const DEFAULT_PORT: u16 = 8080;

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Person {
    pub name: String,
    pub avatar: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct SiteConfig {
    /// Host name without scheme, e.g. `example.com`.
    pub base_url: String,
    pub person: Person,
    #[serde(default = "default_locales")]
    pub locales: Vec<String>,
    #[serde(default = "default_locale")]
    pub default_locale: String,
}

fn default_locales() -> Vec<String> {
    vec!["en".to_string(), "id".to_string()]
}

fn default_locale() -> String {
    "en".to_string()
}

impl SiteConfig {
    pub fn from_toml(raw: &str, path: &Path) -> Result<Self, ConfigError> {
        let mut config: SiteConfig = toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.base_url = config
            .base_url
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_end_matches('/')
            .to_string();
        config.validate()?;
        Ok(config)
    }

    pub async fn load(content_dir: &Path) -> Result<Self, ConfigError> {
        let path = content_dir.join("site.toml");
        let raw = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;
        Self::from_toml(&raw, &path)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.locales.is_empty() {
            return Err(ConfigError::NoLocales);
        }
        if !self.supports(&self.default_locale) {
            return Err(ConfigError::UnknownDefaultLocale(self.default_locale.clone()));
        }
        Ok(())
    }

    pub fn supports(&self, locale: &str) -> bool {
        self.locales.iter().any(|l| l == locale)
    }

    pub fn absolute_url(&self, path: &str) -> String {
        format!("https://{}{}", self.base_url, path)
    }
}

/// Process-level settings taken from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub content_dir: PathBuf,
    pub port: u16,
    pub is_development: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let content_dir = std::env::var("CONTENT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONTENT_DIR));
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);
        let is_development = std::env::var("RUST_ENV")
            .map(|v| v == "development")
            .unwrap_or(false);

        Self {
            content_dir,
            port,
            is_development,
        }
    }
}
