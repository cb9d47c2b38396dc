// ============================================================================
// Configuration
// ============================================================================
// Lue depuis les variables d'environnement au démarrage :
//
//   MARKETPULSE_API_URL        URL du backend (absent = données mock)
//   MARKETPULSE_NEWS_LIMIT     nombre de news (défaut 4)
//   MARKETPULSE_TIMEOUT_SECS   timeout HTTP (défaut 30)
//   MARKETPULSE_MOCK_DELAY_MS  latence simulée du mock (défaut 500)
// ============================================================================

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::api::{mock, DataSource, HttpDataSource, MockDataSource, DEFAULT_NEWS_LIMIT};

pub const ENV_API_URL: &str = "MARKETPULSE_API_URL";
pub const ENV_NEWS_LIMIT: &str = "MARKETPULSE_NEWS_LIMIT";
pub const ENV_TIMEOUT_SECS: &str = "MARKETPULSE_TIMEOUT_SECS";
pub const ENV_MOCK_DELAY_MS: &str = "MARKETPULSE_MOCK_DELAY_MS";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration de l'application
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// URL du backend ; None = source mock
    pub api_url: Option<String>,
    pub news_limit: usize,
    pub request_timeout: Duration,
    pub mock_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: None,
            news_limit: DEFAULT_NEWS_LIMIT,
            request_timeout: DEFAULT_TIMEOUT,
            mock_delay: mock::DEFAULT_DELAY,
        }
    }
}

impl Config {
    /// Lit la configuration depuis l'environnement du processus
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Lit la configuration via une fonction de recherche
    ///
    /// CONCEPT RUST : Closure en paramètre (impl Fn)
    /// - Les tests passent une HashMap au lieu de modifier l'environnement
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let api_url = lookup(ENV_API_URL)
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        let news_limit = parse_var(&lookup, ENV_NEWS_LIMIT)?.unwrap_or(defaults.news_limit);
        if news_limit == 0 {
            anyhow::bail!("{} doit être supérieur à 0", ENV_NEWS_LIMIT);
        }

        let request_timeout = parse_var(&lookup, ENV_TIMEOUT_SECS)?
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);

        let mock_delay = parse_var(&lookup, ENV_MOCK_DELAY_MS)?
            .map(Duration::from_millis)
            .unwrap_or(defaults.mock_delay);

        Ok(Self {
            api_url,
            news_limit,
            request_timeout,
            mock_delay,
        })
    }

    /// Construit la source de données correspondante
    pub fn data_source(&self) -> Result<Arc<dyn DataSource>> {
        match &self.api_url {
            Some(url) => Ok(Arc::new(HttpDataSource::new(url, self.request_timeout)?)),
            None => Ok(Arc::new(MockDataSource::with_delay(self.mock_delay))),
        }
    }

    pub fn uses_mock(&self) -> bool {
        self.api_url.is_none()
    }
}

/// Parse une variable optionnelle ; une valeur invalide est une erreur
fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("Valeur invalide pour {} : {:?}", key, raw)),
        None => Ok(None),
    }
}
