// ============================================================================
// Module : api
// ============================================================================
// Sources de données du marché et des news
// - mock : fixtures en mémoire (utilisé tant que le backend n'est pas déployé)
// - http : backend REST
//
// CONCEPT RUST : Trait object (dyn DataSource)
// - Le contrôleur ne sait pas quelle source il utilise
// - Arc<dyn DataSource> : partagé entre les tâches de chargement
// ============================================================================

pub mod http;   // Client du backend REST
pub mod mock;   // Fixtures en mémoire

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{AIAnalysis, MarketOverview, NewsCard, StockData};

/// Nombre de news demandé par défaut
pub const DEFAULT_NEWS_LIMIT: usize = 4;

/// Contrat d'une source de données
///
/// Toutes les opérations sont en lecture seule et peuvent échouer
/// (transport, disponibilité). Les timeouts sont à la charge de la source.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Vue d'ensemble du marché (indices, VIX, Philly Fed)
    async fn fetch_market_overview(&self) -> Result<MarketOverview>;

    /// Les `limit` dernières news analysées
    async fn fetch_news(&self, limit: usize) -> Result<Vec<NewsCard>>;

    /// Cotation, fondamentaux et analystes d'un ticker
    async fn fetch_stock(&self, ticker: &str) -> Result<StockData>;

    /// Analyse IA d'une news
    async fn analyze_news(&self, title: &str, ticker: &str) -> Result<AIAnalysis>;
}

// Re-exports
pub use http::HttpDataSource;
pub use mock::MockDataSource;
