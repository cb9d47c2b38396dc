// ============================================================================
// Source de données : backend REST
// ============================================================================
// Appelle le backend "market pulse" (FastAPI) qui agrège les cotations,
// les fondamentaux et l'analyse IA des news.
//
// CONCEPTS RUST :
// 1. async/await : requêtes HTTP non-bloquantes
// 2. Génériques : Envelope<T> pour toutes les réponses { success, data }
// 3. Serde : désérialisation automatique (camelCase)
// ============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, error, info, instrument};

use crate::api::DataSource;
use crate::models::{
    AIAnalysis, AnalystRating, MarketOverview, NewsCard, StockData, StockFundamentals, StockQuote,
};

const USER_AGENT: &str = concat!("marketpulse/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Enveloppes JSON du backend
// ============================================================================

/// Réponse générique : { "success": true, "data": ... }
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    data: Option<T>,
}

/// Réponse de /stock : les trois sous-records au premier niveau
#[derive(Debug, Deserialize)]
struct StockEnvelope {
    success: bool,
    quote: Option<StockQuote>,
    fundamentals: Option<StockFundamentals>,
    analyst: Option<AnalystRating>,
}

/// Réponse de /analyze
#[derive(Debug, Deserialize)]
struct AnalysisEnvelope {
    success: bool,
    analysis: Option<AIAnalysis>,
}

// ============================================================================
// Client
// ============================================================================

/// Source de données adossée au backend REST
#[derive(Debug, Clone)]
pub struct HttpDataSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpDataSource {
    /// Crée un client pour `base_url` (ex: "https://api.example.com/api")
    ///
    /// `timeout` s'applique à chaque requête complète.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context("Échec de la création du client HTTP")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Construit la requête GET pour un endpoint et ses paramètres
    ///
    /// `segments` : chemin relatif à l'URL de base, un segment par élément
    /// (ex: ["stock", "AAPL"]), chacun encodé séparément.
    fn request(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<reqwest::Request> {
        let url = endpoint_url(&self.base_url, segments)?;
        self.client
            .get(url)
            .query(query)
            .build()
            .with_context(|| format!("URL invalide pour l'endpoint {}", segments.join("/")))
    }

    /// Exécute la requête et désérialise le corps JSON
    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, &str)],
    ) -> Result<T> {
        let path = segments.join("/");
        let request = self.request(segments, query)?;
        debug!(url = %request.url(), "Sending HTTP request");

        let response = self
            .client
            .execute(request)
            .await
            .with_context(|| format!("Échec de la requête HTTP vers {}", path))?;

        let status = response.status();
        debug!(status = %status, "Received HTTP response");

        if !status.is_success() {
            error!(status = %status, path = %path, "Backend returned error status");
            anyhow::bail!("Le backend a retourné une erreur : HTTP {}", status);
        }

        response
            .json::<T>()
            .await
            .with_context(|| format!("Échec du parsing JSON de {}", path))
    }
}

#[async_trait]
impl DataSource for HttpDataSource {
    #[instrument(skip(self))]
    async fn fetch_market_overview(&self) -> Result<MarketOverview> {
        let envelope: Envelope<MarketOverview> = self.get_json(&["market-overview"], &[]).await?;
        let overview = open_envelope(envelope, "market-overview")?;
        info!(indices = overview.indices.len(), "Fetched market overview");
        Ok(overview)
    }

    #[instrument(skip(self))]
    async fn fetch_news(&self, limit: usize) -> Result<Vec<NewsCard>> {
        let limit = limit.to_string();
        let envelope: Envelope<Vec<NewsCard>> =
            self.get_json(&["news"], &[("limit", limit.as_str())]).await?;
        let cards = open_envelope(envelope, "news")?;
        info!(count = cards.len(), "Fetched news");
        Ok(cards)
    }

    #[instrument(skip(self))]
    async fn fetch_stock(&self, ticker: &str) -> Result<StockData> {
        // Le ticker fait partie du chemin : /stock/{ticker}
        let envelope: StockEnvelope = self.get_json(&["stock", ticker], &[]).await?;
        open_stock_envelope(envelope)
    }

    #[instrument(skip(self))]
    async fn analyze_news(&self, title: &str, ticker: &str) -> Result<AIAnalysis> {
        let envelope: AnalysisEnvelope = self
            .get_json(&["analyze"], &[("title", title), ("ticker", ticker)])
            .await?;
        open_analysis_envelope(envelope)
    }
}

// ============================================================================
// Fonctions pures (testables sans réseau)
// ============================================================================

/// Ajoute les segments au chemin de l'URL de base
///
/// Les caractères réservés d'un segment ('/', '?', '#'...) sont encodés.
fn endpoint_url(base_url: &str, segments: &[&str]) -> Result<reqwest::Url> {
    let mut url = reqwest::Url::parse(base_url)
        .with_context(|| format!("URL de base invalide : {}", base_url))?;

    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("URL de base sans chemin : {}", base_url))?
        .pop_if_empty()
        .extend(segments);

    Ok(url)
}

fn open_envelope<T>(envelope: Envelope<T>, endpoint: &str) -> Result<T> {
    if !envelope.success {
        anyhow::bail!("Le backend a signalé un échec pour {}", endpoint);
    }
    envelope
        .data
        .with_context(|| format!("Réponse {} sans données", endpoint))
}

fn open_stock_envelope(envelope: StockEnvelope) -> Result<StockData> {
    if !envelope.success {
        anyhow::bail!("Le backend a signalé un échec pour stock");
    }
    Ok(StockData {
        quote: envelope.quote,
        fundamentals: envelope.fundamentals,
        analyst: envelope.analyst,
    })
}

fn open_analysis_envelope(envelope: AnalysisEnvelope) -> Result<AIAnalysis> {
    if !envelope.success {
        anyhow::bail!("Le backend a signalé un échec pour analyze");
    }
    envelope.analysis.context("Réponse analyze sans analyse")
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> HttpDataSource {
        HttpDataSource::new("https://api.example.com/api/", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_base_url_is_normalized() {
        assert_eq!(source().base_url(), "https://api.example.com/api");
    }

    #[test]
    fn test_news_request_url() {
        let request = source().request(&["news"], &[("limit", "4")]).unwrap();
        assert_eq!(request.url().as_str(), "https://api.example.com/api/news?limit=4");
    }

    #[test]
    fn test_stock_request_puts_ticker_in_path() {
        let request = source().request(&["stock", "AAPL"], &[]).unwrap();
        assert_eq!(request.url().as_str(), "https://api.example.com/api/stock/AAPL");

        // Un ticker ne peut pas sortir de son segment
        let request = source().request(&["stock", "BRK/B"], &[]).unwrap();
        assert_eq!(request.url().path(), "/api/stock/BRK%2FB");
    }

    #[test]
    fn test_endpoint_url_on_bare_host() {
        let url = endpoint_url("http://127.0.0.1:8000", &["market-overview"]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8000/market-overview");

        assert!(endpoint_url("not a url", &["news"]).is_err());
    }

    #[test]
    fn test_analyze_request_encodes_query() {
        let request = source()
            .request(&["analyze"], &[("title", "Target Drops DEI"), ("ticker", "TGT")])
            .unwrap();
        let url = request.url();
        assert_eq!(url.path(), "/api/analyze");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("title".to_string(), "Target Drops DEI".to_string()),
                ("ticker".to_string(), "TGT".to_string()),
            ]
        );
    }

    #[test]
    fn test_news_envelope() {
        let json = r#"{
            "success": true,
            "data": [{
                "id": "1",
                "title": "示例新闻标题",
                "source": "WSJ",
                "publishedAt": "2026-01-11 08:00 EST",
                "ticker": "AAPL",
                "quote": null,
                "fundamentals": null,
                "analyst": null,
                "analysis": {
                    "score": 6,
                    "signal": "中性",
                    "coreJudgment": "a",
                    "causalChain": "b",
                    "valuationView": "c",
                    "risk": "d",
                    "recommendation": "e"
                }
            }]
        }"#;

        let envelope: Envelope<Vec<NewsCard>> = serde_json::from_str(json).unwrap();
        let cards = open_envelope(envelope, "news").unwrap();
        assert_eq!(cards.len(), 1);
        assert!(cards[0].analyst.is_none());
        assert_eq!(cards[0].analyst_display(), "分析师: --");
    }

    #[test]
    fn test_failed_envelope_is_error() {
        let envelope: Envelope<MarketOverview> =
            serde_json::from_str(r#"{"success": false, "data": null}"#).unwrap();
        assert!(open_envelope(envelope, "market-overview").is_err());

        let envelope: Envelope<MarketOverview> =
            serde_json::from_str(r#"{"success": true, "data": null}"#).unwrap();
        let err = open_envelope(envelope, "market-overview").unwrap_err();
        assert!(err.to_string().contains("market-overview"));
    }

    #[test]
    fn test_stock_envelope_with_partial_coverage() {
        let json = r#"{
            "success": true,
            "quote": {"ticker": "SPY", "price": 694.07, "change": 4.56, "changePercent": 0.66, "previousClose": 689.51},
            "fundamentals": null,
            "analyst": null
        }"#;

        let envelope: StockEnvelope = serde_json::from_str(json).unwrap();
        let data = open_stock_envelope(envelope).unwrap();
        assert_eq!(data.quote.unwrap().previous_close, 689.51);
        assert!(data.fundamentals.is_none());
        assert!(data.analyst.is_none());
    }

    #[test]
    fn test_analysis_envelope() {
        let json = r#"{"success": true, "analysis": {
            "score": 5, "signal": "中性", "coreJudgment": "a", "causalChain": "b",
            "valuationView": "c", "risk": "d", "recommendation": "e"
        }}"#;
        let envelope: AnalysisEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(open_analysis_envelope(envelope).unwrap().score, 5);

        let envelope: AnalysisEnvelope =
            serde_json::from_str(r#"{"success": true, "analysis": null}"#).unwrap();
        assert!(open_analysis_envelope(envelope).is_err());
    }

    // Test avec un vrai appel réseau : un port fermé doit produire une erreur,
    // jamais un panic
    #[tokio::test]
    async fn test_unreachable_backend_is_error() {
        let source = HttpDataSource::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
        assert!(source.fetch_market_overview().await.is_err());
    }
}
