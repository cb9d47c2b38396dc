// ============================================================================
// Module : models
// ============================================================================
// Structures de données immuables de l'application
// Construites par une DataSource et remplacées en bloc à chaque chargement
// ============================================================================

pub mod analysis;   // Analyse IA (score, signal, textes)
pub mod glossary;   // Glossaire statique des termes
pub mod market;     // Indices, VIX, vue d'ensemble
pub mod news;       // Carte de news
pub mod stock;      // Cotation, fondamentaux, analystes

// Re-export des structures principales
// On peut faire : use marketpulse::models::NewsCard;
pub use analysis::{AIAnalysis, Sentiment};
pub use glossary::TermExplanation;
pub use market::{MarketIndex, MarketOverview, RiskLevel, VixData};
pub use news::NewsCard;
pub use stock::{AnalystRating, StockData, StockFundamentals, StockQuote};
