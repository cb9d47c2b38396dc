// ============================================================================
// Structure : NewsCard
// ============================================================================
// Une news avec ses données de marché et son analyse IA
//
// CONCEPTS RUST :
// 1. Composition : NewsCard contient des sous-records optionnels
// 2. Option chaining : self.fundamentals.as_ref()?.upside
// 3. Affichage total : aucune méthode ne panique sur un None
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::models::{AIAnalysis, AnalystRating, StockFundamentals, StockQuote};

/// Texte affiché quand une métrique n'est pas disponible
pub const UNAVAILABLE: &str = "--";

/// Carte de news complète
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsCard {
    /// Identifiant unique dans un lot chargé (clé d'expansion)
    pub id: String,

    pub title: String,

    /// Média d'origine (ex: "WSJ")
    pub source: String,

    pub published_at: String,

    /// Ticker principal concerné par la news
    pub ticker: String,

    /// Sous-records absents si la news ne porte pas sur un seul instrument
    /// coté avec une couverture complète (ex: news sur un indice)
    pub quote: Option<StockQuote>,
    pub fundamentals: Option<StockFundamentals>,
    pub analyst: Option<AnalystRating>,

    pub analysis: AIAnalysis,
}

impl NewsCard {
    /// Prix et variation : "$247.38 (+0.44%)", ou "--" sans cotation
    pub fn price_display(&self) -> String {
        match &self.quote {
            Some(quote) => format!("${:.2} ({:+.2}%)", quote.price, quote.change_percent),
            None => UNAVAILABLE.to_string(),
        }
    }

    /// Avis des analystes : "分析师: 买入 (73/4/0)" ou "分析师: --"
    pub fn analyst_display(&self) -> String {
        match &self.analyst {
            Some(analyst) => format!("分析师: {}", analyst.display_text()),
            None => format!("分析师: {}", UNAVAILABLE),
        }
    }

    /// Potentiel vers le prix cible : "目标价: +19.2%" ou "目标价: --"
    pub fn upside_display(&self) -> String {
        match self.upside() {
            Some(upside) => format!("目标价: {:+.1}%", upside),
            None => format!("目标价: {}", UNAVAILABLE),
        }
    }

    pub fn upside(&self) -> Option<f64> {
        self.fundamentals.as_ref()?.upside
    }

    pub fn pe(&self) -> Option<f64> {
        self.fundamentals.as_ref()?.pe
    }

    pub fn week52_position(&self) -> Option<f64> {
        self.fundamentals.as_ref()?.week52_position
    }

    /// Vérifie si des données analystes sont disponibles
    pub fn has_analyst(&self) -> bool {
        self.analyst.is_some()
    }
}

// ============================================================================
// Tests
// ============================================================================
