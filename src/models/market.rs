// ============================================================================
// Marché : indices, VIX et vue d'ensemble
// ============================================================================
// Données de la carte "市场脉搏" (pouls du marché)
//
// CONCEPTS RUST :
// 1. Option<T> pour les métriques absentes (VIX, Philly Fed)
// 2. Méthodes dérivées plutôt que champs stockés (is_positive, risk)
// 3. #[serde(rename_all = "camelCase")] : noms JSON du backend
// ============================================================================

use serde::{Deserialize, Serialize};

/// Seuils de la valeur VIX pour le niveau de risque
const VIX_MEDIUM_THRESHOLD: f64 = 20.0;
const VIX_HIGH_THRESHOLD: f64 = 30.0;

/// Un indice de marché (ex: SPY, QQQ, DIA)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketIndex {
    /// Symbole (ex: "SPY")
    pub ticker: String,

    /// Nom affiché (ex: "S&P500")
    pub name: String,

    pub price: f64,

    /// Variation absolue (négative = baisse)
    pub change: f64,

    /// Variation en pourcentage (négative = baisse)
    pub change_percent: f64,
}

impl MarketIndex {
    pub fn new(ticker: &str, name: &str, price: f64, change: f64, change_percent: f64) -> Self {
        Self {
            ticker: ticker.to_string(),
            name: name.to_string(),
            price,
            change,
            change_percent,
        }
    }

    /// Retourne true si l'indice est stable ou en hausse
    pub fn is_positive(&self) -> bool {
        self.change >= 0.0
    }
}

/// Niveau de risque déduit de la valeur du VIX
///
/// CONCEPT RUST : Enum sans données (C-like)
/// - Copy : aussi léger qu'un entier
/// - Le compilateur force à gérer les trois cas dans un match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLevel {
    /// VIX < 20
    Low,
    /// 20 <= VIX < 30
    Medium,
    /// VIX >= 30
    High,
}

/// Indice de volatilité VIX ("indice de la peur")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VixData {
    pub value: f64,

    /// Libellé qualitatif (ex: "低恐慌")
    pub level: String,
}

impl VixData {
    pub fn new(value: f64, level: &str) -> Self {
        Self {
            value,
            level: level.to_string(),
        }
    }

    /// Construit un VixData en dérivant le libellé depuis la valeur
    ///
    /// Échelle du backend :
    /// - < 15 : 低恐慌
    /// - < 20 : 正常
    /// - < 30 : 警惕
    /// - sinon : 高恐慌
    pub fn from_value(value: f64) -> Self {
        let level = if value < 15.0 {
            "低恐慌"
        } else if value < 20.0 {
            "正常"
        } else if value < 30.0 {
            "警惕"
        } else {
            "高恐慌"
        };

        Self::new(value, level)
    }

    /// Retourne le niveau de risque (bucket sur la valeur)
    pub fn risk(&self) -> RiskLevel {
        if self.value < VIX_MEDIUM_THRESHOLD {
            RiskLevel::Low
        } else if self.value < VIX_HIGH_THRESHOLD {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }
}

/// Vue d'ensemble du marché à un instant donné
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketOverview {
    /// Horodatage tel que fourni par la source (ex: "2026-01-11 08:00 EST")
    pub timestamp: String,

    /// Indices dans l'ordre d'affichage
    pub indices: Vec<MarketIndex>,

    pub vix: Option<VixData>,

    /// Indice manufacturier de la Fed de Philadelphie
    pub philly_fed: Option<f64>,
}

impl MarketOverview {
    /// Retourne true si le Philly Fed est publié et positif
    pub fn is_philly_fed_positive(&self) -> bool {
        self.philly_fed.map(|v| v > 0.0).unwrap_or(false)
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_is_positive() {
        assert!(MarketIndex::new("SPY", "S&P500", 694.07, 4.56, 0.66).is_positive());
        assert!(MarketIndex::new("DIA", "道指", 425.0, 0.0, 0.0).is_positive());
        assert!(!MarketIndex::new("QQQ", "纳指100", 500.0, -1.2, -0.24).is_positive());
    }

    #[test]
    fn test_vix_risk_buckets() {
        assert_eq!(VixData::new(14.2, "低恐慌").risk(), RiskLevel::Low);
        assert_eq!(VixData::new(19.99, "正常").risk(), RiskLevel::Low);
        assert_eq!(VixData::new(20.0, "警惕").risk(), RiskLevel::Medium);
        assert_eq!(VixData::new(29.9, "警惕").risk(), RiskLevel::Medium);
        assert_eq!(VixData::new(30.0, "高恐慌").risk(), RiskLevel::High);
    }

    #[test]
    fn test_vix_from_value_labels() {
        assert_eq!(VixData::from_value(14.2).level, "低恐慌");
        assert_eq!(VixData::from_value(15.0).level, "正常");
        assert_eq!(VixData::from_value(25.0).level, "警惕");
        assert_eq!(VixData::from_value(42.0).level, "高恐慌");
    }

    #[test]
    fn test_overview_deserialize_camel_case() {
        let json = r#"{
            "timestamp": "2026-01-11 08:00 EST",
            "indices": [
                {"ticker": "SPY", "name": "S&P500", "price": 694.07, "change": 4.56, "changePercent": 0.66}
            ],
            "vix": null,
            "phillyFed": -8.8
        }"#;

        let overview: MarketOverview = serde_json::from_str(json).unwrap();
        assert_eq!(overview.indices.len(), 1);
        assert_eq!(overview.indices[0].change_percent, 0.66);
        assert!(overview.vix.is_none());
        assert_eq!(overview.philly_fed, Some(-8.8));
        assert!(!overview.is_philly_fed_positive());
    }
}
