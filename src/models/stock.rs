// ============================================================================
// Action : cotation, fondamentaux et avis des analystes
// ============================================================================
// Sous-records optionnels d'une carte de news
//
// CONCEPT : Option<f64> = "métrique indisponible pour cet instrument"
// - Un ETF n'a pas de prix cible ni de capitalisation
// - Un indice n'a pas de couverture analystes
// ============================================================================

use serde::{Deserialize, Serialize};

/// Cotation d'une action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockQuote {
    pub ticker: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub previous_close: f64,
}

impl StockQuote {
    pub fn new(ticker: &str, price: f64, change: f64, change_percent: f64, previous_close: f64) -> Self {
        Self {
            ticker: ticker.to_string(),
            price,
            change,
            change_percent,
            previous_close,
        }
    }

    pub fn is_positive(&self) -> bool {
        self.change >= 0.0
    }
}

/// Données fondamentales d'une action
///
/// Toutes les métriques sont optionnelles : None signifie que la source
/// ne la fournit pas pour cet instrument.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockFundamentals {
    pub ticker: String,
    pub company_name: String,
    pub sector: String,

    /// Price / Earnings (trailing)
    pub pe: Option<f64>,
    pub forward_pe: Option<f64>,

    /// Capitalisation en dollars
    pub market_cap: Option<u64>,

    pub week52_high: Option<f64>,
    pub week52_low: Option<f64>,

    /// Position du prix entre le plus bas et le plus haut 52 semaines (0-100)
    pub week52_position: Option<f64>,

    pub beta: Option<f64>,

    /// Prix cible moyen des analystes (12 mois)
    pub target_price: Option<f64>,
    pub target_high: Option<f64>,
    pub target_low: Option<f64>,

    /// Potentiel vers le prix cible, en pourcentage signé
    pub upside: Option<f64>,
}

impl StockFundamentals {
    /// Position (en %) de `price` entre `low` et `high`, arrondie au dixième
    ///
    /// Retourne None si l'intervalle est vide (high == low).
    pub fn week52_position_of(price: f64, low: f64, high: f64) -> Option<f64> {
        if high == low {
            return None;
        }
        Some(round_tenth((price - low) / (high - low) * 100.0))
    }

    /// Potentiel (en %) du prix vers la cible, arrondi au dixième
    pub fn upside_of(target: f64, price: f64) -> Option<f64> {
        if price == 0.0 {
            return None;
        }
        Some(round_tenth((target - price) / price * 100.0))
    }
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Libellé de consensus quand aucun analyste ne couvre le titre
pub const NO_CONSENSUS: &str = "无数据";

/// Répartition des recommandations des analystes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalystRating {
    pub ticker: String,
    pub buy_count: u32,
    pub hold_count: u32,
    pub sell_count: u32,

    /// Libellé du consensus (ex: "买入", "持有")
    pub consensus: String,
}

impl AnalystRating {
    pub fn new(ticker: &str, buy: u32, hold: u32, sell: u32, consensus: &str) -> Self {
        Self {
            ticker: ticker.to_string(),
            buy_count: buy,
            hold_count: hold,
            sell_count: sell,
            consensus: consensus.to_string(),
        }
    }

    /// Construit un rating en dérivant le consensus depuis les comptes
    ///
    /// - ratio d'achat > 60% : 买入
    /// - ratio d'achat < 30% : 卖出
    /// - sinon : 持有
    pub fn from_counts(ticker: &str, buy: u32, hold: u32, sell: u32) -> Self {
        let total = buy + hold + sell;
        let consensus = if total == 0 {
            NO_CONSENSUS
        } else {
            let buy_ratio = f64::from(buy) / f64::from(total);
            if buy_ratio > 0.6 {
                "买入"
            } else if buy_ratio < 0.3 {
                "卖出"
            } else {
                "持有"
            }
        };

        Self::new(ticker, buy, hold, sell, consensus)
    }

    pub fn total(&self) -> u32 {
        self.buy_count + self.hold_count + self.sell_count
    }

    /// Format : "买入 (73/4/0)"
    pub fn display_text(&self) -> String {
        format!(
            "{} ({}/{}/{})",
            self.consensus, self.buy_count, self.hold_count, self.sell_count
        )
    }
}

/// Données complètes d'un ticker (résultat de fetch_stock)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StockData {
    pub quote: Option<StockQuote>,
    pub fundamentals: Option<StockFundamentals>,
    pub analyst: Option<AnalystRating>,
}
