// ============================================================================
// Analyse IA d'une news
// ============================================================================

use serde::{Deserialize, Serialize};

/// Signal visuel tri-état dérivé du score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentiment {
    /// score >= 7
    Positive,
    /// 4 < score < 7
    Neutral,
    /// score <= 4
    Negative,
}

impl Sentiment {
    /// Pastille affichée dans l'en-tête de la carte
    pub fn marker(&self) -> &'static str {
        match self {
            Sentiment::Positive => "▲",
            Sentiment::Neutral => "●",
            Sentiment::Negative => "▼",
        }
    }
}

/// Résultat d'analyse d'une news par le moteur IA
///
/// Le score va de 0 à 10 par convention, sans validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AIAnalysis {
    pub score: i32,

    /// Libellé du signal (ex: "中性", "利空")
    pub signal: String,

    /// 核心判断
    pub core_judgment: String,

    /// 因果链 : "A → B → C"
    pub causal_chain: String,

    /// 估值视角
    pub valuation_view: String,

    /// 风险
    pub risk: String,

    /// 建议
    pub recommendation: String,
}

impl AIAnalysis {
    pub fn sentiment(&self) -> Sentiment {
        if self.score >= 7 {
            Sentiment::Positive
        } else if self.score <= 4 {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }

    /// Format : "评分 5/10 | 中性"
    pub fn score_line(&self) -> String {
        format!("评分 {}/10 | {}", self.score, self.signal)
    }
}
