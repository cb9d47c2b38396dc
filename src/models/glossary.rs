// ============================================================================
// Glossaire : explications des termes financiers
// ============================================================================
// Table statique terme -> explication, construite une seule fois
//
// CONCEPT RUST : OnceLock
// - Initialisation paresseuse et thread-safe d'une valeur globale
// - get_or_init() construit la table au premier accès
// - Ensuite, lecture seule pour toute la durée du processus
// ============================================================================

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// Explication d'un terme du glossaire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermExplanation {
    /// Titre affiché (ex: "P/E (市盈率)")
    pub term: String,
    pub short_description: String,
    pub full_explanation: String,
    pub example: Option<String>,

    /// Seuils d'interprétation, une ligne par palier
    pub how_to_use: Option<String>,
}

/// Clés du glossaire, dans l'ordre d'affichage
const KEYS: [&str; 6] = ["P/E", "52周", "分析师", "目标价", "VIX", "因果链"];

static GLOSSARY: OnceLock<HashMap<&'static str, TermExplanation>> = OnceLock::new();

fn entry(term: &str, short: &str, full: &str, example: &str, how_to_use: &str) -> TermExplanation {
    TermExplanation {
        term: term.to_string(),
        short_description: short.to_string(),
        full_explanation: full.to_string(),
        example: Some(example.to_string()),
        how_to_use: Some(how_to_use.to_string()),
    }
}

fn build() -> HashMap<&'static str, TermExplanation> {
    let mut terms = HashMap::new();

    terms.insert(
        "P/E",
        entry(
            "P/E (市盈率)",
            "股价 / 每股收益",
            "市盈率表示你愿意为公司每赚1美元付多少钱。P/E越高,说明市场对公司未来增长预期越高,但也可能意味着股价被高估。",
            "AMZN P/E = 34.9 意味着你为亚马逊每赚1美元付34.9美元",
            "< 15: 便宜\n15-25: 合理\n25-40: 较贵\n> 40: 很贵",
        ),
    );
    terms.insert(
        "52周",
        entry(
            "52周位置",
            "当前价在过去一年高低点之间的位置",
            "52周位置显示股价在过去一年最高价和最低价之间的相对位置。88%意味着接近一年高点,股价强势;36%意味着接近一年低点,股价弱势。",
            "AMZN 52周: 88% 表示接近一年最高点",
            "0-20%: 接近底部\n20-40%: 偏低\n60-80%: 偏高\n80-100%: 接近顶部",
        ),
    );
    terms.insert(
        "分析师",
        entry(
            "分析师评级",
            "华尔街分析师的买入/持有/卖出建议",
            "显示有多少华尔街分析师给出买入、持有、卖出评级。(73/4/0)表示73人说买入,4人说持有,0人说卖出。",
            "AMZN: 买入 (73/4/0) 表示绝大多数分析师看好",
            "注意: 分析师很少说卖出(怕得罪公司),所以持有往往意味着不看好。",
        ),
    );
    terms.insert(
        "目标价",
        entry(
            "目标价空间",
            "分析师预测的股价 vs 当前价的差距",
            "目标价是分析师对未来12个月股价的预测。目标价空间表示当前价距离目标价还有多少上涨/下跌空间。",
            "+19.2% 表示分析师认为还能涨19.2%",
            "> +20%: 强烈看好\n+10% - +20%: 看好\n0% - +10%: 中性\n< 0%: 看空(当前价已超过目标价)",
        ),
    );
    terms.insert(
        "VIX",
        entry(
            "VIX 恐慌指数",
            "市场对未来30天波动的预期",
            "VIX也叫恐慌指数,反映投资者对市场未来波动的预期。VIX越高,市场越恐慌。",
            "VIX = 14.2 表示市场情绪乐观,波动预期低",
            "< 15: 极度乐观\n15-20: 正常\n20-30: 有些担忧\n30-40: 恐慌\n> 40: 极度恐慌",
        ),
    );
    terms.insert(
        "因果链",
        entry(
            "因果链分析",
            "事件影响股价的逻辑推理链",
            "因果链用 A -> B -> C 的格式展示新闻事件如何一步步影响股价,帮助你理解背后的投资逻辑。",
            "DEI取消 -> 成本降低 -> 利润率提高 -> 股价上涨",
            "关注每一步的逻辑是否合理,有没有被忽略的因素。",
        ),
    );

    terms
}

/// Recherche un terme par sa clé (ex: "P/E", "VIX")
///
/// Retourne None pour une clé inconnue.
pub fn lookup(key: &str) -> Option<&'static TermExplanation> {
    GLOSSARY.get_or_init(build).get(key)
}

/// Toutes les clés, dans un ordre stable
pub fn keys() -> &'static [&'static str] {
    &KEYS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_pe() {
        let pe = lookup("P/E").unwrap();
        assert_eq!(pe.term, "P/E (市盈率)");
        assert_eq!(pe.short_description, "股价 / 每股收益");
        assert!(pe.how_to_use.as_deref().unwrap().starts_with("< 15"));
    }

    #[test]
    fn test_lookup_unknown_key() {
        assert!(lookup("unknown-key").is_none());
        assert!(lookup("").is_none());
        // Sensible à la casse
        assert!(lookup("vix").is_none());
    }

    #[test]
    fn test_every_key_resolves() {
        for key in keys() {
            assert!(lookup(key).is_some(), "missing glossary entry for {key}");
        }
        assert_eq!(keys().len(), 6);
    }

    #[test]
    fn test_lookup_returns_same_instance() {
        let first = lookup("VIX").unwrap();
        let second = lookup("VIX").unwrap();
        assert!(std::ptr::eq(first, second));
    }
}
