// ============================================================================
// Source de données : fixtures en mémoire
// ============================================================================
// Retourne un jeu de données figé (marché du 2026-01-11 + 4 news WSJ)
// avec une latence simulée, en attendant le backend.
// ============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use crate::api::DataSource;
use crate::models::{
    AIAnalysis, AnalystRating, MarketIndex, MarketOverview, NewsCard, StockData,
    StockFundamentals, StockQuote, VixData,
};

/// Latence simulée par défaut
pub const DEFAULT_DELAY: Duration = Duration::from_millis(500);

/// Source mock
#[derive(Debug, Clone)]
pub struct MockDataSource {
    delay: Duration,
}

impl MockDataSource {
    /// Source mock avec une latence donnée (zéro pour les tests)
    pub fn with_delay(delay: Duration) -> Self {
        Self { delay }
    }

    async fn simulate_latency(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

#[async_trait]
impl DataSource for MockDataSource {
    async fn fetch_market_overview(&self) -> Result<MarketOverview> {
        self.simulate_latency().await;
        debug!("Serving mock market overview");
        Ok(market_overview())
    }

    async fn fetch_news(&self, limit: usize) -> Result<Vec<NewsCard>> {
        self.simulate_latency().await;
        let mut cards = news_cards();
        cards.truncate(limit);
        debug!(count = cards.len(), limit, "Serving mock news");
        Ok(cards)
    }

    async fn fetch_stock(&self, ticker: &str) -> Result<StockData> {
        self.simulate_latency().await;
        let card = news_cards()
            .into_iter()
            .find(|card| card.ticker.eq_ignore_ascii_case(ticker))
            .with_context(|| format!("Aucune donnée mock pour {}", ticker))?;

        Ok(StockData {
            quote: card.quote,
            fundamentals: card.fundamentals,
            analyst: card.analyst,
        })
    }

    async fn analyze_news(&self, title: &str, ticker: &str) -> Result<AIAnalysis> {
        self.simulate_latency().await;
        news_cards()
            .into_iter()
            .find(|card| card.title == title && card.ticker.eq_ignore_ascii_case(ticker))
            .map(|card| card.analysis)
            .with_context(|| format!("Aucune analyse mock pour \"{}\" ({})", title, ticker))
    }
}

// ============================================================================
// Fixtures
// ============================================================================

/// Vue d'ensemble du marché figée
pub fn market_overview() -> MarketOverview {
    MarketOverview {
        timestamp: "2026-01-11 08:00 EST".to_string(),
        indices: vec![
            MarketIndex::new("SPY", "S&P500", 694.07, 4.56, 0.66),
            MarketIndex::new("QQQ", "纳指100", 512.34, 5.12, 1.00),
            MarketIndex::new("DIA", "道指", 425.67, 1.78, 0.42),
        ],
        vix: Some(VixData::new(14.2, "低恐慌")),
        philly_fed: Some(-8.8),
    }
}

fn spy_quote() -> StockQuote {
    StockQuote::new("SPY", 694.07, 4.56, 0.66, 689.51)
}

/// SPY est un ETF : ni capitalisation ni prix cible
fn spy_fundamentals() -> StockFundamentals {
    StockFundamentals {
        ticker: "SPY".to_string(),
        company_name: "SPDR S&P 500 ETF".to_string(),
        sector: "ETF".to_string(),
        pe: Some(28.1),
        forward_pe: Some(24.5),
        market_cap: None,
        week52_high: Some(700.0),
        week52_low: Some(520.0),
        week52_position: Some(99.0),
        beta: Some(1.0),
        target_price: None,
        target_high: None,
        target_low: None,
        upside: None,
    }
}

fn analysis(
    score: i32,
    signal: &str,
    core_judgment: &str,
    causal_chain: &str,
    valuation_view: &str,
    risk: &str,
    recommendation: &str,
) -> AIAnalysis {
    AIAnalysis {
        score,
        signal: signal.to_string(),
        core_judgment: core_judgment.to_string(),
        causal_chain: causal_chain.to_string(),
        valuation_view: valuation_view.to_string(),
        risk: risk.to_string(),
        recommendation: recommendation.to_string(),
    }
}

/// Les 4 news figées, ids "1" à "4"
pub fn news_cards() -> Vec<NewsCard> {
    vec![
        NewsCard {
            id: "1".to_string(),
            title: "Amazon Willing to Discuss Quebec Shutdown".to_string(),
            source: "WSJ".to_string(),
            published_at: "2026-01-11".to_string(),
            ticker: "AMZN".to_string(),
            quote: Some(StockQuote::new("AMZN", 247.38, 1.08, 0.44, 246.30)),
            fundamentals: Some(StockFundamentals {
                ticker: "AMZN".to_string(),
                company_name: "Amazon.com Inc".to_string(),
                sector: "Technology".to_string(),
                pe: Some(34.9),
                forward_pe: Some(28.5),
                market_cap: Some(1_580_000_000_000),
                week52_high: Some(260.0),
                week52_low: Some(180.0),
                week52_position: Some(88.0),
                beta: Some(1.15),
                target_price: Some(295.0),
                target_high: Some(320.0),
                target_low: Some(250.0),
                upside: Some(19.2),
            }),
            analyst: Some(AnalystRating::new("AMZN", 73, 4, 0, "买入")),
            analysis: analysis(
                5,
                "中性",
                "Amazon积极沟通或缓解潜在监管风险，但影响程度有限，短期股价波动可能较小。",
                "魁北克关停风险 → Amazon主动沟通加拿大官员 → 降低监管不确定性，稳定运营预期 → 长期利好。",
                "P/E显著高于行业，目标价有上涨空间，部分乐观预期已Price In，但沟通进展仍需观察。",
                "沟通结果的不确定性，以及魁北克政府强硬态度，可能导致未来运营受阻。",
                "持有者可继续持有，观望者需关注沟通进展，确认风险可控后再考虑介入。",
            ),
        },
        NewsCard {
            id: "2".to_string(),
            title: "Target Drops DEI Goals and Ends Program".to_string(),
            source: "WSJ".to_string(),
            published_at: "2026-01-11".to_string(),
            ticker: "TGT".to_string(),
            quote: Some(StockQuote::new("TGT", 105.52, -0.81, -0.76, 106.33)),
            fundamentals: Some(StockFundamentals {
                ticker: "TGT".to_string(),
                company_name: "Target Corporation".to_string(),
                sector: "Consumer Defensive".to_string(),
                pe: Some(12.8),
                forward_pe: Some(11.5),
                market_cap: Some(48_000_000_000),
                week52_high: Some(165.0),
                week52_low: Some(100.0),
                week52_position: Some(36.0),
                beta: Some(0.95),
                target_price: Some(98.0),
                target_high: Some(145.0),
                target_low: Some(85.0),
                upside: Some(-7.2),
            }),
            analyst: Some(AnalystRating::new("TGT", 14, 23, 6, "持有")),
            analysis: analysis(
                6,
                "中性",
                "中性偏利好。短期可能面临争议，长期看有利于降低运营成本，提升股东价值。",
                "DEI目标取消 → 减少供应商多样性相关成本 → 提高利润率 → 提升投资者信心。",
                "P/E较低且估值溢价较大，目标价下行空间有限，表明市场可能未充分price in。",
                "取消DEI可能引发消费者抵制和品牌声誉受损，影响短期销售额。",
                "持有者可继续持有，观察消费者反应。观望者可小仓位建仓，等待进一步消息。",
            ),
        },
        NewsCard {
            id: "3".to_string(),
            title: "Wall Street Banks Prepare to Sell Billions in X Loans".to_string(),
            source: "WSJ".to_string(),
            published_at: "2026-01-11".to_string(),
            ticker: "SPY".to_string(),
            quote: Some(spy_quote()),
            fundamentals: Some(spy_fundamentals()),
            analyst: None,
            analysis: analysis(
                4,
                "利空",
                "华尔街银行出售X贷款的消息可能导致市场担忧信贷风险上升。",
                "银行抛售贷款 → 流动性压力或信贷风险信号 → 市场担忧情绪上升 → 短期承压。",
                "SPY估值溢价较高，此类消息或加剧市场对经济增长的担忧，但短期内已部分Price In。",
                "贷款抛售规模未知，可能引发更广泛的信贷担忧。",
                "持有者关注宏观经济数据，谨慎持有；观望者可等待市场调整，再择机入场。",
            ),
        },
        NewsCard {
            id: "4".to_string(),
            title: "Canada to Provide $720 Million to Canada Post".to_string(),
            source: "WSJ".to_string(),
            published_at: "2026-01-11".to_string(),
            ticker: "SPY".to_string(),
            quote: Some(spy_quote()),
            fundamentals: Some(spy_fundamentals()),
            analyst: None,
            analysis: analysis(
                4,
                "利空",
                "加拿大政府救助加拿大邮政，短期避免破产，长期对SPY影响中性偏负面，但幅度有限。",
                "加拿大邮政经营不善 → 政府注资避免破产 → 增加政府财政负担 → 可能影响整体经济增长和市场情绪。",
                "SPY估值溢价较高，此类消息或加剧市场对经济增长的担忧，但短期内已部分Price In。",
                "加拿大邮政问题可能只是冰山一角，更广泛的经济问题或浮出水面。",
                "持有者关注宏观经济数据，谨慎持有；观望者可等待市场调整，再择机入场。",
            ),
        },
    ]
}

// ============================================================================
// Tests unitaires
// ============================================================================
