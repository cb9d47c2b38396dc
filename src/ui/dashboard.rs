// ============================================================================
// Dashboard - Rendu de l'écran d'accueil
// ============================================================================
// Dessine le snapshot HomeState : pouls du marché, news analysées et popup
// du glossaire. Lecture seule : aucune modification d'état ici.
//
// CONCEPTS RATATUI :
// 1. Layout : découpage de l'espace en zones
// 2. List + ListState : la liste suit le curseur (scroll automatique)
// 3. Clear : efface la zone sous une popup
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::app::HomeState;
use crate::models::{MarketIndex, MarketOverview, NewsCard, RiskLevel, Sentiment, TermExplanation};
use crate::ui::events::TERM_SHORTCUTS;
use crate::ui::screen::HomeScreen;

const ACCENT: Color = Color::Rgb(255, 140, 0);

/// Dessine l'écran complet
pub fn render(frame: &mut Frame, state: &HomeState, screen: &HomeScreen) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Contenu
            Constraint::Length(3), // Footer
        ])
        .split(frame.size());

    render_header(frame, state, screen, chunks[0]);
    render_body(frame, state, screen, chunks[1]);
    render_footer(frame, screen, chunks[2]);

    if let Some(term) = &state.selected_term {
        render_term_dialog(frame, term);
    }
}

// ============================================================================
// Header
// ============================================================================

fn render_header(frame: &mut Frame, state: &HomeState, screen: &HomeScreen, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT))
        .title(" My Personal Bloomberg ")
        .title_alignment(Alignment::Center);

    let status = if state.is_loading {
        Span::styled("正在获取市场数据...", Style::default().fg(Color::Yellow))
    } else if let Some(error) = &state.error {
        Span::styled(error.clone(), Style::default().fg(Color::Red))
    } else if let Some(synced) = screen.last_synced {
        Span::styled(
            format!("最后更新 {}", synced.format("%H:%M:%S")),
            Style::default().fg(Color::Gray),
        )
    } else {
        Span::raw("")
    };

    let line = Line::from(vec![
        Span::styled(
            "Citadel AI Engine  ",
            Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD),
        ),
        status,
    ]);

    let paragraph = Paragraph::new(line).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

// ============================================================================
// Corps : chargement, erreur ou contenu
// ============================================================================

fn render_body(frame: &mut Frame, state: &HomeState, screen: &HomeScreen, area: Rect) {
    // Les données précédentes restent visibles pendant un rechargement
    // ou après un échec
    if !state.has_content() {
        let (message, color) = match &state.error {
            Some(error) => (format!("{}\n\n[r] 重试", error), Color::Red),
            None if state.is_loading => ("正在获取市场数据...".to_string(), Color::Gray),
            None => ("暂无数据\n\n[r] 刷新".to_string(), Color::Gray),
        };

        let paragraph = Paragraph::new(message)
            .style(Style::default().fg(color))
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(0)])
        .split(area);

    match &state.market_overview {
        Some(overview) => render_market_overview(frame, overview, chunks[0]),
        None => frame.render_widget(
            Paragraph::new("--").block(Block::default().borders(Borders::ALL).title(" 市场脉搏 ")),
            chunks[0],
        ),
    }

    render_news(frame, state, screen, chunks[1]);
}

fn render_market_overview(frame: &mut Frame, overview: &MarketOverview, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue))
        .title(" 市场脉搏 ")
        .title(
            ratatui::widgets::block::Title::from(format!(" {} ", overview.timestamp))
                .alignment(Alignment::Right),
        );

    let indices: Vec<Span> = overview.indices.iter().flat_map(index_spans).collect();

    let mut gauges = Vec::new();
    if let Some(vix) = &overview.vix {
        let color = match vix.risk() {
            RiskLevel::Low => Color::Green,
            RiskLevel::Medium => Color::Yellow,
            RiskLevel::High => Color::Red,
        };
        gauges.push(Span::styled("VIX ", Style::default().fg(Color::Gray)));
        gauges.push(Span::styled(
            format!("{:.1} ({})  ", vix.value, vix.level),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
    }
    if let Some(fed) = overview.philly_fed {
        let color = if overview.is_philly_fed_positive() { Color::Green } else { Color::Red };
        gauges.push(Span::styled("费城联储 ", Style::default().fg(Color::Gray)));
        gauges.push(Span::styled(
            format!("{:.1}", fed),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
    }

    let paragraph = Paragraph::new(vec![Line::from(indices), Line::from(""), Line::from(gauges)])
        .block(block);
    frame.render_widget(paragraph, area);
}

fn index_spans(index: &MarketIndex) -> Vec<Span<'static>> {
    let color = if index.is_positive() { Color::Green } else { Color::Red };
    vec![
        Span::styled(format!("{} ", index.name), Style::default().fg(Color::Gray)),
        Span::styled(
            format!("{:+.2}%    ", index.change_percent),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
    ]
}

// ============================================================================
// News
// ============================================================================

fn render_news(frame: &mut Frame, state: &HomeState, screen: &HomeScreen, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT))
        .title(format!(" 今日新闻分析 ({} 条) ", state.news_cards.len()));

    // Largeur utile pour découper les textes longs (bordures exclues)
    let width = area.width.saturating_sub(4) as usize;

    let items: Vec<ListItem> = state
        .news_cards
        .iter()
        .map(|card| ListItem::new(card_text(card, state.is_expanded(&card.id), width)))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray));

    let mut list_state = ListState::default().with_selected(Some(screen.selected_index));
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn sentiment_color(sentiment: Sentiment) -> Color {
    match sentiment {
        Sentiment::Positive => Color::Green,
        Sentiment::Neutral => Color::Blue,
        Sentiment::Negative => Color::Red,
    }
}

/// Texte d'une carte : en-tête + métriques, et l'analyse si dépliée
fn card_text(card: &NewsCard, expanded: bool, width: usize) -> Text<'static> {
    let sentiment = card.analysis.sentiment();
    let color = sentiment_color(sentiment);
    let label = Style::default().fg(Color::Gray);

    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                format!("{} ", sentiment.marker()),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(card.title.clone(), Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(if expanded { "  ▾" } else { "  ▸" }, label),
        ]),
        Line::from(vec![
            Span::styled(
                format!("{:<6}", card.ticker),
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("{}   ", card.price_display()), price_style(card)),
            Span::styled("P/E ", label),
            Span::raw(format!("{}   ", metric(card.pe(), |v| format!("{:.1}", v)))),
            Span::styled("52周 ", label),
            Span::raw(metric(card.week52_position(), |v| format!("{:.0}%", v))),
        ]),
        Line::from(vec![
            Span::raw(format!("{}   ", card.analyst_display())),
            Span::raw(card.upside_display()),
        ]),
    ];

    if expanded {
        let analysis = &card.analysis;
        let sections = [
            ("核心判断", &analysis.core_judgment),
            ("因果链", &analysis.causal_chain),
            ("估值视角", &analysis.valuation_view),
            ("风险", &analysis.risk),
            ("建议", &analysis.recommendation),
        ];

        for (title, content) in sections {
            lines.push(Line::from(Span::styled(
                format!("  {}", title),
                Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            )));
            for chunk in wrap_text(content, width.saturating_sub(4)) {
                lines.push(Line::from(format!("    {}", chunk)));
            }
        }

        lines.push(Line::from(Span::styled(
            format!("  {} | {} | Citadel AI", analysis.score_line(), card.source),
            label,
        )));
    }

    lines.push(Line::from(""));
    Text::from(lines)
}

/// Vert si la cotation monte, rouge si elle baisse, neutre sans cotation
fn price_style(card: &NewsCard) -> Style {
    match &card.quote {
        Some(quote) if quote.is_positive() => Style::default().fg(Color::Green),
        Some(_) => Style::default().fg(Color::Red),
        None => Style::default().fg(Color::Gray),
    }
}

fn metric(value: Option<f64>, format: impl Fn(f64) -> String) -> String {
    value.map(format).unwrap_or_else(|| "--".to_string())
}

/// Découpe un texte en lignes d'au plus `width` colonnes
///
/// Les caractères CJK occupent deux colonnes dans un terminal.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(10);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut used = 0;

    for c in text.chars() {
        let w = if c.is_ascii() { 1 } else { 2 };
        if used + w > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
            used = 0;
        }
        current.push(c);
        used += w;
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

// ============================================================================
// Footer
// ============================================================================

fn render_footer(frame: &mut Frame, screen: &HomeScreen, area: Rect) {
    let key = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);

    let line = if screen.confirm_quit {
        Line::from(Span::styled(
            "⚠  Appuyez sur [q] à nouveau pour quitter, ou n'importe quelle autre touche pour annuler ⚠",
            key,
        ))
    } else {
        Line::from(vec![
            Span::styled("[q]", key),
            Span::raw(" Quit  "),
            Span::styled("[r]", key),
            Span::raw(" 刷新  "),
            Span::styled("[↑↓ / j k]", key),
            Span::raw(" Navigate  "),
            Span::styled("[Enter]", key),
            Span::raw(" 展开  "),
            Span::styled(format!("[{}]", term_shortcuts_hint()), key),
            Span::raw(" 术语"),
        ])
    };

    let paragraph = Paragraph::new(line)
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(ACCENT)))
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

/// "p w a t v c" : une lettre par terme du glossaire
fn term_shortcuts_hint() -> String {
    TERM_SHORTCUTS
        .iter()
        .map(char::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================================
// Popup du glossaire
// ============================================================================

fn render_term_dialog(frame: &mut Frame, term: &TermExplanation) {
    let area = centered_rect(70, 70, frame.size());

    let mut lines = vec![
        Line::from(Span::styled(
            term.short_description.clone(),
            Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled("详细解释", Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))),
        Line::from(term.full_explanation.clone()),
    ];

    if let Some(example) = &term.example {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "举个例子",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(example.clone(), Style::default().fg(Color::Green))));
    }

    if let Some(how_to_use) = &term.how_to_use {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "判断标准",
            Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
        )));
        lines.extend(how_to_use.lines().map(|l| Line::from(l.to_string())));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("[Esc] 明白了", Style::default().fg(Color::Gray))));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT))
        .title(format!(" {} ", term.term));

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

/// Rectangle centré de `percent_x` x `percent_y` % de `area`
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

// ============================================================================
// Tests
// ============================================================================
