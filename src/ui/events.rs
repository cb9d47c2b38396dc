// ============================================================================
// Gestion des événements
// ============================================================================
// Lit le clavier (crossterm) et traduit les touches en actions de l'écran
//
// CONCEPTS RUST :
// 1. Enums avec variants : représenter différents types d'événements
// 2. Pattern matching avec guards et matches!
// ============================================================================

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind};

use crate::models::glossary;

/// Intervalle de polling du clavier (et donc de rafraîchissement de l'écran)
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Événements de l'application
#[derive(Debug, Clone)]
pub enum Event {
    /// Touche pressée
    Key(KeyEvent),

    /// Aucun événement pendant l'intervalle de polling
    Tick,
}

/// Gestionnaire d'événements
pub struct EventHandler;

impl EventHandler {
    pub fn new() -> Self {
        Self
    }

    /// Lit le prochain événement (bloquant, au plus POLL_INTERVAL)
    ///
    /// Les tâches de chargement tournent sur les workers du runtime tokio,
    /// ce blocage n'arrête donc que le rendu.
    pub fn next(&self) -> Result<Event> {
        if event::poll(POLL_INTERVAL)? {
            match event::read()? {
                // Sur certains OS, on reçoit Press ET Release : on garde Press
                CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Ok(Event::Key(key)),
                _ => Ok(Event::Tick),
            }
        } else {
            Ok(Event::Tick)
        }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Actions
// ============================================================================

/// Action demandée par l'utilisateur
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    Refresh,
    Up,
    Down,
    /// Déplie / replie la carte sélectionnée
    Toggle,
    /// Affiche un terme du glossaire (clé)
    ShowTerm(&'static str),
    /// Ferme la popup du glossaire
    Dismiss,
}

/// Une lettre par terme, dans l'ordre de glossary::keys()
///
/// p (P/E), w (52周), a (分析师), t (目标价), v (VIX), c (因果链)
pub const TERM_SHORTCUTS: [char; 6] = ['p', 'w', 'a', 't', 'v', 'c'];

/// Clé du glossaire associée à une lettre
fn term_for(c: char) -> Option<&'static str> {
    let position = TERM_SHORTCUTS.iter().position(|&shortcut| shortcut == c)?;
    glossary::keys().get(position).copied()
}

/// Traduit un événement en action
pub fn action_for(event: &Event) -> Option<Action> {
    let Event::Key(key) = event else {
        return None;
    };

    let action = match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => Action::Quit,
        KeyCode::Char('r') | KeyCode::Char('R') => Action::Refresh,
        KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('K') => Action::Up,
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('J') => Action::Down,
        KeyCode::Enter | KeyCode::Char(' ') => Action::Toggle,
        KeyCode::Esc => Action::Dismiss,
        KeyCode::Char(c) => Action::ShowTerm(term_for(c)?),
        _ => return None,
    };

    Some(action)
}

// ============================================================================
// Tests
// ============================================================================
