// ============================================================================
// Structure : HomeScreen
// ============================================================================
// État local de la présentation, distinct du HomeState du contrôleur :
// curseur dans la liste de news, quit en deux temps, heure de la dernière
// synchronisation réussie.
// ============================================================================

use chrono::{DateTime, Local};

use crate::app::HomeState;

pub struct HomeScreen {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Index de la carte sous le curseur
    pub selected_index: usize,

    /// Première pression de 'q' reçue, en attente de confirmation
    pub confirm_quit: bool,

    /// Heure locale du dernier chargement réussi observé
    pub last_synced: Option<DateTime<Local>>,

    /// Un chargement a été lancé et pas encore vu se terminer
    was_loading: bool,
}

impl HomeScreen {
    /// Le contrôleur lance un chargement dès sa création : l'écran part
    /// donc en attente d'un premier résultat
    pub fn new() -> Self {
        Self {
            running: true,
            selected_index: 0,
            confirm_quit: false,
            last_synced: None,
            was_loading: true,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Quit en deux temps : la première pression demande confirmation
    pub fn press_quit(&mut self) {
        if self.confirm_quit {
            self.running = false;
        } else {
            self.confirm_quit = true;
        }
    }

    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    pub fn navigate_up(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    /// Descend d'une carte, sans dépasser la dernière
    pub fn navigate_down(&mut self, card_count: usize) {
        let max_index = card_count.saturating_sub(1);
        self.selected_index = (self.selected_index + 1).min(max_index);
    }

    /// Id de la carte sous le curseur
    pub fn selected_card_id<'a>(&self, state: &'a HomeState) -> Option<&'a str> {
        state
            .news_cards
            .get(self.selected_index)
            .map(|card| card.id.as_str())
    }

    /// Note qu'un refresh vient d'être demandé
    ///
    /// Un chargement rapide peut se terminer entre deux frames sans
    /// qu'aucun snapshot ne montre is_loading.
    pub fn track_refresh(&mut self) {
        self.was_loading = true;
    }

    /// Synchronise l'état local avec un nouveau snapshot
    ///
    /// - recadre le curseur si la liste a raccourci
    /// - note l'heure quand un chargement se termine sans erreur
    pub fn observe(&mut self, state: &HomeState) {
        let max_index = state.news_cards.len().saturating_sub(1);
        self.selected_index = self.selected_index.min(max_index);

        if self.was_loading && !state.is_loading && state.error.is_none() {
            self.last_synced = Some(Local::now());
        }
        self.was_loading = state.is_loading;
    }
}

impl Default for HomeScreen {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
