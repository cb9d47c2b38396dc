// ============================================================================
// Contrôleur d'état de l'écran d'accueil
// ============================================================================
// Détient l'unique snapshot d'état observé par l'interface et expose les
// commandes qui le transforment.
//
// CONCEPTS RUST :
// 1. tokio::sync::watch : valeur observable, les abonnés reçoivent le snapshot
//    complet (pas de deltas)
// 2. send_modify : seul point d'écriture, chaque commande est atomique
// 3. Weak<T> : une tâche de chargement ne garde pas le contrôleur en vie
// 4. Drop : annule les chargements en cours à la destruction
//
// PATTERN : toutes les modifications passent par les méthodes de
// HomeController, l'interface ne fait que lire.
// ============================================================================

use std::sync::{Arc, Mutex, Weak};

use anyhow::{Context, Result};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::api::{DataSource, DEFAULT_NEWS_LIMIT};
use crate::models::{glossary, MarketOverview, NewsCard, TermExplanation};

/// Snapshot complet de l'état de l'écran
#[derive(Debug, Clone, PartialEq)]
pub struct HomeState {
    /// Un chargement est en cours
    pub is_loading: bool,

    /// Dernière vue d'ensemble chargée avec succès
    pub market_overview: Option<MarketOverview>,

    /// Dernier lot de news chargé avec succès
    pub news_cards: Vec<NewsCard>,

    /// Message du dernier échec de chargement
    pub error: Option<String>,

    /// Terme du glossaire affiché dans la popup
    pub selected_term: Option<TermExplanation>,

    /// Carte actuellement dépliée (au plus une)
    pub expanded_card_id: Option<String>,
}

impl HomeState {
    /// Vérifie si la carte `card_id` est dépliée
    pub fn is_expanded(&self, card_id: &str) -> bool {
        self.expanded_card_id.as_deref() == Some(card_id)
    }

    /// Retourne true si des données (même périmées) sont disponibles
    pub fn has_content(&self) -> bool {
        self.market_overview.is_some() || !self.news_cards.is_empty()
    }
}

/// État initial : chargement en cours, rien d'autre
impl Default for HomeState {
    fn default() -> Self {
        Self {
            is_loading: true,
            market_overview: None,
            news_cards: Vec::new(),
            error: None,
            selected_term: None,
            expanded_card_id: None,
        }
    }
}

/// Contrôleur de l'écran d'accueil
///
/// La création lance immédiatement un premier chargement sur le runtime
/// tokio courant ; elle échoue hors d'un runtime.
pub struct HomeController {
    state: Arc<watch::Sender<HomeState>>,
    source: Arc<dyn DataSource>,
    news_limit: usize,

    /// Runtime sur lequel tournent les chargements
    runtime: Handle,

    /// Chargements lancés et pas encore terminés
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl HomeController {
    /// Crée le contrôleur avec la limite de news par défaut
    pub fn new(source: Arc<dyn DataSource>) -> Result<Self> {
        Self::with_news_limit(source, DEFAULT_NEWS_LIMIT)
    }

    pub fn with_news_limit(source: Arc<dyn DataSource>, news_limit: usize) -> Result<Self> {
        // CONCEPT : Handle::try_current() plutôt que tokio::spawn
        // - tokio::spawn panique hors d'un runtime
        // - ici l'absence de runtime devient une erreur ordinaire
        let runtime = Handle::try_current().context("HomeController créé hors d'un runtime tokio")?;

        let (tx, _rx) = watch::channel(HomeState::default());
        let controller = Self {
            state: Arc::new(tx),
            source,
            news_limit,
            runtime,
            tasks: Mutex::new(Vec::new()),
        };

        controller.load();
        Ok(controller)
    }

    /// S'abonne aux changements d'état
    ///
    /// Le receiver voit toujours le snapshot le plus récent ; il est fermé
    /// quand le contrôleur est détruit.
    pub fn subscribe(&self) -> watch::Receiver<HomeState> {
        self.state.subscribe()
    }

    /// Copie du snapshot courant
    pub fn snapshot(&self) -> HomeState {
        self.state.borrow().clone()
    }

    // ========================================================================
    // Commandes
    // ========================================================================

    /// Lance un chargement du marché et des news
    ///
    /// Les données précédentes restent visibles jusqu'à la résolution.
    /// Plusieurs chargements peuvent se chevaucher : le dernier à se
    /// terminer écrit l'état final.
    pub fn load(&self) {
        self.state.send_modify(|state| {
            state.is_loading = true;
            state.error = None;
        });

        let state = Arc::downgrade(&self.state);
        let source = Arc::clone(&self.source);
        let limit = self.news_limit;

        debug!(limit, "Spawning load task");
        let handle = self.runtime.spawn(async move {
            let outcome = fetch_all(source.as_ref(), limit).await;
            apply_outcome(&state, outcome);
        });

        // Poisoned : une tâche a paniqué en tenant le verrou, la liste reste utilisable
        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        tasks.retain(|task| !task.is_finished());
        tasks.push(handle);
    }

    /// Rafraîchissement demandé par l'utilisateur (identique à load)
    pub fn refresh(&self) {
        info!("User requested refresh");
        self.load();
    }

    /// Déplie la carte, ou la replie si elle l'était déjà
    ///
    /// Déplier une carte replie implicitement l'autre. Un id inconnu est
    /// accepté tel quel.
    pub fn toggle_card_expansion(&self, card_id: &str) {
        self.state.send_modify(|state| {
            state.expanded_card_id = if state.is_expanded(card_id) {
                None
            } else {
                Some(card_id.to_string())
            };
        });
    }

    /// Affiche l'explication d'un terme du glossaire
    ///
    /// Une clé inconnue ferme la popup au lieu d'échouer.
    pub fn show_term_explanation(&self, term_key: &str) {
        let explanation = glossary::lookup(term_key).cloned();
        if explanation.is_none() {
            debug!(term_key, "Unknown glossary key");
        }
        self.state.send_modify(|state| state.selected_term = explanation);
    }

    /// Ferme la popup du glossaire
    pub fn dismiss_term_explanation(&self) {
        self.state.send_modify(|state| state.selected_term = None);
    }
}

impl Drop for HomeController {
    fn drop(&mut self) {
        let tasks = self.tasks.get_mut().unwrap_or_else(|e| e.into_inner());
        for task in tasks.drain(..) {
            task.abort();
        }
    }
}

// ============================================================================
// Chargement
// ============================================================================

/// Récupère le marché et les news en parallèle
async fn fetch_all(source: &dyn DataSource, limit: usize) -> Result<(MarketOverview, Vec<NewsCard>)> {
    tokio::try_join!(source.fetch_market_overview(), source.fetch_news(limit))
}

/// Écrit le résultat d'un chargement dans l'état, si le contrôleur existe encore
fn apply_outcome(
    state: &Weak<watch::Sender<HomeState>>,
    outcome: Result<(MarketOverview, Vec<NewsCard>)>,
) {
    let Some(state) = state.upgrade() else {
        debug!("Controller dropped, discarding load result");
        return;
    };

    match outcome {
        Ok((overview, cards)) => {
            info!(indices = overview.indices.len(), cards = cards.len(), "Load succeeded");
            state.send_modify(|state| {
                state.is_loading = false;
                state.error = None;
                state.market_overview = Some(overview);
                state.news_cards = cards;
            });
        }
        Err(e) => {
            error!(error = ?e, "Load failed");
            let message = format!("加载失败: {:#}", e);
            state.send_modify(|state| {
                state.is_loading = false;
                state.error = Some(message);
            });
        }
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::oneshot;

    use crate::api::mock::{self, MockDataSource};
    use crate::models::{AIAnalysis, StockData};

    const WAIT: Duration = Duration::from_secs(5);

    /// Source dont chaque appel à fetch_market_overview attend une "porte"
    /// ouverte par le test : l'ordre de résolution est contrôlé.
    struct GatedSource {
        gates: Mutex<VecDeque<oneshot::Receiver<Result<MarketOverview, String>>>>,
        calls: AtomicUsize,
    }

    impl GatedSource {
        /// Crée la source et les `n` portes correspondant aux n chargements
        fn new(n: usize) -> (Arc<Self>, Vec<oneshot::Sender<Result<MarketOverview, String>>>) {
            let mut senders = Vec::new();
            let mut receivers = VecDeque::new();
            for _ in 0..n {
                let (tx, rx) = oneshot::channel();
                senders.push(tx);
                receivers.push_back(rx);
            }
            let source = Arc::new(Self {
                gates: Mutex::new(receivers),
                calls: AtomicUsize::new(0),
            });
            (source, senders)
        }

        /// Attend que `n` chargements aient pris leur porte
        async fn wait_for_calls(&self, n: usize) {
            while self.calls.load(Ordering::SeqCst) < n {
                tokio::task::yield_now().await;
            }
        }
    }

    #[async_trait]
    impl DataSource for GatedSource {
        async fn fetch_market_overview(&self) -> Result<MarketOverview> {
            let gate = self
                .gates
                .lock()
                .unwrap()
                .pop_front()
                .expect("more loads than gates");
            self.calls.fetch_add(1, Ordering::SeqCst);

            match gate.await {
                Ok(Ok(overview)) => Ok(overview),
                Ok(Err(message)) => Err(anyhow::anyhow!(message)),
                Err(_) => Err(anyhow::anyhow!("gate dropped")),
            }
        }

        async fn fetch_news(&self, limit: usize) -> Result<Vec<NewsCard>> {
            let mut cards = mock::news_cards();
            cards.truncate(limit);
            Ok(cards)
        }

        async fn fetch_stock(&self, _ticker: &str) -> Result<StockData> {
            Ok(StockData::default())
        }

        async fn analyze_news(&self, _title: &str, _ticker: &str) -> Result<AIAnalysis> {
            anyhow::bail!("not used")
        }
    }

    fn overview_at(timestamp: &str) -> MarketOverview {
        MarketOverview {
            timestamp: timestamp.to_string(),
            ..mock::market_overview()
        }
    }

    async fn wait_until(
        rx: &mut watch::Receiver<HomeState>,
        predicate: impl FnMut(&HomeState) -> bool,
    ) -> HomeState {
        tokio::time::timeout(WAIT, rx.wait_for(predicate))
            .await
            .expect("timed out waiting for state")
            .expect("controller dropped")
            .clone()
    }

    fn mock_controller() -> HomeController {
        HomeController::new(Arc::new(MockDataSource::with_delay(Duration::ZERO))).unwrap()
    }

    // Pas de #[tokio::test] : aucun runtime courant
    #[test]
    fn test_creation_outside_runtime_is_error() {
        let result = HomeController::new(Arc::new(MockDataSource::with_delay(Duration::ZERO)));
        match result {
            Ok(_) => panic!("controller created without a runtime"),
            Err(e) => assert!(e.to_string().contains("runtime")),
        }
    }

    #[test]
    fn test_creation_inside_entered_runtime() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let _guard = runtime.enter();

        let controller =
            HomeController::new(Arc::new(MockDataSource::with_delay(Duration::ZERO))).unwrap();
        assert!(controller.snapshot().is_loading);
    }

    #[tokio::test]
    async fn test_initial_state() {
        let (source, _gates) = GatedSource::new(1);
        let controller = HomeController::new(source).unwrap();

        let state = controller.snapshot();
        assert!(state.is_loading);
        assert!(state.news_cards.is_empty());
        assert!(state.market_overview.is_none());
        assert!(state.error.is_none());
        assert!(state.selected_term.is_none());
        assert!(state.expanded_card_id.is_none());
        assert_eq!(state, HomeState::default());
    }

    #[tokio::test]
    async fn test_successful_load() {
        let controller = mock_controller();
        let mut rx = controller.subscribe();

        let state = wait_until(&mut rx, |s| !s.is_loading).await;
        assert_eq!(state.market_overview, Some(mock::market_overview()));
        assert_eq!(state.news_cards, mock::news_cards());
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn test_news_limit_is_forwarded() {
        let controller =
            HomeController::with_news_limit(Arc::new(MockDataSource::with_delay(Duration::ZERO)), 2)
                .unwrap();
        let mut rx = controller.subscribe();

        let state = wait_until(&mut rx, |s| !s.is_loading).await;
        assert_eq!(state.news_cards.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_load_keeps_previous_data() {
        let (source, mut gates) = GatedSource::new(2);
        let controller = HomeController::new(source.clone()).unwrap();
        let mut rx = controller.subscribe();

        gates.remove(0).send(Ok(overview_at("first"))).unwrap();
        let loaded = wait_until(&mut rx, |s| !s.is_loading).await;
        assert!(loaded.market_overview.is_some());

        controller.refresh();
        let pending = controller.snapshot();
        assert!(pending.is_loading);
        assert!(pending.error.is_none());
        // Pas de retour à vide pendant le chargement
        assert_eq!(pending.market_overview, loaded.market_overview);
        assert_eq!(pending.news_cards, loaded.news_cards);

        source.wait_for_calls(2).await;
        gates.remove(0).send(Err("network down".to_string())).unwrap();
        let failed = wait_until(&mut rx, |s| !s.is_loading).await;

        let message = failed.error.expect("error message");
        assert!(message.starts_with("加载失败"));
        assert!(message.contains("network down"));
        assert_eq!(failed.market_overview, loaded.market_overview);
        assert_eq!(failed.news_cards, loaded.news_cards);
    }

    #[tokio::test]
    async fn test_successful_load_clears_previous_error() {
        let (source, mut gates) = GatedSource::new(2);
        let controller = HomeController::new(source.clone()).unwrap();
        let mut rx = controller.subscribe();

        gates.remove(0).send(Err("boom".to_string())).unwrap();
        let failed = wait_until(&mut rx, |s| !s.is_loading).await;
        assert!(failed.error.is_some());
        assert!(!failed.has_content());

        controller.refresh();
        assert!(controller.snapshot().error.is_none());

        source.wait_for_calls(2).await;
        gates.remove(0).send(Ok(overview_at("second"))).unwrap();
        let state = wait_until(&mut rx, |s| !s.is_loading).await;
        assert!(state.error.is_none());
        assert!(state.has_content());
    }

    #[tokio::test]
    async fn test_overlapping_loads_last_resolution_wins() {
        let (source, mut gates) = GatedSource::new(2);
        let controller = HomeController::new(source.clone()).unwrap();
        let mut rx = controller.subscribe();
        source.wait_for_calls(1).await;

        controller.refresh();
        source.wait_for_calls(2).await;
        let second_gate = gates.pop().unwrap();
        let first_gate = gates.pop().unwrap();

        // Le refresh se termine en premier
        second_gate.send(Ok(overview_at("second"))).unwrap();
        let state = wait_until(&mut rx, |s| {
            s.market_overview.as_ref().map(|o| o.timestamp.as_str()) == Some("second")
        })
        .await;
        assert!(!state.is_loading);
        assert!(state.error.is_none());

        // Puis le premier chargement : c'est lui qui écrit en dernier
        first_gate.send(Ok(overview_at("first"))).unwrap();
        let state = wait_until(&mut rx, |s| {
            s.market_overview.as_ref().map(|o| o.timestamp.as_str()) == Some("first")
        })
        .await;
        assert!(!state.is_loading);
        assert!(state.error.is_none());
        assert_eq!(state.news_cards, mock::news_cards());
    }

    #[tokio::test]
    async fn test_overlapping_loads_failure_last() {
        let (source, mut gates) = GatedSource::new(2);
        let controller = HomeController::new(source.clone()).unwrap();
        let mut rx = controller.subscribe();
        source.wait_for_calls(1).await;

        controller.refresh();
        source.wait_for_calls(2).await;
        let second_gate = gates.pop().unwrap();
        let first_gate = gates.pop().unwrap();

        first_gate.send(Ok(overview_at("first"))).unwrap();
        wait_until(&mut rx, |s| s.market_overview.is_some()).await;

        second_gate.send(Err("timeout".to_string())).unwrap();
        let state = wait_until(&mut rx, |s| s.error.is_some()).await;

        // Jamais de mélange : l'échec garde les données du premier chargement
        assert!(!state.is_loading);
        assert_eq!(state.market_overview.unwrap().timestamp, "first");
    }

    #[tokio::test]
    async fn test_toggle_is_involution() {
        let controller = mock_controller();

        controller.toggle_card_expansion("1");
        assert!(controller.snapshot().is_expanded("1"));

        controller.toggle_card_expansion("1");
        assert!(controller.snapshot().expanded_card_id.is_none());
    }

    #[tokio::test]
    async fn test_double_toggle_from_other_card_collapses_all() {
        let controller = mock_controller();
        controller.toggle_card_expansion("2");

        // Le premier toggle remplace "2", le second replie "1" :
        // on ne revient pas à "2"
        controller.toggle_card_expansion("1");
        assert_eq!(controller.snapshot().expanded_card_id.as_deref(), Some("1"));

        controller.toggle_card_expansion("1");
        assert_eq!(controller.snapshot().expanded_card_id, None);
    }

    #[tokio::test]
    async fn test_toggle_expands_at_most_one_card() {
        let controller = mock_controller();

        controller.toggle_card_expansion("1");
        controller.toggle_card_expansion("2");

        let state = controller.snapshot();
        assert_eq!(state.expanded_card_id.as_deref(), Some("2"));
        assert!(!state.is_expanded("1"));
    }

    #[tokio::test]
    async fn test_toggle_accepts_unknown_id() {
        let controller = mock_controller();
        controller.toggle_card_expansion("does-not-exist");
        assert_eq!(
            controller.snapshot().expanded_card_id.as_deref(),
            Some("does-not-exist")
        );
    }

    #[tokio::test]
    async fn test_show_term_explanation() {
        let controller = mock_controller();

        controller.show_term_explanation("P/E");
        let term = controller.snapshot().selected_term.expect("P/E entry");
        assert_eq!(term.term, "P/E (市盈率)");

        controller.show_term_explanation("unknown-key");
        assert!(controller.snapshot().selected_term.is_none());
    }

    #[tokio::test]
    async fn test_dismiss_term_explanation() {
        let controller = mock_controller();

        controller.show_term_explanation("VIX");
        controller.dismiss_term_explanation();
        assert!(controller.snapshot().selected_term.is_none());

        // Idempotent
        controller.dismiss_term_explanation();
        assert!(controller.snapshot().selected_term.is_none());
    }

    #[tokio::test]
    async fn test_observers_are_notified() {
        let controller = mock_controller();
        let mut rx = controller.subscribe();
        rx.borrow_and_update();

        controller.show_term_explanation("因果链");
        assert!(rx.has_changed().unwrap());
        assert_eq!(
            rx.borrow_and_update().selected_term.as_ref().map(|t| t.term.as_str()),
            Some("因果链分析")
        );
    }

    #[tokio::test]
    async fn test_drop_closes_channel_and_discards_pending_load() {
        let (source, mut gates) = GatedSource::new(1);
        let controller = HomeController::new(source.clone()).unwrap();
        let mut rx = controller.subscribe();
        source.wait_for_calls(1).await;

        drop(controller);

        // La tâche est annulée : la porte n'a plus de receiver
        let gate = gates.remove(0);
        tokio::time::timeout(WAIT, async {
            while !gate.is_closed() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("load task was not cancelled");

        assert!(rx.changed().await.is_err());
        assert!(rx.borrow().is_loading);
    }
}
