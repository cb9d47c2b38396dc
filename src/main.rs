// ============================================================================
// MarketPulse - écran d'accueil en mode terminal
// ============================================================================
// Pouls du marché + news analysées par IA + glossaire des termes
//
// CONCEPTS RUST CLÉS :
// 1. Runtime tokio "entré" depuis un main synchrone (runtime.enter())
// 2. Event loop : render -> input -> commandes au contrôleur
// 3. watch::Receiver : l'UI lit toujours le snapshot le plus récent
// 4. Restauration du terminal même en cas d'erreur
// ============================================================================

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use marketpulse::app::{HomeController, HomeState};
use marketpulse::config::Config;
use marketpulse::ui::{events::action_for, render, Action, Event, EventHandler, HomeScreen};

// ============================================================================
// Initialisation du logging
// ============================================================================
// Les println! ne fonctionnent pas une fois le TUI lancé : on log vers un
// fichier avec rotation quotidienne.
// ============================================================================

/// Répertoire des logs
///
/// - Linux : ~/.local/share/marketpulse/logs
/// - macOS : ~/Library/Application Support/marketpulse/logs
/// - Windows : C:\Users\<user>\AppData\Local\marketpulse\logs
/// - sinon : ./logs
fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("marketpulse").join("logs"))
        .unwrap_or_else(|| PathBuf::from("./logs"))
}

/// Initialise le système de logging vers fichier
///
/// ```bash
/// tail -f ~/.local/share/marketpulse/logs/marketpulse.log.*
/// RUST_LOG=marketpulse=trace cargo run
/// ```
fn init_logging() -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "marketpulse.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "marketpulse=debug,info".into()),
        )
        .init();

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée
// ============================================================================

fn main() -> Result<()> {
    // Si le logging échoue, on continue sans
    init_logging().unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {}", e);
        eprintln!("   Continuing without logging...");
    });

    let config = Config::from_env().context("Configuration invalide")?;
    info!(
        mock = config.uses_mock(),
        news_limit = config.news_limit,
        "MarketPulse starting up"
    );

    // CONCEPT : runtime.enter()
    // - Le main reste synchrone (boucle TUI bloquante)
    // - Handle::try_current() trouve le runtime tant que le guard est vivant
    // - Les chargements tournent sur les workers du runtime
    let runtime = tokio::runtime::Runtime::new().context("Échec de la création du runtime tokio")?;
    let _guard = runtime.enter();

    let source = config.data_source()?;
    let controller = HomeController::with_news_limit(source, config.news_limit)?;

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    info!("Starting event loop");
    let result = run(&mut terminal, &controller, &EventHandler::new());

    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    // Détruit le contrôleur (annule les chargements) avant le runtime
    drop(controller);
    result
}

// ============================================================================
// Event Loop
// ============================================================================

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    controller: &HomeController,
    events: &EventHandler,
) -> Result<()> {
    let mut states: watch::Receiver<HomeState> = controller.subscribe();
    let mut screen = HomeScreen::new();

    while screen.is_running() {
        // 1. SNAPSHOT : copie l'état courant (le verrou du watch est relâché aussitôt)
        let state = states.borrow_and_update().clone();
        screen.observe(&state);

        // 2. RENDER
        terminal.draw(|frame| render(frame, &state, &screen))?;

        // 3. INPUT
        match events.next() {
            Ok(event) => handle_event(&mut screen, controller, &state, event),
            Err(e) => warn!(error = ?e, "Failed to read terminal event"),
        }
    }

    Ok(())
}

/// Traduit un événement en commande pour le contrôleur ou l'écran
fn handle_event(screen: &mut HomeScreen, controller: &HomeController, state: &HomeState, event: Event) {
    let Some(action) = action_for(&event) else {
        // Toute autre touche annule la confirmation de quit
        if matches!(event, Event::Key(_)) {
            screen.cancel_quit();
        }
        return;
    };

    if action != Action::Quit {
        screen.cancel_quit();
    }

    match action {
        Action::Quit => {
            info!(confirmed = screen.confirm_quit, "User pressed quit");
            screen.press_quit();
        }
        Action::Refresh => {
            controller.refresh();
            screen.track_refresh();
        }
        Action::Up => screen.navigate_up(),
        Action::Down => screen.navigate_down(state.news_cards.len()),
        Action::Toggle => {
            if let Some(card_id) = screen.selected_card_id(state) {
                debug!(card_id, "Toggling card");
                controller.toggle_card_expansion(card_id);
            }
        }
        Action::ShowTerm(term) => {
            debug!(term, "Showing glossary term");
            controller.show_term_explanation(term);
        }
        Action::Dismiss => controller.dismiss_term_explanation(),
    }
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| e.into())
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
