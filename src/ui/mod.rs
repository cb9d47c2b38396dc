// ============================================================================
// Module : ui
// ============================================================================
// Couche de présentation (Terminal User Interface)
// Lit les snapshots du contrôleur et lui renvoie des commandes
// ============================================================================

pub mod dashboard; // Rendu de l'écran d'accueil
pub mod events;    // Gestion des événements clavier
pub mod screen;    // État local de la présentation

// Re-exports pour simplifier les imports
pub use dashboard::render;
pub use events::{Action, Event, EventHandler};
pub use screen::HomeScreen;
