// ============================================================================
// MarketPulse - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests
// ============================================================================

pub mod api;       // Sources de données (mock, backend REST)
pub mod app;       // Contrôleur d'état de l'écran
pub mod config;    // Configuration par variables d'environnement
pub mod models;    // Structures de données
pub mod ui;        // Interface utilisateur
