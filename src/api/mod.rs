//! HTTP layer: redirect, admin actions, health probes

pub mod middleware;
pub mod nonce;
pub mod services;
pub mod state;

pub use state::AppState;
