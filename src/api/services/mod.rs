pub mod admin;
pub mod health;
pub mod redirect;

pub use health::{AppStartTime, health_routes};
pub use redirect::{RedirectService, redirect_routes};
