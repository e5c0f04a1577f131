//! Admin AJAX API

pub mod actions;
pub mod error_code;
pub mod helpers;
pub mod routes;
pub mod types;

pub use actions::AdminAction;
pub use error_code::ErrorCode;
pub use routes::admin_routes;
pub use types::{AjaxRequest, ApiEnvelope, NonceBundle};
