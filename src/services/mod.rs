//! Service layer
//!
//! Business logic shared by the HTTP handlers and the CLI.

mod click_service;
mod demo_data;
mod link_service;
mod stats_service;

pub use click_service::*;
pub use demo_data::*;
pub use link_service::*;
pub use stats_service::*;
