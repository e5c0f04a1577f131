pub mod auth;

pub use auth::{AdminAuth, Capability, Grants};
