//! linktracker - tracked short links with click analytics
//!
//! # Architecture
//! - `analytics`: user-agent classification and date range resolution
//! - `storage`: SeaORM backend for links and clicks, report queries
//! - `services`: link management, click recording, statistics, sample data
//! - `api`: HTTP redirect, admin AJAX actions and health probes
//! - `interfaces`: command-line interface
//! - `config`: configuration management
//! - `runtime`: application lifecycle and execution modes
//! - `system`: logging setup

pub mod analytics;
pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
