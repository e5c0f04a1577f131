//! CLI interface module

pub mod commands;

use crate::cli::Commands;
use crate::storage::StorageFactory;
use commands::{
    create_link, delete_link, generate_config, list_links, reset_data, show_data_count,
    show_stats,
};
use std::fmt;

#[derive(Debug)]
pub enum CliError {
    StorageError(String),
    ParseError(String),
    CommandError(String),
}

impl CliError {
    /// Format as simple output
    pub fn format_simple(&self) -> String {
        match self {
            CliError::StorageError(msg) => format!("Storage error: {}", msg),
            CliError::ParseError(msg) => format!("Parse error: {}", msg),
            CliError::CommandError(msg) => format!("Command error: {}", msg),
        }
    }

    /// Format as colored output
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        match self {
            CliError::StorageError(msg) => {
                format!("{} {}", "Storage error:".red().bold(), msg.white())
            }
            CliError::ParseError(msg) => {
                format!("{} {}", "Parse error:".yellow().bold(), msg.white())
            }
            CliError::CommandError(msg) => {
                format!("{} {}", "Command error:".red().bold(), msg.white())
            }
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for CliError {}

impl From<crate::errors::LinkTrackerError> for CliError {
    fn from(err: crate::errors::LinkTrackerError) -> Self {
        match err {
            crate::errors::LinkTrackerError::Validation(msg)
            | crate::errors::LinkTrackerError::DateParse(msg) => CliError::ParseError(msg),
            other => CliError::StorageError(other.to_string()),
        }
    }
}

/// Run a CLI command from clap-parsed input
pub async fn run_cli_command(cmd: Commands) -> Result<(), CliError> {
    // 生成配置不需要数据库
    if let Commands::GenerateConfig { output_path, force } = cmd {
        return generate_config(output_path, force).await;
    }

    let storage = StorageFactory::create()
        .await
        .map_err(|e| CliError::StorageError(e.to_string()))?;

    match cmd {
        Commands::CreateLink {
            title,
            destination_url,
            campaign,
        } => create_link(storage, title, destination_url, campaign).await,

        Commands::ListLinks => list_links(storage).await,

        Commands::DeleteLink { id } => delete_link(storage, id).await,

        Commands::ResetData { from, to, yes } => reset_data(storage, from, to, yes).await,

        Commands::Stats {
            range,
            from,
            to,
            link,
            json,
        } => show_stats(storage, range, from, to, link, json).await,

        Commands::DataCount { json } => show_data_count(storage, json).await,

        Commands::Serve | Commands::GenerateConfig { .. } => Err(CliError::CommandError(
            "command is not handled in CLI mode".to_string(),
        )),
    }
}
