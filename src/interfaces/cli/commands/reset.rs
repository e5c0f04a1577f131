//! Reset click data command

use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use crate::analytics::date_range::parse_date;
use crate::config::get_config;
use crate::interfaces::cli::CliError;
use crate::services::{DemoDataService, DemoWindow, LinkService};
use crate::storage::SeaOrmStorage;

fn confirm(prompt: &str) -> bool {
    print!("{} [y/N] ", prompt);
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line).is_err() {
        return false;
    }
    matches!(line.trim(), "y" | "Y" | "yes")
}

pub async fn reset_data(
    storage: Arc<SeaOrmStorage>,
    from: Option<String>,
    to: Option<String>,
    yes: bool,
) -> Result<(), CliError> {
    let demo = get_config().demo.clone();
    let start = match from {
        Some(ref s) => parse_date(s)?,
        None => demo.window_start,
    };
    let end = match to {
        Some(ref s) => parse_date(s)?,
        None => demo.window_end,
    };
    let window = DemoWindow::new(start, end)?;

    if !yes && !confirm("This deletes every recorded click. Continue?") {
        println!("{} Aborted", "ℹ".bold().blue());
        return Ok(());
    }

    let links = Arc::new(LinkService::new(storage.clone()));
    let summary = DemoDataService::new(storage, links)
        .reset_with_window(window)
        .await?;

    println!("{} {}", "✓".bold().green(), summary.message);
    for (date, count) in &summary.clicks_by_date {
        println!("  {} {}", date.cyan(), count);
    }
    Ok(())
}
