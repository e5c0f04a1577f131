//! Link management commands

use colored::Colorize;
use std::sync::Arc;

use crate::interfaces::cli::CliError;
use crate::services::{CreateLinkRequest, LinkService};
use crate::storage::SeaOrmStorage;

pub async fn create_link(
    storage: Arc<SeaOrmStorage>,
    title: String,
    destination_url: String,
    campaign: Option<String>,
) -> Result<(), CliError> {
    let service = LinkService::new(storage);
    let created = service
        .create_link(CreateLinkRequest {
            title,
            destination_url,
            campaign,
        })
        .await?;

    println!(
        "{} Created tracked link #{}: {} ({})",
        "✓".bold().green(),
        created.link_id,
        created.short_code.cyan(),
        created.short_url.blue().underline()
    );
    Ok(())
}

pub async fn list_links(storage: Arc<SeaOrmStorage>) -> Result<(), CliError> {
    let links = LinkService::new(storage)
        .list_links()
        .await
        .map_err(|e| CliError::CommandError(format!("Failed to load links: {}", e)))?;

    if links.is_empty() {
        println!("{} No tracked links found", "ℹ".bold().blue());
        return Ok(());
    }

    println!("{}", "Tracked links:".bold().green());
    println!();
    for link in &links {
        let mut parts = vec![
            format!("#{}", link.id).dimmed().to_string(),
            format!("{} -> {}", link.short_code.cyan(), link.destination_url.blue().underline()),
            link.title.clone(),
        ];
        if let Some(ref campaign) = link.campaign {
            parts.push(format!("[{}]", campaign).magenta().to_string());
        }
        parts.push(
            format!(
                "(clicks: {}, unique: {}, rate: {})",
                link.total_clicks, link.unique_visitors, link.conversion_rate
            )
            .dimmed()
            .cyan()
            .to_string(),
        );
        if link.status.as_ref() != "publish" {
            parts.push(link.status.as_ref().yellow().to_string());
        }
        println!("  {}", parts.join(" "));
    }
    println!();
    println!(
        "{} Total {} tracked links",
        "ℹ".bold().blue(),
        links.len().to_string().green()
    );
    Ok(())
}

pub async fn delete_link(storage: Arc<SeaOrmStorage>, id: i64) -> Result<(), CliError> {
    LinkService::new(storage).delete_link(id).await?;
    println!("{} Deleted tracked link #{}", "✓".bold().green(), id);
    Ok(())
}
