//! Statistics commands

use colored::Colorize;
use serde::Serialize;
use std::sync::Arc;

use crate::analytics::DateRangeParams;
use crate::interfaces::cli::CliError;
use crate::services::StatsService;
use crate::storage::SeaOrmStorage;

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::CommandError(format!("Failed to serialize: {}", e)))?;
    println!("{}", text);
    Ok(())
}

pub async fn show_stats(
    storage: Arc<SeaOrmStorage>,
    range: Option<String>,
    from: Option<String>,
    to: Option<String>,
    link: Option<i64>,
    json: bool,
) -> Result<(), CliError> {
    let stats = StatsService::new(storage);

    if let Some(link_id) = link {
        let link_stats = stats.link_stats(link_id).await?;
        if json {
            return print_json(&link_stats);
        }
        println!(
            "{} {} ({})",
            "Link".bold().green(),
            link_stats.link.title.bold(),
            link_stats.short_url.blue().underline()
        );
        println!(
            "  clicks: {}  unique: {}  rate: {}",
            link_stats.total_clicks.to_string().cyan(),
            link_stats.unique_visitors.to_string().cyan(),
            link_stats.conversion_rate.cyan()
        );
        for referrer in &link_stats.referrers {
            println!("  {} {}", referrer.source.magenta(), referrer.count);
        }
        return Ok(());
    }

    let params = match (from, to) {
        (Some(from), Some(to)) => DateRangeParams::custom(&from, &to),
        _ => DateRangeParams {
            date_range: range,
            ..Default::default()
        },
    };
    let range = stats.resolve_range(&params)?;

    let (summary, top_links, referrers) = tokio::join!(
        stats.dashboard_summary(&range),
        stats.top_links(&range),
        stats.top_referrers(&range),
    );

    if json {
        return print_json(&serde_json::json!({
            "start": range.start.to_string(),
            "end": range.end.to_string(),
            "summary": summary,
            "top_links": top_links,
            "top_referrers": referrers,
        }));
    }

    println!(
        "{} {} .. {} ({} days)",
        "Dashboard".bold().green(),
        range.start,
        range.end,
        range.days
    );
    println!(
        "  clicks: {}  unique: {}  active links: {}  rate: {}",
        summary.total_clicks.to_string().cyan(),
        summary.unique_visitors.to_string().cyan(),
        summary.active_links.to_string().cyan(),
        summary.conversion_rate.cyan()
    );
    println!();
    println!("{}", "Top links:".bold());
    for entry in &top_links {
        println!(
            "  {} {} clicks ({} unique)",
            entry.short_code.cyan(),
            entry.clicks,
            entry.unique_visitors
        );
    }
    println!("{}", "Top referrers:".bold());
    for entry in &referrers {
        println!("  {} {}", entry.source.magenta(), entry.count);
    }
    Ok(())
}

pub async fn show_data_count(storage: Arc<SeaOrmStorage>, json: bool) -> Result<(), CliError> {
    let report = StatsService::new(storage).data_count().await;
    if json {
        return print_json(&report);
    }
    if !report.table_exists {
        println!("{} Click table does not exist", "✗".bold().red());
        return Ok(());
    }
    println!(
        "{} {} clicks, {} visitors, {} links with clicks",
        "ℹ".bold().blue(),
        report.total_clicks,
        report.unique_visitors,
        report.links_with_clicks
    );
    if let (Some(first), Some(last)) = (&report.earliest_click, &report.latest_click) {
        println!("  {} .. {}", first, last);
    }
    for row in &report.clicks_by_date {
        println!("  {} {}", row.date.cyan(), row.count);
    }
    Ok(())
}
