use clap::Parser;

use linktracker::cli::Cli;
use linktracker::runtime::modes::{self, Mode};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    match cli.config.as_deref() {
        Some(path) => linktracker::config::init_config_from(path),
        None => linktracker::config::init_config(),
    }

    match modes::detect_mode(cli.command.as_ref()) {
        Mode::Server => {
            let config = linktracker::config::get_config();
            let _guard = linktracker::system::init_logging(&config.logging);
            modes::run_server().await
        }
        Mode::Cli => {
            let Some(command) = cli.command else {
                return Ok(());
            };
            if let Err(e) = modes::run_cli(command).await {
                eprintln!("{}", e.format_colored());
                std::process::exit(1);
            }
            Ok(())
        }
    }
}
