//! Point d'entrée CLI pour wfs-loader

use anyhow::Result;
use clap::Parser;
use tracing::{debug, Level};
use tracing_subscriber::{fmt, EnvFilter};

// Charger .env au démarrage
fn load_env() {
    // Chercher .env dans le répertoire courant ou parent
    if dotenvy::dotenv().is_err() {
        // Essayer depuis le répertoire du binaire
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                let _ = dotenvy::from_path(dir.join(".env"));
            }
        }
    }
}

mod cli;

use cli::Commands;

/// Parcourir les serveurs WFS et importer une couche
#[derive(Parser)]
#[command(name = "wfs-loader")]
#[command(author, version)]
#[command(about = "Importer une couche WFS (GeoJSON) en features WKT")]
#[command(long_about = "Outil pour importer les couches des serveurs WFS néerlandais (RIVM, Risicokaart, Geodan).\n\nLes features sans géométrie ou malformées sont ignorées et comptées dans le rapport.")]
struct Cli {
    /// Augmenter la verbosité (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Charger .env avant tout
    load_env();

    let cli = Cli::parse();

    // Configurer le logging
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Servers { config } => {
            debug!(config = %config, "Listing servers");
            cli::cmd_servers(&config)?;
        }
        Commands::Url {
            server,
            layer,
            config,
        } => {
            cli::cmd_url(&config, &server, &layer)?;
        }
        Commands::Import(args) => {
            cli::cmd_import(&args).await?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .init();
}
