//! Définition et implémentation des commandes CLI
//!
//! - `servers`: liste des serveurs WFS configurés
//! - `url`: URL GetFeature d'une couche
//! - `import`: WFS (ou fichier GeoJSON) → couche GeoJSON + rapport

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use tracing::{info, warn};

use wfs_import::{import_slice, ImportOptions};
use wfs_loader::export::export_layer_to_file;
use wfs_loader::{fetch_layer, get_feature_url, Config, FetchConfig, ImportReport, ImportStatus};

#[derive(Subcommand)]
pub enum Commands {
    /// List the configured WFS servers
    Servers {
        /// Config preset name (nl) or path to a JSON config
        #[arg(long, default_value = "nl")]
        config: String,
    },

    /// Print the GetFeature URL of a layer
    Url {
        /// Server key, label or base URL
        #[arg(short, long)]
        server: String,

        /// WFS layer name (typeName)
        #[arg(short, long)]
        layer: String,

        /// Config preset name (nl) or path to a JSON config
        #[arg(long, default_value = "nl")]
        config: String,
    },

    /// Import a WFS layer into a GeoJSON file
    Import(ImportArgs),
}

#[derive(Args)]
pub struct ImportArgs {
    /// WFS layer name (typeName)
    #[arg(short, long)]
    pub layer: String,

    /// Server key, label or base URL
    #[arg(short, long, conflicts_with = "input", required_unless_present = "input")]
    pub server: Option<String>,

    /// Read an already downloaded GetFeature response instead of fetching it
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output GeoJSON file
    #[arg(short, long)]
    pub output: PathBuf,

    /// CRS tag of the created layer (défaut : env WFS_CRS / EPSG:28992)
    #[arg(long)]
    pub crs: Option<String>,

    /// Translate features on all cores (output order is kept)
    #[arg(long)]
    pub parallel: bool,

    /// Do not append the WKT as last attribute
    #[arg(long)]
    pub no_wkt_attribute: bool,

    /// Write the import report as JSON
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Config preset name (nl) or path to a JSON config
    #[arg(long, default_value = "nl")]
    pub config: String,
}

/// Exécute la commande servers
pub fn cmd_servers(config_spec: &str) -> Result<()> {
    let config = Config::resolve(config_spec)?;

    for server in &config.servers {
        println!("{:<10} {:<45} {}", server.key, server.label, server.url);
    }

    Ok(())
}

/// Exécute la commande url
pub fn cmd_url(config_spec: &str, server: &str, layer: &str) -> Result<()> {
    let config = Config::resolve(config_spec)?;
    let fetch_config = FetchConfig::from_env();

    let base = config.resolve_url(server)?;
    let url = get_feature_url(&base, layer, &fetch_config.output_format)?;
    println!("{}", url);

    Ok(())
}

/// Exécute la commande import
pub async fn cmd_import(args: &ImportArgs) -> Result<()> {
    let start = Instant::now();
    let fetch_config = FetchConfig::from_env();
    let crs = args.crs.clone().unwrap_or_else(|| fetch_config.crs.clone());

    let mut report = ImportReport::new(&args.layer, &requested_source(args), &crs);

    // Source : fichier local ou requête GetFeature
    match read_source(args, &fetch_config).await {
        Ok((body, source)) => {
            info!(
                layer = %args.layer,
                source = %source,
                bytes = body.len(),
                crs = %crs,
                "Starting import"
            );
            report.source = source;

            let options = ImportOptions {
                crs: crs.clone(),
                append_wkt: !args.no_wkt_attribute,
                parallel: args.parallel,
            };

            match import_slice(&body, &options, &mut report) {
                Ok(outcome) => {
                    report.record_outcome(&outcome);
                    let added = export_layer_to_file(&args.layer, &outcome, &args.output)?;
                    info!(
                        layer = %args.layer,
                        output = %args.output.display(),
                        features = added,
                        "Layer written"
                    );
                }
                Err(e) => {
                    warn!(layer = %args.layer, error = %e, "Import failed");
                    report.record_fatal(&e);
                }
            }
        }
        Err(e) => {
            let reason = format!("{:#}", e);
            warn!(layer = %args.layer, error = %reason, "Source unavailable");
            report.record_fatal(reason);
        }
    }

    report.set_duration(start.elapsed());
    report.finalize();
    report.display();

    if let Some(ref path) = args.report {
        report
            .save_to_file(path)
            .context(format!("Failed to write report: {}", path.display()))?;
    }

    if report.status == ImportStatus::Failed {
        anyhow::bail!("{}", report.summary());
    }

    println!("{}", report.summary());
    Ok(())
}

/// Source annoncée avant lecture : fichier ou serveur demandé
fn requested_source(args: &ImportArgs) -> String {
    match (&args.input, &args.server) {
        (Some(path), _) => path.display().to_string(),
        (None, Some(server)) => server.clone(),
        (None, None) => String::new(),
    }
}

/// Lit le fichier d'entrée ou télécharge la couche
async fn read_source(
    args: &ImportArgs,
    fetch_config: &FetchConfig,
) -> Result<(Vec<u8>, String)> {
    match (&args.input, &args.server) {
        (Some(path), _) => {
            let body = std::fs::read(path)
                .context(format!("Failed to read input file: {}", path.display()))?;
            Ok((body, path.display().to_string()))
        }
        (None, Some(server)) => {
            let config = Config::resolve(&args.config)?;
            let base = config.resolve_url(server)?;
            let url = get_feature_url(&base, &args.layer, &fetch_config.output_format)?;
            let body = fetch_layer(fetch_config, &url, &args.layer).await?;
            Ok((body, url.to_string()))
        }
        (None, None) => anyhow::bail!("Either --server or --input is required"),
    }
}
