///
/// This module implements the CLI interface for catalog-sync: command parsing,
/// the async entrypoint, and the status lines printed for the operator.
///
/// All business logic (credentials, fetching, filtering, output files) lives in
/// the [`catalog-sync-core`] crate. This module is strictly CLI glue.
///
/// ## How To Use
/// - Command line: `catalog-sync sync` or `catalog-sync check`, see `--help`.
/// - Programmatic/integration use: call [`run`] with a constructed [`Cli`].
///
/// [`catalog-sync-core`]: ../../catalog-sync-core/
use crate::load_config::{load_config, CliConfig};
use anyhow::Result;
use catalog_sync_core::contract::CredentialProvider;
use catalog_sync_core::credentials::Credentials;
use catalog_sync_core::fetch::ShopifyClient;
use catalog_sync_core::synchronise::synchronise;
use catalog_sync_core::temp_files::with_temp_files;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI for catalog-sync: publish active Shopify products as static site data.
#[derive(Parser)]
#[clap(
    name = "catalog-sync",
    version,
    about = "Pull published Shopify products into JSON data files for a static site"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch the catalog and write shopify-products.json and shopify-summary.json
    Sync {
        /// Optional YAML config file with output directories
        #[clap(long)]
        config: Option<PathBuf>,
        /// Pipeline-local output directory (overrides the config file)
        #[clap(long)]
        output_dir: Option<PathBuf>,
        /// Site static data directory (overrides the config file)
        #[clap(long)]
        site_data_dir: Option<PathBuf>,
    },
    /// Check that every required environment variable is set
    Check {
        /// Also decode RCLONE_CONFIG into a temporary file to prove it is valid
        #[clap(long)]
        decode_remote_config: bool,
    },
}

/// Async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("cli_started");

    match cli.command {
        Commands::Sync {
            config,
            output_dir,
            site_data_dir,
        } => {
            let cli_config = match config {
                Some(path) => load_config(path)?,
                None => CliConfig::default(),
            };
            let output = cli_config.with_overrides(output_dir, site_data_dir).output;
            let credentials = Credentials::from_env();
            let fetcher = ShopifyClient::from_provider(&credentials);

            println!("🛍️ Catalog sync starting...");
            match synchronise(&credentials, &fetcher, &output).await {
                Ok(report) => {
                    tracing::info!(command = "sync", ?report, "Synchronisation complete");
                    println!("✅ Catalog sync complete.\nReport:");
                    println!("{:#?}", report);
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(command = "sync", error = %e, "Synchronisation failed");
                    eprintln!("❌ Catalog sync failed: {e}");
                    Err(anyhow::Error::new(e))
                }
            }
        }
        Commands::Check {
            decode_remote_config,
        } => check(&Credentials::from_env(), decode_remote_config),
    }
}

fn check(credentials: &Credentials, decode_remote_config: bool) -> Result<()> {
    println!("🔧 Credential check");

    let valid = credentials.validate_all();
    if !valid {
        println!(
            "❌ Missing environment variables: {}",
            credentials.missing_settings().join(", ")
        );
    }

    let readiness = [
        ("Shopify", credentials.is_catalog_sync_ready()),
        ("Cloud storage", credentials.is_cloud_ready()),
    ];
    for (consumer, ready) in readiness {
        if ready {
            println!("✅ {consumer} credentials available");
        } else {
            println!("❌ {consumer} credentials missing");
        }
    }

    let decoded = if decode_remote_config {
        with_temp_files(|temps| match credentials.materialize_encoded_config(temps) {
            Some(path) => {
                println!("✅ RCLONE_CONFIG decoded ({})", path.display());
                true
            }
            None => {
                println!("❌ RCLONE_CONFIG could not be decoded");
                false
            }
        })
    } else {
        true
    };

    if valid && decoded {
        println!("✅ Configuration valid");
        Ok(())
    } else {
        anyhow::bail!("configuration invalid, check environment variables")
    }
}
