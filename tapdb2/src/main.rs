//! Singer catalog discovery for DB2 for i.
//!
//! # Security Guarantees
//! - Read-only catalog queries only
//! - No credentials stored or logged
//! - The catalog is validated before it is written

use anyhow::Context;
use clap::Parser;
use std::io::IsTerminal;
use std::path::Path;
use tapdb2::{
    Cli, Command, ConnectionArgs, DiscoverArgs, SnapshotArgs, SourceSpec, load_connection,
};
use tapdb2_core::logging::init_logging;
use tapdb2_core::{
    Catalog, CatalogQuery, CatalogSnapshot, Credentials, create_catalog, create_connector,
    discover, initialize_schema_validator, validate_catalog,
};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.global.verbose, cli.global.quiet)?;

    initialize_schema_validator().context("Failed to initialize schema validator")?;

    match cli.command {
        Command::Discover(args) => run_discover(&args).await,
        Command::Snapshot(args) => run_snapshot(&args).await,
        Command::Test(args) => run_test(&args).await,
    }
}

/// Discovers the catalog and writes it to the output file or stdout.
async fn run_discover(args: &DiscoverArgs) -> anyhow::Result<()> {
    let spec = args.source()?;
    info!("Source: {}", spec.describe());

    let catalog = match &spec {
        SourceSpec::Snapshot(path) => {
            let snapshot = CatalogSnapshot::load(path).await?;
            discover(&snapshot).await?
        }
        live => {
            let source = open_catalog(live).await?;
            discover(source.as_ref()).await?
        }
    };

    write_catalog(&catalog, args.output.as_deref()).await
}

/// Captures raw catalog rows from a live system.
async fn run_snapshot(args: &SnapshotArgs) -> anyhow::Result<()> {
    let spec = args.connection.source()?;
    info!("Source: {}", spec.describe());

    let source = open_catalog(&spec).await?;
    let snapshot = CatalogSnapshot::capture(source.as_ref()).await?;
    snapshot.save(&args.output).await?;

    info!("✓ Snapshot saved to {}", args.output.display());
    Ok(())
}

/// Opens a connection and runs a trivial query.
async fn run_test(args: &ConnectionArgs) -> anyhow::Result<()> {
    let spec = args.source()?;
    let (config, credentials) = load_connection(&spec).await?;
    let credentials = prompt_password_if_missing(credentials)?;

    let connector = create_connector(&config, &credentials)?;
    info!("Testing connection to {}", connector.describe());
    connector
        .test_connection()
        .await
        .context("Connection test failed")?;

    info!("✓ Connection test successful");
    println!("Connection to {} successful", config);
    Ok(())
}

async fn open_catalog(spec: &SourceSpec) -> anyhow::Result<Box<dyn CatalogQuery>> {
    let (config, credentials) = load_connection(spec).await?;
    let credentials = prompt_password_if_missing(credentials)?;
    Ok(create_catalog(&config, &credentials)?)
}

/// Asks for the password on the terminal when a username came without one.
fn prompt_password_if_missing(credentials: Credentials) -> anyhow::Result<Credentials> {
    if credentials.has_password()
        || credentials.username().is_empty()
        || !std::io::stdin().is_terminal()
    {
        return Ok(credentials);
    }

    let password = rpassword::prompt_password(format!("Password for {}: ", credentials.username()))
        .context("Failed to read password")?;
    Ok(credentials.with_password(password))
}

/// Validates the catalog, then writes it.
async fn write_catalog(catalog: &Catalog, output: Option<&Path>) -> anyhow::Result<()> {
    validate_catalog(catalog).context("Catalog validation failed")?;
    info!("✓ Output validation passed");

    let json = catalog.to_json_pretty()?;
    match output {
        Some(path) => {
            tokio::fs::write(path, json)
                .await
                .with_context(|| format!("Failed to write catalog to {}", path.display()))?;
            info!("✓ Catalog saved to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}
