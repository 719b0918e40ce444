//! Terminal interface of the ALGO-trading platform

use std::io::read_to_string;
use std::sync::Arc;

use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use tracing::{debug, info};

use algo_client::{AdminAuth, ApiClient, FileStorage, SessionStore};

use crate::commands::Terminal;
use crate::config::{Config, LogFormat};
use crate::opt::Opt;

mod commands;
mod config;
mod opt;

/// Initializes tracing collection
///
/// Logs go to stderr so they never mix with command output.
fn setup_tracing(config: config::Logging) -> Result<()> {
    use tracing_error::ErrorLayer;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{EnvFilter, fmt};

    let fmt_layer = match config.format {
        LogFormat::Pretty => fmt::layer().pretty().with_writer(std::io::stderr).boxed(),
        LogFormat::Compact => fmt::layer().compact().with_writer(std::io::stderr).boxed(),
    };

    let filter_layer =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("warn"))?;

    let filter_layer = config
        .filters
        .into_iter()
        .fold(filter_layer, |layer, filter| layer.add_directive(filter));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .with(ErrorLayer::default())
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let Opt {
        config: mut config_file,
        command,
    } = Opt::parse();

    let config = read_to_string(&mut config_file)?;
    let config: Config = toml::from_str(&config).wrap_err("Invalid configuration")?;

    setup_tracing(config.logging)?;
    color_eyre::install()?;

    let storage_path = config.storage.path()?;
    info!(
        config = ?config_file.path().path(),
        storage = ?storage_path,
        api = config.api.base_url,
        "Tracing initialized, restoring session"
    );

    let storage = Arc::new(
        FileStorage::open(&storage_path)
            .wrap_err_with(|| format!("Cannot open state file {}", storage_path.display()))?,
    );
    let api = ApiClient::new(config.api.into(), storage.clone())?;
    let session = SessionStore::new(api);
    let admin = AdminAuth::new(storage);

    Terminal::new(session, admin).run(command).await?;

    debug!("Command finished");
    Ok(())
}
