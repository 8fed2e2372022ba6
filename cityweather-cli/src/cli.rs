use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use cityweather_core::{Aggregator, Config, JmaClient, Scheduler, SnapshotStore};
use std::{path::PathBuf, sync::Arc};
use tokio::{net::TcpListener, signal};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::server;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "cityweather", version, about = "JMA city weather cache and API")]
pub struct Cli {
    /// Path to the config file (TOML). Defaults to the platform config directory.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error. Overrides RUST_LOG.
    #[arg(short, long, global = true)]
    pub level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Refresh forecasts periodically and serve them over HTTP (default).
    Serve {
        /// Address to bind, e.g. "127.0.0.1:8080".
        #[arg(long)]
        listen: Option<String>,

        /// Refresh interval in seconds.
        #[arg(long)]
        interval: Option<u64>,

        /// Upstream forecast base URL.
        #[arg(long)]
        base_url: Option<String>,
    },

    /// Run one refresh and print the result as JSON.
    Fetch {
        /// Upstream forecast base URL.
        #[arg(long)]
        base_url: Option<String>,
    },

    /// List configured area codes and their upstream URLs.
    Areas,

    /// Write the default configuration file.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let command = self.command.unwrap_or(Command::Serve {
            listen: None,
            interval: None,
            base_url: None,
        });

        match command {
            Command::Init { force } => init(self.config, force),
            Command::Areas => {
                let config = load_config(self.config.as_ref())?;
                for code in &config.area_codes {
                    println!("{code}\t{}", config.area_url(code));
                }
                Ok(())
            }
            Command::Fetch { base_url } => {
                let mut config = load_config(self.config.as_ref())?;
                if let Some(base_url) = base_url {
                    config.base_url = base_url;
                }
                config.validate()?;

                let snapshot = aggregator(&config)?.run().await;
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
                Ok(())
            }
            Command::Serve { listen, interval, base_url } => {
                // CLI args override file config
                let mut config = load_config(self.config.as_ref())?;
                if let Some(listen) = listen {
                    config.listen = listen;
                }
                if let Some(interval) = interval {
                    config.refresh_interval_secs = interval;
                }
                if let Some(base_url) = base_url {
                    config.base_url = base_url;
                }
                config.validate()?;

                serve(config).await
            }
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

fn init(path: Option<PathBuf>, force: bool) -> anyhow::Result<()> {
    let path = match path {
        Some(path) => path,
        None => Config::config_file_path()?,
    };

    if path.exists() && !force {
        bail!(
            "Config file already exists: {}\n\
             Hint: pass --force to overwrite it.",
            path.display()
        );
    }

    Config::default().save_to(&path)?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}

fn aggregator(config: &Config) -> anyhow::Result<Aggregator> {
    let client = JmaClient::from_config(config).context("Failed to build HTTP client")?;
    Ok(Aggregator::new(Arc::new(client), config.area_codes.clone()))
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let listener = TcpListener::bind(config.listen.as_str())
        .await
        .with_context(|| format!("Failed to bind {}", config.listen))?;

    info!("City weather API starting...");
    info!("  Listen: http://{}/api/weather", config.listen);
    info!("  Upstream: {}", config.base_url);
    info!("  Areas: {}", config.area_codes.join(", "));
    info!("  Refresh interval: {} seconds", config.refresh_interval_secs);

    let store = Arc::new(SnapshotStore::new());
    let shutdown = CancellationToken::new();

    let scheduler = Scheduler::new(aggregator(&config)?, store.clone(), config.refresh_interval());
    let refresh = scheduler.spawn(shutdown.clone());

    tokio::spawn(shutdown_on_signal(shutdown.clone()));

    let served = server::serve(listener, store, shutdown.clone()).await;
    shutdown.cancel();

    if let Err(err) = refresh.await {
        error!(error = %err, "refresh task ended abnormally");
    }

    info!("City weather API stopped");
    served
}

async fn shutdown_on_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
    shutdown.cancel();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_parses() {
        let cli = Cli::try_parse_from(["cityweather"]).unwrap();

        assert!(cli.command.is_none());
    }

    #[test]
    fn serve_overrides_parse() {
        let cli = Cli::try_parse_from([
            "cityweather",
            "--config",
            "/tmp/cw.toml",
            "serve",
            "--listen",
            "127.0.0.1:9000",
            "--interval",
            "600",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("/tmp/cw.toml")));
        match cli.command {
            Some(Command::Serve { listen, interval, base_url }) => {
                assert_eq!(listen.as_deref(), Some("127.0.0.1:9000"));
                assert_eq!(interval, Some(600));
                assert!(base_url.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn init_refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        init(Some(path.clone()), false).unwrap();
        let err = init(Some(path.clone()), false).unwrap_err();
        assert!(err.to_string().contains("already exists"));

        init(Some(path.clone()), true).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), Config::default());
    }
}
