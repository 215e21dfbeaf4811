use std::fs::OpenOptions;
use std::path::Path;
use std::sync::{Arc, Mutex};

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use feedwatch::app::{load_trigger_file, AppContext};
use feedwatch::cli::{commands, Cli, Commands};
use feedwatch::config::Config;
use feedwatch::poller::parse_interval;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log.as_deref(), cli.command.is_interactive())?;

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(workers) = cli.workers {
        config.poll.workers = workers;
    }

    let ctx = AppContext::new(config)?;

    match cli.command {
        Commands::Check { triggers } => {
            let path = triggers.unwrap_or_else(|| ctx.config.triggers_path());
            commands::check(&path)?;
        }
        Commands::Filter {
            triggers,
            json,
            sources,
        } => {
            let triggers = match triggers {
                Some(path) => load_trigger_file(&path)?,
                None => ctx.load_triggers()?,
            };
            commands::filter_sources(&ctx, &triggers, &sources, json).await?;
        }
        Commands::Watch {
            triggers,
            interval,
            no_initial_poll,
        } => {
            let triggers = match triggers {
                Some(path) => load_trigger_file(&path)?,
                None => ctx.load_triggers()?,
            };
            let mut poller_config = ctx.poller_config()?;
            if let Some(interval) = interval {
                poller_config.interval_secs =
                    parse_interval(&interval).map_err(anyhow::Error::msg)?;
            }
            if no_initial_poll {
                poller_config.poll_on_start = false;
            }
            commands::watch(Arc::new(ctx), triggers, poller_config).await?;
        }
        Commands::Tui { triggers, interval } => {
            let triggers = match triggers {
                Some(path) => load_trigger_file(&path)?,
                None => ctx.load_triggers()?,
            };
            let mut poller_config = ctx.poller_config()?;
            if let Some(interval) = interval {
                poller_config.interval_secs =
                    parse_interval(&interval).map_err(anyhow::Error::msg)?;
            }
            commands::tui(Arc::new(ctx), triggers, poller_config).await?;
        }
    }

    Ok(())
}

/// Logs go to `log` when given, otherwise to stderr, except in the TUI where
/// stderr would draw over the screen.
fn init_tracing(log: Option<&Path>, interactive: bool) -> anyhow::Result<()> {
    let file_layer = match log {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        }
        None => None,
    };
    let stderr_layer =
        (log.is_none() && !interactive).then(|| fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    Ok(())
}
