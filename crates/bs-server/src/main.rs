use std::path::PathBuf;
use std::sync::Arc;

use bs_core::services::config_loader;
use bs_core::BuildServer;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default, PartialEq)]
struct CliArgs {
    config: Option<PathBuf>,
    log_file: Option<PathBuf>,
    debug: bool,
}

fn parse_args(args: &[String]) -> color_eyre::Result<CliArgs> {
    let mut parsed = CliArgs::default();
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--debug" => parsed.debug = true,
            "--config" => parsed.config = Some(value_for(arg, iter.next())?),
            "--log-file" => parsed.log_file = Some(value_for(arg, iter.next())?),
            other => color_eyre::eyre::bail!(
                "unknown argument '{other}'\nusage: nix-build-server [--config <path>] [--log-file <path>] [--debug]"
            ),
        }
    }
    Ok(parsed)
}

fn value_for(flag: &str, value: Option<&String>) -> color_eyre::Result<PathBuf> {
    value
        .map(PathBuf::from)
        .ok_or_else(|| color_eyre::eyre::eyre!("{flag} requires a path"))
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args: Vec<String> = std::env::args().collect();
    let cli = parse_args(&args)?;

    // Held until exit so buffered log lines are flushed.
    let _guard = setup_logging(&cli);

    let config = Arc::new(config_loader::load(cli.config.as_deref())?);
    tracing::info!(
        "starting build server for {} (data dir {})",
        config.hostname,
        config.data_dir.display()
    );

    let server = Arc::new(BuildServer::from_config(config.clone()));
    let repositories = server.list_units().await;
    tracing::info!("managing {} repositories: {:?}", repositories.len(), repositories);

    let listener =
        tokio::net::TcpListener::bind((config.bind_address.as_str(), config.api_port)).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, bs_server::router(server))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("shut down");
    Ok(())
}

/// Log to stdout, or to `--log-file` through a non-blocking writer.
fn setup_logging(cli: &CliArgs) -> Option<WorkerGuard> {
    let default_level = if cli.debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    match &cli.log_file {
        Some(path) => {
            let directory = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."));
            let file_name = path
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("nix-build-server.log"));
            let file_appender = tracing_appender::rolling::never(directory, file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            tracing_subscriber::fmt()
                .with_writer(non_blocking)
                .with_env_filter(filter)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
            None
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to listen for SIGTERM: {e}");
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
    tracing::info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("nix-build-server")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn no_arguments() {
        assert_eq!(parse_args(&args(&[])).unwrap(), CliArgs::default());
    }

    #[test]
    fn all_flags() {
        let cli = parse_args(&args(&[
            "--config",
            "/etc/build-server.yaml",
            "--debug",
            "--log-file",
            "/var/log/bs.log",
        ]))
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/etc/build-server.yaml")));
        assert_eq!(cli.log_file, Some(PathBuf::from("/var/log/bs.log")));
        assert!(cli.debug);
    }

    #[test]
    fn missing_value_is_an_error() {
        assert!(parse_args(&args(&["--config"])).is_err());
    }

    #[test]
    fn unknown_flag_is_an_error() {
        assert!(parse_args(&args(&["--verbose"])).is_err());
    }
}
