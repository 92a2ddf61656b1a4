use std::error::Error;

use authority::{Responder, ZoneRecords};
use configuration::{BlackholeConfiguration, LogConfiguration, LogRotation};
use listener::DnsServer;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod cli_args;

/// Stdout always, plus rolling files when `log.directory` is set. The
/// returned guard flushes the file writer on drop and must outlive `main`'s work.
fn init_tracing(log: &LogConfiguration) -> Result<Option<WorkerGuard>, Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));

    let (file_layer, guard) = match &log.directory {
        Some(directory) => {
            let rotation = match log.rotation {
                LogRotation::Minutely => Rotation::MINUTELY,
                LogRotation::Hourly => Rotation::HOURLY,
                LogRotation::Daily => Rotation::DAILY,
                LogRotation::Never => Rotation::NEVER,
            };
            let appender = RollingFileAppender::builder()
                .rotation(rotation)
                .filename_prefix(log.file_prefix.clone())
                .build(directory)?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args: cli_args::CliArgs = argh::from_env();

    let cfg = BlackholeConfiguration::load(args.config.clone())?;
    let _log_guard = init_tracing(&cfg.log)?;

    let zone = match cfg.zone.validate() {
        Ok(zone) => zone,
        Err(e) => {
            tracing::error!("invalid zone configuration in {}, err: {}", args.config.display(), e);
            return Err(e.into());
        }
    };

    tracing::info!(
        "serving zone {} as {} ({}), ttl {}, pid: {}",
        zone.base_domain,
        zone.server_name,
        zone.server_ip,
        zone.dns_ttl,
        std::process::id()
    );

    let responder = Responder::new(ZoneRecords::new(zone));
    let server = match DnsServer::from_configuration(&cfg.listener, responder).start().await {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("failed to start DNS server on {}, err: {}", cfg.listener.bind_address(), e);
            return Err(e.into());
        }
    };

    tracing::info!("Server running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    tracing::info!("Received interrupt, shutting down...");
    server.stop().await;

    Ok(())
}
