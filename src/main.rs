use color_eyre::{eyre::eyre, Result};
use ozw_monitor::config::MonitorConfig;
use ozw_monitor::decoder::PackedIdentifierDecoder;
use ozw_monitor::headers::build_lookup_tables;
use ozw_monitor::monitor::run_session;
use ozw_monitor::mqtt::mqtt_handler::MqttHandler;
use ozw_monitor::MonitorError;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    let config = MonitorConfig::load().await?;

    // tables are built before touching the broker; a missing source tree is fatal
    info!("Reading OpenZWave headers from {}", config.ozw_source_dir.display());
    let tables = build_lookup_tables(&config.ozw_source_dir)
        .await
        .map_err(|e| {
            error!("OpenZWave source directory not usable: {}", e);
            MonitorError::from(e)
        })?;

    let (msg_tx, mut msg_rx) = mpsc::channel(config.broker.channel_capacity.max(1));
    let handler = MqttHandler::new(config.broker.clone(), msg_tx);
    let client = handler.client();
    let mqtt_handle = tokio::spawn(handler.run());

    let decoder = PackedIdentifierDecoder::new(&tables);
    let mut stdout = std::io::stdout();

    let display_result = run_session(
        &mut msg_rx,
        &decoder,
        &mut stdout,
        async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Cannot listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        },
        async {
            if let Err(e) = client.disconnect().await {
                debug!("Disconnect request failed: {}", e);
            }
        },
    )
    .await;
    drop(msg_rx);

    let shutdown = match tokio::time::timeout(SHUTDOWN_GRACE, mqtt_handle).await {
        Ok(Ok(Ok(status))) => {
            let last_activity = status
                .last_activity
                .map_or_else(|| "never".to_string(), |at| at.format("%Y-%m-%d %H:%M:%S").to_string());
            info!(
                "Done: {} messages received, {} rejected, last message at {}",
                status.messages_received, status.messages_rejected, last_activity
            );
            Ok(())
        }
        Ok(Ok(Err(e))) => {
            error!("{}", e);
            Err(e.into())
        }
        Ok(Err(e)) => Err(eyre!("MQTT task failed: {}", e)),
        Err(_) => {
            warn!("MQTT task did not stop within {:?}", SHUTDOWN_GRACE);
            Ok(())
        }
    };

    display_result?;
    shutdown
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .init();
}
