use remote_write_sender::Sender;
use remote_write_sender::config::Config;
use remote_write_sender::input;
use tracing::{error, info};

/// Log and exit.
fn fatal(msg: &str, error: &dyn std::fmt::Display) -> ! {
    error!(%error, "{msg}");
    std::process::exit(1);
}

fn setup_logging() {
    use tracing_subscriber::filter::LevelFilter;
    use tracing_subscriber::prelude::*;

    let level = std::env::var("REMOTE_WRITE_LOG_LEVEL")
        .ok()
        .and_then(|val| {
            val.parse::<LevelFilter>().ok().or_else(|| {
                eprintln!("invalid REMOTE_WRITE_LOG_LEVEL: {val:?}, defaulting to WARN");
                None
            })
        })
        .unwrap_or(LevelFilter::WARN);

    tracing_subscriber::registry()
        .with(level)
        .with(tracing_microjson::JsonLayer::new(std::io::stderr).with_target(true))
        .init();
}

fn setup_rustls() {
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("failed to install rustls ring provider");
}

#[tokio::main]
async fn main() {
    setup_logging();
    setup_rustls();

    let config = Config::from_env().unwrap_or_else(|e| fatal("config error", &e));

    let raw = tokio::task::spawn_blocking(|| std::io::read_to_string(std::io::stdin()))
        .await
        .unwrap_or_else(|e| fatal("stdin reader panicked", &e))
        .unwrap_or_else(|e| fatal("failed to read series from stdin", &e));
    let mut series = input::parse_series(&raw).unwrap_or_else(|e| fatal("invalid input", &e));

    let sender = Sender::from_config(&config)
        .unwrap_or_else(|e| fatal("failed to build remote write client", &e));

    info!(
        endpoint = %config.endpoint,
        batch_size = %config.batch_size,
        series = series.len(),
        "sending series"
    );

    if let Err(e) = sender.send(&mut series).await {
        fatal("remote write failed", &e);
    }

    info!("remote write complete");
}
