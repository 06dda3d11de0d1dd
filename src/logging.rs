use anyhow::{Result, anyhow};
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "integration_hub=info";

/// Install the global subscriber, writing to `<data_local_dir>/integration-hub/hub.log`.
///
/// The terminal is in raw mode for the whole session, so nothing may be
/// logged to stdout or stderr. `RUST_LOG` overrides the default filter.
pub fn init() -> Result<PathBuf> {
    let dir = dirs::data_local_dir()
        .ok_or_else(|| anyhow!("Could not determine local data directory"))?
        .join("integration-hub");
    fs::create_dir_all(&dir)?;

    let path = dir.join("hub.log");
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .try_init()?;

    Ok(path)
}
