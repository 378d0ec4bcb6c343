//! Tracing subscriber setup.

use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Log to `log_file_path`, filtered by `RUST_LOG` (default `info`).
///
/// Falls back to stderr when the file cannot be created.
pub fn init_global(log_file_path: &Path) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let log_file = log_file_path
        .parent()
        .map_or(Ok(()), fs::create_dir_all)
        .and_then(|_| File::create(log_file_path));

    match log_file {
        Ok(file) => {
            let fmt_layer = fmt::layer().with_ansi(false).with_writer(Arc::new(file));
            let _ = tracing_subscriber::registry().with(fmt_layer).with(env_filter).try_init();
        }
        Err(e) => {
            let _ = tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr))
                .with(env_filter)
                .try_init();
            tracing::warn!("Could not create log file {:?}, logging to stderr: {}", log_file_path, e);
        }
    }
}
