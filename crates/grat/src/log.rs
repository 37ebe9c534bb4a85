//! Logging for grat.
use anyhow::Context;
use std::fs::{self, OpenOptions};
use std::io::{self, LineWriter};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::fmt::time::OffsetTime;

const LOG_FILE: &str = "grat.log";
const MAX_LOG_SIZE: u64 = 100 * 1024;

/// Writes debug logs to `grat.log` under `$XDG_DATA_HOME/grat`, or the
/// platform data dir when the variable is unset.
pub fn setup_logging() -> anyhow::Result<()> {
    let log_path = log_dir()?.join(LOG_FILE);
    rotate(&log_path, MAX_LOG_SIZE)
        .with_context(|| format!("Failed to rotate {}", log_path.display()))?;

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open {}", log_path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter("grat=debug,grat_core=debug,rustyline=info")
        .with_writer(Mutex::new(LineWriter::new(log_file)))
        .with_ansi(false)
        .with_timer(OffsetTime::local_rfc_3339()?)
        .init();
    Ok(())
}

fn log_dir() -> anyhow::Result<PathBuf> {
    let dir = std::env::var_os("XDG_DATA_HOME")
        .map(PathBuf::from)
        .or_else(dirs::data_local_dir)
        .context("No data directory to hold the log")?
        .join("grat");
    fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    Ok(dir)
}

/// Moves `path` over `<path>.old` once it grows past `max_len` bytes.
fn rotate(path: &Path, max_len: u64) -> io::Result<()> {
    match fs::metadata(path) {
        Ok(meta) if meta.len() > max_len => fs::rename(path, path.with_extension("log.old")),
        Ok(_) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    }
}
