//! Periodic removal of expired uploads and outputs

use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::{error, info};

use super::config::ServerConfig;

/// What a sweep removed
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepStats {
    pub uploads: usize,
    pub outputs: usize,
}

/// Creation time where the platform records it, modification time otherwise
fn entry_time(path: &Path) -> Option<DateTime<Utc>> {
    let metadata = std::fs::metadata(path).ok()?;
    let time: SystemTime = metadata.created().or_else(|_| metadata.modified()).ok()?;
    Some(DateTime::<Utc>::from(time))
}

/// Remove upload files and output directories older than the retention period
///
/// Failures are logged per entry and never stop the sweep.
pub fn sweep(config: &ServerConfig, now: DateTime<Utc>) -> SweepStats {
    let retention = chrono::Duration::from_std(config.retention).unwrap_or(chrono::Duration::MAX);
    let cutoff = now.checked_sub_signed(retention).unwrap_or(DateTime::<Utc>::MIN_UTC);

    let mut stats = SweepStats::default();

    for path in expired_entries(&config.upload_dir, cutoff) {
        if !path.is_file() {
            continue;
        }
        match std::fs::remove_file(&path) {
            Ok(()) => {
                info!(file = %path.display(), "removed expired upload");
                stats.uploads += 1;
            }
            Err(e) => error!(file = %path.display(), error = %e, "failed to remove upload"),
        }
    }

    for path in expired_entries(&config.output_dir, cutoff) {
        if !path.is_dir() {
            continue;
        }
        match std::fs::remove_dir_all(&path) {
            Ok(()) => {
                info!(dir = %path.display(), "removed expired output directory");
                stats.outputs += 1;
            }
            Err(e) => error!(dir = %path.display(), error = %e, "failed to remove output directory"),
        }
    }

    stats
}

fn expired_entries(dir: &Path, cutoff: DateTime<Utc>) -> Vec<std::path::PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            error!(dir = %dir.display(), error = %e, "cannot scan directory for cleanup");
            return Vec::new();
        }
    };

    entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| entry_time(path).is_some_and(|t| t < cutoff))
        .collect()
}

/// Run [`sweep`] every `cleanup_interval` on a background task
pub fn spawn_cleanup(config: ServerConfig) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(config.cleanup_interval);
        loop {
            interval.tick().await;
            let sweep_config = config.clone();
            match tokio::task::spawn_blocking(move || sweep(&sweep_config, Utc::now())).await {
                Ok(stats) => info!(uploads = stats.uploads, outputs = stats.outputs, "cleanup sweep finished"),
                Err(e) => error!(error = %e, "cleanup sweep panicked"),
            }
        }
    })
}
