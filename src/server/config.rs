//! Web service configuration

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::split::DEFAULT_PAGES_PER_SECTION;

const MEGABYTE: usize = 1024 * 1024;

/// Default upload limit (50 MB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * MEGABYTE;

/// Megabytes to bytes; `None` on overflow
pub fn megabytes(mb: usize) -> Option<usize> {
    mb.checked_mul(MEGABYTE)
}

/// Hours to a duration; `None` on overflow
pub fn hours(hours: u64) -> Option<Duration> {
    hours.checked_mul(60 * 60).map(Duration::from_secs)
}

/// Minutes to a duration; `None` on overflow
pub fn minutes(minutes: u64) -> Option<Duration> {
    minutes.checked_mul(60).map(Duration::from_secs)
}

/// Settings for the upload/download service
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    /// Raw uploads, stored as `{task_id}_{name}`
    pub upload_dir: PathBuf,
    /// Split results, one directory per task
    pub output_dir: PathBuf,
    pub max_upload_bytes: usize,
    /// Uploads and outputs older than this are deleted by the sweeper
    pub retention: Duration,
    pub cleanup_interval: Duration,
    /// Run the background sweeper
    pub cleanup: bool,
    pub pages_per_section: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 5000)),
            upload_dir: PathBuf::from("uploads"),
            output_dir: PathBuf::from("outputs"),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            retention: Duration::from_secs(2 * 60 * 60),
            cleanup_interval: Duration::from_secs(60 * 60),
            cleanup: true,
            pages_per_section: DEFAULT_PAGES_PER_SECTION,
        }
    }
}

impl ServerConfig {
    /// Layout for serverless hosts: scratch space under /tmp, no sweeper
    pub fn serverless() -> Self {
        Self {
            upload_dir: PathBuf::from("/tmp/uploads"),
            output_dir: PathBuf::from("/tmp/outputs"),
            cleanup: false,
            ..Self::default()
        }
    }

    /// Upload limit in megabytes, rounded up, for error messages
    pub fn max_upload_mb(&self) -> usize {
        self.max_upload_bytes.div_ceil(MEGABYTE)
    }

    /// Create the upload and output directories
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.upload_dir)?;
        std::fs::create_dir_all(&self.output_dir)
    }
}
