use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::report;

/// Run-scoped logging context.
///
/// Installs tracing with console output on stderr plus a timestamped log
/// file under the given directory. Constructed once at run start and passed
/// to collaborators; there is no global mutable logger. A second `init` in
/// the same process keeps the first subscriber.
pub struct RunLogger {
    log_file: PathBuf,
}

impl RunLogger {
    /// Install tracing and open `<log_dir>/test_execution_<timestamp>.log`
    pub fn init(log_dir: impl AsRef<Path>) -> Result<Self> {
        let log_dir = log_dir.as_ref();
        std::fs::create_dir_all(log_dir)
            .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

        let log_file = log_dir.join(format!("test_execution_{}.log", report::timestamp()));
        let file = File::create(&log_file)
            .with_context(|| format!("Failed to create log file {}", log_file.display()))?;

        let _ = tracing_subscriber::registry()
            .with(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| "webharness=debug".into()),
            )
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false),
            )
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false),
            )
            .try_init();

        Ok(RunLogger { log_file })
    }

    /// Path of the log file this run writes to
    pub fn log_file(&self) -> &Path {
        &self.log_file
    }

    pub fn test_start(&self, test_name: &str) {
        info!("Starting test: {}", test_name);
    }

    pub fn test_end(&self, test_name: &str, status: &str) {
        info!("Test {} {}", test_name, status);
    }

    pub fn test_failure(&self, test_name: &str, error_message: &str) {
        error!("Test {} FAILED: {}", test_name, error_message);
    }

    pub fn browser_action(&self, action: &str, details: &str) {
        debug!("Browser action: {} {}", action, details);
    }

    pub fn page_load(&self, url: &str) {
        debug!("Loading page: {}", url);
    }

    pub fn element_action(&self, action: &str, element_info: &str) {
        debug!("Element action: {} on {}", action, element_info);
    }

    pub fn screenshot(&self, screenshot_path: &str) {
        debug!("Screenshot saved: {}", screenshot_path);
    }

    pub fn configuration(&self, config_info: &str) {
        info!("Configuration: {}", config_info);
    }

    pub fn performance(&self, operation: &str, duration: Duration) {
        info!(
            "Performance: {} took {:.2} seconds",
            operation,
            duration.as_secs_f64()
        );
    }
}
