use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::types::WindowSize;

/// Browser section of the config file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserSection {
    pub name: String,
    pub headless: bool,
    pub implicit_wait: u64,
    pub page_load_timeout: u64,
    pub window_size: String,
}

/// Urls section of the config file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlsSection {
    pub base_url: String,
    pub test_url: String,
}

/// Timeouts section of the config file (seconds)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutsSection {
    pub implicit_wait: u64,
    pub explicit_wait: u64,
    pub page_load: u64,
}

/// Screenshots section of the config file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenshotsSection {
    pub on_failure: bool,
    pub on_success: bool,
    pub screenshot_dir: String,
}

/// Report format toggles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportsSection {
    pub html: bool,
    pub allure: bool,
    pub json: bool,
    pub xml: bool,
}

/// Worker count for parallel runs: a fixed number or "auto"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Workers {
    Count(u32),
    Named(String),
}

/// Parallel execution section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParallelSection {
    pub enabled: bool,
    pub workers: Workers,
}

/// Framework configuration, loaded once per instance and immutable after.
///
/// Deserialization is strict: a config file missing any required key fails
/// at load time rather than defaulting silently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub browser: BrowserSection,
    pub urls: UrlsSection,
    pub timeouts: TimeoutsSection,
    pub screenshots: ScreenshotsSection,
    pub reports: ReportsSection,
    pub parallel: ParallelSection,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            browser: BrowserSection {
                name: "chrome".to_string(),
                headless: false,
                implicit_wait: 10,
                page_load_timeout: 30,
                window_size: "1920,1080".to_string(),
            },
            urls: UrlsSection {
                base_url: "https://www.google.com".to_string(),
                test_url: "https://www.google.com".to_string(),
            },
            timeouts: TimeoutsSection {
                implicit_wait: 10,
                explicit_wait: 10,
                page_load: 30,
            },
            screenshots: ScreenshotsSection {
                on_failure: true,
                on_success: false,
                screenshot_dir: "screenshots".to_string(),
            },
            reports: ReportsSection {
                html: true,
                allure: true,
                json: false,
                xml: false,
            },
            parallel: ParallelSection {
                enabled: false,
                workers: Workers::Named("auto".to_string()),
            },
        }
    }
}

impl Config {
    /// Load configuration for the named environment.
    ///
    /// Reads `config/config_<environment>.json`; when no file exists the
    /// built-in defaults are used. A present but malformed file is an error.
    pub fn load(environment: &str) -> Result<Self> {
        Self::load_from(Self::config_path(environment))
    }

    /// Load configuration from an explicit path, defaulting when absent
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("Malformed config file {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    fn config_path(environment: &str) -> PathBuf {
        PathBuf::from("config").join(format!("config_{}.json", environment))
    }

    pub fn browser_name(&self) -> &str {
        &self.browser.name
    }

    pub fn browser_headless(&self) -> bool {
        self.browser.headless
    }

    pub fn browser_implicit_wait(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.browser.implicit_wait)
    }

    pub fn browser_page_load_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.browser.page_load_timeout)
    }

    pub fn browser_window_size(&self) -> Result<WindowSize> {
        WindowSize::parse(&self.browser.window_size)
    }

    pub fn base_url(&self) -> &str {
        &self.urls.base_url
    }

    pub fn test_url(&self) -> &str {
        &self.urls.test_url
    }

    pub fn implicit_wait(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeouts.implicit_wait)
    }

    pub fn explicit_wait(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeouts.explicit_wait)
    }

    pub fn page_load_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeouts.page_load)
    }

    pub fn screenshot_on_failure(&self) -> bool {
        self.screenshots.on_failure
    }

    pub fn screenshot_on_success(&self) -> bool {
        self.screenshots.on_success
    }

    pub fn screenshot_dir(&self) -> &str {
        &self.screenshots.screenshot_dir
    }

    pub fn html_reports_enabled(&self) -> bool {
        self.reports.html
    }

    pub fn allure_reports_enabled(&self) -> bool {
        self.reports.allure
    }

    pub fn parallel_enabled(&self) -> bool {
        self.parallel.enabled
    }

    pub fn parallel_workers(&self) -> &Workers {
        &self.parallel.workers
    }

    /// Build the browser-specific capability fragment for the configured
    /// browser name (case-insensitive).
    ///
    /// Chrome gets the hardened argument set plus headless mode and window
    /// size from config; Firefox gets headless mode only. Any other name
    /// returns `None` — unsupported, the caller must decide what to do.
    pub fn browser_options(&self) -> Option<serde_json::Map<String, serde_json::Value>> {
        let mut caps = serde_json::Map::new();

        match self.browser.name.to_lowercase().as_str() {
            "chrome" => {
                let mut args = Vec::new();
                if self.browser.headless {
                    args.push("--headless".to_string());
                }
                args.push(format!("--window-size={}", self.browser.window_size));
                args.push("--no-sandbox".to_string());
                args.push("--disable-dev-shm-usage".to_string());
                args.push("--disable-gpu".to_string());
                args.push("--disable-extensions".to_string());

                caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
                Some(caps)
            }
            "firefox" => {
                let mut args = Vec::new();
                if self.browser.headless {
                    args.push("--headless".to_string());
                }

                caps.insert("moz:firefoxOptions".to_string(), json!({ "args": args }));
                Some(caps)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
