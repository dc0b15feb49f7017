use std::process::{Child, Command, Stdio};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::time::sleep;
use tracing::{debug, info};

use crate::errors::HarnessError;
use crate::factory::BrowserType;

/// Manages local WebDriver processes (chromedriver, geckodriver,
/// msedgedriver): resolves the binary on PATH, reuses an already-running
/// driver, or starts one and waits until it reports ready.
///
/// Every process started here is killed when the manager is dropped; driver
/// sessions created against it must still be closed by their owner.
pub struct DriverManager {
    processes: Mutex<Vec<DriverProcess>>,
}

struct DriverProcess {
    browser_type: BrowserType,
    child: Child,
    port: u16,
    url: String,
}

impl Default for DriverManager {
    fn default() -> Self {
        Self {
            processes: Mutex::new(Vec::new()),
        }
    }
}

impl DriverManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure a WebDriver is running for the browser type and return its URL
    pub async fn ensure_driver(&self, browser_type: BrowserType) -> Result<String> {
        // Reuse a process we already manage if it is still healthy
        let managed_urls: Vec<String> = {
            let processes = self.processes.lock().unwrap();
            processes
                .iter()
                .filter(|p| p.browser_type == browser_type)
                .map(|p| p.url.clone())
                .collect()
        };

        for url in managed_urls {
            if Self::verify_driver_ready(&url).await {
                debug!("Reusing managed WebDriver at {}", url);
                return Ok(url);
            }
        }

        // Check the standard port for an externally started driver
        let standard_url = format!("http://localhost:{}", browser_type.standard_port());
        if Self::is_driver_running(&standard_url).await
            && Self::verify_driver_ready(&standard_url).await
        {
            debug!("Found external WebDriver at {}", standard_url);
            return Ok(standard_url);
        }

        info!(
            "No running {} detected, starting it",
            browser_type.driver_binary()
        );
        self.start_driver(browser_type).await
    }

    async fn start_driver(&self, browser_type: BrowserType) -> Result<String> {
        let binary = browser_type.driver_binary();

        if !Self::binary_available(binary) {
            return Err(HarnessError::WebDriverFailed(format!(
                "{} not found in PATH. Install it or add it to PATH \
                 (see https://www.selenium.dev/documentation/webdriver/getting_started/install_drivers/)",
                binary
            ))
            .into());
        }

        let port = Self::find_free_port(browser_type)?;
        info!("Starting {} on port {}", binary, port);

        let child = Command::new(binary)
            .arg(format!("--port={}", port))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to start {}", binary))?;

        let url = format!("http://localhost:{}", port);

        {
            let mut processes = self.processes.lock().unwrap();
            processes.push(DriverProcess {
                browser_type,
                child,
                port,
                url: url.clone(),
            });
        }

        // Give the driver up to 3 seconds to come up
        let max_attempts = 30;
        for attempt in 1..=max_attempts {
            if Self::is_driver_running(&url).await {
                info!("{} ready on port {}", binary, port);
                return Ok(url);
            }
            if attempt < max_attempts {
                sleep(Duration::from_millis(100)).await;
            }
        }

        self.kill_process_on_port(port);
        Err(HarnessError::WebDriverFailed(format!(
            "{} failed to become ready within timeout",
            binary
        ))
        .into())
    }

    /// Check whether the driver binary can be resolved on PATH
    pub fn binary_available(binary: &str) -> bool {
        #[cfg(unix)]
        {
            Command::new("which")
                .arg(binary)
                .output()
                .map(|output| output.status.success())
                .unwrap_or(false)
        }

        #[cfg(windows)]
        {
            Command::new("where")
                .arg(binary)
                .output()
                .map(|output| output.status.success())
                .unwrap_or(false)
        }
    }

    /// Pick a free port, preferring the browser's conventional ports
    pub fn find_free_port(browser_type: BrowserType) -> Result<u16> {
        for port in browser_type.preferred_ports() {
            if !Self::is_port_in_use(*port) {
                debug!("Using port {} for {:?}", port, browser_type);
                return Ok(*port);
            }
        }

        // Let the OS assign one
        let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        drop(listener);
        Ok(port)
    }

    pub fn is_port_in_use(port: u16) -> bool {
        std::net::TcpListener::bind(("127.0.0.1", port)).is_err()
    }

    /// Check whether something answers on the WebDriver status endpoint
    pub async fn is_driver_running(url: &str) -> bool {
        let status_url = format!("{}/status", url);

        match reqwest::Client::new()
            .get(&status_url)
            .timeout(Duration::from_secs(1))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    /// Check the driver reports ready:true, not merely that the port answers
    async fn verify_driver_ready(url: &str) -> bool {
        let status_url = format!("{}/status", url);

        match reqwest::Client::new()
            .get(&status_url)
            .timeout(Duration::from_secs(1))
            .send()
            .await
        {
            Ok(response) => match response.json::<serde_json::Value>().await {
                Ok(body) => body
                    .get("value")
                    .and_then(|v| v.get("ready"))
                    .and_then(|r| r.as_bool())
                    .unwrap_or(false),
                Err(_) => false,
            },
            Err(_) => false,
        }
    }

    fn kill_process_on_port(&self, port: u16) {
        let mut processes = self.processes.lock().unwrap();
        if let Some(index) = processes.iter().position(|p| p.port == port) {
            let mut process = processes.remove(index);
            let _ = process.child.kill();
        }
    }

    /// Kill managed driver processes for one browser type
    pub fn kill_driver(&self, browser_type: BrowserType) {
        let mut processes = self.processes.lock().unwrap();
        processes.retain_mut(|p| {
            if p.browser_type == browser_type {
                debug!("Killing {} on port {}", browser_type.driver_binary(), p.port);
                let _ = p.child.kill();
                false
            } else {
                true
            }
        });
    }

    /// Stop every managed driver process
    pub fn stop_all(&self) {
        let mut processes = self.processes.lock().unwrap();
        for process in processes.iter_mut() {
            debug!("Stopping WebDriver on port {}", process.port);
            let _ = process.child.kill();
        }
        processes.clear();
    }
}

impl Drop for DriverManager {
    fn drop(&mut self) {
        self.stop_all();
    }
}

#[cfg(test)]
#[path = "driver_manager_test.rs"]
mod driver_manager_test;
