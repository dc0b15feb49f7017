use anyhow::{Context, Result};
use fantoccini::wd::TimeoutConfiguration;
use fantoccini::{Client, ClientBuilder};
use serde_json::json;
use tracing::{debug, info};

use crate::config::Config;
use crate::driver_manager::DriverManager;
use crate::errors::HarnessError;

/// Fixed mobile emulation user agent (iPhone, matching the 375x812 metrics)
const MOBILE_USER_AGENT: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 14_0 like Mac OS X) \
     AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.0 Mobile/15E148 Safari/604.1";

/// Supported browsers
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum BrowserType {
    /// Google Chrome/Chromium
    Chrome,
    /// Mozilla Firefox
    Firefox,
    /// Microsoft Edge
    Edge,
}

impl std::str::FromStr for BrowserType {
    type Err = HarnessError;

    /// Parse browser type from string (case-insensitive)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "chrome" | "chromium" => Ok(BrowserType::Chrome),
            "firefox" => Ok(BrowserType::Firefox),
            "edge" => Ok(BrowserType::Edge),
            _ => Err(HarnessError::UnsupportedBrowser(s.to_string())),
        }
    }
}

impl BrowserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BrowserType::Chrome => "chrome",
            BrowserType::Firefox => "firefox",
            BrowserType::Edge => "edge",
        }
    }

    /// Driver binary name for this browser
    pub fn driver_binary(&self) -> &'static str {
        match self {
            BrowserType::Chrome => "chromedriver",
            BrowserType::Firefox => "geckodriver",
            BrowserType::Edge => "msedgedriver",
        }
    }

    /// Conventional port the driver listens on when started externally
    pub fn standard_port(&self) -> u16 {
        match self {
            BrowserType::Chrome => 9515,
            BrowserType::Firefox => 4444,
            BrowserType::Edge => 9615,
        }
    }

    /// Ports tried in order when starting a driver ourselves
    pub fn preferred_ports(&self) -> &'static [u16] {
        match self {
            BrowserType::Chrome => &[9515, 9516, 9517],
            BrowserType::Firefox => &[4444, 4445, 4446],
            BrowserType::Edge => &[9615, 9616, 9617],
        }
    }
}

/// Factory for configured WebDriver sessions.
///
/// Owns the [`DriverManager`] that provisions local driver processes; the
/// sessions it creates are owned by the caller, who must `close()` them.
pub struct WebDriverFactory {
    config: Config,
    manager: DriverManager,
}

impl WebDriverFactory {
    pub fn new(config: Config) -> Self {
        WebDriverFactory {
            config,
            manager: DriverManager::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn driver_manager(&self) -> &DriverManager {
        &self.manager
    }

    /// Create a configured driver session.
    ///
    /// `browser_override` takes precedence over the configured browser
    /// name. An unsupported name errors before any driver process or
    /// network activity.
    pub async fn create_driver(&self, browser_override: Option<&str>) -> Result<Client> {
        let browser_type = self.resolve_browser(browser_override)?;
        let caps = self.capabilities_for(browser_type);

        let client = self.connect(browser_type, caps).await?;
        self.configure_driver(&client).await?;
        Ok(client)
    }

    /// Create a driver session with caller-supplied capabilities merged in.
    ///
    /// Only Chrome and Firefox accept custom capabilities.
    pub async fn create_driver_with_capabilities(
        &self,
        capabilities: serde_json::Map<String, serde_json::Value>,
    ) -> Result<Client> {
        let browser_type = self.resolve_browser(None)?;

        if !matches!(browser_type, BrowserType::Chrome | BrowserType::Firefox) {
            return Err(HarnessError::UnsupportedBrowser(format!(
                "Custom capabilities not supported for {}",
                browser_type.as_str()
            ))
            .into());
        }

        let mut caps = self.capabilities_for(browser_type);
        for (key, value) in capabilities {
            caps.insert(key, value);
        }

        let client = self.connect(browser_type, caps).await?;
        self.configure_driver(&client).await?;
        Ok(client)
    }

    /// Create a mobile-emulation session. Chrome only.
    ///
    /// Injects fixed device metrics (375x812 @ 3.0) and a mobile user
    /// agent; the emulated viewport replaces the usual window sizing.
    pub async fn create_mobile_driver(&self) -> Result<Client> {
        let browser_type = self.resolve_browser(None)?;

        if browser_type != BrowserType::Chrome {
            return Err(HarnessError::UnsupportedBrowser(
                "Mobile testing is only supported with Chrome".to_string(),
            )
            .into());
        }

        let mut caps = self.capabilities_for(browser_type);
        if let Some(chrome_opts) = caps
            .get_mut("goog:chromeOptions")
            .and_then(|v| v.as_object_mut())
        {
            chrome_opts.insert(
                "mobileEmulation".to_string(),
                json!({
                    "deviceMetrics": {
                        "width": 375,
                        "height": 812,
                        "pixelRatio": 3.0
                    },
                    "userAgent": MOBILE_USER_AGENT
                }),
            );
        }

        self.connect(browser_type, caps).await
    }

    fn resolve_browser(&self, browser_override: Option<&str>) -> Result<BrowserType> {
        let name = browser_override.unwrap_or_else(|| self.config.browser_name());
        Ok(name.parse::<BrowserType>()?)
    }

    /// Capability fragment for the resolved browser type, honoring
    /// headless/window-size config. Edge has no browser-specific options.
    fn capabilities_for(
        &self,
        browser_type: BrowserType,
    ) -> serde_json::Map<String, serde_json::Value> {
        let mut config = self.config.clone();
        config.browser.name = browser_type.as_str().to_string();
        config.browser_options().unwrap_or_default()
    }

    async fn connect(
        &self,
        browser_type: BrowserType,
        caps: serde_json::Map<String, serde_json::Value>,
    ) -> Result<Client> {
        let webdriver_url = self.manager.ensure_driver(browser_type).await?;

        debug!("Connecting to WebDriver at {}", webdriver_url);
        let client = ClientBuilder::rustls()
            .capabilities(caps)
            .connect(&webdriver_url)
            .await
            .with_context(|| format!("Failed to connect to WebDriver at {}", webdriver_url))?;

        info!("Created {} session", browser_type.as_str());
        Ok(client)
    }

    /// Common post-launch configuration: timeouts and window size.
    ///
    /// The configured window size is always applied explicitly; it wins
    /// over any maximized state, so headed sessions end up at the same
    /// dimensions as headless ones.
    async fn configure_driver(&self, client: &Client) -> Result<()> {
        let timeouts = TimeoutConfiguration::new(
            None,
            Some(self.config.browser_page_load_timeout()),
            Some(self.config.browser_implicit_wait()),
        );
        client
            .update_timeouts(timeouts)
            .await
            .context("Failed to apply session timeouts")?;

        let size = self.config.browser_window_size()?;
        client
            .set_window_size(size.width, size.height)
            .await
            .context("Failed to apply window size")?;

        Ok(())
    }
}

#[cfg(test)]
#[path = "factory_test.rs"]
mod factory_test;
