use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use fantoccini::elements::Element;
use fantoccini::Client;
use tracing::{debug, warn};

use crate::errors::HarnessError;
use crate::report::Reporter;
use crate::types::{Locator, Probe, Strategy};

/// Interval between condition checks in explicit waits
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Settle pause after scrolling; scroll completion is not observable
/// through WebDriver, so a fixed delay stands in for it
const SCROLL_SETTLE: Duration = Duration::from_millis(500);

/// Resilient page-interaction layer over a WebDriver session.
///
/// Every lookup polls the page up to a timeout, and failures attach a
/// full-page screenshot to the report before propagating. Page objects
/// hold a `PageDriver` by composition and add locators plus domain
/// methods on top.
///
/// Calls are stateless relative to each other; the only shared state is
/// the underlying session, which the owner must `close()` at test end.
pub struct PageDriver {
    client: Client,
    reporter: Arc<Reporter>,
    timeout: Duration,
}

impl PageDriver {
    /// Wrap a driver session with a default explicit-wait timeout
    pub fn new(client: Client, reporter: Arc<Reporter>, timeout: Duration) -> Self {
        PageDriver {
            client,
            reporter,
            timeout,
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn reporter(&self) -> &Arc<Reporter> {
        &self.reporter
    }

    pub fn default_timeout(&self) -> Duration {
        self.timeout
    }

    /// Navigate the session to a URL
    pub async fn goto(&self, url: &str) -> Result<()> {
        debug!("Navigating to {}", url);
        self.client
            .goto(url)
            .await
            .with_context(|| format!("Failed to navigate to {}", url))?;
        Ok(())
    }

    /// Find an element, polling until present or the default timeout.
    ///
    /// On timeout a screenshot is attached under `element_not_found_<value>`
    /// before the error propagates.
    pub async fn find_element(&self, locator: &Locator) -> Result<Element> {
        self.find_element_within(locator, self.timeout).await
    }

    /// Find an element with an explicit timeout
    pub async fn find_element_within(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<Element> {
        let query = locator.query();
        let deadline = Instant::now() + timeout;

        loop {
            match self.client.find(wire_locator(locator.strategy, &query)).await {
                Ok(element) => return Ok(element),
                Err(_) if Instant::now() < deadline => {
                    tokio::time::sleep(POLL_INTERVAL).await;
                }
                Err(_) => {
                    self.attach_failure_screenshot(&format!(
                        "element_not_found_{}",
                        locator.label()
                    ))
                    .await;
                    return Err(HarnessError::ElementTimeout(locator.to_string()).into());
                }
            }
        }
    }

    /// Find all matching elements, polling until at least one is present
    pub async fn find_elements(&self, locator: &Locator) -> Result<Vec<Element>> {
        self.find_elements_within(locator, self.timeout).await
    }

    /// Find all matching elements with an explicit timeout
    pub async fn find_elements_within(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<Vec<Element>> {
        let query = locator.query();
        let deadline = Instant::now() + timeout;

        loop {
            match self
                .client
                .find_all(wire_locator(locator.strategy, &query))
                .await
            {
                Ok(elements) if !elements.is_empty() => return Ok(elements),
                _ if Instant::now() < deadline => {
                    tokio::time::sleep(POLL_INTERVAL).await;
                }
                _ => {
                    self.attach_failure_screenshot(&format!(
                        "elements_not_found_{}",
                        locator.label()
                    ))
                    .await;
                    return Err(HarnessError::ElementTimeout(locator.to_string()).into());
                }
            }
        }
    }

    /// Resolve an element and click it.
    ///
    /// Absence screenshots under `element_not_found_…`; a click that fails
    /// on a resolved element screenshots under `click_failed_…` so the two
    /// failure modes stay distinguishable in the report.
    pub async fn click(&self, locator: &Locator) -> Result<()> {
        let element = self.find_element(locator).await?;
        debug!("Clicking {}", locator);

        if let Err(e) = element.click().await {
            self.attach_failure_screenshot(&format!("click_failed_{}", locator.label()))
                .await;
            return Err(HarnessError::InteractionFailed {
                action: "click".to_string(),
                locator: locator.to_string(),
                source: e.into(),
            }
            .into());
        }
        Ok(())
    }

    /// Resolve an element, clear it, and type into it
    pub async fn send_keys(&self, locator: &Locator, text: &str) -> Result<()> {
        let element = self.find_element(locator).await?;
        debug!("Typing into {}", locator);

        let outcome = async {
            element.clear().await?;
            element.send_keys(text).await?;
            Ok::<(), fantoccini::error::CmdError>(())
        }
        .await;

        if let Err(e) = outcome {
            self.attach_failure_screenshot(&format!("send_keys_failed_{}", locator.label()))
                .await;
            return Err(HarnessError::InteractionFailed {
                action: "send_keys".to_string(),
                locator: locator.to_string(),
                source: e.into(),
            }
            .into());
        }
        Ok(())
    }

    /// Resolve an element and type into it without clearing it first.
    ///
    /// For key chords and submission keys that must not disturb the
    /// element's current value; [`send_keys`](Self::send_keys) clears.
    pub async fn press_keys(&self, locator: &Locator, text: &str) -> Result<()> {
        let element = self.find_element(locator).await?;
        debug!("Pressing keys on {}", locator);

        if let Err(e) = element.send_keys(text).await {
            self.attach_failure_screenshot(&format!("key_press_failed_{}", locator.label()))
                .await;
            return Err(HarnessError::InteractionFailed {
                action: "press_keys".to_string(),
                locator: locator.to_string(),
                source: e.into(),
            }
            .into());
        }
        Ok(())
    }

    /// Resolve an element and return its visible text
    pub async fn get_text(&self, locator: &Locator) -> Result<String> {
        let element = self.find_element(locator).await?;
        Ok(element.text().await?)
    }

    /// Probe for element presence without screenshots or errors
    pub async fn check_element_present(&self, locator: &Locator) -> Probe {
        self.check_element_present_within(locator, self.timeout).await
    }

    /// Presence probe with an explicit timeout
    pub async fn check_element_present_within(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> Probe {
        let query = locator.query();
        let deadline = Instant::now() + timeout;

        loop {
            if self
                .client
                .find(wire_locator(locator.strategy, &query))
                .await
                .is_ok()
            {
                return Probe::Found;
            }
            if Instant::now() >= deadline {
                return Probe::TimedOut;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Probe for element visibility without screenshots or errors
    pub async fn check_element_visible(&self, locator: &Locator) -> Probe {
        let query = locator.query();
        let deadline = Instant::now() + self.timeout;

        loop {
            if let Ok(element) = self.client.find(wire_locator(locator.strategy, &query)).await
            {
                if element.is_displayed().await.unwrap_or(false) {
                    return Probe::Found;
                }
            }
            if Instant::now() >= deadline {
                return Probe::TimedOut;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Count currently matching elements without waiting or erroring.
    ///
    /// Used by selector-fallback loops that must distinguish "no match for
    /// this selector, try the next" from a hard failure.
    pub async fn count_elements_now(&self, locator: &Locator) -> usize {
        let query = locator.query();
        self.client
            .find_all(wire_locator(locator.strategy, &query))
            .await
            .map(|elements| elements.len())
            .unwrap_or(0)
    }

    /// Boolean convenience over [`check_element_present`](Self::check_element_present)
    pub async fn is_element_present(&self, locator: &Locator) -> bool {
        self.check_element_present(locator).await.is_found()
    }

    /// Boolean convenience over [`check_element_visible`](Self::check_element_visible)
    pub async fn is_element_visible(&self, locator: &Locator) -> bool {
        self.check_element_visible(locator).await.is_found()
    }

    /// Wait for `document.readyState === "complete"`, screenshotting and
    /// erroring on timeout
    pub async fn wait_for_page_load(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;

        loop {
            match self
                .client
                .execute("return document.readyState === 'complete';", vec![])
                .await
            {
                Ok(value) if value.as_bool().unwrap_or(false) => return Ok(()),
                _ if Instant::now() < deadline => {
                    tokio::time::sleep(POLL_INTERVAL).await;
                }
                _ => {
                    self.attach_failure_screenshot("page_load_timeout").await;
                    return Err(HarnessError::PageLoadTimeout(timeout).into());
                }
            }
        }
    }

    /// Capture a full-page screenshot and attach it under the given name,
    /// independent of pass/fail state
    pub async fn take_screenshot(&self, name: &str) -> Result<()> {
        let png = self
            .client
            .screenshot()
            .await
            .context("Failed to capture screenshot")?;
        self.reporter.attach_png(name, &png)?;
        Ok(())
    }

    /// Scroll an element into view, then pause briefly for layout to settle.
    ///
    /// Scrolling an element already in view is a no-op and never errors.
    pub async fn scroll_to_element(&self, locator: &Locator) -> Result<()> {
        let element = self.find_element(locator).await?;
        self.client
            .execute(
                "arguments[0].scrollIntoView(true);",
                vec![serde_json::to_value(&element)?],
            )
            .await
            .context("Failed to scroll element into view")?;
        tokio::time::sleep(SCROLL_SETTLE).await;
        Ok(())
    }

    /// Current URL of the session
    pub async fn current_url(&self) -> Result<String> {
        Ok(self.client.current_url().await?.to_string())
    }

    /// Title of the current page
    pub async fn page_title(&self) -> Result<String> {
        let value = self
            .client
            .execute("return document.title;", vec![])
            .await
            .context("Failed to read page title")?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    /// Close the underlying session
    pub async fn close(self) -> Result<()> {
        self.client.close().await?;
        Ok(())
    }

    /// Best-effort failure screenshot; never masks the original error
    async fn attach_failure_screenshot(&self, name: &str) {
        match self.client.screenshot().await {
            Ok(png) => {
                if let Err(e) = self.reporter.attach_png(name, &png) {
                    warn!("Could not attach failure screenshot '{}': {}", name, e);
                }
            }
            Err(e) => warn!("Could not capture failure screenshot '{}': {}", name, e),
        }
    }
}

fn wire_locator(strategy: Strategy, query: &str) -> fantoccini::Locator<'_> {
    match strategy {
        Strategy::Css | Strategy::Name => fantoccini::Locator::Css(query),
        Strategy::Id => fantoccini::Locator::Id(query),
        Strategy::XPath => fantoccini::Locator::XPath(query),
    }
}
