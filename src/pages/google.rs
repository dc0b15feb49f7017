use std::time::Duration;

use anyhow::Result;
use fantoccini::key::Key;
use tracing::debug;

use crate::page::PageDriver;
use crate::types::Locator;

/// Selectors tried in priority order when counting search results.
///
/// Google's result markup drifts; the first selector that yields at least
/// one match wins, and none matching counts as zero. The list is
/// deliberately heuristic, there is no canonical selector to prefer.
const RESULT_SELECTORS: &[&str] = &[
    "#search .g",
    "#search .rc",
    ".g",
    ".rc",
    "[data-sokoban-container] .g",
    ".MjjYud",
];

const PAGE_LOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Settle pause after submitting a search before polling readyState
const SUBMIT_SETTLE: Duration = Duration::from_secs(2);

/// Page object for the Google search page
pub struct GooglePage {
    driver: PageDriver,
    url: String,
}

impl GooglePage {
    fn search_box() -> Locator {
        Locator::name("q")
    }

    fn search_button() -> Locator {
        Locator::name("btnK")
    }

    fn feeling_lucky_button() -> Locator {
        Locator::name("btnI")
    }

    fn first_result() -> Locator {
        Locator::css("#search .g:first-child h3")
    }

    pub fn new(driver: PageDriver) -> Self {
        GooglePage {
            driver,
            url: "https://www.google.com".to_string(),
        }
    }

    /// Page object pointed at an alternate base URL (local fixtures, mirrors)
    pub fn with_url(driver: PageDriver, url: impl Into<String>) -> Self {
        GooglePage {
            driver,
            url: url.into(),
        }
    }

    pub fn driver(&self) -> &PageDriver {
        &self.driver
    }

    /// Release the session; must be called at test end
    pub async fn close(self) -> Result<()> {
        self.driver.close().await
    }

    /// Navigate to the homepage and wait for it to finish loading
    pub async fn navigate_to(&self) -> Result<()> {
        self.driver.reporter().step("Navigate to Google homepage");
        self.driver.goto(&self.url).await?;
        self.driver.wait_for_page_load(PAGE_LOAD_TIMEOUT).await?;
        self.driver.take_screenshot("google_homepage").await?;
        Ok(())
    }

    /// Type a query into the search box
    pub async fn search(&self, query: &str) -> Result<()> {
        self.driver
            .reporter()
            .step(&format!("Search for: {}", query));
        self.driver.send_keys(&Self::search_box(), query).await?;
        self.driver.take_screenshot("search_entered").await?;
        Ok(())
    }

    /// Submit the search by pressing Enter in the search box.
    ///
    /// The keystroke goes through the non-clearing path so the typed
    /// query survives submission.
    pub async fn submit_search(&self) -> Result<()> {
        self.driver.reporter().step("Submit search");
        let enter = String::from(char::from(Key::Enter));
        self.driver.press_keys(&Self::search_box(), &enter).await?;
        tokio::time::sleep(SUBMIT_SETTLE).await;
        self.driver.wait_for_page_load(PAGE_LOAD_TIMEOUT).await?;
        self.driver.take_screenshot("search_results").await?;
        Ok(())
    }

    /// Type a query and submit it.
    ///
    /// Tries the search button first and falls back to keyboard submission
    /// when the button path fails (the button is flaky under autocomplete
    /// overlays). This is the framework's one sanctioned retry.
    pub async fn search_and_submit(&self, query: &str) -> Result<()> {
        self.search(query).await?;
        if let Err(e) = self.click_search_button().await {
            debug!("Search button click failed ({}), submitting via keyboard", e);
            self.submit_search().await?;
        }
        Ok(())
    }

    /// Click the search button and wait for the results page
    pub async fn click_search_button(&self) -> Result<()> {
        self.driver.reporter().step("Click search button");
        self.driver.click(&Self::search_button()).await?;
        tokio::time::sleep(SUBMIT_SETTLE).await;
        self.driver.wait_for_page_load(PAGE_LOAD_TIMEOUT).await?;
        self.driver.take_screenshot("search_results").await?;
        Ok(())
    }

    /// Click the "I'm Feeling Lucky" button
    pub async fn click_feeling_lucky(&self) -> Result<()> {
        self.driver.reporter().step("Click 'I'm Feeling Lucky' button");
        self.driver.click(&Self::feeling_lucky_button()).await?;
        self.driver.wait_for_page_load(PAGE_LOAD_TIMEOUT).await?;
        self.driver.take_screenshot("feeling_lucky_result").await?;
        Ok(())
    }

    /// Number of search results on the page.
    ///
    /// Counts via the first selector in [`RESULT_SELECTORS`] that matches
    /// anything; zero when none do.
    pub async fn search_results_count(&self) -> usize {
        match self.first_matching_result_selector().await {
            Some((_, count)) => count,
            None => 0,
        }
    }

    /// First result selector (in priority order) with at least one match,
    /// together with its match count
    pub async fn first_matching_result_selector(&self) -> Option<(&'static str, usize)> {
        for selector in RESULT_SELECTORS {
            let count = self
                .driver
                .count_elements_now(&Locator::css(*selector))
                .await;
            if count > 0 {
                return Some((selector, count));
            }
        }
        None
    }

    /// Title of the first search result, or `None` when it cannot be read
    pub async fn first_result_title(&self) -> Option<String> {
        self.driver.get_text(&Self::first_result()).await.ok()
    }

    /// Click the first search result
    pub async fn click_first_result(&self) -> Result<()> {
        self.driver.reporter().step("Click first search result");
        self.driver.click(&Self::first_result()).await?;
        self.driver.wait_for_page_load(PAGE_LOAD_TIMEOUT).await?;
        self.driver.take_screenshot("first_result_clicked").await?;
        Ok(())
    }

    /// URL heuristic: are we on a search results page?
    pub async fn is_search_results_page(&self) -> Result<bool> {
        let current_url = self.driver.current_url().await?.to_lowercase();
        Ok(current_url.contains("search") || current_url.contains("q="))
    }

    /// URL heuristic: are we on the homepage?
    pub async fn is_google_homepage(&self) -> Result<bool> {
        let current_url = self.driver.current_url().await?;
        Ok(current_url.contains("google.com") && !current_url.to_lowercase().contains("search"))
    }

    /// Clear the search box with select-all plus delete keystrokes
    pub async fn clear_search_box(&self) -> Result<()> {
        self.driver.reporter().step("Clear search box");
        let select_all = format!("{}a", char::from(Key::Control));
        self.driver
            .press_keys(&Self::search_box(), &select_all)
            .await?;
        let delete = String::from(char::from(Key::Delete));
        self.driver.press_keys(&Self::search_box(), &delete).await?;
        Ok(())
    }

    /// Current value of the search box
    pub async fn search_box_value(&self) -> Result<String> {
        let element = self.driver.find_element(&Self::search_box()).await?;
        Ok(element.prop("value").await?.unwrap_or_default())
    }

    pub async fn page_title(&self) -> Result<String> {
        self.driver.page_title().await
    }
}
