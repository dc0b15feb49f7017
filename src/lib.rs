//! # webharness
//!
//! Browser UI test automation framework: WebDriver lifecycle management,
//! page objects over a resilient interaction layer, and dated HTML/Allure
//! test reports.
//!
//! The moving parts, leaves first:
//!
//! - [`config::Config`] — JSON configuration with built-in defaults and
//!   browser-specific launch options
//! - [`testdata::TestDataManager`] — JSON-backed test fixtures with typed
//!   lookups and atomic persistence
//! - [`factory::WebDriverFactory`] — provisions driver binaries and
//!   constructs configured WebDriver sessions
//! - [`page::PageDriver`] — explicit-wait element lookup and interaction
//!   with screenshot-on-failure
//! - [`pages::GooglePage`] — example page object composed over `PageDriver`
//! - [`report`] — dated report directories, Allure results, run summaries
//! - [`logger::RunLogger`] — run-scoped console + file logging
//!
//! The `webharness` binary is the runner: it creates a dated report
//! directory, spawns the test process with `TEST_ENV`/`BROWSER`/
//! `REPORT_PATH` set, and writes the run summary.
//!
//! ## Library usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use webharness::{Config, GooglePage, PageDriver, Reporter, WebDriverFactory};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::load("local")?;
//! let factory = WebDriverFactory::new(config.clone());
//! let client = factory.create_driver(None).await?;
//!
//! let reporter = Arc::new(Reporter::from_env()?);
//! let driver = PageDriver::new(client, reporter, config.explicit_wait());
//! let page = GooglePage::new(driver);
//!
//! page.navigate_to().await?;
//! page.search_and_submit("rust webdriver").await?;
//! assert!(page.is_search_results_page().await?);
//! page.close().await?;
//! # Ok(())
//! # }
//! ```

/// Framework configuration and browser launch options
pub mod config;

/// Local WebDriver process management
pub mod driver_manager;

/// Error taxonomy with runner exit codes
pub mod errors;

/// WebDriver session factory
pub mod factory;

/// Run-scoped logging context
pub mod logger;

/// Explicit-wait page interaction layer
pub mod page;

/// Page objects
pub mod pages;

/// Dated report paths, Allure results, and run summaries
pub mod report;

/// JSON-backed test data
pub mod testdata;

/// Locators, probes, and shared value types
pub mod types;

pub use config::Config;
pub use driver_manager::DriverManager;
pub use errors::HarnessError;
pub use factory::{BrowserType, WebDriverFactory};
pub use logger::RunLogger;
pub use page::PageDriver;
pub use pages::GooglePage;
pub use report::{Reporter, RunMetadata, TestStatus};
pub use testdata::TestDataManager;
pub use types::{Locator, Probe, Strategy, WindowSize};
