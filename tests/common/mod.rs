// Common test utilities and fixtures

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use webharness::{Config, DriverManager, GooglePage, PageDriver, Reporter, WebDriverFactory};

/// Mock HTML pages for testing against a local browser
pub mod fixtures {
    /// Search form that mimics the Google homepage. Submitting reloads the
    /// same file URL with a `?q=` query string, which is enough for the
    /// results-page URL heuristics. An empty query cancels the submit so
    /// the page behaves like the real homepage does.
    pub const SEARCH_HOME: &str = r#"
    <!DOCTYPE html>
    <html>
    <head><title>Google</title></head>
    <body>
        <form method="get" action="" onsubmit="return this.q.value.length > 0;">
            <input type="text" name="q">
            <input type="submit" name="btnK" value="Google Search">
            <input type="submit" name="btnI" value="I'm Feeling Lucky">
        </form>
    </body>
    </html>
    "#;

    /// Results page carrying three results under the primary `#search .g`
    /// selector, for exercising the selector-fallback counting
    pub const SEARCH_RESULTS: &str = r#"
    <!DOCTYPE html>
    <html>
    <head><title>test query - Google Search</title></head>
    <body>
        <input type="text" name="q" value="test query">
        <div id="search">
            <div class="g"><h3>First Result</h3></div>
            <div class="g"><h3>Second Result</h3></div>
            <div class="g"><h3>Third Result</h3></div>
        </div>
    </body>
    </html>
    "#;
}

/// Helper to create a test HTML file, returning its path
pub fn create_test_html(content: &str) -> PathBuf {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let file_path = temp_dir.path().join("test.html");
    std::fs::write(&file_path, content).expect("Failed to write test HTML");

    // Leak the temp_dir to keep it alive for the test
    std::mem::forget(temp_dir);
    file_path
}

/// Keeps the factory (and its managed driver processes) plus the report
/// directory alive for the duration of a test
pub struct Session {
    pub reporter: Arc<Reporter>,
    _factory: WebDriverFactory,
    _report_dir: TempDir,
}

impl Session {
    pub fn allure_dir(&self) -> &std::path::Path {
        self.reporter.allure_dir()
    }
}

/// Launch a headless Chrome session pointed at a local HTML fixture.
///
/// Returns `None` when chromedriver is not on PATH or the session cannot
/// be established, so tests degrade to skips on machines without a
/// browser.
pub async fn launch_page(html: &str) -> Option<(Session, GooglePage)> {
    if !DriverManager::binary_available("chromedriver") {
        eprintln!("Skipping browser test: chromedriver not found on PATH");
        return None;
    }

    let mut config = Config::default();
    config.browser.headless = true;

    let report_dir = TempDir::new().expect("Failed to create report dir");
    let reporter =
        Arc::new(Reporter::new(report_dir.path()).expect("Failed to create reporter"));

    let factory = WebDriverFactory::new(config.clone());
    let client = match factory.create_driver(None).await {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Skipping browser test: could not start session: {}", e);
            return None;
        }
    };

    let driver = PageDriver::new(client, reporter.clone(), config.explicit_wait());
    let fixture = create_test_html(html);
    let url = format!("file://{}", fixture.display());
    let page = GooglePage::with_url(driver, url);

    let session = Session {
        reporter,
        _factory: factory,
        _report_dir: report_dir,
    };
    Some((session, page))
}

/// Short timeout for negative lookups so failing probes stay fast
pub fn short_timeout() -> Duration {
    Duration::from_secs(1)
}
