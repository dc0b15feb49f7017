use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::Local;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

/// Current timestamp in the report-path format (second resolution)
pub fn timestamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Date folder name in YYYY-MM-DD format
pub fn date_folder() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// Create a dated report path: `<base>/<YYYY-MM-DD>/<YYYYMMDD_HHMMSS>/`.
///
/// Two runs within the same second collide on the same directory; with
/// second-resolution timestamps and one runner per invocation this is an
/// accepted limitation.
pub fn dated_report_path(base: impl AsRef<Path>) -> Result<PathBuf> {
    let report_path = base.as_ref().join(date_folder()).join(timestamp());
    std::fs::create_dir_all(&report_path)
        .with_context(|| format!("Failed to create report path {}", report_path.display()))?;
    Ok(report_path)
}

/// Metadata stamped onto reports and summaries
#[derive(Debug, Clone, Serialize)]
pub struct RunMetadata {
    pub timestamp: String,
    pub date: String,
    pub datetime: String,
    pub environment: String,
    pub browser: String,
}

impl RunMetadata {
    /// Capture metadata from the clock and the runner-provided environment
    pub fn capture() -> Self {
        RunMetadata {
            timestamp: timestamp(),
            date: date_folder(),
            datetime: Local::now().to_rfc3339(),
            environment: std::env::var("TEST_ENV").unwrap_or_else(|_| "local".to_string()),
            browser: std::env::var("BROWSER").unwrap_or_else(|_| "chrome".to_string()),
        }
    }

    /// Metadata whose date and timestamp match an existing dated report
    /// path, so the summary lines always agree with the directory name
    pub fn for_report_path(
        report_path: &Path,
        environment: impl Into<String>,
        browser: impl Into<String>,
    ) -> Self {
        let timestamp = report_path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        let date = report_path
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();

        RunMetadata {
            timestamp,
            date,
            datetime: Local::now().to_rfc3339(),
            environment: environment.into(),
            browser: browser.into(),
        }
    }
}

/// Test outcome recorded in Allure results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestStatus {
    Passed,
    Failed,
    Broken,
}

impl TestStatus {
    fn as_str(&self) -> &'static str {
        match self {
            TestStatus::Passed => "passed",
            TestStatus::Failed => "failed",
            TestStatus::Broken => "broken",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct AllureAttachment {
    name: String,
    source: String,
    #[serde(rename = "type")]
    mime_type: String,
}

#[derive(Debug, Clone, Serialize)]
struct AllureStep {
    name: String,
    status: String,
    start: i64,
    stop: i64,
}

#[derive(Debug, Serialize)]
struct AllureResult {
    uuid: String,
    #[serde(rename = "historyId")]
    history_id: String,
    name: String,
    #[serde(rename = "fullName")]
    full_name: String,
    status: String,
    stage: String,
    start: i64,
    stop: i64,
    steps: Vec<AllureStep>,
    attachments: Vec<AllureAttachment>,
    labels: Vec<serde_json::Value>,
}

struct ActiveTest {
    name: String,
    start: i64,
    steps: Vec<AllureStep>,
    attachments: Vec<AllureAttachment>,
}

/// Attachment and step sink writing Allure-compatible results into
/// `<report>/allure-results/`.
///
/// Screenshots attached outside any test still land in the results
/// directory as orphan attachments, so failure evidence is never dropped.
pub struct Reporter {
    allure_dir: PathBuf,
    current: Mutex<Option<ActiveTest>>,
}

impl Reporter {
    /// Create a reporter rooted at a report directory
    pub fn new(report_path: impl AsRef<Path>) -> Result<Self> {
        let allure_dir = report_path.as_ref().join("allure-results");
        std::fs::create_dir_all(&allure_dir)
            .with_context(|| format!("Failed to create {}", allure_dir.display()))?;
        Ok(Reporter {
            allure_dir,
            current: Mutex::new(None),
        })
    }

    /// Create a reporter from the runner-provided `REPORT_PATH`, falling
    /// back to a fresh dated path when tests run outside the runner
    pub fn from_env() -> Result<Self> {
        let report_path = match std::env::var("REPORT_PATH") {
            Ok(path) => PathBuf::from(path),
            Err(_) => dated_report_path("reports")?,
        };
        Self::new(report_path)
    }

    pub fn allure_dir(&self) -> &Path {
        &self.allure_dir
    }

    /// Begin recording a test case
    pub fn start_test(&self, name: &str) {
        let mut current = self.current.lock().unwrap();
        *current = Some(ActiveTest {
            name: name.to_string(),
            start: Local::now().timestamp_millis(),
            steps: Vec::new(),
            attachments: Vec::new(),
        });
    }

    /// Record a completed step on the active test
    pub fn step(&self, name: &str) {
        let now = Local::now().timestamp_millis();
        let mut current = self.current.lock().unwrap();
        if let Some(test) = current.as_mut() {
            test.steps.push(AllureStep {
                name: name.to_string(),
                status: "passed".to_string(),
                start: now,
                stop: now,
            });
        }
    }

    /// Write a PNG attachment and record it on the active test (if any)
    pub fn attach_png(&self, name: &str, bytes: &[u8]) -> Result<PathBuf> {
        let source = format!("{}-attachment.png", Uuid::new_v4());
        let path = self.allure_dir.join(&source);
        std::fs::write(&path, bytes)
            .with_context(|| format!("Failed to write attachment {}", path.display()))?;
        debug!("Attached screenshot '{}' as {}", name, source);

        let mut current = self.current.lock().unwrap();
        if let Some(test) = current.as_mut() {
            test.attachments.push(AllureAttachment {
                name: name.to_string(),
                source,
                mime_type: "image/png".to_string(),
            });
        }
        Ok(path)
    }

    /// Write a text attachment and record it on the active test (if any)
    pub fn attach_text(&self, name: &str, text: &str) -> Result<PathBuf> {
        let source = format!("{}-attachment.txt", Uuid::new_v4());
        let path = self.allure_dir.join(&source);
        std::fs::write(&path, text)
            .with_context(|| format!("Failed to write attachment {}", path.display()))?;

        let mut current = self.current.lock().unwrap();
        if let Some(test) = current.as_mut() {
            test.attachments.push(AllureAttachment {
                name: name.to_string(),
                source,
                mime_type: "text/plain".to_string(),
            });
        }
        Ok(path)
    }

    /// Finish the active test and write its `*-result.json`
    pub fn finish_test(&self, status: TestStatus) -> Result<()> {
        let test = {
            let mut current = self.current.lock().unwrap();
            current.take()
        };

        let Some(test) = test else {
            return Ok(());
        };

        let uuid = Uuid::new_v4().to_string();
        let result = AllureResult {
            history_id: Uuid::new_v4().to_string(),
            name: test.name.clone(),
            full_name: test.name,
            status: status.as_str().to_string(),
            stage: "finished".to_string(),
            start: test.start,
            stop: Local::now().timestamp_millis(),
            steps: test.steps,
            attachments: test.attachments,
            labels: vec![serde_json::json!({"name": "framework", "value": "webharness"})],
            uuid: uuid.clone(),
        };

        let path = self.allure_dir.join(format!("{}-result.json", uuid));
        let raw = serde_json::to_string_pretty(&result).context("Failed to serialize result")?;
        std::fs::write(&path, raw)
            .with_context(|| format!("Failed to write result {}", path.display()))?;
        Ok(())
    }
}

/// Write the plain-text run summary into the report directory
pub fn write_summary_file(
    report_path: impl AsRef<Path>,
    metadata: &RunMetadata,
    exit_code: i32,
) -> Result<PathBuf> {
    let summary_path = report_path.as_ref().join("test_summary.txt");
    let status = if exit_code == 0 { "PASSED" } else { "FAILED" };

    let mut summary = String::new();
    summary.push_str("Test Execution Summary\n");
    summary.push_str(&"=".repeat(30));
    summary.push('\n');
    summary.push_str(&format!("Date: {}\n", metadata.date));
    summary.push_str(&format!("Time: {}\n", metadata.timestamp));
    summary.push_str(&format!("Environment: {}\n", metadata.environment));
    summary.push_str(&format!("Browser: {}\n", metadata.browser));
    summary.push_str(&format!("Exit Code: {}\n", exit_code));
    summary.push_str(&format!("Status: {}\n", status));
    summary.push_str(&format!(
        "Report Path: {}\n",
        report_path.as_ref().display()
    ));

    std::fs::write(&summary_path, summary)
        .with_context(|| format!("Failed to write {}", summary_path.display()))?;
    Ok(summary_path)
}

/// Write a self-contained HTML report for the run
pub fn write_html_report(
    report_path: impl AsRef<Path>,
    metadata: &RunMetadata,
    exit_code: i32,
) -> Result<PathBuf> {
    let passed = exit_code == 0;
    let header_color = if passed { "#4CAF50" } else { "#f44336" };
    let status_text = if passed { "RUN PASSED" } else { "RUN FAILED" };

    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Test Run {date} {time}</title>
<style>
body {{ font-family: sans-serif; margin: 0; }}
header {{ background: {color}; color: white; padding: 16px 24px; }}
table {{ border-collapse: collapse; margin: 24px; }}
td, th {{ border: 1px solid #ddd; padding: 8px 16px; text-align: left; }}
</style>
</head>
<body>
<header><h1>{status}</h1></header>
<table>
<tr><th>Date</th><td>{date}</td></tr>
<tr><th>Time</th><td>{time}</td></tr>
<tr><th>Environment</th><td>{environment}</td></tr>
<tr><th>Browser</th><td>{browser}</td></tr>
<tr><th>Exit code</th><td>{exit_code}</td></tr>
<tr><th>Allure results</th><td>allure-results/</td></tr>
</table>
</body>
</html>
"#,
        color = header_color,
        status = status_text,
        date = metadata.date,
        time = metadata.timestamp,
        environment = metadata.environment,
        browser = metadata.browser,
        exit_code = exit_code,
    );

    let html_path = report_path.as_ref().join("report.html");
    std::fs::write(&html_path, html)
        .with_context(|| format!("Failed to write {}", html_path.display()))?;
    Ok(html_path)
}

#[cfg(test)]
#[path = "report_test.rs"]
mod report_test;
