use thiserror::Error;

/// Framework error taxonomy with process exit codes.
///
/// Configuration and data errors are fatal at load time; interaction
/// errors carry the locator that failed so screenshot attachments and
/// report entries can name it.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Element not found within the wait timeout (exit code 2)
    #[error("Timed out waiting for element: {0}")]
    ElementTimeout(String),
    /// Interaction on a resolved element failed (exit code 3)
    #[error("Interaction '{action}' failed on {locator}: {source}")]
    InteractionFailed {
        action: String,
        locator: String,
        #[source]
        source: anyhow::Error,
    },
    /// WebDriver provisioning or connection failed (exit code 4)
    #[error("WebDriver failed: {0}")]
    WebDriverFailed(String),
    /// Unsupported browser name or browser/feature combination (exit code 4)
    #[error("Unsupported browser: {0}")]
    UnsupportedBrowser(String),
    /// Page did not finish loading within the timeout (exit code 5)
    #[error("Page load timed out after {0:?}")]
    PageLoadTimeout(std::time::Duration),
    /// Generic error (exit code 1)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl HarnessError {
    /// Exit code reported by the runner for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            HarnessError::ElementTimeout(_) => 2,
            HarnessError::InteractionFailed { .. } => 3,
            HarnessError::WebDriverFailed(_) | HarnessError::UnsupportedBrowser(_) => 4,
            HarnessError::PageLoadTimeout(_) => 5,
            HarnessError::Other(_) => 1,
        }
    }
}

#[cfg(test)]
#[path = "errors_test.rs"]
mod errors_test;
