use anyhow::Result;
use serde::{Deserialize, Serialize};

/// How to find a page element
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// CSS selector
    Css,
    /// Element id attribute
    Id,
    /// Element name attribute
    Name,
    /// XPath expression
    XPath,
}

/// A (strategy, value) pair identifying how to find a page element.
///
/// Locators are transient: they are resolved per call and never cached.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Locator {
    pub strategy: Strategy,
    pub value: String,
}

impl Locator {
    pub fn css(value: impl Into<String>) -> Self {
        Locator {
            strategy: Strategy::Css,
            value: value.into(),
        }
    }

    pub fn id(value: impl Into<String>) -> Self {
        Locator {
            strategy: Strategy::Id,
            value: value.into(),
        }
    }

    pub fn name(value: impl Into<String>) -> Self {
        Locator {
            strategy: Strategy::Name,
            value: value.into(),
        }
    }

    pub fn xpath(value: impl Into<String>) -> Self {
        Locator {
            strategy: Strategy::XPath,
            value: value.into(),
        }
    }

    /// The wire-level query string. Name locators lower to an attribute
    /// selector because fantoccini exposes no name strategy.
    pub(crate) fn query(&self) -> String {
        match self.strategy {
            Strategy::Name => format!(r#"[name="{}"]"#, self.value),
            _ => self.value.clone(),
        }
    }

    /// Short label used when naming screenshot attachments
    pub fn label(&self) -> &str {
        &self.value
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let strategy = match self.strategy {
            Strategy::Css => "css",
            Strategy::Id => "id",
            Strategy::Name => "name",
            Strategy::XPath => "xpath",
        };
        write!(f, "{}={}", strategy, self.value)
    }
}

/// Result of a non-throwing presence/visibility probe.
///
/// Callers get an explicit signal instead of a swallowed timeout, so
/// "timed out waiting" cannot be mistaken for "definitely absent".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Probe {
    /// The condition held within the timeout
    Found,
    /// The timeout elapsed without the condition holding
    TimedOut,
}

impl Probe {
    pub fn is_found(&self) -> bool {
        matches!(self, Probe::Found)
    }
}

/// Browser window dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSize {
    /// Window width in pixels
    pub width: u32,
    /// Window height in pixels
    pub height: u32,
}

impl WindowSize {
    /// Parse window size from "WIDTH,HEIGHT" format (e.g., "1920,1080")
    pub fn parse(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(',').collect();
        if parts.len() != 2 {
            anyhow::bail!("Invalid window size format. Use WIDTH,HEIGHT (e.g., 1920,1080)");
        }

        let width = parts[0]
            .trim()
            .parse::<u32>()
            .map_err(|_| anyhow::anyhow!("Invalid width in window size"))?;
        let height = parts[1]
            .trim()
            .parse::<u32>()
            .map_err(|_| anyhow::anyhow!("Invalid height in window size"))?;

        Ok(WindowSize { width, height })
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
