use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rand::seq::SliceRandom;
use serde_json::Value;
use tracing::warn;

/// One row of data for a parametrized search test
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCase {
    pub query: String,
    pub expected: String,
}

/// File-backed test data: search queries, URLs, expected results, users,
/// browser configs, timeouts, test categories.
///
/// A missing file is fatal at load time; a missing key inside the file
/// degrades to an empty default. This asymmetry is deliberate: the data
/// file is part of the suite, individual keys are optional.
///
/// Mutations persist the whole mapping with a write-temp-then-rename, so a
/// crash mid-write cannot leave a truncated file behind. Single writer at a
/// time is still assumed; concurrent writers race on last-rename-wins.
#[derive(Debug)]
pub struct TestDataManager {
    data_file: PathBuf,
    data: serde_json::Map<String, Value>,
}

impl TestDataManager {
    /// Load test data from a JSON file. Errors if the file does not exist.
    pub fn load(data_file: impl AsRef<Path>) -> Result<Self> {
        let data_file = data_file.as_ref().to_path_buf();
        if !data_file.exists() {
            anyhow::bail!("Test data file not found: {}", data_file.display());
        }

        let raw = std::fs::read_to_string(&data_file)
            .with_context(|| format!("Failed to read test data file {}", data_file.display()))?;
        let data: serde_json::Map<String, Value> = serde_json::from_str(&raw)
            .with_context(|| format!("Malformed test data file {}", data_file.display()))?;

        Ok(TestDataManager { data_file, data })
    }

    /// Search queries for a category, empty when the category is absent
    pub fn search_queries(&self, category: &str) -> Vec<String> {
        self.string_list(&["search_queries", category])
    }

    /// All search queries across every category
    pub fn all_search_queries(&self) -> Vec<String> {
        let mut all = Vec::new();
        if let Some(Value::Object(categories)) = self.data.get("search_queries") {
            for category in categories.values() {
                if let Value::Array(items) = category {
                    all.extend(items.iter().filter_map(|v| v.as_str().map(String::from)));
                }
            }
        }
        all
    }

    /// A uniformly random query from the category, `""` when it is empty
    pub fn random_search_query(&self, category: &str) -> String {
        let queries = self.search_queries(category);
        queries
            .choose(&mut rand::thread_rng())
            .cloned()
            .unwrap_or_default()
    }

    /// URL by key, `""` when absent
    pub fn url(&self, key: &str) -> String {
        self.string_value(&["urls", key])
    }

    /// Expected result by key, `""` when absent
    pub fn expected_result(&self, key: &str) -> String {
        self.string_value(&["expected_results", key])
    }

    /// Test user credentials by type, empty when absent
    pub fn test_user(&self, user_type: &str) -> BTreeMap<String, String> {
        let mut user = BTreeMap::new();
        if let Some(Value::Object(fields)) = self.nested(&["test_users", user_type]) {
            for (field, value) in fields {
                if let Some(s) = value.as_str() {
                    user.insert(field.clone(), s.to_string());
                }
            }
        }
        user
    }

    /// Browser configuration mapping, empty object when absent
    pub fn browser_config(&self, browser: &str) -> serde_json::Map<String, Value> {
        match self.nested(&["browser_configs", browser]) {
            Some(Value::Object(map)) => map.clone(),
            _ => serde_json::Map::new(),
        }
    }

    /// Timeout in seconds by type, defaulting to 10
    pub fn timeout(&self, timeout_type: &str) -> u64 {
        self.nested(&["timeouts", timeout_type])
            .and_then(Value::as_u64)
            .unwrap_or(10)
    }

    /// All test categories and their test names
    pub fn test_categories(&self) -> BTreeMap<String, Vec<String>> {
        let mut categories = BTreeMap::new();
        if let Some(Value::Object(map)) = self.data.get("test_categories") {
            for (category, tests) in map {
                if let Value::Array(items) = tests {
                    categories.insert(
                        category.clone(),
                        items
                            .iter()
                            .filter_map(|v| v.as_str().map(String::from))
                            .collect(),
                    );
                }
            }
        }
        categories
    }

    /// Test names in one category, empty when the category is absent
    pub fn tests_by_category(&self, category: &str) -> Vec<String> {
        self.string_list(&["test_categories", category])
    }

    /// Rows for parametrized search tests.
    ///
    /// Known types are "search" (valid_searches) and "special_chars"
    /// (special_characters); anything else yields no rows.
    pub fn data_for_parametrized_test(&self, test_type: &str) -> Vec<SearchCase> {
        let category = match test_type {
            "search" => "valid_searches",
            "special_chars" => "special_characters",
            _ => return Vec::new(),
        };

        self.search_queries(category)
            .into_iter()
            .map(|query| SearchCase {
                query,
                expected: "search".to_string(),
            })
            .collect()
    }

    /// Add a new top-level key. No-op (no write) when the key exists.
    pub fn add_test_data(&mut self, key: &str, value: Value) -> Result<()> {
        if self.data.contains_key(key) {
            return Ok(());
        }
        self.data.insert(key.to_string(), value);
        self.save()
    }

    /// Set a top-level key, inserting or overwriting, and persist
    pub fn update_test_data(&mut self, key: &str, value: Value) -> Result<()> {
        self.data.insert(key.to_string(), value);
        self.save()
    }

    /// Check that the required top-level keys are present
    pub fn validate_test_data(&self) -> bool {
        let required_keys = ["search_queries", "urls", "expected_results"];

        for key in required_keys {
            if !self.data.contains_key(key) {
                warn!("Missing required test data key: {}", key);
                return false;
            }
        }

        true
    }

    /// Write the whole mapping back to the data file atomically
    fn save(&self) -> Result<()> {
        let dir = self.data_file.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp = tempfile::NamedTempFile::new_in(dir)
            .context("Failed to create temporary test data file")?;
        serde_json::to_writer_pretty(&mut tmp, &self.data)
            .context("Failed to serialize test data")?;
        tmp.persist(&self.data_file).with_context(|| {
            format!("Failed to replace test data file {}", self.data_file.display())
        })?;
        Ok(())
    }

    fn nested(&self, path: &[&str]) -> Option<&Value> {
        let mut current = self.data.get(path[0])?;
        for key in &path[1..] {
            current = current.get(key)?;
        }
        Some(current)
    }

    fn string_value(&self, path: &[&str]) -> String {
        self.nested(path)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }

    fn string_list(&self, path: &[&str]) -> Vec<String> {
        match self.nested(path) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
#[path = "testdata_test.rs"]
mod testdata_test;
