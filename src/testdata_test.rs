// Unit tests for testdata module

use super::*;
use pretty_assertions::assert_eq;
use serde_json::json;

fn sample_data() -> serde_json::Value {
    json!({
        "search_queries": {
            "valid_searches": ["rust webdriver", "test automation", "page object model"],
            "special_characters": ["c++ & c#", "100% coverage?"],
            "empty_category": []
        },
        "urls": {
            "google": "https://www.google.com",
            "staging": "https://staging.example.com"
        },
        "expected_results": {
            "google_title": "Google",
            "min_results_count": "5"
        },
        "test_users": {
            "valid_user": { "username": "qa", "password": "secret" }
        },
        "browser_configs": {
            "chrome": { "headless": true }
        },
        "timeouts": {
            "short": 5,
            "medium": 10
        },
        "test_categories": {
            "smoke": ["test_google_search", "test_empty_search"],
            "regression": ["test_clear_search_box"]
        }
    })
}

fn write_sample(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("test_data.json");
    std::fs::write(&path, serde_json::to_string_pretty(&sample_data()).unwrap()).unwrap();
    path
}

#[test]
fn test_missing_file_is_fatal() {
    let err = TestDataManager::load("/nonexistent/test_data.json").unwrap_err();
    assert!(err.to_string().contains("Test data file not found"));
}

#[test]
fn test_lookups() {
    let dir = tempfile::tempdir().unwrap();
    let data = TestDataManager::load(write_sample(&dir)).unwrap();

    assert_eq!(
        data.search_queries("valid_searches"),
        vec!["rust webdriver", "test automation", "page object model"]
    );
    assert_eq!(data.url("google"), "https://www.google.com");
    assert_eq!(data.expected_result("google_title"), "Google");
    assert_eq!(data.test_user("valid_user")["username"], "qa");
    assert_eq!(data.browser_config("chrome")["headless"], json!(true));
    assert_eq!(data.timeout("short"), 5);
    assert_eq!(
        data.tests_by_category("smoke"),
        vec!["test_google_search", "test_empty_search"]
    );
    assert_eq!(data.test_categories().len(), 2);
}

#[test]
fn test_missing_keys_degrade_to_empty_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let data = TestDataManager::load(write_sample(&dir)).unwrap();

    assert!(data.search_queries("no_such_category").is_empty());
    assert_eq!(data.url("no_such_url"), "");
    assert_eq!(data.expected_result("no_such_result"), "");
    assert!(data.test_user("no_such_user").is_empty());
    assert!(data.browser_config("safari").is_empty());
    assert_eq!(data.timeout("no_such_timeout"), 10);
    assert!(data.tests_by_category("no_such_category").is_empty());
}

#[test]
fn test_all_search_queries_spans_categories() {
    let dir = tempfile::tempdir().unwrap();
    let data = TestDataManager::load(write_sample(&dir)).unwrap();

    let all = data.all_search_queries();
    assert_eq!(all.len(), 5);
    assert!(all.contains(&"rust webdriver".to_string()));
    assert!(all.contains(&"c++ & c#".to_string()));
}

#[test]
fn test_random_search_query() {
    let dir = tempfile::tempdir().unwrap();
    let data = TestDataManager::load(write_sample(&dir)).unwrap();

    // Always a member of the category
    let queries = data.search_queries("valid_searches");
    for _ in 0..20 {
        let query = data.random_search_query("valid_searches");
        assert!(queries.contains(&query));
    }

    // Empty or absent categories yield an empty string
    assert_eq!(data.random_search_query("empty_category"), "");
    assert_eq!(data.random_search_query("no_such_category"), "");
}

#[test]
fn test_data_for_parametrized_test() {
    let dir = tempfile::tempdir().unwrap();
    let data = TestDataManager::load(write_sample(&dir)).unwrap();

    let search_cases = data.data_for_parametrized_test("search");
    assert_eq!(search_cases.len(), 3);
    assert_eq!(search_cases[0].query, "rust webdriver");
    assert_eq!(search_cases[0].expected, "search");

    let special = data.data_for_parametrized_test("special_chars");
    assert_eq!(special.len(), 2);

    assert!(data.data_for_parametrized_test("unknown").is_empty());
}

#[test]
fn test_add_is_a_noop_when_key_exists() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_sample(&dir);
    let mut data = TestDataManager::load(&path).unwrap();

    data.add_test_data("urls", json!({"overwritten": true})).unwrap();

    // Neither the in-memory mapping nor the file changed
    assert_eq!(data.url("google"), "https://www.google.com");
    let reloaded = TestDataManager::load(&path).unwrap();
    assert_eq!(reloaded.url("google"), "https://www.google.com");
}

#[test]
fn test_add_persists_new_key() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_sample(&dir);
    let mut data = TestDataManager::load(&path).unwrap();

    data.add_test_data("feature_flags", json!({"new_ui": true}))
        .unwrap();

    let reloaded = TestDataManager::load(&path).unwrap();
    assert!(reloaded.validate_test_data());
    assert_eq!(
        reloaded.data.get("feature_flags"),
        Some(&json!({"new_ui": true}))
    );
}

#[test]
fn test_update_always_writes_and_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_sample(&dir);
    let mut data = TestDataManager::load(&path).unwrap();

    data.update_test_data("urls", json!({"google": "https://google.test"}))
        .unwrap();
    assert_eq!(data.url("google"), "https://google.test");

    // Reloading from the same file reproduces the mapping
    let reloaded = TestDataManager::load(&path).unwrap();
    assert_eq!(reloaded.data, data.data);
    assert_eq!(reloaded.url("google"), "https://google.test");
}

#[test]
fn test_validate_test_data() {
    let dir = tempfile::tempdir().unwrap();
    let data = TestDataManager::load(write_sample(&dir)).unwrap();
    assert!(data.validate_test_data());

    // Missing any one required key fails validation
    for required in ["search_queries", "urls", "expected_results"] {
        let mut partial = sample_data();
        partial.as_object_mut().unwrap().remove(required);
        let path = dir.path().join(format!("partial_{}.json", required));
        std::fs::write(&path, serde_json::to_string(&partial).unwrap()).unwrap();

        let data = TestDataManager::load(&path).unwrap();
        assert!(!data.validate_test_data(), "expected invalid without {}", required);
    }

    // Extra keys beyond the required three are irrelevant
    let minimal = json!({
        "search_queries": {},
        "urls": {},
        "expected_results": {},
        "unrelated": 42
    });
    let path = dir.path().join("minimal.json");
    std::fs::write(&path, serde_json::to_string(&minimal).unwrap()).unwrap();
    assert!(TestDataManager::load(&path).unwrap().validate_test_data());
}
