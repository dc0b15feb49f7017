// Browser integration tests for the Google search page object.
//
// These drive a real headless Chrome session against local HTML fixtures
// and skip cleanly when chromedriver is not installed.

mod common;

use serial_test::serial;

use webharness::{Locator, Probe, TestDataManager};

#[tokio::test]
#[serial]
async fn test_search_box_round_trip() {
    let Some((_session, page)) = common::launch_page(common::fixtures::SEARCH_HOME).await else {
        return;
    };

    page.navigate_to().await.expect("navigation failed");
    page.search("rust webdriver").await.expect("search failed");
    assert_eq!(page.search_box_value().await.unwrap(), "rust webdriver");

    page.clear_search_box().await.expect("clear failed");
    assert_eq!(page.search_box_value().await.unwrap(), "");

    page.close().await.unwrap();
}

#[tokio::test]
#[serial]
async fn test_submit_search_reaches_results_url() {
    let Some((_session, page)) = common::launch_page(common::fixtures::SEARCH_HOME).await else {
        return;
    };

    page.navigate_to().await.unwrap();
    page.search("test automation").await.unwrap();
    page.submit_search().await.unwrap();

    // Submitting must not clear the typed query: the form submit carries
    // it into the URL
    assert!(page.is_search_results_page().await.unwrap());
    let url = page.driver().current_url().await.unwrap().to_lowercase();
    assert!(
        url.contains("test") && url.contains("automation"),
        "query should survive submission, got {}",
        url
    );

    page.close().await.unwrap();
}

#[tokio::test]
#[serial]
async fn test_empty_search_stays_on_homepage() {
    let Some((_session, page)) = common::launch_page(common::fixtures::SEARCH_HOME).await else {
        return;
    };

    page.navigate_to().await.unwrap();
    page.submit_search().await.unwrap();

    // Nothing typed, so the submit is cancelled and the URL keeps no query
    assert!(!page.is_search_results_page().await.unwrap());

    page.close().await.unwrap();
}

#[tokio::test]
#[serial]
async fn test_results_count_uses_selector_fallback() {
    let Some((_session, page)) =
        common::launch_page(common::fixtures::SEARCH_RESULTS).await
    else {
        return;
    };

    page.navigate_to().await.unwrap();

    assert_eq!(page.search_results_count().await, 3);
    let (selector, count) = page
        .first_matching_result_selector()
        .await
        .expect("a selector should match");
    assert_eq!(selector, "#search .g");
    assert_eq!(count, 3);

    assert_eq!(
        page.first_result_title().await,
        Some("First Result".to_string())
    );

    page.close().await.unwrap();
}

#[tokio::test]
#[serial]
async fn test_parametrized_queries_round_trip() {
    let data = TestDataManager::load("testdata/test_data.json").expect("test data file");
    let cases = data.data_for_parametrized_test("search");
    assert!(!cases.is_empty());

    let Some((_session, page)) = common::launch_page(common::fixtures::SEARCH_HOME).await else {
        return;
    };

    page.navigate_to().await.unwrap();
    for case in cases {
        page.search(&case.query).await.unwrap();
        assert_eq!(page.search_box_value().await.unwrap(), case.query);
    }

    page.close().await.unwrap();
}

#[tokio::test]
#[serial]
async fn test_special_character_queries_round_trip() {
    let data = TestDataManager::load("testdata/test_data.json").expect("test data file");
    let queries = data.search_queries("special_characters");
    assert!(!queries.is_empty());

    let Some((_session, page)) = common::launch_page(common::fixtures::SEARCH_HOME).await else {
        return;
    };

    page.navigate_to().await.unwrap();
    for query in queries {
        page.search(&query).await.unwrap();
        assert_eq!(page.search_box_value().await.unwrap(), query);
        page.clear_search_box().await.unwrap();
        assert_eq!(page.search_box_value().await.unwrap(), "");
    }

    page.close().await.unwrap();
}

#[tokio::test]
#[serial]
async fn test_presence_probes_report_without_erroring() {
    let Some((_session, page)) = common::launch_page(common::fixtures::SEARCH_HOME).await else {
        return;
    };

    page.navigate_to().await.unwrap();

    let driver = page.driver();
    assert_eq!(
        driver.check_element_present(&Locator::name("q")).await,
        Probe::Found
    );
    assert_eq!(
        driver
            .check_element_present_within(&Locator::css("#does-not-exist"), common::short_timeout())
            .await,
        Probe::TimedOut
    );

    page.close().await.unwrap();
}

#[tokio::test]
#[serial]
async fn test_missing_element_times_out_with_screenshot() {
    let Some((session, page)) = common::launch_page(common::fixtures::SEARCH_HOME).await else {
        return;
    };

    page.navigate_to().await.unwrap();

    let err = page
        .driver()
        .find_element_within(&Locator::css("#absent"), common::short_timeout())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("#absent"));

    // The failure attached an element_not_found screenshot to the report
    let attached = std::fs::read_dir(session.allure_dir())
        .unwrap()
        .filter_map(|e| e.ok())
        .any(|e| {
            let name = e.file_name().to_string_lossy().to_string();
            name.ends_with("-attachment.png")
        });
    assert!(attached, "expected a failure screenshot in allure-results");

    page.close().await.unwrap();
}

#[tokio::test]
#[serial]
async fn test_scroll_to_element_never_raises() {
    let Some((_session, page)) =
        common::launch_page(common::fixtures::SEARCH_RESULTS).await
    else {
        return;
    };

    page.navigate_to().await.unwrap();

    // Element already in view; scrolling must still succeed
    page.driver()
        .scroll_to_element(&Locator::css("#search"))
        .await
        .expect("scroll should be a no-op for visible elements");

    page.close().await.unwrap();
}
