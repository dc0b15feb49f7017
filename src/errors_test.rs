// Unit tests for errors module

use super::*;

#[test]
fn test_exit_codes_per_variant() {
    assert_eq!(HarnessError::ElementTimeout("name=q".into()).exit_code(), 2);
    assert_eq!(
        HarnessError::InteractionFailed {
            action: "click".into(),
            locator: "name=btnK".into(),
            source: anyhow::anyhow!("stale element"),
        }
        .exit_code(),
        3
    );
    assert_eq!(
        HarnessError::WebDriverFailed("chromedriver not found".into()).exit_code(),
        4
    );
    assert_eq!(HarnessError::UnsupportedBrowser("safari".into()).exit_code(), 4);
    assert_eq!(
        HarnessError::PageLoadTimeout(std::time::Duration::from_secs(30)).exit_code(),
        5
    );
    assert_eq!(
        HarnessError::Other(anyhow::anyhow!("something else")).exit_code(),
        1
    );
}

#[test]
fn test_exit_code_recoverable_through_anyhow_downcast() {
    // The binary maps run errors back to exit codes via downcast_ref
    let err: anyhow::Error = HarnessError::ElementTimeout("css=#absent".into()).into();
    let code = err
        .downcast_ref::<HarnessError>()
        .map(HarnessError::exit_code)
        .unwrap_or(1);
    assert_eq!(code, 2);
}
