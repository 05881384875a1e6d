//! Service wiring from configuration
//!
//! A missing credential never blocks startup; it only leaves the matching
//! service unconfigured.

use repdesk_common::config::{TomlConfig, MAIL_API_KEY_ENV, RENDER_API_KEY_ENV};
use repdesk_common::SearchCategory;
use repdesk_search::config::{build_notifier, build_search_orchestrator};
use serial_test::serial;

fn clear_env() {
    std::env::remove_var(RENDER_API_KEY_ENV);
    std::env::remove_var(MAIL_API_KEY_ENV);
}

#[tokio::test]
#[serial]
async fn test_missing_keys_still_build_services() {
    clear_env();
    let toml = TomlConfig::default();

    let search = build_search_orchestrator(&toml).unwrap();
    let notifier = build_notifier(&toml).unwrap();
    assert!(!search.is_configured());
    assert!(!notifier.is_configured());

    // Every call reports the missing key
    let err = search.search("Jane Doe", SearchCategory::Writer).await.unwrap_err();
    assert!(matches!(err, repdesk_common::Error::Config(_)));
}

#[test]
#[serial]
fn test_keys_from_toml_configure_services() {
    clear_env();
    let mut toml = TomlConfig::default();
    toml.render.api_key = Some("render-key".to_string());
    toml.mail.api_key = Some("mail-key".to_string());

    assert!(build_search_orchestrator(&toml).unwrap().is_configured());
    assert!(build_notifier(&toml).unwrap().is_configured());
}

#[test]
#[serial]
fn test_env_key_configures_search() {
    clear_env();
    std::env::set_var(RENDER_API_KEY_ENV, "render-env-key");

    let search = build_search_orchestrator(&TomlConfig::default()).unwrap();
    assert!(search.is_configured());

    clear_env();
}

#[test]
#[serial]
fn test_unknown_repertory_fails_startup() {
    clear_env();
    let mut toml = TomlConfig::default();
    toml.search.repertories = vec!["SOCAN".to_string()];

    assert!(build_search_orchestrator(&toml).is_err());
}
