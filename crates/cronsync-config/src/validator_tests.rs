use super::*;

#[test]
fn test_validate_default_config() {
    let config = Config::default();
    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "store.path"));
}

#[test]
fn test_validate_invalid_port() {
    let mut config = Config::default();
    config.server.port = 0;

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(!result.is_valid());
    assert!(result.errors.iter().any(|e| e.path == "server.port"));
}

#[test]
fn test_validate_empty_host() {
    let mut config = Config::default();
    config.server.host = String::new();

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.errors.iter().any(|e| e.path == "server.host"));
}

#[test]
fn test_validate_unknown_store_backend() {
    let mut config = Config::default();
    config.store.backend = "postgres".to_string();

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(!result.is_valid());
    assert!(result.errors.iter().any(|e| e.path == "store.backend"));
}

#[test]
fn test_validate_memory_store_warning() {
    let mut config = Config::default();
    config.store.backend = "memory".to_string();

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "store.backend"));
}

#[test]
fn test_validate_zero_concurrency() {
    let mut config = Config::default();
    config.scheduler.max_concurrent_jobs = 0;

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.errors.iter().any(|e| e.path == "scheduler.max_concurrent_jobs"));
}

#[test]
fn test_validate_empty_startup_groups_warning() {
    let mut config = Config::default();
    config.scheduler.startup_groups.clear();

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "scheduler.startup_groups"));
}

#[test]
fn test_validate_zero_timeouts() {
    let mut config = Config::default();
    config.http_client.connect_timeout_secs = 0;
    config.http_client.read_timeout_secs = 0;

    let result = ConfigValidator::validate(&config).unwrap();
    assert_eq!(result.errors.len(), 2);
}

#[test]
fn test_validate_bad_utc_offset() {
    let mut config = Config::default();
    config.expression.utc_offset = "8".to_string();

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.errors.iter().any(|e| e.path == "expression.utc_offset"));
}

#[test]
fn test_validate_rewrite_without_proxy() {
    let mut config = Config::default();
    config.rewrite.enabled = true;

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(!result.is_valid());
    assert!(result.errors.iter().any(|e| e.path == "rewrite.proxy"));
}

#[test]
fn test_validate_rewrite_with_proxy() {
    let mut config = Config::default();
    config.rewrite.enabled = true;
    config.rewrite.proxy = "https://proxy.internal".to_string();

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.is_valid());
}

#[test]
fn test_validate_proxy_without_rewrite_warning() {
    let mut config = Config::default();
    config.rewrite.proxy = "https://proxy.internal".to_string();

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.warnings.iter().any(|w| w.path == "rewrite.enabled"));
}
