use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;
use tempfile::NamedTempFile;
use virtual_tryon_lib::config::{ADDR_ENV, CONFIG_ENV};
use virtual_tryon_lib::session::{FacingMode, TryOnSelection, MAX_SELECTED};
use virtual_tryon_lib::{AppConfig, TryOnError};

// env vars are process-wide
static ENV_LOCK: Mutex<()> = Mutex::new(());

fn clear_env() {
    std::env::remove_var(CONFIG_ENV);
    std::env::remove_var(ADDR_ENV);
}

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_explicit_file_is_loaded() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    let file = config_file(
        r#"
        [server]
        addr = "0.0.0.0:8080"

        [session]
        camera_width = 640
        facing_mode = "environment"
        audio = false
        "#,
    );

    let cfg = tokio_test::assert_ok!(AppConfig::load(Some(file.path())));
    assert_eq!(cfg.server.addr, "0.0.0.0:8080");

    let settings = cfg.session.settings();
    assert_eq!(settings.detection_interval, Duration::from_millis(100));
    assert_eq!(settings.constraints.facing_mode, FacingMode::Environment);
    assert!(!settings.constraints.audio);
    assert_eq!(settings.constraints.width, 640);
    assert_eq!(settings.constraints.height, 720);
}

#[test]
fn test_config_path_from_env() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    let file = config_file("[catalog]\nlookup_latency_ms = 5\n");
    std::env::set_var(CONFIG_ENV, file.path());

    let cfg = AppConfig::load(None);
    clear_env();

    assert_eq!(tokio_test::assert_ok!(cfg).catalog.lookup_latency_ms, 5);
}

#[test]
fn test_env_overrides_file() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    let file = config_file("[server]\naddr = \"127.0.0.1:4000\"\n");
    std::env::set_var(ADDR_ENV, "127.0.0.1:5000");

    let cfg = AppConfig::load(Some(file.path()));
    clear_env();
    let cfg = tokio_test::assert_ok!(cfg);

    assert_eq!(cfg.server.addr, "127.0.0.1:5000");
}

#[test]
fn test_bad_env_addr() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    let file = config_file("");
    std::env::set_var(ADDR_ENV, "localhost");

    let result = AppConfig::load(Some(file.path()));
    clear_env();

    assert!(matches!(result, Err(TryOnError::Config(_))));
}

#[test]
fn test_selection_capacity_cannot_be_raised() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    let file = config_file("[session]\nselection_capacity = 5\n");
    let result = AppConfig::load(Some(file.path()));
    assert!(matches!(result, Err(TryOnError::ConfigParse(_))));

    assert_eq!(TryOnSelection::new(5).capacity(), MAX_SELECTED);
}

#[tokio::test]
async fn test_recommendation_count_is_fixed() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    let file = config_file("[catalog]\nrecommendation_count = 2\n");
    let result = AppConfig::load(Some(file.path()));
    assert!(matches!(result, Err(TryOnError::ConfigParse(_))));

    let file = config_file("[catalog]\nrecommend_latency_ms = 0\n");
    let cfg = tokio_test::assert_ok!(AppConfig::load(Some(file.path())));
    drop(_guard);

    let picks = cfg
        .catalog
        .build()
        .unwrap()
        .recommend(None, &Default::default())
        .await
        .unwrap();
    assert_eq!(picks.len(), 4);
}

#[test]
fn test_detection_interval_is_fixed() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    let file = config_file("[session]\ndetection_interval_ms = 40\n");
    let result = AppConfig::load(Some(file.path()));

    assert!(matches!(result, Err(TryOnError::ConfigParse(_))));
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    let dir = tempfile::tempdir().unwrap();
    let result = AppConfig::load(Some(&dir.path().join("nope.toml")));

    assert!(matches!(result, Err(TryOnError::Config(_))));
}

#[test]
fn test_invalid_toml() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    let file = config_file("[server\naddr = ");
    let result = AppConfig::load(Some(file.path()));

    assert!(matches!(result, Err(TryOnError::ConfigParse(_))));
}
