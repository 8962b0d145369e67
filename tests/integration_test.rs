use std::fs;
use std::sync::Arc;

use portal_cleaner::config::Config;
use portal_cleaner::error::{AppError, FileError, InputError};
use portal_cleaner::filters::{is_date_in_range, parse_date_range, should_process_row, RowFilters, StatusFilter};
use portal_cleaner::infrastructure::TokioWait;
use portal_cleaner::models::load_product_codes;
use portal_cleaner::services::ErrorLogger;
use portal_cleaner::utils::logging;
use portal_cleaner::{ChromeSession, RunInputs, SessionDriver, SessionState};
use tempfile::TempDir;

fn row_cells(date: &str, status: &str) -> Vec<String> {
    let mut cells = vec!["x".to_string(); 15];
    cells[6] = status.to_string();
    cells[14] = date.to_string();
    cells
}

#[test]
fn test_range_filter_is_inclusive() {
    let range = parse_date_range("01.07.2025", "13.07.2025").unwrap();
    assert!(is_date_in_range("01.07.2025", &range));
    assert!(!is_date_in_range("30.06.2025", &range));
    assert!(is_date_in_range("13.07.2025", &range));
    assert!(!is_date_in_range("14.07.2025", &range));
}

#[test]
fn test_row_filters_compose() {
    let filters = RowFilters {
        date_range: Some(parse_date_range("01.07.2025", "").unwrap()),
        status: Some(StatusFilter::new("HAZIRLIK").unwrap()),
    };
    assert!(should_process_row(&row_cells("02.07.2025", "hazirlik"), &filters));
    assert!(!should_process_row(&row_cells("02.07.2025", "URETIM"), &filters));
    assert!(!should_process_row(&row_cells("15.06.2025", "HAZIRLIK"), &filters));
    assert!(!should_process_row(&row_cells("02.07.2025", "HAZIRLIK")[..14], &filters));
}

#[tokio::test]
async fn test_load_codes_from_txt_and_xml() {
    let dir = TempDir::new().unwrap();

    let txt = dir.path().join("codes.txt");
    fs::write(&txt, "A100\n\n  A200 \nA100\n").unwrap();
    let codes = load_product_codes(&txt).await.unwrap();
    assert_eq!(codes.to_vec(), vec!["A100", "A200", "A100"]);

    let xml = dir.path().join("codes.xml");
    fs::write(
        &xml,
        "<list><item><code> B1 </code></item><item><kod>B2</kod></item><code></code></list>",
    )
    .unwrap();
    let codes = load_product_codes(&xml).await.unwrap();
    assert_eq!(codes.to_vec(), vec!["B1", "B2"]);
}

#[tokio::test]
async fn test_unsupported_extension_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("codes.csv");
    fs::write(&path, "A100").unwrap();

    let err = load_product_codes(&path).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<FileError>(),
        Some(FileError::UnsupportedFormat { .. })
    ));
}

#[tokio::test]
async fn test_empty_code_file_blocks_run() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("codes.txt");
    fs::write(&path, "\n  \n").unwrap();

    let inputs = RunInputs {
        code_file: Some(Some(path)),
        ..Default::default()
    };
    let err = inputs.into_options().await.unwrap_err();
    assert!(matches!(err, AppError::Input(InputError::EmptyCodeList)));
}

#[tokio::test]
async fn test_bad_dates_block_run() {
    let inputs = RunInputs {
        date_range: Some(("13.07.2025".to_string(), "01.07.2025".to_string())),
        ..Default::default()
    };
    let err = inputs.into_options().await.unwrap_err();
    assert!(matches!(err, AppError::Input(InputError::StartAfterEnd)));

    let inputs = RunInputs {
        date_range: Some(("2025-07-01".to_string(), String::new())),
        ..Default::default()
    };
    let err = inputs.into_options().await.unwrap_err();
    assert!(matches!(err, AppError::Input(InputError::InvalidStartDate(_))));
}

#[test]
fn test_error_log_appends_one_id_per_line() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("error_urunler.txt");
    let logger = ErrorLogger::with_path(&path);

    assert!(!path.exists());
    logger.log_error("IE-1").unwrap();
    ErrorLogger::with_path(&path).log_error(" A200 ").unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "IE-1\nA200\n");
}

#[test]
fn test_config_file_overrides_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("portal.toml");
    fs::write(
        &path,
        "base_url = \"http://portal.local\"\nsearch_delay_secs = 0\n\n[browser]\nheadless = true\n",
    )
    .unwrap();

    let config = Config::from_toml_file(&path).unwrap();
    assert_eq!(config.start_url(), "http://portal.local/Uretim/UrunNerede");
    assert!(config.search_delay().is_zero());
    assert!(config.browser.headless);
    assert_eq!(config.max_retries, 3);
}

#[test]
fn test_invalid_config_file_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("portal.toml");
    fs::write(&path, "max_retries = \"three\"").unwrap();

    assert!(matches!(
        Config::from_toml_file(&path),
        Err(AppError::Config(_))
    ));
}

#[tokio::test]
#[ignore] // 需要本机 Chromium 和可访问的门户：cargo test -- --ignored
async fn test_open_start_page() {
    logging::init(true);

    let config = Config::from_env();
    let mut session = ChromeSession::new(config, Arc::new(TokioWait));

    session.open().await.expect("启动浏览器失败");
    session
        .navigate_to_start_page()
        .await
        .expect("加载起始页失败");
    assert_eq!(session.state(), SessionState::OnListPage);
    assert_eq!(session.window_count().await.unwrap(), 1);

    session.close().await.expect("关闭浏览器失败");
    assert_eq!(session.state(), SessionState::Closed);
}
