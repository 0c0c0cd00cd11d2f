use std::fs;
use std::time::Duration;
use tally_logger::{LevelFilter, Logger};
use tempfile::tempdir;

#[test]
fn file_logging_writes_rolling_file() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempdir()?;
    let log_dir = tmp.path().join("logs");

    let logger = Logger::builder()
        .name("tally-file-logging")
        .console(false)
        .level(LevelFilter::INFO)
        .path(&log_dir)
        .init()?;
    assert!(logger.has_file_output());

    tracing::info!(url = "/api/v1/todo/", method = "GET", "request served");

    std::thread::sleep(Duration::from_millis(30));
    drop(logger);

    let log_file = fs::read_dir(&log_dir)?
        .flatten()
        .map(|entry| entry.path())
        .find(|path| path.extension().and_then(|ext| ext.to_str()) == Some("log"))
        .expect("a .log file should exist");

    let contents = fs::read_to_string(log_file)?;
    assert!(contents.contains("request served"));
    assert!(contents.contains("/api/v1/todo/"));

    Ok(())
}
