use std::fs;

use log::LevelFilter;
use selfhost::{diagnostics, AppError, Error, Request, Runner, StartResponse};

fn broken(_: Request, _: &mut StartResponse) -> Result<Vec<u8>, AppError> {
    Err("disk quota exceeded".into())
}

#[test]
fn installed_file_log_records_transactions() -> Result<(), Error> {
    let mut path = std::env::temp_dir();
    path.push(format!("selfhost-init-{}.log", std::process::id()));
    let _ = fs::remove_file(&path);

    diagnostics::init(&path, LevelFilter::Debug)?;

    // Only one global logger per process.
    let again = diagnostics::init(&path, LevelFilter::Debug);
    assert!(matches!(again, Err(Error::Init(_))));

    let runner = Runner::new(broken);
    runner.run_transaction(b"GET /quota HTTP/1.0\r\n\r\n");
    log::logger().flush();

    let content = fs::read_to_string(&path)?;
    assert!(content.starts_with("-- ["));
    assert!(content.contains("GET /quota HTTP/1.0"));
    assert!(content.contains("disk quota exceeded\n\n"));

    fs::remove_file(&path)?;
    Ok(())
}
