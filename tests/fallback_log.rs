use std::sync::Mutex;

use log::{Level, LevelFilter, Log, Metadata, Record};
use selfhost::{AppError, Request, Runner, StartResponse, FALLBACK_RESPONSE};

struct Capture {
    records: Mutex<Vec<(Level, String)>>,
}

impl Log for Capture {
    fn enabled(&self, _: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if !record.target().starts_with("selfhost") {
            return;
        }
        let mut records = self.records.lock().unwrap();
        records.push((record.level(), record.args().to_string()));
    }

    fn flush(&self) {}
}

static CAPTURE: Capture = Capture {
    records: Mutex::new(Vec::new()),
};

fn broken(_: Request, _: &mut StartResponse) -> Result<Vec<u8>, AppError> {
    Err("ledger unavailable".into())
}

#[test]
fn failure_is_logged_and_replaced() {
    log::set_logger(&CAPTURE).unwrap();
    log::set_max_level(LevelFilter::Trace);

    let runner = Runner::new(broken);
    let res = runner.run_transaction(b"GET /balance HTTP/1.0\r\n\r\n");
    assert_eq!(res, FALLBACK_RESPONSE);

    let records = CAPTURE.records.lock().unwrap();

    let errors: Vec<_> = records
        .iter()
        .filter(|(level, _)| *level == Level::Error)
        .collect();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].1.contains("ledger unavailable"));

    // Request preview goes out at debug level.
    assert!(records
        .iter()
        .any(|(level, msg)| *level == Level::Debug && msg.contains("GET /balance HTTP/1.0")));
}
