//! Tests for the log line format and writer redirection.

use std::io::Write;
use std::sync::{Arc, Mutex};

use pitchdesk::{logging, plog};

#[derive(Clone, Default)]
struct CaptureWriter {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl Write for CaptureWriter {
    fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
        self.buf.lock().unwrap().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn log_lines_carry_timestamp_source_and_message() {
    let capture = CaptureWriter::default();
    logging::set_writer(Box::new(capture.clone()));

    plog!("proposal {} created", logging::record_id("0b9e8c64-1111-2222-3333-444455556666"));

    let bytes = capture.buf.lock().unwrap().clone();
    let line = String::from_utf8(bytes).expect("utf8 log line");
    assert!(line.contains("logging_tests.rs"));
    assert!(line.contains("proposal r-0b9e8c6 created"));
    // Timestamp prefix: YYYYMMDDT...
    assert!(line.chars().take(8).all(|c| c.is_ascii_digit()));
    assert!(line.contains('T'));
}

#[test]
fn id_helpers_truncate_without_colour_by_default() {
    // Custom writers disable colour, and tests never call init(), so these
    // are the plain forms.
    assert_eq!(logging::user_id("abcdefghij"), "u-abcdefg");
    assert_eq!(logging::record_id("short"), "r-short");
}
