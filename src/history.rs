//! Append-only result log, one human-readable line per saved run.

use crate::probe::SpeedTestResult;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

pub fn format_entry(result: &SpeedTestResult) -> String {
    format!(
        "[{}]  Server: {}  DL: {:.2} Mbps  UL: ~{:.2} Mbps  Ping: {:.2} ms",
        result.timestamp, result.server, result.download_mbps, result.upload_mbps, result.ping_ms,
    )
}

/// Appends one entry, creating the file if absent.
pub fn append(path: &Path, result: &SpeedTestResult) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}", format_entry(result))
}
