pub mod latency;
pub mod throughput;

use crate::settings::Settings;
use chrono::Local;
use latency::LatencyCheck;
use std::time::Duration;
use thiserror::Error;
use throughput::ThroughputCheck;

/// Upload is not measured; it is estimated from download bandwidth with this
/// fixed ratio. Documented approximation, kept for result compatibility.
pub const UPLOAD_RATIO: f64 = 0.15;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpeedTestResult {
    pub download_mbps: f64,
    /// Estimated as `download_mbps * UPLOAD_RATIO`, never measured.
    pub upload_mbps: f64,
    pub ping_ms: f64,
    /// Local wall-clock time at completion, `YYYY-MM-DD HH:MM:SS`.
    pub timestamp: String,
    /// Host of the measurement server.
    pub server: String,
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("could not connect to the measurement server")]
    Connect(#[source] reqwest::Error),
    #[error("transfer from the measurement server failed")]
    Request(#[source] reqwest::Error),
}

impl From<reqwest::Error> for ProbeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() {
            ProbeError::Connect(err)
        } else {
            ProbeError::Request(err)
        }
    }
}

/// One latency + throughput measurement attempt against a remote host.
///
/// Pure measurement logic: runs on whatever task the caller spawns it on and
/// never touches shared engine state except through the progress callback.
pub struct NetworkProbe {
    client: reqwest::Client,
    latency: LatencyCheck,
    throughput: ThroughputCheck,
    server: String,
}

impl NetworkProbe {
    pub fn new(settings: &Settings) -> Result<Self, ProbeError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("speedprobe/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            latency: LatencyCheck::new(&settings.server_url),
            throughput: ThroughputCheck::new(&settings.server_url, settings.download_bytes),
            server: settings.server_label(),
        })
    }

    /// Runs the full probe: best-effort ping first, then the throughput
    /// transfer. Only the transfer can fail the run.
    pub async fn run<F>(&self, mut on_progress: F) -> Result<SpeedTestResult, ProbeError>
    where
        F: FnMut(f64),
    {
        let ping_ms = self.latency.run(&self.client).await.unwrap_or(0.0);
        let transfer = self.throughput.run(&self.client, &mut on_progress).await?;

        let download_mbps = mbps(transfer.bytes, transfer.elapsed.as_secs_f64());

        Ok(SpeedTestResult {
            download_mbps,
            upload_mbps: download_mbps * UPLOAD_RATIO,
            ping_ms,
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            server: self.server.clone(),
        })
    }
}

/// Megabits per second over the whole transfer. Degenerate transfers (no
/// bytes, or a clock that did not advance) report 0 rather than Inf/NaN.
pub(crate) fn mbps(bytes: u64, secs: f64) -> f64 {
    if bytes == 0 || secs <= 0.0 {
        return 0.0;
    }
    (bytes as f64 * 8.0) / secs / 1e6
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mbps_ten_megabytes_in_two_seconds() {
        let dl = mbps(10_000_000, 2.0);
        assert!((dl - 40.0).abs() < 1e-9);
        assert!((dl * UPLOAD_RATIO - 6.0).abs() < 1e-9);
    }

    #[test]
    fn mbps_zero_bytes_is_zero() {
        assert_eq!(mbps(0, 2.0), 0.0);
    }

    #[test]
    fn mbps_zero_elapsed_is_zero() {
        assert_eq!(mbps(10_000_000, 0.0), 0.0);
        assert_eq!(mbps(10_000_000, -1.0), 0.0);
    }
}
