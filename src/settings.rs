use std::path::PathBuf;

/// Default measurement endpoint. Serves `/__down?bytes=N` which returns
/// exactly N bytes of payload.
pub const DEFAULT_SERVER_URL: &str = "https://speed.cloudflare.com";

/// Default transfer size for the throughput measurement.
pub const DEFAULT_DOWNLOAD_BYTES: u64 = 10_000_000;

/// Default result-log filename, resolved relative to the application
/// directory by the caller.
pub const RESULT_LOG_FILENAME: &str = "speedtest_results.txt";

#[derive(Debug, Clone)]
pub struct Settings {
    /// Base URL of the measurement server, scheme included.
    pub server_url: String,
    /// Number of payload bytes requested by the throughput measurement.
    pub download_bytes: u64,
    /// Append-only result log location.
    pub log_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            download_bytes: DEFAULT_DOWNLOAD_BYTES,
            log_path: PathBuf::from(RESULT_LOG_FILENAME),
        }
    }
}

impl Settings {
    /// Host (and port, when non-default) of the server URL, used as the
    /// server identifier stored in results.
    pub fn server_label(&self) -> String {
        match reqwest::Url::parse(&self.server_url) {
            Ok(url) => {
                let host = url.host_str().unwrap_or(&self.server_url).to_string();
                match url.port() {
                    Some(port) => format!("{host}:{port}"),
                    None => host,
                }
            }
            Err(_) => self.server_url.clone(),
        }
    }
}
