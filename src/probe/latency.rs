use std::time::Instant;

/// Best-effort round-trip check: a HEAD request to a zero-byte endpoint,
/// timed from send to first response header. Any failure leaves ping at 0
/// instead of failing the run.
pub struct LatencyCheck {
    url: String,
}

impl LatencyCheck {
    pub fn new(base_url: &str) -> Self {
        Self {
            url: format!("{base_url}/__down?bytes=0"),
        }
    }

    pub async fn run(&self, client: &reqwest::Client) -> Option<f64> {
        let start = Instant::now();
        match client.head(&self.url).send().await {
            Ok(_) => Some(start.elapsed().as_secs_f64() * 1000.0),
            Err(_) => None,
        }
    }
}
