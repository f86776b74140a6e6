use super::ProbeError;
use futures::StreamExt;
use std::time::{Duration, Instant};

/// Sustained download against an endpoint that returns exactly
/// `target_bytes` of payload.
pub struct ThroughputCheck {
    url: String,
    target_bytes: u64,
}

/// What actually came over the wire, timed across the whole read loop.
#[derive(Debug, Clone, Copy)]
pub struct Transfer {
    pub bytes: u64,
    pub elapsed: Duration,
}

impl ThroughputCheck {
    pub fn new(base_url: &str, target_bytes: u64) -> Self {
        Self {
            url: format!("{base_url}/__down?bytes={target_bytes}"),
            target_bytes,
        }
    }

    /// Streams the response body, reporting fractional progress after each
    /// chunk. Connection and transfer errors are fatal; the stream simply
    /// ending early is stream end, not an error.
    pub async fn run<F>(
        &self,
        client: &reqwest::Client,
        on_progress: &mut F,
    ) -> Result<Transfer, ProbeError>
    where
        F: FnMut(f64),
    {
        let response = client.get(&self.url).send().await?;
        let mut stream = response.bytes_stream();

        let start = Instant::now();
        let mut read: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            read += chunk.len() as u64;
            on_progress((read as f64 / self.target_bytes as f64).min(1.0));
        }

        Ok(Transfer {
            bytes: read,
            elapsed: start.elapsed(),
        })
    }
}
