use anyhow::{Context, Result};
use clap::Parser;
use speedprobe::settings::{DEFAULT_DOWNLOAD_BYTES, DEFAULT_SERVER_URL, RESULT_LOG_FILENAME};
use speedprobe::{Settings, SpeedTestEngine, TestState};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(name = "speedprobe")]
#[command(about = "Measure download bandwidth and latency from the terminal")]
struct Cli {
    /// Measurement server base URL
    #[arg(long, default_value = DEFAULT_SERVER_URL)]
    server: String,

    /// Number of payload bytes to download
    #[arg(long, default_value_t = DEFAULT_DOWNLOAD_BYTES)]
    bytes: u64,

    /// Result log location (default: speedtest_results.txt next to the executable)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Do not append the result to the log
    #[arg(long)]
    no_save: bool,
}

fn default_log_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(RESULT_LOG_FILENAME)))
        .unwrap_or_else(|| PathBuf::from(RESULT_LOG_FILENAME))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let settings = Settings {
        server_url: cli.server,
        download_bytes: cli.bytes,
        log_path: cli.log_file.unwrap_or_else(default_log_path),
    };
    let server = settings.server_label();
    let log_path = settings.log_path.clone();
    let engine = SpeedTestEngine::new(settings);

    println!("Testing against {server}...");
    engine.start();

    loop {
        match engine.state() {
            TestState::Done => break,
            TestState::Failed => {
                println!();
                anyhow::bail!("speed test failed; check connectivity to {server}");
            }
            TestState::Running | TestState::Idle => {
                print!("\rDownloading... {:3.0}%", engine.progress() * 100.0);
                std::io::stdout().flush()?;
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        }
    }
    println!("\rDownloading... done");

    let result = engine
        .result()
        .context("run finished without publishing a result")?;
    println!();
    println!("Server:   {}", result.server);
    println!("Ping:     {:.2} ms", result.ping_ms);
    println!("Download: {:.2} Mbps", result.download_mbps);
    println!("Upload:   ~{:.2} Mbps (estimated)", result.upload_mbps);

    if !cli.no_save {
        if engine.save_result() {
            tracing::info!(path = %log_path.display(), "result appended to log");
        } else {
            tracing::warn!(path = %log_path.display(), "could not append result to log");
        }
    }

    Ok(())
}
