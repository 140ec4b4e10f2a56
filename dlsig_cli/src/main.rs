use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;

use dlsig_core::DownloadManager;

mod json_observer;
mod terminal_observer;
use json_observer::JsonProgressObserver;
use terminal_observer::TerminalProgressObserver;

#[derive(Parser)]
#[command(name = "dlsig", about = "Simulated download with cooperative cancellation")]
struct Args {
    /// Number of simulated steps
    #[arg(short, long, env = "DLSIG_STEPS", default_value = "10")]
    steps: u32,

    /// Delay before each step, in milliseconds
    #[arg(short = 'd', long, env = "DLSIG_STEP_DELAY_MS", default_value = "1000")]
    step_delay_ms: u64,

    /// Stop the download after this many milliseconds
    #[arg(long)]
    stop_after_ms: Option<u64>,

    /// Print progress snapshots as JSON lines instead of a progress bar
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let manager = DownloadManager::builder()
        .with_steps(args.steps)
        .with_step_delay(Duration::from_millis(args.step_delay_ms))
        .build();
    let config = manager.config();

    if args.json {
        manager.add_observer(Box::new(JsonProgressObserver));
    } else {
        manager.add_observer(Box::new(TerminalProgressObserver::new(config.steps)));
    }

    if let Some(ms) = args.stop_after_ms {
        let stopper = manager.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            stopper.stop();
        });
    }

    println!(
        "Starting download: {} steps, {} ms each",
        config.steps,
        config.step_delay.as_millis()
    );
    let start = Instant::now();

    let mut signal = manager.start().start();
    let mut exit = ExitCode::FAILURE;
    while let Some(result) = signal.next_result().await {
        match result {
            Ok(progress) => {
                println!(
                    "Download complete: {}% in {:.2}s",
                    progress,
                    start.elapsed().as_secs_f64()
                );
                exit = ExitCode::SUCCESS;
            }
            Err(e) => {
                eprintln!(
                    "Download failed: {} (domain: {}, code: {}) after {:.2}s",
                    e,
                    e.domain(),
                    e.code(),
                    start.elapsed().as_secs_f64()
                );
                exit = ExitCode::FAILURE;
            }
        }
    }

    exit
}
