mod gui;

use clap::Parser;
use std::path::PathBuf;
use sysquery::config;
use sysquery::{CountingAllocator, SystemQuery};
use tracing::info;
use tracing_subscriber::EnvFilter;

use gui::MonitorApp;

// Lets the "Collect" button report the live Rust heap.
#[global_allocator]
static GLOBAL: CountingAllocator = CountingAllocator::new(std::alloc::System);

/// Live view of the host queries for this process
#[derive(Parser, Debug)]
#[command(name = "sysquery-monitor", version, about)]
struct Args {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Refresh interval in milliseconds, overriding the configuration
    #[arg(long, value_name = "MS")]
    refresh_ms: Option<u64>,
}

fn main() -> eframe::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut config = config::load_config_or_default(args.config.as_deref());
    if let Some(ms) = args.refresh_ms.filter(|ms| *ms > 0) {
        config.monitor.refresh_interval_ms = ms;
    }

    let query = SystemQuery::native();
    info!(
        "Starting {} v{} with {:?}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        query.capabilities()
    );

    // Configure native options for the GUI
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([640.0, 720.0])
            .with_title("System Query Monitor"),
        ..Default::default()
    };

    eframe::run_native(
        "System Query Monitor",
        options,
        Box::new(move |cc| Box::new(MonitorApp::new(cc, query, &config))),
    )
}
