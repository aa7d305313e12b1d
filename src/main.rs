use clap::Parser;
use simplelog::{ConfigBuilder, WriteLogger};
use std::fs::File;

use vivu::core::config::{self, CliOverrides, StartupLog, VivuConfig};
use vivu::tui;

#[derive(Parser)]
#[command(name = "vivu", about = "Vietnam travel assistant in the terminal")]
struct Args {
    /// Chat endpoint URL (overrides config and VIVU_ENDPOINT)
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Start with an empty conversation
    #[arg(long)]
    no_greeting: bool,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Logger settings come from config, so everything config loading has to
    // say is held in `startup_log` until the logger is up
    let mut startup_log = StartupLog::new();
    let (file_config, load_error) = match config::load_config(&mut startup_log) {
        Ok(c) => (c, None),
        Err(e) => (VivuConfig::default(), Some(e)),
    };
    let resolved = config::resolve(
        &file_config,
        &CliOverrides {
            endpoint: args.endpoint.as_deref(),
            no_greeting: args.no_greeting,
        },
        &mut startup_log,
    );

    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create(&resolved.log_file) {
        let _ = WriteLogger::init(resolved.log_level, log_config, log_file);
    }

    startup_log.flush();
    if let Some(e) = load_error {
        log::warn!("{}, using defaults", e);
    }
    log::info!("Vivu starting up against {}", resolved.endpoint);

    tui::run(resolved)
}
