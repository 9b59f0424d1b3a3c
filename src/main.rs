use campusguide::core::config;
use campusguide::tui;
use clap::{Parser, ValueEnum};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    #[default]
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Parser)]
#[command(name = "campusguide", about = "Terminal client for the CampusGuide assistant")]
struct Args {
    /// Base URL of the CampusGuide server (overrides config and CAMPUSGUIDE_BASE_URL)
    #[arg(short, long)]
    server: Option<String>,

    /// Verbosity of campusguide.log
    #[arg(long, default_value_t, value_enum)]
    log_level: LogLevel,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to campusguide.log in current directory
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();

    if let Ok(log_file) = File::create("campusguide.log") {
        let _ = WriteLogger::init(args.log_level.into(), log_config, log_file);
    }

    let file_config = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}");
            log::error!("{}", e);
            std::process::exit(1);
        }
    };
    let resolved = config::resolve(&file_config, args.server.as_deref());

    log::info!("CampusGuide starting up against {}", resolved.base_url);

    tui::run(resolved)
}
