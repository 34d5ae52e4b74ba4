use chrono::Local;
use clap::Parser;
use logs_vacuum::vacuum::config::{Config, DEFAULT_CONFIG_PATH};
use logs_vacuum::vacuum::runner::TaskRunner;
use std::path::PathBuf;
use std::process::exit;
use tracing::{error, info};

/// Archive matching log files and optionally remove them
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Location of vacuums config file (JSON, or YAML with .yml/.yaml extension)
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

fn main() {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    info!("Running logs vacuum");
    let res = Config::load(&args.config)
        .and_then(|config| TaskRunner::new(Local::now()).run_all(&config.vacuums));

    match res {
        Ok(outcomes) => outcomes
            .iter()
            .enumerate()
            .for_each(|(idx, outcome)| info!("Vacuum #{}: {outcome}", idx + 1)),
        Err(e) => {
            error!("{e}");
            exit(1);
        }
    }
}
