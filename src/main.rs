use std::time::Duration;

use camsnap::camera::NativeBackend;
use camsnap::cli::{self, Args, Command, CommandError};
use clap::Parser;

fn load_env() {
    // Load .env file, don't override existing env vars
    // dotenv::dotenv() returns Err if .env doesn't exist, which is fine
    let _ = dotenv::dotenv();
}

fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

async fn run(args: Args) -> Result<(), CommandError> {
    let command = args.command.unwrap_or(Command::Run {
        camera: None,
        url: None,
    });

    match command {
        Command::ListCameras => cli::list_cameras(),
        Command::Config { action } => cli::handle_config_action(action, args.config),
        Command::Snap {
            camera,
            url,
            output,
            timeout,
        } => {
            let mut cfg = cli::load_config(args.config.as_deref())?;
            cli::apply_overrides(&mut cfg, camera, url);
            let mut panel = cli::mount_panel(NativeBackend::new(), &cfg)?;
            cli::snap(&mut panel, output.as_deref(), Duration::from_secs(timeout)).await
        }
        Command::Run { camera, url } => {
            let mut cfg = cli::load_config(args.config.as_deref())?;
            cli::apply_overrides(&mut cfg, camera, url);
            let mut panel = cli::mount_panel(NativeBackend::new(), &cfg)?;
            cli::run_interactive(&mut panel).await
        }
    }
}

#[tokio::main]
async fn main() {
    // Load .env file before anything else
    load_env();
    init_logging();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
