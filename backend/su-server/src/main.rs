use su_server::logger::{self, LogTarget};
use su_server::{AppState, ControlLoop, VERSION, apply_pending_update, build_router};

use su_config::Config;
use su_core::ServiceLogger;

use std::error::Error;
use std::path::Path;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "su-service")]
#[command(about = "Self-updating background service", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the service
    Run {
        /// Interactive console mode with colored stdout logging
        #[arg(long)]
        debug: bool,
    },
    /// Register the Windows service
    Install,
    /// Unregister the Windows service
    Remove,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    // Load and validate configuration
    let config = Config::load()?;
    config.validate()?;

    match cli.command {
        Command::Install => {
            su_server::install_service(&config.service.name)?;
            println!("Service {} installed", config.service.name);
            Ok(())
        }
        Command::Remove => {
            su_server::remove_service(&config.service.name)?;
            println!("Service {} removed", config.service.name);
            Ok(())
        }
        Command::Run { debug } => run(config, debug).await,
    }
}

async fn run(config: Config, debug: bool) -> Result<(), Box<dyn Error>> {
    // No logger, no service
    let log = logger::build(config.logging.level, LogTarget::for_run(&config, debug)?)?;

    log.info(format!("Starting su-service v{VERSION}"));
    for line in config.summary_lines() {
        log.info(line);
    }

    let state = AppState::from_config(&config, log.clone())?;

    match state.executable_path() {
        Ok(executable) => {
            if apply_pending_update(&executable, &log) {
                restart_replaced(&executable, &log)?;
            }
        }
        Err(e) => log.warn(format!("Cannot resolve own executable path: {e}")),
    }

    let control_loop = ControlLoop::from_config(&config, build_router(state), log.clone());

    let result = if debug {
        su_server::run_console(control_loop, log.clone()).await
    } else {
        run_production(&config, control_loop, log.clone()).await
    };

    match &result {
        Ok(()) => log.info("su-service stopped"),
        Err(e) => log.error(format!("su-service failed: {e}")),
    }
    log.flush();

    Ok(result?)
}

#[cfg(windows)]
async fn run_production(
    config: &Config,
    control_loop: ControlLoop,
    log: ServiceLogger,
) -> su_server::ServerResult<()> {
    su_server::service::scm::run_dispatcher(&config.service.name, control_loop, log).await
}

#[cfg(not(windows))]
async fn run_production(
    _config: &Config,
    control_loop: ControlLoop,
    log: ServiceLogger,
) -> su_server::ServerResult<()> {
    su_server::run_console(control_loop, log).await
}

/// The executable on disk was just swapped; start it in place of this image.
#[cfg(unix)]
fn restart_replaced(executable: &Path, log: &ServiceLogger) -> Result<(), Box<dyn Error>> {
    use std::os::unix::process::CommandExt;

    log.info(format!("Restarting into updated {}", executable.display()));
    log.flush();

    // exec only returns on failure
    let e = std::process::Command::new(executable)
        .args(std::env::args_os().skip(1))
        .exec();
    Err(Box::new(e))
}

#[cfg(not(unix))]
fn restart_replaced(_executable: &Path, log: &ServiceLogger) -> Result<(), Box<dyn Error>> {
    log.warn("Executable replaced at startup, the new image runs from the next start");
    Ok(())
}
