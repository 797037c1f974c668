//! su - uploader for su-service
//!
//! # Examples
//!
//! ```bash
//! # Upload a new build and restart the target machine
//! su update self --file ./target/release/su-service --host 10.0.0.12
//!
//! # Stage and schedule only, restart later
//! su update self --file ./su-service.exe --host build-box --reboot=false
//! ```

use su_cli::{Cli, ClientError, Commands, UpdateCommands, run_update_self, run_version};

use std::process::ExitCode;

use clap::Parser;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Update { action } => match action {
            UpdateCommands::SelfUpdate {
                file,
                host,
                port,
                reboot,
            } => run_update_self(file.as_deref(), &host, port, reboot).await,
        },
        Commands::Version { host, port } => run_version(&host, port).await,
    };

    match result {
        Ok(response) => {
            println!("{}", response.status_line());
            println!("{}", response.body);
            if response.status.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(ClientError::Validation { message, .. }) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
