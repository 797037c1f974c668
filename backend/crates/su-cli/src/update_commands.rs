use su_config::DEFAULT_PORT;

use clap::{ArgAction, Subcommand};

#[derive(Subcommand)]
pub enum UpdateCommands {
    /// Upload a new executable to replace the running service
    #[command(name = "self")]
    SelfUpdate {
        /// Path of the new executable
        #[arg(long)]
        file: Option<String>,

        /// Service host name or IP address
        #[arg(long, default_value = "localhost")]
        host: String,

        /// Service port
        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Restart the machine once the swap is scheduled (`--reboot=false` to skip)
        #[arg(
            long,
            action = ArgAction::Set,
            default_value_t = true,
            num_args = 0..=1,
            default_missing_value = "true"
        )]
        reboot: bool,
    },
}
