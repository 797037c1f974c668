use crate::UpdateCommands;

use su_config::DEFAULT_PORT;

use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Update operations
    Update {
        #[command(subcommand)]
        action: UpdateCommands,
    },

    /// Print the version of a running service
    Version {
        /// Service host name or IP address
        #[arg(long, default_value = "localhost")]
        host: String,

        /// Service port
        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,
    },
}
