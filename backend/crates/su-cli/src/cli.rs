use crate::Commands;

use clap::Parser;

#[derive(Parser)]
#[command(name = "su")]
#[command(about = "Uploads new builds to a running su-service")]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}
