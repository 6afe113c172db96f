use crate::commands::Commands;

use clap::Parser;

#[derive(Parser)]
#[command(name = "tale")]
#[command(about = "Run and upgrade a tale blog installation")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub(crate) command: Commands,
}
