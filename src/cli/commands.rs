use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "feed-relay")]
#[command(about = "Relay new syndication feed entries to a Telegram channel")]
#[command(version)]
pub struct Cli {
    /// Path to the YAML configuration file
    #[arg(
        short,
        long,
        global = true,
        env = "FEED_RELAY_CONFIG",
        default_value = "feed-relay.yaml"
    )]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch all feeds and send new entries to Telegram
    Run {
        /// Dry run - print messages instead of sending them and keep stored timestamps
        #[arg(long)]
        dry_run: bool,
    },

    /// List configured feeds with their last-seen timestamps
    List,
}
