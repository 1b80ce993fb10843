use std::process;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::error;

use feed_relay::cli::{Cli, Commands};
use feed_relay::config::{self, Config};
use feed_relay::domain::FeedGroup;
use feed_relay::errors::RelayResult;
use feed_relay::logging::init_logging;
use feed_relay::services::{ConsoleNotifier, RelayService, TelegramNotifier};
use feed_relay::sources::RssAtomSource;
use feed_relay::storage::json::format_timestamp;
use feed_relay::storage::{JsonTimestampRepository, TimestampRepository};

fn main() {
    // Before parsing, so .env can provide FEED_RELAY_CONFIG
    config::load_dotenv();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config.display()))?;

    // Dropped when run returns, flushing the log before the process exits
    let _guard = init_logging(&config.log_path, &config.log_level)
        .with_context(|| format!("opening log file {}", config.log_path.display()))?;

    let result = match cli.command {
        Commands::Run { dry_run } => cmd_run(&config, dry_run),
        Commands::List => cmd_list(&config),
    };

    if let Err(e) = &result {
        error!("An error occurred: {}", e);
    }

    Ok(result?)
}

fn cmd_run(config: &Config, dry_run: bool) -> RelayResult<()> {
    let fetcher = RssAtomSource::new(config.request_timeout)?;
    let store = JsonTimestampRepository::new(&config.state_path);

    println!("Fetching feeds...\n");

    let summary = if dry_run {
        let mut preview = config.clone();
        preview.send_interval = Duration::ZERO;
        let notifier = ConsoleNotifier::new(config.telegram.format);

        RelayService::new(&preview, fetcher, notifier, store)
            .with_persist(false)
            .run()?
    } else {
        let notifier = TelegramNotifier::new(config)?;

        RelayService::new(config, fetcher, notifier, store).run()?
    };

    if dry_run {
        println!("Dry run complete. Would notify {} entries.", summary.sent);
    } else {
        println!(
            "Notified {} entries ({} failed).",
            summary.sent, summary.send_failures
        );
    }

    if summary.feeds_failed > 0 {
        println!(
            "{} feeds could not be fetched; see {}",
            summary.feeds_failed,
            config.log_path.display()
        );
    }

    Ok(())
}

fn cmd_list(config: &Config) -> RelayResult<()> {
    if config.feeds.is_empty() {
        println!("No feeds configured.");
        return Ok(());
    }

    let timestamps = JsonTimestampRepository::new(&config.state_path).load();

    for group in FeedGroup::ORDER {
        let mut feeds = config.feeds_in(group).peekable();
        if feeds.peek().is_none() {
            continue;
        }

        println!("{} feeds:\n", group);
        for feed in feeds {
            let last_seen = timestamps
                .get(&feed.name)
                .map(format_timestamp)
                .unwrap_or_else(|| "never".to_string());

            println!("  {}", feed.name);
            println!("    URL: {}", feed.url);
            println!("    Last seen: {}", last_seen);
        }
        println!();
    }

    if !config.keywords.is_empty() {
        let keywords: Vec<_> = config.keywords.iter().collect();
        println!("Keywords: {}", keywords.join(", "));
    }

    Ok(())
}
