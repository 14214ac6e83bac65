use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::warn;

use webbot::infrastructure::{
    AppConfig, ConfigManager, HttpClient, HttpClientConfig, init_logging_with_config, url_filename,
};
use webbot::WebBot;

#[derive(Parser)]
#[command(
    name = "webbot",
    about = "WebBot - fetch a batch of pages and extract delimited fields",
    version
)]
struct Cli {
    /// Configuration file (defaults to the per-user config location)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch targets and extract the text between two markers
    Fetch {
        /// Target as ID=URL (or just URL, used as its own ID). Can be repeated.
        #[arg(long = "target", short = 't', value_parser = parse_target, required = true)]
        targets: Vec<(String, String)>,
        /// Start marker
        #[arg(long, default_value = "<title>")]
        start: String,
        /// End marker
        #[arg(long, default_value = "</title>")]
        end: String,
        /// Store each extracted value in the storage directory
        #[arg(long)]
        store: bool,
        /// Override the delay between fetches (seconds)
        #[arg(long)]
        delay: Option<f64>,
        /// Prefix scheme-less URLs with https://
        #[arg(long)]
        force_https: bool,
    },
    /// Issue a HEAD request and print the response status
    Head {
        url: String,
        /// Timeout in seconds (values below 0.1 use 60)
        #[arg(long, default_value = "0")]
        timeout: f64,
    },
    /// Write the default configuration file
    InitConfig,
}

/// `ID=URL` when the text before the first `=` is a plain identifier,
/// otherwise the whole value is a URL used as its own ID.
fn parse_target(value: &str) -> Result<(String, String), String> {
    match value.split_once('=') {
        Some((id, _)) if id.trim().is_empty() => Err(format!("missing target ID in {value:?}")),
        Some((id, url)) if is_plain_id(id) => Ok((id.trim().to_string(), url.to_string())),
        _ => Ok((value.to_string(), value.to_string())),
    }
}

fn is_plain_id(id: &str) -> bool {
    !id.contains(['/', '?', ':', '.'])
}

fn config_manager(path: Option<PathBuf>) -> Result<ConfigManager> {
    match path {
        Some(path) => Ok(ConfigManager::with_path(path)),
        None => ConfigManager::new(),
    }
}

async fn load_config(path: Option<PathBuf>) -> AppConfig {
    match config_manager(path) {
        Ok(manager) => match manager.load_config().await {
            Ok(config) => config,
            Err(e) => {
                eprintln!("⚠️  Failed to load configuration ({e:#}), using defaults");
                AppConfig::default()
            }
        },
        Err(e) => {
            eprintln!("⚠️  No configuration location ({e:#}), using defaults");
            AppConfig::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::InitConfig = cli.command {
        let manager = config_manager(cli.config)?;
        manager.save_config(&AppConfig::default()).await?;
        println!("Wrote default configuration to {}", manager.config_path().display());
        return Ok(());
    }

    let mut config = load_config(cli.config).await;
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    init_logging_with_config(&config.logging).context("Failed to initialize logging")?;

    match cli.command {
        Commands::Fetch {
            targets,
            start,
            end,
            store,
            delay,
            force_https,
        } => {
            let mut bot_config = config.bot;
            if let Some(delay) = delay {
                bot_config.delay_between_fetches_seconds = delay;
            }
            bot_config.force_https |= force_https;

            let mut bot = WebBot::new(targets, bot_config)?;
            let summary = bot.execute().await;

            let documents: Vec<_> = bot
                .documents()
                .map(|(_, document)| document.clone())
                .collect();

            for document in &documents {
                let response = document.response();
                println!(
                    "[{}] {} -> {} {}",
                    document.id(),
                    document.url(),
                    response.status_code(),
                    response.status_message()
                );

                let Some(found) = document.find(&start, &end) else {
                    println!("    Data not found");
                    continue;
                };
                println!("    {}", found.value);
                if let Some(raw) = &found.raw {
                    println!("    raw: {raw}");
                }

                if store {
                    let filename = url_filename(document.url(), "dat");
                    match bot.store(&filename, found.value.as_bytes()).await {
                        Ok(path) => println!("    Data saved to {}", path.display()),
                        Err(e) => println!("    Failed to save data: {e}"),
                    }
                }
            }

            println!(
                "{} distinct, {} succeeded, {} failed",
                summary.total_distinct, summary.total_succeeded, summary.total_failed
            );
            if let Some(error) = bot.last_error() {
                warn!("Run finished with error: {}", error);
                anyhow::bail!("{error}");
            }
        }
        Commands::Head { url, timeout } => {
            let client = HttpClient::with_config(HttpClientConfig {
                user_agent: config.bot.user_agent,
                ..HttpClientConfig::default()
            })?;
            let response = client.head(&url, timeout).await;

            if response.success() {
                println!("Successful request");
            } else {
                println!(
                    "Error: request failed, status code: {}",
                    response.status_code()
                );
            }
            println!("Status:  {} {}", response.status_code(), response.status_message());
            println!("MIME:    {}", response.mime_type());
            println!("Charset: {}", response.charset());
            for line in response.raw_headers() {
                println!("  {line}");
            }
        }
        Commands::InitConfig => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("a=localhost:5000/ok", "a", "localhost:5000/ok")]
    #[case("id=example.com/?a=b", "id", "example.com/?a=b")]
    #[case(" a =example.com", "a", "example.com")]
    #[case("example.com/search?q=rust", "example.com/search?q=rust", "example.com/search?q=rust")]
    #[case("http://example.com?x=1", "http://example.com?x=1", "http://example.com?x=1")]
    #[case("example.com", "example.com", "example.com")]
    fn test_parse_target(#[case] input: &str, #[case] id: &str, #[case] url: &str) {
        assert_eq!(parse_target(input), Ok((id.to_string(), url.to_string())));
    }

    #[test]
    fn test_parse_target_without_id() {
        assert!(parse_target("=example.com").is_err());
    }
}
