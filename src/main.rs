use allv_analytics::aggregations::{aggregate_daily, aggregate_daily_by_series};
use allv_analytics::charts::{PostsOverTime, StackedActivity};
use allv_analytics::reports::ReportGenerator;
use allv_core::config::AppConfig;
use allv_core::seed::DemoSeeder;
use allv_core::store::Directory;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "allv",
    about = "Manage users and posts and chart their daily activity",
    version,
    author
)]
struct Cli {
    /// Path to config file (default: ~/.config/allv/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the snapshot file holding users and posts
    #[arg(long, global = true)]
    data_file: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (default)
    Serve {
        /// Bind host
        #[arg(long)]
        host: Option<String>,
        /// Bind port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Replace all data with reproducible demo users and posts
    Seed {
        /// Generator seed
        #[arg(long)]
        seed: Option<u64>,
        /// Number of demo users (at most 10)
        #[arg(long)]
        users: Option<usize>,
    },

    /// Print chart data as JSON
    Chart {
        /// One stacked series per author instead of a single total
        #[arg(long)]
        by_author: bool,
    },

    /// Print a markdown activity report
    Report,

    /// Show or manage configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Initialize default configuration file
    Init,
    /// Print config file path
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up tracing.
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| "allv=info,warn".into()))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Load config.
    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };

    // Apply CLI overrides.
    if let Some(data_file) = &cli.data_file {
        config.storage.data_file = Some(data_file.clone());
    }

    tracing::debug!(data_file = %config.data_file().display(), "Loaded configuration");

    match cli.command {
        Some(Commands::Serve { host, port }) => {
            if let Some(h) = host {
                config.server.host = h;
            }
            if let Some(p) = port {
                config.server.port = p;
            }
            allv_server::serve(config).await?;
        }
        Some(Commands::Seed { seed, users }) => {
            let seed = seed.unwrap_or(config.seed.seed);
            let users = users.unwrap_or(config.seed.users);
            let mut directory = Directory::open(&config)?;
            let summary = DemoSeeder::new(seed, chrono::Utc::now())
                .with_users(users)
                .seed(&mut directory)?;
            println!(
                "Seeded {} users and {} posts into {}",
                summary.users,
                summary.posts,
                config.data_file().display()
            );
            let daily = aggregate_daily(directory.post_timestamps());
            print!("{}", ReportGenerator::text_summary(&daily));
        }
        Some(Commands::Chart { by_author }) => {
            let directory = Directory::open(&config)?;
            let max_ticks = config.charts.max_ticks;
            let json = if by_author {
                let activity = aggregate_daily_by_series(directory.post_timestamps_by_author())
                    .with_labels(&directory.author_names());
                serde_json::to_string_pretty(&StackedActivity::from_series(&activity, max_ticks))?
            } else {
                let activity = aggregate_daily(directory.post_timestamps());
                serde_json::to_string_pretty(&PostsOverTime::from_activity(&activity, max_ticks))?
            };
            println!("{}", json);
        }
        Some(Commands::Report) => {
            let directory = Directory::open(&config)?;
            let daily = aggregate_daily(directory.post_timestamps());
            let by_author = aggregate_daily_by_series(directory.post_timestamps_by_author())
                .with_labels(&directory.author_names());
            print!("{}", ReportGenerator::activity_report(&daily, &by_author));
        }
        Some(Commands::Config { action }) => {
            handle_config_command(action, &config)?;
        }
        None => {
            allv_server::serve(config).await?;
        }
    }

    Ok(())
}

fn handle_config_command(action: Option<ConfigAction>, config: &AppConfig) -> Result<()> {
    match action {
        Some(ConfigAction::Show) | None => {
            let toml_str = toml::to_string_pretty(config)?;
            println!("{}", toml_str);
        }
        Some(ConfigAction::Init) => {
            let path = AppConfig::default_path();
            if path.exists() {
                println!("Config already exists at: {}", path.display());
            } else {
                config.save()?;
                println!("Created default config at: {}", path.display());
            }
        }
        Some(ConfigAction::Path) => {
            println!("{}", AppConfig::default_path().display());
        }
    }
    Ok(())
}
