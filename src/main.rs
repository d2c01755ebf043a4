//! yt-tracker CLI entry point

use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::path::PathBuf;
use std::time::Duration;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use yt_tracker::{
    commands::{
        cmd_collect, cmd_compare, cmd_dashboard, cmd_init, cmd_status, print_collect_stats,
        print_compare_report, print_init_report, print_status, today_in, watch_dashboard,
        CompareOptions, InitOptions,
    },
    config::{Config, LOCAL_CONFIG_FILE},
    dashboard::{print_dashboard, DashboardOptions, DashboardState, HistoryCache, SortKey},
    error::Result,
    metrics::{Metric, Mode},
    progress::LogWriterFactory,
    youtube::YouTubeClient,
};

#[derive(Parser)]
#[command(name = "yt-tracker")]
#[command(version, about = "Daily YouTube statistics collector and dashboard", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config, an input template and the data directory
    Init {
        /// Force overwrite existing config
        #[arg(long)]
        force: bool,
    },

    /// Fetch today's statistics for every tracked video
    Collect,

    /// Show the dashboard for the recorded history
    Dashboard {
        /// Only show videos from this channel
        #[arg(long)]
        channel: Option<String>,

        /// Metric to chart
        #[arg(short, long, value_enum, default_value = "views")]
        metric: Metric,

        /// Cumulative values or daily increases
        #[arg(long, value_enum, default_value = "cumulative")]
        mode: Mode,

        /// First day of the range (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Last day of the range (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,

        /// Card ordering
        #[arg(long, value_enum, default_value = "published")]
        sort: SortKey,

        /// Keep re-rendering; type 'r' + Enter to refresh, 'q' + Enter to quit
        #[arg(short, long)]
        watch: bool,
    },

    /// Compare videos over a date range
    Compare {
        /// Video URLs or IDs (all videos when omitted)
        video: Vec<String>,

        /// Metric to compare
        #[arg(short, long, value_enum, default_value = "views")]
        metric: Metric,

        /// Cumulative values or daily increases
        #[arg(long, value_enum, default_value = "incremental")]
        mode: Mode,

        /// First day of the range (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Last day of the range (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,
    },

    /// Show configuration and history status
    Status,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        if e.is_startup() {
            println!("{}", e);
        }
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // .env is optional
    dotenv::dotenv().ok();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(LogWriterFactory))
        .with(filter)
        .init();

    // Init and completions run without an existing config
    if let Commands::Init { force } = cli.command {
        let report = cmd_init(InitOptions {
            base_dir: PathBuf::from("."),
            config_path: cli
                .config
                .clone()
                .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG_FILE)),
            force,
        })?;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print_init_report(&report);
        }
        return Ok(());
    }

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "yt-tracker", &mut std::io::stdout());
        return Ok(());
    }

    let config = Config::discover(cli.config.as_deref())?;

    match cli.command {
        Commands::Init { .. } | Commands::Completions { .. } => unreachable!(),

        Commands::Collect => {
            let api_key = config.api_key()?;
            let client = YouTubeClient::new(&config.api, api_key)?;
            let today = today_in(config.tz()?);

            let stats = cmd_collect(&config, &client, today, cli.json).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                print_collect_stats(&stats);
            }
        }

        Commands::Dashboard {
            channel,
            metric,
            mode,
            from,
            to,
            sort,
            watch,
        } => {
            let options = DashboardOptions {
                channel,
                metric,
                mode,
                from,
                to,
                sort,
            };
            let tz = config.tz()?;
            let mut cache = HistoryCache::new(
                config.history_path(),
                Duration::from_secs(config.dashboard.cache_ttl_secs),
            );
            let width = config.dashboard.sparkline_width;
            let json = cli.json;
            let show = move |state: &DashboardState| -> Result<()> {
                if json {
                    println!("{}", serde_json::to_string_pretty(state)?);
                } else {
                    print_dashboard(state, width);
                }
                Ok(())
            };

            if watch {
                let stdin = tokio::io::BufReader::new(tokio::io::stdin());
                let refresh = Duration::from_secs(config.dashboard.refresh_secs);
                watch_dashboard(&mut cache, &options, tz, refresh, stdin, show).await?;
            } else {
                show(&cmd_dashboard(&mut cache, &options, tz)?)?;
            }
        }

        Commands::Compare {
            video,
            metric,
            mode,
            from,
            to,
        } => {
            let options = CompareOptions {
                videos: video,
                metric,
                mode,
                from,
                to,
            };

            let report = cmd_compare(&config, options)?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_compare_report(&report);
            }
        }

        Commands::Status => {
            let status = cmd_status(&config)?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                print_status(&status);
            }
        }
    }

    Ok(())
}
