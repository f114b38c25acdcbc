mod pipeline;
mod schedule;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::pipeline::RunOptions;

#[derive(Debug, Parser)]
#[command(name = "dailybrief")]
#[command(about = "Daily brokerage research briefing")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Collect, summarize and publish today's briefing (the default)
    Run {
        /// Print the briefing instead of publishing it
        #[arg(long)]
        dry_run: bool,

        /// Run even on a weekend
        #[arg(long)]
        force: bool,

        /// Days of listings to include, today included
        #[arg(long)]
        lookback_days: Option<u32>,
    },
    /// Collect listings and print the keyword analysis without summarizing
    Collect {
        /// Days of listings to include, today included
        #[arg(long)]
        lookback_days: Option<u32>,
    },
    /// Extract the text of a single report
    Extract {
        /// HTML report page
        #[arg(long)]
        url: Option<String>,

        /// PDF attachment
        #[arg(long)]
        pdf_url: Option<String>,

        /// Issuing brokerage; Shinhan pages get relaxed thresholds
        #[arg(long, default_value = "")]
        company: String,
    },
    /// Run the briefing on the configured cron schedule until Ctrl-C
    Schedule,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    let config = dailybrief_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        None => {
            pipeline::run(&config, &RunOptions::default()).await?;
        }
        Some(Commands::Run {
            dry_run,
            force,
            lookback_days,
        }) => {
            let options = RunOptions {
                dry_run,
                force,
                lookback_days,
            };
            pipeline::run(&config, &options).await?;
        }
        Some(Commands::Collect { lookback_days }) => {
            pipeline::collect_only(&config, lookback_days).await?;
        }
        Some(Commands::Extract {
            url,
            pdf_url,
            company,
        }) => {
            if url.is_none() && pdf_url.is_none() {
                anyhow::bail!("extract needs --url or --pdf-url");
            }
            pipeline::extract_one(&config, url, pdf_url, company).await?;
        }
        Some(Commands::Schedule) => {
            schedule::run_scheduled(config).await?;
        }
    }

    Ok(())
}
