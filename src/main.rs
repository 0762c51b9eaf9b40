mod aggregate;
mod channels;
mod error;
mod fetch;
mod models;
mod parser;
mod pipeline;
mod settings;
mod store;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};

use crate::fetch::HtmlFetcher;
use crate::pipeline::Pipeline;
use crate::settings::Settings;

#[derive(Parser)]
#[command(name = "ondemand_scraper", about = "On-demand series catalog scraper")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape every category, then combine the per-category files
    Run {
        /// Category list (JSON array of {Categoria, Link})
        #[arg(short, long)]
        categories: Option<PathBuf>,
        /// Directory for <category>_movies.json files
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        /// Combined output file
        #[arg(long)]
        combined: Option<PathBuf>,
        /// Max simultaneous requests
        #[arg(short = 'j', long)]
        concurrency: Option<usize>,
    },
    /// Combine existing per-category files only
    Combine {
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        #[arg(long)]
        combined: Option<PathBuf>,
    },
    /// Fill channel names and descriptions into a channel catalog
    Channels {
        #[arg(short, long)]
        input: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let mut settings = Settings::load()?;

    let result = match cli.command {
        Commands::Run {
            categories,
            output_dir,
            combined,
            concurrency,
        } => {
            if let Some(p) = categories {
                settings.categories_file = p;
            }
            if let Some(d) = output_dir {
                settings.output_dir = d;
            }
            if combined.is_some() {
                settings.combined_file = combined;
            }
            if let Some(n) = concurrency {
                settings.max_concurrency = n;
            }

            let combined_file = settings.combined_path();
            let crawl = Pipeline::new(HtmlFetcher::new(&settings)?, &settings);
            let report = pipeline::run_series(
                &crawl,
                &settings.categories_file,
                &combined_file,
                Some(pipeline::progress_bar(0)),
            )
            .await?;
            println!(
                "Done: {} categories saved, {} skipped, {} combined into {:?}",
                report.finished.len(),
                report.skipped,
                report.combined.len(),
                combined_file
            );
            Ok(())
        }
        Commands::Combine {
            output_dir,
            combined,
        } => {
            let combined_file = combined.unwrap_or_else(|| settings.combined_path());
            let output_dir = output_dir.unwrap_or(settings.output_dir);
            let merged = aggregate::combine(&output_dir, &combined_file)?;
            println!("Combined {} files into {:?}", merged.len(), combined_file);
            Ok(())
        }
        Commands::Channels { input, output } => {
            let input = input.unwrap_or(settings.channels_input.clone());
            let output = output.unwrap_or(settings.channels_output.clone());
            let fetcher = HtmlFetcher::new(&settings)?;
            let catalog = channels::run_channels(&fetcher, &input, &output).await?;
            println!("Updated {} channels in {:?}", catalog.channel_count(), output);
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
