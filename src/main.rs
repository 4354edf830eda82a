use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use chrono::Datelike;
use clap::Parser;

use gocomics_fetch::{get_comic_image, ComicImage, ComicRequest, HttpFetcher, RetrieveMode};

/// Print the image URL (or download the image) of a gocomics.com strip.
#[derive(Debug, Parser)]
#[command(name = "gocomics-fetch", version)]
struct Cli {
    /// Name of the comic, e.g. "calvinandhobbes"
    #[arg(long)]
    comic_name: String,

    /// Year of the comic (defaults to the current year)
    #[arg(long)]
    year: Option<i32>,

    /// Month of the comic (defaults to the current month)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    month: Option<u32>,

    /// Day of the comic (defaults to the current day)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=31))]
    day: Option<u32>,

    /// Print only the image URL instead of downloading the image
    #[arg(long)]
    url_only: bool,

    /// Write the image here instead of stdout (ignored with --url-only)
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Give up on the whole lookup after this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let today = chrono::Local::now().date_naive();
    let year = cli.year.unwrap_or_else(|| today.year());
    let month = cli.month.unwrap_or_else(|| today.month());
    let day = cli.day.unwrap_or_else(|| today.day());

    let request = ComicRequest::new(&cli.comic_name, year, month, day)?;
    let mode = if cli.url_only {
        RetrieveMode::UrlOnly
    } else {
        RetrieveMode::ImageBytes
    };

    let fetcher = HttpFetcher::from_env().context("failed to build HTTP client")?;
    let lookup = get_comic_image(&fetcher, &request, mode);
    let image = match cli.timeout_secs {
        Some(secs) => tokio::time::timeout(Duration::from_secs(secs), lookup)
            .await
            .with_context(|| format!("gave up after {secs}s"))?,
        None => lookup.await,
    }
    .context("Error fetching comic image")?;

    match image {
        ComicImage::Url(url) => println!("{}", url),
        ComicImage::Bytes(bytes) => match cli.output {
            Some(path) => {
                tokio::fs::write(&path, &bytes)
                    .await
                    .with_context(|| format!("failed to write {}", path.display()))?;
                tracing::info!("wrote {} bytes to {}", bytes.len(), path.display());
            }
            None => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(&bytes)?;
                stdout.flush()?;
            }
        },
    }

    Ok(())
}
