use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use shared::{collect, ArticleFetcher, WikipediaClient};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "collect-articles")]
#[command(about = "Collect random Wikipedia article summaries into local text files")]
struct Args {
    /// Directory to write article files into
    #[arg(short, long, default_value = "data")]
    output: PathBuf,

    /// Number of article files to create
    #[arg(short = 'n', long, default_value = "100")]
    count: u32,

    /// Wikipedia language edition to sample from
    #[arg(short, long, default_value = "en")]
    lang: String,

    /// Stop after this many fetch attempts instead of retrying forever
    #[arg(long)]
    max_attempts: Option<u64>,

    /// Seed the random number generator for a reproducible run
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.count == 0 {
        anyhow::bail!("--count must be at least 1");
    }

    println!(
        "📚 Collecting {} random article summaries from {}.wikipedia.org\n",
        args.count, args.lang
    );

    let client = WikipediaClient::new(&args.lang)?;
    let fetcher = ArticleFetcher::new(client);

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let report = collect(
        &fetcher,
        &mut rng,
        &args.output,
        args.count,
        args.max_attempts,
    )
    .await
    .context("Failed to collect articles")?;

    if report.exhausted {
        anyhow::bail!(
            "Gave up after {} attempts with {} of {} files written",
            report.attempts,
            report.files_created,
            args.count
        );
    }

    println!(
        "\n✅ Saved {} files to {}",
        report.files_created,
        args.output.display()
    );

    Ok(())
}
