use std::path::PathBuf;

use anyhow::Context;
use chrono::SecondsFormat;
use evonet_stats::descriptive::DescriptiveStats;
use evonet_store::{FileStore, ScoreEntry, ScoreHistory};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ScoresArg {
    /// Store directory
    #[arg(long)]
    store: PathBuf,
    /// Only show scores of this game
    #[arg(long)]
    game: Option<String>,
    /// Maximum number of entries to show
    #[arg(long, default_value_t = 10)]
    limit: usize,
}

pub(crate) fn run(arg: &ScoresArg) -> anyhow::Result<()> {
    let store = FileStore::open(&arg.store)
        .with_context(|| format!("Failed to open store: {}", arg.store.display()))?;
    let history = ScoreHistory::load(&store)?;

    let entries: Vec<&ScoreEntry> = match &arg.game {
        Some(game) => history.top_scores(game, arg.limit).collect(),
        None => history.entries().iter().take(arg.limit).collect(),
    };
    if entries.is_empty() {
        eprintln!("No scores recorded");
        return Ok(());
    }

    println!("{:>4}  {:<8} {:>10} {:>10}  recorded", "rank", "game", "score", "generation");
    for (rank, entry) in entries.iter().enumerate() {
        let generation = entry
            .generation
            .map_or_else(|| "-".to_owned(), |g| g.to_string());
        println!(
            "{:>4}  {:<8} {:>10.3} {:>10}  {}",
            rank + 1,
            entry.game,
            entry.score,
            generation,
            entry.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
        );
    }

    if let Some(stats) = DescriptiveStats::new(entries.iter().map(|e| e.score)) {
        eprintln!();
        eprintln!("Score Stats:");
        eprintln!("  Count:  {}", stats.count);
        eprintln!("  Max:    {:.3}", stats.max);
        eprintln!("  Median: {:.3}", stats.median);
        eprintln!("  Mean:   {:.3}", stats.mean);
    }
    Ok(())
}
