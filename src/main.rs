use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use gitmap_core::{CommitDetailsCache, GitDetailsFetcher, SnapshotSource};
use graph::RepoModel;

#[derive(Parser)]
#[command(name = "gitmap")]
#[command(about = "Reconstructs a labeled branch topology from raw Git history", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List reconstructed branches in display order
    Branches {
        /// Path to the repository
        #[arg(default_value = ".")]
        path: PathBuf,
        /// Number of commits to load
        #[arg(short = 'n', long, default_value = "500")]
        count: usize,
        /// Print the branch records as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print commit rows with their lanes
    Log {
        /// Path to the repository
        #[arg(default_value = ".")]
        path: PathBuf,
        /// Number of commits to load
        #[arg(short = 'n', long, default_value = "500")]
        count: usize,
    },
    /// Show reconstruction statistics
    Stats {
        /// Path to the repository
        #[arg(default_value = ".")]
        path: PathBuf,
        /// Number of commits to load
        #[arg(short = 'n', long, default_value = "500")]
        count: usize,
    },
    /// List the files changed by a commit
    Files {
        /// Path to the repository
        #[arg(default_value = ".")]
        path: PathBuf,
        /// Commit id
        commit: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Branches { path, count, json } => {
            let model = reconstruct_from(&path, count)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&model.branch_records)?);
            } else {
                for record in &model.branch_records {
                    let branch = model.branch(&record.id);
                    let mut flags = Vec::new();
                    if branch.map(|b| b.is_active).unwrap_or(false) {
                        flags.push("active");
                    }
                    if branch.map(|b| b.is_remote).unwrap_or(false) {
                        flags.push("remote");
                    }
                    if record.is_multi_branch {
                        flags.push("multi");
                    }
                    let flags = if flags.is_empty() {
                        String::new()
                    } else {
                        format!(" [{}]", flags.join(","))
                    };
                    println!(
                        "lane {:>2}  rows {:>4}-{:<4} {}{}",
                        record.column, record.tip_row, record.first_row, record.name, flags
                    );
                    if record.is_multi_branch {
                        println!("         candidates: {}", record.candidate_names.join(", "));
                    }
                }
            }
        }
        Commands::Log { path, count } => {
            let model = reconstruct_from(&path, count)?;
            for record in &model.commit_records {
                let mut lanes = String::new();
                for column in 0..model.width {
                    lanes.push(if column == record.column { '●' } else { ' ' });
                    lanes.push(' ');
                }
                let commit = model.arena.get(&record.id);
                let subject = commit.map(|c| c.subject.as_str()).unwrap_or("");
                let short = commit.map(|c| c.short_id.as_str()).unwrap_or("");
                let branch = commit
                    .and_then(|c| c.branch_name.as_deref())
                    .unwrap_or("?");
                println!("{} {} {} ({})", lanes, short, subject, branch);
            }
        }
        Commands::Stats { path, count } => {
            let model = reconstruct_from(&path, count)?;
            let stats = model.stats();
            println!("Commits:      {}", stats.commits);
            println!("Branches:     {}", stats.branches);
            println!("Placeholders: {}", stats.placeholders);
            println!("Connectors:   {}", stats.connectors);
            println!("Lanes:        {}", stats.width);
        }
        Commands::Files { path, commit } => {
            let fetcher = GitDetailsFetcher::open(&path)?;
            let cache = CommitDetailsCache::new(Arc::new(fetcher));
            let runtime = tokio::runtime::Runtime::new()?;
            let files = runtime.block_on(cache.changed_files(&commit));
            if files.is_empty() {
                println!("No changed files recorded for {}", commit);
            } else {
                for file in files.iter() {
                    println!("{}", file);
                }
            }
        }
    }

    Ok(())
}

fn reconstruct_from(path: &PathBuf, count: usize) -> Result<RepoModel> {
    let source = SnapshotSource::open(path)?;
    let snapshot = source.snapshot(count)?;
    Ok(graph::reconstruct(&snapshot)?)
}
