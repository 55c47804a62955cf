use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use graph::{DotRenderer, GitWalker, GraphConfig, Optimiser, Repository, RepositoryStats};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "gitgraph")]
#[command(about = "Draw simplified commit graphs of git repositories", long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the commit graph as Graphviz DOT
    Dot {
        /// Path to the repository
        #[arg(default_value = ".")]
        path: PathBuf,
        /// Skip the optimisation passes
        #[arg(long)]
        raw: bool,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show graph statistics before and after optimising
    Stats {
        /// Path to the repository
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// Resolve an abbreviated commit id
    Find {
        /// Path to the repository
        #[arg(default_value = ".")]
        path: PathBuf,
        /// Hex prefix of the commit id
        prefix: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let config = match &cli.config {
        Some(path) => GraphConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => GraphConfig::default(),
    };

    match cli.command {
        Commands::Dot { path, raw, output } => {
            let repo = load_repository(&path, &config)?;
            let repo = if raw {
                repo
            } else {
                Optimiser::new(&config)
                    .optimize(&repo)
                    .context("Failed to optimise commit graph")?
            };

            let renderer = DotRenderer::new();
            match output {
                Some(file) => {
                    let handle = File::create(&file)
                        .with_context(|| format!("Failed to create {}", file.display()))?;
                    let mut out = BufWriter::new(handle);
                    renderer.render(&repo, &mut out)?;
                    out.flush()?;
                    info!(path = %file.display(), "wrote graph");
                }
                None => {
                    let stdout = io::stdout();
                    let mut out = stdout.lock();
                    renderer.render(&repo, &mut out)?;
                }
            }
        }
        Commands::Stats { path } => {
            let repo = load_repository(&path, &config)?;
            let optimised = Optimiser::new(&config)
                .optimize(&repo)
                .context("Failed to optimise commit graph")?;

            println!("{:<12} {:>10} {:>10}", "", "raw", "optimised");
            print_stats(&repo.stats(), &optimised.stats());
        }
        Commands::Find { path, prefix } => {
            let repo = load_repository(&path, &config)?;
            match repo.find_commit(&prefix)? {
                Some(commit) => {
                    println!("{} {}", commit.id, repo.abbreviate(commit));
                    if let Some(parent) = commit.parent {
                        println!("parent       {}", parent);
                    }
                    if let Some(merge_parent) = commit.merge_parent {
                        println!("merge parent {}", merge_parent);
                    }
                }
                None => bail!("No commit matches {}", prefix),
            }
        }
    }

    Ok(())
}

fn load_repository(path: &Path, config: &GraphConfig) -> Result<Repository> {
    let path_str = path
        .to_str()
        .with_context(|| format!("Repository path is not valid UTF-8: {}", path.display()))?;
    let walker = GitWalker::new(Some(path_str))
        .with_context(|| format!("Failed to open repository at {}", path.display()))?
        .with_source(config.source.clone());

    let repo = Repository::import(&walker)
        .with_context(|| format!("Failed to read commit graph from {}", path.display()))?;
    Ok(repo.with_abbrev_min_len(config.abbrev_min_len))
}

fn print_stats(raw: &RepositoryStats, optimised: &RepositoryStats) {
    let rows = [
        ("commits", raw.total_commits, optimised.total_commits),
        ("merges", raw.merge_commits, optimised.merge_commits),
        ("roots", raw.root_commits, optimised.root_commits),
        ("leaves", raw.leaf_commits, optimised.leaf_commits),
        ("branches", raw.branches, optimised.branches),
        ("tags", raw.tags, optimised.tags),
    ];
    for (label, before, after) in rows {
        println!("{:<12} {:>10} {:>10}", label, before, after);
    }
}
