use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::io;
use std::path::PathBuf;

mod command;
mod config;
mod fs_store;

use command::{CompareKind, FilterSelector, Output};
use config::OptionsArgs;
pub use fs_store::FsStore;

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| {
            if text.ends_with('\n') {
                Ok(())
            } else {
                stdout.write_all(b"\n")
            }
        })
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "policy-compare")]
#[command(about = "Compare policies, tools, modules, schemas and documents", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Store directory (policies/, tools/, schemas/, ...)
    #[arg(long, global = true, default_value = ".")]
    store: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for results)
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare the first model against each of the others
    Compare(CompareArgs),

    /// Find a block pattern of one policy inside others
    Search(SearchArgs),

    /// Structural hashes, and similarity to the first policy
    Hash(HashArgs),
}

#[derive(Args)]
struct CompareArgs {
    #[arg(value_enum)]
    kind: CompareKind,

    /// Model ids; the first one is the left side
    #[arg(required = true, num_args = 2..)]
    ids: Vec<String>,

    /// CSV report instead of JSON
    #[arg(long, conflicts_with = "merge")]
    csv: bool,

    /// Merge pairwise results into one multi-column report
    #[arg(long)]
    merge: bool,

    #[command(flatten)]
    options: OptionsArgs,
}

#[derive(Args)]
struct SearchArgs {
    /// Policies to search in
    #[arg(required = true)]
    ids: Vec<String>,

    /// Policy holding the filter block
    #[arg(long)]
    filter: String,

    /// Tag of the filter block
    #[arg(long, conflicts_with = "path", required_unless_present = "path")]
    tag: Option<String>,

    /// Dot-separated sibling indices of the filter block, e.g. 0.1
    #[arg(long)]
    path: Option<String>,

    /// Maximum number of results
    #[arg(long, default_value_t = 10)]
    limit: usize,

    /// Minimum average pair score when searching several policies
    #[arg(long, default_value_t = 0)]
    threshold: u32,
}

#[derive(Args)]
struct HashArgs {
    #[arg(required = true)]
    ids: Vec<String>,

    /// Minimum similarity for a match
    #[arg(long, default_value_t = 0)]
    threshold: u32,
}

pub async fn main_entry() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let store = FsStore::new(&cli.store);
    log::debug!("Using store {}", store.root().display());

    let text = match cli.command {
        Commands::Compare(args) => {
            let output = if args.csv {
                Output::Csv
            } else if args.merge {
                Output::Merged
            } else {
                Output::Pairs
            };
            let options = args.options.resolve()?;
            command::run_compare(&store, args.kind, &args.ids, options, output).await?
        }
        Commands::Search(args) => {
            let selector = match (args.tag, args.path) {
                (Some(tag), _) => FilterSelector::Tag(tag),
                (None, Some(path)) => FilterSelector::Path(FilterSelector::parse_path(&path)?),
                (None, None) => anyhow::bail!("search needs --tag or --path"),
            };
            command::run_search(&store, &args.ids, &args.filter, &selector, args.limit, args.threshold)
                .await?
        }
        Commands::Hash(args) => command::run_hash(&store, &args.ids, args.threshold).await?,
    };
    print_stdout(&text)
}
