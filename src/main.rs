use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use tracing_subscriber::EnvFilter;

use tienet::config;
use tienet::io;
use tienet::merge::{merge_networks, DuplicateMode, NetworkStamp};
use tienet::model::{Network, NetworkId};

/// Deterministic merge engine for tie-point control networks
///
/// A control network records tie-point measurements across a set of
/// images of one target body. tienet folds several networks into one,
/// resolving conflicts under explicit policy flags and writing an
/// auditable conflict report.
///
/// MERGE RULES:
///   - The first input (or --base) becomes the base; later networks
///     fold in left-to-right and win ties according to the flags
///   - Edit-locked points and measures are never overridden
///   - By default duplicate point ids are an error; pass
///     --duplicates merge to resolve them under the overwrite flags
///
/// QUICK START:
///
///   tienet merge base.json extra.json -o merged.json
///
///   # Merge duplicate points, replacing non-reference measures,
///   # and write a conflict report:
///   tienet merge base.json extra.json -o merged.json \
///       --duplicates merge --overwrite-measures --log conflicts.json
#[derive(Parser)]
#[command(name = "tienet")]
#[command(version, about)]
#[command(propagate_version = true)]
#[command(after_help = "See 'tienet <command> --help' for more information on a specific command.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge control networks into one
    Merge(MergeArgs),

    /// Summarize a control network file
    Info {
        /// Network file to summarize
        network: PathBuf,
    },

    /// Generate shell completions
    Completions {
        /// The shell to generate completions for
        shell: Shell,
    },
}

#[derive(clap::Args)]
struct MergeArgs {
    /// Input network files, in merge order
    #[arg(required = true)]
    networks: Vec<PathBuf>,

    /// Explicit base network; moved to the front of the input list
    #[arg(long)]
    base: Option<PathBuf>,

    /// Where to write the merged network
    #[arg(short, long)]
    output: PathBuf,

    /// Where to write the conflict report (enables reporting)
    #[arg(long)]
    log: Option<PathBuf>,

    /// Network id stamped onto the output (default: the base's id)
    #[arg(long)]
    network_id: Option<String>,

    /// Description stamped onto the output
    #[arg(long, default_value = "")]
    description: String,

    /// Duplicate point-id handling (overrides the config file)
    #[arg(long, value_enum)]
    duplicates: Option<DuplicatesOpt>,

    /// Replace scalar point fields from incoming points
    #[arg(long)]
    overwrite_points: bool,

    /// Replace conflicting non-reference measures
    #[arg(long)]
    overwrite_measures: bool,

    /// Allow the reference measure to be replaced or re-designated
    #[arg(long)]
    overwrite_reference: bool,

    /// Remove base measures absent from incoming points
    #[arg(long)]
    overwrite_missing: bool,

    /// Config file (default: ./tienet.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,
}

/// CLI spelling of [`DuplicateMode`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum DuplicatesOpt {
    /// Fail on duplicate point ids
    Error,
    /// Merge duplicate points under the overwrite flags
    Merge,
}

impl From<DuplicatesOpt> for DuplicateMode {
    fn from(opt: DuplicatesOpt) -> Self {
        match opt {
            DuplicatesOpt::Error => Self::Error,
            DuplicatesOpt::Merge => Self::Merge,
        }
    }
}

fn main() -> Result<()> {
    init_tracing();
    match Cli::parse().command {
        Commands::Merge(args) => run_merge(&args),
        Commands::Info { network } => run_info(&network),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_owned();
            clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
            Ok(())
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("TIENET_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_merge(args: &MergeArgs) -> Result<()> {
    let files = assemble_inputs(args)?;

    let config = config::load(args.config.as_deref())?;
    let mut policy = config.merge.to_policy(args.log.is_some());
    if let Some(duplicates) = args.duplicates {
        policy.duplicates = duplicates.into();
    }
    policy.overwrite_points |= args.overwrite_points;
    policy.overwrite_measures |= args.overwrite_measures;
    policy.overwrite_reference |= args.overwrite_reference;
    policy.overwrite_missing |= args.overwrite_missing;

    let mut sources = Vec::with_capacity(files.len());
    for file in &files {
        let network = io::read_network(file)
            .with_context(|| format!("reading network '{}'", file.display()))?;
        sources.push(network);
    }

    let stamp = build_stamp(args, &sources[0])?;
    match merge_networks(&sources, &stamp, &policy) {
        Ok(outcome) => {
            io::write_network(&args.output, &outcome.network)
                .with_context(|| format!("writing merged network '{}'", args.output.display()))?;
            if let Some(log) = &args.log {
                io::write_conflict_report(log, &outcome.report)
                    .with_context(|| format!("writing conflict report '{}'", log.display()))?;
            }
            println!(
                "Merged {} network(s) into '{}': {} point(s), {} network(s) with conflicts",
                sources.len(),
                args.output.display(),
                outcome.network.len(),
                outcome.report.networks.len(),
            );
            Ok(())
        }
        Err(err) => {
            // The collecting duplicate scan hands back the full report;
            // persist it where the conflict report would have gone.
            if let (Some(log), Some(report)) = (&args.log, err.duplicate_report()) {
                io::write_duplicate_report(log, report)
                    .with_context(|| format!("writing duplicate report '{}'", log.display()))?;
                bail!("{err}\n  Duplicate report written to '{}'.", log.display());
            }
            Err(err.into())
        }
    }
}

/// Build the ordered input list: `--base` is pulled out of the list if
/// present and moved to the front. At least two distinct files must
/// remain.
fn assemble_inputs(args: &MergeArgs) -> Result<Vec<PathBuf>> {
    let mut files = args.networks.clone();
    if let Some(base) = &args.base {
        // Drop the base from the list if it was also given there; we
        // assume it appears at most once.
        if let Some(pos) = files.iter().position(|f| same_file(f, base)) {
            files.remove(pos);
        }
        files.insert(0, base.clone());
    }
    if files.len() < 2 {
        bail!(
            "need at least two distinct input networks (a base and a network to merge), got {}",
            files.len()
        );
    }
    Ok(files)
}

/// Compare two paths, resolving symlinks and relative components when
/// possible.
fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

fn build_stamp(args: &MergeArgs, base: &Network) -> Result<NetworkStamp> {
    let network_id = match &args.network_id {
        Some(id) => NetworkId::new(id).context("invalid --network-id")?,
        None => base.id().clone(),
    };
    let now = chrono::Local::now().to_rfc3339();
    Ok(NetworkStamp {
        network_id,
        user_name: std::env::var("USER").unwrap_or_else(|_| "unknown".to_owned()),
        created: now.clone(),
        modified: now,
        description: args.description.clone(),
    })
}

fn run_info(path: &Path) -> Result<()> {
    let network =
        io::read_network(path).with_context(|| format!("reading network '{}'", path.display()))?;
    let measures: usize = network.points().iter().map(tienet::model::Point::len).sum();
    println!("Network:     {}", network.id());
    println!("Target:      {}", network.target());
    println!("Points:      {}", network.len());
    println!("Measures:    {measures}");
    if !network.user_name.is_empty() {
        println!("User:        {}", network.user_name);
    }
    if !network.created.is_empty() {
        println!("Created:     {}", network.created);
    }
    if !network.modified.is_empty() {
        println!("Modified:    {}", network.modified);
    }
    if !network.description.is_empty() {
        println!("Description: {}", network.description);
    }
    Ok(())
}
