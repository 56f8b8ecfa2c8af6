use clap::{Args, Parser, Subcommand};
use repeatskmer::engine::config::{CountingMode, MissingCell};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Tony Kan, Ted Yu",
    version,
    about = "repeatskmer - Reconstruct residue sequences of structural regions and build k-mer feature tables.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Number of worker threads processing regions.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Reconstruct the sequence of every region from local structure files.
    Sequences(SequencesArgs),
    /// Count k-mers over an existing sequence table.
    Kmer(KmerArgs),
    /// Reconstruct sequences and count their k-mers in one pass.
    Pipeline(PipelineArgs),
}

/// Arguments for the `sequences` subcommand.
#[derive(Args, Debug)]
pub struct SequencesArgs {
    /// Region table (CSV) with region id, structure id, chain, start, end and label.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub regions: PathBuf,

    /// Directory holding `<id>.pdb` / `<id>.cif` structure files.
    #[arg(short = 'd', long = "structures", required = true, value_name = "DIR")]
    pub structures: PathBuf,

    /// Path for the reconstructed sequence table (CSV).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    #[command(flatten)]
    pub region: RegionArgs,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Arguments for the `kmer` subcommand.
#[derive(Args, Debug)]
pub struct KmerArgs {
    /// Sequence table (CSV) with region id, label and sequence columns.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the k-mer table.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    #[command(flatten)]
    pub counting: CountingArgs,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Arguments for the `pipeline` subcommand.
#[derive(Args, Debug)]
pub struct PipelineArgs {
    /// Region table (CSV) with region id, structure id, chain, start, end and label.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub regions: PathBuf,

    /// Directory holding `<id>.pdb` / `<id>.cif` structure files.
    #[arg(short = 'd', long = "structures", required = true, value_name = "DIR")]
    pub structures: PathBuf,

    /// Path for the k-mer table.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Also write the reconstructed sequence table to this path.
    #[arg(long, value_name = "PATH")]
    pub sequences_output: Option<PathBuf>,

    #[command(flatten)]
    pub region: RegionArgs,

    #[command(flatten)]
    pub counting: CountingArgs,

    #[command(flatten)]
    pub config: ConfigArgs,
}

#[derive(Args, Debug, Clone, Default)]
pub struct RegionArgs {
    /// Merge the records of each region into one window instead of keeping
    /// every unit separately.
    #[arg(long)]
    pub merge_regions: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct CountingArgs {
    /// Override the k-mer length.
    #[arg(short, value_name = "INT")]
    pub k: Option<usize>,

    /// Override the counting mode: `exact` (length k only) or `cumulative` (lengths 1..=k).
    #[arg(long, value_name = "MODE")]
    pub mode: Option<CountingMode>,

    /// Override the output field separator (a single ASCII character).
    #[arg(long, value_name = "CHAR")]
    pub separator: Option<char>,

    /// Override the cell written for absent k-mers: `empty` or `zero`.
    #[arg(long, value_name = "CELL")]
    pub missing_cell: Option<MissingCell>,

    /// Leave regions without a sequence out of the k-mer table.
    #[arg(long)]
    pub skip_empty_sequences: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the capacity of the result channel between workers and writer.
    #[arg(long, value_name = "INT")]
    pub channel_capacity: Option<usize>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S kmer.k=4
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn pipeline_parses_counting_and_global_flags() {
        let cli = Cli::try_parse_from([
            "repeatskmer",
            "-vv",
            "pipeline",
            "-r",
            "regions.csv",
            "-d",
            "pdb/",
            "-o",
            "kmers.csv",
            "-k",
            "4",
            "--mode",
            "exact",
            "--missing-cell",
            "zero",
            "--merge-regions",
            "-S",
            "table.separator=;",
            "-j",
            "3",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.threads, Some(3));
        let Commands::Pipeline(args) = cli.command else {
            panic!("expected pipeline command");
        };
        assert_eq!(args.counting.k, Some(4));
        assert_eq!(args.counting.mode, Some(CountingMode::Exact));
        assert_eq!(args.counting.missing_cell, Some(MissingCell::Zero));
        assert!(args.region.merge_regions);
        assert_eq!(args.config.set_values, vec!["table.separator=;"]);
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let result = Cli::try_parse_from([
            "repeatskmer",
            "kmer",
            "-i",
            "seqs.csv",
            "-o",
            "out.csv",
            "--mode",
            "sliding",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from([
            "repeatskmer",
            "-q",
            "-v",
            "kmer",
            "-i",
            "a",
            "-o",
            "b",
        ]);
        assert!(result.is_err());
    }
}
