use clap::{Args, Parser, Subcommand};
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
    about = "molbench - Benchmark a generative molecular model served behind an inference service.",
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

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run every enabled metric against the current checkpoint of the inference service.
    Run(RunArgs),
    /// Ask the inference service once for its current iteration.
    Probe(ProbeArgs),
    /// List the regressors available to the modelability metric.
    Models,
}

/// Arguments for the `run` subcommand.
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Path to the benchmark configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the directory result files are written to.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Override the number of molecules evaluated (0 or less evaluates all).
    #[arg(long, value_name = "INT", allow_negative_numbers = true)]
    pub input_size: Option<i64>,

    /// Override the number of molecules sampled per input molecule.
    #[arg(long, value_name = "INT")]
    pub sample_size: Option<usize>,

    /// Override the base URL of the inference service.
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S samplingSpec.seq_len=256
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `probe` subcommand.
#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Base URL of the inference service.
    #[arg(long, value_name = "URL", default_value = "http://localhost:8000")]
    pub url: String,

    /// Request timeout in seconds.
    #[arg(long, value_name = "SECS", default_value_t = 10)]
    pub timeout_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_accepts_overrides_and_repeated_set_values() {
        let cli = Cli::parse_from([
            "molbench",
            "-vv",
            "run",
            "-c",
            "bench.toml",
            "--input-size",
            "-1",
            "-S",
            "inference.max_attempts=3",
            "-S",
            "metric.unique.enabled=false",
        ]);
        assert_eq!(cli.verbose, 2);
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.config, Some(PathBuf::from("bench.toml")));
        assert_eq!(args.input_size, Some(-1));
        assert_eq!(args.set_values.len(), 2);
    }

    #[test]
    fn probe_has_default_url() {
        let cli = Cli::parse_from(["molbench", "probe"]);
        let Commands::Probe(args) = cli.command else {
            panic!("expected probe");
        };
        assert_eq!(args.url, "http://localhost:8000");
        assert_eq!(args.timeout_secs, 10);
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["molbench", "-q", "-v", "models"]).is_err());
    }
}
