use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "actionmap")]
#[command(
    about = "Strongly typed action descriptors for MVC controllers",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// Project file (.csproj) or project directory
    pub project: PathBuf,

    /// Configuration file (default: .actionmap.toml in the project root or an ancestor)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Namespace of the generated registry and descriptor type
    #[arg(long, env = "ACTIONMAP_NAMESPACE")]
    pub namespace: Option<String>,

    /// Number of parallel jobs (0 = use all cores)
    #[arg(short = 'j', long = "jobs", default_value = "0", env = "ACTIONMAP_JOBS")]
    pub jobs: usize,

    /// Report what would change without writing any file
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,

    /// Disable colored output
    #[arg(long)]
    pub plain: bool,

    /// Increase verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
