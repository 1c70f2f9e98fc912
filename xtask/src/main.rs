use clap::{Parser, Subcommand};
use xtask::{Result, commands};

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Build automation for ntpc crates and demos")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the workspace crates
    BuildCrates {
        /// Build with all features enabled
        #[arg(long, conflicts_with = "no_default_features")]
        all_features: bool,
        /// Build with no default features
        #[arg(long, conflicts_with = "all_features")]
        no_default_features: bool,
    },
    /// Build the demo applications
    BuildDemos,
    /// Run tests for the workspace crates
    Test {
        /// Also run the ignored tests that talk to public NTP servers
        #[arg(long)]
        network: bool,
    },
    /// Check all code (workspace crates and demos)
    Check,
    /// Run clippy on all code with strict linting
    Clippy,
    /// Check code formatting for the workspace crates and all demos
    Format {
        /// Check formatting without making changes
        #[arg(long, conflicts_with = "fix")]
        check: bool,
        /// Fix formatting issues
        #[arg(long, conflicts_with = "check")]
        fix: bool,
    },
    /// Clean all build artifacts
    Clean,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::BuildCrates {
            all_features,
            no_default_features,
        } => commands::build::build_crates(all_features, no_default_features),
        Commands::BuildDemos => commands::build::build_demos(),
        Commands::Test { network } => commands::test::run_tests(network),
        Commands::Check => commands::check::check_all(),
        Commands::Clean => commands::clean::clean_all(),
        Commands::Clippy => commands::clippy::run_clippy(),
        Commands::Format { fix, .. } => {
            // checking is the default when no flag is provided
            if fix {
                commands::format::fix_formatting()
            } else {
                commands::format::check_formatting()
            }
        }
    }
}
