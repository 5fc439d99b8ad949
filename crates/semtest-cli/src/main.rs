use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;
mod logging;

/// Semantic test driver.
///
/// Discovers tagged test members in a directory of program units, runs them
/// one at a time and reports each failure plus a final summary. In reasoning
/// mode the tests are not executed; the reasoning engine's frame graph is
/// checked for unresolved applies instead.
///
/// EXAMPLES:
///     semtest run tests/semantic               Run a suite
///     semtest run tests/semantic -v            Show every test
///     semtest run . -f arith::addition         Run one test
///     semtest run . --reasoning --delay-ms 50  Frame-graph diagnostics
///
/// ENVIRONMENT VARIABLES:
///     SEMTEST_VERBOSE     Default for --verbose
///     SEMTEST_REASONING   Default for --reasoning
///     SEMTEST_DELAY_MS    Default for --delay-ms
///     SEMTEST_DRAIN_MS    Default for --drain-ms
///     SEMTEST_LOG         Diagnostic log filter (default: warn)
///     NO_COLOR            Set to disable colored output
#[derive(Parser)]
#[command(name = "semtest")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every unit of a suite directory
    ///
    /// Settings come from semtest.toml (searched upwards from DIR), then
    /// environment variables, then these flags.
    ///
    /// EXAMPLES:
    ///     semtest run                       Run the current directory
    ///     semtest run suite -f math         Only units or tests matching 'math'
    ///     semtest run suite --drain-ms 0    Exit right after the summary
    #[command(visible_alias = "r")]
    Run {
        /// Suite directory (defaults to current directory)
        #[arg(default_value = ".")]
        dir: PathBuf,
        /// Print a line for every test started and passed
        #[arg(long, short = 'v')]
        verbose: bool,
        /// Only run tests matching PATTERN ('unit::test' or a bare name)
        #[arg(long, short = 'f', value_name = "PATTERN")]
        filter: Option<String>,
        /// Run the reasoning engine and report unresolved frames
        #[arg(long)]
        reasoning: bool,
        /// Pause before each test in reasoning mode
        #[arg(long, value_name = "MS")]
        delay_ms: Option<u64>,
        /// Pause after the summary line
        #[arg(long, value_name = "MS")]
        drain_ms: Option<u64>,
        /// Disable colored output
        #[arg(long)]
        no_color: bool,
        /// Use this config file instead of searching for semtest.toml
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Generate shell completions
    ///
    /// EXAMPLES:
    ///     semtest completions bash > ~/.local/share/bash-completion/completions/semtest
    ///     semtest completions zsh > ~/.zfunc/_semtest
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() -> Result<ExitCode> {
    logging::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            dir,
            verbose,
            filter,
            reasoning,
            delay_ms,
            drain_ms,
            no_color,
            config,
        } => {
            let args = commands::run::RunArgs {
                dir,
                verbose,
                filter,
                reasoning,
                delay_ms,
                drain_ms,
                no_color,
                config,
            };
            let code = commands::run::run(args)?;
            Ok(ExitCode::from(code))
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut io::stdout());
            Ok(ExitCode::SUCCESS)
        }
    }
}
