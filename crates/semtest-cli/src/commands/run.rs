//! Run command - drive a directory of scripted units

use anyhow::{Context, Result};
use semtest_config::{Config, ConfigLoader, Settings};
use semtest_core::{ExecutionMode, NameFilter, SuiteDriver, SuiteOptions, TestFilter, TestReporter};
use semtest_script::ScriptHost;
use std::path::PathBuf;
use std::time::Duration;

/// Arguments for the run command
#[derive(Debug, Clone)]
pub struct RunArgs {
    /// Suite directory
    pub dir: PathBuf,
    /// Print success and progress lines
    pub verbose: bool,
    /// `unit::test` or bare name pattern
    pub filter: Option<String>,
    /// Run the reasoning engine instead of invoking tests
    pub reasoning: bool,
    pub delay_ms: Option<u64>,
    pub drain_ms: Option<u64>,
    /// Disable colored output
    pub no_color: bool,
    /// Explicit config file instead of searching for semtest.toml
    pub config: Option<PathBuf>,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            verbose: false,
            filter: None,
            reasoning: false,
            delay_ms: None,
            drain_ms: None,
            no_color: false,
            config: None,
        }
    }
}

/// Run the suite and return the process exit code
pub fn run(args: RunArgs) -> Result<u8> {
    let config = load_config(&args)?;
    if let Some(source) = config.source() {
        tracing::debug!(config = %source.display(), "loaded configuration");
    }
    let settings = apply_flags(&args, config.settings());
    tracing::debug!(?settings, "effective settings");

    if !settings.color {
        colored::control::set_override(false);
    }

    let host = ScriptHost::new();
    let driver = SuiteDriver::new(&host, suite_options(&settings));
    let filter = args.filter.as_deref().map(NameFilter::parse);

    let mut reporter = TestReporter::stdout(&host)
        .with_verbose(settings.verbose)
        .with_no_color(!settings.color);
    let report = driver
        .run(
            &args.dir,
            filter.as_ref().map(|f| f as &dyn TestFilter),
            &mut reporter,
        )
        .with_context(|| format!("suite run over {} aborted", args.dir.display()))?;

    if !settings.color {
        colored::control::unset_override();
    }

    Ok(report.exit_code())
}

fn load_config(args: &RunArgs) -> Result<Config> {
    let loader = ConfigLoader::new();
    match &args.config {
        Some(path) => loader
            .load_from_file(path)
            .with_context(|| format!("failed to load {}", path.display())),
        None => {
            let start = args.dir.canonicalize().unwrap_or_else(|_| args.dir.clone());
            loader
                .load_from_directory(&start)
                .context("failed to load configuration")
        }
    }
}

/// Flags override everything below them; unset flags leave settings alone
pub fn apply_flags(args: &RunArgs, mut settings: Settings) -> Settings {
    if args.verbose {
        settings.verbose = true;
    }
    if args.reasoning {
        settings.reasoning = true;
    }
    if let Some(delay) = args.delay_ms {
        settings.delay_ms = delay;
    }
    if let Some(drain) = args.drain_ms {
        settings.drain_ms = drain;
    }
    if args.no_color {
        settings.color = false;
    }
    settings
}

pub fn suite_options(settings: &Settings) -> SuiteOptions {
    SuiteOptions {
        mode: if settings.reasoning {
            ExecutionMode::Reasoning
        } else {
            ExecutionMode::Plain
        },
        inter_test_delay: Duration::from_millis(settings.delay_ms),
        drain_pause: Duration::from_millis(settings.drain_ms),
        extension: settings.extension.clone(),
    }
}
