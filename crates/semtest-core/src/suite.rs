//! Suite driver - run every unit of a directory and aggregate totals

use crate::discovery::{discover_units, TestFilter};
use crate::error::DriverResult;
use crate::executor::{Executor, PlainExecutor, ReasoningContext, ReasoningExecutor};
use crate::host::{Host, UnitLoader};
use crate::reporter::TestReporter;
use crate::runner::{Tally, TestRunner};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

/// Pause after the summary so the runtime's background output can flush
pub const DEFAULT_DRAIN_PAUSE: Duration = Duration::from_millis(500);

/// How tests are executed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Invoke each test member
    #[default]
    Plain,
    /// Run the reasoning engine and report frame-graph completeness
    Reasoning,
}

/// Suite-level settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteOptions {
    pub mode: ExecutionMode,
    /// Pause before each test; only honoured in reasoning mode
    pub inter_test_delay: Duration,
    /// Pause after the summary line
    pub drain_pause: Duration,
    /// Overrides the host's unit file extension
    pub extension: Option<String>,
}

impl Default for SuiteOptions {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::Plain,
            inter_test_delay: Duration::ZERO,
            drain_pause: DEFAULT_DRAIN_PAUSE,
            extension: None,
        }
    }
}

/// Totals of a whole suite run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuiteReport {
    pub passed: usize,
    pub failed: usize,
    pub elapsed: Duration,
}

impl SuiteReport {
    pub fn tally(&self) -> Tally {
        Tally::new(self.passed, self.failed)
    }

    /// 1 if anything failed, 0 otherwise
    pub fn exit_code(&self) -> u8 {
        if self.failed > 0 {
            1
        } else {
            0
        }
    }
}

/// Runs the units of a directory against a host
pub struct SuiteDriver<'h, H: Host> {
    host: &'h H,
    options: SuiteOptions,
}

impl<'h, H: Host> SuiteDriver<'h, H> {
    pub fn new(host: &'h H, options: SuiteOptions) -> Self {
        Self { host, options }
    }

    /// Run every unit file of `dir` in sorted order.
    ///
    /// Counts start from zero on each call. Infrastructure errors abort the
    /// run; load failures and test failures are counted.
    pub fn run(
        &self,
        dir: &Path,
        filter: Option<&dyn TestFilter>,
        reporter: &mut TestReporter<'_>,
    ) -> DriverResult<SuiteReport> {
        let start = Instant::now();

        let extension = self
            .options
            .extension
            .as_deref()
            .unwrap_or_else(|| self.host.source_extension());
        let units = discover_units(dir, extension)?;
        tracing::debug!(dir = %dir.display(), units = units.len(), "discovered units");

        let tally = match self.options.mode {
            ExecutionMode::Plain => {
                let runner = TestRunner::new();
                let mut executor = PlainExecutor::new(self.host);
                self.run_units(&units, &runner, filter, &mut executor, reporter)?
            }
            ExecutionMode::Reasoning => {
                let runner = TestRunner::new().with_delay(self.options.inter_test_delay);
                let mut context = ReasoningContext::new(self.host);
                let mut executor = ReasoningExecutor::new(&mut context);
                self.run_units(&units, &runner, filter, &mut executor, reporter)?
            }
        };

        let report = SuiteReport {
            passed: tally.passed,
            failed: tally.failed,
            elapsed: start.elapsed(),
        };
        reporter.suite_summary(&report)?;

        if !self.options.drain_pause.is_zero() {
            thread::sleep(self.options.drain_pause);
        }

        Ok(report)
    }

    fn run_units(
        &self,
        units: &[PathBuf],
        runner: &TestRunner,
        filter: Option<&dyn TestFilter>,
        executor: &mut dyn Executor<<H as UnitLoader>::Unit>,
        reporter: &mut TestReporter<'_>,
    ) -> DriverResult<Tally> {
        let mut tally = Tally::default();
        for unit in units {
            tally += runner.run_unit(self.host, unit, filter, executor, reporter)?;
        }
        Ok(tally)
    }
}
