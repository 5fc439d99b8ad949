//! Test runner - execute the tests of one program unit

use crate::discovery::{extract_test_names, TestFilter};
use crate::error::DriverResult;
use crate::executor::{Executor, TestCall};
use crate::host::UnitLoader;
use crate::reporter::TestReporter;
use std::ops::{Add, AddAssign};
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

/// Pass/fail counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub passed: usize,
    pub failed: usize,
}

impl Tally {
    pub fn new(passed: usize, failed: usize) -> Self {
        Self { passed, failed }
    }

    pub fn passed(count: usize) -> Self {
        Self::new(count, 0)
    }

    pub fn failed(count: usize) -> Self {
        Self::new(0, count)
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed
    }
}

impl Add for Tally {
    type Output = Tally;

    fn add(self, other: Tally) -> Tally {
        Tally::new(self.passed + other.passed, self.failed + other.failed)
    }
}

impl AddAssign for Tally {
    fn add_assign(&mut self, other: Tally) {
        *self = *self + other;
    }
}

/// Runs the tests of a single unit, one after another
#[derive(Debug, Clone, Default)]
pub struct TestRunner {
    /// Pause before each test
    inter_test_delay: Duration,
}

impl TestRunner {
    /// Create a new test runner with no inter-test delay
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pause taken before each test
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.inter_test_delay = delay;
        self
    }

    /// Load `unit_path` and run each of its tagged members.
    ///
    /// A unit that fails to load counts as one failure. Errors returned by
    /// the executor are infrastructure failures and are propagated.
    pub fn run_unit<L: UnitLoader>(
        &self,
        loader: &L,
        unit_path: &Path,
        filter: Option<&dyn TestFilter>,
        executor: &mut dyn Executor<L::Unit>,
        reporter: &mut TestReporter<'_>,
    ) -> DriverResult<Tally> {
        let unit = match loader.load_unit(unit_path) {
            Ok(unit) => unit,
            Err(e) => {
                tracing::warn!(path = %unit_path.display(), error = %e, "unit failed to load");
                reporter.load_failure(unit_path, &e)?;
                return Ok(Tally::failed(1));
            }
        };

        let unit_name = unit_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| unit_path.display().to_string());

        let test_names = extract_test_names(loader, &unit);
        tracing::debug!(unit = %unit_name, tests = test_names.len(), "discovered tests");

        let mut tally = Tally::default();

        for test_name in &test_names {
            if let Some(filter) = filter {
                if !filter.accepts(unit_path, test_name) {
                    tracing::debug!(unit = %unit_name, test = %test_name, "filtered out");
                    continue;
                }
            }

            if !self.inter_test_delay.is_zero() {
                thread::sleep(self.inter_test_delay);
            }

            reporter.test_starting(&unit_name, test_name)?;

            let call = TestCall {
                unit: &unit,
                unit_name: &unit_name,
                test_name,
            };

            let start = Instant::now();
            let outcome = executor.execute(&call, reporter)?;
            let elapsed = start.elapsed();

            tally += reporter.report(&unit_name, test_name, &outcome, elapsed)?;
        }

        Ok(tally)
    }
}
