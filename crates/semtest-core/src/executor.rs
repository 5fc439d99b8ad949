//! Test executors - plain invocation and diagnostic reasoning

use crate::error::DriverResult;
use crate::frames::summarize;
use crate::host::{ApplyJudgment, Evaluation, Host, ReasoningEngine, Runtime, RuntimeException};
use crate::reporter::TestReporter;
use std::time::Instant;

/// One test to execute
#[derive(Debug)]
pub struct TestCall<'a, U> {
    pub unit: &'a U,
    pub unit_name: &'a str,
    pub test_name: &'a str,
}

/// Why a test failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureDetail {
    /// The runtime raised its own exception
    Raised(RuntimeException),
    /// The test produced something other than true
    NotTrue(String),
}

/// Outcome of a single test
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestOutcome {
    Success,
    Failure(FailureDetail),
}

impl TestOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TestOutcome::Success)
    }
}

impl From<Evaluation> for TestOutcome {
    fn from(evaluation: Evaluation) -> Self {
        match evaluation {
            Evaluation::True => TestOutcome::Success,
            Evaluation::Value(value) => TestOutcome::Failure(FailureDetail::NotTrue(value)),
            Evaluation::Raised(exception) => {
                TestOutcome::Failure(FailureDetail::Raised(exception))
            }
        }
    }
}

/// Runs one test.
///
/// Test failures come back as [`TestOutcome::Failure`]. An `Err` is an
/// infrastructure failure and aborts the suite.
pub trait Executor<U> {
    fn execute(
        &mut self,
        call: &TestCall<'_, U>,
        reporter: &mut TestReporter<'_>,
    ) -> DriverResult<TestOutcome>;
}

/// Invokes the test member on the runtime
pub struct PlainExecutor<'h, R> {
    runtime: &'h R,
}

impl<'h, R: Runtime> PlainExecutor<'h, R> {
    pub fn new(runtime: &'h R) -> Self {
        Self { runtime }
    }
}

impl<'h, R: Runtime> Executor<R::Unit> for PlainExecutor<'h, R> {
    fn execute(
        &mut self,
        call: &TestCall<'_, R::Unit>,
        _reporter: &mut TestReporter<'_>,
    ) -> DriverResult<TestOutcome> {
        let evaluation = self.runtime.invoke_member(call.unit, call.test_name)?;
        Ok(evaluation.into())
    }
}

/// Reasoning engine shared by every diagnostic execution of a suite run.
///
/// The engine is built on first use and reused afterwards.
pub struct ReasoningContext<'h, H: Host> {
    host: &'h H,
    engine: Option<H::Engine>,
}

impl<'h, H: Host> ReasoningContext<'h, H> {
    pub fn new(host: &'h H) -> Self {
        Self { host, engine: None }
    }

    /// The engine, building it if needed
    pub fn engine(&mut self) -> DriverResult<&mut H::Engine> {
        let engine = match self.engine.take() {
            Some(engine) => engine,
            None => {
                tracing::debug!("initializing reasoning engine");
                self.host.reasoning_engine()?
            }
        };
        Ok(self.engine.insert(engine))
    }
}

/// Runs the reasoning engine on `(unit, `Member, `test)` and reports
/// how completely the resulting frame graph was resolved.
pub struct ReasoningExecutor<'c, 'h, H: Host> {
    context: &'c mut ReasoningContext<'h, H>,
}

impl<'c, 'h, H: Host> ReasoningExecutor<'c, 'h, H> {
    pub fn new(context: &'c mut ReasoningContext<'h, H>) -> Self {
        Self { context }
    }
}

impl<'c, 'h, H: Host> Executor<H::Unit> for ReasoningExecutor<'c, 'h, H> {
    fn execute(
        &mut self,
        call: &TestCall<'_, H::Unit>,
        reporter: &mut TestReporter<'_>,
    ) -> DriverResult<TestOutcome> {
        let engine = self.context.engine()?;
        let apply = ApplyJudgment::member(call.unit, call.test_name);

        let start = Instant::now();
        let root = engine.reason_about_apply(&apply)?;
        reporter.reasoning_timing(call.unit_name, call.test_name, start.elapsed())?;

        let summary = summarize(&*engine, root);
        reporter.frame_summary(call.unit_name, call.test_name, &summary, &*engine)?;

        Ok(TestOutcome::Success)
    }
}
