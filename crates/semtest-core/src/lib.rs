//! semtest core - semantic test driver for a managed language runtime
//!
//! This library provides:
//! - Test discovery from member metadata tags
//! - Sequential test execution with pluggable executors
//! - Result reporting and pass/fail aggregation
//! - Frame-graph diagnostics over reasoning-engine output
//!
//! The language runtime, its loader and its reasoning engine are external
//! collaborators reached only through the traits in [`host`] and [`frames`].

pub mod discovery;
pub mod error;
pub mod executor;
pub mod frames;
pub mod host;
pub mod metadata;
pub mod reporter;
pub mod runner;
pub mod suite;

pub use discovery::{extract_test_names, is_test_case, NameFilter, TestFilter, TEST_TAG};
pub use error::{DriverError, DriverResult, LoadError};
pub use executor::{
    Executor, PlainExecutor, ReasoningContext, ReasoningExecutor, TestCall, TestOutcome,
    FailureDetail,
};
pub use frames::{summarize, FrameGraph, FrameSummary, UnresolvedFrame};
pub use host::{
    ApplyJudgment, Evaluation, Host, MemoryProbe, ReasoningEngine, Runtime, RuntimeException,
    UnitLoader, MEMBER_SELECTOR,
};
pub use metadata::{MemberMetadata, MetaValue};
pub use reporter::{collapse_whitespace, sanitize_error, TestReporter};
pub use runner::{Tally, TestRunner};
pub use suite::{ExecutionMode, SuiteDriver, SuiteOptions, SuiteReport};
