//! Collaborator interfaces
//!
//! The driver never parses, evaluates or reasons about program units itself.
//! A host supplies those services through the traits below:
//! - [`UnitLoader`] loads units and lists their members with metadata
//! - [`Runtime`] invokes a member concretely
//! - [`MemoryProbe`] samples memory usage for verbose success lines
//! - [`Host::reasoning_engine`] builds the abstract-interpretation engine

use crate::error::{DriverResult, LoadError};
use crate::frames::FrameGraph;
use crate::metadata::MemberMetadata;
use std::fmt;
use std::path::Path;

/// Selector symbol used when reasoning about a unit member
pub const MEMBER_SELECTOR: &str = "Member";

/// Loads program units and inspects their members
pub trait UnitLoader {
    /// Loaded unit handle
    type Unit;

    /// File extension of source units (without the dot)
    fn source_extension(&self) -> &str;

    /// Load and parse a unit
    fn load_unit(&self, path: &Path) -> Result<Self::Unit, LoadError>;

    /// Members with their metadata, in the loader's native order
    fn members_of(&self, unit: &Self::Unit) -> Vec<(String, Option<MemberMetadata>)>;
}

/// The runtime's own exception type.
///
/// Only this is a test failure when raised; every other error is
/// infrastructure and aborts the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeException {
    payload: String,
}

impl RuntimeException {
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
        }
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }
}

impl fmt::Display for RuntimeException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.payload)
    }
}

/// What concretely invoking a member produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    /// The member evaluated to boolean true
    True,
    /// Any other value, rendered by the runtime
    Value(String),
    /// The runtime raised one of its own exceptions
    Raised(RuntimeException),
}

/// Concrete member invocation
pub trait Runtime: UnitLoader {
    fn invoke_member(&self, unit: &Self::Unit, member: &str) -> DriverResult<Evaluation>;
}

/// Memory instrumentation (read-only)
pub trait MemoryProbe {
    fn current_bytes_used(&self) -> u64;
}

/// The call judgment `(unit, `Member, `name)` handed to the reasoning engine
#[derive(Debug)]
pub struct ApplyJudgment<'a, U> {
    pub target: &'a U,
    pub selector: &'static str,
    pub member: &'a str,
}

impl<'a, U> ApplyJudgment<'a, U> {
    /// Judgment for reading `member` off `target`
    pub fn member(target: &'a U, member: &'a str) -> Self {
        Self {
            target,
            selector: MEMBER_SELECTOR,
            member,
        }
    }
}

/// Abstract-interpretation engine
pub trait ReasoningEngine: FrameGraph {
    type Unit;

    /// Reason about an apply and return its root frame
    fn reason_about_apply(&mut self, apply: &ApplyJudgment<'_, Self::Unit>)
        -> DriverResult<Self::Frame>;
}

/// Everything the suite driver needs from the outside world
pub trait Host: Runtime + MemoryProbe {
    type Engine: ReasoningEngine<Unit = Self::Unit>;

    /// Build the reasoning engine. Called at most once per suite run.
    fn reasoning_engine(&self) -> DriverResult<Self::Engine>;
}
