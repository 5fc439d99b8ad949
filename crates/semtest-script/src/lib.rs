//! semtest-script - scripted reference host
//!
//! Units are TOML files (`*.sem`) that declare their members, the outcome
//! of invoking each member and, optionally, the frame graph a reasoning
//! engine would build for it. The host implements every collaborator trait
//! of `semtest-core`, so suites can be driven end to end without a language
//! runtime.

pub mod engine;
pub mod unit;

pub use engine::{FrameRef, ScriptEngine};
pub use unit::{FrameDecl, ScriptMember, ScriptUnit, ScriptedOutcome};

use semtest_core::{
    DriverError, DriverResult, Evaluation, Host, LoadError, MemberMetadata, MemoryProbe, Runtime,
    RuntimeException, UnitLoader,
};
use std::cell::Cell;
use std::fs;
use std::path::Path;

/// Extension of scripted unit files
pub const SOURCE_EXTENSION: &str = "sem";

/// Host backed by scripted unit files
#[derive(Debug, Default)]
pub struct ScriptHost {
    /// Bytes of unit source read so far
    bytes_loaded: Cell<u64>,
}

impl ScriptHost {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UnitLoader for ScriptHost {
    type Unit = ScriptUnit;

    fn source_extension(&self) -> &str {
        SOURCE_EXTENSION
    }

    fn load_unit(&self, path: &Path) -> Result<ScriptUnit, LoadError> {
        let source = fs::read_to_string(path).map_err(|e| LoadError::new(path, e))?;
        self.bytes_loaded
            .set(self.bytes_loaded.get() + source.len() as u64);
        ScriptUnit::parse(path, &source)
    }

    fn members_of(&self, unit: &ScriptUnit) -> Vec<(String, Option<MemberMetadata>)> {
        unit.members()
            .iter()
            .map(|m| (m.name.clone(), m.meta.clone()))
            .collect()
    }
}

impl Runtime for ScriptHost {
    fn invoke_member(&self, unit: &ScriptUnit, member: &str) -> DriverResult<Evaluation> {
        let scripted = unit
            .member(member)
            .ok_or_else(|| DriverError::infrastructure(unit.name(), member, "no such member"))?;

        match &scripted.outcome {
            ScriptedOutcome::Result(toml::Value::Boolean(true)) => Ok(Evaluation::True),
            ScriptedOutcome::Result(value) => Ok(Evaluation::Value(value.to_string())),
            ScriptedOutcome::Raise(text) => Ok(Evaluation::Raised(RuntimeException::new(text.as_str()))),
            ScriptedOutcome::Fault(text) => Err(DriverError::infrastructure(unit.name(), member, text)),
        }
    }
}

impl MemoryProbe for ScriptHost {
    fn current_bytes_used(&self) -> u64 {
        self.bytes_loaded.get()
    }
}

impl Host for ScriptHost {
    type Engine = ScriptEngine;

    fn reasoning_engine(&self) -> DriverResult<ScriptEngine> {
        Ok(ScriptEngine::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn unit(source: &str) -> ScriptUnit {
        ScriptUnit::parse(Path::new("t.sem"), source).unwrap()
    }

    #[rstest]
    #[case("result = true", Evaluation::True)]
    #[case("result = false", Evaluation::Value("false".to_string()))]
    #[case("result = 42", Evaluation::Value("42".to_string()))]
    #[case("result = \"yes\"", Evaluation::Value("\"yes\"".to_string()))]
    #[case("raise = \"division by zero\"", Evaluation::Raised(RuntimeException::new("division by zero")))]
    fn test_invoke_member(#[case] outcome: &str, #[case] expected: Evaluation) {
        let unit = unit(&format!("[[member]]\nname = \"m\"\n{}\n", outcome));
        let host = ScriptHost::new();
        assert_eq!(host.invoke_member(&unit, "m").unwrap(), expected);
    }

    #[test]
    fn test_fault_is_infrastructure_error() {
        let unit = unit("[[member]]\nname = \"m\"\nfault = \"runtime died\"\n");
        let err = ScriptHost::new().invoke_member(&unit, "m").unwrap_err();
        assert_eq!(err.to_string(), "Infrastructure failure in t.sem.m: runtime died");
    }

    #[test]
    fn test_members_keep_metadata() {
        let unit = unit("[[member]]\nname = \"a\"\nmeta = \"`test\"\nresult = true\n[[member]]\nname = \"b\"\nresult = 1\n");
        let members = ScriptHost::new().members_of(&unit);
        assert_eq!(members.len(), 2);
        assert!(members[0].1.is_some());
        assert!(members[1].1.is_none());
    }
}
