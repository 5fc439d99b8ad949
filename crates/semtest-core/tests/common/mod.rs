//! In-memory host used by the suite tests.
//!
//! Unit files hold one member per line: `<name> <kind>` where kind is one of
//! `pass`, `fail`, `raise`, `fault` or `helper` (untagged). A line starting
//! with `!` makes the whole unit fail to load.

#![allow(dead_code)]

use semtest_core::{
    ApplyJudgment, DriverError, DriverResult, Evaluation, FrameGraph, Host, LoadError,
    MemberMetadata, MemoryProbe, MetaValue, ReasoningEngine, Runtime, RuntimeException,
    TestReporter, UnitLoader,
};
use std::cell::Cell;
use std::fs;
use std::path::Path;

pub type FakeUnit = Vec<(String, String)>;

#[derive(Default)]
pub struct FakeHost {
    pub engines_built: Cell<usize>,
    /// Make `reasoning_engine` fail
    pub engine_fails: bool,
}

impl UnitLoader for FakeHost {
    type Unit = FakeUnit;

    fn source_extension(&self) -> &str {
        "sem"
    }

    fn load_unit(&self, path: &Path) -> Result<FakeUnit, LoadError> {
        let text = fs::read_to_string(path).map_err(|e| LoadError::new(path, e))?;
        let mut members = Vec::new();
        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            if let Some(reason) = line.strip_prefix('!') {
                return Err(LoadError::new(path, reason));
            }
            let (name, kind) = line
                .split_once(' ')
                .ok_or_else(|| LoadError::new(path, format!("bad line: {}", line)))?;
            members.push((name.to_string(), kind.to_string()));
        }
        Ok(members)
    }

    fn members_of(&self, unit: &FakeUnit) -> Vec<(String, Option<MemberMetadata>)> {
        unit.iter()
            .map(|(name, kind)| {
                let meta = match kind.as_str() {
                    "helper" => None,
                    "fail" => Some(MemberMetadata::annotated(MetaValue::Tuple(vec![
                        MetaValue::symbol("slow"),
                        MetaValue::symbol("test"),
                    ]))),
                    _ => Some(MemberMetadata::annotated(MetaValue::symbol("test"))),
                };
                (name.clone(), meta)
            })
            .collect()
    }
}

fn kind_of<'u>(unit: &'u FakeUnit, member: &str) -> Option<&'u str> {
    unit.iter()
        .find(|(name, _)| name == member)
        .map(|(_, kind)| kind.as_str())
}

impl Runtime for FakeHost {
    fn invoke_member(&self, unit: &FakeUnit, member: &str) -> DriverResult<Evaluation> {
        match kind_of(unit, member) {
            Some("pass") => Ok(Evaluation::True),
            Some("fail") => Ok(Evaluation::Value("false".to_string())),
            Some("raise") => Ok(Evaluation::Raised(RuntimeException::new(format!(
                "boom in\n{}",
                member
            )))),
            Some("fault") => Err(DriverError::infrastructure("fake", member, "runtime crashed")),
            other => Err(DriverError::infrastructure(
                "fake",
                member,
                format!("unexpected member kind {:?}", other),
            )),
        }
    }
}

impl MemoryProbe for FakeHost {
    fn current_bytes_used(&self) -> u64 {
        2 * 1024 * 1024
    }
}

/// Every apply creates a diamond A -> {B, C} -> D; D is unresolved for
/// members of kind `raise`.
#[derive(Default)]
pub struct FakeEngine {
    frames: Vec<(String, usize, Vec<usize>)>,
}

impl FrameGraph for FakeEngine {
    type Frame = usize;

    fn unknown_apply_count(&self, frame: &usize) -> usize {
        self.frames[*frame].1
    }

    fn subframes_for(&self, frame: &usize) -> Vec<(String, usize)> {
        self.frames[*frame]
            .2
            .iter()
            .enumerate()
            .map(|(i, child)| (format!("site{}", i), *child))
            .collect()
    }

    fn graph_name(&self, frame: &usize) -> String {
        self.frames[*frame].0.clone()
    }

    fn entry_signature(&self, frame: &usize) -> String {
        format!("(frame\t{})", frame)
    }

    fn total_frame_count(&self) -> usize {
        self.frames.len()
    }
}

impl ReasoningEngine for FakeEngine {
    type Unit = FakeUnit;

    fn reason_about_apply(&mut self, apply: &ApplyJudgment<'_, FakeUnit>) -> DriverResult<usize> {
        let unknown = usize::from(kind_of(apply.target, apply.member) == Some("raise"));
        let base = self.frames.len();
        let name = apply.member.to_string();
        self.frames.push((name.clone(), 0, vec![base + 1, base + 2]));
        self.frames.push((format!("{}.left", name), 0, vec![base + 3]));
        self.frames.push((format!("{}.right", name), 0, vec![base + 3]));
        self.frames.push((format!("{}.leaf", name), unknown, vec![]));
        Ok(base)
    }
}

impl Host for FakeHost {
    type Engine = FakeEngine;

    fn reasoning_engine(&self) -> DriverResult<FakeEngine> {
        if self.engine_fails {
            return Err(DriverError::engine("engine image not found"));
        }
        self.engines_built.set(self.engines_built.get() + 1);
        Ok(FakeEngine::default())
    }
}

/// Run `f` with a colourless reporter and return what it printed
pub fn capture<T>(host: &FakeHost, verbose: bool, f: impl FnOnce(&mut TestReporter<'_>) -> T) -> (T, String) {
    let mut buf = Vec::new();
    let result = {
        let mut reporter = TestReporter::new(&mut buf, host)
            .with_verbose(verbose)
            .with_no_color(true);
        f(&mut reporter)
    };
    (result, String::from_utf8(buf).unwrap())
}

/// Drop the leading timestamp of a report line
pub fn strip_timestamp(line: &str) -> &str {
    line.split_once(" -- ").map_or(line, |(_, rest)| rest)
}
