//! Reasoning engine that replays declared frame graphs
//!
//! Frames live in an arena owned by the engine. Declared frames are
//! instantiated once per (unit path, frame id); later applies reaching the
//! same declaration share the arena slot.

use crate::unit::{FrameDecl, ScriptUnit};
use semtest_core::{ApplyJudgment, DriverError, DriverResult, FrameGraph, ReasoningEngine};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

/// Handle of a frame in the engine's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameRef(usize);

impl fmt::Display for FrameRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum FrameKey {
    Declared(String),
    /// Leaf frame of a member without a declared root
    Leaf(String),
}

#[derive(Debug, Clone)]
struct ArenaFrame {
    graph: String,
    entry: String,
    unknown: usize,
    calls: Vec<(String, FrameRef)>,
}

#[derive(Debug, Default)]
pub struct ScriptEngine {
    arena: Vec<ArenaFrame>,
    instantiated: HashMap<(PathBuf, FrameKey), FrameRef>,
}

impl ScriptEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn get(&self, frame: &FrameRef) -> Option<&ArenaFrame> {
        self.arena.get(frame.0)
    }

    fn leaf(&mut self, unit: &ScriptUnit, member: &str) -> FrameRef {
        let key = (unit.path().to_path_buf(), FrameKey::Leaf(member.to_string()));
        if let Some(frame) = self.instantiated.get(&key) {
            return *frame;
        }
        let frame = FrameRef(self.arena.len());
        self.arena.push(ArenaFrame {
            graph: member.to_string(),
            entry: format!("(`Member, `{})", member),
            unknown: 0,
            calls: Vec::new(),
        });
        self.instantiated.insert(key, frame);
        frame
    }

    /// Instantiate the graph reachable from `root`.
    ///
    /// New frames are staged and committed only when every reference
    /// resolves, so a dangling id leaves the arena untouched.
    fn instantiate(&mut self, unit: &ScriptUnit, root: &str) -> Result<FrameRef, String> {
        let mut staging = Staging {
            engine: self,
            unit,
            frames: Vec::new(),
            ids: HashMap::new(),
            work: Vec::new(),
        };

        let root_ref = staging.slot(root)?;
        while let Some((id, slot)) = staging.work.pop() {
            let decl = staging.decl(id)?;
            let mut calls = Vec::with_capacity(decl.calls.len());
            for (site, target) in &decl.calls {
                calls.push((site.clone(), staging.slot(target)?));
            }
            staging.frames[slot].calls = calls;
        }

        let Staging { frames, ids, .. } = staging;
        let ids: Vec<(String, FrameRef)> = ids
            .into_iter()
            .map(|(id, frame)| (id.to_string(), frame))
            .collect();
        self.arena.extend(frames);
        for (id, frame) in ids {
            self.instantiated
                .insert((unit.path().to_path_buf(), FrameKey::Declared(id)), frame);
        }
        Ok(root_ref)
    }
}

/// Frames allocated during one instantiation, not yet in the arena
struct Staging<'e, 'u> {
    engine: &'e ScriptEngine,
    unit: &'u ScriptUnit,
    frames: Vec<ArenaFrame>,
    ids: HashMap<&'u str, FrameRef>,
    /// (declared id, index into `frames`) still to be wired up
    work: Vec<(&'u str, usize)>,
}

impl<'e, 'u> Staging<'e, 'u> {
    fn decl(&self, id: &str) -> Result<&'u FrameDecl, String> {
        self.unit
            .frame(id)
            .ok_or_else(|| format!("unknown frame '{}'", id))
    }

    fn slot(&mut self, id: &'u str) -> Result<FrameRef, String> {
        let key = (self.unit.path().to_path_buf(), FrameKey::Declared(id.to_string()));
        if let Some(frame) = self.engine.instantiated.get(&key) {
            return Ok(*frame);
        }
        if let Some(frame) = self.ids.get(id) {
            return Ok(*frame);
        }

        let decl = self.decl(id)?;
        let index = self.frames.len();
        let frame = FrameRef(self.engine.arena.len() + index);
        self.frames.push(ArenaFrame {
            graph: decl.graph.clone(),
            entry: decl.entry.clone(),
            unknown: decl.unknown,
            calls: Vec::new(),
        });
        self.ids.insert(id, frame);
        self.work.push((id, index));
        Ok(frame)
    }
}

impl FrameGraph for ScriptEngine {
    type Frame = FrameRef;

    fn unknown_apply_count(&self, frame: &FrameRef) -> usize {
        self.get(frame).map_or(0, |f| f.unknown)
    }

    fn subframes_for(&self, frame: &FrameRef) -> Vec<(String, FrameRef)> {
        self.get(frame).map_or_else(Vec::new, |f| f.calls.clone())
    }

    fn graph_name(&self, frame: &FrameRef) -> String {
        self.get(frame).map_or_else(String::new, |f| f.graph.clone())
    }

    fn entry_signature(&self, frame: &FrameRef) -> String {
        self.get(frame).map_or_else(String::new, |f| f.entry.clone())
    }

    fn total_frame_count(&self) -> usize {
        self.arena.len()
    }
}

impl ReasoningEngine for ScriptEngine {
    type Unit = ScriptUnit;

    fn reason_about_apply(&mut self, apply: &ApplyJudgment<'_, ScriptUnit>) -> DriverResult<FrameRef> {
        let unit = apply.target;
        let member = unit.member(apply.member).ok_or_else(|| {
            DriverError::infrastructure(unit.name(), apply.member, "no such member")
        })?;

        let frame = match member.root.as_deref() {
            Some(root) => self
                .instantiate(unit, root)
                .map_err(|message| DriverError::infrastructure(unit.name(), apply.member, message))?,
            None => self.leaf(unit, apply.member),
        };

        tracing::debug!(
            unit = %unit.name(),
            member = apply.member,
            frame = %frame,
            arena = self.arena.len(),
            "reasoned about apply"
        );
        Ok(frame)
    }
}
