//! Frame-graph diagnostics over reasoning-engine output
//!
//! The engine's frames form a DAG: one frame may be the subframe of several
//! parents. [`summarize`] walks it once from a root, counting each distinct
//! frame exactly once and collecting every frame with unknown apply nodes
//! together with the chain of frames through which it was first reached.

use std::collections::HashSet;
use std::hash::Hash;

/// Read access to the engine's frame graph.
///
/// `Frame` is a cheap handle; its `Eq`/`Hash` must reflect frame identity,
/// not structural equality.
pub trait FrameGraph {
    type Frame: Clone + Eq + Hash;

    /// Number of apply nodes in `frame` the engine could not resolve
    fn unknown_apply_count(&self, frame: &Self::Frame) -> usize;

    /// (call site, child frame) pairs, in a deterministic order
    fn subframes_for(&self, frame: &Self::Frame) -> Vec<(String, Self::Frame)>;

    /// Name of the instruction graph the frame executes
    fn graph_name(&self, frame: &Self::Frame) -> String;

    /// Entry judgment signature of the frame
    fn entry_signature(&self, frame: &Self::Frame) -> String;

    /// Frames the engine has created so far (upper bound on reachability)
    fn total_frame_count(&self) -> usize;
}

/// A frame with unresolved apply nodes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedFrame<F> {
    pub frame: F,
    pub unknown_applies: usize,
    /// Frames from the root down to (excluding) `frame`
    pub path: Vec<F>,
}

/// Result of walking a frame graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSummary<F> {
    /// Distinct frames reachable from the root
    pub reachable: usize,
    /// Engine-reported total; may disagree with `reachable`
    pub total: usize,
    /// Unresolved frames in visit order
    pub unresolved: Vec<UnresolvedFrame<F>>,
}

impl<F> FrameSummary<F> {
    /// Sum of unknown apply nodes over all unresolved frames
    pub fn bad_nodes(&self) -> usize {
        self.unresolved.iter().map(|u| u.unknown_applies).sum()
    }

    pub fn is_fully_resolved(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Walk the graph under `root` depth-first, visiting every frame once.
///
/// Visit order is the recursive pre-order over `subframes_for`, driven by an
/// explicit stack so deep graphs cannot exhaust the call stack. A frame
/// reachable along several paths keeps the path of its first visit. Cycles
/// terminate through the visited set.
pub fn summarize<G: FrameGraph>(graph: &G, root: G::Frame) -> FrameSummary<G::Frame> {
    let mut visited: HashSet<G::Frame> = HashSet::new();
    // (frame, parent visit index)
    let mut visits: Vec<(G::Frame, Option<usize>)> = Vec::new();
    let mut unresolved_visits: Vec<(usize, usize)> = Vec::new();
    let mut stack: Vec<(G::Frame, Option<usize>)> = vec![(root, None)];

    while let Some((frame, parent)) = stack.pop() {
        if !visited.insert(frame.clone()) {
            continue;
        }

        let index = visits.len();
        visits.push((frame.clone(), parent));

        let unknown = graph.unknown_apply_count(&frame);
        if unknown > 0 {
            unresolved_visits.push((index, unknown));
        }

        let children = graph.subframes_for(&frame);
        for (_, child) in children.into_iter().rev() {
            if !visited.contains(&child) {
                stack.push((child, Some(index)));
            }
        }
    }

    let unresolved = unresolved_visits
        .into_iter()
        .map(|(index, unknown_applies)| UnresolvedFrame {
            frame: visits[index].0.clone(),
            unknown_applies,
            path: path_to(&visits, index),
        })
        .collect();

    FrameSummary {
        reachable: visited.len(),
        total: graph.total_frame_count(),
        unresolved,
    }
}

/// Rebuild root..parent for the visit at `index`
fn path_to<F: Clone>(visits: &[(F, Option<usize>)], index: usize) -> Vec<F> {
    let mut path = Vec::new();
    let mut current = visits[index].1;
    while let Some(parent) = current {
        path.push(visits[parent].0.clone());
        current = visits[parent].1;
    }
    path.reverse();
    path
}
