use crate::cycles::{CycleDetector, PathDfsDetector};
use crate::error::Result;
use crate::graph::{CallGraph, GraphSnapshot};
use crate::index::{bucket_sizes, define_handle, index_insert, index_remove, Index};
use codescope_extractor::{CallKind, CallRelationship};
use serde::Serialize;
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};

define_handle!(
    /// Handle of a stored call relationship
    CallId,
    "call"
);

/// Number of entries in the most-called and most-calling rankings
const TOP_N: usize = 5;

/// Call relationships plus the call graph they induce
#[derive(Debug)]
pub struct CallStore {
    calls: BTreeMap<CallId, CallRelationship>,
    by_caller: Index<String, CallId>,
    by_callee: Index<String, CallId>,
    by_kind: Index<CallKind, CallId>,
    by_file: Index<String, CallId>,
    graph: CallGraph,
    detector: Box<dyn CycleDetector>,
    next_id: u64,
}

impl Default for CallStore {
    fn default() -> Self {
        Self::with_detector(PathDfsDetector)
    }
}

impl CallStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store whose `find_cycles` uses `detector`
    pub fn with_detector(detector: impl CycleDetector + 'static) -> Self {
        Self {
            calls: BTreeMap::new(),
            by_caller: Index::new(),
            by_callee: Index::new(),
            by_kind: Index::new(),
            by_file: Index::new(),
            graph: CallGraph::new(),
            detector: Box::new(detector),
            next_id: 0,
        }
    }

    pub fn set_detector(&mut self, detector: impl CycleDetector + 'static) {
        self.detector = Box::new(detector);
    }

    pub fn save(&mut self, call: CallRelationship) -> CallId {
        let id = CallId(self.next_id);
        self.next_id += 1;

        index_insert(&mut self.by_caller, call.caller.clone(), id);
        index_insert(&mut self.by_callee, call.callee.clone(), id);
        index_insert(&mut self.by_kind, call.kind, id);
        index_insert(&mut self.by_file, call.file_path.clone(), id);
        self.graph.add_edge(&call.caller, &call.callee);
        self.calls.insert(id, call);
        id
    }

    #[must_use]
    pub fn get(&self, id: CallId) -> Option<&CallRelationship> {
        self.calls.get(&id)
    }

    #[must_use]
    pub fn find_by_caller(&self, caller: &str) -> Vec<&CallRelationship> {
        self.resolve(self.by_caller.get(caller))
    }

    #[must_use]
    pub fn find_by_callee(&self, callee: &str) -> Vec<&CallRelationship> {
        self.resolve(self.by_callee.get(callee))
    }

    #[must_use]
    pub fn find_by_kind(&self, kind: CallKind) -> Vec<&CallRelationship> {
        self.resolve(self.by_kind.get(&kind))
    }

    #[must_use]
    pub fn find_by_file(&self, file_path: &str) -> Vec<&CallRelationship> {
        self.resolve(self.by_file.get(file_path))
    }

    #[must_use]
    pub fn get_all(&self) -> Vec<&CallRelationship> {
        self.calls.values().collect()
    }

    pub fn delete(&mut self, id: CallId) -> Result<CallRelationship> {
        let call = self.calls.remove(&id).ok_or_else(|| id.unknown())?;
        index_remove(&mut self.by_caller, call.caller.as_str(), &id);
        index_remove(&mut self.by_callee, call.callee.as_str(), &id);
        index_remove(&mut self.by_kind, &call.kind, &id);
        index_remove(&mut self.by_file, call.file_path.as_str(), &id);
        self.graph.remove_edge(&call.caller, &call.callee);
        Ok(call)
    }

    pub fn clear(&mut self) {
        self.calls.clear();
        self.by_caller.clear();
        self.by_callee.clear();
        self.by_kind.clear();
        self.by_file.clear();
        self.graph.clear();
    }

    #[must_use]
    pub const fn graph(&self) -> &CallGraph {
        &self.graph
    }

    /// caller → distinct callees, in first-seen order
    #[must_use]
    pub fn call_graph(&self) -> GraphSnapshot {
        self.graph.forward()
    }

    /// callee → distinct callers, in first-seen order
    #[must_use]
    pub fn reverse_call_graph(&self) -> GraphSnapshot {
        self.graph.reverse()
    }

    #[must_use]
    pub fn find_cycles(&self) -> Vec<Vec<String>> {
        self.detector.find_cycles(&self.graph)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    #[must_use]
    pub fn statistics(&self) -> CallStatistics {
        let cycles = self.find_cycles();
        log::debug!("{} calls, {} cycles", self.calls.len(), cycles.len());

        CallStatistics {
            total_calls: self.calls.len(),
            calls_by_kind: bucket_sizes(&self.by_kind, |kind| kind.as_str().to_string()),
            calls_by_file: bucket_sizes(&self.by_file, String::clone),
            most_called: top_counts(self.calls.values().map(|c| c.callee.as_str()), TOP_N),
            most_calling: top_counts(self.calls.values().map(|c| c.caller.as_str()), TOP_N),
            cycles_count: cycles.len(),
            unique_callers: self.graph.caller_count(),
            unique_callees: self.graph.callee_count(),
        }
    }

    fn resolve(&self, ids: Option<&Vec<CallId>>) -> Vec<&CallRelationship> {
        ids.into_iter()
            .flatten()
            .filter_map(|id| self.calls.get(id))
            .collect()
    }
}

/// Occurrence counts sorted by descending count. The sort is stable, so
/// equal counts keep first-seen order.
fn top_counts<'a>(names: impl Iterator<Item = &'a str>, limit: usize) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();
    for name in names {
        match positions.entry(name) {
            Entry::Occupied(entry) => counts[*entry.get()].1 += 1,
            Entry::Vacant(entry) => {
                entry.insert(counts.len());
                counts.push((name.to_string(), 1));
            }
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(limit);
    counts
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallStatistics {
    pub total_calls: usize,
    pub calls_by_kind: BTreeMap<String, usize>,
    pub calls_by_file: BTreeMap<String, usize>,
    pub most_called: Vec<(String, usize)>,
    pub most_calling: Vec<(String, usize)>,
    pub cycles_count: usize,
    pub unique_callers: usize,
    pub unique_callees: usize,
}
