use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::HashMap;

/// Directed caller → callee graph derived from stored calls.
///
/// Each edge carries the number of stored calls producing it; an edge
/// disappears when that count reaches zero. Sources are listed in first-seen
/// order and each source's targets are listed in first-seen order too.
#[derive(Debug, Clone, Default)]
pub struct CallGraph {
    forward: Adjacency,
    reverse: Adjacency,
}

impl CallGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one more call from `caller` to `callee`
    pub fn add_edge(&mut self, caller: &str, callee: &str) {
        self.forward.add(caller, callee);
        self.reverse.add(callee, caller);
    }

    /// Forget one call from `caller` to `callee`
    pub fn remove_edge(&mut self, caller: &str, callee: &str) {
        self.forward.remove(caller, callee);
        self.reverse.remove(callee, caller);
    }

    pub fn clear(&mut self) {
        self.forward = Adjacency::default();
        self.reverse = Adjacency::default();
    }

    /// Callers in first-seen order
    pub fn callers(&self) -> impl Iterator<Item = &str> {
        self.forward.sources()
    }

    /// Callees in first-seen order
    pub fn callees(&self) -> impl Iterator<Item = &str> {
        self.reverse.sources()
    }

    /// Distinct callees of `caller`
    pub fn callees_of<'g>(&'g self, caller: &str) -> impl Iterator<Item = &'g str> {
        self.forward.targets(caller)
    }

    /// Distinct callers of `callee`
    pub fn callers_of<'g>(&'g self, callee: &str) -> impl Iterator<Item = &'g str> {
        self.reverse.targets(callee)
    }

    #[must_use]
    pub fn contains_edge(&self, caller: &str, callee: &str) -> bool {
        self.forward.edge_weight(caller, callee).is_some()
    }

    /// Number of stored calls carrying the `caller` → `callee` pair
    #[must_use]
    pub fn edge_weight(&self, caller: &str, callee: &str) -> usize {
        self.forward.edge_weight(caller, callee).unwrap_or(0)
    }

    #[must_use]
    pub fn caller_count(&self) -> usize {
        self.forward.order.len()
    }

    #[must_use]
    pub fn callee_count(&self) -> usize {
        self.reverse.order.len()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.forward.edges.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.forward.order.is_empty()
    }

    /// caller → distinct callees
    #[must_use]
    pub fn forward(&self) -> GraphSnapshot {
        self.forward.snapshot()
    }

    /// callee → distinct callers
    #[must_use]
    pub fn reverse(&self) -> GraphSnapshot {
        self.reverse.snapshot()
    }
}

#[derive(Debug, Clone, Default)]
struct Adjacency {
    order: Vec<String>,
    edges: HashMap<String, Vec<(String, usize)>>,
}

impl Adjacency {
    fn add(&mut self, source: &str, target: &str) {
        if !self.edges.contains_key(source) {
            self.order.push(source.to_string());
        }
        let targets = self.edges.entry(source.to_string()).or_default();
        match targets.iter_mut().find(|(name, _)| name == target) {
            Some((_, count)) => *count += 1,
            None => targets.push((target.to_string(), 1)),
        }
    }

    fn remove(&mut self, source: &str, target: &str) {
        let Some(targets) = self.edges.get_mut(source) else {
            return;
        };
        let Some(pos) = targets.iter().position(|(name, _)| name == target) else {
            return;
        };
        targets[pos].1 -= 1;
        if targets[pos].1 == 0 {
            targets.remove(pos);
        }
        if targets.is_empty() {
            self.edges.remove(source);
            self.order.retain(|name| name != source);
        }
    }

    fn sources(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    fn targets<'a>(&'a self, source: &str) -> impl Iterator<Item = &'a str> {
        self.edges
            .get(source)
            .into_iter()
            .flatten()
            .map(|(name, _)| name.as_str())
    }

    fn edge_weight(&self, source: &str, target: &str) -> Option<usize> {
        self.edges
            .get(source)?
            .iter()
            .find(|(name, _)| name == target)
            .map(|(_, count)| *count)
    }

    fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot(
            self.sources()
                .map(|source| {
                    let targets = self.targets(source).map(str::to_string).collect();
                    (source.to_string(), targets)
                })
                .collect(),
        )
    }
}

/// Owned copy of one direction of the graph, in first-seen order.
/// Serializes as a JSON object.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GraphSnapshot(Vec<(String, Vec<String>)>);

impl GraphSnapshot {
    #[must_use]
    pub fn get(&self, node: &str) -> Option<&[String]> {
        self.0
            .iter()
            .find(|(name, _)| name == node)
            .map(|(_, targets)| targets.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0
            .iter()
            .map(|(name, targets)| (name.as_str(), targets.as_slice()))
    }

    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(name, _)| name.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for GraphSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (node, targets) in &self.0 {
            map.serialize_entry(node, targets)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn edges_are_refcounted() {
        let mut graph = CallGraph::new();
        graph.add_edge("main", "helper");
        graph.add_edge("main", "helper");
        assert_eq!(graph.edge_weight("main", "helper"), 2);
        assert_eq!(graph.edge_count(), 1);

        graph.remove_edge("main", "helper");
        assert!(graph.contains_edge("main", "helper"));

        graph.remove_edge("main", "helper");
        assert!(!graph.contains_edge("main", "helper"));
        assert!(graph.is_empty());
        assert_eq!(graph.callee_count(), 0);
    }

    #[test]
    fn order_is_first_seen() {
        let mut graph = CallGraph::new();
        graph.add_edge("z", "b");
        graph.add_edge("a", "c");
        graph.add_edge("z", "a");
        graph.add_edge("z", "b");

        assert_eq!(graph.callers().collect::<Vec<_>>(), vec!["z", "a"]);
        assert_eq!(graph.callees().collect::<Vec<_>>(), vec!["b", "c", "a"]);
        assert_eq!(graph.callees_of("z").collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(graph.callers_of("nobody").count(), 0);
    }

    #[test]
    fn snapshot_serializes_as_ordered_object() {
        let mut graph = CallGraph::new();
        graph.add_edge("main", "run");
        graph.add_edge("main", "exit");
        graph.add_edge("run", "step");

        let forward = graph.forward();
        assert_eq!(forward.get("main"), Some(&["run".to_string(), "exit".to_string()][..]));
        assert_eq!(
            serde_json::to_string(&forward).unwrap(),
            r#"{"main":["run","exit"],"run":["step"]}"#
        );
        assert_eq!(graph.reverse().nodes().collect::<Vec<_>>(), vec!["run", "exit", "step"]);
    }
}
