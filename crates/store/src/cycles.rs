use crate::graph::CallGraph;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Strategy for reporting cycles in a [`CallGraph`]
pub trait CycleDetector: fmt::Debug + Send + Sync {
    fn find_cycles(&self, graph: &CallGraph) -> Vec<Vec<String>>;
}

/// Depth-first search along the current call path.
///
/// A search starts from every caller not yet visited, in first-seen order.
/// Reaching a node that is already on the path records the closed walk
/// `path[first..] + [node]`. The visited set is shared by all searches, so a
/// cycle whose nodes were all reached earlier through another cycle is not
/// reported: `a → b → c → a` plus `a → c` yields only `[a, b, c, a]`. Use
/// [`TarjanDetector`] when every cyclic region must be reported.
///
/// The search keeps its own frame stack, so call chains of any depth are safe.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathDfsDetector;

/// Callees of one node on the current path; `next` is the first unexplored one
struct Frame<'g> {
    callees: Vec<&'g str>,
    next: usize,
}

impl PathDfsDetector {
    fn search<'g>(
        graph: &'g CallGraph,
        root: &'g str,
        visited: &mut HashSet<&'g str>,
        cycles: &mut Vec<Vec<String>>,
    ) {
        let mut path: Vec<&'g str> = Vec::new();
        let mut on_path: HashMap<&'g str, usize> = HashMap::new();
        let mut frames: Vec<Frame<'g>> = Vec::new();

        visited.insert(root);
        Self::enter(graph, root, &mut path, &mut on_path, &mut frames);

        while let Some(frame) = frames.last_mut() {
            let Some(&callee) = frame.callees.get(frame.next) else {
                frames.pop();
                if let Some(done) = path.pop() {
                    on_path.remove(done);
                }
                continue;
            };
            frame.next += 1;

            if let Some(&first) = on_path.get(callee) {
                let mut cycle: Vec<String> = path[first..].iter().map(|n| (*n).to_string()).collect();
                cycle.push(callee.to_string());
                cycles.push(cycle);
            } else if visited.insert(callee) {
                Self::enter(graph, callee, &mut path, &mut on_path, &mut frames);
            }
        }
    }

    fn enter<'g>(
        graph: &'g CallGraph,
        node: &'g str,
        path: &mut Vec<&'g str>,
        on_path: &mut HashMap<&'g str, usize>,
        frames: &mut Vec<Frame<'g>>,
    ) {
        on_path.insert(node, path.len());
        path.push(node);
        frames.push(Frame {
            callees: graph.callees_of(node).collect(),
            next: 0,
        });
    }
}

impl CycleDetector for PathDfsDetector {
    fn find_cycles(&self, graph: &CallGraph) -> Vec<Vec<String>> {
        let mut visited = HashSet::new();
        let mut cycles = Vec::new();
        for caller in graph.callers() {
            if !visited.contains(caller) {
                Self::search(graph, caller, &mut visited, &mut cycles);
            }
        }
        cycles
    }
}

/// Strongly connected components with more than one node, plus self-loops.
///
/// Each component is listed once as its member names (not a closed walk), in
/// first-seen node order. Components are ordered by their earliest member.
#[derive(Debug, Clone, Copy, Default)]
pub struct TarjanDetector;

impl CycleDetector for TarjanDetector {
    fn find_cycles(&self, graph: &CallGraph) -> Vec<Vec<String>> {
        let mut digraph: DiGraph<&str, ()> = DiGraph::new();
        let mut indices: HashMap<&str, NodeIndex> = HashMap::new();
        for caller in graph.callers() {
            let from = node_index(&mut digraph, &mut indices, caller);
            for callee in graph.callees_of(caller) {
                let to = node_index(&mut digraph, &mut indices, callee);
                digraph.add_edge(from, to, ());
            }
        }

        let mut components: Vec<Vec<NodeIndex>> = tarjan_scc(&digraph)
            .into_iter()
            .filter(|component| match component.as_slice() {
                [single] => digraph.contains_edge(*single, *single),
                _ => true,
            })
            .collect();
        for component in &mut components {
            component.sort_unstable();
        }
        components.sort_unstable_by_key(|component| component.first().copied());

        components
            .into_iter()
            .map(|component| {
                component
                    .into_iter()
                    .map(|index| digraph[index].to_string())
                    .collect()
            })
            .collect()
    }
}

fn node_index<'g>(
    digraph: &mut DiGraph<&'g str, ()>,
    indices: &mut HashMap<&'g str, NodeIndex>,
    name: &'g str,
) -> NodeIndex {
    *indices
        .entry(name)
        .or_insert_with(|| digraph.add_node(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn graph(edges: &[(&str, &str)]) -> CallGraph {
        let mut graph = CallGraph::new();
        for (caller, callee) in edges {
            graph.add_edge(caller, callee);
        }
        graph
    }

    fn names(cycles: &[&[&str]]) -> Vec<Vec<String>> {
        cycles
            .iter()
            .map(|cycle| cycle.iter().map(|n| (*n).to_string()).collect())
            .collect()
    }

    #[test]
    fn three_node_cycle() {
        let g = graph(&[("a", "b"), ("b", "c"), ("c", "a")]);
        assert_eq!(PathDfsDetector.find_cycles(&g), names(&[&["a", "b", "c", "a"]]));
        assert_eq!(TarjanDetector.find_cycles(&g), names(&[&["a", "b", "c"]]));
    }

    #[test]
    fn acyclic_graph_has_no_cycles() {
        let g = graph(&[("main", "parse"), ("main", "run"), ("run", "parse")]);
        assert!(PathDfsDetector.find_cycles(&g).is_empty());
        assert!(TarjanDetector.find_cycles(&g).is_empty());
    }

    #[test]
    fn self_loop() {
        let g = graph(&[("walk", "walk"), ("main", "walk")]);
        assert_eq!(PathDfsDetector.find_cycles(&g), names(&[&["walk", "walk"]]));
        assert_eq!(TarjanDetector.find_cycles(&g), names(&[&["walk"]]));
    }

    #[test]
    fn shared_visited_set_misses_second_cycle() {
        // a → c → a is never reported: c was visited through a → b → c
        let g = graph(&[("a", "b"), ("b", "c"), ("c", "a"), ("a", "c")]);
        assert_eq!(PathDfsDetector.find_cycles(&g), names(&[&["a", "b", "c", "a"]]));

        let components = TarjanDetector.find_cycles(&g);
        assert_eq!(components, names(&[&["a", "b", "c"]]));
    }

    #[test]
    fn deep_call_chain() {
        let chain: Vec<String> = (0..50_000).map(|i| format!("f{i}")).collect();
        let mut g = CallGraph::new();
        for pair in chain.windows(2) {
            g.add_edge(&pair[0], &pair[1]);
        }
        g.add_edge(&chain[chain.len() - 1], &chain[0]);

        let cycles = PathDfsDetector.find_cycles(&g);
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].len(), chain.len() + 1);
        assert_eq!(cycles[0].first(), cycles[0].last());
    }

    #[test]
    fn separate_components_are_ordered_by_first_seen() {
        let g = graph(&[("x", "y"), ("y", "x"), ("a", "b"), ("b", "a"), ("main", "x")]);
        assert_eq!(
            TarjanDetector.find_cycles(&g),
            names(&[&["x", "y"], &["a", "b"]])
        );
        assert_eq!(
            PathDfsDetector.find_cycles(&g),
            names(&[&["x", "y", "x"], &["a", "b", "a"]])
        );
    }
}
