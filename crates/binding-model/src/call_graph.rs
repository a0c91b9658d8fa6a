//! Static call graph of a [`ShaderProgram`].
//!
//! Nodes are functions; edges are calls. Each node additionally records the module-scope variables
//! its body references directly. A variable is *reachable* from an entry point when some function
//! in the transitive closure of the entry point's calls (the entry point included) references it.

use std::collections::{BTreeMap, BTreeSet};

use crate::program::ShaderProgram;

#[derive(Debug, Default, Clone)]
struct Node<'a> {
    calls: BTreeSet<&'a str>,
    uses: BTreeSet<&'a str>,
}

#[derive(Debug, Clone)]
pub struct CallGraph<'a> {
    nodes: BTreeMap<&'a str, Node<'a>>,
}

impl<'a> CallGraph<'a> {
    /// Functions sharing a name are merged into one node.
    pub fn build(program: &'a ShaderProgram) -> Self {
        let mut nodes: BTreeMap<&'a str, Node<'a>> = BTreeMap::new();
        for function in &program.functions {
            let node = nodes.entry(function.name.as_str()).or_default();
            node.calls.extend(function.calls.iter().map(String::as_str));
            node.uses.extend(function.uses.iter().map(String::as_str));
        }
        Self { nodes }
    }

    pub fn contains(&self, function: &str) -> bool {
        self.nodes.contains_key(function)
    }

    /// Callees that name no function in the graph, as `(caller, callee)` pairs.
    pub fn unresolved_calls(&self) -> Vec<(&'a str, &'a str)> {
        self.nodes
            .iter()
            .flat_map(|(caller, node)| node.calls.iter().map(move |callee| (*caller, *callee)))
            .filter(|(_, callee)| !self.contains(callee))
            .collect()
    }

    /// Every function reachable from `entry`, `entry` included. Unknown callees are skipped.
    pub fn reachable_functions(&self, entry: &str) -> BTreeSet<&'a str> {
        let mut seen = BTreeSet::new();
        let Some((&root, _)) = self.nodes.get_key_value(entry) else {
            return seen;
        };

        let mut stack = vec![root];
        while let Some(name) = stack.pop() {
            if !seen.insert(name) {
                continue;
            }
            if let Some(node) = self.nodes.get(name) {
                stack.extend(
                    node.calls
                        .iter()
                        .copied()
                        .filter(|callee| self.nodes.contains_key(callee) && !seen.contains(callee)),
                );
            }
        }
        seen
    }

    /// Module-scope names referenced by any function reachable from `entry`.
    pub fn reachable_globals(&self, entry: &str) -> BTreeSet<&'a str> {
        self.reachable_functions(entry)
            .into_iter()
            .filter_map(|name| self.nodes.get(name))
            .flat_map(|node| node.uses.iter().copied())
            .collect()
    }

    /// Returns a call path `f -> ... -> f` if the graph contains a cycle.
    pub fn find_cycle(&self) -> Option<Vec<&'a str>> {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Mark {
            Active,
            Done,
        }

        let mut marks: BTreeMap<&'a str, Mark> = BTreeMap::new();
        for &root in self.nodes.keys() {
            if marks.contains_key(root) {
                continue;
            }

            // Iterative DFS; `path` mirrors the active frames.
            let mut path: Vec<&'a str> = vec![root];
            let mut frames: Vec<std::vec::IntoIter<&'a str>> = vec![self.callees(root)];
            marks.insert(root, Mark::Active);

            while let Some(frame) = frames.last_mut() {
                match frame.next() {
                    Some(callee) => match marks.get(callee) {
                        Some(Mark::Active) => {
                            let start = path.iter().position(|f| *f == callee).unwrap_or(0);
                            let mut cycle = path[start..].to_vec();
                            cycle.push(callee);
                            return Some(cycle);
                        }
                        Some(Mark::Done) => {}
                        None => {
                            marks.insert(callee, Mark::Active);
                            path.push(callee);
                            frames.push(self.callees(callee));
                        }
                    },
                    None => {
                        frames.pop();
                        if let Some(done) = path.pop() {
                            marks.insert(done, Mark::Done);
                        }
                    }
                }
            }
        }
        None
    }

    fn callees(&self, function: &str) -> std::vec::IntoIter<&'a str> {
        self.nodes
            .get(function)
            .map(|node| {
                node.calls
                    .iter()
                    .copied()
                    .filter(|callee| self.nodes.contains_key(callee))
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default()
            .into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::Stage;
    use crate::program::Function;

    fn chain_program() -> ShaderProgram {
        // main -> mid -> leaf; leaf uses `a`, mid uses `b`; `c` is only used by `orphan`.
        ShaderProgram::new()
            .with_function(Function::helper("leaf").using("a"))
            .with_function(Function::helper("mid").using("b").calling("leaf"))
            .with_function(Function::helper("orphan").using("c"))
            .with_function(Function::entry_point("main", Stage::Fragment).calling("mid"))
    }

    #[test]
    fn closure_follows_multi_level_calls() {
        let program = chain_program();
        let graph = CallGraph::build(&program);

        let functions: Vec<_> = graph.reachable_functions("main").into_iter().collect();
        assert_eq!(functions, ["leaf", "main", "mid"]);

        let globals: Vec<_> = graph.reachable_globals("main").into_iter().collect();
        assert_eq!(globals, ["a", "b"]);
    }

    #[test]
    fn unknown_entry_reaches_nothing() {
        let program = chain_program();
        let graph = CallGraph::build(&program);
        assert!(graph.reachable_globals("missing").is_empty());
    }

    #[test]
    fn unresolved_calls_are_listed() {
        let program = ShaderProgram::new()
            .with_function(Function::entry_point("main", Stage::Compute).calling("nowhere"));
        let graph = CallGraph::build(&program);
        assert_eq!(graph.unresolved_calls(), vec![("main", "nowhere")]);
        assert_eq!(graph.reachable_functions("main").len(), 1);
    }

    #[test]
    fn acyclic_graph_has_no_cycle() {
        let program = chain_program();
        assert_eq!(CallGraph::build(&program).find_cycle(), None);
    }

    #[test]
    fn cycle_is_reported_with_path() {
        let program = ShaderProgram::new()
            .with_function(Function::helper("a").calling("b"))
            .with_function(Function::helper("b").calling("c"))
            .with_function(Function::helper("c").calling("a"))
            .with_function(Function::entry_point("main", Stage::Vertex).calling("a"));
        let graph = CallGraph::build(&program);

        let cycle = graph.find_cycle().expect("cycle");
        assert_eq!(cycle.first(), cycle.last());
        assert_eq!(cycle.len(), 4);

        // Closure still terminates.
        let reached: Vec<_> = graph.reachable_functions("main").into_iter().collect();
        assert_eq!(reached, ["a", "b", "c", "main"]);
    }

    #[test]
    fn self_call_is_a_cycle() {
        let program =
            ShaderProgram::new().with_function(Function::helper("f").calling("f"));
        assert_eq!(CallGraph::build(&program).find_cycle(), Some(vec!["f", "f"]));
    }
}
