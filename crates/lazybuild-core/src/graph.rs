//! Cycle detection over named edges (module dependencies, task wiring).

use std::collections::{BTreeMap, HashMap};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

/// Returns the first cycle found, as the list of nodes along it with the
/// starting node repeated at the end (`a -> b -> a`).
///
/// Edges to nodes with no entry of their own are treated as leaves.
/// Iteration follows `BTreeMap` order, so the result is deterministic.
pub fn find_cycle(edges: &BTreeMap<String, Vec<String>>) -> Option<Vec<String>> {
    let mut marks: HashMap<&str, Mark> = HashMap::new();
    let mut stack: Vec<&str> = Vec::new();

    for start in edges.keys() {
        if marks.contains_key(start.as_str()) {
            continue;
        }
        if let Some(cycle) = visit(start, edges, &mut marks, &mut stack) {
            return Some(cycle);
        }
    }
    None
}

fn visit<'a>(
    node: &'a str,
    edges: &'a BTreeMap<String, Vec<String>>,
    marks: &mut HashMap<&'a str, Mark>,
    stack: &mut Vec<&'a str>,
) -> Option<Vec<String>> {
    marks.insert(node, Mark::Visiting);
    stack.push(node);

    for next in edges.get(node).into_iter().flatten() {
        match marks.get(next.as_str()) {
            Some(Mark::Visiting) => {
                let pos = stack.iter().position(|n| *n == next.as_str())?;
                let mut cycle: Vec<String> = stack[pos..].iter().map(|s| s.to_string()).collect();
                cycle.push(next.clone());
                return Some(cycle);
            }
            Some(Mark::Done) => {}
            None => {
                if let Some(cycle) = visit(next, edges, marks, stack) {
                    return Some(cycle);
                }
            }
        }
    }

    stack.pop();
    marks.insert(node, Mark::Done);
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edges(pairs: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.iter().map(|s| s.to_string()).collect()))
            .collect()
    }

    #[test]
    fn test_acyclic() {
        let g = edges(&[
            ("startScripts", &["shadowJar"]),
            ("startShadowScripts", &["jar"]),
            ("shadowJar", &["jar"]),
        ]);
        assert!(find_cycle(&g).is_none());
    }

    #[test]
    fn test_simple_cycle() {
        let g = edges(&[("a", &["b"]), ("b", &["a"])]);
        assert_eq!(
            find_cycle(&g).unwrap(),
            vec!["a".to_string(), "b".to_string(), "a".to_string()]
        );
    }

    #[test]
    fn test_self_loop() {
        let g = edges(&[("jar", &["jar"])]);
        assert_eq!(find_cycle(&g).unwrap(), vec!["jar", "jar"]);
    }

    #[test]
    fn test_cycle_behind_leaf_edges() {
        let g = edges(&[
            (":app", &[":library", ":external"]),
            (":library", &[":util"]),
            (":util", &[":library"]),
        ]);
        assert_eq!(
            find_cycle(&g).unwrap(),
            vec![":library", ":util", ":library"]
        );
    }
}
