//! Cycle-safe traversal over forward edges.
//!
//! Every function takes the successor relation as a closure so the same
//! walks serve the story model, the editing graph and the context tree.
//! All of them keep a visited set and terminate on cyclic graphs.

use std::collections::{HashMap, HashSet, VecDeque};
use std::hash::Hash;

/// Nodes reachable from `root` in depth-first preorder, `root` first.
///
/// Each node appears once, at its first visit.
pub fn ordered_reachable<N, F, I>(root: N, mut successors: F) -> Vec<N>
where
    N: Copy + Eq + Hash,
    F: FnMut(N) -> I,
    I: IntoIterator<Item = N>,
{
    let mut visited = HashSet::new();
    let mut order = Vec::new();
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        if !visited.insert(node) {
            continue;
        }
        order.push(node);

        let next: Vec<N> = successors(node).into_iter().collect();
        stack.extend(next.into_iter().rev().filter(|n| !visited.contains(n)));
    }

    order
}

/// Every node reachable from `root`, including `root`.
pub fn reachable_from<N, F, I>(root: N, successors: F) -> HashSet<N>
where
    N: Copy + Eq + Hash,
    F: FnMut(N) -> I,
    I: IntoIterator<Item = N>,
{
    ordered_reachable(root, successors).into_iter().collect()
}

/// Nodes reached from `node` by following at least one edge.
///
/// `node` itself is included only when it lies on a cycle.
pub fn descendants<N, F, I>(node: N, mut successors: F) -> HashSet<N>
where
    N: Copy + Eq + Hash,
    F: FnMut(N) -> I,
    I: IntoIterator<Item = N>,
{
    let mut visited = HashSet::new();
    let mut stack: Vec<N> = successors(node).into_iter().collect();

    while let Some(current) = stack.pop() {
        if visited.insert(current) {
            stack.extend(successors(current));
        }
    }

    visited
}

/// Nodes reachable from `root` whose successors contain `node`.
///
/// Parents are never stored. They are recomputed from the forward edges on
/// each call, in preorder of the walk from `root`. A node outside the
/// reachable set has no parents.
pub fn parents_within<N, F, I>(root: N, node: N, mut successors: F) -> Vec<N>
where
    N: Copy + Eq + Hash,
    F: FnMut(N) -> I,
    I: IntoIterator<Item = N>,
{
    ordered_reachable(root, &mut successors)
        .into_iter()
        .filter(|candidate| successors(*candidate).into_iter().any(|s| s == node))
        .collect()
}

struct Frame<N> {
    node: N,
    children: Vec<N>,
    next: usize,
}

/// Longest-path depth of every node reachable from `start`.
///
/// `start` has depth 0. Edges that close a cycle back onto the current walk
/// are ignored, so depths stay finite on cyclic graphs.
pub fn depth_map<N, F, I>(start: N, mut successors: F) -> HashMap<N, usize>
where
    N: Copy + Eq + Hash,
    F: FnMut(N) -> I,
    I: IntoIterator<Item = N>,
{
    let mut visited = HashSet::from([start]);
    let mut on_stack = HashSet::from([start]);
    let mut back_edges = HashSet::new();
    let mut postorder = Vec::new();
    let mut stack = vec![Frame {
        node: start,
        children: successors(start).into_iter().collect(),
        next: 0,
    }];

    while let Some(frame) = stack.last_mut() {
        if frame.next < frame.children.len() {
            let node = frame.node;
            let child = frame.children[frame.next];
            frame.next += 1;

            if on_stack.contains(&child) {
                back_edges.insert((node, child));
            } else if visited.insert(child) {
                on_stack.insert(child);
                stack.push(Frame {
                    node: child,
                    children: successors(child).into_iter().collect(),
                    next: 0,
                });
            }
        } else {
            let node = frame.node;
            stack.pop();
            on_stack.remove(&node);
            postorder.push(node);
        }
    }

    let mut depths = HashMap::from([(start, 0)]);
    for &node in postorder.iter().rev() {
        let depth = depths.get(&node).copied().unwrap_or(0);
        for child in successors(node) {
            if back_edges.contains(&(node, child)) {
                continue;
            }
            let entry = depths.entry(child).or_insert(0);
            *entry = (*entry).max(depth + 1);
        }
    }

    depths
}

/// Shortest path from `start` to `end` following forward edges.
///
/// The path includes both ends. Empty when `end` is not a descendant of
/// `start`.
pub fn shortest_path<N, F, I>(start: N, end: N, mut successors: F) -> Vec<N>
where
    N: Copy + Eq + Hash,
    F: FnMut(N) -> I,
    I: IntoIterator<Item = N>,
{
    let mut previous: HashMap<N, N> = HashMap::new();
    let mut queue = VecDeque::from([start]);
    let mut seen = HashSet::new();

    while let Some(node) = queue.pop_front() {
        for child in successors(node) {
            if !seen.insert(child) {
                continue;
            }
            previous.insert(child, node);
            if child == end {
                let mut path = vec![end];
                let mut current = node;
                while current != start {
                    path.push(current);
                    match previous.get(&current) {
                        Some(prior) => current = *prior,
                        None => break,
                    }
                }
                path.push(start);
                path.reverse();
                return path;
            }
            queue.push_back(child);
        }
    }

    Vec::new()
}
