//! Property tests for story graph derivations over arbitrary, possibly cyclic, edge sets.

use proptest::prelude::*;
use std::collections::HashSet;

use story_codegen::{ContextTree, GraphModel, StoryGraph};
use story_model::{NarrativeNode, NodeId, SlotTable, StoryModel};

/// A node count and successor edges between node indices.
fn graph_strategy() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (1usize..8).prop_flat_map(|count| (Just(count), prop::collection::vec((0..count, 0..count), 0..20)))
}

fn build(count: usize, edges: &[(usize, usize)]) -> (StoryModel, Vec<NodeId>) {
    let mut model = StoryModel::default();
    let root = model.root();
    let ids: Vec<NodeId> = (0..count)
        .map(|i| model.insert_child(root, NarrativeNode::story(format!("P{i}"))).unwrap())
        .collect();
    for (from, to) in edges {
        model.add_successor(ids[*from], ids[*to]).unwrap();
    }
    (model, ids)
}

proptest! {
    #[test]
    fn prop_parents_match_forward_edges((count, edges) in graph_strategy()) {
        let (mut model, ids) = build(count, &edges);
        let graph = StoryGraph::new(&mut model, ids[0]).unwrap();
        let reachable = graph.nodes();

        for &node in &ids {
            let parents = graph.parents(node);
            let unique: HashSet<_> = parents.iter().copied().collect();
            prop_assert_eq!(unique.len(), parents.len());

            for &candidate in &reachable {
                let leads_here = graph.children(candidate).contains(&node);
                prop_assert_eq!(unique.contains(&candidate), leads_here);
            }
            prop_assert!(unique.is_subset(&reachable));
        }
    }

    #[test]
    fn prop_traversal_visits_each_node_once((count, edges) in graph_strategy()) {
        let (mut model, ids) = build(count, &edges);
        let graph = StoryGraph::new(&mut model, ids[0]).unwrap();

        let order = graph.story_points();
        let unique: HashSet<_> = order.iter().copied().collect();
        prop_assert_eq!(order.first().copied(), Some(ids[0]));
        prop_assert_eq!(unique.len(), order.len());
        prop_assert_eq!(unique, graph.nodes());
    }

    #[test]
    fn prop_ancestors_mirror_descendants((count, edges) in graph_strategy()) {
        let (mut model, ids) = build(count, &edges);
        let graph = StoryGraph::new(&mut model, ids[0]).unwrap();
        let reachable = graph.nodes();

        for &upper in &reachable {
            let descendants = graph.descendants_of(upper);
            for &lower in &reachable {
                prop_assert_eq!(descendants.contains(&lower), graph.ancestors(lower).contains(&upper));
            }
        }
    }

    #[test]
    fn prop_depths_and_paths((count, edges) in graph_strategy()) {
        let (mut model, ids) = build(count, &edges);
        let graph = StoryGraph::new(&mut model, ids[0]).unwrap();
        let reachable = graph.nodes();
        let depths = graph.depth_map();

        prop_assert_eq!(depths.keys().copied().collect::<HashSet<_>>(), reachable.clone());
        prop_assert_eq!(depths[&ids[0]], 0);

        for &node in reachable.iter().filter(|n| **n != ids[0]) {
            prop_assert!(depths[&node] >= 1);

            let path = graph.path_between(ids[0], node);
            prop_assert_eq!(path.first().copied(), Some(ids[0]));
            prop_assert_eq!(path.last().copied(), Some(node));
            for step in path.windows(2) {
                prop_assert!(graph.children(step[0]).contains(&step[1]));
            }
        }
    }

    #[test]
    fn prop_context_parents_agree_with_graph((count, edges) in graph_strategy()) {
        let (mut model, ids) = build(count, &edges);
        let expected: Vec<Vec<NodeId>> = {
            let graph = StoryGraph::new(&mut model, ids[0]).unwrap();
            ids.iter().map(|id| graph.parents(*id)).collect()
        };

        let slots = SlotTable::new();
        let tree = ContextTree::build(&model, &slots, Some(ids[0])).unwrap();
        for (id, parents) in ids.iter().zip(&expected) {
            let derived: Vec<NodeId> = tree
                .context_for(*id)
                .unwrap()
                .story_parents()
                .unwrap()
                .iter()
                .map(|context| context.component().id)
                .collect();
            prop_assert_eq!(&derived, parents);
        }
    }
}
