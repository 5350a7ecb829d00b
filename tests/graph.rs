// tests/graph.rs

use topotask::DependencyGraph;
use topotask_test_utils::recipe::Recipe;

fn diamond() -> Vec<Recipe> {
    // 4 needs 2 and 3, both of which need 1. 5 stands alone.
    vec![
        Recipe::new(4).needs(&[3, 2]),
        Recipe::new(2).needs(&[1]),
        Recipe::new(3).needs(&[1]),
        Recipe::new(1),
        Recipe::new(5),
    ]
}

#[test]
fn wires_parents_and_children_both_ways() {
    let graph = DependencyGraph::build(&diamond(), Recipe::identifier, Recipe::edges).unwrap();

    assert_eq!(graph.len(), 5);
    // Parents keep the declared order: 4 lists 3 before 2.
    assert_eq!(graph.parents_of(0), &[2, 1]);
    assert_eq!(graph.children_of(3), &[1, 2]);
    assert_eq!(graph.children_of(1), &[0]);
    assert!(graph.children_of(0).is_empty());
}

#[test]
fn roots_are_elements_without_dependencies() {
    let graph = DependencyGraph::build(&diamond(), Recipe::identifier, Recipe::edges).unwrap();

    assert_eq!(graph.roots(), &[3, 4]);
    assert!(graph.node(3).is_some_and(|n| n.is_root()));
    assert!(!graph.node(0).is_some_and(|n| n.is_root()));
}

#[test]
fn index_lookup_and_descendants() {
    let graph = DependencyGraph::build(&diamond(), Recipe::identifier, Recipe::edges).unwrap();

    let one = graph.index_of(&1).unwrap();
    assert_eq!(graph.descendants_of(one), vec![0, 1, 2]);
    assert!(graph.descendants_of(graph.index_of(&5).unwrap()).is_empty());
    assert_eq!(graph.index_of(&99), None);
}

#[test]
fn topological_order_respects_edges() {
    let graph = DependencyGraph::build(&diamond(), Recipe::identifier, Recipe::edges).unwrap();
    let order = graph.topological_order();

    let position = |i: usize| order.iter().position(|&o| o == i).unwrap();
    for node in graph.nodes() {
        for &p in &node.parents {
            assert!(position(p) < position(node.index), "{p} must precede {}", node.index);
        }
    }
}

#[test]
fn repeated_dependency_is_one_child_edge() {
    let recipes = vec![Recipe::new(1), Recipe::new(2).needs(&[1, 1])];
    let graph = DependencyGraph::build(&recipes, Recipe::identifier, Recipe::edges).unwrap();

    assert_eq!(graph.parents_of(1), &[0, 0]);
    assert_eq!(graph.children_of(0), &[1]);
}

#[test]
fn cycle_fails_construction() {
    let recipes = vec![Recipe::new(1).needs(&[2]), Recipe::new(2).needs(&[1])];
    let err = DependencyGraph::build(&recipes, Recipe::identifier, Recipe::edges).unwrap_err();
    assert!(err.is_cycle());
}

#[test]
fn unknown_dependency_fails_construction() {
    let recipes = vec![Recipe::new(1).needs(&[3])];
    let err = DependencyGraph::build(&recipes, Recipe::identifier, Recipe::edges).unwrap_err();
    assert!(err.to_string().contains("unknown dependency 3"), "{err}");
}
