use memtree_core::tree::mutation::add_child;
use memtree_core::{flatten, navigate, MemoryNode, MemoryTree, NavCommand, TreeKey, VisibleRow};
use std::collections::HashSet;
use std::sync::Arc;

fn doc(parent: &str, name: &str) -> MemoryNode {
    MemoryNode::new_document(parent, name, "")
}

/// `/` -> `/a` -> `/a/b`, plus a sibling leaf `/c`.
fn nested_tree() -> MemoryTree {
    let tree = MemoryTree::new();
    let tree = add_child(&tree, "/", doc("/", "a")).unwrap();
    let tree = add_child(&tree, "/a", doc("/a", "b")).unwrap();
    add_child(&tree, "/", doc("/", "c")).unwrap()
}

fn expanded(paths: &[&str]) -> HashSet<String> {
    paths.iter().map(|path| path.to_string()).collect()
}

fn paths(rows: &[VisibleRow]) -> Vec<&str> {
    rows.iter().map(|row| row.path()).collect()
}

#[test]
fn flatten_follows_expansion_set() {
    let tree = nested_tree();

    let collapsed = flatten(&tree, &expanded(&[]));
    assert_eq!(paths(&collapsed), vec!["/"]);
    assert!(!collapsed[0].is_expanded);
    assert!(collapsed[0].has_children);

    let root_only = flatten(&tree, &expanded(&["/"]));
    assert_eq!(paths(&root_only), vec!["/", "/a", "/c"]);

    let all = flatten(&tree, &expanded(&["/", "/a"]));
    assert_eq!(paths(&all), vec!["/", "/a", "/a/b", "/c"]);
    let depths: Vec<usize> = all.iter().map(|row| row.depth).collect();
    assert_eq!(depths, vec![0, 1, 2, 1]);
}

#[test]
fn flatten_hides_descendants_of_collapsed_nodes() {
    let tree = nested_tree();
    // `/a` expanded but `/` collapsed: nothing under the root shows.
    let rows = flatten(&tree, &expanded(&["/a"]));
    assert_eq!(paths(&rows), vec!["/"]);
}

#[test]
fn expanding_a_leaf_has_no_effect() {
    let tree = nested_tree();
    let rows = flatten(&tree, &expanded(&["/", "/c"]));
    let leaf = rows.iter().find(|row| row.path() == "/c").unwrap();
    assert!(!leaf.is_expanded);
    assert!(!leaf.has_children);
}

#[test]
fn rows_share_tree_nodes_and_indent_by_depth() {
    let tree = nested_tree();
    let rows = flatten(&tree, &expanded(&["/", "/a"]));
    assert!(Arc::ptr_eq(&rows[0].node, tree.root()));
    assert_eq!(rows[2].indent(16), 32);
}

#[test]
fn keyboard_scenario_down_then_left_to_parent() {
    let tree = MemoryTree::new();
    let tree = add_child(&tree, "/", doc("/", "a")).unwrap();
    let tree = add_child(&tree, "/a", doc("/a", "b")).unwrap();
    let rows = flatten(&tree, &expanded(&["/", "/a"]));
    assert_eq!(paths(&rows), vec!["/", "/a", "/a/b"]);

    assert_eq!(
        navigate(&rows, 0, TreeKey::ArrowDown),
        NavCommand::Focus {
            index: 1,
            path: "/a".to_string()
        }
    );
    assert_eq!(
        navigate(&rows, 2, TreeKey::ArrowLeft),
        NavCommand::Focus {
            index: 1,
            path: "/a".to_string()
        }
    );
}

#[test]
fn arrow_keys_stop_at_list_ends() {
    let tree = nested_tree();
    let rows = flatten(&tree, &expanded(&["/", "/a"]));
    assert_eq!(navigate(&rows, 0, TreeKey::ArrowUp), NavCommand::None);
    assert_eq!(navigate(&rows, 3, TreeKey::ArrowDown), NavCommand::None);
    assert_eq!(navigate(&rows, 99, TreeKey::ArrowDown), NavCommand::None);
}

#[test]
fn arrow_right_expands_then_enters_children() {
    let tree = nested_tree();
    let rows = flatten(&tree, &expanded(&["/"]));
    assert_eq!(
        navigate(&rows, 1, TreeKey::ArrowRight),
        NavCommand::Expand {
            path: "/a".to_string()
        }
    );

    let rows = flatten(&tree, &expanded(&["/", "/a"]));
    assert_eq!(
        navigate(&rows, 1, TreeKey::ArrowRight),
        NavCommand::Focus {
            index: 2,
            path: "/a/b".to_string()
        }
    );
    assert_eq!(navigate(&rows, 2, TreeKey::ArrowRight), NavCommand::None);
}

#[test]
fn arrow_left_collapses_expanded_parent_and_stops_at_root() {
    let tree = nested_tree();
    let rows = flatten(&tree, &expanded(&["/", "/a"]));
    assert_eq!(
        navigate(&rows, 1, TreeKey::ArrowLeft),
        NavCommand::Collapse {
            path: "/a".to_string()
        }
    );

    let rows = flatten(&tree, &expanded(&[]));
    assert_eq!(navigate(&rows, 0, TreeKey::ArrowLeft), NavCommand::None);
}

#[test]
fn action_keys_map_to_requests() {
    let tree = nested_tree();
    let rows = flatten(&tree, &expanded(&["/"]));

    assert_eq!(
        navigate(&rows, 1, TreeKey::Enter),
        NavCommand::Select {
            path: "/a".to_string()
        }
    );
    assert_eq!(
        navigate(&rows, 2, TreeKey::Space),
        NavCommand::Select {
            path: "/c".to_string()
        }
    );
    assert_eq!(
        navigate(&rows, 2, TreeKey::Delete),
        NavCommand::RequestDelete {
            path: "/c".to_string()
        }
    );
    assert_eq!(navigate(&rows, 0, TreeKey::Backspace), NavCommand::None);
    assert_eq!(
        navigate(&rows, 0, TreeKey::from_key_name("a")),
        NavCommand::RequestAddChild {
            path: "/".to_string()
        }
    );
    assert_eq!(navigate(&rows, 1, TreeKey::Char('z')), NavCommand::None);
}
