use memtree_core::tree::mutation::{add_child, delete_subtree, rename, update_content};
use memtree_core::tree::query::{exists, find};
use memtree_core::{MemoryNode, MemoryTree, TreeError};
use std::collections::HashSet;
use std::sync::Arc;

fn doc(parent: &str, name: &str) -> MemoryNode {
    MemoryNode::new_document(parent, name, "")
}

fn sample_tree() -> MemoryTree {
    // /
    // ├── notes
    // │   └── todo
    // └── journal
    let tree = MemoryTree::new();
    let tree = add_child(&tree, "/", doc("/", "notes")).unwrap();
    let tree = add_child(&tree, "/notes", doc("/notes", "todo")).unwrap();
    add_child(&tree, "/", doc("/", "journal")).unwrap()
}

fn assert_unique_paths(tree: &MemoryTree) {
    let mut seen = HashSet::new();
    for node in tree.iter() {
        assert!(seen.insert(node.path.clone()), "duplicate path {}", node.path);
    }
}

#[test]
fn add_child_to_root_only_tree() {
    let tree = MemoryTree::new();
    let next = add_child(
        &tree,
        "/",
        MemoryNode::with_id(uuid::Uuid::new_v4(), "/notes", "notes", ""),
    )
    .unwrap();

    assert_eq!(next.root().children.len(), 1);
    assert_eq!(next.root().children[0].path, "/notes");
    assert!(exists(&next, "/notes"));
    assert!(!exists(&tree, "/notes"));
}

#[test]
fn add_then_delete_restores_root_only_tree() {
    let tree = MemoryTree::new();
    let tree = add_child(&tree, "/", doc("/", "notes")).unwrap();
    let tree = add_child(&tree, "/notes", doc("/notes", "todo")).unwrap();
    let tree = delete_subtree(&tree, "/notes").unwrap();

    assert!(tree.root().children.is_empty());
    assert!(!exists(&tree, "/notes"));
    assert!(!exists(&tree, "/notes/todo"));
    assert_eq!(tree.len(), 1);
}

#[test]
fn add_child_appends_in_insertion_order() {
    let tree = sample_tree();
    let names: Vec<&str> = tree
        .root()
        .children
        .iter()
        .map(|child| child.name.as_str())
        .collect();
    assert_eq!(names, vec!["notes", "journal"]);
}

#[test]
fn add_child_rejects_missing_parent() {
    let tree = MemoryTree::new();
    let err = add_child(&tree, "/missing", doc("/missing", "x")).unwrap_err();
    assert_eq!(err, TreeError::ParentNotFound("/missing".to_string()));
}

#[test]
fn add_child_rejects_path_mismatch() {
    let tree = sample_tree();
    let err = add_child(&tree, "/journal", doc("/notes", "x")).unwrap_err();
    assert_eq!(
        err,
        TreeError::PathMismatch {
            expected: "/journal/x".to_string(),
            actual: "/notes/x".to_string(),
        }
    );
}

#[test]
fn add_child_rejects_collision_and_keeps_tree() {
    let tree = sample_tree();
    let err = add_child(&tree, "/", doc("/", "notes")).unwrap_err();
    assert_eq!(err, TreeError::PathCollision("/notes".to_string()));
    assert_eq!(tree.len(), 4);
    assert_unique_paths(&tree);
}

#[test]
fn add_child_rejects_reused_id() {
    let tree = sample_tree();
    let existing_id = find(&tree, "/journal").unwrap().id;
    let clash = MemoryNode::with_id(existing_id, "/other", "other", "");
    let err = add_child(&tree, "/", clash).unwrap_err();
    assert_eq!(err, TreeError::DuplicateId(existing_id));
}

#[test]
fn add_child_rejects_separator_in_name() {
    let tree = MemoryTree::new();
    let bad = MemoryNode::with_id(uuid::Uuid::new_v4(), "/x/y", "x/y", "");
    let err = add_child(&tree, "/", bad).unwrap_err();
    assert!(matches!(err, TreeError::InvalidName(_)));
}

#[test]
fn add_child_accepts_consistent_subtree() {
    let tree = MemoryTree::new();
    let folder = doc("/", "projects").with_child(doc("/projects", "alpha"));
    let tree = add_child(&tree, "/", folder).unwrap();
    assert!(exists(&tree, "/projects/alpha"));
}

#[test]
fn delete_removes_exactly_the_subtree() {
    let tree = sample_tree();
    let journal_before = Arc::clone(find(&tree, "/journal").unwrap());

    let next = delete_subtree(&tree, "/notes").unwrap();
    assert!(!exists(&next, "/notes"));
    assert!(next.iter().all(|node| !node.path.starts_with("/notes/")));

    let journal_after = find(&next, "/journal").unwrap();
    assert!(Arc::ptr_eq(&journal_before, journal_after));
    assert_unique_paths(&next);
}

#[test]
fn delete_root_is_rejected() {
    let tree = sample_tree();
    assert_eq!(delete_subtree(&tree, "/").unwrap_err(), TreeError::RootDeletion);
    assert_eq!(delete_subtree(&tree, "").unwrap_err(), TreeError::RootDeletion);
    assert_eq!(tree.len(), 4);
}

#[test]
fn delete_missing_path_is_an_error() {
    let tree = sample_tree();
    let err = delete_subtree(&tree, "/nope").unwrap_err();
    assert_eq!(err, TreeError::NodeNotFound("/nope".to_string()));
}

#[test]
fn update_content_shares_unaffected_subtrees() {
    let tree = sample_tree();
    let next = update_content(&tree, "/notes", "Hello").unwrap();

    assert_eq!(find(&next, "/notes").unwrap().content, "Hello");
    assert_eq!(find(&tree, "/notes").unwrap().content, "");

    assert!(!Arc::ptr_eq(tree.root(), next.root()));
    assert!(Arc::ptr_eq(
        find(&tree, "/journal").unwrap(),
        find(&next, "/journal").unwrap()
    ));
    assert!(Arc::ptr_eq(
        find(&tree, "/notes/todo").unwrap(),
        find(&next, "/notes/todo").unwrap()
    ));
}

#[test]
fn update_content_preserves_identity() {
    let tree = sample_tree();
    let before = Arc::clone(find(&tree, "/notes/todo").unwrap());
    let next = update_content(&tree, "/notes/todo", "- [ ] ship").unwrap();
    let after = find(&next, "/notes/todo").unwrap();

    assert_eq!(after.id, before.id);
    assert_eq!(after.path, before.path);
    assert_eq!(after.name, before.name);
}

#[test]
fn update_content_on_missing_path_is_an_error() {
    let tree = sample_tree();
    let err = update_content(&tree, "/nope", "x").unwrap_err();
    assert_eq!(err, TreeError::NodeNotFound("/nope".to_string()));
}

#[test]
fn rename_rewrites_subtree_paths_and_keeps_ids() {
    let tree = sample_tree();
    let todo_id = find(&tree, "/notes/todo").unwrap().id;

    let next = rename(&tree, "/notes", "archive").unwrap();
    assert!(!exists(&next, "/notes"));
    assert!(!exists(&next, "/notes/todo"));
    let moved = find(&next, "/archive/todo").unwrap();
    assert_eq!(moved.id, todo_id);
    assert_eq!(next.root().children[0].name, "archive");
    assert_unique_paths(&next);
}

#[test]
fn rename_rejects_collision_and_root() {
    let tree = sample_tree();
    assert_eq!(
        rename(&tree, "/notes", "journal").unwrap_err(),
        TreeError::PathCollision("/journal".to_string())
    );
    assert_eq!(rename(&tree, "/", "x").unwrap_err(), TreeError::RootRename);
}

#[test]
fn uniqueness_holds_across_mixed_sequences() {
    let mut tree = MemoryTree::new();
    for name in ["a", "b", "c"] {
        tree = add_child(&tree, "/", doc("/", name)).unwrap();
        tree = add_child(&tree, &format!("/{name}"), doc(&format!("/{name}"), "inner")).unwrap();
    }
    tree = delete_subtree(&tree, "/b").unwrap();
    tree = add_child(&tree, "/", doc("/", "b")).unwrap();
    assert!(add_child(&tree, "/a", doc("/a", "inner")).is_err());

    assert_unique_paths(&tree);
    assert_eq!(tree.len(), 1 + 3 + 2);
}

#[test]
fn json_snapshot_round_trip_keeps_ids_and_order() {
    let tree = sample_tree();
    let json = tree.to_json_pretty().unwrap();
    let restored = MemoryTree::from_json(&json).unwrap();
    assert_eq!(restored, tree);
}
