//! Tests for tree mutation methods: append_child, insert_before, remove_child,
//! move_children, and the sibling index they maintain.

use thicket_dom::{Attributes, DomTree, NodeData, NodeId, QuirksMode, TreeError};

/// Helper to create an element node and return its NodeId.
fn alloc_element(tree: &mut DomTree, tag: &str) -> NodeId {
    tree.alloc(NodeData::element(tag))
}

/// Helper asserting every child of `parent` knows its own position.
fn assert_indexed(tree: &DomTree, parent: NodeId) {
    for (index, &child) in tree.children(parent).iter().enumerate() {
        assert_eq!(tree.sibling_index(child), index, "stale index on {child}");
        assert_eq!(tree.parent(child), Some(parent));
    }
}

fn three_children(tree: &mut DomTree) -> (NodeId, NodeId, NodeId, NodeId) {
    let parent = alloc_element(tree, "div");
    tree.append_child(NodeId::ROOT, parent).unwrap();
    let a = alloc_element(tree, "a");
    let b = alloc_element(tree, "b");
    let c = alloc_element(tree, "c");
    tree.append_child(parent, a).unwrap();
    tree.append_child(parent, b).unwrap();
    tree.append_child(parent, c).unwrap();
    (parent, a, b, c)
}

// ========== append_child ==========

#[test]
fn test_append_sets_sibling_indices() {
    let mut tree = DomTree::new();
    let (parent, a, b, c) = three_children(&mut tree);

    assert_eq!(tree.children(parent), &[a, b, c]);
    assert_eq!(tree.sibling_index(c), 2);
    assert_eq!(tree.next_sibling(a), Some(b));
    assert_eq!(tree.prev_sibling(c), Some(b));
    assert_eq!(tree.prev_sibling(a), None);
    assert_eq!(tree.next_sibling(c), None);
    tree.validate().unwrap();
}

#[test]
fn test_append_moves_attached_node() {
    let mut tree = DomTree::new();
    let (parent, a, b, c) = three_children(&mut tree);
    let other = alloc_element(&mut tree, "section");
    tree.append_child(NodeId::ROOT, other).unwrap();

    tree.append_child(other, a).unwrap();

    assert_eq!(tree.children(parent), &[b, c]);
    assert_eq!(tree.children(other), &[a]);
    assert_indexed(&tree, parent);
    tree.validate().unwrap();
}

#[test]
fn test_append_rejects_cycle() {
    let mut tree = DomTree::new();
    let (parent, a, _, _) = three_children(&mut tree);

    assert_eq!(
        tree.append_child(a, parent),
        Err(TreeError::Cycle { parent: a, child: parent })
    );
    assert!(tree.append_child(a, a).is_err());
    tree.validate().unwrap();
}

#[test]
fn test_append_rejects_root_and_unknown() {
    let mut tree = DomTree::new();
    let div = alloc_element(&mut tree, "div");

    assert_eq!(tree.append_child(div, NodeId::ROOT), Err(TreeError::RootMoved));
    assert_eq!(
        tree.append_child(div, NodeId(99)),
        Err(TreeError::UnknownNode(NodeId(99)))
    );
}

// ========== remove_child ==========

#[test]
fn test_remove_child_first_of_three() {
    let mut tree = DomTree::new();
    let (parent, a, b, c) = three_children(&mut tree);

    tree.remove_child(parent, a).unwrap();

    assert_eq!(tree.children(parent), &[b, c]);
    assert_eq!(tree.parent(a), None);
    assert_eq!(tree.prev_sibling(b), None);
    assert_eq!(tree.next_sibling(b), Some(c));
    assert_indexed(&tree, parent);
    tree.validate().unwrap();
}

#[test]
fn test_remove_child_middle_of_three() {
    let mut tree = DomTree::new();
    let (parent, a, b, c) = three_children(&mut tree);

    tree.remove_child(parent, b).unwrap();

    assert_eq!(tree.children(parent), &[a, c]);
    assert_eq!(tree.next_sibling(a), Some(c));
    assert_eq!(tree.sibling_index(c), 1);
}

#[test]
fn test_remove_child_wrong_parent() {
    let mut tree = DomTree::new();
    let (parent, a, _, _) = three_children(&mut tree);

    assert_eq!(
        tree.remove_child(NodeId::ROOT, a),
        Err(TreeError::NotAChild {
            parent: NodeId::ROOT,
            child: a
        })
    );
    assert_eq!(tree.parent(a), Some(parent));
}

#[test]
fn test_detach_is_noop_for_detached_node() {
    let mut tree = DomTree::new();
    let loose = alloc_element(&mut tree, "p");
    tree.detach(loose).unwrap();
    assert_eq!(tree.parent(loose), None);
}

// ========== insert_before ==========

#[test]
fn test_insert_before_first() {
    let mut tree = DomTree::new();
    let (parent, a, b, c) = three_children(&mut tree);
    let new = alloc_element(&mut tree, "new");

    tree.insert_before(parent, new, Some(a)).unwrap();

    assert_eq!(tree.children(parent), &[new, a, b, c]);
    assert_indexed(&tree, parent);
}

#[test]
fn test_insert_before_none_appends() {
    let mut tree = DomTree::new();
    let (parent, a, b, c) = three_children(&mut tree);
    let new = alloc_element(&mut tree, "new");

    tree.insert_before(parent, new, None).unwrap();

    assert_eq!(tree.children(parent), &[a, b, c, new]);
}

#[test]
fn test_insert_before_reorders_existing_child() {
    let mut tree = DomTree::new();
    let (parent, a, b, c) = three_children(&mut tree);

    tree.insert_before(parent, c, Some(a)).unwrap();
    assert_eq!(tree.children(parent), &[c, a, b]);

    tree.insert_before(parent, c, Some(b)).unwrap();
    assert_eq!(tree.children(parent), &[a, c, b]);
    assert_indexed(&tree, parent);
    tree.validate().unwrap();
}

#[test]
fn test_insert_before_reference_not_a_child() {
    let mut tree = DomTree::new();
    let (parent, _, _, _) = three_children(&mut tree);
    let stranger = alloc_element(&mut tree, "x");
    let new = alloc_element(&mut tree, "new");

    assert!(matches!(
        tree.insert_before(parent, new, Some(stranger)),
        Err(TreeError::NotAChild { .. })
    ));
    assert_eq!(tree.parent(new), None);
}

// ========== move_children ==========

#[test]
fn test_move_children_appends_in_order() {
    let mut tree = DomTree::new();
    let (parent, a, b, c) = three_children(&mut tree);
    let target = alloc_element(&mut tree, "target");
    let existing = alloc_element(&mut tree, "existing");
    tree.append_child(NodeId::ROOT, target).unwrap();
    tree.append_child(target, existing).unwrap();

    tree.move_children(parent, target).unwrap();

    assert!(tree.children(parent).is_empty());
    assert_eq!(tree.children(target), &[existing, a, b, c]);
    assert_indexed(&tree, target);
    tree.validate().unwrap();
}

#[test]
fn test_move_children_into_descendant_is_cycle() {
    let mut tree = DomTree::new();
    let (parent, a, _, _) = three_children(&mut tree);

    assert!(matches!(
        tree.move_children(parent, a),
        Err(TreeError::Cycle { .. })
    ));
}

// ========== navigation ==========

#[test]
fn test_descendants_are_preorder() {
    let mut tree = DomTree::new();
    let (parent, a, b, c) = three_children(&mut tree);
    let inner = tree.alloc(NodeData::Text("hi".to_string()));
    tree.append_child(a, inner).unwrap();

    let order: Vec<NodeId> = tree.descendants(NodeId::ROOT).collect();
    assert_eq!(order, vec![NodeId::ROOT, parent, a, inner, b, c]);
    assert_eq!(tree.ancestors(inner).collect::<Vec<_>>(), vec![a, parent, NodeId::ROOT]);
    assert_eq!(tree.preceding_siblings(c).collect::<Vec<_>>(), vec![b, a]);
}

#[test]
fn test_text_content_concatenates_text_like_nodes() {
    let mut tree = DomTree::new();
    let p = alloc_element(&mut tree, "p");
    tree.append_child(NodeId::ROOT, p).unwrap();
    for data in [
        NodeData::Text("a".into()),
        NodeData::Comment("skipped".into()),
        NodeData::CData("b".into()),
        NodeData::Data("c".into()),
    ] {
        let id = tree.alloc(data);
        tree.append_child(p, id).unwrap();
    }
    assert_eq!(tree.text_content(p), "abc");
}

#[test]
fn test_document_element_head_body() {
    let mut tree = DomTree::new();
    let comment = tree.alloc(NodeData::Comment("c".into()));
    tree.append_child(NodeId::ROOT, comment).unwrap();
    let html = alloc_element(&mut tree, "html");
    tree.append_child(NodeId::ROOT, html).unwrap();
    let head = alloc_element(&mut tree, "head");
    let body = alloc_element(&mut tree, "body");
    tree.append_child(html, head).unwrap();
    tree.append_child(html, body).unwrap();

    assert_eq!(tree.document_element(), Some(html));
    assert_eq!(tree.head(), Some(head));
    assert_eq!(tree.body(), Some(body));
}

#[test]
fn test_quirks_mode_and_base_uri() {
    let mut tree = DomTree::with_base_uri("http://example.com/");
    assert_eq!(tree.quirks_mode(), QuirksMode::NoQuirks);
    tree.set_quirks_mode(QuirksMode::LimitedQuirks);
    assert_eq!(tree.quirks_mode(), QuirksMode::LimitedQuirks);

    let before = alloc_element(&mut tree, "a");
    tree.set_base_uri("http://example.com/sub/");
    let after = alloc_element(&mut tree, "a");
    assert_eq!(&*tree.get(before).unwrap().base_uri, "http://example.com/");
    assert_eq!(&*tree.get(after).unwrap().base_uri, "http://example.com/sub/");
}

// ========== validate ==========

#[test]
fn test_validate_detects_stale_index() {
    let mut tree = DomTree::new();
    let (_, a, _, _) = three_children(&mut tree);
    tree.get_mut(a).unwrap().sibling_index = 5;

    assert_eq!(
        tree.validate(),
        Err(TreeError::SiblingIndex {
            node: a,
            recorded: 5,
            actual: 0
        })
    );
}

#[test]
fn test_validate_detects_parent_mismatch() {
    let mut tree = DomTree::new();
    let (parent, a, b, _) = three_children(&mut tree);
    tree.get_mut(b).unwrap().parent = Some(a);

    assert_eq!(
        tree.validate(),
        Err(TreeError::ParentMismatch {
            parent,
            child: b,
            recorded: Some(a)
        })
    );
}

// ========== attributes ==========

#[test]
fn test_attributes_keep_source_order() {
    let mut attrs: Attributes = [("b", "1"), ("a", "2")].into_iter().collect();
    attrs.put("c", "3");
    attrs.put("b", "changed");

    let names: Vec<&str> = attrs.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["b", "a", "c"]);
    assert_eq!(attrs.get("b"), Some("changed"));
    assert_eq!(attrs.get_ignore_case("A"), Some("2"));
    assert_eq!(attrs.remove("a"), Some("2".to_string()));
    assert_eq!(attrs.to_string(), "b=\"changed\" c=\"3\"");
}
