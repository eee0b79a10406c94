//! Tests for the arena tree: construction, traversal, lookups and serialization.

use wisp_dom::{Attribute, DomTree, ElementData, NodeId, NodeType};

/// Helper to create an element node and return its `NodeId`.
fn alloc_element(tree: &mut DomTree, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
    let attrs = attrs
        .iter()
        .map(|(name, value)| Attribute::new(*name, *value))
        .collect();
    tree.alloc(NodeType::Element(ElementData::new(tag, attrs)))
}

/// Builds `body > div > (img#myid, "hi")`.
fn sample_tree() -> (DomTree, NodeId, NodeId, NodeId) {
    let mut tree = DomTree::new();
    let body = alloc_element(&mut tree, "body", &[]);
    tree.append_child(NodeId::ROOT, body);
    let div = alloc_element(&mut tree, "div", &[("class", "wrapper")]);
    tree.append_child(body, div);
    let img = alloc_element(&mut tree, "img", &[("id", "myid")]);
    tree.append_child(div, img);
    let text = tree.alloc(NodeType::Text("hi".to_string()));
    tree.append_child(div, text);
    (tree, body, div, img)
}

#[test]
fn test_new_tree_has_only_document() {
    let tree = DomTree::new();
    assert_eq!(tree.len(), 1);
    assert!(!tree.is_empty());
    assert!(matches!(
        tree.get(NodeId::ROOT).map(|n| &n.node_type),
        Some(NodeType::Document)
    ));
    assert!(tree.children(NodeId::ROOT).is_empty());
    assert_eq!(tree.document_element(), None);
}

#[test]
fn test_append_child_links_parent() {
    let (tree, body, div, img) = sample_tree();
    assert_eq!(tree.children(NodeId::ROOT), &[body]);
    assert_eq!(tree.parent(div), Some(body));
    assert_eq!(tree.parent(img), Some(div));
    assert_eq!(tree.parent(NodeId::ROOT), None);
    assert_eq!(tree.document_element(), Some(body));
}

#[test]
fn test_ancestors_innermost_first() {
    let (tree, body, div, img) = sample_tree();
    let ancestors: Vec<NodeId> = tree.ancestors(img).collect();
    assert_eq!(ancestors, vec![div, body, NodeId::ROOT]);
}

#[test]
fn test_descendants_in_document_order() {
    let (tree, body, div, img) = sample_tree();
    let order: Vec<NodeId> = tree.descendants(NodeId::ROOT).collect();
    assert_eq!(order.len(), 5);
    assert_eq!(&order[..4], &[NodeId::ROOT, body, div, img]);
    assert_eq!(tree.as_text(order[4]), Some("hi"));
}

#[test]
fn test_attribute_accessors() {
    let (tree, _, div, img) = sample_tree();
    let img_data = tree.as_element(img).expect("img is an element");
    assert_eq!(img_data.id(), Some("myid"));
    assert_eq!(img_data.class_name(), None);

    let div_data = tree.as_element(div).expect("div is an element");
    assert_eq!(div_data.class_name(), Some("wrapper"));
    assert_eq!(div_data.get_attribute("missing"), None);
}

#[test]
fn test_text_content_and_lookup() {
    let (tree, body, _, img) = sample_tree();
    assert_eq!(tree.text_content(body), "hi");
    assert_eq!(tree.elements_by_tag_name("img"), vec![img]);
    assert!(tree.elements_by_tag_name("span").is_empty());
}

#[test]
fn test_append_child_ignores_unknown_ids() {
    let mut tree = DomTree::new();
    tree.append_child(NodeId::ROOT, NodeId(42));
    assert!(tree.children(NodeId::ROOT).is_empty());
    assert!(tree.children(NodeId(42)).is_empty());
}

#[test]
fn test_mutating_text() {
    let (mut tree, _, div, _) = sample_tree();
    let text = tree.children(div)[1];
    tree.as_text_mut(text).expect("text node").push('!');
    assert_eq!(tree.as_text(text), Some("hi!"));
    assert_eq!(tree.text_content(div), "hi!");
}

#[test]
fn test_serialize_nested_json() {
    let (tree, _, _, _) = sample_tree();
    let json = serde_json::to_value(&tree).expect("tree serializes");

    assert_eq!(json["type"], "document");
    let body = &json["children"][0];
    assert_eq!(body["tagName"], "body");
    let div = &body["children"][0];
    assert_eq!(div["attributes"][0]["name"], "class");
    assert_eq!(div["attributes"][0]["value"], "wrapper");
    assert_eq!(div["children"][0]["tagName"], "img");
    assert_eq!(div["children"][1]["type"], "text");
    assert_eq!(div["children"][1]["content"], "hi");
}
