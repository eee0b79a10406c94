//! Integration tests for selector matching against a built tree.

use wisp_css::{CSSParser, RuleSet, parse_selector};
use wisp_dom::{Attribute, DomTree, ElementData, NodeId, NodeType};

fn append_element(tree: &mut DomTree, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
    let attrs = attrs
        .iter()
        .map(|(name, value)| Attribute::new(*name, *value))
        .collect();
    let id = tree.alloc(NodeType::Element(ElementData::new(tag, attrs)));
    tree.append_child(parent, id);
    id
}

fn rule_set(css: &str) -> RuleSet {
    let mut rules = RuleSet::new();
    rules.add_stylesheet(&CSSParser::parse_css(css));
    rules
}

/// `body > div > (img#myid, span > img)` plus a stray `img` directly in `body`.
struct Sample {
    tree: DomTree,
    direct_img: NodeId,
    nested_img: NodeId,
    outside_img: NodeId,
}

fn sample() -> Sample {
    let mut tree = DomTree::new();
    let root = tree.root();
    let body = append_element(&mut tree, root, "body", &[]);
    let div = append_element(&mut tree, body, "div", &[("class", "wrapper")]);
    let direct_img = append_element(&mut tree, div, "img", &[("id", "myid")]);
    let span = append_element(&mut tree, div, "span", &[]);
    let nested_img = append_element(&mut tree, span, "img", &[]);
    let outside_img = append_element(&mut tree, body, "img", &[]);
    Sample {
        tree,
        direct_img,
        nested_img,
        outside_img,
    }
}

#[test]
fn test_id_descendant_rule_matches() {
    let sample = sample();
    let rules = rule_set("body div #myid { width: 100px }");

    let style = rules.compute_style_in_tree(&sample.tree, sample.direct_img);
    assert_eq!(style.get("width").map(String::as_str), Some("100px"));
    assert!(
        rules
            .compute_style_in_tree(&sample.tree, sample.nested_img)
            .is_empty()
    );
}

#[test]
fn test_descendant_chain_skips_intervening_elements() {
    let sample = sample();
    let selector = parse_selector("body div img").unwrap();

    assert!(selector.matches_in_tree(&sample.tree, sample.direct_img));
    assert!(selector.matches_in_tree(&sample.tree, sample.nested_img));
    assert!(!selector.matches_in_tree(&sample.tree, sample.outside_img));
}

#[test]
fn test_class_matches_whole_attribute() {
    let sample = sample();
    let selector = parse_selector(".wrapper img").unwrap();
    assert!(selector.matches_in_tree(&sample.tree, sample.nested_img));
    assert!(!parse_selector(".wrap img").unwrap().matches_in_tree(&sample.tree, sample.nested_img));
}

#[test]
fn test_document_node_never_matches() {
    let sample = sample();
    let selector = parse_selector("body").unwrap();
    assert!(!selector.matches_in_tree(&sample.tree, sample.tree.root()));
    assert!(rule_set("body { x: y }")
        .compute_style_in_tree(&sample.tree, sample.tree.root())
        .is_empty());
}

#[test]
fn test_matching_rules_in_insertion_order() {
    let sample = sample();
    let rules = rule_set("img { a: 1 } div img { a: 2 } span { a: 3 } #myid { a: 4 }");
    let element = sample.tree.as_element(sample.direct_img).unwrap();
    let ancestors: Vec<&ElementData> = sample
        .tree
        .ancestors(sample.direct_img)
        .filter_map(|id| sample.tree.as_element(id))
        .collect();

    let matched = rules.matching_rules(element, ancestors.iter().copied());
    let values: Vec<&str> = matched
        .iter()
        .map(|rule| rule.declarations[0].value.as_str())
        .collect();
    assert_eq!(values, ["1", "2", "4"]);

    let style = rules.compute_style(element, ancestors.iter().copied());
    assert_eq!(style.get("a").map(String::as_str), Some("4"));
}

#[test]
fn test_rule_set_serializes_as_list() {
    let rules = rule_set("body div #myid { width: 100px !important }");
    let json = serde_json::to_value(&rules).unwrap();
    assert_eq!(json[0]["selectors"][0]["text"], "body div #myid");
    assert_eq!(json[0]["declarations"][0]["name"], "width");
    assert_eq!(json[0]["declarations"][0]["important"], true);
}
