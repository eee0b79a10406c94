//! Integration tests for tree construction and style computation.

use quickcheck_macros::quickcheck;
use wisp_dom::{DomTree, NodeId, NodeType};
use wisp_html::{Document, HTMLParser, HtmlError, parse_document, tree_to_string};

/// Helper to parse HTML and return the document
fn parse(html: &str) -> Document {
    parse_document(html).unwrap()
}

/// Helper to get element by tag name (first match in document order)
fn find_element(tree: &DomTree, tag: &str) -> NodeId {
    tree.elements_by_tag_name(tag)[0]
}

/// Helper to get a computed property of an element
fn style<'a>(tree: &'a DomTree, id: NodeId, property: &str) -> Option<&'a str> {
    tree.as_element(id)?
        .computed_style
        .get(property)
        .map(String::as_str)
}

#[test]
fn test_self_closing_child() {
    let document = parse("<div><img/></div>");
    let tree = &document.tree;

    let root_children = tree.children(tree.root());
    assert_eq!(root_children.len(), 1);
    let div = root_children[0];
    assert_eq!(tree.as_element(div).unwrap().tag_name, "div");

    let div_children = tree.children(div);
    assert_eq!(div_children.len(), 1);
    let img = div_children[0];
    assert_eq!(tree.as_element(img).unwrap().tag_name, "img");
    assert!(tree.children(img).is_empty());
}

#[test]
fn test_unquoted_self_closing_child() {
    let document = parse("<div><img src=a.png/></div>");
    let tree = &document.tree;
    let div = find_element(tree, "div");
    let div_children = tree.children(div);
    assert_eq!(div_children.len(), 1);
    let img = tree.as_element(div_children[0]).unwrap();
    assert_eq!(img.tag_name, "img");
    assert_eq!(img.get_attribute("src"), Some("a.png"));
    assert!(tree.children(div_children[0]).is_empty());
}

#[test]
fn test_tag_mismatch() {
    assert_eq!(
        parse_document("<div></span>").unwrap_err(),
        HtmlError::TagMismatch {
            expected: "div".into(),
            found: "span".into()
        }
    );
}

#[test]
fn test_tag_mismatch_stops_the_parse() {
    let mismatch = HtmlError::TagMismatch {
        expected: "div".into(),
        found: "span".into(),
    };
    let mut parser = HTMLParser::new();
    assert_eq!(parser.feed("<div></span>lost</div>"), Err(mismatch.clone()));
    assert_eq!(parser.feed("</div>"), Err(mismatch.clone()));
    assert_eq!(parser.finish().map(|_| ()), Err(mismatch));
}

#[test]
fn test_unclosed_element() {
    assert_eq!(
        parse_document("<div><p>text").unwrap_err(),
        HtmlError::UnclosedElements {
            open: vec!["div".into(), "p".into()]
        }
    );
}

#[test]
fn test_text_coalesces_around_comments() {
    let document = parse("<p>a<!---->b</p>");
    let tree = &document.tree;
    let p = find_element(tree, "p");
    let children = tree.children(p);
    assert_eq!(children.len(), 1);
    assert_eq!(tree.as_text(children[0]), Some("ab"));
}

#[test]
fn test_text_split_by_elements() {
    let document = parse("<p>a<b>x</b>c</p>");
    let tree = &document.tree;
    let p = find_element(tree, "p");
    let kinds: Vec<bool> = tree
        .children(p)
        .iter()
        .map(|&id| matches!(tree.get(id).unwrap().node_type, NodeType::Text(_)))
        .collect();
    assert_eq!(kinds, [true, false, true]);
    assert_eq!(tree.text_content(p), "axc");
}

#[test]
fn test_descendant_id_rule_applies() {
    let document = parse(
        "<html><head><style>body div #myid { width: 100px; }</style></head>\
         <body><div><img id=\"myid\"/><img/></div></body></html>",
    );
    let tree = &document.tree;
    let images = tree.elements_by_tag_name("img");
    assert_eq!(style(tree, images[0], "width"), Some("100px"));
    assert_eq!(style(tree, images[1], "width"), None);
    assert_eq!(document.rules.len(), 1);
}

#[test]
fn test_descendant_rule_skips_intervening_elements() {
    let document = parse(
        "<style>body div img { border: 1px solid }</style>\
         <body><div><img/><span><img/></span></div><img/></body>",
    );
    let tree = &document.tree;
    let images = tree.elements_by_tag_name("img");
    assert_eq!(style(tree, images[0], "border"), Some("1px solid"));
    assert_eq!(style(tree, images[1], "border"), Some("1px solid"));
    assert_eq!(style(tree, images[2], "border"), None);
}

#[test]
fn test_rules_only_apply_after_their_style_closes() {
    let document = parse("<p></p><style>p { color: red }</style><p></p>");
    let tree = &document.tree;
    let paragraphs = tree.elements_by_tag_name("p");
    assert_eq!(style(tree, paragraphs[0], "color"), None);
    assert_eq!(style(tree, paragraphs[1], "color"), Some("red"));
}

#[test]
fn test_later_rule_wins() {
    let document = parse(
        "<style>.a { color: red }</style><style>div { color: blue }</style>\
         <div class=\"a\"></div>",
    );
    let div = find_element(&document.tree, "div");
    assert_eq!(style(&document.tree, div, "color"), Some("blue"));
}

#[test]
fn test_empty_style_registers_nothing() {
    let document = parse("<style></style><style>  </style>");
    assert!(document.rules.is_empty());
}

#[test]
fn test_chunked_feeding() {
    let html = "<div id=\"a\"><style>#a p { margin: 0 }</style><p>hi</p></div>";
    let mut parser = HTMLParser::new();
    for piece in ["<di", "v id=\"a\"><st", "yle>#a p { mar", "gin: 0 }</style><p>h", "i</p></div>"] {
        parser.feed(piece).unwrap();
    }
    let chunked = parser.finish().unwrap();
    let whole = parse(html);
    assert_eq!(
        tree_to_string(&chunked.tree, chunked.tree.root()),
        tree_to_string(&whole.tree, whole.tree.root())
    );
    let p = find_element(&chunked.tree, "p");
    assert_eq!(style(&chunked.tree, p, "margin"), Some("0"));
}

#[test]
fn test_tree_dump() {
    let document = parse("<style>p { color: red }</style><p class=\"x\">a b</p>");
    let dump = tree_to_string(&document.tree, document.tree.root());
    assert_eq!(
        dump,
        "Document\n  <style>\n    \"p\u{b7}{\u{b7}color:\u{b7}red\u{b7}}\"\n  <p class=\"x\"> => { color: red }\n    \"a\u{b7}b\"\n"
    );
}

#[test]
fn test_document_json() {
    let document = parse("<p id=\"x\">hi</p>");
    let json = serde_json::to_value(&document).unwrap();
    let p = &json["tree"]["children"][0];
    assert_eq!(p["tagName"], "p");
    assert_eq!(p["attributes"][0]["name"], "id");
    assert_eq!(p["children"][0]["content"], "hi");
    assert_eq!(json["rules"], serde_json::json!([]));
}

/// Build a balanced document from arbitrary nesting instructions.
fn balanced_html(shape: &[u8], text: &str) -> String {
    const TAGS: [&str; 4] = ["div", "p", "span", "img"];
    let mut html = String::new();
    let mut open = Vec::new();
    for &step in shape {
        let tag = TAGS[usize::from(step) % TAGS.len()];
        match step % 5 {
            0 | 1 => {
                html.push_str(&format!("<{tag} class=\"c{step}\">"));
                open.push(tag);
            }
            2 => html.push_str(&format!("<{tag}/>")),
            3 => {
                if let Some(tag) = open.pop() {
                    html.push_str(&format!("</{tag}>"));
                }
            }
            _ => html.extend(text.chars().filter(|c| c.is_alphanumeric())),
        }
    }
    while let Some(tag) = open.pop() {
        html.push_str(&format!("</{tag}>"));
    }
    html
}

#[quickcheck]
fn prop_parsing_is_idempotent(shape: Vec<u8>, text: String) -> bool {
    let html = format!("<style>div p {{ color: red }}</style>{}", balanced_html(&shape, &text));
    let first = parse_document(&html).map(|d| serde_json::to_value(&d).ok());
    let second = parse_document(&html).map(|d| serde_json::to_value(&d).ok());
    first.is_ok() && first == second
}
