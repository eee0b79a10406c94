//! HTML parser module for tree construction.

use core::fmt::Write as _;

use wisp_dom::{DomTree, NodeId, NodeType};

/// Tokenizer plus tree builder driver.
pub mod html_parser;
/// Token-to-tree construction with the open-element stack.
pub mod tree_builder;

pub use html_parser::{Document, HTMLParser, parse_document};
pub use tree_builder::TreeBuilder;

/// Render the subtree at `id` as indented lines, one node per line.
///
/// Elements show their attributes and, after `=>`, any computed style.
#[must_use]
pub fn tree_to_string(tree: &DomTree, id: NodeId) -> String {
    let mut out = String::new();
    write_node(tree, id, 0, &mut out);
    out
}

/// Print a DOM tree for debugging.
pub fn print_tree(tree: &DomTree, id: NodeId) {
    print!("{}", tree_to_string(tree, id));
}

fn write_node(tree: &DomTree, id: NodeId, indent: usize, out: &mut String) {
    let Some(node) = tree.get(id) else { return };
    let prefix = "  ".repeat(indent);
    match &node.node_type {
        NodeType::Document => {
            let _ = writeln!(out, "{prefix}Document");
        }
        NodeType::Element(data) => {
            let mut line = format!("{prefix}<{}", data.tag_name);
            for attr in &data.attrs {
                if attr.value.is_empty() {
                    let _ = write!(line, " {}", attr.name);
                } else {
                    let _ = write!(line, " {}=\"{}\"", attr.name, attr.value);
                }
            }
            line.push('>');
            if !data.computed_style.is_empty() {
                let style: Vec<String> = data
                    .computed_style
                    .iter()
                    .map(|(name, value)| format!("{name}: {value}"))
                    .collect();
                let _ = write!(line, " => {{ {} }}", style.join("; "));
            }
            let _ = writeln!(out, "{line}");
        }
        NodeType::Text(data) => {
            let display = data.replace('\n', "\\n").replace(' ', "\u{00B7}");
            let _ = writeln!(out, "{prefix}\"{display}\"");
        }
    }
    for &child_id in tree.children(id) {
        write_node(tree, child_id, indent + 1, out);
    }
}
