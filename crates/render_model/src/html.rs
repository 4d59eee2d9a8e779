//! HTML writer

use crate::RenderNode;

/// Elements written without a closing tag
const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input", "meta", "link", "wbr"];

/// Write a render tree as an HTML string. Text and attribute values are escaped.
pub fn to_html(node: &RenderNode) -> String {
    let mut out = String::new();
    write_node(node, &mut out);
    out
}

fn write_node(node: &RenderNode, out: &mut String) {
    match node {
        RenderNode::Text(text) => out.push_str(&html_escape::encode_text(text)),
        RenderNode::Fragment(children) => {
            for child in children {
                write_node(child, out);
            }
        }
        RenderNode::Element(element) => {
            out.push('<');
            out.push_str(&element.tag);
            for (name, value) in &element.attributes {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                out.push_str(&html_escape::encode_double_quoted_attribute(value));
                out.push('"');
            }
            out.push('>');

            if VOID_ELEMENTS.contains(&element.tag.as_str()) {
                return;
            }
            for child in &element.children {
                write_node(child, out);
            }
            out.push_str("</");
            out.push_str(&element.tag);
            out.push('>');
        }
    }
}
