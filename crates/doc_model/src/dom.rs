//! Mapping between annotation nodes and host DOM elements
//!
//! Only the two annotation types have a DOM shape here: highlights map to
//! `<mark>` and footnote references map to a `<span data-footnote-id>`
//! wrapping a `<sup>` marker.

use crate::{
    create_footnote_reference, FootnoteId, Node, NodeKind, TextRun, DEFAULT_HIGHLIGHT_COLOR,
};

pub const FOOTNOTE_ID_ATTR: &str = "data-footnote-id";

/// A DOM child: element or text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomNode {
    Element(DomElement),
    Text(String),
}

/// An owned DOM element
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DomElement {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<DomNode>,
}

impl DomElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn with_child(mut self, child: DomElement) -> Self {
        self.children.push(DomNode::Element(child));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(DomNode::Text(text.into()));
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn is(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }

    /// First child element with the given tag
    pub fn child_element(&self, tag: &str) -> Option<&DomElement> {
        self.children.iter().find_map(|c| match c {
            DomNode::Element(e) if e.is(tag) => Some(e),
            _ => None,
        })
    }

    /// Concatenated text of all descendants
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.push_text(&mut out);
        out
    }

    fn push_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                DomNode::Text(t) => out.push_str(t),
                DomNode::Element(e) => e.push_text(out),
            }
        }
    }
}

/// DOM shape of a highlight or footnote node; `None` for other node types
pub fn export_dom(node: &Node) -> Option<DomElement> {
    export_dom_with_color(node, DEFAULT_HIGHLIGHT_COLOR)
}

pub fn export_dom_with_color(node: &Node, highlight_color: &str) -> Option<DomElement> {
    match &node.kind {
        NodeKind::Highlight(run) => Some(
            DomElement::new("mark")
                .with_attr("style", format!("background-color: {highlight_color}"))
                .with_text(run.text.clone()),
        ),
        NodeKind::Footnote(footnote) => Some(
            DomElement::new("span")
                .with_attr(FOOTNOTE_ID_ATTR, footnote.id.as_str())
                .with_child(
                    DomElement::new("sup")
                        .with_attr(FOOTNOTE_ID_ATTR, footnote.id.as_str())
                        .with_text(footnote.number.to_string()),
                ),
        ),
        _ => None,
    }
}

/// Recognise an annotation element; unrecognised shapes yield `None`
pub fn import_dom(element: &DomElement) -> Option<NodeKind> {
    if element.is("mark") {
        return Some(NodeKind::Highlight(TextRun::new(element.text_content())));
    }

    let id = element.attr(FOOTNOTE_ID_ATTR)?;
    let sup = if element.is("sup") {
        element
    } else if element.is("span") {
        element.child_element("sup")?
    } else {
        return None;
    };

    let number = sup.text_content().trim().parse::<u32>().unwrap_or(1);
    Some(NodeKind::Footnote(create_footnote_reference(
        FootnoteId::from_string(id),
        number,
        "",
        None,
    )))
}
