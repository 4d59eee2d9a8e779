//! Node types stored in the document arena

use crate::{FootnoteRef, NodeId, TextFormat, TextRun};
use serde::{Deserialize, Serialize};

/// Enumeration of all node types in the document tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    #[serde(rename = "root")]
    Root,
    #[serde(rename = "paragraph")]
    Paragraph,
    #[serde(rename = "heading")]
    Heading,
    #[serde(rename = "quote")]
    Quote,
    #[serde(rename = "list")]
    List,
    #[serde(rename = "listitem")]
    ListItem,
    #[serde(rename = "link")]
    Link,
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "mark")]
    Highlight,
    #[serde(rename = "linebreak")]
    LineBreak,
    #[serde(rename = "footnote")]
    Footnote,
}

impl NodeType {
    pub const ALL: [NodeType; 11] = [
        NodeType::Root,
        NodeType::Paragraph,
        NodeType::Heading,
        NodeType::Quote,
        NodeType::List,
        NodeType::ListItem,
        NodeType::Link,
        NodeType::Text,
        NodeType::Highlight,
        NodeType::LineBreak,
        NodeType::Footnote,
    ];

    /// Name used for the `type` field of the portable format
    pub fn type_name(&self) -> &'static str {
        match self {
            NodeType::Root => "root",
            NodeType::Paragraph => "paragraph",
            NodeType::Heading => "heading",
            NodeType::Quote => "quote",
            NodeType::List => "list",
            NodeType::ListItem => "listitem",
            NodeType::Link => "link",
            NodeType::Text => "text",
            NodeType::Highlight => "mark",
            NodeType::LineBreak => "linebreak",
            NodeType::Footnote => "footnote",
        }
    }

    pub fn from_type_name(name: &str) -> Option<Self> {
        NodeType::ALL.into_iter().find(|t| t.type_name() == name)
    }

    /// Whether nodes of this type hold child nodes
    pub fn is_element(&self) -> bool {
        matches!(
            self,
            NodeType::Root
                | NodeType::Paragraph
                | NodeType::Heading
                | NodeType::Quote
                | NodeType::List
                | NodeType::ListItem
                | NodeType::Link
        )
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name())
    }
}

// =============================================================================
// Element attributes
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    Ltr,
    Rtl,
}

impl TextDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextDirection::Ltr => "ltr",
            TextDirection::Rtl => "rtl",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ltr" => Some(TextDirection::Ltr),
            "rtl" => Some(TextDirection::Rtl),
            _ => None,
        }
    }
}

/// Layout attributes common to every element node
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ElementAttrs {
    pub direction: Option<TextDirection>,
    /// Alignment keyword; empty means inherited
    pub format: String,
    pub indent: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParagraphAttrs {
    pub text_format: TextFormat,
    pub text_style: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadingTag {
    #[default]
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
}

impl HeadingTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            HeadingTag::H1 => "h1",
            HeadingTag::H2 => "h2",
            HeadingTag::H3 => "h3",
            HeadingTag::H4 => "h4",
            HeadingTag::H5 => "h5",
            HeadingTag::H6 => "h6",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "h1" => Some(HeadingTag::H1),
            "h2" => Some(HeadingTag::H2),
            "h3" => Some(HeadingTag::H3),
            "h4" => Some(HeadingTag::H4),
            "h5" => Some(HeadingTag::H5),
            "h6" => Some(HeadingTag::H6),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListType {
    #[default]
    Bullet,
    Number,
    Check,
}

impl ListType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListType::Bullet => "bullet",
            ListType::Number => "number",
            ListType::Check => "check",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "bullet" => Some(ListType::Bullet),
            "number" => Some(ListType::Number),
            "check" => Some(ListType::Check),
            _ => None,
        }
    }

    /// HTML list tag conventionally paired with this list type
    pub fn default_tag(&self) -> ListTag {
        match self {
            ListType::Number => ListTag::Ol,
            ListType::Bullet | ListType::Check => ListTag::Ul,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListTag {
    #[default]
    Ul,
    Ol,
}

impl ListTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListTag::Ul => "ul",
            ListTag::Ol => "ol",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ul" => Some(ListTag::Ul),
            "ol" => Some(ListTag::Ol),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListAttrs {
    pub list_type: ListType,
    pub start: u32,
    pub tag: ListTag,
}

impl Default for ListAttrs {
    fn default() -> Self {
        Self {
            list_type: ListType::Bullet,
            start: 1,
            tag: ListTag::Ul,
        }
    }
}

impl ListAttrs {
    pub fn new(list_type: ListType) -> Self {
        Self {
            list_type,
            start: 1,
            tag: list_type.default_tag(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItemAttrs {
    pub value: u32,
    /// Check state; only meaningful inside check lists
    pub checked: Option<bool>,
}

impl Default for ListItemAttrs {
    fn default() -> Self {
        Self {
            value: 1,
            checked: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LinkAttrs {
    pub url: Option<String>,
    pub target: Option<String>,
    pub rel: Option<String>,
    pub title: Option<String>,
}

impl LinkAttrs {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Default::default()
        }
    }
}

// =============================================================================
// Node
// =============================================================================

/// Type-specific payload of a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    Root,
    Paragraph(ParagraphAttrs),
    Heading(HeadingTag),
    Quote,
    List(ListAttrs),
    ListItem(ListItemAttrs),
    Link(LinkAttrs),
    Text(TextRun),
    Highlight(TextRun),
    LineBreak,
    Footnote(FootnoteRef),
}

impl NodeKind {
    pub fn paragraph() -> Self {
        NodeKind::Paragraph(ParagraphAttrs::default())
    }

    pub fn text(text: impl Into<String>) -> Self {
        NodeKind::Text(TextRun::new(text))
    }

    pub fn node_type(&self) -> NodeType {
        match self {
            NodeKind::Root => NodeType::Root,
            NodeKind::Paragraph(_) => NodeType::Paragraph,
            NodeKind::Heading(_) => NodeType::Heading,
            NodeKind::Quote => NodeType::Quote,
            NodeKind::List(_) => NodeType::List,
            NodeKind::ListItem(_) => NodeType::ListItem,
            NodeKind::Link(_) => NodeType::Link,
            NodeKind::Text(_) => NodeType::Text,
            NodeKind::Highlight(_) => NodeType::Highlight,
            NodeKind::LineBreak => NodeType::LineBreak,
            NodeKind::Footnote(_) => NodeType::Footnote,
        }
    }

    /// The run of a plain text or highlight node
    pub fn text_run(&self) -> Option<&TextRun> {
        match self {
            NodeKind::Text(run) | NodeKind::Highlight(run) => Some(run),
            _ => None,
        }
    }

    pub fn text_run_mut(&mut self) -> Option<&mut TextRun> {
        match self {
            NodeKind::Text(run) | NodeKind::Highlight(run) => Some(run),
            _ => None,
        }
    }

    pub fn footnote(&self) -> Option<&FootnoteRef> {
        match self {
            NodeKind::Footnote(f) => Some(f),
            _ => None,
        }
    }

    pub fn footnote_mut(&mut self) -> Option<&mut FootnoteRef> {
        match self {
            NodeKind::Footnote(f) => Some(f),
            _ => None,
        }
    }
}

/// A node in the document arena
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    id: NodeId,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// Layout attributes; ignored for leaf nodes
    pub attrs: ElementAttrs,
    pub kind: NodeKind,
}

impl Node {
    /// Create a detached node with a fresh id
    pub fn new(kind: NodeKind) -> Self {
        Self {
            id: NodeId::new(),
            parent: None,
            children: Vec::new(),
            attrs: ElementAttrs::default(),
            kind,
        }
    }

    pub fn with_attrs(kind: NodeKind, attrs: ElementAttrs) -> Self {
        Self {
            attrs,
            ..Self::new(kind)
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn node_type(&self) -> NodeType {
        self.kind.node_type()
    }

    pub fn can_have_children(&self) -> bool {
        self.node_type().is_element()
    }

    /// Text of a text-bearing leaf
    pub fn text_content(&self) -> Option<&str> {
        self.kind.text_run().map(|run| run.text.as_str())
    }

    /// Caret positions inside this node: graphemes for runs, child slots for elements
    pub fn content_len(&self) -> usize {
        match &self.kind {
            NodeKind::Text(run) | NodeKind::Highlight(run) => run.grapheme_count(),
            _ if self.can_have_children() => self.children.len(),
            _ => 1,
        }
    }

    pub(crate) fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<NodeId> {
        &mut self.children
    }
}
