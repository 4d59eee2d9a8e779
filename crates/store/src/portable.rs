//! Portable node records
//!
//! Every node is stored as a JSON object tagged with `type` and `version`.
//! Element nodes add `children`, `direction`, `format` and `indent`; the
//! other fields depend on the type. Footnote bodies are embedded verbatim
//! under `json`.
//!
//! Reading is forgiving: a node with an unknown `type` or without its
//! required fields is dropped with a warning, and a field of the wrong shape
//! falls back to its default with a warning. Nothing here returns an error.

use crate::{ImportWarning, WarningKind};
use doc_model::{
    ElementAttrs, FootnoteId, FootnoteRef, HeadingTag, LinkAttrs, ListAttrs, ListItemAttrs,
    ListTag, ListType, NodeKind, NodeType, ParagraphAttrs, TextDirection, TextFormat, TextMode,
    TextRun,
};
use serde_json::{json, Map, Value};

/// Version written into every record
pub const NODE_VERSION: u32 = 1;

/// A node and its subtree in portable form
#[derive(Debug, Clone, PartialEq)]
pub struct PortableNode {
    pub kind: NodeKind,
    /// Layout attributes, only written for element nodes
    pub attrs: ElementAttrs,
    pub children: Vec<PortableNode>,
}

/// Outcome of reading a record
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedNode {
    pub node: Option<PortableNode>,
    pub warnings: Vec<ImportWarning>,
}

impl PortableNode {
    pub fn leaf(kind: NodeKind) -> Self {
        Self {
            kind,
            attrs: ElementAttrs::default(),
            children: Vec::new(),
        }
    }

    pub fn element(kind: NodeKind, children: Vec<PortableNode>) -> Self {
        Self {
            kind,
            attrs: ElementAttrs::default(),
            children,
        }
    }

    pub fn node_type(&self) -> NodeType {
        self.kind.node_type()
    }

    /// Footnote payloads in this subtree, in document order
    pub fn footnotes(&self) -> Vec<&FootnoteRef> {
        let mut out = Vec::new();
        self.collect_footnotes(&mut out);
        out
    }

    fn collect_footnotes<'a>(&'a self, out: &mut Vec<&'a FootnoteRef>) {
        if let NodeKind::Footnote(footnote) = &self.kind {
            out.push(footnote);
        }
        for child in &self.children {
            child.collect_footnotes(out);
        }
    }

    // =========================================================================
    // Writing
    // =========================================================================

    pub fn to_value(&self) -> Value {
        let node_type = self.node_type();
        let mut map = Map::new();
        map.insert("type".into(), json!(node_type.type_name()));
        map.insert("version".into(), json!(NODE_VERSION));

        match &self.kind {
            NodeKind::Root | NodeKind::Quote | NodeKind::LineBreak => {}
            NodeKind::Paragraph(attrs) => {
                map.insert("textFormat".into(), json!(attrs.text_format.bits()));
                map.insert("textStyle".into(), json!(attrs.text_style));
            }
            NodeKind::Heading(tag) => {
                map.insert("tag".into(), json!(tag.as_str()));
            }
            NodeKind::List(attrs) => {
                map.insert("listType".into(), json!(attrs.list_type.as_str()));
                map.insert("start".into(), json!(attrs.start));
                map.insert("tag".into(), json!(attrs.tag.as_str()));
            }
            NodeKind::ListItem(attrs) => {
                map.insert("value".into(), json!(attrs.value));
                if let Some(checked) = attrs.checked {
                    map.insert("checked".into(), json!(checked));
                }
            }
            NodeKind::Link(attrs) => {
                if let Some(url) = &attrs.url {
                    map.insert("url".into(), json!(url));
                }
                map.insert("target".into(), json!(attrs.target));
                map.insert("rel".into(), json!(attrs.rel));
                map.insert("title".into(), json!(attrs.title));
            }
            NodeKind::Text(run) | NodeKind::Highlight(run) => {
                map.insert("detail".into(), json!(run.detail));
                map.insert("format".into(), json!(run.format.bits()));
                map.insert("mode".into(), json!(run.mode.as_str()));
                map.insert("style".into(), json!(run.style));
                map.insert("text".into(), json!(run.text));
            }
            NodeKind::Footnote(footnote) => {
                map.insert("id".into(), json!(footnote.id.as_str()));
                map.insert("number".into(), json!(footnote.number));
                map.insert("content".into(), json!(footnote.content));
                map.insert("json".into(), footnote.json.clone().unwrap_or(Value::Null));
            }
        }

        if node_type.is_element() {
            let children: Vec<Value> = self.children.iter().map(PortableNode::to_value).collect();
            map.insert("children".into(), Value::Array(children));
            map.insert(
                "direction".into(),
                json!(self.attrs.direction.map(|d| d.as_str())),
            );
            map.insert("format".into(), json!(self.attrs.format));
            map.insert("indent".into(), json!(self.attrs.indent));
        }

        Value::Object(map)
    }

    // =========================================================================
    // Reading
    // =========================================================================

    /// Read a single node record
    pub fn parse(value: &Value) -> ParsedNode {
        let mut reader = Reader::default();
        let node = reader.node(value, "root");
        ParsedNode {
            node,
            warnings: reader.warnings,
        }
    }

    /// Read either an editor-state envelope `{ "root": ... }` or a bare record
    pub fn parse_editor_state(value: &Value) -> ParsedNode {
        match value.get("root") {
            Some(root) => Self::parse(root),
            None => Self::parse(value),
        }
    }
}

#[derive(Default)]
struct Reader {
    warnings: Vec<ImportWarning>,
}

/// Present and not null
fn field<'a>(obj: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    obj.get(name).filter(|v| !v.is_null())
}

impl Reader {
    fn warn(&mut self, kind: WarningKind, path: &str, message: String) {
        tracing::warn!(%kind, path, "{}", message);
        self.warnings.push(ImportWarning {
            kind,
            path: path.to_string(),
            message,
        });
    }

    fn node(&mut self, value: &Value, path: &str) -> Option<PortableNode> {
        let Some(obj) = value.as_object() else {
            self.warn(WarningKind::InvalidField, path, "node record is not an object".into());
            return None;
        };
        let Some(type_name) = obj.get("type").and_then(Value::as_str) else {
            self.warn(WarningKind::MissingField, path, "node has no 'type'".into());
            return None;
        };
        let Some(node_type) = NodeType::from_type_name(type_name) else {
            self.warn(
                WarningKind::UnknownNodeType,
                path,
                format!("skipping node of unknown type '{type_name}'"),
            );
            return None;
        };

        let kind = self.kind(node_type, obj, path)?;
        let mut node = PortableNode::leaf(kind);
        if node_type.is_element() {
            node.attrs = self.element_attrs(obj, path);
            node.children = self.children(obj, path);
        }
        Some(node)
    }

    fn kind(&mut self, node_type: NodeType, obj: &Map<String, Value>, path: &str) -> Option<NodeKind> {
        let kind = match node_type {
            NodeType::Root => NodeKind::Root,
            NodeType::Quote => NodeKind::Quote,
            NodeType::LineBreak => NodeKind::LineBreak,
            NodeType::Paragraph => NodeKind::Paragraph(ParagraphAttrs {
                text_format: TextFormat::from_bits(self.number(obj, "textFormat", 0, path)),
                text_style: self.string(obj, "textStyle", path).unwrap_or_default(),
            }),
            NodeType::Heading => {
                NodeKind::Heading(self.keyword(obj, "tag", HeadingTag::parse, HeadingTag::H1, path))
            }
            NodeType::List => {
                let list_type = self.keyword(obj, "listType", ListType::parse, ListType::Bullet, path);
                NodeKind::List(ListAttrs {
                    list_type,
                    start: self.number(obj, "start", 1, path),
                    tag: self.keyword(obj, "tag", ListTag::parse, list_type.default_tag(), path),
                })
            }
            NodeType::ListItem => NodeKind::ListItem(ListItemAttrs {
                value: self.number(obj, "value", 1, path),
                checked: self.boolean(obj, "checked", path),
            }),
            NodeType::Link => {
                // Some editors keep the url under `fields`
                let url = self.string(obj, "url", path).or_else(|| {
                    field(obj, "fields")
                        .and_then(|f| f.get("url"))
                        .and_then(Value::as_str)
                        .map(str::to_string)
                });
                NodeKind::Link(LinkAttrs {
                    url,
                    target: self.string(obj, "target", path),
                    rel: self.string(obj, "rel", path),
                    title: self.string(obj, "title", path),
                })
            }
            NodeType::Text | NodeType::Highlight => {
                let Some(text) = obj.get("text").and_then(Value::as_str) else {
                    self.warn(
                        WarningKind::MissingField,
                        path,
                        format!("{} node has no 'text'", node_type.type_name()),
                    );
                    return None;
                };
                let run = TextRun {
                    text: text.to_string(),
                    format: TextFormat::from_bits(self.number(obj, "format", 0, path)),
                    style: self.string(obj, "style", path).unwrap_or_default(),
                    detail: self.number(obj, "detail", 0, path),
                    mode: self.mode(obj, path),
                };
                if node_type == NodeType::Text {
                    NodeKind::Text(run)
                } else {
                    NodeKind::Highlight(run)
                }
            }
            NodeType::Footnote => {
                let Some(id) = obj.get("id").and_then(Value::as_str) else {
                    self.warn(WarningKind::MissingField, path, "footnote has no 'id'".into());
                    return None;
                };
                NodeKind::Footnote(FootnoteRef {
                    id: FootnoteId::from_string(id),
                    number: self.number(obj, "number", 1, path),
                    content: self.string(obj, "content", path).unwrap_or_default(),
                    json: field(obj, "json").cloned(),
                })
            }
        };
        Some(kind)
    }

    fn children(&mut self, obj: &Map<String, Value>, path: &str) -> Vec<PortableNode> {
        let Some(value) = field(obj, "children") else {
            return Vec::new();
        };
        let Some(items) = value.as_array() else {
            self.warn(WarningKind::InvalidField, path, "'children' is not an array".into());
            return Vec::new();
        };
        items
            .iter()
            .enumerate()
            .filter_map(|(i, child)| self.node(child, &format!("{path}.children[{i}]")))
            .collect()
    }

    fn element_attrs(&mut self, obj: &Map<String, Value>, path: &str) -> ElementAttrs {
        ElementAttrs {
            direction: self.keyword_opt(obj, "direction", TextDirection::parse, path),
            format: self.string(obj, "format", path).unwrap_or_default(),
            indent: self.number(obj, "indent", 0, path),
        }
    }

    fn mode(&mut self, obj: &Map<String, Value>, path: &str) -> TextMode {
        match field(obj, "mode") {
            None => TextMode::Normal,
            // Older documents store the mode as its index
            Some(Value::Number(n)) => match n.as_u64() {
                Some(0) => TextMode::Normal,
                Some(1) => TextMode::Token,
                Some(2) => TextMode::Segmented,
                _ => {
                    self.warn(WarningKind::InvalidField, path, format!("unknown text mode {n}"));
                    TextMode::Normal
                }
            },
            Some(_) => self.keyword(obj, "mode", TextMode::parse, TextMode::Normal, path),
        }
    }

    fn number(&mut self, obj: &Map<String, Value>, name: &str, default: u32, path: &str) -> u32 {
        match field(obj, name) {
            None => default,
            Some(value) => match value.as_u64().and_then(|n| u32::try_from(n).ok()) {
                Some(n) => n,
                None => {
                    self.warn(
                        WarningKind::InvalidField,
                        path,
                        format!("'{name}' is not a non-negative integer: {value}"),
                    );
                    default
                }
            },
        }
    }

    fn string(&mut self, obj: &Map<String, Value>, name: &str, path: &str) -> Option<String> {
        let value = field(obj, name)?;
        match value.as_str() {
            Some(s) => Some(s.to_string()),
            None => {
                self.warn(WarningKind::InvalidField, path, format!("'{name}' is not a string: {value}"));
                None
            }
        }
    }

    fn boolean(&mut self, obj: &Map<String, Value>, name: &str, path: &str) -> Option<bool> {
        let value = field(obj, name)?;
        match value.as_bool() {
            Some(b) => Some(b),
            None => {
                self.warn(WarningKind::InvalidField, path, format!("'{name}' is not a boolean: {value}"));
                None
            }
        }
    }

    fn keyword<T>(
        &mut self,
        obj: &Map<String, Value>,
        name: &str,
        parse: fn(&str) -> Option<T>,
        default: T,
        path: &str,
    ) -> T {
        self.keyword_opt(obj, name, parse, path).unwrap_or(default)
    }

    fn keyword_opt<T>(
        &mut self,
        obj: &Map<String, Value>,
        name: &str,
        parse: fn(&str) -> Option<T>,
        path: &str,
    ) -> Option<T> {
        let raw = self.string(obj, name, path)?;
        let parsed = parse(&raw);
        if parsed.is_none() {
            self.warn(WarningKind::InvalidField, path, format!("unknown {name} '{raw}'"));
        }
        parsed
    }
}
