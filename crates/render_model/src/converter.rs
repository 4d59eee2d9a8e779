//! Convert portable documents to render nodes

use crate::{RenderConfig, RenderElement, RenderNode, Result};
use doc_model::{
    DocumentTree, FootnoteRef, LinkAttrs, ListAttrs, ListItemAttrs, ListType, NodeKind, TextEffect,
    TextRun,
};
use store::{to_portable, PortableNode};

/// URL schemes that are never written into an href
const UNSAFE_SCHEMES: &[&str] = &["javascript:", "vbscript:", "data:"];

/// How footnote markers are written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Markers {
    /// `<sup class="footnote-ref">N</sup>` using the stored number
    Plain,
    /// Numbered in render order and linked to the footnote section
    Linked,
}

/// A footnote marker written during a linked render
#[derive(Debug, Clone)]
pub(crate) struct RenderedFootnote {
    pub number: u32,
    pub footnote: FootnoteRef,
}

struct RenderContext {
    markers: Markers,
    rendered: Vec<RenderedFootnote>,
}

impl RenderContext {
    fn new(markers: Markers) -> Self {
        Self {
            markers,
            rendered: Vec::new(),
        }
    }
}

/// Converts portable documents to render nodes
pub struct RenderConverter {
    config: RenderConfig,
}

impl RenderConverter {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Render a portable node and its subtree
    pub fn render(&self, node: &PortableNode) -> RenderNode {
        let mut ctx = RenderContext::new(Markers::Plain);
        self.render_node(node, &mut ctx)
    }

    /// Render a whole document tree
    pub fn render_document(&self, tree: &DocumentTree) -> Result<RenderNode> {
        let root = to_portable(tree, tree.root_id())?;
        Ok(self.render(&root))
    }

    /// Render with markers linked to a footnote section, returning the
    /// markers in the order they were written
    pub(crate) fn render_linked(&self, node: &PortableNode) -> (RenderNode, Vec<RenderedFootnote>) {
        let mut ctx = RenderContext::new(Markers::Linked);
        let rendered = self.render_node(node, &mut ctx);
        (rendered, ctx.rendered)
    }

    /// Render a footnote's body.
    ///
    /// The stored editor state is used when it renders to something; the
    /// legacy `content` string is the fallback. `None` when both are empty.
    pub fn render_footnote_body(&self, footnote: &FootnoteRef) -> Option<RenderNode> {
        if let Some(body) = footnote.json.as_ref().and_then(|json| self.render_json_body(json)) {
            return Some(body);
        }
        if footnote.content.trim().is_empty() {
            return None;
        }
        Some(RenderElement::new("p").text(footnote.content.clone()).into())
    }

    fn render_json_body(&self, json: &serde_json::Value) -> Option<RenderNode> {
        let parsed = PortableNode::parse_editor_state(json);
        if !parsed.warnings.is_empty() {
            tracing::warn!(
                count = parsed.warnings.len(),
                "Skipped unreadable parts of a footnote body"
            );
        }
        let body = parsed.node?;

        // Footnotes inside a body keep their stored numbers
        let mut ctx = RenderContext::new(Markers::Plain);
        let rendered = match body.kind {
            NodeKind::Root => RenderNode::Fragment(self.render_children(&body, &mut ctx)),
            _ => self.render_node(&body, &mut ctx),
        };
        (!rendered.is_empty()).then_some(rendered)
    }

    fn render_children(&self, node: &PortableNode, ctx: &mut RenderContext) -> Vec<RenderNode> {
        node.children
            .iter()
            .map(|child| self.render_node(child, ctx))
            .collect()
    }

    fn render_node(&self, node: &PortableNode, ctx: &mut RenderContext) -> RenderNode {
        match &node.kind {
            NodeKind::Root => RenderNode::Fragment(self.render_children(node, ctx)),
            NodeKind::Paragraph(_) => self.element("p", node, ctx),
            NodeKind::Heading(tag) => self.element(tag.as_str(), node, ctx),
            NodeKind::Quote => self.element("blockquote", node, ctx),
            NodeKind::List(attrs) => self.render_list(attrs, node, ctx),
            NodeKind::ListItem(attrs) => self.render_list_item(attrs, false, node, ctx),
            NodeKind::Link(attrs) => self.render_link(attrs, node, ctx),
            NodeKind::Text(run) => render_run(run),
            NodeKind::Highlight(run) => RenderElement::new("mark")
                .attr("style", format!("background-color: {}", self.config.highlight_color))
                .child(render_run(run))
                .into(),
            NodeKind::LineBreak => RenderElement::new("br").into(),
            NodeKind::Footnote(footnote) => self.render_footnote(footnote, ctx),
        }
    }

    fn element(&self, tag: &str, node: &PortableNode, ctx: &mut RenderContext) -> RenderNode {
        RenderElement::new(tag)
            .children(self.render_children(node, ctx))
            .into()
    }

    fn render_list(&self, attrs: &ListAttrs, node: &PortableNode, ctx: &mut RenderContext) -> RenderNode {
        let check_list = attrs.list_type == ListType::Check;
        let children = node
            .children
            .iter()
            .map(|child| match &child.kind {
                NodeKind::ListItem(item) => self.render_list_item(item, check_list, child, ctx),
                _ => self.render_node(child, ctx),
            })
            .collect::<Vec<_>>();

        let mut list = RenderElement::new(attrs.tag.as_str()).attr("class", attrs.list_type.as_str());
        if attrs.start != 1 && attrs.tag == doc_model::ListTag::Ol {
            list = list.attr("start", attrs.start.to_string());
        }
        list.children(children).into()
    }

    fn render_list_item(
        &self,
        attrs: &ListItemAttrs,
        in_check_list: bool,
        node: &PortableNode,
        ctx: &mut RenderContext,
    ) -> RenderNode {
        let children = self.render_children(node, ctx);
        let item = if in_check_list || attrs.checked.is_some() {
            // Check lists only store `checked` when it is true
            let checked = attrs.checked.unwrap_or(false);
            let state = if checked {
                "component--list-item-checkbox-checked"
            } else {
                "component--list-item-checkbox-unchecked"
            };
            RenderElement::new("li")
                .attr("aria-checked", checked.to_string())
                .attr("class", format!("component--list-item-checkbox {state}"))
                .attr("role", "checkbox")
                .attr("tabIndex", "-1")
                .attr("value", attrs.value.to_string())
        } else {
            RenderElement::new("li").attr("value", attrs.value.to_string())
        };
        item.children(children).into()
    }

    fn render_link(&self, attrs: &LinkAttrs, node: &PortableNode, ctx: &mut RenderContext) -> RenderNode {
        let Some(url) = attrs.url.as_deref().filter(|url| is_safe_url(url)) else {
            if attrs.url.is_some() {
                tracing::warn!(url = ?attrs.url, "Link with unsafe url rendered as placeholder");
            }
            return RenderElement::new("span").text("...").into();
        };

        let mut link = RenderElement::new("a").attr("href", url);
        if attrs.target.as_deref().is_some_and(|t| !t.is_empty()) {
            link = link.attr("rel", "noopener noreferrer").attr("target", "_blank");
        }
        if let Some(title) = &attrs.title {
            link = link.attr("title", title.clone());
        }
        link.children(self.render_children(node, ctx)).into()
    }

    fn render_footnote(&self, footnote: &FootnoteRef, ctx: &mut RenderContext) -> RenderNode {
        match ctx.markers {
            Markers::Plain => {
                let marker: RenderNode = RenderElement::new("sup")
                    .attr("class", "footnote-ref")
                    .text(footnote.number.to_string())
                    .into();
                if !self.config.expand_footnote_bodies {
                    return marker;
                }
                let mut block = RenderElement::new("div").attr("class", "footnote").child(marker);
                if let Some(body) = self.render_footnote_body(footnote) {
                    block = block.child(RenderElement::new("div").attr("class", "footnote-body").child(body).into());
                }
                block.into()
            }
            Markers::Linked => {
                let number = ctx.rendered.len() as u32 + 1;
                ctx.rendered.push(RenderedFootnote {
                    number,
                    footnote: footnote.clone(),
                });
                let anchor = RenderElement::new("a")
                    .attr("href", format!("#{}", self.config.ref_id(number)))
                    .attr("id", self.config.anchor_id(number))
                    .text(number.to_string());
                RenderElement::new("span")
                    .attr(doc_model::dom::FOOTNOTE_ID_ATTR, footnote.id.as_str())
                    .child(RenderElement::new("sup").child(anchor.into()).into())
                    .into()
            }
        }
    }
}

impl Default for RenderConverter {
    fn default() -> Self {
        Self::new(RenderConfig::default())
    }
}

/// Wrap a run's text in one element per format flag, innermost first
fn render_run(run: &TextRun) -> RenderNode {
    run.format
        .effects()
        .fold(RenderNode::Text(run.text.clone()), |inner, effect| {
            let element = match effect {
                TextEffect::Bold => RenderElement::new("strong"),
                TextEffect::Italic => RenderElement::new("em"),
                TextEffect::Strikethrough => {
                    RenderElement::new("span").attr("style", "text-decoration: line-through")
                }
                TextEffect::Underline => RenderElement::new("span").attr("style", "text-decoration: underline"),
                TextEffect::Code => RenderElement::new("code"),
                TextEffect::Subscript => RenderElement::new("sub"),
                TextEffect::Superscript => RenderElement::new("sup"),
            };
            element.child(inner).into()
        })
}

fn is_safe_url(url: &str) -> bool {
    let lower = url.trim_start().to_lowercase();
    !UNSAFE_SCHEMES.iter().any(|scheme| lower.starts_with(scheme))
}
