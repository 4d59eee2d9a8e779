//! Footnote section generation
//!
//! Renders a document with numbered, linked footnote markers and collects
//! the footnote bodies into a `<footer>` list. Each marker links to its
//! entry and each entry links back to the marker. Numbers are assigned in
//! the order the markers are written, so they are correct even when the
//! stored numbers are stale.

use crate::{to_html, RenderConfig, RenderConverter, RenderElement, RenderNode};
use std::collections::BTreeMap;
use store::PortableNode;

/// Output of [`render_footnotes`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FootnoteRender {
    /// Document HTML with linked markers
    pub html: String,
    /// The footnote section, empty when no footnote has a body
    pub footnotes_html: String,
    /// Body HTML of each footnote by number
    pub individual_footnotes: BTreeMap<u32, String>,
}

impl FootnoteRender {
    /// Document followed by its footnote section
    pub fn full_html(&self) -> String {
        format!("{}{}", self.html, self.footnotes_html)
    }
}

/// Render `root` with a linked footnote section
pub fn render_footnotes(root: &PortableNode, config: &RenderConfig) -> FootnoteRender {
    let converter = RenderConverter::new(config.clone());
    let (document, markers) = converter.render_linked(root);

    let mut individual_footnotes = BTreeMap::new();
    let mut items = Vec::new();
    for marker in &markers {
        let Some(body) = converter.render_footnote_body(&marker.footnote) else {
            tracing::debug!(id = %marker.footnote.id, "Footnote has no body, left out of section");
            continue;
        };
        individual_footnotes.insert(marker.number, to_html(&body));

        let back_link = RenderElement::new("a")
            .attr("href", format!("#{}", config.anchor_id(marker.number)))
            .text(config.back_link_text.clone());
        items.push(RenderNode::from(
            RenderElement::new("li")
                .attr("id", config.ref_id(marker.number))
                .child(body)
                .child(back_link.into()),
        ));
    }

    let footnotes_html = if items.is_empty() {
        String::new()
    } else {
        let section = RenderElement::new("footer")
            .attr("class", "footnotes")
            .child(RenderElement::new("h3").text(config.footnote_heading.clone()).into())
            .child(RenderElement::new("ol").children(items).into());
        to_html(&section.into())
    };

    FootnoteRender {
        html: to_html(&document),
        footnotes_html,
        individual_footnotes,
    }
}
