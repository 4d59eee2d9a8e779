//! Structured render output

/// A node of rendered output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderNode {
    Element(RenderElement),
    Text(String),
    /// Children without a wrapping element
    Fragment(Vec<RenderNode>),
}

/// An element with ordered attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderElement {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<RenderNode>,
}

impl RenderElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn child(mut self, child: RenderNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = RenderNode>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn text(self, text: impl Into<String>) -> Self {
        self.child(RenderNode::Text(text.into()))
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

impl From<RenderElement> for RenderNode {
    fn from(element: RenderElement) -> Self {
        RenderNode::Element(element)
    }
}

impl RenderNode {
    pub fn empty() -> Self {
        RenderNode::Fragment(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            RenderNode::Element(_) => false,
            RenderNode::Text(text) => text.is_empty(),
            RenderNode::Fragment(children) => children.iter().all(RenderNode::is_empty),
        }
    }

    pub fn as_element(&self) -> Option<&RenderElement> {
        match self {
            RenderNode::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Concatenated text of the subtree
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            RenderNode::Text(text) => out.push_str(text),
            RenderNode::Element(element) => {
                for child in &element.children {
                    child.collect_text(out);
                }
            }
            RenderNode::Fragment(children) => {
                for child in children {
                    child.collect_text(out);
                }
            }
        }
    }

    /// Elements with the given tag, in document order
    pub fn find_all(&self, tag: &str) -> Vec<&RenderElement> {
        let mut out = Vec::new();
        self.collect_tag(tag, &mut out);
        out
    }

    fn collect_tag<'a>(&'a self, tag: &str, out: &mut Vec<&'a RenderElement>) {
        let children = match self {
            RenderNode::Text(_) => return,
            RenderNode::Element(element) => {
                if element.tag == tag {
                    out.push(element);
                }
                &element.children
            }
            RenderNode::Fragment(children) => children,
        };
        for child in children {
            child.collect_tag(tag, out);
        }
    }
}
