//! Painted Markup
//!
//! Views are rendered to HTML by leptos. Surfaces without a browser read
//! that HTML back into a small element tree so they can find containers by
//! id, swap their children and report the visible text.

use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

/// Elements that never carry children or a closing tag
const VOID_TAGS: &[&str] = &["input", "br", "hr", "img", "meta", "link"];

#[derive(Debug, thiserror::Error)]
#[error("Malformed markup: {0}")]
pub struct MarkupError(String);

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum MarkupNode {
    Element(MarkupElement),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MarkupElement {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<MarkupNode>,
}

/// A parsed run of sibling nodes
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Markup {
    pub nodes: Vec<MarkupNode>,
}

impl Markup {
    pub fn parse(html: &str) -> Result<Self, MarkupError> {
        let mut reader = Reader::from_str(html);
        reader.check_end_names(false);

        // Open elements; the bottom entry collects top-level nodes
        let mut stack = vec![MarkupElement::new(String::new(), Vec::new())];
        loop {
            match reader.read_event() {
                Ok(Event::Start(start)) => {
                    let el = MarkupElement::from_start(&start)?;
                    if el.is_void() {
                        push(&mut stack, MarkupNode::Element(el));
                    } else {
                        stack.push(el);
                    }
                }
                Ok(Event::Empty(start)) => {
                    let el = MarkupElement::from_start(&start)?;
                    push(&mut stack, MarkupNode::Element(el));
                }
                Ok(Event::End(_)) => {
                    if stack.len() > 1 {
                        if let Some(el) = stack.pop() {
                            push(&mut stack, MarkupNode::Element(el));
                        }
                    }
                }
                Ok(Event::Text(text)) => {
                    let text = text.unescape().map_err(|e| MarkupError(e.to_string()))?;
                    if !text.is_empty() {
                        push(&mut stack, MarkupNode::Text(text.into_owned()));
                    }
                }
                Ok(Event::CData(data)) => {
                    let text = String::from_utf8_lossy(&data).into_owned();
                    push(&mut stack, MarkupNode::Text(text));
                }
                Ok(Event::Eof) => break,
                // Comments carry hydration markers only
                Ok(_) => {}
                Err(e) => {
                    return Err(MarkupError(format!(
                        "{} at byte {}",
                        e,
                        reader.buffer_position()
                    )))
                }
            }
        }

        // Close anything left open by truncated input
        while stack.len() > 1 {
            if let Some(el) = stack.pop() {
                push(&mut stack, MarkupNode::Element(el));
            }
        }
        Ok(Self {
            nodes: stack.pop().map(|root| root.children).unwrap_or_default(),
        })
    }

    /// Parse, keeping unparseable input as a single text node
    pub fn parse_lossy(html: &str) -> Self {
        Self::parse(html).unwrap_or_else(|e| {
            tracing::warn!("{}", e);
            Self {
                nodes: vec![MarkupNode::Text(html.to_string())],
            }
        })
    }

    pub fn find(&self, id: &str) -> Option<&MarkupElement> {
        self.nodes.iter().find_map(|node| node.find(id))
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut MarkupElement> {
        self.nodes.iter_mut().find_map(|node| node.find_mut(id))
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// Visible text with whitespace collapsed, pieces separated by one space
    pub fn text(&self) -> String {
        let mut pieces = Vec::new();
        for node in &self.nodes {
            node.collect_text(&mut pieces);
        }
        pieces.join(" ")
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            node.write_html(&mut out);
        }
        out
    }
}

fn push(stack: &mut [MarkupElement], node: MarkupNode) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    }
}

impl MarkupElement {
    fn new(tag: String, attrs: Vec<(String, String)>) -> Self {
        Self {
            tag,
            attrs,
            children: Vec::new(),
        }
    }

    fn from_start(start: &BytesStart<'_>) -> Result<Self, MarkupError> {
        let tag = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attrs = Vec::new();
        for attr in start.html_attributes() {
            let attr = attr.map_err(|e| MarkupError(e.to_string()))?;
            let name = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| MarkupError(e.to_string()))?
                .into_owned();
            attrs.push((name, value));
        }
        Ok(Self::new(tag, attrs))
    }

    fn is_void(&self) -> bool {
        VOID_TAGS.contains(&self.tag.as_str())
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    pub fn find(&self, id: &str) -> Option<&MarkupElement> {
        if self.id() == Some(id) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut MarkupElement> {
        if self.id() == Some(id) {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| child.find_mut(id))
    }

    pub fn text(&self) -> String {
        Markup {
            nodes: self.children.clone(),
        }
        .text()
    }
}

impl MarkupNode {
    fn find(&self, id: &str) -> Option<&MarkupElement> {
        match self {
            MarkupNode::Element(el) => el.find(id),
            MarkupNode::Text(_) => None,
        }
    }

    fn find_mut(&mut self, id: &str) -> Option<&mut MarkupElement> {
        match self {
            MarkupNode::Element(el) => el.find_mut(id),
            MarkupNode::Text(_) => None,
        }
    }

    fn collect_text<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            MarkupNode::Text(text) => out.extend(text.split_whitespace()),
            MarkupNode::Element(el) => el.children.iter().for_each(|c| c.collect_text(out)),
        }
    }

    fn write_html(&self, out: &mut String) {
        match self {
            MarkupNode::Text(text) => out.push_str(&escape(text.as_str())),
            MarkupNode::Element(el) => {
                out.push('<');
                out.push_str(&el.tag);
                for (name, value) in &el.attrs {
                    out.push_str(&format!(" {}=\"{}\"", name, escape(value.as_str())));
                }
                if el.is_void() {
                    out.push_str("/>");
                    return;
                }
                out.push('>');
                el.children.iter().for_each(|child| child.write_html(out));
                out.push_str(&format!("</{}>", el.tag));
            }
        }
    }
}

/// Visible text of an HTML fragment
pub fn text_content(html: &str) -> String {
    Markup::parse_lossy(html).text()
}
