//! Page tree abstraction.
//!
//! The reveal engine needs a narrow slice of DOM behavior: read a tag,
//! read/write attributes, swap an element's content, query a subtree for
//! marked elements, and dispatch an event. [`Dom`] is that seam; a real
//! HTML document lives on the embedder's side of it.
//!
//! [`TreeDocument`] is the bundled in-memory implementation, used by every
//! test in this workspace and by embedders that have no browser DOM (build
//! pipelines, prefetch tools). Its content materialization handles flat
//! element fragments only; it is not an HTML parser.

use std::collections::HashMap;

/// Handle to one element in a page tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// The engine-facing view of a page tree.
pub trait Dom: Send {
    /// The document root.
    fn root(&self) -> NodeId;

    /// Element tag name, lowercase.
    fn tag(&self, node: NodeId) -> Option<&str>;

    fn attr(&self, node: NodeId, name: &str) -> Option<String>;

    fn set_attr(&mut self, node: NodeId, name: &str, value: &str);

    /// The element's current inner content as text.
    fn inner_text(&self, node: NodeId) -> Option<String>;

    /// Replaces the element's content, materializing any element structure
    /// the markup describes. Previous children are detached.
    fn set_content(&mut self, node: NodeId, markup: &str);

    /// Elements below `node` (excluding `node` itself) carrying the
    /// `marker` attribute, in document order.
    fn marked_below(&self, node: NodeId, marker: &str) -> Vec<NodeId>;

    /// Dispatches a named event on a node.
    fn dispatch(&mut self, node: NodeId, event: &str);
}

#[derive(Debug, Default)]
struct NodeData {
    tag: String,
    attrs: HashMap<String, String>,
    children: Vec<NodeId>,
    text: Option<String>,
}

/// In-memory arena-backed page tree.
///
/// Nodes are never deallocated while the document lives; detaching an
/// element (by replacing its parent's content) merely drops it from the
/// child list, so stale handles stay readable instead of faulting.
pub struct TreeDocument {
    nodes: Vec<NodeData>,
    root: NodeId,
    events: Vec<(NodeId, String)>,
}

/// Tags whose elements never carry inner content.
const VOID_TAGS: &[&str] = &["img", "br", "hr", "input", "source", "embed", "track", "meta", "link"];

impl TreeDocument {
    pub fn new() -> Self {
        let root_data = NodeData {
            tag: "body".to_string(),
            ..NodeData::default()
        };
        Self {
            nodes: vec![root_data],
            root: NodeId(0),
            events: Vec::new(),
        }
    }

    /// Builds a document whose body holds the given flat fragment.
    pub fn from_fragment(markup: &str) -> Self {
        let mut doc = Self::new();
        let root = doc.root;
        doc.materialize(root, markup);
        doc
    }

    /// Appends a fresh element under `parent` and returns its handle.
    pub fn append_element(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            tag: tag.to_ascii_lowercase(),
            ..NodeData::default()
        });
        if let Some(parent) = self.nodes.get_mut(parent.0) {
            parent.children.push(id);
        }
        id
    }

    /// Sets an element's text content without materializing markup.
    pub fn set_text(&mut self, node: NodeId, text: &str) {
        if let Some(data) = self.nodes.get_mut(node.0) {
            data.text = Some(text.to_string());
        }
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node.0)
            .map(|data| data.children.as_slice())
            .unwrap_or(&[])
    }

    /// Events dispatched so far, in order.
    pub fn events(&self) -> &[(NodeId, String)] {
        &self.events
    }

    /// Materializes a flat element fragment under `parent`.
    ///
    /// Recognizes `<tag attr="v">inner</tag>`, self-closing and void tags.
    /// Inner content becomes the child's text; it is not parsed further.
    fn materialize(&mut self, parent: NodeId, markup: &str) {
        let mut rest = markup;
        while let Some(lt) = rest.find('<') {
            rest = &rest[lt + 1..];
            let name_len = rest
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric())
                .count();
            if name_len == 0 {
                continue;
            }
            let tag = rest[..name_len].to_ascii_lowercase();
            let Some(gt) = rest.find('>') else { break };
            let head = rest[name_len..gt].trim();
            rest = &rest[gt + 1..];

            let self_closing = head.ends_with('/');
            let attrs = parse_attrs(head.trim_end_matches('/'));

            let mut text = None;
            if !self_closing && !VOID_TAGS.contains(&tag.as_str()) {
                let close = format!("</{tag}>");
                if let Some(end) = rest.find(&close) {
                    if end > 0 {
                        text = Some(rest[..end].to_string());
                    }
                    rest = &rest[end + close.len()..];
                }
            }

            let child = self.append_element(parent, &tag);
            if let Some(data) = self.nodes.get_mut(child.0) {
                data.attrs = attrs;
                data.text = text;
            }
        }
    }
}

impl Default for TreeDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl Dom for TreeDocument {
    fn root(&self) -> NodeId {
        self.root
    }

    fn tag(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(node.0).map(|data| data.tag.as_str())
    }

    fn attr(&self, node: NodeId, name: &str) -> Option<String> {
        self.nodes.get(node.0)?.attrs.get(name).cloned()
    }

    fn set_attr(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(data) = self.nodes.get_mut(node.0) {
            data.attrs.insert(name.to_string(), value.to_string());
        }
    }

    fn inner_text(&self, node: NodeId) -> Option<String> {
        self.nodes.get(node.0)?.text.clone()
    }

    fn set_content(&mut self, node: NodeId, markup: &str) {
        if let Some(data) = self.nodes.get_mut(node.0) {
            data.children.clear();
            data.text = (!markup.is_empty()).then(|| markup.to_string());
        }
        self.materialize(node, markup);
    }

    fn marked_below(&self, node: NodeId, marker: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack: Vec<NodeId> = self.children(node).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            if let Some(data) = self.nodes.get(current.0) {
                if data.attrs.contains_key(marker) {
                    found.push(current);
                }
                stack.extend(data.children.iter().rev().copied());
            }
        }
        found
    }

    fn dispatch(&mut self, node: NodeId, event: &str) {
        self.events.push((node, event.to_string()));
    }
}

/// Parses `name="value"` pairs (quoted, unquoted, or bare) from a tag head.
fn parse_attrs(src: &str) -> HashMap<String, String> {
    let mut attrs = HashMap::new();
    let mut rest = src;
    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            break;
        }
        let name_end = rest
            .find(|c: char| c == '=' || c.is_whitespace())
            .unwrap_or(rest.len());
        let name = rest[..name_end].to_ascii_lowercase();
        rest = &rest[name_end..];

        if let Some(after_eq) = rest.strip_prefix('=') {
            let after_eq = after_eq.trim_start();
            if let Some(quoted) = after_eq.strip_prefix('"') {
                match quoted.find('"') {
                    Some(end) => {
                        if !name.is_empty() {
                            attrs.insert(name, quoted[..end].to_string());
                        }
                        rest = &quoted[end + 1..];
                    }
                    None => {
                        if !name.is_empty() {
                            attrs.insert(name, quoted.to_string());
                        }
                        rest = "";
                    }
                }
            } else {
                let value_end = after_eq.find(char::is_whitespace).unwrap_or(after_eq.len());
                if !name.is_empty() {
                    attrs.insert(name, after_eq[..value_end].to_string());
                }
                rest = &after_eq[value_end..];
            }
        } else if !name.is_empty() {
            attrs.insert(name, String::new());
        } else {
            break;
        }
    }
    attrs
}
