//! Owned arena snapshot of a fragment.
//!
//! `tl` gives a borrowed, read-only view of the source. The enhancement
//! passes need to insert anchors and rewrite the TOC mount, so the parse is
//! copied once into a `Vec` of nodes addressed by [`NodeId`]. Text and
//! attribute values stay exactly as written (entity-encoded); decoding
//! happens only where a plain string is needed.

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use thiserror::Error;

use crate::utils::html::{
    escape, escape_attr, is_raw_text_element, is_void_element, open_tag_attributes, quote_raw_attr,
    unescape,
};

#[derive(Debug, Error)]
pub enum FragmentError {
    #[error("failed to parse fragment: {0}")]
    Parse(String),
}

/// Stable handle to a node, valid for the lifetime of its [`Fragment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Raw attributes in source order, names in their source case.
pub type Attrs = SmallVec<[(String, String); 4]>;

/// Element name and raw attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attrs: Attrs,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Attrs::new(),
        }
    }

    /// Builder-style attribute; `value` is plain text and gets encoded.
    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Raw attribute value as written in the source. Names match
    /// ASCII case-insensitively.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    #[inline]
    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|(k, _)| k.eq_ignore_ascii_case(name))
    }

    /// Set an attribute from plain text. An existing attribute keeps its
    /// position and name.
    pub fn set_attr(&mut self, name: &str, value: &str) {
        let encoded = escape_attr(value).into_owned();
        match self.attrs.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
            Some((_, v)) => *v = encoded,
            None => self.attrs.push((name.to_string(), encoded)),
        }
    }

    pub fn remove_attr(&mut self, name: &str) {
        self.attrs.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id").filter(|id| !id.is_empty())
    }

    /// The id with entities decoded, as the document sees it.
    pub fn plain_id(&self) -> Option<String> {
        self.id().map(|id| unescape(id).into_owned())
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or_default().split_ascii_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    #[inline]
    pub fn is(&self, tag: &str) -> bool {
        self.tag == tag
    }

    /// Heading level for `h1`..`h6`.
    pub fn heading_level(&self) -> Option<u8> {
        let bytes = self.tag.as_bytes();
        match bytes {
            [b'h', d @ b'1'..=b'6'] => Some(d - b'0'),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element(Element),
    /// Raw (entity-encoded) text.
    Text(String),
    /// Comment, including its delimiters.
    Comment(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A parsed fragment plus the per-fragment enhancement registry.
///
/// Dropping the fragment drops the registry with it; nothing leaks into the
/// next navigation.
#[derive(Debug, Clone, Default)]
pub struct Fragment {
    nodes: Vec<NodeData>,
    roots: Vec<NodeId>,
    enhanced: FxHashSet<NodeId>,
    labels: FxHashMap<NodeId, String>,
}

impl Fragment {
    /// Parse HTML into an owned tree.
    pub fn parse(html: &str) -> Result<Self, FragmentError> {
        let dom = tl::parse(html, tl::ParserOptions::default())
            .map_err(|err| FragmentError::Parse(err.to_string()))?;
        let parser = dom.parser();

        let mut fragment = Self::default();
        for handle in dom.children() {
            fragment.copy_node(*handle, parser, None);
        }
        Ok(fragment)
    }

    fn copy_node(&mut self, handle: tl::NodeHandle, parser: &tl::Parser, parent: Option<NodeId>) {
        let Some(node) = handle.get(parser) else {
            return;
        };

        match node {
            tl::Node::Tag(tag) => {
                let mut element = Element::new(tag.name().as_utf8_str().to_lowercase());
                // tl's attribute map loses source order and name case, and
                // misreads a bare attribute followed by `id=`; read the tag text
                element.attrs = open_tag_attributes(&tag.raw().as_utf8_str()).into_iter().collect();

                let id = self.push(NodeKind::Element(element), parent);
                for child in tag.children().top().iter() {
                    self.copy_node(*child, parser, Some(id));
                }
            }
            tl::Node::Raw(bytes) => {
                self.push(NodeKind::Text(bytes.as_utf8_str().into_owned()), parent);
            }
            tl::Node::Comment(bytes) => {
                self.push(NodeKind::Comment(bytes.as_utf8_str().into_owned()), parent);
            }
        }
    }

    fn push(&mut self, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeData {
            kind,
            parent,
            children: Vec::new(),
        });
        match parent {
            Some(p) => self.nodes[p.index()].children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    // ------------------------------------------------------------------------
    // Reading
    // ------------------------------------------------------------------------

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    #[inline]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.kind(id) {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[id.index()].kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    #[inline]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    #[inline]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    /// Every node reachable from the roots, in document order.
    pub fn walk(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// Descendants of `root` (excluding it), in document order.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(root).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// Elements matching `pred`, in document order.
    pub fn select<F>(&self, mut pred: F) -> Vec<NodeId>
    where
        F: FnMut(&Element) -> bool,
    {
        self.walk()
            .into_iter()
            .filter(|&id| self.element(id).is_some_and(&mut pred))
            .collect()
    }

    /// First element matching `pred`, in document order.
    pub fn select_first<F>(&self, mut pred: F) -> Option<NodeId>
    where
        F: FnMut(&Element) -> bool,
    {
        self.walk()
            .into_iter()
            .find(|&id| self.element(id).is_some_and(&mut pred))
    }

    /// True when `id` has an ancestor matching `pred`.
    pub fn has_ancestor<F>(&self, id: NodeId, mut pred: F) -> bool
    where
        F: FnMut(&Element) -> bool,
    {
        let mut cursor = self.parent(id);
        while let Some(current) = cursor {
            if self.element(current).is_some_and(&mut pred) {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    /// Decoded text of `id` and its descendants.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut raw = String::new();
        if let NodeKind::Text(text) = self.kind(id) {
            raw.push_str(text);
        }
        for node in self.descendants(id) {
            if let NodeKind::Text(text) = self.kind(node) {
                raw.push_str(text);
            }
        }
        unescape(&raw).into_owned()
    }

    /// Every non-empty id attribute in the fragment.
    pub fn ids(&self) -> Vec<String> {
        self.walk()
            .into_iter()
            .filter_map(|id| self.element(id)?.plain_id())
            .collect()
    }

    // ------------------------------------------------------------------------
    // Editing
    // ------------------------------------------------------------------------

    /// Append a new element as the last child of `parent`.
    pub fn append_element(&mut self, parent: NodeId, element: Element) -> NodeId {
        self.push(NodeKind::Element(element), Some(parent))
    }

    /// Append plain text (encoded on the way in).
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.push(NodeKind::Text(escape(text).into_owned()), Some(parent))
    }

    /// Append already-encoded text.
    pub fn append_raw_text(&mut self, parent: NodeId, raw: &str) -> NodeId {
        self.push(NodeKind::Text(raw.to_string()), Some(parent))
    }

    /// Insert a new element immediately after `sibling`.
    pub fn insert_after(&mut self, sibling: NodeId, element: Element) -> NodeId {
        let parent = self.parent(sibling);
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeData {
            kind: NodeKind::Element(element),
            parent,
            children: Vec::new(),
        });

        let list = match parent {
            Some(p) => &mut self.nodes[p.index()].children,
            None => &mut self.roots,
        };
        let pos = list
            .iter()
            .position(|&c| c == sibling)
            .map_or(list.len(), |p| p + 1);
        list.insert(pos, id);
        id
    }

    /// Replace the raw content of a text node. No-op on other kinds.
    pub fn set_raw_text(&mut self, id: NodeId, raw: String) {
        if let NodeKind::Text(text) = &mut self.nodes[id.index()].kind {
            *text = raw;
        }
    }

    /// Detach every child of `id`. Detached nodes stay in the arena but are
    /// no longer reachable.
    pub fn clear_children(&mut self, id: NodeId) {
        let children = std::mem::take(&mut self.nodes[id.index()].children);
        for child in children {
            self.nodes[child.index()].parent = None;
        }
    }

    // ------------------------------------------------------------------------
    // Enhancement registry
    // ------------------------------------------------------------------------

    #[inline]
    pub fn is_enhanced(&self, id: NodeId) -> bool {
        self.enhanced.contains(&id)
    }

    pub(crate) fn mark_enhanced(&mut self, id: NodeId) {
        self.enhanced.insert(id);
    }

    /// Cached heading label, derived on first enhancement.
    pub fn label(&self, id: NodeId) -> Option<&str> {
        self.labels.get(&id).map(String::as_str)
    }

    pub(crate) fn cache_label(&mut self, id: NodeId, label: String) {
        self.labels.entry(id).or_insert(label);
    }

    // ------------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------------

    /// Serialize the whole fragment back to HTML.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for &root in &self.roots {
            self.render_into(root, &mut out);
        }
        out
    }

    /// Serialize a single node and its subtree.
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.render_into(id, &mut out);
        out
    }

    /// Serialize the children of `id`.
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(id) {
            self.render_into(child, &mut out);
        }
        out
    }

    fn render_into(&self, id: NodeId, out: &mut String) {
        match self.kind(id) {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Comment(text) if text.starts_with("<!--") => out.push_str(text),
            NodeKind::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            NodeKind::Element(el) => {
                out.push('<');
                out.push_str(&el.tag);
                for (name, value) in &el.attrs {
                    out.push(' ');
                    out.push_str(name);
                    if !value.is_empty() {
                        out.push_str("=\"");
                        out.push_str(&quote_raw_attr(value));
                        out.push('"');
                    }
                }
                out.push('>');

                if is_void_element(&el.tag) {
                    return;
                }
                if is_raw_text_element(&el.tag) {
                    // script/style bodies were captured as a single raw node
                    for &child in self.children(id) {
                        if let NodeKind::Text(text) = self.kind(child) {
                            out.push_str(text);
                        }
                    }
                } else {
                    for &child in self.children(id) {
                        self.render_into(child, out);
                    }
                }
                out.push_str("</");
                out.push_str(&el.tag);
                out.push('>');
            }
        }
    }
}
