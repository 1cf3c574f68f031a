//! Headless document model
//!
//! An in-memory element tree standing in for the host page. The toolkit only
//! ever observes and mutates what a widget library touches in a browser:
//! tags, attributes, class lists, inline styles, text, focus, layout bounds
//! and scroll metrics. Hosts mirror layout facts into the tree (bounds, scroll
//! heights, viewport) and read widget effects back out of it.
//!
//! Node ids are generational keys: once an element is removed its id never
//! resolves again, even if the slot is reused. Side tables keyed by `NodeId`
//! can therefore detect dead entries without holding the element alive.
//!
//! # Example
//!
//! ```ignore
//! use zenkit_core::dom::{element, Document};
//!
//! let mut doc = Document::new();
//! let body = doc.body();
//! let modal = doc.append(
//!     body,
//!     element("div").id("confirm").class("modal fade").child(
//!         element("div").class("modal-dialog"),
//!     ),
//! );
//! assert!(doc.has_class(modal, "fade"));
//! ```

use indexmap::IndexMap;
use slotmap::{new_key_type, SlotMap};

use crate::error::Result;
use crate::geometry::{Point, Rect, Size};
use crate::selector::SelectorList;

new_key_type! {
    /// Handle to an element in a [`Document`]
    pub struct NodeId;
}

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    attrs: IndexMap<String, String>,
    styles: IndexMap<String, String>,
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    bounds: Rect,
    scroll_top: f32,
    scroll_height: f32,
    client_height: f32,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: IndexMap::new(),
            styles: IndexMap::new(),
            text: String::new(),
            parent: None,
            children: Vec::new(),
            bounds: Rect::ZERO,
            scroll_top: 0.0,
            scroll_height: 0.0,
            client_height: 0.0,
        }
    }

    fn class_list(&self) -> impl Iterator<Item = &str> {
        self.attrs
            .get("class")
            .map(|c| c.split_ascii_whitespace())
            .into_iter()
            .flatten()
    }
}

/// Window metrics of the host page
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub scroll_x: f32,
    pub scroll_y: f32,
    /// Total scrollable height of the page
    pub scroll_height: f32,
    /// Width of the vertical scrollbar the page would show when overflowing
    pub scrollbar_width: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            scroll_x: 0.0,
            scroll_y: 0.0,
            scroll_height: height,
            scrollbar_width: 0.0,
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn scroll(&self) -> Point {
        Point::new(self.scroll_x, self.scroll_y)
    }

    /// True when the page content is taller than the window
    pub fn is_overflowing(&self) -> bool {
        self.scroll_height > self.height
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 800.0)
    }
}

/// In-memory element tree with a `<html>` root and a `<body>`
#[derive(Debug, Clone)]
pub struct Document {
    nodes: SlotMap<NodeId, Element>,
    root: NodeId,
    body: NodeId,
    active: Option<NodeId>,
    viewport: Viewport,
    hidden: bool,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Element::new("html"));
        let body = nodes.insert(Element::new("body"));
        nodes[body].parent = Some(root);
        nodes[root].children.push(body);
        Self {
            nodes,
            root,
            body,
            active: None,
            viewport: Viewport::default(),
            hidden: false,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    /// True while `node` refers to a live element
    pub fn exists(&self, node: NodeId) -> bool {
        self.nodes.contains_key(node)
    }

    /// True when `node` is live and attached under the document root
    pub fn is_connected(&self, node: NodeId) -> bool {
        self.exists(node) && self.contains(self.root, node)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ========================================================================
    // Tree structure
    // ========================================================================

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.nodes.insert(Element::new(tag))
    }

    /// Append `child` as the last child of `parent`, detaching it first.
    ///
    /// Appending an element into its own subtree is refused.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if !self.exists(parent) || !self.exists(child) || self.contains(child, parent) {
            tracing::warn!("append_child refused: {:?} into {:?}", child, parent);
            return false;
        }
        self.detach(child);
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
        true
    }

    /// Unlink `node` from its parent without destroying it
    pub fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.nodes.get(node).and_then(|e| e.parent) else {
            return;
        };
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.retain(|&c| c != node);
        }
        self.nodes[node].parent = None;
    }

    /// Destroy `node` and its whole subtree. Returns the number of elements removed.
    pub fn remove(&mut self, node: NodeId) -> usize {
        if node == self.root || !self.exists(node) {
            return 0;
        }
        self.detach(node);

        let mut stack = vec![node];
        let mut removed = 0;
        while let Some(current) = stack.pop() {
            if let Some(element) = self.nodes.remove(current) {
                stack.extend(element.children);
                removed += 1;
            }
        }
        if self.active.is_some_and(|a| !self.exists(a)) {
            self.active = None;
        }
        tracing::trace!("removed {} element(s) rooted at {:?}", removed, node);
        removed
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node)?.parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node)
            .map(|e| e.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn next_element_sibling(&self, node: NodeId) -> Option<NodeId> {
        let siblings = self.children(self.parent(node)?);
        let idx = siblings.iter().position(|&c| c == node)?;
        siblings.get(idx + 1).copied()
    }

    pub fn previous_element_sibling(&self, node: NodeId) -> Option<NodeId> {
        let siblings = self.children(self.parent(node)?);
        let idx = siblings.iter().position(|&c| c == node)?;
        idx.checked_sub(1).map(|i| siblings[i])
    }

    /// Ancestors of `node`, nearest first (excluding `node`)
    pub fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(node), move |&n| self.parent(n))
    }

    /// Descendants of `node` in document order (excluding `node`)
    pub fn descendants(&self, node: NodeId) -> Descendants<'_> {
        let mut stack: Vec<NodeId> = self.children(node).to_vec();
        stack.reverse();
        Descendants { doc: self, stack }
    }

    /// True if `node` is `ancestor` or lies in its subtree
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        node == ancestor || self.ancestors(node).any(|a| a == ancestor)
    }

    // ========================================================================
    // Attributes, classes, styles, text
    // ========================================================================

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(node).map(|e| e.tag.as_str())
    }

    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes.get(node)?.attrs.get(name).map(String::as_str)
    }

    pub fn has_attr(&self, node: NodeId, name: &str) -> bool {
        self.attr(node, name).is_some()
    }

    pub fn set_attr(&mut self, node: NodeId, name: &str, value: impl Into<String>) {
        if let Some(e) = self.nodes.get_mut(node) {
            e.attrs.insert(name.to_ascii_lowercase(), value.into());
        }
    }

    pub fn remove_attr(&mut self, node: NodeId, name: &str) -> Option<String> {
        self.nodes.get_mut(node)?.attrs.shift_remove(name)
    }

    /// `data-*` attribute lookup (`data("target")` reads `data-target`)
    pub fn data(&self, node: NodeId, key: &str) -> Option<&str> {
        self.attr(node, &format!("data-{key}"))
    }

    pub fn id(&self, node: NodeId) -> Option<&str> {
        self.attr(node, "id")
    }

    pub fn classes(&self, node: NodeId) -> Vec<&str> {
        self.nodes
            .get(node)
            .map(|e| e.class_list().collect())
            .unwrap_or_default()
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.nodes
            .get(node)
            .is_some_and(|e| e.class_list().any(|c| c == class))
    }

    /// Add each whitespace separated class in `classes`
    pub fn add_class(&mut self, node: NodeId, classes: &str) {
        let Some(e) = self.nodes.get_mut(node) else {
            return;
        };
        let current = e.attrs.entry("class".to_string()).or_default();
        for class in classes.split_ascii_whitespace() {
            if !current.split_ascii_whitespace().any(|c| c == class) {
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(class);
            }
        }
    }

    /// Remove each whitespace separated class in `classes`
    pub fn remove_class(&mut self, node: NodeId, classes: &str) {
        let Some(current) = self.nodes.get_mut(node).and_then(|e| e.attrs.get_mut("class"))
        else {
            return;
        };
        let remove: Vec<&str> = classes.split_ascii_whitespace().collect();
        *current = current
            .split_ascii_whitespace()
            .filter(|c| !remove.contains(c))
            .collect::<Vec<_>>()
            .join(" ");
    }

    /// Toggle `class`, or force it on/off. Returns whether the class is now present.
    pub fn toggle_class(&mut self, node: NodeId, class: &str, force: Option<bool>) -> bool {
        let on = force.unwrap_or(!self.has_class(node, class));
        if on {
            self.add_class(node, class);
        } else {
            self.remove_class(node, class);
        }
        on
    }

    pub fn style(&self, node: NodeId, property: &str) -> Option<&str> {
        self.nodes.get(node)?.styles.get(property).map(String::as_str)
    }

    /// Set an inline style; an empty value clears the property
    pub fn set_style(&mut self, node: NodeId, property: &str, value: impl Into<String>) {
        let Some(e) = self.nodes.get_mut(node) else {
            return;
        };
        let value = value.into();
        if value.is_empty() {
            e.styles.shift_remove(property);
        } else {
            e.styles.insert(property.to_string(), value);
        }
    }

    pub fn text(&self, node: NodeId) -> &str {
        self.nodes.get(node).map(|e| e.text.as_str()).unwrap_or("")
    }

    pub fn set_text(&mut self, node: NodeId, text: impl Into<String>) {
        if let Some(e) = self.nodes.get_mut(node) {
            e.text = text.into();
        }
    }

    // ========================================================================
    // Layout, scrolling and focus
    // ========================================================================

    /// Layout box in page coordinates
    pub fn bounds(&self, node: NodeId) -> Rect {
        self.nodes.get(node).map(|e| e.bounds).unwrap_or(Rect::ZERO)
    }

    pub fn set_bounds(&mut self, node: NodeId, bounds: Rect) {
        if let Some(e) = self.nodes.get_mut(node) {
            e.bounds = bounds;
        }
    }

    /// Bounds relative to the window, like `getBoundingClientRect`
    pub fn client_rect(&self, node: NodeId) -> Rect {
        self.bounds(node)
            .offset(-self.viewport.scroll_x, -self.viewport.scroll_y)
    }

    pub fn scroll_top(&self, node: NodeId) -> f32 {
        self.nodes.get(node).map(|e| e.scroll_top).unwrap_or(0.0)
    }

    pub fn set_scroll_top(&mut self, node: NodeId, value: f32) {
        if let Some(e) = self.nodes.get_mut(node) {
            e.scroll_top = value.max(0.0);
        }
    }

    /// Full content height; falls back to the layout height when unset
    pub fn scroll_height(&self, node: NodeId) -> f32 {
        self.nodes
            .get(node)
            .map(|e| {
                if e.scroll_height > 0.0 {
                    e.scroll_height
                } else {
                    e.bounds.height()
                }
            })
            .unwrap_or(0.0)
    }

    /// Set scroll (content) and client (visible) heights of a scroll container
    pub fn set_scroll_metrics(&mut self, node: NodeId, scroll_height: f32, client_height: f32) {
        if let Some(e) = self.nodes.get_mut(node) {
            e.scroll_height = scroll_height;
            e.client_height = client_height;
        }
    }

    pub fn client_height(&self, node: NodeId) -> f32 {
        self.nodes
            .get(node)
            .map(|e| {
                if e.client_height > 0.0 {
                    e.client_height
                } else {
                    e.bounds.height()
                }
            })
            .unwrap_or(0.0)
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    /// Scroll the window so `node`'s top edge sits at the top of the viewport
    pub fn scroll_into_view(&mut self, node: NodeId) {
        if !self.exists(node) {
            return;
        }
        let max = (self.viewport.scroll_height - self.viewport.height).max(0.0);
        self.viewport.scroll_y = self.bounds(node).top().clamp(0.0, max);
    }

    /// Page visibility (`document.hidden`)
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    pub fn active_element(&self) -> Option<NodeId> {
        self.active
    }

    pub fn focus(&mut self, node: NodeId) {
        if self.exists(node) {
            self.active = Some(node);
        }
    }

    pub fn blur(&mut self) {
        self.active = None;
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// First element in the document matching `selector`
    pub fn query_selector(&self, selector: &str) -> Result<Option<NodeId>> {
        let list = SelectorList::parse(selector)?;
        let root = self.root;
        Ok(std::iter::once(root)
            .chain(self.descendants(root))
            .find(|&n| list.matches(self, n)))
    }

    /// Every element in the document matching `selector`, in document order
    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        let list = SelectorList::parse(selector)?;
        let root = self.root;
        Ok(std::iter::once(root)
            .chain(self.descendants(root))
            .filter(|&n| list.matches(self, n))
            .collect())
    }

    /// First descendant of `scope` matching `selector`
    pub fn query_selector_from(&self, scope: NodeId, selector: &str) -> Result<Option<NodeId>> {
        let list = SelectorList::parse(selector)?;
        Ok(self.descendants(scope).find(|&n| list.matches(self, n)))
    }

    /// Every descendant of `scope` matching `selector`
    pub fn query_selector_all_from(&self, scope: NodeId, selector: &str) -> Result<Vec<NodeId>> {
        let list = SelectorList::parse(selector)?;
        Ok(self.select_all(scope, &list))
    }

    /// Every descendant of `scope` matching an already parsed list
    pub fn select_all(&self, scope: NodeId, list: &SelectorList) -> Vec<NodeId> {
        self.descendants(scope)
            .filter(|&n| list.matches(self, n))
            .collect()
    }

    /// Nearest inclusive ancestor of `node` matching `selector`
    pub fn closest(&self, node: NodeId, selector: &str) -> Result<Option<NodeId>> {
        let list = SelectorList::parse(selector)?;
        if !self.exists(node) {
            return Ok(None);
        }
        Ok(std::iter::once(node)
            .chain(self.ancestors(node))
            .find(|&n| list.matches(self, n)))
    }

    pub fn matches(&self, node: NodeId, selector: &str) -> Result<bool> {
        let list = SelectorList::parse(selector)?;
        Ok(list.matches(self, node))
    }

    /// Element whose `id` attribute equals `id`
    pub fn by_id(&self, id: &str) -> Option<NodeId> {
        let root = self.root;
        std::iter::once(root)
            .chain(self.descendants(root))
            .find(|&n| self.id(n) == Some(id))
    }

    // ========================================================================
    // Building
    // ========================================================================

    /// Build `spec` (and its children) and append it under `parent`
    pub fn append(&mut self, parent: NodeId, spec: ElementSpec) -> NodeId {
        let node = self.build(spec);
        self.append_child(parent, node);
        node
    }

    /// Build `spec` as a detached subtree
    pub fn build(&mut self, spec: ElementSpec) -> NodeId {
        let ElementSpec {
            tag,
            attrs,
            styles,
            text,
            bounds,
            children,
        } = spec;

        let node = self.create_element(&tag);
        {
            let e = &mut self.nodes[node];
            e.attrs = attrs;
            e.styles = styles;
            e.text = text;
            e.bounds = bounds;
        }
        for child in children {
            let child = self.build(child);
            self.append_child(node, child);
        }
        node
    }
}

/// Pre-order iterator over a subtree
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let node = self.stack.pop()?;
        self.stack
            .extend(self.doc.children(node).iter().rev().copied());
        Some(node)
    }
}

/// Declarative element description used to build subtrees
#[derive(Debug, Clone, Default)]
pub struct ElementSpec {
    tag: String,
    attrs: IndexMap<String, String>,
    styles: IndexMap<String, String>,
    text: String,
    bounds: Rect,
    children: Vec<ElementSpec>,
}

/// Start describing an element with the given tag
pub fn element(tag: &str) -> ElementSpec {
    ElementSpec {
        tag: tag.to_ascii_lowercase(),
        ..Default::default()
    }
}

impl ElementSpec {
    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    /// Add whitespace separated classes
    pub fn class(mut self, classes: &str) -> Self {
        let current = self.attrs.entry("class".to_string()).or_default();
        for class in classes.split_ascii_whitespace() {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(class);
        }
        self
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    /// Shorthand for a `data-*` attribute
    pub fn data(self, key: &str, value: &str) -> Self {
        self.attr(&format!("data-{key}"), value)
    }

    pub fn style(mut self, property: &str, value: &str) -> Self {
        self.styles.insert(property.to_string(), value.to_string());
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn bounds(mut self, bounds: Rect) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn child(mut self, child: ElementSpec) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = ElementSpec>) -> Self {
        self.children.extend(children);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Document, NodeId) {
        let mut doc = Document::new();
        let body = doc.body();
        let nav = doc.append(
            body,
            element("ul").class("nav").children([
                element("li")
                    .class("nav-item")
                    .child(element("a").id("first").class("nav-link active")),
                element("li")
                    .class("nav-item")
                    .child(element("a").id("second").class("nav-link")),
            ]),
        );
        (doc, nav)
    }

    #[test]
    fn test_class_list_operations() {
        let (mut doc, nav) = sample();
        doc.add_class(nav, "nav-tabs nav");
        assert_eq!(doc.attr(nav, "class"), Some("nav nav-tabs"));
        assert!(doc.toggle_class(nav, "flush", None));
        assert!(!doc.toggle_class(nav, "flush", None));
        assert!(doc.toggle_class(nav, "nav", Some(true)));
        doc.remove_class(nav, "nav nav-tabs");
        assert!(doc.classes(nav).is_empty());
    }

    #[test]
    fn test_tree_navigation() {
        let (doc, nav) = sample();
        let first = doc.by_id("first").unwrap();
        let second = doc.by_id("second").unwrap();
        let first_item = doc.parent(first).unwrap();
        let second_item = doc.parent(second).unwrap();

        assert_eq!(doc.next_element_sibling(first_item), Some(second_item));
        assert_eq!(doc.previous_element_sibling(second_item), Some(first_item));
        assert!(doc.contains(nav, second));
        assert!(!doc.contains(second, nav));
        assert_eq!(doc.ancestors(first).take(2).collect::<Vec<_>>(), vec![first_item, nav]);
        assert_eq!(
            doc.descendants(nav).collect::<Vec<_>>(),
            vec![first_item, first, second_item, second]
        );
    }

    #[test]
    fn test_remove_invalidates_ids() {
        let (mut doc, nav) = sample();
        let first = doc.by_id("first").unwrap();
        doc.focus(first);
        assert_eq!(doc.remove(nav), 5);
        assert!(!doc.exists(first));
        assert_eq!(doc.active_element(), None);
        assert_eq!(doc.attr(first, "id"), None);

        // A new element never aliases the removed id
        let fresh = doc.create_element("div");
        assert_ne!(fresh, first);
        assert!(!doc.exists(nav));
    }

    #[test]
    fn test_append_child_refuses_cycles() {
        let (mut doc, nav) = sample();
        let first = doc.by_id("first").unwrap();
        assert!(!doc.append_child(first, nav));
        assert!(doc.is_connected(nav));
    }

    #[test]
    fn test_queries() {
        let (doc, nav) = sample();
        let active = doc.query_selector(".nav-link.active").unwrap();
        assert_eq!(active, doc.by_id("first"));
        assert_eq!(doc.query_selector_all_from(nav, ".nav-link").unwrap().len(), 2);

        let second = doc.by_id("second").unwrap();
        assert_eq!(doc.closest(second, ".nav, .list-group").unwrap(), Some(nav));
        assert_eq!(doc.closest(second, ".nav-link").unwrap(), Some(second));
        assert!(doc.query_selector("[").is_err());
    }

    #[test]
    fn test_styles_and_scroll() {
        let (mut doc, nav) = sample();
        doc.set_style(nav, "height", "40px");
        assert_eq!(doc.style(nav, "height"), Some("40px"));
        doc.set_style(nav, "height", "");
        assert_eq!(doc.style(nav, "height"), None);

        doc.set_bounds(nav, Rect::new(0.0, 900.0, 100.0, 300.0));
        assert_eq!(doc.scroll_height(nav), 300.0);
        doc.viewport_mut().scroll_height = 2000.0;
        doc.scroll_into_view(nav);
        assert_eq!(doc.viewport().scroll_y, 900.0);
        assert_eq!(doc.client_rect(nav).top(), 0.0);
    }
}
