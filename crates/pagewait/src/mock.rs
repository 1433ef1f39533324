//! In-memory driver for unit and integration tests.
//!
//! [`MockSession`] holds a small document tree behind a mutex. Tests build
//! it with [`MockNode`] builders, hand the session to pages and waits, and
//! mutate it from a helper thread to simulate a page that changes while a
//! wait is polling.
//!
//! The locator engine is deliberately small:
//! - CSS: compound selectors (`tag#id.class[attr='v'][attr]`) joined by
//!   descendant whitespace
//! - XPath: `//tag`, `//tag[@attr='v']`, `//tag[text()='v']`
//! - every other [`Selector`] strategy exactly

use crate::driver::{DriverError, DriverResult, Element, SearchContext, Session};
use crate::locator::{Locator, Selector};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// Index of a node in a [`MockSession`] document
pub type NodeId = usize;

type Handler = Arc<dyn Fn(&MockSession) + Send + Sync>;

/// Builder and state for one mock DOM node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockNode {
    tag: String,
    attributes: BTreeMap<String, String>,
    text: String,
    visible: bool,
    enabled: bool,
    selected: bool,
    stale: bool,
}

impl MockNode {
    /// Visible, enabled node with the given tag
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_lowercase(),
            attributes: BTreeMap::new(),
            text: String::new(),
            visible: true,
            enabled: true,
            selected: false,
            stale: false,
        }
    }

    /// Set the `id` attribute
    #[must_use]
    pub fn with_id(self, id: impl Into<String>) -> Self {
        self.with_attr("id", id)
    }

    /// Add a CSS class
    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        self.attributes
            .entry("class".to_string())
            .and_modify(|existing| {
                existing.push(' ');
                existing.push_str(&class);
            })
            .or_insert(class);
        self
    }

    /// Set the `name` attribute
    #[must_use]
    pub fn with_name(self, name: impl Into<String>) -> Self {
        self.with_attr("name", name)
    }

    /// Set an attribute
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Set the visible text
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Not rendered
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Disabled
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Selected (checkbox, radio, option)
    #[must_use]
    pub const fn selected(mut self) -> Self {
        self.selected = true;
        self
    }

    /// Located normally, but every read reports a stale reference
    #[must_use]
    pub const fn stale(mut self) -> Self {
        self.stale = true;
        self
    }

    /// Tag name
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Attribute value
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Set the visible flag
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Set the enabled flag
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Set the selected flag
    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    /// Replace the visible text
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Set or replace an attribute
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }
}

#[derive(Debug)]
struct Slot {
    node: MockNode,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attached: bool,
}

#[derive(Default)]
struct Document {
    slots: Vec<Slot>,
    roots: Vec<NodeId>,
    url: String,
    title: String,
    terminated: bool,
    history: Vec<String>,
    lookups: usize,
    routes: HashMap<String, Handler>,
    clicks: HashMap<NodeId, Handler>,
}

impl Document {
    fn ensure_alive(&self) -> DriverResult<()> {
        if self.terminated {
            return Err(DriverError::session("mock session terminated"));
        }
        Ok(())
    }

    fn insert(&mut self, parent: Option<NodeId>, node: MockNode) -> NodeId {
        let id = self.slots.len();
        let attached = parent.map_or(true, |p| self.slots.get(p).is_some_and(|s| s.attached));
        self.slots.push(Slot {
            node,
            parent,
            children: Vec::new(),
            attached,
        });
        match parent {
            Some(p) => {
                if let Some(slot) = self.slots.get_mut(p) {
                    slot.children.push(id);
                }
            }
            None => self.roots.push(id),
        }
        id
    }

    fn detach(&mut self, id: NodeId) {
        let children = match self.slots.get_mut(id) {
            Some(slot) => {
                slot.attached = false;
                slot.children.clone()
            }
            None => return,
        };
        for child in children {
            self.detach(child);
        }
    }

    fn clear(&mut self) {
        for slot in &mut self.slots {
            slot.attached = false;
        }
        self.roots.clear();
        self.clicks.clear();
        self.title.clear();
    }

    fn readable(&self, id: NodeId) -> DriverResult<&MockNode> {
        self.ensure_alive()?;
        match self.slots.get(id) {
            Some(slot) if slot.attached && !slot.node.stale => Ok(&slot.node),
            _ => Err(DriverError::stale(format!("node {id} is no longer attached"))),
        }
    }

    fn readable_mut(&mut self, id: NodeId) -> DriverResult<&mut MockNode> {
        self.readable(id)?;
        self.slots
            .get_mut(id)
            .map(|slot| &mut slot.node)
            .ok_or_else(|| DriverError::stale(format!("node {id} is no longer attached")))
    }

    fn descendants(&self, from: &[NodeId], out: &mut Vec<NodeId>) {
        for &id in from {
            if let Some(slot) = self.slots.get(id) {
                if slot.attached {
                    out.push(id);
                    self.descendants(&slot.children, out);
                }
            }
        }
    }

    fn find(&mut self, scope: Option<NodeId>, locator: &Locator) -> DriverResult<Vec<NodeId>> {
        self.ensure_alive()?;
        self.lookups += 1;
        let mut candidates = Vec::new();
        match scope {
            Some(parent) => {
                // A stale parent cannot be searched, but a stale-flagged one
                // still has a subtree.
                let slot = self
                    .slots
                    .get(parent)
                    .filter(|slot| slot.attached)
                    .ok_or_else(|| DriverError::stale(format!("node {parent} is no longer attached")))?;
                self.descendants(&slot.children, &mut candidates);
            }
            None => self.descendants(&self.roots, &mut candidates),
        }
        Ok(candidates
            .into_iter()
            .filter(|&id| self.matches(id, locator.selector()))
            .collect())
    }

    fn matches(&self, id: NodeId, selector: &Selector) -> bool {
        let Some(slot) = self.slots.get(id) else {
            return false;
        };
        let node = &slot.node;
        match selector {
            Selector::Id(v) => node.attr("id") == Some(v.as_str()),
            Selector::Name(v) => node.attr("name") == Some(v.as_str()),
            Selector::ClassName(v) => node.has_class(v),
            Selector::TagName(v) => node.tag.eq_ignore_ascii_case(v),
            Selector::LinkText(v) => node.tag == "a" && node.text.trim() == v,
            Selector::PartialLinkText(v) => node.tag == "a" && node.text.contains(v.as_str()),
            Selector::Css(css) => self.matches_css(id, css),
            Selector::XPath(xpath) => XPathStep::parse(xpath).is_some_and(|step| step.matches(node)),
        }
    }

    fn matches_css(&self, id: NodeId, css: &str) -> bool {
        let parts: Option<Vec<Compound>> = css.split_whitespace().map(Compound::parse).collect();
        let Some(parts) = parts else {
            return false;
        };
        let Some((last, ancestors)) = parts.split_last() else {
            return false;
        };
        let Some(slot) = self.slots.get(id) else {
            return false;
        };
        if !last.matches(&slot.node) {
            return false;
        }
        let mut cursor = slot.parent;
        for compound in ancestors.iter().rev() {
            loop {
                let Some(ancestor) = cursor.and_then(|a| self.slots.get(a)) else {
                    return false;
                };
                cursor = ancestor.parent;
                if compound.matches(&ancestor.node) {
                    break;
                }
            }
        }
        true
    }

    fn outer_html(&self, id: NodeId) -> String {
        let Some(slot) = self.slots.get(id) else {
            return String::new();
        };
        let node = &slot.node;
        let mut html = format!("<{}", node.tag);
        for (name, value) in &node.attributes {
            html.push_str(&format!(" {name}=\"{value}\""));
        }
        html.push('>');
        html.push_str(&node.text);
        for &child in &slot.children {
            html.push_str(&self.outer_html(child));
        }
        html.push_str(&format!("</{}>", node.tag));
        html
    }

    fn select_option(&mut self, id: NodeId) {
        let parent = self.slots.get(id).and_then(|slot| slot.parent);
        let multiple = parent
            .and_then(|p| self.slots.get(p))
            .is_some_and(|p| p.node.attr("multiple").is_some());
        if multiple {
            if let Some(slot) = self.slots.get_mut(id) {
                slot.node.selected = !slot.node.selected;
            }
            return;
        }
        let siblings = parent
            .and_then(|p| self.slots.get(p))
            .map(|p| p.children.clone())
            .unwrap_or_default();
        for sibling in siblings {
            if let Some(slot) = self.slots.get_mut(sibling) {
                if slot.node.tag == "option" {
                    slot.node.selected = false;
                }
            }
        }
        if let Some(slot) = self.slots.get_mut(id) {
            slot.node.selected = true;
        }
    }
}

#[derive(Debug, Default)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<(String, Option<String>)>,
}

impl Compound {
    fn parse(token: &str) -> Option<Self> {
        let is_marker = |c: char| matches!(c, '#' | '.' | '[');
        let mut compound = Self::default();
        let tag_end = token.find(is_marker).unwrap_or(token.len());
        let tag = &token[..tag_end];
        if !tag.is_empty() && tag != "*" {
            compound.tag = Some(tag.to_lowercase());
        }
        let mut rest = &token[tag_end..];
        while let Some(marker) = rest.chars().next() {
            match marker {
                '#' | '.' => {
                    let body = &rest[1..];
                    let end = body.find(is_marker).unwrap_or(body.len());
                    let name = body[..end].to_string();
                    if marker == '#' {
                        compound.id = Some(name);
                    } else {
                        compound.classes.push(name);
                    }
                    rest = &body[end..];
                }
                '[' => {
                    let end = rest.find(']')?;
                    let inner = &rest[1..end];
                    let attribute = match inner.split_once('=') {
                        Some((name, value)) => (
                            name.trim().to_string(),
                            Some(unquote(value.trim()).to_string()),
                        ),
                        None => (inner.trim().to_string(), None),
                    };
                    compound.attributes.push(attribute);
                    rest = &rest[end + 1..];
                }
                _ => return None,
            }
        }
        Some(compound)
    }

    fn matches(&self, node: &MockNode) -> bool {
        self.tag.as_deref().map_or(true, |tag| node.tag == tag)
            && self
                .id
                .as_deref()
                .map_or(true, |id| node.attr("id") == Some(id))
            && self.classes.iter().all(|class| node.has_class(class))
            && self
                .attributes
                .iter()
                .all(|(name, value)| match value {
                    Some(value) => node.attr(name) == Some(value.as_str()),
                    None => node.attr(name).is_some(),
                })
    }
}

#[derive(Debug)]
enum XPathPredicate {
    None,
    Attribute(String, String),
    Text(String),
}

#[derive(Debug)]
struct XPathStep {
    tag: Option<String>,
    predicate: XPathPredicate,
}

impl XPathStep {
    fn parse(xpath: &str) -> Option<Self> {
        let rest = xpath.trim().strip_prefix("//")?;
        let (tag, predicate) = match rest.split_once('[') {
            Some((tag, predicate)) => (tag, Some(predicate.strip_suffix(']')?)),
            None => (rest, None),
        };
        let tag = (tag != "*").then(|| tag.to_lowercase());
        let predicate = match predicate {
            None => XPathPredicate::None,
            Some(p) => {
                let (lhs, rhs) = p.split_once('=')?;
                let value = unquote(rhs.trim()).to_string();
                let lhs = lhs.trim();
                if lhs == "text()" {
                    XPathPredicate::Text(value)
                } else {
                    XPathPredicate::Attribute(lhs.strip_prefix('@')?.to_string(), value)
                }
            }
        };
        Some(Self { tag, predicate })
    }

    fn matches(&self, node: &MockNode) -> bool {
        if self.tag.as_deref().is_some_and(|tag| node.tag != tag) {
            return false;
        }
        match &self.predicate {
            XPathPredicate::None => true,
            XPathPredicate::Attribute(name, value) => node.attr(name) == Some(value.as_str()),
            XPathPredicate::Text(value) => node.text == *value,
        }
    }
}

fn unquote(value: &str) -> &str {
    value.trim_matches(|c| c == '\'' || c == '"')
}

/// In-memory browser session; clones share one document
#[derive(Clone)]
pub struct MockSession {
    id: String,
    document: Arc<Mutex<Document>>,
}

impl fmt::Debug for MockSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let document = self.document.lock();
        f.debug_struct("MockSession")
            .field("id", &self.id)
            .field("url", &document.url)
            .field("nodes", &document.slots.len())
            .finish_non_exhaustive()
    }
}

impl Default for MockSession {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSession {
    /// Empty session at `about:blank`
    #[must_use]
    pub fn new() -> Self {
        let document = Document {
            url: "about:blank".to_string(),
            ..Document::default()
        };
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            document: Arc::new(Mutex::new(document)),
        }
    }

    /// Add a top-level node
    pub fn append(&self, node: MockNode) -> NodeId {
        self.document.lock().insert(None, node)
    }

    /// Add a node under `parent`
    pub fn append_child(&self, parent: NodeId, node: MockNode) -> NodeId {
        self.document.lock().insert(Some(parent), node)
    }

    /// Detach a node and its subtree; existing handles go stale
    pub fn remove(&self, id: NodeId) {
        let mut document = self.document.lock();
        document.detach(id);
        document.roots.retain(|&root| root != id);
    }

    /// Mutate a node in place
    pub fn update(&self, id: NodeId, f: impl FnOnce(&mut MockNode)) {
        if let Some(slot) = self.document.lock().slots.get_mut(id) {
            f(&mut slot.node);
        }
    }

    /// Handle to a node, as if it had been located
    #[must_use]
    pub fn element(&self, id: NodeId) -> MockElement {
        MockElement {
            session: self.clone(),
            node: id,
        }
    }

    /// Set the document title
    pub fn set_title(&self, title: impl Into<String>) {
        self.document.lock().title = title.into();
    }

    /// Build the document whenever `url` is loaded or refreshed
    pub fn route(&self, url: impl Into<String>, handler: impl Fn(&Self) + Send + Sync + 'static) {
        self.document
            .lock()
            .routes
            .insert(url.into(), Arc::new(handler));
    }

    /// Run `handler` after `id` is clicked
    pub fn on_click(&self, id: NodeId, handler: impl Fn(&Self) + Send + Sync + 'static) {
        self.document.lock().clicks.insert(id, Arc::new(handler));
    }

    /// Simulate a crashed or disconnected browser
    pub fn terminate(&self) {
        self.document.lock().terminated = true;
    }

    /// Recorded calls (`navigate:<url>`, `refresh`, `click:<node>`, `quit`)
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.document.lock().history.clone()
    }

    /// Whether a call with this prefix was recorded
    #[must_use]
    pub fn was_called(&self, prefix: &str) -> bool {
        self.document
            .lock()
            .history
            .iter()
            .any(|call| call.starts_with(prefix))
    }

    /// Number of `find_elements` calls served so far
    #[must_use]
    pub fn lookups(&self) -> usize {
        self.document.lock().lookups
    }

    fn load(&self, url: &str) {
        let handler = {
            let mut document = self.document.lock();
            document.clear();
            document.url = url.to_string();
            document.routes.get(url).cloned()
        };
        if let Some(handler) = handler {
            handler(self);
        }
    }
}

impl SearchContext for MockSession {
    type Element = MockElement;

    fn find_elements(&self, locator: &Locator) -> DriverResult<Vec<MockElement>> {
        let ids = self.document.lock().find(None, locator)?;
        Ok(ids.into_iter().map(|id| self.element(id)).collect())
    }
}

impl Session for MockSession {
    fn session_id(&self) -> String {
        self.id.clone()
    }

    fn navigate(&self, url: &str) -> DriverResult<()> {
        {
            let mut document = self.document.lock();
            document.ensure_alive()?;
            document.history.push(format!("navigate:{url}"));
        }
        self.load(url);
        Ok(())
    }

    fn refresh(&self) -> DriverResult<()> {
        let url = {
            let mut document = self.document.lock();
            document.ensure_alive()?;
            document.history.push("refresh".to_string());
            document.url.clone()
        };
        self.load(&url);
        Ok(())
    }

    fn current_url(&self) -> DriverResult<String> {
        let document = self.document.lock();
        document.ensure_alive()?;
        Ok(document.url.clone())
    }

    fn title(&self) -> DriverResult<String> {
        let document = self.document.lock();
        document.ensure_alive()?;
        Ok(document.title.clone())
    }

    fn quit(&self) -> DriverResult<()> {
        let mut document = self.document.lock();
        document.ensure_alive()?;
        document.history.push("quit".to_string());
        document.terminated = true;
        Ok(())
    }
}

/// Handle to a node of a [`MockSession`]
#[derive(Clone)]
pub struct MockElement {
    session: MockSession,
    node: NodeId,
}

impl fmt::Debug for MockElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockElement")
            .field("node", &self.node)
            .finish_non_exhaustive()
    }
}

impl MockElement {
    /// Node behind the handle
    #[must_use]
    pub const fn node_id(&self) -> NodeId {
        self.node
    }

    fn read<R>(&self, f: impl FnOnce(&MockNode) -> R) -> DriverResult<R> {
        let document = self.session.document.lock();
        document.readable(self.node).map(f)
    }

    fn write<R>(&self, f: impl FnOnce(&mut MockNode) -> R) -> DriverResult<R> {
        let mut document = self.session.document.lock();
        document.readable_mut(self.node).map(f)
    }
}

impl SearchContext for MockElement {
    type Element = Self;

    fn find_elements(&self, locator: &Locator) -> DriverResult<Vec<Self>> {
        let ids = self.session.document.lock().find(Some(self.node), locator)?;
        Ok(ids.into_iter().map(|id| self.session.element(id)).collect())
    }
}

impl Element for MockElement {
    fn tag_name(&self) -> DriverResult<String> {
        self.read(|node| node.tag.clone())
    }

    fn is_displayed(&self) -> DriverResult<bool> {
        self.read(|node| node.visible)
    }

    fn is_enabled(&self) -> DriverResult<bool> {
        self.read(|node| node.enabled)
    }

    fn is_selected(&self) -> DriverResult<bool> {
        self.read(|node| node.selected)
    }

    fn text(&self) -> DriverResult<String> {
        self.read(|node| node.text.clone())
    }

    fn attribute(&self, name: &str) -> DriverResult<Option<String>> {
        self.read(|node| match node.attr(name) {
            Some(value) => Some(value.to_string()),
            None if name == "value" && node.tag == "option" => Some(node.text.clone()),
            None => None,
        })
    }

    fn outer_html(&self) -> DriverResult<String> {
        let document = self.session.document.lock();
        document.readable(self.node)?;
        Ok(document.outer_html(self.node))
    }

    fn click(&self) -> DriverResult<()> {
        let handler = {
            let mut document = self.session.document.lock();
            let node = document.readable(self.node)?;
            let (tag, kind) = (node.tag.clone(), node.attr("type").map(str::to_string));
            document.history.push(format!("click:{}", self.node));
            match (tag.as_str(), kind.as_deref()) {
                ("option", _) => document.select_option(self.node),
                ("input", Some("checkbox")) => {
                    let node = document.readable_mut(self.node)?;
                    node.selected = !node.selected;
                }
                _ => {}
            }
            document.clicks.get(&self.node).cloned()
        };
        if let Some(handler) = handler {
            handler(&self.session);
        }
        Ok(())
    }

    fn send_keys(&self, text: &str) -> DriverResult<()> {
        self.write(|node| {
            node.attributes
                .entry("value".to_string())
                .or_default()
                .push_str(text);
        })
    }

    fn clear(&self) -> DriverResult<()> {
        self.write(|node| {
            node.attributes.insert("value".to_string(), String::new());
        })
    }
}
