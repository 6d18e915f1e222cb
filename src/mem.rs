//! An in-memory [`Host`], for headless rendering and native tests.
//!
//! Nodes are shared handles into a tree with DOM-like semantics:
//! Appending an attached node moves it, and clearing a mount point detaches its children and releases their listeners.

use crate::{
	build::BuildError,
	descriptor::Handler,
	host::{Host, Snapshot},
};
use core::fmt::{self, Debug, Formatter};
use std::{
	cell::RefCell,
	rc::{Rc, Weak},
};
use tracing::{error, instrument, trace};

/// A synthetic event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemEvent {
	name: String,
	value: Option<String>,
}

impl MemEvent {
	pub fn new(name: impl Into<String>) -> Self {
		Self { name: name.into(), value: None }
	}

	/// An event carrying a value, like `input` or `change` on a text field.
	pub fn with_value(name: impl Into<String>, value: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			value: Some(value.into()),
		}
	}

	#[must_use]
	pub fn name(&self) -> &str {
		&self.name
	}

	#[must_use]
	pub fn value(&self) -> Option<&str> {
		self.value.as_deref()
	}
}

enum Kind {
	Element {
		tag: String,
		attributes: Vec<(String, String)>,
		listeners: Vec<(String, Handler<MemEvent>)>,
	},
	Text(String),
}

struct Data {
	kind: Kind,
	children: Vec<MemNode>,
	parent: Option<Weak<RefCell<Data>>>,
}

/// A shared handle to an in-memory element or text node.
#[derive(Clone)]
pub struct MemNode(Rc<RefCell<Data>>);

impl MemNode {
	fn new(kind: Kind) -> Self {
		Self(Rc::new(RefCell::new(Data {
			kind,
			children: Vec::new(),
			parent: None,
		})))
	}

	/// [`None`] for text nodes.
	#[must_use]
	pub fn tag(&self) -> Option<String> {
		match &self.0.borrow().kind {
			Kind::Element { tag, .. } => Some(tag.clone()),
			Kind::Text(_) => None,
		}
	}

	/// [`None`] for elements.
	#[must_use]
	pub fn text(&self) -> Option<String> {
		match &self.0.borrow().kind {
			Kind::Text(text) => Some(text.clone()),
			Kind::Element { .. } => None,
		}
	}

	/// Looks up an attribute by its ASCII-case-insensitive name, like `getAttribute` on an HTML element.
	#[must_use]
	pub fn attribute(&self, name: &str) -> Option<String> {
		let name = name.to_ascii_lowercase();
		match &self.0.borrow().kind {
			Kind::Element { attributes, .. } => attributes.iter().find(|(n, _)| *n == name).map(|(_, v)| v.clone()),
			Kind::Text(_) => None,
		}
	}

	#[must_use]
	pub fn children(&self) -> Vec<MemNode> {
		self.0.borrow().children.clone()
	}

	#[must_use]
	pub fn parent(&self) -> Option<MemNode> {
		self.0.borrow().parent.as_ref().and_then(Weak::upgrade).map(MemNode)
	}

	#[must_use]
	pub fn is_attached(&self) -> bool {
		self.parent().is_some()
	}

	#[must_use]
	pub fn listener_count(&self) -> usize {
		match &self.0.borrow().kind {
			Kind::Element { listeners, .. } => listeners.len(),
			Kind::Text(_) => 0,
		}
	}

	#[must_use]
	pub fn text_content(&self) -> String {
		self.snapshot().text_content()
	}

	/// All elements with the given tag in this subtree (including `self`), in document order.
	#[must_use]
	pub fn find_all(&self, tag: &str) -> Vec<MemNode> {
		let mut found = Vec::new();
		self.collect_tagged(&tag.to_ascii_lowercase(), &mut found);
		found
	}

	fn collect_tagged(&self, tag: &str, into: &mut Vec<MemNode>) {
		if self.tag().as_deref() == Some(tag) {
			into.push(self.clone())
		}
		for child in self.children() {
			child.collect_tagged(tag, into)
		}
	}

	#[must_use]
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}

	/// Whether `self` is `node` or one of its ancestors.
	fn is_inclusive_ancestor_of(&self, node: &MemNode) -> bool {
		let mut current = Some(node.clone());
		while let Some(node) = current {
			if node.ptr_eq(self) {
				return true;
			}
			current = node.parent();
		}
		false
	}

	/// Invokes the listeners registered for `event` on this node, in registration order.
	///
	/// Events don't bubble. Returns how many listeners ran.
	pub fn dispatch(&self, event: &MemEvent) -> usize {
		// Collected first, since listeners may well re-render and clear this node's registrations.
		let handlers: Vec<Handler<MemEvent>> = match &self.0.borrow().kind {
			Kind::Element { listeners, .. } => listeners.iter().filter(|(name, _)| name == event.name()).map(|(_, handler)| handler.clone()).collect(),
			Kind::Text(_) => Vec::new(),
		};
		trace!(event = event.name(), count = handlers.len(), "Dispatching.");
		for handler in &handlers {
			handler.call(event)
		}
		handlers.len()
	}

	/// Dispatches a `click` event.
	pub fn click(&self) -> usize {
		self.dispatch(&MemEvent::new("click"))
	}

	#[must_use]
	pub fn snapshot(&self) -> Snapshot {
		let data = self.0.borrow();
		match &data.kind {
			Kind::Element { tag, attributes, .. } => Snapshot::element(tag, attributes.clone(), data.children.iter().map(MemNode::snapshot).collect()),
			Kind::Text(text) => Snapshot::Text(text.clone()),
		}
	}

	fn detach(&self) {
		let parent = self.0.borrow_mut().parent.take().and_then(|parent| parent.upgrade());
		if let Some(parent) = parent {
			parent.borrow_mut().children.retain(|child| !child.ptr_eq(self));
		}
	}

	fn release_listeners(&self) {
		let mut data = self.0.borrow_mut();
		let data = &mut *data;
		if let Kind::Element { listeners, .. } = &mut data.kind {
			listeners.clear();
		}
		for child in &data.children {
			child.release_listeners()
		}
	}
}

impl Debug for MemNode {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match &self.0.borrow().kind {
			Kind::Element { tag, .. } => write!(f, "MemNode(<{}>)", tag),
			Kind::Text(_) => f.write_str("MemNode(#text)"),
		}
	}
}

/// Names the DOM would reject with an `InvalidCharacterError`.
fn is_valid_attribute_name(name: &str) -> bool {
	!name.is_empty() && !name.chars().any(|c| c.is_whitespace() || c.is_control() || matches!(c, '"' | '\'' | '>' | '/' | '=' | '<'))
}

/// See the [module documentation](`self`).
#[derive(Debug, Default)]
pub struct MemoryHost {
	_private: (),
}

impl MemoryHost {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a detached `<div id="…">` to render into, standing in for a pre-existing host element.
	#[must_use]
	pub fn mount_point(&self, id: &str) -> MemNode {
		MemNode::new(Kind::Element {
			tag: "div".to_owned(),
			attributes: vec![("id".to_owned(), id.to_owned())],
			listeners: Vec::new(),
		})
	}
}

impl Host for MemoryHost {
	type Node = MemNode;
	type Mount = MemNode;
	type Event = MemEvent;

	fn create_element(&self, tag: &str) -> Result<MemNode, BuildError> {
		Ok(MemNode::new(Kind::Element {
			tag: tag.to_ascii_lowercase(),
			attributes: Vec::new(),
			listeners: Vec::new(),
		}))
	}

	fn create_text(&self, text: &str) -> MemNode {
		MemNode::new(Kind::Text(text.to_owned()))
	}

	fn set_attribute(&self, element: &mut MemNode, name: &str, value: &str) {
		if !is_valid_attribute_name(name) {
			return error!("Could not set attribute {:?}: invalid name", name);
		}
		// HTML elements store attribute names lowercased.
		let name = name.to_ascii_lowercase();
		match &mut element.0.borrow_mut().kind {
			Kind::Element { attributes, .. } => match attributes.iter_mut().find(|(n, _)| *n == name) {
				Some((_, existing)) => *existing = value.to_owned(),
				None => attributes.push((name, value.to_owned())),
			},
			Kind::Text(_) => error!("Could not set attribute {:?} on a text node", name),
		}
	}

	fn add_listener(&self, element: &mut MemNode, event: &str, handler: Handler<MemEvent>) {
		match &mut element.0.borrow_mut().kind {
			Kind::Element { listeners, .. } => listeners.push((event.to_owned(), handler)),
			Kind::Text(_) => error!("Could not add listener {:?} to a text node", event),
		}
	}

	fn append_child(&self, parent: &mut MemNode, child: MemNode) {
		if let Kind::Text(_) = parent.0.borrow().kind {
			return error!("Could not append to a text node");
		}
		if child.is_inclusive_ancestor_of(parent) {
			return error!("Could not append {:?} into its own subtree", child);
		}
		child.detach();
		child.0.borrow_mut().parent = Some(Rc::downgrade(&parent.0));
		parent.0.borrow_mut().children.push(child);
	}

	#[instrument(skip(root))]
	fn replace_children(&self, mount: &mut MemNode, root: MemNode) {
		let previous = std::mem::take(&mut mount.0.borrow_mut().children);
		for child in &previous {
			child.0.borrow_mut().parent = None;
			child.release_listeners();
		}
		trace!("Detached {} node(s).", previous.len());
		self.append_child(mount, root);
	}

	fn snapshot(&self, node: &MemNode) -> Snapshot {
		node.snapshot()
	}

	fn snapshot_children(&self, mount: &MemNode) -> Vec<Snapshot> {
		mount.0.borrow().children.iter().map(MemNode::snapshot).collect()
	}
}
