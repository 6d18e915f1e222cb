//! The browser DOM as [`Host`], through [`web_sys`].
//!
//! Event listeners are [`Closure`]s owned by the [`WebNode`] they were registered on.
//! Appending a node moves its listeners into its parent, so after [`Host::replace_children`] the [`WebMount`] owns exactly the current generation's listeners.
//! Replacing that generation removes each of them from its DOM target and then drops it.
//!
//! # Correct Use
//!
//! Don't modify the mount point's child nodes from outside the render loop.
//! Nodes inserted there by other code are removed on the next render pass.

use crate::{
	build::BuildError,
	descriptor::Handler,
	host::{Host, Snapshot},
	session::TokenStore,
};
use core::fmt::{self, Debug, Formatter};
use js_sys::Function;
use tracing::{error, instrument, trace, trace_span};
use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{Attr, Document, Element, EventTarget, NamedNodeMap, Node, NodeList, Storage, Text};

/// One registered event listener. Unregisters itself when dropped.
struct Listener {
	target: EventTarget,
	event: String,
	closure: Closure<dyn Fn(web_sys::Event)>,
}

impl Drop for Listener {
	fn drop(&mut self) {
		if let Err(error) = self.target.remove_event_listener_with_callback(&self.event, self.closure.as_ref().unchecked_ref::<Function>()) {
			error!("Failed to remove event listener {:?}: {:?}", self.event, error)
		}
	}
}

/// A realized DOM node, together with the listeners registered in its subtree.
pub struct WebNode {
	node: Node,
	listeners: Vec<Listener>,
}

impl WebNode {
	#[must_use]
	pub fn node(&self) -> &Node {
		&self.node
	}

	/// [`None`] for text nodes.
	#[must_use]
	pub fn element(&self) -> Option<&Element> {
		self.node.dyn_ref::<Element>()
	}

	/// How many listeners this subtree currently owns.
	#[must_use]
	pub fn listener_count(&self) -> usize {
		self.listeners.len()
	}
}

impl Debug for WebNode {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("WebNode").field("node", &self.node).field("listeners", &self.listeners.len()).finish()
	}
}

/// A pre-existing DOM element that a render loop owns the child nodes of.
pub struct WebMount {
	element: Element,
	live: Vec<Listener>,
}

impl WebMount {
	#[must_use]
	pub fn new(element: Element) -> Self {
		Self { element, live: Vec::new() }
	}

	/// Looks up the mount point like `document.querySelector("#id")`.
	#[must_use]
	pub fn by_id(document: &Document, id: &str) -> Option<Self> {
		document.get_element_by_id(id).map(Self::new)
	}

	#[must_use]
	pub fn element(&self) -> &Element {
		&self.element
	}

	/// How many listeners the current generation registered.
	#[must_use]
	pub fn listener_count(&self) -> usize {
		self.live.len()
	}
}

impl Debug for WebMount {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("WebMount").field("element", &self.element).field("live", &self.live.len()).finish()
	}
}

/// Creates nodes in one [`Document`].
#[derive(Debug, Clone)]
pub struct WebHost {
	document: Document,
}

impl WebHost {
	#[must_use]
	pub fn new(document: Document) -> Self {
		Self { document }
	}

	/// Uses `window.document`, if there is one.
	#[must_use]
	pub fn from_window() -> Option<Self> {
		web_sys::window()?.document().map(Self::new)
	}

	#[must_use]
	pub fn document(&self) -> &Document {
		&self.document
	}
}

impl Host for WebHost {
	type Node = WebNode;
	type Mount = WebMount;
	type Event = web_sys::Event;

	fn create_element(&self, tag: &str) -> Result<WebNode, BuildError> {
		match self.document.create_element(tag) {
			Ok(element) => Ok(WebNode {
				node: element.into(),
				listeners: Vec::new(),
			}),
			Err(error) => {
				error!("Failed to create HTML element: {:?}", error);
				Err(BuildError::Host {
					tag: tag.to_owned(),
					message: format!("{:?}", error),
				})
			}
		}
	}

	fn create_text(&self, text: &str) -> WebNode {
		WebNode {
			node: self.document.create_text_node(text).into(),
			listeners: Vec::new(),
		}
	}

	fn set_attribute(&self, element: &mut WebNode, name: &str, value: &str) {
		match element.node.dyn_ref::<Element>() {
			Some(element) => {
				if let Err(error) = element.set_attribute(name, value) {
					error!("Could not add attribute {:?}: {:?}", name, error)
				}
			}
			None => error!("Expected to set attribute {:?} on `web_sys::Element` but found {:?}", name, element.node),
		}
	}

	fn add_listener(&self, element: &mut WebNode, event: &str, handler: Handler<web_sys::Event>) {
		let target: EventTarget = element.node.clone().into();
		let closure = Closure::wrap(Box::new({
			let event = event.to_owned();
			move |dom_event: web_sys::Event| {
				let span = trace_span!("Listener", event = event.as_str());
				let _enter = span.enter();
				handler.call(&dom_event)
			}
		}) as Box<dyn Fn(web_sys::Event)>);

		if let Err(error) = target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref::<Function>()) {
			return error!("Failed to add event listener {:?}: {:?}", event, error);
		}
		element.listeners.push(Listener {
			target,
			event: event.to_owned(),
			closure,
		})
	}

	fn append_child(&self, parent: &mut WebNode, child: WebNode) {
		let WebNode { node, listeners } = child;
		if let Err(error) = parent.node.append_child(&node) {
			return error!("Failed to append node: {:?}", error);
		}
		parent.listeners.extend(listeners)
	}

	#[instrument(skip(root))]
	fn replace_children(&self, mount: &mut WebMount, root: WebNode) {
		let mut removed = 0_usize;
		while let Some(child) = mount.element.first_child() {
			if let Err(error) = mount.element.remove_child(&child) {
				error!("Failed to remove previous node {:?}: {:?}", child, error);
				break;
			}
			removed += 1;
		}
		trace!("Removed {} node(s).", removed);

		let WebNode { node, listeners } = root;
		if let Err(error) = mount.element.append_child(&node) {
			error!("Failed to insert new generation: {:?}", error)
		}
		let previous = std::mem::replace(&mut mount.live, listeners);
		trace!("Freed {} event listener(s).", previous.len());
		drop(previous);
	}

	fn snapshot(&self, node: &WebNode) -> Snapshot {
		snapshot_node(&node.node).unwrap_or_else(|| Snapshot::Text(String::new()))
	}

	fn snapshot_children(&self, mount: &WebMount) -> Vec<Snapshot> {
		snapshot_child_nodes(&mount.element.child_nodes())
	}
}

/// Copies an element or text node. Other node types (like comments) yield [`None`].
#[must_use]
pub fn snapshot_node(node: &Node) -> Option<Snapshot> {
	if let Some(element) = node.dyn_ref::<Element>() {
		Some(Snapshot::element(&element.tag_name(), snapshot_attributes(&element.attributes()), snapshot_child_nodes(&element.child_nodes())))
	} else if let Some(text) = node.dyn_ref::<Text>() {
		Some(Snapshot::Text(text.data()))
	} else {
		trace!("Skipping unrecognised node: {:?}", node);
		None
	}
}

#[must_use]
pub fn snapshot_child_nodes(child_nodes: &NodeList) -> Vec<Snapshot> {
	(0..child_nodes.length()).filter_map(|i| child_nodes.item(i)).filter_map(|child| snapshot_node(&child)).collect()
}

fn snapshot_attributes(attributes: &NamedNodeMap) -> Vec<(String, String)> {
	(0..attributes.length()).filter_map(|i| attributes.item(i)).map(|attribute: Attr| (attribute.local_name(), attribute.value())).collect()
}

/// `window.localStorage` as [`TokenStore`].
#[derive(Debug, Clone)]
pub struct LocalStorage(Storage);

impl LocalStorage {
	#[must_use]
	pub fn new(storage: Storage) -> Self {
		Self(storage)
	}

	/// [`None`] if there is no window or storage access is denied.
	#[must_use]
	pub fn from_window() -> Option<Self> {
		web_sys::window()?.local_storage().ok().flatten().map(Self)
	}
}

impl TokenStore for LocalStorage {
	fn get(&self, key: &str) -> Option<String> {
		match self.0.get_item(key) {
			Ok(value) => value,
			Err(error) => {
				error!("Failed to read {:?} from storage: {:?}", key, error);
				None
			}
		}
	}

	fn set(&self, key: &str, value: &str) {
		if let Err(error) = self.0.set_item(key, value) {
			error!("Failed to write {:?} to storage: {:?}", key, error)
		}
	}

	fn remove(&self, key: &str) {
		if let Err(error) = self.0.remove_item(key) {
			error!("Failed to remove {:?} from storage: {:?}", key, error)
		}
	}
}
