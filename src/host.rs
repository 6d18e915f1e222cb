//! The seam between the builder/render loop and a concrete UI toolkit.
//!
//! Everything above this trait is a pure mapping from [`Descriptor`](`crate::Descriptor`)s to host handles.
//! Everything imperative (creating elements, registering listeners, clearing the mount point) happens in a [`Host`] implementation.

use crate::{build::BuildError, descriptor::Handler};

/// A UI toolkit that concrete elements can be created in.
///
/// See [`mem::MemoryHost`](`crate::mem::MemoryHost`) and [`web::WebHost`](`crate::web::WebHost`).
pub trait Host {
	/// A realized element or text node, owned by the render tree.
	///
	/// Listener registrations are owned by this handle (directly or through its ancestors),
	/// so discarding a generation releases them.
	type Node;

	/// The single pre-existing element a render loop replaces the content of.
	type Mount;

	/// What listeners receive when their event fires.
	type Event;

	/// Creates a detached element.
	///
	/// # Errors
	///
	/// Iff the host refuses the tag.
	fn create_element(&self, tag: &str) -> Result<Self::Node, BuildError>;

	/// Creates a detached text node.
	fn create_text(&self, text: &str) -> Self::Node;

	/// Sets an attribute. Failures are logged by the host and otherwise ignored.
	fn set_attribute(&self, element: &mut Self::Node, name: &str, value: &str);

	/// Registers `handler` for `event` on `element` for as long as `element` (or the generation it was attached into) lives.
	fn add_listener(&self, element: &mut Self::Node, event: &str, handler: Handler<Self::Event>);

	/// Appends `child` as last child of `parent`, transferring ownership of its listeners.
	fn append_child(&self, parent: &mut Self::Node, child: Self::Node);

	/// Detaches all current children of `mount` (releasing their listeners) and attaches `root` in their place.
	fn replace_children(&self, mount: &mut Self::Mount, root: Self::Node);

	/// Copies the structure of a realized node.
	fn snapshot(&self, node: &Self::Node) -> Snapshot;

	/// Copies the structure of the mount point's current content.
	fn snapshot_children(&self, mount: &Self::Mount) -> Vec<Snapshot>;
}

/// A host-neutral, comparable copy of a realized tree.
///
/// Element tags are lowercase and attributes are sorted by name, so snapshots taken from different hosts compare equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Snapshot {
	Element {
		tag: String,
		attributes: Vec<(String, String)>,
		children: Vec<Snapshot>,
	},
	Text(String),
}

impl Snapshot {
	/// Normalizes `tag` and `attributes` into a [`Snapshot::Element`].
	#[must_use]
	pub fn element(tag: &str, mut attributes: Vec<(String, String)>, children: Vec<Snapshot>) -> Self {
		attributes.sort();
		Self::Element {
			tag: tag.to_ascii_lowercase(),
			attributes,
			children,
		}
	}

	#[must_use]
	pub fn tag(&self) -> Option<&str> {
		match self {
			Snapshot::Element { tag, .. } => Some(tag),
			Snapshot::Text(_) => None,
		}
	}

	#[must_use]
	pub fn attribute(&self, name: &str) -> Option<&str> {
		match self {
			Snapshot::Element { attributes, .. } => attributes.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str()),
			Snapshot::Text(_) => None,
		}
	}

	#[must_use]
	pub fn children(&self) -> &[Snapshot] {
		match self {
			Snapshot::Element { children, .. } => children,
			Snapshot::Text(_) => &[],
		}
	}

	/// Concatenated text of this node and all its descendants, in document order.
	#[must_use]
	pub fn text_content(&self) -> String {
		let mut text = String::new();
		self.collect_text(&mut text);
		text
	}

	fn collect_text(&self, into: &mut String) {
		match self {
			Snapshot::Text(text) => into.push_str(text),
			Snapshot::Element { children, .. } => {
				for child in children {
					child.collect_text(into)
				}
			}
		}
	}

	/// All elements with the given tag in this subtree (including `self`), in document order.
	#[must_use]
	pub fn find_all(&self, tag: &str) -> Vec<&Snapshot> {
		let mut found = Vec::new();
		self.collect_tagged(&tag.to_ascii_lowercase(), &mut found);
		found
	}

	fn collect_tagged<'a>(&'a self, tag: &str, into: &mut Vec<&'a Snapshot>) {
		if let Snapshot::Element { tag: own_tag, children, .. } = self {
			if own_tag == tag {
				into.push(self)
			}
			for child in children {
				child.collect_tagged(tag, into)
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::Snapshot;

	fn sample() -> Snapshot {
		Snapshot::element(
			"UL",
			vec![("id".into(), "dogs".into()), ("class".into(), "list".into())],
			vec![
				Snapshot::element("li", vec![], vec![Snapshot::Text("Rex".into())]),
				Snapshot::element("li", vec![], vec![Snapshot::Text("Fido".into())]),
			],
		)
	}

	#[test]
	fn element_is_normalized() {
		let snapshot = sample();
		assert_eq!(snapshot.tag(), Some("ul"));
		match &snapshot {
			Snapshot::Element { attributes, .. } => assert_eq!(attributes[0].0, "class"),
			Snapshot::Text(_) => unreachable!(),
		}
		assert_eq!(snapshot.attribute("id"), Some("dogs"));
		assert_eq!(snapshot.attribute("missing"), None);
	}

	#[test]
	fn text_and_search() {
		let snapshot = sample();
		assert_eq!(snapshot.text_content(), "RexFido");
		assert_eq!(snapshot.find_all("LI").len(), 2);
		assert_eq!(snapshot.find_all("li")[1].text_content(), "Fido");
		assert!(snapshot.children()[0].children()[0].tag().is_none());
	}
}
