//! The Node Builder: realizes [`Descriptor`]s into concrete host elements.

use crate::{
	descriptor::{Child, Descriptor, Prop},
	host::Host,
	vocabulary::Vocabulary,
};
use thiserror::Error;
use tracing::{instrument, trace, trace_span};

/// A malformed [`Descriptor`]. This is a programmer error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
	#[error("empty element tag")]
	EmptyTag,
	#[error("unknown element tag <{0}>")]
	UnknownTag(String),
	#[error("host failed to create <{tag}>: {message}")]
	Host { tag: String, message: String },
}

/// Turns [`Descriptor`]s into [`Host::Node`]s, checking tags against its [`Vocabulary`].
///
/// Building never attaches the result anywhere, and building equal input twice produces two independent elements.
#[derive(Debug, Clone, Default)]
pub struct Builder {
	vocabulary: Vocabulary,
}

impl Builder {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn with_vocabulary(vocabulary: Vocabulary) -> Self {
		Self { vocabulary }
	}

	#[must_use]
	pub fn vocabulary(&self) -> &Vocabulary {
		&self.vocabulary
	}

	/// Builds one element from its parts, like `h(tag, props, ...children)`.
	///
	/// # Errors
	///
	/// Iff `tag` or the tag of any nested [`Descriptor`] is empty or unknown, or the host refuses to create the element.
	pub fn build<H: Host>(&self, host: &H, tag: &str, props: Vec<Prop<H::Event>>, children: Vec<Child<H>>) -> Result<H::Node, BuildError> {
		self.check_tag(tag)?;

		let span = trace_span!("Creating element", tag);
		let _enter = span.enter();
		let mut element = host.create_element(tag)?;

		for prop in props {
			match prop {
				Prop::Attribute { name, value } => match value.to_attribute_value() {
					Some(value) => {
						let name = attribute_name(&name);
						if cfg!(feature = "dangerous-logging") {
							trace!(attribute = name, value = value.as_str(), "Setting attribute.");
						} else {
							trace!(attribute = name, "Setting attribute.");
						}
						host.set_attribute(&mut element, name, &value)
					}
					None => trace!(attribute = name.as_str(), "Skipping absent attribute."),
				},
				Prop::Listener { event, handler } => {
					trace!(event = event.as_str(), "Adding listener.");
					host.add_listener(&mut element, &event, handler)
				}
			}
		}

		for child in children {
			self.append(host, &mut element, child)?;
		}

		Ok(element)
	}

	/// Realizes a whole [`Descriptor`] tree.
	///
	/// # Errors
	///
	/// See [`Builder::build`].
	#[instrument(skip(self, host, descriptor), fields(tag = descriptor.tag()))]
	pub fn realize<H: Host>(&self, host: &H, descriptor: Descriptor<H>) -> Result<H::Node, BuildError> {
		let (tag, props, children) = descriptor.into_parts();
		self.build(host, &tag, props, children)
	}

	fn append<H: Host>(&self, host: &H, parent: &mut H::Node, child: Child<H>) -> Result<(), BuildError> {
		match child {
			Child::Text(text) => {
				if cfg!(feature = "dangerous-logging") {
					trace!(text = text.as_str(), "Appending text.");
				}
				host.append_child(parent, host.create_text(&text))
			}
			Child::Node(descriptor) => {
				let element = self.realize(host, descriptor)?;
				host.append_child(parent, element)
			}
			Child::Element(element) => host.append_child(parent, element),
			Child::Many(children) => {
				for child in children {
					self.append(host, parent, child)?;
				}
			}
		}
		Ok(())
	}

	fn check_tag(&self, tag: &str) -> Result<(), BuildError> {
		if tag.is_empty() {
			Err(BuildError::EmptyTag)
		} else if !self.vocabulary.contains(tag) {
			Err(BuildError::UnknownTag(tag.to_owned()))
		} else {
			Ok(())
		}
	}
}

/// Maps the DOM property names commonly used in element props to their attribute names.
fn attribute_name(name: &str) -> &str {
	match name {
		"className" => "class",
		"htmlFor" => "for",
		name => name,
	}
}

/// [`Builder::build`] with the default HTML [`Vocabulary`].
///
/// # Errors
///
/// See [`Builder::build`].
pub fn build<H: Host>(host: &H, tag: &str, props: Vec<Prop<H::Event>>, children: Vec<Child<H>>) -> Result<H::Node, BuildError> {
	Builder::new().build(host, tag, props, children)
}

#[cfg(test)]
mod tests {
	use super::{attribute_name, BuildError, Builder};
	use crate::{mem::MemoryHost, vocabulary::Vocabulary, Child, Descriptor};

	#[test]
	fn property_aliases() {
		assert_eq!(attribute_name("className"), "class");
		assert_eq!(attribute_name("htmlFor"), "for");
		assert_eq!(attribute_name("aria-label"), "aria-label");
	}

	#[test]
	fn tag_errors() {
		let host = MemoryHost::new();
		let builder = Builder::new();
		assert_eq!(builder.build(&host, "", vec![], vec![]).unwrap_err(), BuildError::EmptyTag);
		assert_eq!(builder.build(&host, "blink", vec![], vec![]).unwrap_err(), BuildError::UnknownTag("blink".to_owned()));
	}

	#[test]
	fn nested_unknown_tag_fails_whole_build() {
		let host = MemoryHost::new();
		let nested: Descriptor<MemoryHost> = Descriptor::new("marquee", vec![], vec![]);
		let result = Builder::new().build(&host, "div", vec![], vec![Child::from("ok"), Child::from(nested)]);
		assert_eq!(result.unwrap_err(), BuildError::UnknownTag("marquee".to_owned()));
	}

	#[test]
	fn custom_vocabulary() {
		let host = MemoryHost::new();
		let builder = Builder::with_vocabulary(Vocabulary::empty().with_tags(&["row"]));
		assert!(builder.build(&host, "row", vec![], vec![]).is_ok());
		assert!(builder.build(&host, "div", vec![], vec![]).is_err());
		assert!(builder.vocabulary().contains("ROW"));
	}
}
