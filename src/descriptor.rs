//! Declarative, not yet realized UI nodes.

use crate::host::Host;
use core::fmt::{self, Debug, Formatter};
use std::rc::Rc;

/// A shared event callback.
///
/// Cloning a [`Handler`] shares the callback, so the same handler may be bound to several elements.
pub struct Handler<E>(Rc<dyn Fn(&E)>);

impl<E: 'static> Handler<E> {
	pub fn new(handler: impl 'static + Fn(&E)) -> Self {
		Self(Rc::new(handler))
	}

	/// Wraps a callback that doesn't care about the event itself.
	pub fn from_fn(handler: impl 'static + Fn()) -> Self {
		Self(Rc::new(move |_: &E| handler()))
	}

	pub fn call(&self, event: &E) {
		(self.0)(event)
	}

	/// Whether `self` and `other` share the same callback.
	#[must_use]
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}
}

impl<E> Clone for Handler<E> {
	fn clone(&self) -> Self {
		Self(Rc::clone(&self.0))
	}
}

impl<E> Debug for Handler<E> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Handler").field(&Rc::as_ptr(&self.0)).finish()
	}
}

/// The value of an attribute prop.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
	Text(String),
	Number(f64),
	/// `true` sets the attribute without value, `false` skips it.
	Bool(bool),
	/// Skipped entirely.
	Absent,
}

impl AttrValue {
	/// The string to set the attribute to, or [`None`] if it shouldn't be set at all.
	#[must_use]
	pub fn to_attribute_value(&self) -> Option<String> {
		match self {
			AttrValue::Text(text) => Some(text.clone()),
			AttrValue::Number(number) => Some(format_number(*number)),
			AttrValue::Bool(true) => Some(String::new()),
			AttrValue::Bool(false) | AttrValue::Absent => None,
		}
	}
}

/// Formats `number` the way a browser stringifies it.
pub(crate) fn format_number(number: f64) -> String {
	if number.is_nan() {
		"NaN".to_owned()
	} else if number.is_infinite() {
		let infinity = if number > 0.0 { "Infinity" } else { "-Infinity" };
		infinity.to_owned()
	} else if number == 0.0 {
		// Also catches `-0.0`.
		"0".to_owned()
	} else if number.abs() >= 1e21 || number.abs() < 1e-6 {
		// Shortest round-trip digits either way, but browsers sign positive exponents.
		let exponential = format!("{:e}", number);
		match exponential.split_once('e') {
			Some((mantissa, exponent)) if !exponent.starts_with('-') => format!("{}e+{}", mantissa, exponent),
			_ => exponential,
		}
	} else {
		number.to_string()
	}
}

impl From<&str> for AttrValue {
	fn from(text: &str) -> Self {
		Self::Text(text.to_owned())
	}
}

impl From<String> for AttrValue {
	fn from(text: String) -> Self {
		Self::Text(text)
	}
}

impl From<&String> for AttrValue {
	fn from(text: &String) -> Self {
		Self::Text(text.clone())
	}
}

impl From<bool> for AttrValue {
	fn from(present: bool) -> Self {
		Self::Bool(present)
	}
}

impl From<f64> for AttrValue {
	fn from(number: f64) -> Self {
		Self::Number(number)
	}
}

impl From<f32> for AttrValue {
	fn from(number: f32) -> Self {
		Self::Number(number.into())
	}
}

macro_rules! integer_attr_values {
	($($integer:ty),*$(,)?) => {$(
		impl From<$integer> for AttrValue {
			fn from(integer: $integer) -> Self {
				Self::Text(integer.to_string())
			}
		}
	)*};
}
integer_attr_values!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl<T: Into<AttrValue>> From<Option<T>> for AttrValue {
	fn from(value: Option<T>) -> Self {
		value.map_or(Self::Absent, Into::into)
	}
}

/// An attribute or an event listener, as decided by the caller.
pub enum Prop<E> {
	Attribute { name: String, value: AttrValue },
	Listener { event: String, handler: Handler<E> },
}

impl<E: 'static> Prop<E> {
	pub fn attr(name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
		Self::Attribute {
			name: name.into(),
			value: value.into(),
		}
	}

	/// Listens for `event` (for example `"click"`, without `on` prefix) with a callback that ignores the event object.
	pub fn on(event: impl Into<String>, handler: impl 'static + Fn()) -> Self {
		Self::Listener {
			event: event.into(),
			handler: Handler::from_fn(handler),
		}
	}

	/// Listens for `event` with a callback that receives the host's event object.
	pub fn on_event(event: impl Into<String>, handler: impl 'static + Fn(&E)) -> Self {
		Self::Listener {
			event: event.into(),
			handler: Handler::new(handler),
		}
	}

	/// Binds an existing (possibly shared) handler.
	pub fn listener(event: impl Into<String>, handler: Handler<E>) -> Self {
		Self::Listener { event: event.into(), handler }
	}
}

impl<E> Clone for Prop<E> {
	fn clone(&self) -> Self {
		match self {
			Prop::Attribute { name, value } => Prop::Attribute {
				name: name.clone(),
				value: value.clone(),
			},
			Prop::Listener { event, handler } => Prop::Listener {
				event: event.clone(),
				handler: handler.clone(),
			},
		}
	}
}

impl<E> Debug for Prop<E> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Prop::Attribute { name, value } => f.debug_struct("Attribute").field("name", name).field("value", value).finish(),
			Prop::Listener { event, handler } => f.debug_struct("Listener").field("event", event).field("handler", handler).finish(),
		}
	}
}

/// One child slot of a [`Descriptor`].
pub enum Child<H: Host> {
	Text(String),
	Node(Descriptor<H>),
	/// An already realized element, attached as-is.
	Element(H::Node),
	/// A sequence, flattened in order.
	Many(Vec<Child<H>>),
}

impl<H: Host> Child<H> {
	pub fn text(text: impl Into<String>) -> Self {
		Self::Text(text.into())
	}

	pub fn element(node: H::Node) -> Self {
		Self::Element(node)
	}

	#[must_use]
	pub fn empty() -> Self {
		Self::Many(Vec::new())
	}
}

impl<H: Host> Debug for Child<H> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Child::Text(text) => f.debug_tuple("Text").field(text).finish(),
			Child::Node(descriptor) => descriptor.fmt(f),
			Child::Element(_) => f.write_str("Element(..)"),
			Child::Many(children) => f.debug_tuple("Many").field(children).finish(),
		}
	}
}

impl<H: Host> From<Descriptor<H>> for Child<H> {
	fn from(descriptor: Descriptor<H>) -> Self {
		Self::Node(descriptor)
	}
}

impl<H: Host> From<&str> for Child<H> {
	fn from(text: &str) -> Self {
		Self::Text(text.to_owned())
	}
}

impl<H: Host> From<String> for Child<H> {
	fn from(text: String) -> Self {
		Self::Text(text)
	}
}

impl<H: Host> From<&String> for Child<H> {
	fn from(text: &String) -> Self {
		Self::Text(text.clone())
	}
}

impl<H: Host> From<char> for Child<H> {
	fn from(c: char) -> Self {
		Self::Text(c.to_string())
	}
}

impl<H: Host> From<bool> for Child<H> {
	fn from(b: bool) -> Self {
		Self::Text(b.to_string())
	}
}

impl<H: Host> From<f64> for Child<H> {
	fn from(number: f64) -> Self {
		Self::Text(format_number(number))
	}
}

impl<H: Host> From<f32> for Child<H> {
	fn from(number: f32) -> Self {
		Self::Text(format_number(number.into()))
	}
}

macro_rules! integer_children {
	($($integer:ty),*$(,)?) => {$(
		impl<H: Host> From<$integer> for Child<H> {
			fn from(integer: $integer) -> Self {
				Self::Text(integer.to_string())
			}
		}
	)*};
}
integer_children!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl<H: Host, T: Into<Child<H>>> From<Vec<T>> for Child<H> {
	fn from(children: Vec<T>) -> Self {
		Self::Many(children.into_iter().map(Into::into).collect())
	}
}

impl<H: Host, T: Into<Child<H>>> From<Option<T>> for Child<H> {
	fn from(child: Option<T>) -> Self {
		child.map_or_else(Self::empty, Into::into)
	}
}

/// A declarative description of one element and its children.
///
/// Immutable once constructed. [`Builder::realize`](`crate::Builder::realize`) consumes it.
pub struct Descriptor<H: Host> {
	tag: String,
	props: Vec<Prop<H::Event>>,
	children: Vec<Child<H>>,
}

impl<H: Host> Descriptor<H> {
	pub fn new(tag: impl Into<String>, props: Vec<Prop<H::Event>>, children: Vec<Child<H>>) -> Self {
		Self {
			tag: tag.into(),
			props,
			children,
		}
	}

	#[must_use]
	pub fn tag(&self) -> &str {
		&self.tag
	}

	#[must_use]
	pub fn props(&self) -> &[Prop<H::Event>] {
		&self.props
	}

	#[must_use]
	pub fn children(&self) -> &[Child<H>] {
		&self.children
	}

	pub(crate) fn into_parts(self) -> (String, Vec<Prop<H::Event>>, Vec<Child<H>>) {
		(self.tag, self.props, self.children)
	}
}

impl<H: Host> Debug for Descriptor<H> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Descriptor")
			.field("tag", &self.tag)
			.field("props", &self.props)
			.field("children", &self.children)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::{format_number, AttrValue, Child, Prop};
	use crate::mem::{MemEvent, MemoryHost};
	use std::{cell::Cell, rc::Rc};

	#[test]
	fn numbers_format_like_a_browser() {
		assert_eq!(format_number(300.0), "300");
		assert_eq!(format_number(1.5), "1.5");
		assert_eq!(format_number(-0.0), "0");
		assert_eq!(format_number(f64::INFINITY), "Infinity");
		assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
		assert_eq!(format_number(f64::NAN), "NaN");
	}

	#[test]
	fn very_large_and_small_numbers_use_exponents() {
		assert_eq!(format_number(1e21), "1e+21");
		assert_eq!(format_number(-2.5e22), "-2.5e+22");
		assert_eq!(format_number(1e-7), "1e-7");
		assert_eq!(format_number(1.25e-7), "1.25e-7");
		assert_eq!(format_number(1e20), "100000000000000000000");
		assert_eq!(format_number(0.000_001), "0.000001");
	}

	#[test]
	fn attribute_values() {
		assert_eq!(AttrValue::from("x").to_attribute_value().as_deref(), Some("x"));
		assert_eq!(AttrValue::from(300_i32).to_attribute_value().as_deref(), Some("300"));
		assert_eq!(AttrValue::from(true).to_attribute_value().as_deref(), Some(""));
		assert_eq!(AttrValue::from(false).to_attribute_value(), None);
		assert_eq!(AttrValue::from(None::<&str>), AttrValue::Absent);
		assert_eq!(AttrValue::Absent.to_attribute_value(), None);
	}

	#[test]
	fn zero_argument_listener_ignores_event() {
		let count = Rc::new(Cell::new(0));
		let prop = Prop::<MemEvent>::on("click", {
			let count = Rc::clone(&count);
			move || count.set(count.get() + 1)
		});
		match prop {
			Prop::Listener { event, handler } => {
				assert_eq!(event, "click");
				handler.call(&MemEvent::new("click"));
				handler.clone().call(&MemEvent::new("click"));
			}
			Prop::Attribute { .. } => unreachable!(),
		}
		assert_eq!(count.get(), 2);
	}

	#[test]
	fn children_convert() {
		match Child::<MemoryHost>::from(vec![Some(1_i32), None, Some(3)]) {
			Child::Many(children) => {
				assert_eq!(children.len(), 3);
				assert!(matches!(&children[0], Child::Text(text) if text == "1"));
				assert!(matches!(&children[1], Child::Many(empty) if empty.is_empty()));
			}
			other => panic!("Expected `Many` but got {:?}", other),
		}
		assert!(matches!(Child::<MemoryHost>::from(2.0_f64), Child::Text(text) if text == "2"));
	}
}
