#![doc(html_root_url = "https://docs.rs/rebuild-dom/0.0.1")]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! An element builder and a state-triggered render loop, without diffing.
//!
//! [`h!`] describes a tree of [`Descriptor`]s. A [`Builder`] realizes it through a [`Host`].
//! A [`RenderLoop`] owns one state record and one mount point, and rebuilds the whole mounted subtree on every [`RenderLoop::update_state`].

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

pub mod build;
pub mod descriptor;
pub mod host;
pub mod mem;
pub mod render_loop;
pub mod session;
pub mod state;
pub mod vocabulary;
pub mod web;

pub use build::{build, BuildError, Builder};
pub use descriptor::{AttrValue, Child, Descriptor, Handler, Prop};
pub use host::{Host, Snapshot};
pub use render_loop::{Dispatch, Phase, RenderError, RenderLoop, Ticket};
pub use state::{Merge, Record};
pub use vocabulary::Vocabulary;

/// Writes a [`Descriptor`] like `h(tag, props, ...children)`.
///
/// Props go in brackets. Each child is anything that converts [`Into`] a [`Child`]:
/// text, numbers, nested descriptors, [`Vec`]s (flattened in order) and [`Option`]s (skipped if [`None`]).
///
/// ```
/// use rebuild_dom::{h, mem::MemoryHost, Descriptor, Prop};
///
/// let dogs = vec!["Rex", "Fido"];
/// let items: Vec<Descriptor<MemoryHost>> = dogs.iter().map(|dog| h!("li", [], h!("h3", [], *dog))).collect();
/// let list: Descriptor<MemoryHost> = h!("ul", [Prop::attr("className", "dogs")], items, None::<&str>);
/// assert_eq!(list.tag(), "ul");
/// assert_eq!(list.props().len(), 1);
/// assert_eq!(list.children().len(), 2);
/// ```
#[macro_export]
macro_rules! h {
	($tag:expr) => {
		$crate::Descriptor::new($tag, ::std::vec::Vec::new(), ::std::vec::Vec::new())
	};
	($tag:expr, [$($prop:expr),*$(,)?] $(, $child:expr)*$(,)?) => {
		$crate::Descriptor::new($tag, ::std::vec![$($prop),*], ::std::vec![$($crate::Child::from($child)),*])
	};
}
