//! Which element tags a [`Builder`](`crate::Builder`) accepts.

use hashbrown::HashSet;

/// Sorted for binary search.
const HTML_ELEMENTS: &[&str] = &[
	"a", "abbr", "address", "area", "article", "aside", "audio", "b", "base", "bdi", "bdo", "blockquote", "body", "br", "button", "canvas", "caption", "cite", "code", "col", "colgroup", "data", "datalist", "dd", "del", "details", "dfn", "dialog", "div", "dl", "dt", "em", "embed", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "head", "header", "hgroup", "hr", "html", "i", "iframe", "img", "input", "ins", "kbd", "label", "legend", "li", "link", "main", "map", "mark", "menu", "meta", "meter", "nav", "noscript", "object", "ol", "optgroup", "option", "output", "p", "param", "picture", "pre", "progress", "q", "rp", "rt", "ruby", "s", "samp", "script", "search", "section", "select", "slot", "small", "source", "span", "strong", "style", "sub", "summary", "sup", "table", "tbody", "td", "template", "textarea", "tfoot", "th", "thead", "time", "title", "tr", "track", "u", "ul", "var", "video", "wbr",
];

/// Hyphenated names that are reserved by SVG and MathML and can't be custom elements.
const RESERVED_CUSTOM_ELEMENT_NAMES: &[&str] = &["annotation-xml", "color-profile", "font-face", "font-face-format", "font-face-name", "font-face-src", "font-face-uri", "missing-glyph"];

/// The host's known element vocabulary.
///
/// Tags are matched ASCII-case-insensitively, as HTML does.
///
/// Only HTML-namespace elements are known by default.
/// Hosts create every element in the HTML namespace, so SVG and MathML roots (`svg`, `math`) are rejected unless added through [`Vocabulary::with_tags`],
/// where they render as unknown HTML elements.
#[derive(Debug, Clone)]
pub struct Vocabulary {
	html: bool,
	custom_elements: bool,
	extra: HashSet<String>,
}

impl Default for Vocabulary {
	fn default() -> Self {
		Self::html()
	}
}

impl Vocabulary {
	/// HTML elements and valid custom element names.
	#[must_use]
	pub fn html() -> Self {
		Self {
			html: true,
			custom_elements: true,
			extra: HashSet::new(),
		}
	}

	/// Accepts nothing until extended with [`Vocabulary::with_tags`] or [`Vocabulary::allow_custom_elements`].
	#[must_use]
	pub fn empty() -> Self {
		Self {
			html: false,
			custom_elements: false,
			extra: HashSet::new(),
		}
	}

	#[must_use]
	pub fn with_tags<I, T>(mut self, tags: I) -> Self
	where
		I: IntoIterator<Item = T>,
		T: AsRef<str>,
	{
		self.extra.extend(tags.into_iter().map(|tag| tag.as_ref().to_ascii_lowercase()));
		self
	}

	#[must_use]
	pub fn allow_custom_elements(mut self, allow: bool) -> Self {
		self.custom_elements = allow;
		self
	}

	#[must_use]
	pub fn contains(&self, tag: &str) -> bool {
		let tag = tag.to_ascii_lowercase();
		(self.html && HTML_ELEMENTS.binary_search(&tag.as_str()).is_ok())
			|| self.extra.contains(&tag)
			|| (self.custom_elements && is_custom_element_name(&tag))
	}
}

/// See <https://html.spec.whatwg.org/multipage/custom-elements.html#valid-custom-element-name>, restricted to ASCII.
fn is_custom_element_name(tag: &str) -> bool {
	let mut chars = tag.chars();
	matches!(chars.next(), Some('a'..='z'))
		&& tag.contains('-')
		&& chars.all(|c| matches!(c, 'a'..='z' | '0'..='9' | '-' | '.' | '_'))
		&& !RESERVED_CUSTOM_ELEMENT_NAMES.contains(&tag)
}

#[cfg(test)]
mod tests {
	use super::{Vocabulary, HTML_ELEMENTS};

	#[test]
	fn html_list_is_sorted() {
		assert!(HTML_ELEMENTS.windows(2).all(|pair| pair[0] < pair[1]));
	}

	#[test]
	fn html() {
		let vocabulary = Vocabulary::html();
		for tag in &["div", "UL", "Button", "input", "h3", "form"] {
			assert!(vocabulary.contains(tag), "{}", tag);
		}
		for tag in &["", "blink", "div ", "<div>", "1x"] {
			assert!(!vocabulary.contains(tag), "{:?}", tag);
		}
	}

	#[test]
	fn custom_elements() {
		let vocabulary = Vocabulary::html();
		assert!(vocabulary.contains("dog-card"));
		assert!(vocabulary.contains("x-1.2_3"));
		assert!(!vocabulary.contains("-dog"));
		assert!(!vocabulary.contains("font-face"));
		assert!(!vocabulary.allow_custom_elements(false).contains("dog-card"));
	}

	#[test]
	fn foreign_namespaces_are_opt_in() {
		assert!(!Vocabulary::html().contains("svg"));
		assert!(!Vocabulary::html().contains("math"));
		let vocabulary = Vocabulary::html().with_tags(&["svg"]);
		assert!(vocabulary.contains("SVG"));
		assert!(vocabulary.contains("div"));
	}

	#[test]
	fn empty_with_extras() {
		let vocabulary = Vocabulary::empty().with_tags(&["Row", "column"]);
		assert!(vocabulary.contains("row"));
		assert!(vocabulary.contains("COLUMN"));
		assert!(!vocabulary.contains("div"));
		assert!(!vocabulary.contains("dog-card"));
	}
}
