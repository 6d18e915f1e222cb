//! Application state and its only mutation path: merging a patch.

use core::{convert::TryFrom, iter::FromIterator};
use hashbrown::HashMap;
use serde_json::{Map, Value};

/// State that a [`RenderLoop`](`crate::RenderLoop`) can own.
///
/// `merge` must be a shallow overwrite:
/// Every key present in `patch` replaces the current value as a whole, every other key stays untouched.
///
/// Typed states usually pair a `struct` with a patch of [`Option`]al fields:
///
/// ```
/// use rebuild_dom::Merge;
///
/// #[derive(Default)]
/// struct Session {
/// 	user: Option<String>,
/// 	is_logged_in: bool,
/// }
///
/// #[derive(Default)]
/// struct SessionPatch {
/// 	user: Option<Option<String>>,
/// 	is_logged_in: Option<bool>,
/// }
///
/// impl Merge for Session {
/// 	type Patch = SessionPatch;
///
/// 	fn merge(&mut self, patch: SessionPatch) {
/// 		if let Some(user) = patch.user {
/// 			self.user = user;
/// 		}
/// 		if let Some(is_logged_in) = patch.is_logged_in {
/// 			self.is_logged_in = is_logged_in;
/// 		}
/// 	}
/// }
///
/// let mut session = Session::default();
/// session.merge(SessionPatch { is_logged_in: Some(true), ..SessionPatch::default() });
/// assert!(session.is_logged_in);
/// assert_eq!(session.user, None);
/// ```
pub trait Merge {
	type Patch;

	fn merge(&mut self, patch: Self::Patch);
}

/// A dynamic state record: string keys to JSON values.
///
/// A [`Record`] is also its own patch type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record(HashMap<String, Value>);

impl Record {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Builder-style insertion, for writing patches inline.
	#[must_use]
	pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.0.insert(key.into(), value.into());
		self
	}

	#[must_use]
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.0.get(key)
	}

	/// Like [`Record::get`], but treats JSON `null` as missing.
	#[must_use]
	pub fn get_present(&self, key: &str) -> Option<&Value> {
		self.get(key).filter(|value| !value.is_null())
	}

	#[must_use]
	pub fn contains_key(&self, key: &str) -> bool {
		self.0.contains_key(key)
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.0.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.0.keys().map(String::as_str)
	}

	/// Reads `key` as `T`. Missing keys and mismatching shapes both yield [`None`].
	#[must_use]
	pub fn get_as<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
		self.get(key).and_then(|value| T::deserialize(value).ok())
	}
}

impl Merge for Record {
	type Patch = Record;

	fn merge(&mut self, patch: Record) {
		self.0.extend(patch.0)
	}
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
	}
}

impl From<Map<String, Value>> for Record {
	fn from(map: Map<String, Value>) -> Self {
		Self(map.into_iter().collect())
	}
}

/// Only JSON objects convert. The rejected value is returned as error.
impl TryFrom<Value> for Record {
	type Error = Value;

	fn try_from(value: Value) -> Result<Self, Self::Error> {
		match value {
			Value::Object(map) => Ok(map.into()),
			other => Err(other),
		}
	}
}
