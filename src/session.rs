//! Contracts for the collaborators an application typically feeds into a [`RenderLoop`](`crate::RenderLoop`):
//! an authentication API and a persistent token store.
//!
//! Neither is used by the render loop itself.
//! Application code awaits the API and hands the results to [`Dispatch::update_state`](`crate::Dispatch::update_state`).

use futures::future::LocalBoxFuture;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cell::RefCell;
use thiserror::Error;

/// The [`TokenStore`] key the session token is persisted under.
pub const ACCESS_TOKEN_KEY: &str = "access_token";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
	pub email: String,
	pub password: String,
}

/// A user as returned by the API. Fields not known here are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
	#[serde(default)]
	pub name: String,
	#[serde(default)]
	pub email: String,
	/// Only present in login responses.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub access_token: Option<String>,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
	/// A non-2xx response.
	#[error("HTTP error (status {0})")]
	Status(u16),
	#[error("network error: {0}")]
	Network(String),
}

impl AuthError {
	/// The HTTP status, if the server responded at all.
	#[must_use]
	pub fn status(&self) -> Option<u16> {
		match self {
			AuthError::Status(status) => Some(*status),
			AuthError::Network(_) => None,
		}
	}
}

/// The authentication endpoints, as an opaque async capability.
pub trait AuthApi {
	fn login(&self, credentials: &Credentials) -> LocalBoxFuture<'static, Result<UserRecord, AuthError>>;

	fn get_user(&self, token: &str) -> LocalBoxFuture<'static, Result<UserRecord, AuthError>>;
}

/// A simple persistent key-value store for session tokens.
pub trait TokenStore {
	fn get(&self, key: &str) -> Option<String>;
	fn set(&self, key: &str, value: &str);
	fn remove(&self, key: &str);
}

/// A [`TokenStore`] that forgets everything when dropped.
#[derive(Debug, Default)]
pub struct MemoryTokenStore(RefCell<HashMap<String, String>>);

impl MemoryTokenStore {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}
}

impl TokenStore for MemoryTokenStore {
	fn get(&self, key: &str) -> Option<String> {
		self.0.borrow().get(key).cloned()
	}

	fn set(&self, key: &str, value: &str) {
		self.0.borrow_mut().insert(key.to_owned(), value.to_owned());
	}

	fn remove(&self, key: &str) {
		self.0.borrow_mut().remove(key);
	}
}
