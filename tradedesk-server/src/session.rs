use crate::backend::auth::User;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
	#[serde(default)]
	pub user: Option<User>,
	#[serde(default)]
	pub token: Option<String>,
	#[serde(rename = "isAdmin", default)]
	pub is_admin: bool,
	#[serde(rename = "adminToken", default)]
	pub admin_token: Option<String>,
}

/// Sign-in state persisted as a small JSON document, written back after every change.
#[derive(Clone)]
pub struct SessionStore {
	path: Option<Arc<Path>>,
	session: Arc<Mutex<Session>>,
}

impl SessionStore {
	/// Loads the session stored at `path`, a missing file is an empty session.
	pub fn load(path: impl Into<PathBuf>) -> Result<Self, SessionError> {
		let path = path.into();
		let session = match std::fs::read_to_string(&path) {
			Ok(json) => serde_json::from_str(&json)?,
			Err(error) if error.kind() == ErrorKind::NotFound => Session::default(),
			Err(error) => return Err(error.into()),
		};
		debug!(path = %path.display(), signed_in = session.token.is_some(), "Loaded session");

		Ok(Self {
			path: Some(Arc::from(path)),
			session: Arc::new(Mutex::new(session)),
		})
	}

	/// A session that is never written to disk.
	pub fn in_memory() -> Self {
		Self {
			path: None,
			session: Default::default(),
		}
	}

	pub fn snapshot(&self) -> Session {
		self.session.lock().clone()
	}

	/// Changes the session and writes it back.
	///
	/// The in-memory session only changes once the write succeeded.
	pub fn update<R>(&self, change: impl FnOnce(&mut Session) -> R) -> Result<R, SessionError> {
		let mut session = self.session.lock();
		let mut changed = session.clone();
		let result = change(&mut changed);
		self.save(&changed)?;
		*session = changed;

		Ok(result)
	}

	/// Forgets everything and removes the session file.
	pub fn clear(&self) -> Result<(), SessionError> {
		let mut session = self.session.lock();

		if let Some(path) = &self.path {
			match std::fs::remove_file(path) {
				Err(error) if error.kind() != ErrorKind::NotFound => return Err(error.into()),
				_ => {}
			}
		}
		*session = Session::default();
		Ok(())
	}

	fn save(&self, session: &Session) -> Result<(), SessionError> {
		let Some(path) = &self.path else {
			return Ok(());
		};

		let json = serde_json::to_string_pretty(session)?;
		std::fs::write(path, json)?;
		Ok(())
	}
}

#[derive(Error, Debug)]
pub enum SessionError {
	#[error("Failed to access session file: {0}")]
	Io(#[from] std::io::Error),
	#[error("Malformed session file: {0}")]
	Malformed(#[from] serde_json::Error),
}
