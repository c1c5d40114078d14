use crate::session::{SessionError, SessionStore};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use thiserror::Error;
use tracing::{debug, warn};
use validator::{ValidationError, ValidationErrors};

pub mod admin;
pub mod auth;
pub mod kyc;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiResponse<T> {
	pub success: bool,
	pub data: Option<T>,
	pub message: Option<String>,
}

impl<T> ApiResponse<T> {
	pub fn success(data: T) -> Self {
		Self {
			success: true,
			data: Some(data),
			message: None,
		}
	}

	pub fn failure(message: impl Into<String>) -> Self {
		Self {
			success: false,
			data: None,
			message: Some(message.into()),
		}
	}

	#[must_use]
	pub fn with_message(self, message: impl Into<String>) -> Self {
		Self {
			message: Some(message.into()),
			..self
		}
	}
}

#[derive(Error, Debug)]
pub enum BackendError {
	#[error("Invalid input: {0}")]
	Invalid(#[from] ValidationErrors),
	#[error("{message}")]
	Rejected { status: StatusCode, message: String },
	#[error("Response contained no data.")]
	MissingData,
	#[error("Not signed in.")]
	NotAuthenticated,
	#[error("Request failed: {0}")]
	Request(#[from] reqwest::Error),
	#[error("Failed to store session: {0}")]
	Session(#[from] SessionError),
}

/// Client for the platform's REST backend, every endpoint answers with an [`ApiResponse`] envelope.
///
/// Input is validated before a request is made.
#[derive(Clone)]
pub struct BackendClient {
	http_client: reqwest::Client,
	base_url: String,
	session: SessionStore,
}

impl BackendClient {
	pub fn new(base_url: impl Into<String>, session: SessionStore) -> Result<Self, BackendError> {
		let http_client = reqwest::Client::builder().build()?;
		let base_url = base_url.into().trim_end_matches('/').to_string();

		Ok(Self {
			http_client,
			base_url,
			session,
		})
	}

	pub fn session(&self) -> &SessionStore {
		&self.session
	}

	fn url(&self, path: &str) -> String {
		format!("{}/{}", self.base_url, path.trim_start_matches('/'))
	}

	fn user_request(&self, request: RequestBuilder) -> Result<RequestBuilder, BackendError> {
		let token = self.session.snapshot().token.ok_or(BackendError::NotAuthenticated)?;
		Ok(request.bearer_auth(token))
	}

	fn admin_request(&self, request: RequestBuilder) -> Result<RequestBuilder, BackendError> {
		let token = self
			.session
			.snapshot()
			.admin_token
			.ok_or(BackendError::NotAuthenticated)?;
		Ok(request.bearer_auth(token))
	}

	/// Sends a request and unpacks the response envelope.
	///
	/// Non-success responses become [`BackendError::Rejected`] with the server's message if one can be found.
	async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<ApiResponse<T>, BackendError> {
		let response = request.send().await?;
		let status = response.status();
		let body = response.bytes().await?;
		debug!(%status, length = body.len(), "Received backend response");

		if status.is_success() {
			if let Ok(envelope) = serde_json::from_slice::<ApiResponse<T>>(&body) {
				if envelope.success {
					return Ok(envelope);
				}
			}
		}

		let message = error_message(&body).unwrap_or_else(|| format!("Request failed with status {status}."));
		warn!(%status, %message, "Backend rejected request");
		Err(BackendError::Rejected { status, message })
	}

	async fn send_for_data<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, BackendError> {
		self.send(request).await?.data.ok_or(BackendError::MissingData)
	}
}

/// Best-effort extraction of a human readable error message from a response body.
fn error_message(body: &[u8]) -> Option<String> {
	let json = serde_json::from_slice::<serde_json::Value>(body).ok()?;
	["message", "error"]
		.into_iter()
		.find_map(|key| json.get(key)?.as_str())
		.filter(|message| !message.trim().is_empty())
		.map(ToString::to_string)
}

/// Rejects strings that are empty or only contain whitespace.
pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
	if value.trim().is_empty() {
		let mut error = ValidationError::new("blank");
		error.message = Some(Cow::from("must not be blank"));
		return Err(error);
	}
	Ok(())
}
