use crate::server::rest_api::error::ApiErrorResponse;
use crate::support::widget::ChatUser;
use crate::types::uuid::Uuid;
use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use std::str::FromStr;
use tracing::debug;

// Forwarded by the authenticating gateway in front of this service.
pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_EMAIL_HEADER: &str = "x-user-email";
pub const ADMIN_ID_HEADER: &str = "x-admin-id";

pub struct UserIdentity(pub ChatUser);

pub struct AdminIdentity(pub Uuid);

/// Either kind of caller, admins take precedence.
pub enum Viewer {
	Admin(Uuid),
	User(ChatUser),
}

impl<S: Send + Sync> FromRequestParts<S> for UserIdentity {
	type Rejection = ApiErrorResponse;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		user(&parts.headers)
			.map(Self)
			.ok_or_else(|| ApiErrorResponse::unauthorized("User identity missing."))
	}
}

impl<S: Send + Sync> FromRequestParts<S> for AdminIdentity {
	type Rejection = ApiErrorResponse;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		admin(&parts.headers)
			.map(Self)
			.ok_or_else(|| ApiErrorResponse::unauthorized("Admin identity missing."))
	}
}

impl<S: Send + Sync> FromRequestParts<S> for Viewer {
	type Rejection = ApiErrorResponse;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		admin(&parts.headers)
			.map(Viewer::Admin)
			.or_else(|| user(&parts.headers).map(Viewer::User))
			.ok_or_else(|| ApiErrorResponse::unauthorized("Identity missing."))
	}
}

fn user(headers: &HeaderMap) -> Option<ChatUser> {
	let id = uuid_header(headers, USER_ID_HEADER)?;
	let email = header(headers, USER_EMAIL_HEADER)?;

	Some(ChatUser {
		id,
		email: email.to_string(),
	})
}

fn admin(headers: &HeaderMap) -> Option<Uuid> {
	uuid_header(headers, ADMIN_ID_HEADER)
}

fn uuid_header(headers: &HeaderMap, name: &str) -> Option<Uuid> {
	let value = header(headers, name)?;
	Uuid::from_str(value)
		.inspect_err(|error| debug!(%error, header = name, "Malformed identity header"))
		.ok()
}

fn header<'headers>(headers: &'headers HeaderMap, name: &str) -> Option<&'headers str> {
	headers
		.get(name)?
		.to_str()
		.ok()
		.map(str::trim)
		.filter(|value| !value.is_empty())
}
