use crate::backend::{BackendClient, BackendError, not_blank};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
	pub id: String,
	pub email: String,
	#[serde(default)]
	pub name: Option<String>,
}

#[derive(Clone, Debug, Serialize, Validate)]
pub struct LoginRequest {
	#[validate(email(message = "Please enter a valid email address"))]
	pub email: String,
	#[validate(length(min = 1, message = "Password is required"))]
	pub password: String,
}

#[derive(Clone, Debug, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
	#[validate(custom = "not_blank")]
	pub name: String,
	#[validate(email(message = "Please enter a valid email address"))]
	pub email: String,
	#[validate(length(min = 8, message = "Password must be at least 8 characters"))]
	pub password: String,
	#[validate(must_match(other = "password", message = "Passwords do not match"))]
	#[serde(skip_serializing)]
	pub password_confirm: String,
}

#[derive(Clone, Debug, Deserialize)]
struct SignedIn {
	user: User,
	token: String,
}

impl BackendClient {
	pub async fn login(&self, request: &LoginRequest) -> Result<User, BackendError> {
		request.validate()?;

		let SignedIn { user, token } = self
			.send_for_data(self.http_client.post(self.url("auth/login")).json(request))
			.await?;
		self.session.update(|session| {
			session.user = Some(user.clone());
			session.token = Some(token);
		})?;
		info!(user_id = %user.id, "Signed in");

		Ok(user)
	}

	pub async fn register(&self, request: &RegistrationRequest) -> Result<User, BackendError> {
		request.validate()?;

		let SignedIn { user, token } = self
			.send_for_data(self.http_client.post(self.url("auth/register")).json(request))
			.await?;
		self.session.update(|session| {
			session.user = Some(user.clone());
			session.token = Some(token);
		})?;
		info!(user_id = %user.id, "Registered");

		Ok(user)
	}

	pub async fn admin_login(&self, request: &LoginRequest) -> Result<User, BackendError> {
		request.validate()?;

		let SignedIn { user, token } = self
			.send_for_data(self.http_client.post(self.url("admin/login")).json(request))
			.await?;
		self.session.update(|session| {
			session.is_admin = true;
			session.admin_token = Some(token);
		})?;
		info!(admin_id = %user.id, "Signed in as admin");

		Ok(user)
	}

	/// Forgets the stored session, the backend is not involved.
	pub fn logout(&self) -> Result<(), BackendError> {
		self.session.clear()?;
		info!("Signed out");
		Ok(())
	}
}
