use crate::backend::ApiResponse;
use crate::database::error::DatabaseError;
use crate::support::error::SupportError;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

/// Type-erased error response, rendered as an unsuccessful envelope.
#[derive(Debug)]
pub struct ApiErrorResponse {
	pub status: StatusCode,
	pub message: String,
}

impl ApiErrorResponse {
	pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
		Self {
			status,
			message: message.into(),
		}
	}

	pub fn unauthorized(message: impl Into<String>) -> Self {
		Self::new(StatusCode::UNAUTHORIZED, message)
	}
}

impl IntoResponse for ApiErrorResponse {
	fn into_response(self) -> Response {
		(self.status, ApiResponse::<()>::failure(self.message)).into_response()
	}
}

impl From<SupportError> for ApiErrorResponse {
	fn from(error: SupportError) -> Self {
		use SupportError::*;
		let status = match &error {
			EmptyMessage | NoRoomSelected | InvalidStatusTransition { .. } => StatusCode::BAD_REQUEST,
			RoomNotFound(_) | Store(DatabaseError::NotFound(_)) => StatusCode::NOT_FOUND,
			RoomClosed(_) => StatusCode::CONFLICT,
			Store(_) => {
				error!(%error, "Chat store request failed");
				return Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Chat store request failed.");
			}
		};

		Self::new(status, error.to_string())
	}
}

impl From<DatabaseError> for ApiErrorResponse {
	fn from(error: DatabaseError) -> Self {
		SupportError::from(error).into()
	}
}

impl From<JsonRejection> for ApiErrorResponse {
	fn from(rejection: JsonRejection) -> Self {
		Self::new(rejection.status(), rejection.body_text())
	}
}

impl From<PathRejection> for ApiErrorResponse {
	fn from(rejection: PathRejection) -> Self {
		Self::new(rejection.status(), rejection.body_text())
	}
}

impl From<QueryRejection> for ApiErrorResponse {
	fn from(rejection: QueryRejection) -> Self {
		Self::new(rejection.status(), rejection.body_text())
	}
}
