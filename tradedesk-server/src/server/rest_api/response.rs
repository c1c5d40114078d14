use crate::backend::ApiResponse;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

impl<T: Serialize> IntoResponse for ApiResponse<T> {
	fn into_response(self) -> Response {
		Json(self).into_response()
	}
}

/// Response wrapper for HTTP Status Code 201 CREATED
pub struct Created<T>(pub T);

impl<T: IntoResponse> IntoResponse for Created<T> {
	fn into_response(self) -> Response {
		(StatusCode::CREATED, self.0).into_response()
	}
}
