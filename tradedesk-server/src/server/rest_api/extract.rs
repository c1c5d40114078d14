use crate::server::rest_api::error::ApiErrorResponse;
use axum::extract::{FromRequest, FromRequestParts};

/// [`axum::Json`] that rejects malformed bodies with an error envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiErrorResponse))]
pub struct Json<T>(pub T);

/// [`axum::extract::Path`] that rejects malformed path parameters with an error envelope.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiErrorResponse))]
pub struct Path<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiErrorResponse))]
pub struct Query<T>(pub T);
