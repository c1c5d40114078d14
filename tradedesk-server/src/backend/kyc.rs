use crate::backend::{BackendClient, BackendError, not_blank};
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use tracing::info;
use typed_builder::TypedBuilder;
use validator::{Validate, ValidationError, ValidationErrors};

pub const DEFAULT_CONFIRMATION: &str = "KYC documents submitted successfully.";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct KycImage {
	pub file_name: String,
	pub content_type: String,
	pub bytes: Vec<u8>,
}

/// Identity verification documents of a user.
#[derive(Clone, Debug, Validate, TypedBuilder)]
pub struct KycSubmission {
	#[builder(setter(into))]
	#[validate(custom = "not_blank")]
	pub full_name: String,
	#[builder(setter(into))]
	#[validate(custom = "not_blank")]
	pub city: String,
	#[builder(setter(into))]
	#[validate(custom = "not_blank")]
	pub country: String,
	#[builder(setter(into))]
	#[validate(custom = "not_blank")]
	pub id_number: String,
	#[builder(default, setter(strip_option))]
	#[validate(required(message = "Front image of the ID is required"))]
	pub front_image: Option<KycImage>,
	#[builder(default, setter(strip_option))]
	#[validate(required(message = "Back image of the ID is required"))]
	pub back_image: Option<KycImage>,
	#[builder(default, setter(strip_option))]
	#[validate(required(message = "Selfie with the ID is required"))]
	pub id_image: Option<KycImage>,
}

impl KycSubmission {
	fn into_form(self) -> Result<Form, BackendError> {
		Ok(Form::new()
			.text("fullName", self.full_name.trim().to_string())
			.text("city", self.city.trim().to_string())
			.text("country", self.country.trim().to_string())
			.text("idNumber", self.id_number.trim().to_string())
			.part("frontImage", image_part("front_image", self.front_image)?)
			.part("backImage", image_part("back_image", self.back_image)?)
			.part("idImage", image_part("id_image", self.id_image)?))
	}
}

fn image_part(field: &'static str, image: Option<KycImage>) -> Result<Part, BackendError> {
	let Some(image) = image else {
		let mut errors = ValidationErrors::new();
		errors.add(field, ValidationError::new("required"));
		return Err(errors.into());
	};

	Ok(Part::bytes(image.bytes)
		.file_name(image.file_name)
		.mime_str(&image.content_type)?)
}

impl BackendClient {
	/// Uploads the KYC documents as one multipart request and returns the backend's confirmation.
	pub async fn submit_kyc(&self, submission: KycSubmission) -> Result<String, BackendError> {
		submission.validate()?;
		let form = submission.into_form()?;

		let request = self.user_request(self.http_client.post(self.url("kyc/submit")).multipart(form))?;
		let response = self.send::<serde_json::Value>(request).await?;
		info!("Submitted KYC documents");

		Ok(response
			.message
			.unwrap_or_else(|| DEFAULT_CONFIRMATION.to_string()))
	}
}
