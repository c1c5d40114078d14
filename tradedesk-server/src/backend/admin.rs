use crate::backend::{BackendClient, BackendError, not_blank};
use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tracing::info;
use validator::{Validate, ValidationError};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalStatus {
	Pending,
	Approved,
	Rejected,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Withdrawal {
	pub id: String,
	pub user_id: String,
	pub amount: BigDecimal,
	pub currency: String,
	pub status: WithdrawalStatus,
	#[serde(default)]
	pub reason: Option<String>,
}

#[derive(Clone, Debug, Serialize, Validate)]
pub struct WithdrawalRejection {
	#[validate(custom = "not_blank")]
	pub reason: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VipTier {
	pub id: String,
	pub name: String,
	pub min_deposit: BigDecimal,
	pub min_trading_volume: BigDecimal,
	#[serde(default)]
	pub benefits: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewVipTier {
	#[validate(custom = "not_blank")]
	pub name: String,
	#[validate(custom = "non_negative")]
	pub min_deposit: BigDecimal,
	#[validate(custom = "non_negative")]
	pub min_trading_volume: BigDecimal,
	pub benefits: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MassRecipient {
	pub user_id: String,
	pub amount: BigDecimal,
}

/// Credits or debits many user balances at once.
#[derive(Clone, Debug, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MassTransfer {
	#[validate(
		length(min = 1, message = "At least one recipient is required"),
		custom = "positive_amounts"
	)]
	pub recipients: Vec<MassRecipient>,
	#[validate(custom = "not_blank")]
	pub currency: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub note: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MassTransferSummary {
	#[serde(default)]
	pub processed: u64,
	#[serde(default)]
	pub failed: Vec<String>,
}

fn non_negative(amount: &BigDecimal) -> Result<(), ValidationError> {
	if amount < &BigDecimal::zero() {
		let mut error = ValidationError::new("negative");
		error.message = Some(Cow::from("must not be negative"));
		return Err(error);
	}
	Ok(())
}

fn positive_amounts(recipients: &[MassRecipient]) -> Result<(), ValidationError> {
	if recipients.iter().any(|recipient| recipient.amount <= BigDecimal::zero()) {
		let mut error = ValidationError::new("not_positive");
		error.message = Some(Cow::from("every amount must be positive"));
		return Err(error);
	}
	Ok(())
}

impl BackendClient {
	pub async fn list_withdrawals(&self) -> Result<Vec<Withdrawal>, BackendError> {
		let request = self.admin_request(self.http_client.get(self.url("admin/withdrawals")))?;
		self.send_for_data(request).await
	}

	pub async fn approve_withdrawal(&self, withdrawal_id: &str) -> Result<Withdrawal, BackendError> {
		let request = self.admin_request(
			self.http_client
				.post(self.url(&format!("admin/withdrawals/{withdrawal_id}/approve"))),
		)?;
		let withdrawal = self.send_for_data(request).await?;
		info!(withdrawal_id, "Approved withdrawal");

		Ok(withdrawal)
	}

	/// Rejects a withdrawal, a reason is mandatory.
	pub async fn reject_withdrawal(&self, withdrawal_id: &str, reason: &str) -> Result<Withdrawal, BackendError> {
		let rejection = WithdrawalRejection {
			reason: reason.trim().to_string(),
		};
		rejection.validate()?;

		let request = self.admin_request(
			self.http_client
				.post(self.url(&format!("admin/withdrawals/{withdrawal_id}/reject")))
				.json(&rejection),
		)?;
		let withdrawal = self.send_for_data(request).await?;
		info!(withdrawal_id, "Rejected withdrawal");

		Ok(withdrawal)
	}

	pub async fn list_vip_tiers(&self) -> Result<Vec<VipTier>, BackendError> {
		let request = self.admin_request(self.http_client.get(self.url("admin/vip-tiers")))?;
		self.send_for_data(request).await
	}

	pub async fn create_vip_tier(&self, tier: &NewVipTier) -> Result<VipTier, BackendError> {
		tier.validate()?;

		let request = self.admin_request(self.http_client.post(self.url("admin/vip-tiers")).json(tier))?;
		self.send_for_data(request).await
	}

	pub async fn mass_deposit(&self, transfer: &MassTransfer) -> Result<MassTransferSummary, BackendError> {
		self.mass_transfer("admin/mass-deposit", transfer).await
	}

	pub async fn mass_withdrawal(&self, transfer: &MassTransfer) -> Result<MassTransferSummary, BackendError> {
		self.mass_transfer("admin/mass-withdrawal", transfer).await
	}

	async fn mass_transfer(&self, path: &str, transfer: &MassTransfer) -> Result<MassTransferSummary, BackendError> {
		transfer.validate()?;

		let request = self.admin_request(self.http_client.post(self.url(path)).json(transfer))?;
		let summary: MassTransferSummary = self.send_for_data(request).await?;
		info!(
			path,
			processed = summary.processed,
			failed = summary.failed.len(),
			"Executed mass transfer"
		);

		Ok(summary)
	}
}
