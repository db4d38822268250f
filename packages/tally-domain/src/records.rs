//! Typed source records, deserialized from the normalized account export (camelCase keys).

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};
use time::OffsetDateTime;

use crate::{FieldValue, fields};

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SourceRecords {
	#[serde(default, alias = "account_summary", alias = "accountSummary")]
	pub accounts: Vec<AccountRecord>,
	#[serde(default)]
	pub statements: Vec<StatementRecord>,
	#[serde(default)]
	pub transactions: Vec<TransactionRecord>,
	#[serde(default)]
	pub payments: Vec<PaymentRecord>,
	#[serde(default)]
	pub agreement: Vec<AgreementSegment>,
	/// Uncut agreement text; segmented at build time and appended after `agreement`.
	#[serde(default, alias = "agreementText")]
	pub agreement_text: Option<String>,
}
impl SourceRecords {
	pub fn is_empty(&self) -> bool {
		self.accounts.is_empty()
			&& self.statements.is_empty()
			&& self.transactions.is_empty()
			&& self.payments.is_empty()
			&& self.agreement.is_empty()
			&& self.agreement_text.as_deref().is_none_or(|text| text.trim().is_empty())
	}
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRecord {
	pub account_id: String,
	#[serde(default)]
	pub account_status: Option<String>,
	#[serde(default)]
	pub product: Option<String>,
	#[serde(default)]
	pub account_type: Option<String>,
	#[serde(default)]
	pub current_balance: Option<f64>,
	#[serde(default)]
	pub outstanding_balance: Option<f64>,
	#[serde(default)]
	pub available_credit: Option<f64>,
	#[serde(default)]
	pub credit_limit: Option<f64>,
	#[serde(default)]
	pub apr: Option<f64>,
	#[serde(default)]
	pub purchase_apr: Option<f64>,
	#[serde(default, with = "crate::time_serde::option")]
	pub open_date: Option<OffsetDateTime>,
}
impl AccountRecord {
	pub fn fields(&self) -> BTreeMap<String, FieldValue> {
		let mut out = FieldMap::default();

		out.text(fields::ACCOUNT_ID, Some(&self.account_id));
		out.text(fields::ACCOUNT_STATUS, self.account_status.as_deref());
		out.text(fields::PRODUCT, self.product.as_deref());
		out.text(fields::ACCOUNT_TYPE, self.account_type.as_deref());
		out.number(fields::CURRENT_BALANCE, self.current_balance);
		out.number(fields::OUTSTANDING_BALANCE, self.outstanding_balance);
		out.number(fields::AVAILABLE_CREDIT, self.available_credit);
		out.number(fields::CREDIT_LIMIT, self.credit_limit);
		out.number(fields::APR, self.apr);
		out.number(fields::PURCHASE_APR, self.purchase_apr);
		out.timestamp(fields::OPEN_DATE, self.open_date);

		out.0
	}
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementRecord {
	pub statement_id: String,
	#[serde(default, with = "crate::time_serde::option")]
	pub opening_date_time: Option<OffsetDateTime>,
	#[serde(default, with = "crate::time_serde::option")]
	pub closing_date_time: Option<OffsetDateTime>,
	#[serde(default, with = "crate::time_serde::option")]
	pub due_date: Option<OffsetDateTime>,
	#[serde(default)]
	pub minimum_amount_due: Option<f64>,
	#[serde(default)]
	pub total_amount_due: Option<f64>,
	#[serde(default)]
	pub ending_balance: Option<f64>,
	#[serde(default)]
	pub interest_charged: Option<f64>,
}
impl StatementRecord {
	pub fn fields(&self) -> BTreeMap<String, FieldValue> {
		let mut out = FieldMap::default();

		out.text(fields::STATEMENT_ID, Some(&self.statement_id));
		out.timestamp(fields::OPENING_DATE_TIME, self.opening_date_time);
		out.timestamp(fields::CLOSING_DATE_TIME, self.closing_date_time);
		out.timestamp(fields::DUE_DATE, self.due_date);
		out.number(fields::MINIMUM_AMOUNT_DUE, self.minimum_amount_due);
		out.number(fields::TOTAL_AMOUNT_DUE, self.total_amount_due);
		out.number(fields::ENDING_BALANCE, self.ending_balance);
		out.number(fields::INTEREST_CHARGED, self.interest_charged);

		out.0
	}
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
	pub transaction_id: String,
	#[serde(default, with = "crate::time_serde::option")]
	pub transaction_date_time: Option<OffsetDateTime>,
	#[serde(default, with = "crate::time_serde::option")]
	pub posting_date_time: Option<OffsetDateTime>,
	/// Stored and rendered only. Never a canonical date.
	#[serde(default, with = "crate::time_serde::option")]
	pub auth_date_time: Option<OffsetDateTime>,
	#[serde(default)]
	pub transaction_type: Option<String>,
	#[serde(default)]
	pub display_transaction_type: Option<String>,
	#[serde(default, alias = "merchantCategory")]
	pub category: Option<String>,
	#[serde(default)]
	pub description: Option<String>,
	#[serde(default)]
	pub merchant_name: Option<String>,
	pub amount: f64,
	#[serde(default, deserialize_with = "indicator")]
	pub debit_credit_indicator: Option<String>,
	#[serde(default)]
	pub status: Option<String>,
	#[serde(default)]
	pub interest_flag: Option<bool>,
	#[serde(default)]
	pub running_balance: Option<f64>,
}
impl TransactionRecord {
	/// Explicit flag, or an interest type, or "interest" in the merchant name or description.
	pub fn is_interest(&self) -> bool {
		if self.interest_flag == Some(true) {
			return true;
		}

		[self.transaction_type.as_deref(), self.display_transaction_type.as_deref()]
			.into_iter()
			.flatten()
			.any(crate::classify::is_interest_type)
			|| [self.merchant_name.as_deref(), self.description.as_deref()]
				.into_iter()
				.flatten()
				.any(|text| text.to_lowercase().contains("interest"))
	}

	pub fn fields(&self) -> BTreeMap<String, FieldValue> {
		let mut out = FieldMap::default();

		out.text(fields::TRANSACTION_ID, Some(&self.transaction_id));
		out.timestamp(fields::TRANSACTION_DATE_TIME, self.transaction_date_time);
		out.timestamp(fields::POSTING_DATE_TIME, self.posting_date_time);
		out.timestamp(fields::AUTH_DATE_TIME, self.auth_date_time);
		out.text(fields::TRANSACTION_TYPE, self.transaction_type.as_deref());
		out.text(fields::DISPLAY_TRANSACTION_TYPE, self.display_transaction_type.as_deref());
		out.text(fields::CATEGORY, self.category.as_deref());
		out.text(fields::DESCRIPTION, self.description.as_deref());
		out.text(fields::MERCHANT_NAME, self.merchant_name.as_deref());
		out.number(fields::AMOUNT, Some(self.amount));
		out.text(fields::DEBIT_CREDIT_INDICATOR, self.debit_credit_indicator.as_deref());
		out.text(fields::STATUS, self.status.as_deref());
		out.number(fields::RUNNING_BALANCE, self.running_balance);
		out.0.insert(fields::INTEREST_FLAG.to_string(), FieldValue::Bool(self.is_interest()));

		out.0
	}
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
	#[serde(default)]
	pub payment_id: Option<String>,
	#[serde(default)]
	pub scheduled_payment_id: Option<String>,
	#[serde(default, with = "crate::time_serde::option")]
	pub payment_date_time: Option<OffsetDateTime>,
	#[serde(default, with = "crate::time_serde::option")]
	pub scheduled_payment_date_time: Option<OffsetDateTime>,
	/// Stored and rendered only. Never a canonical date.
	#[serde(default, with = "crate::time_serde::option")]
	pub auth_date_time: Option<OffsetDateTime>,
	#[serde(default)]
	pub amount: Option<f64>,
	#[serde(default, alias = "paymentStatus")]
	pub status: Option<String>,
}
impl PaymentRecord {
	pub fn fields(&self) -> BTreeMap<String, FieldValue> {
		let mut out = FieldMap::default();

		out.text(fields::PAYMENT_ID, self.payment_id.as_deref());
		out.text(fields::SCHEDULED_PAYMENT_ID, self.scheduled_payment_id.as_deref());
		out.timestamp(fields::PAYMENT_DATE_TIME, self.payment_date_time);
		out.timestamp(fields::SCHEDULED_PAYMENT_DATE_TIME, self.scheduled_payment_date_time);
		out.timestamp(fields::AUTH_DATE_TIME, self.auth_date_time);
		out.number(fields::AMOUNT, self.amount);
		out.text(fields::STATUS, self.status.as_deref());

		out.0
	}
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgreementSegment {
	pub text: String,
	#[serde(default)]
	pub page: Option<u32>,
}
impl AgreementSegment {
	pub fn fields(&self, segment: usize) -> BTreeMap<String, FieldValue> {
		let mut out = FieldMap::default();

		out.number(fields::SEGMENT, Some(segment as f64));
		out.number(fields::PAGE, self.page.map(f64::from));
		out.text(fields::TEXT, Some(&self.text));

		out.0
	}
}

#[derive(Default)]
struct FieldMap(BTreeMap<String, FieldValue>);
impl FieldMap {
	fn text(&mut self, name: &str, value: Option<&str>) {
		if let Some(value) = value.map(str::trim).filter(|value| !value.is_empty()) {
			self.0.insert(name.to_string(), FieldValue::Text(value.to_string()));
		}
	}

	fn number(&mut self, name: &str, value: Option<f64>) {
		if let Some(value) = value.filter(|value| value.is_finite()) {
			self.0.insert(name.to_string(), FieldValue::Number(value));
		}
	}

	fn timestamp(&mut self, name: &str, value: Option<OffsetDateTime>) {
		if let Some(value) = value {
			self.0.insert(name.to_string(), FieldValue::Timestamp(value));
		}
	}
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawIndicator {
	Text(String),
	Number(i64),
}

// Exports write the indicator as "1"/"0", 1/0, or "D"/"C".
fn indicator<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
	D: Deserializer<'de>,
{
	let raw = Option::<RawIndicator>::deserialize(deserializer)?;

	Ok(raw.map(|raw| match raw {
		RawIndicator::Text(text) => text.trim().to_string(),
		RawIndicator::Number(number) => number.to_string(),
	}))
}
