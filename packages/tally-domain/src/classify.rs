//! Transaction classification shared by aggregation and fact resolution.

use crate::{Chunk, ChunkKind, fields};

/// Transaction types that never count as spend.
pub const NON_SPEND_TYPES: [&str; 5] = ["payment", "refund", "credit", "interest", "fee reversal"];

const DEBIT_INDICATORS: [&str; 4] = ["1", "d", "dr", "debit"];

pub fn is_interest_type(raw: &str) -> bool {
	let normalized = normalize_type(raw);

	normalized.contains("interest")
}

/// Interest-flagged transactions, falling back to the type fields when the flag is absent.
pub fn is_interest_transaction(chunk: &Chunk) -> bool {
	if chunk.kind != ChunkKind::Transaction {
		return false;
	}
	if chunk.flag(fields::INTEREST_FLAG) == Some(true) {
		return true;
	}

	[fields::TRANSACTION_TYPE, fields::DISPLAY_TRANSACTION_TYPE, fields::CATEGORY]
		.into_iter()
		.filter_map(|name| chunk.text_field(name))
		.any(is_interest_type)
		|| [fields::MERCHANT_NAME, fields::DESCRIPTION]
			.into_iter()
			.filter_map(|name| chunk.text_field(name))
			.any(|text| text.to_lowercase().contains("interest"))
}

/// True when no status is recorded or the status reads as posted.
pub fn is_posted(chunk: &Chunk) -> bool {
	chunk.text_field(fields::STATUS).is_none_or(|status| status.trim().eq_ignore_ascii_case("posted"))
}

/// A missing indicator counts as a debit.
pub fn is_debit(chunk: &Chunk) -> bool {
	chunk.text_field(fields::DEBIT_CREDIT_INDICATOR).is_none_or(|raw| {
		let raw = raw.trim().to_ascii_lowercase();

		DEBIT_INDICATORS.contains(&raw.as_str())
	})
}

/// Debit transactions that are not payments, refunds, credits, interest or fee reversals.
pub fn is_spend_transaction(chunk: &Chunk) -> bool {
	if chunk.kind != ChunkKind::Transaction || !is_debit(chunk) || is_interest_transaction(chunk) {
		return false;
	}

	let spend_type = chunk
		.text_field(fields::DISPLAY_TRANSACTION_TYPE)
		.or_else(|| chunk.text_field(fields::TRANSACTION_TYPE))
		.map(normalize_type);
	let category = chunk.text_field(fields::CATEGORY).map(normalize_type);

	[spend_type, category]
		.into_iter()
		.flatten()
		.all(|value| !NON_SPEND_TYPES.contains(&value.as_str()))
}

fn normalize_type(raw: &str) -> String {
	raw.trim().to_lowercase().replace(['_', '-'], " ")
}
