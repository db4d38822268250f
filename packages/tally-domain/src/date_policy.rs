//! Canonical dates per record kind.
//!
//! A chunk's `timestamp` and `period` come from the first populated field in its policy's
//! `order`. `authDateTime` is stored and rendered on transactions and payments but appears in no
//! `order`: it never assigns a period, never picks "latest", and never moves a row into a window.

use std::collections::BTreeMap;

use time::OffsetDateTime;

use crate::{ChunkKind, FieldValue, fields};

#[derive(Clone, Copy, Debug)]
pub struct DatePolicy {
	pub kind: ChunkKind,
	pub order: &'static [&'static str],
	pub excluded: &'static [&'static str],
}
impl DatePolicy {
	pub fn canonical(&self, values: &BTreeMap<String, FieldValue>) -> Option<OffsetDateTime> {
		self.order.iter().find_map(|name| values.get(*name).and_then(FieldValue::as_timestamp))
	}

	pub fn is_excluded(&self, name: &str) -> bool {
		self.excluded.contains(&name)
	}
}

pub const STATEMENT: DatePolicy = DatePolicy {
	kind: ChunkKind::Statement,
	order: &[fields::CLOSING_DATE_TIME, fields::OPENING_DATE_TIME, fields::DUE_DATE],
	excluded: &[],
};
pub const TRANSACTION: DatePolicy = DatePolicy {
	kind: ChunkKind::Transaction,
	order: &[fields::TRANSACTION_DATE_TIME, fields::POSTING_DATE_TIME],
	excluded: &[fields::AUTH_DATE_TIME],
};
pub const PAYMENT: DatePolicy = DatePolicy {
	kind: ChunkKind::Payment,
	order: &[fields::PAYMENT_DATE_TIME, fields::SCHEDULED_PAYMENT_DATE_TIME],
	excluded: &[fields::AUTH_DATE_TIME],
};

/// Kinds without a policy (accounts, agreement text, aggregates) carry no record date.
pub fn for_kind(kind: ChunkKind) -> Option<&'static DatePolicy> {
	match kind {
		ChunkKind::Statement => Some(&STATEMENT),
		ChunkKind::Transaction => Some(&TRANSACTION),
		ChunkKind::Payment => Some(&PAYMENT),
		ChunkKind::Account | ChunkKind::Aggregate | ChunkKind::AgreementText => None,
	}
}
