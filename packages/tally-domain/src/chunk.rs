use std::{collections::BTreeMap, fmt};

use serde::{Serialize, Serializer};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::Period;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ChunkId(pub u32);
impl fmt::Display for ChunkId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChunkKind {
	Account,
	Statement,
	Transaction,
	Payment,
	Aggregate,
	AgreementText,
}
impl ChunkKind {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Account => "ACCOUNT",
			Self::Statement => "STATEMENT",
			Self::Transaction => "TRANSACTION",
			Self::Payment => "PAYMENT",
			Self::Aggregate => "AGGREGATE",
			Self::AgreementText => "AGREEMENT_TEXT",
		}
	}
}

impl fmt::Display for ChunkKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
	Text(String),
	Number(f64),
	Bool(bool),
	Timestamp(OffsetDateTime),
}
impl FieldValue {
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::Text(value) => Some(value),
			_ => None,
		}
	}

	pub fn as_f64(&self) -> Option<f64> {
		match self {
			Self::Number(value) => Some(*value),
			_ => None,
		}
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Self::Bool(value) => Some(*value),
			_ => None,
		}
	}

	pub fn as_timestamp(&self) -> Option<OffsetDateTime> {
		match self {
			Self::Timestamp(value) => Some(*value),
			_ => None,
		}
	}

	/// The `value` half of a rendered `name=value` pair.
	pub fn render(&self) -> String {
		match self {
			Self::Text(value) => value.clone(),
			Self::Number(value) => render_number(*value),
			Self::Bool(value) => value.to_string(),
			Self::Timestamp(value) => value.format(&Rfc3339).unwrap_or_else(|_| value.to_string()),
		}
	}
}

impl Serialize for FieldValue {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		match self {
			Self::Text(value) => serializer.serialize_str(value),
			Self::Number(value) => serializer.serialize_f64(*value),
			Self::Bool(value) => serializer.serialize_bool(*value),
			Self::Timestamp(value) => crate::time_serde::serialize(value, serializer),
		}
	}
}

impl From<&str> for FieldValue {
	fn from(value: &str) -> Self {
		Self::Text(value.to_string())
	}
}

impl From<String> for FieldValue {
	fn from(value: String) -> Self {
		Self::Text(value)
	}
}

impl From<f64> for FieldValue {
	fn from(value: f64) -> Self {
		Self::Number(value)
	}
}

impl From<bool> for FieldValue {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl From<OffsetDateTime> for FieldValue {
	fn from(value: OffsetDateTime) -> Self {
		Self::Timestamp(value)
	}
}

/// One immutable evidence unit.
///
/// `text` renders every entry of `fields` as `name=value`, prefixed by the kind, so both indexes
/// can match a chunk by field name or by value.
#[derive(Clone, Debug, Serialize)]
pub struct Chunk {
	pub id: ChunkId,
	pub kind: ChunkKind,
	pub period: Option<Period>,
	#[serde(with = "crate::time_serde::option")]
	pub timestamp: Option<OffsetDateTime>,
	pub text: String,
	pub fields: BTreeMap<String, FieldValue>,
}
impl Chunk {
	pub fn new(
		id: ChunkId,
		kind: ChunkKind,
		period: Option<Period>,
		timestamp: Option<OffsetDateTime>,
		fields: BTreeMap<String, FieldValue>,
	) -> Self {
		let text = render_text(kind, &fields);

		Self { id, kind, period, timestamp, text, fields }
	}

	pub fn field(&self, name: &str) -> Option<&FieldValue> {
		self.fields.get(name)
	}

	pub fn number(&self, name: &str) -> Option<f64> {
		self.field(name).and_then(FieldValue::as_f64)
	}

	pub fn text_field(&self, name: &str) -> Option<&str> {
		self.field(name).and_then(FieldValue::as_str)
	}

	pub fn flag(&self, name: &str) -> Option<bool> {
		self.field(name).and_then(FieldValue::as_bool)
	}

	pub fn timestamp_field(&self, name: &str) -> Option<OffsetDateTime> {
		self.field(name).and_then(FieldValue::as_timestamp)
	}
}

pub fn render_text(kind: ChunkKind, fields: &BTreeMap<String, FieldValue>) -> String {
	let mut text = kind.as_str().to_string();

	for (name, value) in fields {
		text.push(' ');
		text.push_str(name);
		text.push('=');
		text.push_str(&value.render());
	}

	text
}

fn render_number(value: f64) -> String {
	if value.fract() == 0.0 && value.abs() < 1e15 {
		format!("{value:.0}")
	} else {
		format!("{value:.2}")
	}
}
