//! Timestamp (de)serialization for source records.
//!
//! Exports carry RFC 3339 timestamps, bare dates, and offset-less date-times side by side. All of
//! them are accepted, with either `T` or a space between date and time; offset-less values are
//! taken as UTC. Serialization always emits RFC 3339.

pub mod option;

use serde::{Deserialize, Deserializer, Serializer};
use time::{
	Date, OffsetDateTime, PrimitiveDateTime, format_description::well_known::Rfc3339,
	macros::format_description,
};

pub fn serialize<S>(value: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	let formatted = value.format(&Rfc3339).map_err(serde::ser::Error::custom)?;

	serializer.serialize_str(&formatted)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
where
	D: Deserializer<'de>,
{
	let raw = String::deserialize(deserializer)?;

	parse_lenient(&raw).ok_or_else(|| {
		serde::de::Error::custom(format!("Unrecognized timestamp {raw:?}."))
	})
}

/// Parses RFC 3339, `YYYY-MM-DDTHH:MM:SS[.fff]` (UTC assumed) or `YYYY-MM-DD` (UTC midnight).
/// A space may stand in for the `T` separator.
pub fn parse_lenient(raw: &str) -> Option<OffsetDateTime> {
	let raw = raw.trim();
	let spaced;
	let raw = match raw.as_bytes().get(10) {
		Some(b' ') => {
			spaced = format!("{}T{}", &raw[..10], raw[11..].trim_start());

			spaced.as_str()
		},
		_ => raw,
	};

	if let Ok(value) = OffsetDateTime::parse(raw, &Rfc3339) {
		return Some(value);
	}

	let naive = format_description!(
		"[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]"
	);

	if let Ok(value) = PrimitiveDateTime::parse(raw, naive) {
		return Some(value.assume_utc());
	}

	let date_only = format_description!("[year]-[month]-[day]");

	Date::parse(raw, date_only).ok().map(|date| date.midnight().assume_utc())
}
