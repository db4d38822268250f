use serde::{Deserialize as _, Deserializer, Serializer};
use time::OffsetDateTime;

pub fn serialize<S>(value: &Option<OffsetDateTime>, serializer: S) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	match value {
		Some(value) => crate::time_serde::serialize(value, serializer),
		None => serializer.serialize_none(),
	}
}

/// Blank strings read as absent, matching exports that write `""` for unset dates. Values that do
/// not parse are dropped with a warning so one malformed date never rejects the whole export.
pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error>
where
	D: Deserializer<'de>,
{
	let raw = Option::<String>::deserialize(deserializer)?;

	match raw {
		Some(value) if value.trim().is_empty() => Ok(None),
		Some(value) => {
			let parsed = crate::time_serde::parse_lenient(&value);

			if parsed.is_none() {
				tracing::warn!(value = %value, "Unrecognized timestamp. Treating it as absent.");
			}

			Ok(parsed)
		},
		None => Ok(None),
	}
}
