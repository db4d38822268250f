use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::{Date, Month, OffsetDateTime, UtcOffset};

use crate::{Error, Result};

/// A calendar month, the grouping key for aggregates and resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period {
	year: i32,
	month: u8,
}
impl Period {
	pub fn new(year: i32, month: u8) -> Result<Self> {
		if !(1..=12).contains(&month) {
			return Err(Error::InvalidPeriod { value: format!("{year:04}-{month:02}") });
		}

		Ok(Self { year, month })
	}

	/// The UTC month a timestamp falls into.
	pub fn containing(at: OffsetDateTime) -> Self {
		let at = at.to_offset(UtcOffset::UTC);

		Self { year: at.year(), month: at.month() as u8 }
	}

	pub fn year(self) -> i32 {
		self.year
	}

	pub fn month(self) -> u8 {
		self.month
	}

	pub fn start(self) -> OffsetDateTime {
		self.first_day().midnight().assume_utc()
	}

	pub fn end_exclusive(self) -> OffsetDateTime {
		self.next().start()
	}

	pub fn previous(self) -> Self {
		match self.month {
			1 => Self { year: self.year - 1, month: 12 },
			month => Self { year: self.year, month: month - 1 },
		}
	}

	pub fn next(self) -> Self {
		match self.month {
			12 => Self { year: self.year + 1, month: 1 },
			month => Self { year: self.year, month: month + 1 },
		}
	}

	pub fn contains(self, at: OffsetDateTime) -> bool {
		Self::containing(at) == self
	}

	fn first_day(self) -> Date {
		// `month` is validated on construction and day 1 exists in every month.
		Month::try_from(self.month)
			.ok()
			.and_then(|month| Date::from_calendar_date(self.year, month, 1).ok())
			.unwrap_or(Date::MIN)
	}
}

impl fmt::Display for Period {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{:04}-{:02}", self.year, self.month)
	}
}

impl FromStr for Period {
	type Err = Error;

	fn from_str(raw: &str) -> Result<Self> {
		let invalid = || Error::InvalidPeriod { value: raw.to_string() };
		let (year, month) = raw.trim().split_once('-').ok_or_else(invalid)?;

		if year.len() != 4 || month.len() != 2 {
			return Err(invalid());
		}

		let year = year.parse::<i32>().map_err(|_| invalid())?;
		let month = month.parse::<u8>().map_err(|_| invalid())?;

		Self::new(year, month).map_err(|_| invalid())
	}
}

impl Serialize for Period {
	fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.collect_str(self)
	}
}

impl<'de> Deserialize<'de> for Period {
	fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let raw = String::deserialize(deserializer)?;

		raw.parse().map_err(serde::de::Error::custom)
	}
}
