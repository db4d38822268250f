//! Query analysis: period hints and the closed set of fact intents.

use regex::Regex;
use serde::Serialize;

use crate::Period;

const MONTH_PREFIXES: [&str; 12] =
	["jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec"];

/// The time frame a query names or implies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PeriodHint {
	Explicit(Period),
	Current,
	Previous,
	Latest,
	/// A bare calendar year such as "2025".
	Year(i32),
	ThisYear,
	LastYear,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntentKind {
	Interest,
	Balance,
	Spend,
	Payment,
	Status,
	Transaction,
}
impl IntentKind {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Interest => "INTEREST",
			Self::Balance => "BALANCE",
			Self::Spend => "SPEND",
			Self::Payment => "PAYMENT",
			Self::Status => "STATUS",
			Self::Transaction => "TRANSACTION",
		}
	}
}

/// Which month or year a fact is about, before it is resolved against the data and the clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PeriodSelector {
	Month(Period),
	Current,
	Previous,
	Latest,
	Year(i32),
	ThisYear,
	LastYear,
}
impl From<PeriodHint> for PeriodSelector {
	fn from(hint: PeriodHint) -> Self {
		match hint {
			PeriodHint::Explicit(period) => Self::Month(period),
			PeriodHint::Current => Self::Current,
			PeriodHint::Previous => Self::Previous,
			PeriodHint::Latest => Self::Latest,
			PeriodHint::Year(year) => Self::Year(year),
			PeriodHint::ThisYear => Self::ThisYear,
			PeriodHint::LastYear => Self::LastYear,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BalanceTarget {
	Statement(PeriodSelector),
	Current,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpendQuestion {
	TopMerchant,
	Total,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaymentTarget {
	Last,
	InPeriod(PeriodSelector),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intent {
	Interest { period: PeriodSelector },
	/// When interest was last charged, and how much.
	InterestLastCharged,
	/// "Why was I charged interest": the last interest-bearing statement and the transactions
	/// inside its cycle.
	InterestDrivers,
	Balance { target: BalanceTarget },
	Spend { period: PeriodSelector, question: SpendQuestion },
	Payment { target: PaymentTarget },
	Status,
	LastPostedTransaction,
}
impl Intent {
	pub fn kind(&self) -> IntentKind {
		match self {
			Self::Interest { .. } | Self::InterestLastCharged | Self::InterestDrivers => {
				IntentKind::Interest
			},
			Self::Balance { .. } => IntentKind::Balance,
			Self::Spend { .. } => IntentKind::Spend,
			Self::Payment { .. } => IntentKind::Payment,
			Self::Status => IntentKind::Status,
			Self::LastPostedTransaction => IntentKind::Transaction,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryAnalysis {
	pub hint: Option<PeriodHint>,
	pub intents: Vec<Intent>,
}

pub fn analyze(query: &str) -> QueryAnalysis {
	let hint = detect_period_hint(query);
	let intents = detect_intents(query, hint);

	QueryAnalysis { hint, intents }
}

/// `YYYY-MM` first, then `<month name> YYYY`, then relative months, then years, then "latest".
pub fn detect_period_hint(query: &str) -> Option<PeriodHint> {
	let text = query.to_lowercase();

	if let Some(period) = detect_year_month(&text) {
		return Some(PeriodHint::Explicit(period));
	}
	if contains_any(&text, &["this month", "current month", "month to date"]) {
		return Some(PeriodHint::Current);
	}
	if contains_any(&text, &["last month", "previous month", "prior month"]) {
		return Some(PeriodHint::Previous);
	}
	if contains_any(&text, &["this year", "current year", "year to date"]) {
		return Some(PeriodHint::ThisYear);
	}
	if contains_any(&text, &["last year", "previous year", "prior year"]) {
		return Some(PeriodHint::LastYear);
	}
	if let Some(year) = detect_year(&text) {
		return Some(PeriodHint::Year(year));
	}
	if matches(r"\b(latest|most recent|recent|recently|last)\b", &text) {
		return Some(PeriodHint::Latest);
	}

	None
}

pub fn detect_year_month(text: &str) -> Option<Period> {
	let numeric = Regex::new(r"\b(20\d{2})-(\d{2})\b")
		.ok()
		.and_then(|re| re.captures(text))
		.and_then(|caps| Period::new(caps[1].parse().ok()?, caps[2].parse().ok()?).ok());

	if numeric.is_some() {
		return numeric;
	}

	let named = r"(?i)\b(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+(20\d{2})\b";
	let caps = Regex::new(named).ok().and_then(|re| re.captures(text))?;
	let prefix = caps[1].to_lowercase();
	let month = MONTH_PREFIXES.iter().position(|candidate| *candidate == prefix)? + 1;

	Period::new(caps[2].parse().ok()?, u8::try_from(month).ok()?).ok()
}

/// A standalone `20YY` that is not part of a `YYYY-MM` month.
pub fn detect_year(text: &str) -> Option<i32> {
	let caps = Regex::new(r"\b(20\d{2})\b(?:[^-]|$)").ok()?.captures(text)?;

	caps[1].parse().ok()
}

/// Intents in fixed order: interest, spend, payment, balance, status, transaction.
pub fn detect_intents(query: &str, hint: Option<PeriodHint>) -> Vec<Intent> {
	let text = query.to_lowercase();
	let selector = hint.map(PeriodSelector::from);
	let mut intents = Vec::new();

	if text.contains("interest") && !is_rate_question(&text, hint) {
		intents.push(interest_intent(&text, selector));
	}
	if matches(r"\b(spend|spent|spending)\b", &text) || text.contains("top merchant") {
		let question = if contains_any(&text, &["most", "top merchant", "where did"]) {
			SpendQuestion::TopMerchant
		} else {
			SpendQuestion::Total
		};

		intents.push(Intent::Spend {
			period: selector.unwrap_or(PeriodSelector::Current),
			question,
		});
	}
	if text.contains("payment") || (matches(r"\bpaid\b", &text) && !text.contains("interest")) {
		let target = match selector {
			Some(PeriodSelector::Latest) | None => PaymentTarget::Last,
			Some(_) if text.contains("last payment") => PaymentTarget::Last,
			Some(selector) => PaymentTarget::InPeriod(selector),
		};

		intents.push(Intent::Payment { target });
	}
	if text.contains("balance") {
		let target = if text.contains("current balance") {
			BalanceTarget::Current
		} else if text.contains("statement") {
			BalanceTarget::Statement(selector.unwrap_or(PeriodSelector::Latest))
		} else {
			match selector {
				Some(PeriodSelector::Latest) | None => BalanceTarget::Current,
				Some(selector) => BalanceTarget::Statement(selector),
			}
		};

		intents.push(Intent::Balance { target });
	}
	if text.contains("status") {
		intents.push(Intent::Status);
	}
	if matches(r"\b(last|latest|most recent)( posted)? transaction\b", &text) {
		intents.push(Intent::LastPostedTransaction);
	}

	intents
}

fn interest_intent(text: &str, selector: Option<PeriodSelector>) -> Intent {
	let asks_why = contains_any(
		text,
		&["why", "reason", "what caused the interest", "transactions responsible for interest"],
	);

	if asks_why {
		return Intent::InterestDrivers;
	}
	if text.contains("when") && matches(r"\b(last|latest|most recent|recently)\b", text) {
		return Intent::InterestLastCharged;
	}

	Intent::Interest { period: selector.unwrap_or(PeriodSelector::Latest) }
}

// "apr" alone is the rate unless it names April with a year, as in "interest for apr 2025".
fn is_rate_question(text: &str, hint: Option<PeriodHint>) -> bool {
	text.contains("interest rate")
		|| (matches(r"\bapr\b", text) && !matches!(hint, Some(PeriodHint::Explicit(_))))
}

fn matches(pattern: &str, text: &str) -> bool {
	Regex::new(pattern).map(|re| re.is_match(text)).unwrap_or(false)
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
	needles.iter().any(|needle| text.contains(needle))
}
