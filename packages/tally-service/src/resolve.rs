//! Deterministic fact resolution.
//!
//! Each intent owns an ordered chain of pure branch functions. The first branch that finds data
//! wins and no other branch is consulted, so one fact never mixes sources.

use std::{collections::BTreeMap, fmt};

use serde::Serialize;
use time::OffsetDateTime;

use crate::{
	Error, Result,
	aggregate::{self, AggregateTable},
	store::ChunkStore,
};
use tally_domain::{
	BalanceTarget, Chunk, ChunkId, ChunkKind, FieldValue, Intent, IntentKind, PaymentTarget,
	Period, PeriodSelector, SpendQuestion, classify, fields,
};

/// Cap on the transactions cited as interest drivers, newest first.
pub const MAX_INTEREST_DRIVERS: usize = 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourcePath {
	AggregateInterestFromStatements,
	StatementInterestCharged,
	InterestTransactions,
	StatementLastInterest,
	LastInterestTransaction,
	InterestStatementWindow,
	StatementEndingBalance,
	TransactionRunningBalance,
	AccountCurrentBalance,
	TopMerchant,
	SpendTotal,
	LatestPayment,
	AggregatePaymentsTotal,
	PaymentsInPeriod,
	AccountStatus,
	LastPostedTransaction,
}
impl SourcePath {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::AggregateInterestFromStatements => "aggregate_interest_from_statements",
			Self::StatementInterestCharged => "statement_interest_charged",
			Self::InterestTransactions => "interest_transactions",
			Self::StatementLastInterest => "statement_last_interest",
			Self::LastInterestTransaction => "last_interest_transaction",
			Self::InterestStatementWindow => "interest_statement_window",
			Self::StatementEndingBalance => "statement_ending_balance",
			Self::TransactionRunningBalance => "transaction_running_balance",
			Self::AccountCurrentBalance => "account_current_balance",
			Self::TopMerchant => "top_merchant",
			Self::SpendTotal => "spend_total",
			Self::LatestPayment => "latest_payment",
			Self::AggregatePaymentsTotal => "aggregate_payments_total",
			Self::PaymentsInPeriod => "payments_in_period",
			Self::AccountStatus => "account_status",
			Self::LastPostedTransaction => "last_posted_transaction",
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FactValue {
	Amount {
		amount: f64,
	},
	Text {
		text: String,
	},
	Merchant {
		name: String,
		total: f64,
	},
	Payment {
		amount: Option<f64>,
		#[serde(with = "tally_domain::time_serde")]
		date: OffsetDateTime,
	},
	/// One dated interest charge.
	Charge {
		amount: f64,
		#[serde(with = "tally_domain::time_serde")]
		date: OffsetDateTime,
	},
	/// Interest on a statement and the cycle whose transactions carried it.
	InterestDrivers {
		interest: f64,
		#[serde(with = "tally_domain::time_serde")]
		period_start: OffsetDateTime,
		#[serde(with = "tally_domain::time_serde")]
		period_end: OffsetDateTime,
		driver_count: usize,
	},
	Transaction {
		amount: Option<f64>,
		#[serde(with = "tally_domain::time_serde")]
		date: OffsetDateTime,
		merchant: Option<String>,
		transaction_type: Option<String>,
	},
}
impl FactValue {
	pub fn amount(&self) -> Option<f64> {
		match self {
			Self::Amount { amount } | Self::Charge { amount, .. } => Some(*amount),
			Self::Merchant { total, .. } => Some(*total),
			Self::InterestDrivers { interest, .. } => Some(*interest),
			Self::Payment { amount, .. } | Self::Transaction { amount, .. } => *amount,
			Self::Text { .. } => None,
		}
	}
}

/// One authoritative answer for one intent. `value` and `source_path` are set together;
/// `missing` is set exactly when they are not.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResolvedFact {
	pub intent: IntentKind,
	/// The month a single-month fact covers.
	pub period: Option<Period>,
	/// The calendar year a year-wide fact covers; `period` is unset for these.
	pub year: Option<i32>,
	pub period_label: String,
	pub value: Option<FactValue>,
	pub source_path: Option<SourcePath>,
	pub supporting_chunk_ids: Vec<ChunkId>,
	pub missing: Option<String>,
}
impl ResolvedFact {
	pub fn is_resolved(&self) -> bool {
		self.value.is_some()
	}

	pub fn into_result(self) -> Result<Self> {
		match self.missing {
			Some(missing) => Err(Error::UnresolvedFact { missing }),
			None => Ok(self),
		}
	}

	fn unresolved(
		intent: IntentKind,
		window: Option<Window>,
		period_label: String,
		missing: String,
	) -> Self {
		tracing::info!(intent = intent.as_str(), %missing, "Fact unresolved.");

		Self {
			intent,
			period: window.and_then(Window::period),
			year: window.and_then(Window::year),
			period_label,
			value: None,
			source_path: None,
			supporting_chunk_ids: Vec::new(),
			missing: Some(missing),
		}
	}
}

pub struct ResolveContext<'a> {
	pub store: &'a ChunkStore,
	pub aggregates: &'a AggregateTable,
	pub now: OffsetDateTime,
	pub allow_running_balance_fallback: bool,
}

/// The span a fact is resolved over.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Window {
	Month(Period),
	Year(i32),
}
impl Window {
	fn contains(self, period: Period) -> bool {
		match self {
			Self::Month(month) => month == period,
			Self::Year(year) => period.year() == year,
		}
	}

	fn period(self) -> Option<Period> {
		match self {
			Self::Month(period) => Some(period),
			Self::Year(_) => None,
		}
	}

	fn year(self) -> Option<i32> {
		match self {
			Self::Month(_) => None,
			Self::Year(year) => Some(year),
		}
	}
}

impl fmt::Display for Window {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Month(period) => write!(f, "{period}"),
			Self::Year(year) => write!(f, "{year:04}"),
		}
	}
}

struct Lookup<'a> {
	store: &'a ChunkStore,
	aggregates: &'a AggregateTable,
	window: Window,
	/// Upper bound for to-date windows; rows dated after it are left out.
	window_end: Option<OffsetDateTime>,
	allow_running_balance_fallback: bool,
}
impl<'a> Lookup<'a> {
	/// Chunks of `kind` whose period falls inside the window.
	fn chunks(&self, kind: ChunkKind) -> impl Iterator<Item = &'a Chunk> + use<'a> {
		let window = self.window;

		self.store
			.of_kind(kind)
			.filter(move |chunk| chunk.period.is_some_and(|period| window.contains(period)))
	}
}

struct BranchHit {
	value: FactValue,
	supporting: Vec<ChunkId>,
}

type Branch = fn(&Lookup<'_>) -> Option<BranchHit>;

struct Target {
	window: Window,
	label: String,
	window_end: Option<OffsetDateTime>,
}

const INTEREST_CHAIN: &[(SourcePath, Branch)] = &[
	(SourcePath::AggregateInterestFromStatements, interest_from_aggregate),
	(SourcePath::StatementInterestCharged, interest_from_statements),
	(SourcePath::InterestTransactions, interest_from_transactions),
];
const LAST_INTEREST_CHAIN: &[(SourcePath, Branch)] = &[
	(SourcePath::StatementLastInterest, last_interest_from_statements),
	(SourcePath::LastInterestTransaction, last_interest_from_transactions),
];
const INTEREST_DRIVERS_CHAIN: &[(SourcePath, Branch)] =
	&[(SourcePath::InterestStatementWindow, interest_drivers)];
const STATEMENT_BALANCE_CHAIN: &[(SourcePath, Branch)] = &[
	(SourcePath::StatementEndingBalance, balance_from_statement),
	(SourcePath::TransactionRunningBalance, balance_from_running_balance),
];
const TOP_MERCHANT_CHAIN: &[(SourcePath, Branch)] = &[(SourcePath::TopMerchant, top_merchant)];
const SPEND_TOTAL_CHAIN: &[(SourcePath, Branch)] = &[(SourcePath::SpendTotal, spend_total)];
const PAYMENTS_IN_PERIOD_CHAIN: &[(SourcePath, Branch)] = &[
	(SourcePath::AggregatePaymentsTotal, payments_from_aggregate),
	(SourcePath::PaymentsInPeriod, payments_from_records),
];

pub fn resolve(intent: &Intent, ctx: &ResolveContext<'_>) -> ResolvedFact {
	let fact = match intent {
		Intent::Interest { period } => resolve_interest(*period, ctx),
		Intent::InterestLastCharged => resolve_last_interest(ctx),
		Intent::InterestDrivers => resolve_interest_drivers(ctx),
		Intent::Balance { target: BalanceTarget::Current } => resolve_current_balance(ctx),
		Intent::Balance { target: BalanceTarget::Statement(selector) } => {
			resolve_statement_balance(*selector, ctx)
		},
		Intent::Spend { period, question } => resolve_spend(*period, *question, ctx),
		Intent::Payment { target: PaymentTarget::Last } => resolve_last_payment(ctx),
		Intent::Payment { target: PaymentTarget::InPeriod(selector) } => {
			resolve_payments_in_period(*selector, ctx)
		},
		Intent::Status => resolve_status(ctx),
		Intent::LastPostedTransaction => resolve_last_posted_transaction(ctx),
	};

	if let Some(path) = fact.source_path {
		tracing::debug!(
			intent = fact.intent.as_str(),
			source_path = path.as_str(),
			supporting = fact.supporting_chunk_ids.len(),
			"Resolved fact."
		);
	}

	fact
}

fn resolve_interest(selector: PeriodSelector, ctx: &ResolveContext<'_>) -> ResolvedFact {
	let has_interest = |chunk: &Chunk| {
		(chunk.kind == ChunkKind::Statement && chunk.number(fields::INTEREST_CHARGED).is_some())
			|| (classify::is_interest_transaction(chunk) && classify::is_posted(chunk))
	};

	resolve_windowed(
		IntentKind::Interest,
		selector,
		INTEREST_CHAIN,
		ctx,
		has_interest,
		"STATEMENT.interestCharged",
	)
}

/// The most recent period with a positive statement charge or a posted interest transaction.
fn resolve_last_interest(ctx: &ResolveContext<'_>) -> ResolvedFact {
	let has_charge = |chunk: &Chunk| {
		chunk.timestamp.is_some()
			&& (positive_statement_interest(chunk).is_some()
				|| (classify::is_interest_transaction(chunk) && classify::is_posted(chunk)))
	};

	resolve_windowed(
		IntentKind::Interest,
		PeriodSelector::Latest,
		LAST_INTEREST_CHAIN,
		ctx,
		has_charge,
		"STATEMENT.interestCharged",
	)
}

fn resolve_interest_drivers(ctx: &ResolveContext<'_>) -> ResolvedFact {
	let selector = PeriodSelector::Latest;
	let has_charge = |chunk: &Chunk| positive_statement_interest(chunk).is_some();

	match select_window(selector, ctx, has_charge) {
		Some(target) => {
			let missing = format!(
				"STATEMENT.openingDateTime and STATEMENT.closingDateTime for {}",
				target.window
			);

			run_chain(IntentKind::Interest, INTEREST_DRIVERS_CHAIN, target, ctx, missing)
		},
		None => ResolvedFact::unresolved(
			IntentKind::Interest,
			None,
			label_for(selector),
			"STATEMENT.interestCharged for latest period".to_string(),
		),
	}
}

/// A statement balance belongs to one cycle; a year never picks one on the caller's behalf.
fn resolve_statement_balance(selector: PeriodSelector, ctx: &ResolveContext<'_>) -> ResolvedFact {
	if let Some(year) = year_of(selector, ctx.now) {
		return ResolvedFact::unresolved(
			IntentKind::Balance,
			Some(Window::Year(year)),
			label_for(selector),
			format!("STATEMENT.endingBalance for a single month of {year:04}"),
		);
	}

	let has_balance = |chunk: &Chunk| {
		chunk.kind == ChunkKind::Statement && chunk.number(fields::ENDING_BALANCE).is_some()
	};

	resolve_windowed(
		IntentKind::Balance,
		selector,
		STATEMENT_BALANCE_CHAIN,
		ctx,
		has_balance,
		"STATEMENT.endingBalance",
	)
}

fn resolve_spend(
	selector: PeriodSelector,
	question: SpendQuestion,
	ctx: &ResolveContext<'_>,
) -> ResolvedFact {
	let chain = match question {
		SpendQuestion::TopMerchant => TOP_MERCHANT_CHAIN,
		SpendQuestion::Total => SPEND_TOTAL_CHAIN,
	};

	resolve_windowed(
		IntentKind::Spend,
		selector,
		chain,
		ctx,
		classify::is_spend_transaction,
		"TRANSACTION.amount (spend)",
	)
}

fn resolve_payments_in_period(selector: PeriodSelector, ctx: &ResolveContext<'_>) -> ResolvedFact {
	let is_payment = |chunk: &Chunk| chunk.kind == ChunkKind::Payment;

	resolve_windowed(
		IntentKind::Payment,
		selector,
		PAYMENTS_IN_PERIOD_CHAIN,
		ctx,
		is_payment,
		"PAYMENT.amount",
	)
}

/// "Last payment" is the maximum canonical date; `authDateTime` plays no part.
fn resolve_last_payment(ctx: &ResolveContext<'_>) -> ResolvedFact {
	let latest = ctx
		.store
		.of_kind(ChunkKind::Payment)
		.filter_map(|chunk| chunk.timestamp.map(|at| (at, chunk)))
		.max_by_key(|(at, chunk)| (*at, chunk.id));
	let Some((date, chunk)) = latest else {
		return ResolvedFact::unresolved(
			IntentKind::Payment,
			None,
			"latest".to_string(),
			"PAYMENT.paymentDateTime".to_string(),
		);
	};

	ResolvedFact {
		intent: IntentKind::Payment,
		period: chunk.period,
		year: None,
		period_label: "latest".to_string(),
		value: Some(FactValue::Payment { amount: chunk.number(fields::AMOUNT), date }),
		source_path: Some(SourcePath::LatestPayment),
		supporting_chunk_ids: vec![chunk.id],
		missing: None,
	}
}

/// The posted transaction with the greatest canonical date that is not after `now`.
fn resolve_last_posted_transaction(ctx: &ResolveContext<'_>) -> ResolvedFact {
	let latest = ctx
		.store
		.of_kind(ChunkKind::Transaction)
		.filter(|chunk| classify::is_posted(chunk))
		.filter_map(|chunk| chunk.timestamp.filter(|at| *at <= ctx.now).map(|at| (at, chunk)))
		.max_by_key(|(at, chunk)| (*at, chunk.id));
	let Some((date, chunk)) = latest else {
		return ResolvedFact::unresolved(
			IntentKind::Transaction,
			None,
			"latest".to_string(),
			"TRANSACTION.transactionDateTime (posted)".to_string(),
		);
	};
	let merchant = chunk
		.text_field(fields::MERCHANT_NAME)
		.or_else(|| chunk.text_field(fields::DESCRIPTION))
		.map(str::to_string);
	let transaction_type = chunk
		.text_field(fields::DISPLAY_TRANSACTION_TYPE)
		.or_else(|| chunk.text_field(fields::TRANSACTION_TYPE))
		.map(str::to_string);

	ResolvedFact {
		intent: IntentKind::Transaction,
		period: chunk.period,
		year: None,
		period_label: "latest".to_string(),
		value: Some(FactValue::Transaction {
			amount: chunk.number(fields::AMOUNT),
			date,
			merchant,
			transaction_type,
		}),
		source_path: Some(SourcePath::LastPostedTransaction),
		supporting_chunk_ids: vec![chunk.id],
		missing: None,
	}
}

fn resolve_current_balance(ctx: &ResolveContext<'_>) -> ResolvedFact {
	account_field(
		ctx,
		IntentKind::Balance,
		fields::CURRENT_BALANCE,
		SourcePath::AccountCurrentBalance,
	)
}

fn resolve_status(ctx: &ResolveContext<'_>) -> ResolvedFact {
	account_field(ctx, IntentKind::Status, fields::ACCOUNT_STATUS, SourcePath::AccountStatus)
}

// The account summary has no date; the last account record in input order is current.
fn account_field(
	ctx: &ResolveContext<'_>,
	intent: IntentKind,
	field: &str,
	path: SourcePath,
) -> ResolvedFact {
	let hit = ctx
		.store
		.of_kind(ChunkKind::Account)
		.filter_map(|chunk| {
			let value = match chunk.field(field)? {
				FieldValue::Number(amount) => FactValue::Amount { amount: *amount },
				FieldValue::Text(text) => FactValue::Text { text: text.clone() },
				_ => return None,
			};

			Some((value, chunk.id))
		})
		.last();
	let Some((value, chunk_id)) = hit else {
		return ResolvedFact::unresolved(
			intent,
			None,
			"current".to_string(),
			format!("ACCOUNT.{field}"),
		);
	};

	ResolvedFact {
		intent,
		period: None,
		year: None,
		period_label: "current".to_string(),
		value: Some(value),
		source_path: Some(path),
		supporting_chunk_ids: vec![chunk_id],
		missing: None,
	}
}

/// Picks the window, then runs `chain` over it. `field` names what is missing on failure.
fn resolve_windowed(
	intent: IntentKind,
	selector: PeriodSelector,
	chain: &[(SourcePath, Branch)],
	ctx: &ResolveContext<'_>,
	has_data: impl Fn(&Chunk) -> bool,
	field: &str,
) -> ResolvedFact {
	match select_window(selector, ctx, has_data) {
		Some(target) => {
			let missing = format!("{field} for {}", target.window);

			run_chain(intent, chain, target, ctx, missing)
		},
		None => ResolvedFact::unresolved(
			intent,
			None,
			label_for(selector),
			format!("{field} for latest period"),
		),
	}
}

fn run_chain(
	intent: IntentKind,
	chain: &[(SourcePath, Branch)],
	target: Target,
	ctx: &ResolveContext<'_>,
	missing: String,
) -> ResolvedFact {
	let lookup = Lookup {
		store: ctx.store,
		aggregates: ctx.aggregates,
		window: target.window,
		window_end: target.window_end,
		allow_running_balance_fallback: ctx.allow_running_balance_fallback,
	};
	let hit = chain.iter().find_map(|(path, branch)| branch(&lookup).map(|hit| (*path, hit)));
	let Some((path, hit)) = hit else {
		return ResolvedFact::unresolved(intent, Some(target.window), target.label, missing);
	};

	ResolvedFact {
		intent,
		period: target.window.period(),
		year: target.window.year(),
		period_label: target.label,
		value: Some(hit.value),
		source_path: Some(path),
		supporting_chunk_ids: hit.supporting,
		missing: None,
	}
}

/// `None` only when `Latest` finds no chunk matching `has_data`. Windows that reach the present
/// ("this month", "this year", the current year by number) end at `now`.
fn select_window(
	selector: PeriodSelector,
	ctx: &ResolveContext<'_>,
	has_data: impl Fn(&Chunk) -> bool,
) -> Option<Target> {
	let current = Period::containing(ctx.now);
	let (window, window_end) = match selector {
		PeriodSelector::Month(period) => (Window::Month(period), None),
		PeriodSelector::Current => (Window::Month(current), Some(ctx.now)),
		PeriodSelector::Previous => (Window::Month(current.previous()), None),
		PeriodSelector::Latest => {
			let period = ctx
				.store
				.chunks()
				.iter()
				.filter(|&chunk| has_data(chunk))
				.filter_map(|chunk| chunk.period)
				.max()?;

			(Window::Month(period), None)
		},
		PeriodSelector::Year(_) | PeriodSelector::ThisYear | PeriodSelector::LastYear => {
			let year = year_of(selector, ctx.now)?;

			(Window::Year(year), (year == current.year()).then_some(ctx.now))
		},
	};

	Some(Target { window, label: label_for(selector), window_end })
}

fn year_of(selector: PeriodSelector, now: OffsetDateTime) -> Option<i32> {
	let current = Period::containing(now).year();

	match selector {
		PeriodSelector::Year(year) => Some(year),
		PeriodSelector::ThisYear => Some(current),
		PeriodSelector::LastYear => Some(current - 1),
		_ => None,
	}
}

fn label_for(selector: PeriodSelector) -> String {
	match selector {
		PeriodSelector::Month(period) => period.to_string(),
		PeriodSelector::Current => "this month".to_string(),
		PeriodSelector::Previous => "last month".to_string(),
		PeriodSelector::Latest => "latest".to_string(),
		PeriodSelector::Year(year) => format!("{year:04}"),
		PeriodSelector::ThisYear => "this year".to_string(),
		PeriodSelector::LastYear => "last year".to_string(),
	}
}

fn interest_from_aggregate(lookup: &Lookup<'_>) -> Option<BranchHit> {
	aggregate_hit(lookup, aggregate::INTEREST_FROM_STATEMENTS_TOTAL)
}

fn interest_from_statements(lookup: &Lookup<'_>) -> Option<BranchHit> {
	let rows = lookup
		.chunks(ChunkKind::Statement)
		.filter_map(|chunk| chunk.number(fields::INTEREST_CHARGED).map(|value| (chunk.id, value)))
		.collect::<Vec<_>>();

	sum_hit(rows)
}

fn interest_from_transactions(lookup: &Lookup<'_>) -> Option<BranchHit> {
	let rows = lookup
		.chunks(ChunkKind::Transaction)
		.filter(|chunk| classify::is_interest_transaction(chunk) && classify::is_posted(chunk))
		.filter_map(|chunk| chunk.number(fields::AMOUNT).map(|value| (chunk.id, value.abs())))
		.collect::<Vec<_>>();

	sum_hit(rows)
}

fn last_interest_from_statements(lookup: &Lookup<'_>) -> Option<BranchHit> {
	let (chunk, amount, date) = lookup
		.chunks(ChunkKind::Statement)
		.filter_map(|chunk| Some((chunk, positive_statement_interest(chunk)?, chunk.timestamp?)))
		.max_by_key(|(chunk, _, date)| (*date, chunk.id))?;

	Some(BranchHit { value: FactValue::Charge { amount, date }, supporting: vec![chunk.id] })
}

fn last_interest_from_transactions(lookup: &Lookup<'_>) -> Option<BranchHit> {
	let (chunk, amount, date) = lookup
		.chunks(ChunkKind::Transaction)
		.filter(|chunk| classify::is_interest_transaction(chunk) && classify::is_posted(chunk))
		.filter_map(|chunk| Some((chunk, chunk.number(fields::AMOUNT)?.abs(), chunk.timestamp?)))
		.max_by_key(|(chunk, _, date)| (*date, chunk.id))?;

	Some(BranchHit { value: FactValue::Charge { amount, date }, supporting: vec![chunk.id] })
}

/// The latest interest-bearing statement in the window, then every posted non-interest
/// transaction dated inside its opening-to-closing cycle, newest first.
fn interest_drivers(lookup: &Lookup<'_>) -> Option<BranchHit> {
	let (statement, interest) = lookup
		.chunks(ChunkKind::Statement)
		.filter_map(|chunk| positive_statement_interest(chunk).map(|amount| (chunk, amount)))
		.max_by_key(|(chunk, _)| (chunk.timestamp, chunk.id))?;
	let period_start = statement.timestamp_field(fields::OPENING_DATE_TIME)?;
	let period_end = statement.timestamp_field(fields::CLOSING_DATE_TIME)?;
	// The cycle may straddle months, so drivers are not limited to the window.
	let mut drivers = lookup
		.store
		.of_kind(ChunkKind::Transaction)
		.filter(|chunk| classify::is_posted(chunk) && !classify::is_interest_transaction(chunk))
		.filter_map(|chunk| {
			chunk
				.timestamp
				.filter(|at| (period_start..=period_end).contains(at))
				.map(|at| (at, chunk.id))
		})
		.collect::<Vec<_>>();

	drivers.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
	drivers.truncate(MAX_INTEREST_DRIVERS);

	let mut supporting = vec![statement.id];

	supporting.extend(drivers.iter().map(|(_, chunk_id)| *chunk_id));

	Some(BranchHit {
		value: FactValue::InterestDrivers {
			interest,
			period_start,
			period_end,
			driver_count: drivers.len(),
		},
		supporting,
	})
}

fn balance_from_statement(lookup: &Lookup<'_>) -> Option<BranchHit> {
	latest_number(lookup, ChunkKind::Statement, fields::ENDING_BALANCE)
}

fn balance_from_running_balance(lookup: &Lookup<'_>) -> Option<BranchHit> {
	if !lookup.allow_running_balance_fallback {
		return None;
	}

	let hit = latest_number(lookup, ChunkKind::Transaction, fields::RUNNING_BALANCE)?;

	tracing::warn!(
		window = %lookup.window,
		"No statement balance for period. Falling back to the last running balance."
	);

	Some(hit)
}

fn top_merchant(lookup: &Lookup<'_>) -> Option<BranchHit> {
	// merchant -> (total, first chunk id, supporting ids)
	let mut merchants: BTreeMap<String, (f64, ChunkId, Vec<ChunkId>)> = BTreeMap::new();

	for (chunk, amount) in spend_rows(lookup) {
		let entry = merchants.entry(merchant_name(chunk)).or_insert((0.0, chunk.id, Vec::new()));

		entry.0 += amount;
		entry.1 = entry.1.min(chunk.id);
		entry.2.push(chunk.id);
	}

	let (name, (total, _, supporting)) = merchants.into_iter().max_by(|a, b| {
		let (a_total, b_total) = (aggregate::round_cents(a.1.0), aggregate::round_cents(b.1.0));

		a_total.total_cmp(&b_total).then(b.1.1.cmp(&a.1.1))
	})?;

	Some(BranchHit {
		value: FactValue::Merchant { name, total: aggregate::round_cents(total) },
		supporting,
	})
}

fn spend_total(lookup: &Lookup<'_>) -> Option<BranchHit> {
	let rows = spend_rows(lookup).map(|(chunk, amount)| (chunk.id, amount)).collect::<Vec<_>>();

	sum_hit(rows)
}

fn payments_from_aggregate(lookup: &Lookup<'_>) -> Option<BranchHit> {
	aggregate_hit(lookup, aggregate::PAYMENTS_TOTAL)
}

fn payments_from_records(lookup: &Lookup<'_>) -> Option<BranchHit> {
	let rows = lookup
		.chunks(ChunkKind::Payment)
		.filter_map(|chunk| chunk.number(fields::AMOUNT).map(|value| (chunk.id, value)))
		.collect::<Vec<_>>();

	sum_hit(rows)
}

/// Sums the metric's records over the window, citing only the AGGREGATE chunks.
fn aggregate_hit(lookup: &Lookup<'_>, metric: &str) -> Option<BranchHit> {
	let rows = match lookup.window {
		Window::Month(period) => {
			let record = lookup.aggregates.get(period, metric)?;

			vec![(record.chunk_id?, record.value)]
		},
		Window::Year(_) => lookup
			.aggregates
			.records()
			.iter()
			.filter(|record| record.metric == metric && lookup.window.contains(record.period))
			.map(|record| record.chunk_id.map(|chunk_id| (chunk_id, record.value)))
			.collect::<Option<Vec<_>>>()?,
	};

	sum_hit(rows)
}

/// Month-to-date windows keep rows dated at or before `window_end`.
fn spend_rows<'a>(lookup: &'a Lookup<'_>) -> impl Iterator<Item = (&'a Chunk, f64)> + 'a {
	lookup
		.chunks(ChunkKind::Transaction)
		.filter(|chunk| classify::is_spend_transaction(chunk))
		.filter(move |chunk| match (lookup.window_end, chunk.timestamp) {
			(Some(end), Some(at)) => at <= end,
			_ => true,
		})
		.filter_map(|chunk| chunk.number(fields::AMOUNT).map(|amount| (chunk, amount.abs())))
}

fn positive_statement_interest(chunk: &Chunk) -> Option<f64> {
	if chunk.kind != ChunkKind::Statement {
		return None;
	}

	chunk.number(fields::INTEREST_CHARGED).filter(|amount| *amount > 0.0)
}

fn merchant_name(chunk: &Chunk) -> String {
	chunk
		.text_field(fields::MERCHANT_NAME)
		.or_else(|| chunk.text_field(fields::DESCRIPTION))
		.unwrap_or("Unknown merchant")
		.to_string()
}

/// The chunk of `kind` in the window with the greatest timestamp that carries `field`.
fn latest_number(lookup: &Lookup<'_>, kind: ChunkKind, field: &str) -> Option<BranchHit> {
	let (amount, chunk_id) = lookup
		.chunks(kind)
		.filter_map(|chunk| chunk.number(field).map(|value| (chunk, value)))
		.max_by_key(|(chunk, _)| (chunk.timestamp, chunk.id))
		.map(|(chunk, value)| (value, chunk.id))?;

	Some(BranchHit { value: FactValue::Amount { amount }, supporting: vec![chunk_id] })
}

fn sum_hit(rows: Vec<(ChunkId, f64)>) -> Option<BranchHit> {
	if rows.is_empty() {
		return None;
	}

	let amount = aggregate::round_cents(rows.iter().map(|(_, value)| value).sum());

	Some(BranchHit {
		value: FactValue::Amount { amount },
		supporting: rows.into_iter().map(|(chunk_id, _)| chunk_id).collect(),
	})
}
