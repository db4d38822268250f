use time::macros::datetime;

use tally_domain::IntentKind;
use tally_service::{FactValue, SourcePath};

use crate::acceptance;

#[tokio::test]
async fn year_spend_is_not_the_current_month() {
	let service =
		acceptance::loaded_service(acceptance::test_config(), acceptance::stub_providers()).await;
	let response = acceptance::ask(&service, "How much did I spend in 2025?").await;
	let cited = &response.facts[0];

	assert_eq!(response.facts.len(), 1);
	assert_eq!(cited.fact.intent, IntentKind::Spend);
	assert_eq!(cited.fact.period_label, "2025");
	assert_eq!(cited.fact.period, None);
	assert_eq!(cited.fact.year, Some(2025));
	assert_eq!(cited.fact.source_path, Some(SourcePath::SpendTotal));
	// August and September to date; the pending row after `now` stays out.
	assert_eq!(cited.fact.value, Some(FactValue::Amount { amount: 197.3 }));
	assert_eq!(cited.fact.supporting_chunk_ids.len(), 5);
}

#[tokio::test]
async fn year_without_data_is_unresolved_for_that_year() {
	let service =
		acceptance::loaded_service(acceptance::test_config(), acceptance::stub_providers()).await;
	let response = acceptance::ask(&service, "How much did I spend in 2023?").await;
	let fact = &response.facts[0].fact;

	assert!(!fact.is_resolved());
	assert_eq!(fact.year, Some(2023));
	assert_eq!(fact.missing.as_deref(), Some("TRANSACTION.amount (spend) for 2023"));
}

#[tokio::test]
async fn interest_this_year_sums_the_monthly_aggregates() {
	let service =
		acceptance::loaded_service(acceptance::test_config(), acceptance::stub_providers()).await;
	let this_year = acceptance::ask(&service, "How much interest was charged this year?").await;
	let last_year = acceptance::ask(&service, "How much interest was charged in 2024?").await;

	assert_eq!(this_year.facts[0].fact.period_label, "this year");
	assert_eq!(
		this_year.facts[0].fact.source_path,
		Some(SourcePath::AggregateInterestFromStatements)
	);
	assert_eq!(this_year.facts[0].fact.value, Some(FactValue::Amount { amount: 80.6 }));
	assert_eq!(last_year.facts[0].fact.source_path, Some(SourcePath::InterestTransactions));
	assert_eq!(last_year.facts[0].fact.value, Some(FactValue::Amount { amount: 4.5 }));
}

#[tokio::test]
async fn statement_balance_for_a_year_asks_for_a_month() {
	let service =
		acceptance::loaded_service(acceptance::test_config(), acceptance::stub_providers()).await;
	let response = acceptance::ask(&service, "What was my statement balance for 2024?").await;
	let fact = &response.facts[0].fact;

	assert_eq!(fact.intent, IntentKind::Balance);
	assert_eq!(
		fact.missing.as_deref(),
		Some("STATEMENT.endingBalance for a single month of 2024")
	);
}

#[tokio::test]
async fn interest_drivers_cite_the_statement_cycle() {
	let service =
		acceptance::loaded_service(acceptance::test_config(), acceptance::stub_providers()).await;
	let response = acceptance::ask(&service, "Why was I charged interest?").await;
	let fact = &response.facts[0].fact;

	assert_eq!(fact.intent, IntentKind::Interest);
	assert_eq!(fact.source_path, Some(SourcePath::InterestStatementWindow));
	assert_eq!(
		fact.value,
		Some(FactValue::InterestDrivers {
			interest: 42.1,
			period_start: datetime!(2025-08-01 0:00 UTC),
			period_end: datetime!(2025-08-31 0:00 UTC),
			driver_count: 2,
		})
	);
	// The statement, then both August purchases; the interest row itself is not a driver.
	assert_eq!(fact.supporting_chunk_ids.len(), 3);
}

#[tokio::test]
async fn last_interest_charge_is_the_latest_statement() {
	let service =
		acceptance::loaded_service(acceptance::test_config(), acceptance::stub_providers()).await;
	let response = acceptance::ask(&service, "When was I last charged interest?").await;
	let fact = &response.facts[0].fact;

	assert_eq!(fact.source_path, Some(SourcePath::StatementLastInterest));
	assert_eq!(
		fact.value,
		Some(FactValue::Charge { amount: 42.1, date: datetime!(2025-08-31 0:00 UTC) })
	);
	assert_eq!(fact.period.map(|period| period.to_string()).as_deref(), Some("2025-08"));
}

#[tokio::test]
async fn last_posted_transaction_ignores_pending_rows() {
	let service =
		acceptance::loaded_service(acceptance::test_config(), acceptance::stub_providers()).await;
	let response = acceptance::ask(&service, "What was my last posted transaction?").await;
	let fact = &response.facts[0].fact;

	assert_eq!(response.facts.len(), 1);
	assert_eq!(fact.intent, IntentKind::Transaction);
	assert_eq!(
		fact.value,
		Some(FactValue::Transaction {
			amount: Some(15.0),
			date: datetime!(2025-09-12 0:00 UTC),
			merchant: Some("Grocery Co".to_string()),
			transaction_type: Some("REFUND".to_string()),
		})
	);
}
