use tally_service::{FactValue, SourcePath};

use crate::acceptance;

#[tokio::test]
async fn payments_in_a_named_month_use_the_aggregate() {
	let service =
		acceptance::loaded_service(acceptance::test_config(), acceptance::stub_providers()).await;
	let response = acceptance::ask(&service, "What payments did I make in August 2025?").await;
	let cited = &response.facts[0];

	assert_eq!(cited.fact.source_path, Some(SourcePath::AggregatePaymentsTotal));
	assert_eq!(cited.fact.value, Some(FactValue::Amount { amount: 150.0 }));
}

#[tokio::test]
async fn last_payment_is_the_latest_payment_date() {
	let service =
		acceptance::loaded_service(acceptance::test_config(), acceptance::stub_providers()).await;
	let response = acceptance::ask(&service, "When was my last payment?").await;
	let cited = &response.facts[0];

	assert_eq!(cited.fact.source_path, Some(SourcePath::LatestPayment));
	assert_eq!(
		cited.fact.value,
		Some(FactValue::Payment {
			amount: Some(200.0),
			date: tally_testkit::at("2025-09-08T00:00:00Z").expect("Expected a valid timestamp."),
		})
	);
}
