use tally_service::{Error, FactValue, SourcePath};

use crate::acceptance;

#[tokio::test]
async fn missing_statement_is_reported_not_guessed() {
	let service =
		acceptance::loaded_service(acceptance::test_config(), acceptance::stub_providers()).await;
	let response =
		acceptance::ask(&service, "What was my statement balance for January 2023?").await;
	let cited = &response.facts[0];

	assert_eq!(cited.fact.value, None);
	assert_eq!(cited.fact.source_path, None);
	assert!(cited.citations.is_empty());

	match response.first_unresolved() {
		Some(Error::UnresolvedFact { missing }) => {
			assert_eq!(missing, "STATEMENT.endingBalance for 2023-01");
		},
		other => panic!("Expected an unresolved fact, got {other:?}."),
	}
}

#[tokio::test]
async fn last_month_statement_balance() {
	let service =
		acceptance::loaded_service(acceptance::test_config(), acceptance::stub_providers()).await;
	let response = acceptance::ask(&service, "What was my statement balance last month?").await;
	let cited = &response.facts[0];

	assert_eq!(cited.fact.period_label, "last month");
	assert_eq!(cited.fact.source_path, Some(SourcePath::StatementEndingBalance));
	assert_eq!(cited.fact.value, Some(FactValue::Amount { amount: 812.4 }));
	assert!(response.first_unresolved().is_none());
}

#[tokio::test]
async fn current_balance_reads_the_account_summary() {
	let service =
		acceptance::loaded_service(acceptance::test_config(), acceptance::stub_providers()).await;
	let response = acceptance::ask(&service, "What is my current balance and status?").await;

	assert_eq!(response.facts.len(), 2);
	assert_eq!(response.facts[0].fact.source_path, Some(SourcePath::AccountCurrentBalance));
	assert_eq!(response.facts[0].fact.value, Some(FactValue::Amount { amount: 905.15 }));
	assert_eq!(response.facts[1].fact.source_path, Some(SourcePath::AccountStatus));
	assert_eq!(
		response.facts[1].fact.value,
		Some(FactValue::Text { text: "ACTIVE".to_string() })
	);
	// Both facts cite the same account chunk under one number.
	assert_eq!(response.facts[0].citations, vec![1]);
	assert_eq!(response.facts[1].citations, vec![1]);
}
