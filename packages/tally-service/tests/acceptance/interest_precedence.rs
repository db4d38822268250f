use tally_domain::{ChunkKind, IntentKind, fields};
use tally_service::{FactValue, SourcePath};

use crate::acceptance;

#[tokio::test]
async fn aggregate_is_the_only_interest_source_when_present() {
	let service =
		acceptance::loaded_service(acceptance::test_config(), acceptance::stub_providers()).await;
	let response = acceptance::ask(&service, "How much interest was charged in 2025-08?").await;

	assert_eq!(response.facts.len(), 1);

	let cited = &response.facts[0];

	assert_eq!(cited.fact.intent, IntentKind::Interest);
	assert_eq!(cited.fact.value, Some(FactValue::Amount { amount: 42.1 }));
	assert_eq!(cited.fact.source_path, Some(SourcePath::AggregateInterestFromStatements));
	assert_eq!(cited.fact.supporting_chunk_ids.len(), 1);
	assert_eq!(cited.citations, vec![1]);

	let chunk = service
		.get_chunk(cited.fact.supporting_chunk_ids[0])
		.expect("Expected the supporting chunk to resolve.");

	assert_eq!(chunk.kind, ChunkKind::Aggregate);
	assert!(chunk.text.contains("metric=interest_from_statements_total"));
	assert_eq!(response.evidence[0].chunk_id, chunk.id);
	assert_eq!(response.evidence[0].number, 1);
}

#[tokio::test]
async fn interest_transactions_are_summed_when_nothing_else_exists() {
	let service =
		acceptance::loaded_service(acceptance::test_config(), acceptance::stub_providers()).await;
	let response = acceptance::ask(&service, "What interest did I pay in March 2024?").await;
	let cited = &response.facts[0];

	assert_eq!(cited.fact.value, Some(FactValue::Amount { amount: 4.5 }));
	assert_eq!(cited.fact.source_path, Some(SourcePath::InterestTransactions));
	assert_eq!(cited.fact.period_label, "2024-03");

	let ids = cited
		.fact
		.supporting_chunk_ids
		.iter()
		.map(|chunk_id| {
			let chunk = service.get_chunk(*chunk_id).expect("Expected the chunk to resolve.");

			chunk.text_field(fields::TRANSACTION_ID).map(str::to_string)
		})
		.collect::<Vec<_>>();

	assert_eq!(
		ids,
		vec![
			Some("txn-2403-1".to_string()),
			Some("txn-2403-2".to_string()),
			Some("txn-2403-3".to_string()),
		]
	);
	assert_eq!(cited.citations, vec![1, 2, 3]);
}

#[tokio::test]
async fn unqualified_interest_resolves_the_latest_period() {
	let service =
		acceptance::loaded_service(acceptance::test_config(), acceptance::stub_providers()).await;
	let response = acceptance::ask(&service, "How much interest was I charged?").await;
	let cited = &response.facts[0];

	assert_eq!(cited.fact.period_label, "latest");
	assert_eq!(cited.fact.period, Some("2025-08".parse().expect("Expected a valid period.")));
	assert_eq!(cited.fact.value, Some(FactValue::Amount { amount: 42.1 }));
}

#[tokio::test]
async fn rate_questions_do_not_trigger_interest_resolution() {
	let service =
		acceptance::loaded_service(acceptance::test_config(), acceptance::stub_providers()).await;
	let response = acceptance::ask(&service, "What is my interest rate?").await;

	assert!(response.facts.is_empty());
	assert!(response.ambiguity.is_some());
	assert!(!response.evidence.is_empty());
}
