use std::collections::HashSet;

use crate::acceptance;

#[tokio::test]
async fn rebuilds_assign_identical_ids_and_aggregates() {
	let first =
		acceptance::loaded_service(acceptance::test_config(), acceptance::stub_providers()).await;
	let second =
		acceptance::loaded_service(acceptance::test_config(), acceptance::stub_providers()).await;
	let lhs = first.snapshot().expect("Expected a snapshot.");
	let rhs = second.snapshot().expect("Expected a snapshot.");

	assert_eq!(lhs.store.len(), rhs.store.len());

	for (a, b) in lhs.store.chunks().iter().zip(rhs.store.chunks()) {
		assert_eq!((a.id, a.kind, &a.text), (b.id, b.kind, &b.text));
	}

	assert_eq!(lhs.aggregates.records(), rhs.aggregates.records());
}

#[tokio::test]
async fn repeated_answers_are_identical() {
	let service =
		acceptance::loaded_service(acceptance::test_config(), acceptance::stub_providers()).await;
	let query = "What interest and payments did I have last month?";
	let first = acceptance::ask(&service, query).await;
	let second = acceptance::ask(&service, query).await;

	assert_eq!(
		serde_json::to_value(&first).expect("Expected the response to serialize."),
		serde_json::to_value(&second).expect("Expected the response to serialize."),
	);
}

#[tokio::test]
async fn every_cited_chunk_resolves_and_numbers_are_dense() {
	let service =
		acceptance::loaded_service(acceptance::test_config(), acceptance::stub_providers()).await;
	let response = acceptance::ask(
		&service,
		"What was my statement balance and interest last month, and where did I spend the most?",
	)
	.await;

	assert_eq!(response.facts.len(), 3);

	for cited in &response.facts {
		assert!(cited.fact.is_resolved());
		assert_eq!(cited.citations.len(), cited.fact.supporting_chunk_ids.len());

		for chunk_id in &cited.fact.supporting_chunk_ids {
			service.get_chunk(*chunk_id).expect("Expected the supporting chunk to resolve.");
		}
	}

	let numbers = response.evidence.iter().map(|item| item.number).collect::<Vec<_>>();
	let unique = response.evidence.iter().map(|item| item.chunk_id).collect::<HashSet<_>>();

	assert_eq!(numbers, (1..=response.evidence.len() as u32).collect::<Vec<_>>());
	assert_eq!(unique.len(), response.evidence.len());

	for item in &response.evidence {
		let chunk = service.get_chunk(item.chunk_id).expect("Expected the evidence to resolve.");

		assert_eq!(chunk.text, item.text);
	}
}
