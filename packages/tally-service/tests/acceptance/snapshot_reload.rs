use tally_domain::{ChunkId, SourceRecords};
use tally_service::{AccountService, AnswerRequest, Error};

use crate::acceptance;

#[tokio::test]
async fn reload_swaps_while_held_snapshots_stay_intact() {
	let service =
		acceptance::loaded_service(acceptance::test_config(), acceptance::stub_providers()).await;
	let held = service.snapshot().expect("Expected a snapshot.");
	let records = tally_testkit::records(serde_json::json!({
		"accountSummary": [{ "accountId": "acct-7781", "accountStatus": "CLOSED" }]
	}))
	.expect("Expected records to parse.");
	let version = service.reload(&records).await.expect("Expected the reload to succeed.");

	assert_eq!(held.version, 1);
	assert_eq!(version, 2);
	assert!(held.store.len() > 1);
	assert_eq!(service.snapshot().expect("Expected a snapshot.").store.len(), 1);

	let response = acceptance::ask(&service, "What is my account status?").await;

	assert_eq!(response.version, 2);
	assert_eq!(
		response.facts[0].fact.value,
		Some(tally_service::FactValue::Text { text: "CLOSED".to_string() })
	);
}

#[tokio::test]
async fn failed_reload_keeps_the_previous_snapshot() {
	let service =
		acceptance::loaded_service(acceptance::test_config(), acceptance::stub_providers()).await;
	let err = service
		.reload(&SourceRecords::default())
		.await
		.expect_err("Expected empty records to be rejected.");

	assert!(matches!(err, Error::InvalidData { .. }));
	assert_eq!(service.snapshot().expect("Expected a snapshot.").version, 1);
}

#[tokio::test]
async fn requests_are_validated() {
	let empty =
		AccountService::with_providers(acceptance::test_config(), acceptance::stub_providers());
	let err = empty
		.answer(AnswerRequest { query: "What is my balance?".to_string(), now: None })
		.await
		.expect_err("Expected an error without loaded data.");

	assert!(matches!(err, Error::InvalidRequest { .. }));

	let service =
		acceptance::loaded_service(acceptance::test_config(), acceptance::stub_providers()).await;
	let err = service
		.answer(AnswerRequest { query: "   ".to_string(), now: None })
		.await
		.expect_err("Expected a blank query to be rejected.");

	assert!(matches!(err, Error::InvalidRequest { .. }));
	assert!(matches!(service.get_chunk(ChunkId(9_999)), Err(Error::NotFound { .. })));
}

#[tokio::test]
async fn concurrent_queries_share_one_snapshot() {
	let service =
		acceptance::loaded_service(acceptance::test_config(), acceptance::stub_providers()).await;
	let (lhs, rhs) = tokio::join!(
		acceptance::ask(&service, "Where did I spend the most this month?"),
		acceptance::ask(&service, "Where did I spend the most this month?"),
	);

	assert_eq!(lhs.version, rhs.version);
	assert_eq!(
		serde_json::to_value(&lhs).expect("Expected the response to serialize."),
		serde_json::to_value(&rhs).expect("Expected the response to serialize."),
	);
}
