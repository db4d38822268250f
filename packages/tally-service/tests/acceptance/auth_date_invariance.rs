use tally_domain::SourceRecords;
use tally_service::FactValue;

use crate::acceptance;

fn shifted_auth_dates() -> SourceRecords {
	let mut records = tally_testkit::sample_records().expect("Expected sample records.");
	let far_future =
		tally_testkit::at("2031-01-01T00:00:00Z").expect("Expected a valid timestamp.");

	for transaction in &mut records.transactions {
		transaction.auth_date_time = Some(far_future);
	}
	for payment in &mut records.payments {
		payment.auth_date_time = Some(far_future);
	}

	records
}

#[tokio::test]
async fn auth_dates_never_move_periods_or_timestamps() {
	let original =
		acceptance::loaded_service(acceptance::test_config(), acceptance::stub_providers()).await;
	let shifted = tally_service::AccountService::with_providers(
		acceptance::test_config(),
		acceptance::stub_providers(),
	);

	shifted.reload(&shifted_auth_dates()).await.expect("Expected the shifted records to load.");

	let lhs = original.snapshot().expect("Expected a snapshot.");
	let rhs = shifted.snapshot().expect("Expected a snapshot.");

	assert_eq!(lhs.store.len(), rhs.store.len());

	for (a, b) in lhs.store.chunks().iter().zip(rhs.store.chunks()) {
		assert_eq!(a.id, b.id);
		assert_eq!(a.period, b.period);
		assert_eq!(a.timestamp, b.timestamp);
	}

	assert_eq!(lhs.aggregates.records(), rhs.aggregates.records());
}

#[tokio::test]
async fn auth_dates_never_change_latest_or_spend_windows() {
	let service = tally_service::AccountService::with_providers(
		acceptance::test_config(),
		acceptance::stub_providers(),
	);

	service.reload(&shifted_auth_dates()).await.expect("Expected the shifted records to load.");

	let payment = acceptance::ask(&service, "When was my last payment?").await;
	let august = acceptance::ask(&service, "How much did I spend in August 2025?").await;

	assert_eq!(
		payment.facts[0].fact.value,
		Some(FactValue::Payment {
			amount: Some(200.0),
			date: tally_testkit::at("2025-09-08T00:00:00Z").expect("Expected a valid timestamp."),
		})
	);
	assert_eq!(august.facts[0].fact.value, Some(FactValue::Amount { amount: 112.3 }));
}
