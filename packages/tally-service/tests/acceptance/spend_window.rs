use tally_domain::IntentKind;
use tally_service::{FactValue, SourcePath};

use crate::acceptance;

#[tokio::test]
async fn top_merchant_this_month() {
	let service =
		acceptance::loaded_service(acceptance::test_config(), acceptance::stub_providers()).await;
	let response = acceptance::ask(&service, "Where did I spend the most this month?").await;
	let cited = &response.facts[0];

	assert_eq!(cited.fact.intent, IntentKind::Spend);
	assert_eq!(cited.fact.period_label, "this month");
	assert_eq!(cited.fact.source_path, Some(SourcePath::TopMerchant));
	assert_eq!(
		cited.fact.value,
		Some(FactValue::Merchant { name: "Dunkin' Mobile AP".to_string(), total: 45.0 })
	);
	assert_eq!(cited.fact.supporting_chunk_ids.len(), 2);
	assert_eq!(cited.citations, vec![1, 2]);
}

#[tokio::test]
async fn month_to_date_total_skips_credits_and_future_rows() {
	let service =
		acceptance::loaded_service(acceptance::test_config(), acceptance::stub_providers()).await;
	let response = acceptance::ask(&service, "How much did I spend this month?").await;
	let cited = &response.facts[0];

	assert_eq!(cited.fact.source_path, Some(SourcePath::SpendTotal));
	assert_eq!(cited.fact.value, Some(FactValue::Amount { amount: 85.0 }));
	assert_eq!(cited.fact.supporting_chunk_ids.len(), 3);
}

#[tokio::test]
async fn named_month_total_excludes_interest() {
	let service =
		acceptance::loaded_service(acceptance::test_config(), acceptance::stub_providers()).await;
	let response = acceptance::ask(&service, "How much did I spend in August 2025?").await;
	let cited = &response.facts[0];

	assert_eq!(cited.fact.period_label, "2025-08");
	assert_eq!(cited.fact.value, Some(FactValue::Amount { amount: 112.3 }));
}
