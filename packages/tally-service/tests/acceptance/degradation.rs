use std::sync::{Arc, atomic::Ordering};

use tally_domain::{ChunkId, Period};
use tally_service::{AnswerResponse, Degradation, semantic::EmbeddingSource};

use crate::acceptance::{
	self, FailingEmbedding, FailingRerank, ReversingRerank, SlowRerank, StallingEmbedding,
	StubEmbedding,
};

/// Evidence contributed by retrieval, skipping chunks cited first as fact support.
fn retrieval_order(response: &AnswerResponse) -> Vec<ChunkId> {
	let support = response
		.facts
		.iter()
		.flat_map(|cited| cited.fact.supporting_chunk_ids.iter().copied())
		.collect::<Vec<_>>();

	response
		.evidence
		.iter()
		.filter(|item| item.scores.is_some() && !support.contains(&item.chunk_id))
		.map(|item| item.chunk_id)
		.collect()
}

#[tokio::test]
async fn embedding_outage_ranks_lexical_only_with_freshness() {
	let mut cfg = acceptance::test_config();

	cfg.rerank.enabled = false;
	cfg.retrieval.final_k = cfg.retrieval.candidate_k;

	let providers = acceptance::providers(Arc::new(FailingEmbedding), Arc::new(ReversingRerank));
	let service = acceptance::loaded_service(cfg, providers).await;
	let response = acceptance::ask(&service, "What was my statement balance last month?").await;

	assert!(matches!(
		response.degradations.as_slice(),
		[Degradation::EmbeddingUnavailable { .. }]
	));
	assert!(!response.evidence.is_empty());

	let order = retrieval_order(&response);
	let scored = order
		.iter()
		.filter_map(|chunk_id| response.evidence.iter().find(|item| item.chunk_id == *chunk_id))
		.filter_map(|item| item.scores.as_ref())
		.collect::<Vec<_>>();

	assert!(!scored.is_empty());
	assert!(scored.iter().all(|scores| scores.semantic_score == 0.0));
	assert!(scored.windows(2).all(|pair| {
		pair[0].freshness_adjusted_score >= pair[1].freshness_adjusted_score
	}));

	let july: Period = "2025-07".parse().expect("Expected a valid period.");
	let august: Period = "2025-08".parse().expect("Expected a valid period.");
	let mut decayed = 0;

	for item in &response.evidence {
		let Some(scores) = item.scores.as_ref() else {
			continue;
		};

		if item.period == Some(august) {
			assert_eq!(scores.freshness_adjusted_score, scores.fused_score);
		}
		if item.period == Some(july) && scores.fused_score > 0.0 {
			assert!(scores.freshness_adjusted_score < scores.fused_score);

			decayed += 1;
		}
	}

	assert!(decayed > 0);

	// Facts never depend on the embedding collaborator.
	assert!(response.first_unresolved().is_none());
	assert_eq!(response.facts.len(), 1);
}

#[tokio::test]
async fn query_embedding_timeout_after_a_good_build_degrades() {
	let mut cfg = acceptance::test_config();

	cfg.rerank.enabled = false;
	cfg.retrieval.final_k = cfg.retrieval.candidate_k;

	if let Some(embedding) = cfg.providers.embedding.as_mut() {
		embedding.timeout_ms = 50;
	}

	let embedding = Arc::new(StallingEmbedding::new());
	let service = acceptance::loaded_service(
		cfg,
		acceptance::providers(embedding.clone(), Arc::new(ReversingRerank)),
	)
	.await;
	let snapshot = service.snapshot().expect("Expected a loaded snapshot.");

	assert!(snapshot.semantic.is_available());
	assert!(matches!(snapshot.semantic.source(), EmbeddingSource::Provider { .. }));

	let response = acceptance::ask(&service, "What was my statement balance last month?").await;

	assert_eq!(embedding.calls.load(Ordering::SeqCst), 2);

	match response.degradations.as_slice() {
		[Degradation::EmbeddingUnavailable { message }] => assert!(message.contains("timed out")),
		other => panic!("Expected one embedding degradation, got {other:?}."),
	}

	let scored =
		response.evidence.iter().filter_map(|item| item.scores.as_ref()).collect::<Vec<_>>();

	assert!(!scored.is_empty());
	assert!(scored.iter().all(|scores| scores.semantic_score == 0.0));

	let july: Period = "2025-07".parse().expect("Expected a valid period.");

	assert!(response.evidence.iter().any(|item| {
		item.period == Some(july)
			&& item.scores.as_ref().is_some_and(|scores| {
				scores.fused_score > 0.0 && scores.freshness_adjusted_score < scores.fused_score
			})
	}));
	assert!(response.first_unresolved().is_none());
}

#[tokio::test]
async fn healthy_embedding_is_called_once_per_build_and_query() {
	let embedding = Arc::new(StubEmbedding::new());
	let service = acceptance::loaded_service(
		acceptance::test_config(),
		acceptance::providers(embedding.clone(), Arc::new(ReversingRerank)),
	)
	.await;

	assert_eq!(embedding.calls.load(Ordering::SeqCst), 1);

	let response = acceptance::ask(&service, "Tell me about late fees on my card").await;

	assert_eq!(embedding.calls.load(Ordering::SeqCst), 2);
	assert!(response.degradations.is_empty());
}

#[tokio::test]
async fn enabled_rerank_without_a_provider_reports_degradation() {
	let mut cfg = acceptance::test_config();

	cfg.providers.rerank = None;

	let service = acceptance::loaded_service(cfg, acceptance::stub_providers()).await;
	let response = acceptance::ask(&service, "Tell me about late fees on my card").await;

	match response.degradations.as_slice() {
		[Degradation::RerankUnavailable { message }] => {
			assert!(message.contains("No rerank provider"))
		},
		other => panic!("Expected one rerank degradation, got {other:?}."),
	}
}

#[tokio::test]
async fn rerank_failure_keeps_the_fused_order() {
	let query = "Tell me about late fees on my card";
	let mut baseline_cfg = acceptance::test_config();

	baseline_cfg.rerank.enabled = false;

	let baseline =
		acceptance::loaded_service(baseline_cfg, acceptance::stub_providers()).await;
	let failing = acceptance::loaded_service(
		acceptance::test_config(),
		acceptance::providers(Arc::new(acceptance::StubEmbedding::new()), Arc::new(FailingRerank)),
	)
	.await;
	let expected = acceptance::ask(&baseline, query).await;
	let degraded = acceptance::ask(&failing, query).await;

	assert!(expected.degradations.is_empty());
	assert!(matches!(
		degraded.degradations.as_slice(),
		[Degradation::RerankUnavailable { .. }]
	));
	assert_eq!(retrieval_order(&degraded), retrieval_order(&expected));
	assert!(
		degraded
			.evidence
			.iter()
			.filter_map(|item| item.scores.as_ref())
			.all(|scores| scores.rerank_score.is_none())
	);
}

#[tokio::test]
async fn rerank_timeout_is_a_failure() {
	let mut cfg = acceptance::test_config();

	if let Some(rerank) = cfg.providers.rerank.as_mut() {
		rerank.timeout_ms = 20;
	}

	let service = acceptance::loaded_service(
		cfg,
		acceptance::providers(Arc::new(acceptance::StubEmbedding::new()), Arc::new(SlowRerank)),
	)
	.await;
	let response = acceptance::ask(&service, "Tell me about late fees on my card").await;

	match response.degradations.as_slice() {
		[Degradation::RerankUnavailable { message }] => assert!(message.contains("timed out")),
		other => panic!("Expected one rerank degradation, got {other:?}."),
	}
}

#[tokio::test]
async fn rerank_reorders_only_the_head() {
	let query = "Tell me about late fees on my card";
	let mut baseline_cfg = acceptance::test_config();

	baseline_cfg.rerank.enabled = false;

	let mut reranked_cfg = acceptance::test_config();

	reranked_cfg.rerank.top_k = 3;

	let baseline =
		acceptance::loaded_service(baseline_cfg, acceptance::stub_providers()).await;
	let reranked =
		acceptance::loaded_service(reranked_cfg, acceptance::stub_providers()).await;
	let expected = retrieval_order(&acceptance::ask(&baseline, query).await);
	let response = acceptance::ask(&reranked, query).await;
	let actual = retrieval_order(&response);

	assert!(response.ambiguity.is_some());
	assert!(expected.len() > 3);
	assert_eq!(actual[..3], [expected[2], expected[1], expected[0]]);
	assert_eq!(actual[3..], expected[3..]);
	assert!(response.evidence[..3].iter().all(|item| {
		item.scores.as_ref().is_some_and(|scores| scores.rerank_score.is_some())
	}));
}
