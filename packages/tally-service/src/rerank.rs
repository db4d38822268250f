//! Fail-open rerank of the fused shortlist.

use std::time::Duration;

use crate::{Degradation, Providers, fusion::RetrievalResult, store::ChunkStore};
use tally_config::Config;

pub struct RerankOutcome {
	pub results: Vec<RetrievalResult>,
	pub degradation: Option<Degradation>,
}

/// Reorders the top `rerank.top_k` results by collaborator score; the rest keep their order
/// after the head. Any collaborator problem leaves the input order intact and reports a
/// degradation instead.
pub async fn apply(
	results: Vec<RetrievalResult>,
	query: &str,
	store: &ChunkStore,
	cfg: &Config,
	providers: &Providers,
) -> RerankOutcome {
	if !cfg.rerank.enabled || results.is_empty() {
		return RerankOutcome { results, degradation: None };
	}

	let Some(provider_cfg) = cfg.providers.rerank.as_ref() else {
		return degraded(results, "No rerank provider is configured.".to_string());
	};
	let head_len = (cfg.rerank.top_k as usize).min(results.len());
	let docs = results[..head_len]
		.iter()
		.map(|result| store.get(result.chunk_id).map(|chunk| chunk.text.clone()))
		.collect::<Result<Vec<_>, _>>();
	let docs = match docs {
		Ok(docs) => docs,
		Err(err) => return degraded(results, err.to_string()),
	};
	let timeout = Duration::from_millis(provider_cfg.timeout_ms);
	let scores =
		match tokio::time::timeout(timeout, providers.rerank.rerank(provider_cfg, query, &docs))
			.await
		{
			Ok(Ok(scores)) => scores,
			Ok(Err(err)) => return degraded(results, err.to_string()),
			Err(_) => {
				let message =
					format!("Rerank provider timed out after {} ms.", provider_cfg.timeout_ms);

				return degraded(results, message);
			},
		};

	if scores.len() != head_len {
		let message =
			format!("Rerank provider returned {} scores for {head_len} documents.", scores.len());

		return degraded(results, message);
	}

	let mut results = results;
	let tail = results.split_off(head_len);
	let mut head = results;

	for (result, score) in head.iter_mut().zip(scores) {
		result.rerank_score = Some(score);
	}

	head.sort_by(|a, b| {
		crate::cmp_f32_desc(a.rerank_score.unwrap_or(f32::NAN), b.rerank_score.unwrap_or(f32::NAN))
	});
	head.extend(tail);

	tracing::debug!(reranked = head_len, "Applied rerank.");

	RerankOutcome { results: head, degradation: None }
}

fn degraded(results: Vec<RetrievalResult>, message: String) -> RerankOutcome {
	tracing::warn!(reason = %message, "Rerank skipped. Keeping pre-rerank order.");

	RerankOutcome { results, degradation: Some(Degradation::RerankUnavailable { message }) }
}
