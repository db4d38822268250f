//! Cross-encoder style rerank endpoint (`results[].index` + `relevance_score`).

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::{Error, Result};

pub async fn rerank(
	cfg: &tally_config::ProviderConfig,
	query: &str,
	docs: &[String],
) -> Result<Vec<f32>> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({ "model": cfg.model, "query": query, "documents": docs });
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;
	let scores = parse_rerank_response(json, docs.len())?;

	tracing::debug!(
		provider_id = %cfg.provider_id,
		model = %cfg.model,
		documents = docs.len(),
		"Rerank call finished."
	);

	Ok(scores)
}

/// Every document must receive exactly one score; partial answers are rejected.
fn parse_rerank_response(json: Value, doc_count: usize) -> Result<Vec<f32>> {
	let results = json.get("results").or_else(|| json.get("data")).and_then(|v| v.as_array());
	let Some(results) = results else {
		return Err(Error::InvalidResponse {
			message: "Rerank response is missing results array.".to_string(),
		});
	};

	if results.len() != doc_count {
		return Err(Error::InvalidResponse {
			message: format!("Rerank response has {} scores for {doc_count} documents.", results.len()),
		});
	}

	let mut scores: Vec<Option<f32>> = vec![None; doc_count];

	for item in results {
		let index = item.get("index").and_then(|v| v.as_u64()).ok_or_else(|| {
			Error::InvalidResponse { message: "Rerank result is missing index.".to_string() }
		})? as usize;
		let score = item
			.get("relevance_score")
			.or_else(|| item.get("score"))
			.and_then(|v| v.as_f64())
			.ok_or_else(|| Error::InvalidResponse {
				message: "Rerank result is missing score.".to_string(),
			})? as f32;
		let Some(slot) = scores.get_mut(index) else {
			return Err(Error::InvalidResponse {
				message: format!("Rerank result index {index} is out of range."),
			});
		};

		if slot.replace(score).is_some() {
			return Err(Error::InvalidResponse {
				message: format!("Rerank result index {index} is duplicated."),
			});
		}
	}

	Ok(scores.into_iter().flatten().collect())
}
