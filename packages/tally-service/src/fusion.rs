use std::collections::BTreeMap;

use serde::Serialize;

use crate::{Error, Result};
use tally_domain::ChunkId;

/// Scores of one chunk as it moves through the ranking stages. `lexical_score` and
/// `semantic_score` are the normalized signals that went into `fused_score`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RetrievalResult {
	pub chunk_id: ChunkId,
	pub lexical_score: f32,
	pub semantic_score: f32,
	pub fused_score: f32,
	pub freshness_adjusted_score: f32,
	pub rerank_score: Option<f32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Normalization {
	MinMax,
	Rank,
}
impl Normalization {
	pub fn parse(value: &str) -> Result<Self> {
		match value.trim().to_ascii_lowercase().as_str() {
			"min_max" => Ok(Self::MinMax),
			"rank" => Ok(Self::Rank),
			other => Err(Error::InvalidRequest {
				message: format!("Unknown normalization {other:?}; expected min_max or rank."),
			}),
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::MinMax => "min_max",
			Self::Rank => "rank",
		}
	}
}

#[derive(Clone, Copy, Debug)]
pub struct FusionWeights {
	pub lexical: f32,
	pub semantic: f32,
}

/// Weighted combination of independently normalized lists.
///
/// `semantic = None` means the signal is unavailable for the whole query; fusion then runs
/// lexical-only with weight 1. Output is sorted by fused score, ties by chunk id, and truncated
/// to `candidate_k`.
pub fn fuse(
	lexical: &[(ChunkId, f32)],
	semantic: Option<&[(ChunkId, f32)]>,
	weights: FusionWeights,
	normalization: Normalization,
	candidate_k: usize,
) -> Vec<RetrievalResult> {
	let weights = match semantic {
		Some(_) => weights,
		None => FusionWeights { lexical: 1.0, semantic: 0.0 },
	};
	let mut signals: BTreeMap<ChunkId, (f32, f32)> = BTreeMap::new();

	for (chunk_id, score) in normalize(lexical, normalization) {
		signals.entry(chunk_id).or_default().0 = score;
	}
	for (chunk_id, score) in normalize(semantic.unwrap_or_default(), normalization) {
		signals.entry(chunk_id).or_default().1 = score;
	}

	let mut results = signals
		.into_iter()
		.map(|(chunk_id, (lexical_score, semantic_score))| {
			let fused_score = weights.lexical * lexical_score + weights.semantic * semantic_score;

			RetrievalResult {
				chunk_id,
				lexical_score,
				semantic_score,
				fused_score,
				freshness_adjusted_score: fused_score,
				rerank_score: None,
			}
		})
		.collect::<Vec<_>>();

	results.sort_by(|a, b| {
		crate::cmp_f32_desc(a.fused_score, b.fused_score).then(a.chunk_id.cmp(&b.chunk_id))
	});
	results.truncate(candidate_k);

	results
}

/// Maps raw scores into [0, 1]. Input must already be sorted best first for `Rank`.
pub fn normalize(scores: &[(ChunkId, f32)], normalization: Normalization) -> Vec<(ChunkId, f32)> {
	match normalization {
		Normalization::MinMax => {
			let finite = scores.iter().map(|(_, score)| *score).filter(|score| score.is_finite());
			let (min, max) = finite.fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), score| {
				(lo.min(score), hi.max(score))
			});
			let span = max - min;

			scores
				.iter()
				.map(|(chunk_id, score)| {
					let value = if !score.is_finite() {
						0.0
					} else if span <= f32::EPSILON {
						1.0
					} else {
						((score - min) / span).clamp(0.0, 1.0)
					};

					(*chunk_id, value)
				})
				.collect()
		},
		Normalization::Rank => {
			let total = scores.len() as u32;

			scores
				.iter()
				.enumerate()
				.map(|(idx, (chunk_id, _))| (*chunk_id, rank_normalize(idx as u32 + 1, total)))
				.collect()
		},
	}
}

pub fn rank_normalize(rank: u32, total: u32) -> f32 {
	if total <= 1 {
		return 1.0;
	}
	if rank == 0 {
		return 0.0;
	}

	let denom = (total - 1) as f32;
	let pos = (rank.saturating_sub(1)) as f32;

	(1.0 - pos / denom).clamp(0.0, 1.0)
}
