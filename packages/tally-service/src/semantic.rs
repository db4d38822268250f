//! Cosine-similarity index over chunk embeddings.
//!
//! The index remembers which source embedded the chunks and embeds queries with that source
//! only. A provider failure at build time leaves the index unavailable rather than half-built.

use std::time::Duration;

use serde::Serialize;

use crate::{Error, Providers, Result, store::ChunkStore};
use tally_config::{Config, EmbeddingProviderConfig};
use tally_domain::ChunkId;
use tally_providers::hashing::HashingEmbedder;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EmbeddingSource {
	Provider { provider_id: String, model: String, dimensions: u32 },
	LocalHashing { dimensions: u32 },
}
impl EmbeddingSource {
	pub fn dimensions(&self) -> u32 {
		match self {
			Self::Provider { dimensions, .. } | Self::LocalHashing { dimensions } => *dimensions,
		}
	}
}

#[derive(Clone, Debug)]
pub enum SemanticIndex {
	Ready { source: EmbeddingSource, vectors: Vec<(ChunkId, Vec<f32>)> },
	Unavailable { source: EmbeddingSource, reason: String },
}
impl SemanticIndex {
	pub async fn build(store: &ChunkStore, cfg: &Config, providers: &Providers) -> Result<Self> {
		let texts = store.chunks().iter().map(|chunk| chunk.text.clone()).collect::<Vec<_>>();
		let ids = store.chunks().iter().map(|chunk| chunk.id);

		let Some(provider_cfg) = cfg.providers.embedding.as_ref() else {
			let dimensions = cfg.retrieval.local_embedding_dimensions;
			let embedder = local_embedder(dimensions)?;

			tracing::info!(
				dimensions,
				"No embedding provider configured. Using the local hashing embedder."
			);

			return Ok(Self::Ready {
				source: EmbeddingSource::LocalHashing { dimensions },
				vectors: ids.zip(embedder.embed(&texts)).collect(),
			});
		};
		let source = EmbeddingSource::Provider {
			provider_id: provider_cfg.provider_id.clone(),
			model: provider_cfg.model.clone(),
			dimensions: provider_cfg.dimensions,
		};

		match embed_with_provider(provider_cfg, providers, &texts).await {
			Ok(vectors) => Ok(Self::Ready { source, vectors: ids.zip(vectors).collect() }),
			Err(err) => {
				tracing::warn!(
					error = %err,
					provider_id = %provider_cfg.provider_id,
					"Semantic index is unavailable for this snapshot."
				);

				Ok(Self::Unavailable { source, reason: err.to_string() })
			},
		}
	}

	pub fn source(&self) -> &EmbeddingSource {
		match self {
			Self::Ready { source, .. } | Self::Unavailable { source, .. } => source,
		}
	}

	pub fn is_available(&self) -> bool {
		matches!(self, Self::Ready { .. })
	}

	/// Embeds `query` with the index's own source, then scores every chunk.
	pub async fn search(
		&self,
		query: &str,
		cfg: &Config,
		providers: &Providers,
	) -> Result<Vec<(ChunkId, f32)>> {
		let vector = self.embed_query(query, cfg, providers).await?;

		self.score(&vector)
	}

	pub async fn embed_query(
		&self,
		query: &str,
		cfg: &Config,
		providers: &Providers,
	) -> Result<Vec<f32>> {
		let source = match self {
			Self::Ready { source, .. } => source,
			Self::Unavailable { reason, .. } => {
				return Err(Error::EmbeddingUnavailable { message: reason.clone() });
			},
		};

		match source {
			EmbeddingSource::LocalHashing { dimensions } => {
				Ok(local_embedder(*dimensions)?.embed_one(query))
			},
			EmbeddingSource::Provider { .. } => {
				let Some(provider_cfg) = cfg.providers.embedding.as_ref() else {
					return Err(Error::EmbeddingUnavailable {
						message: "Embedding provider is no longer configured.".to_string(),
					});
				};
				let vectors =
					embed_with_provider(provider_cfg, providers, &[query.to_string()]).await?;

				vectors.into_iter().next().ok_or_else(|| Error::EmbeddingUnavailable {
					message: "Embedding provider returned no vectors.".to_string(),
				})
			},
		}
	}

	/// Cosine similarity against every chunk vector, best first, ties by id ascending.
	pub fn score(&self, query_vector: &[f32]) -> Result<Vec<(ChunkId, f32)>> {
		let (source, vectors) = match self {
			Self::Ready { source, vectors } => (source, vectors),
			Self::Unavailable { reason, .. } => {
				return Err(Error::EmbeddingUnavailable { message: reason.clone() });
			},
		};

		if query_vector.len() != source.dimensions() as usize {
			return Err(Error::EmbeddingUnavailable {
				message: format!(
					"Query vector has {} dimensions; the index expects {}.",
					query_vector.len(),
					source.dimensions()
				),
			});
		}

		let mut scored = vectors
			.iter()
			.filter_map(|(id, vector)| cosine_similarity(query_vector, vector).map(|s| (*id, s)))
			.collect::<Vec<_>>();

		scored.sort_by(|a, b| crate::cmp_f32_desc(a.1, b.1).then(a.0.cmp(&b.0)));

		Ok(scored)
	}
}

pub fn cosine_similarity(lhs: &[f32], rhs: &[f32]) -> Option<f32> {
	if lhs.is_empty() || lhs.len() != rhs.len() {
		return None;
	}

	let mut dot = 0.0_f32;
	let mut lhs_norm = 0.0_f32;
	let mut rhs_norm = 0.0_f32;

	for (l, r) in lhs.iter().zip(rhs.iter()) {
		dot += l * r;
		lhs_norm += l * l;
		rhs_norm += r * r;
	}

	if lhs_norm <= f32::EPSILON || rhs_norm <= f32::EPSILON {
		return None;
	}

	Some((dot / (lhs_norm.sqrt() * rhs_norm.sqrt())).clamp(-1.0, 1.0))
}

fn local_embedder(dimensions: u32) -> Result<HashingEmbedder> {
	HashingEmbedder::new(dimensions).map_err(|err| Error::InvalidData { message: err.to_string() })
}

/// Calls the provider under its timeout and checks the vector count and width.
async fn embed_with_provider(
	cfg: &EmbeddingProviderConfig,
	providers: &Providers,
	texts: &[String],
) -> Result<Vec<Vec<f32>>> {
	let timeout = Duration::from_millis(cfg.timeout_ms);
	let vectors = match tokio::time::timeout(timeout, providers.embedding.embed(cfg, texts)).await
	{
		Ok(Ok(vectors)) => vectors,
		Ok(Err(err)) => return Err(Error::EmbeddingUnavailable { message: err.to_string() }),
		Err(_) => {
			return Err(Error::EmbeddingUnavailable {
				message: format!("Embedding provider timed out after {} ms.", cfg.timeout_ms),
			});
		},
	};

	if vectors.len() != texts.len() {
		return Err(Error::EmbeddingUnavailable {
			message: format!(
				"Embedding provider returned {} vectors for {} texts.",
				vectors.len(),
				texts.len()
			),
		});
	}
	if let Some(vector) = vectors.iter().find(|vector| vector.len() != cfg.dimensions as usize) {
		return Err(Error::EmbeddingUnavailable {
			message: format!(
				"Embedding vector dimension mismatch: expected {}, got {}.",
				cfg.dimensions,
				vector.len()
			),
		});
	}

	Ok(vectors)
}
