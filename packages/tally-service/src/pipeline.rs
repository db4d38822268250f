//! The query pipeline: analysis, retrieval, fusion, freshness, rerank, resolution, citations.

use std::sync::Arc;

use serde::Serialize;
use time::OffsetDateTime;

use crate::{
	Degradation, Error, Providers, Result,
	citation::{self, Citation},
	freshness,
	fusion::{self, FusionWeights, Normalization, RetrievalResult},
	rerank,
	resolve::{self, ResolveContext, ResolvedFact},
	snapshot::{Snapshot, SnapshotHandle},
};
use tally_config::Config;
use tally_domain::{Chunk, ChunkId, ChunkKind, Period, SourceRecords, intent};

#[derive(Clone, Debug)]
pub struct AnswerRequest {
	pub query: String,
	/// Query time; defaults to the wall clock.
	pub now: Option<OffsetDateTime>,
}

#[derive(Clone, Debug, Serialize)]
pub struct AnswerResponse {
	pub version: u64,
	pub query: String,
	pub evidence: Vec<EvidenceItem>,
	pub facts: Vec<CitedFact>,
	pub degradations: Vec<Degradation>,
	pub ambiguity: Option<String>,
}
impl AnswerResponse {
	/// The first fact that could not be resolved, as an error.
	pub fn first_unresolved(&self) -> Option<Error> {
		self.facts.iter().find_map(|cited| {
			cited.fact.missing.clone().map(|missing| Error::UnresolvedFact { missing })
		})
	}
}

#[derive(Clone, Debug, Serialize)]
pub struct EvidenceItem {
	pub number: u32,
	pub chunk_id: ChunkId,
	pub kind: ChunkKind,
	pub period: Option<Period>,
	pub text: String,
	/// Absent for chunks cited only as fact support.
	pub scores: Option<RetrievalResult>,
}

#[derive(Clone, Debug, Serialize)]
pub struct CitedFact {
	#[serde(flatten)]
	pub fact: ResolvedFact,
	pub citations: Vec<u32>,
}

pub struct AccountService {
	pub cfg: Config,
	pub providers: Providers,
	snapshots: SnapshotHandle,
}
impl AccountService {
	pub fn new(cfg: Config) -> Self {
		Self::with_providers(cfg, Providers::default())
	}

	pub fn with_providers(cfg: Config, providers: Providers) -> Self {
		Self { cfg, providers, snapshots: SnapshotHandle::new() }
	}

	/// Rebuilds every index from `records` and swaps the result in. Returns the new version.
	pub async fn reload(&self, records: &SourceRecords) -> Result<u64> {
		let snapshot = self.snapshots.rebuild(records, &self.cfg, &self.providers).await?;

		Ok(snapshot.version)
	}

	pub fn snapshot(&self) -> Result<Arc<Snapshot>> {
		self.snapshots.current().ok_or_else(|| Error::InvalidRequest {
			message: "No account data is loaded.".to_string(),
		})
	}

	pub fn get_chunk(&self, chunk_id: ChunkId) -> Result<Chunk> {
		self.snapshot()?.store.get(chunk_id).cloned()
	}

	pub async fn answer(&self, req: AnswerRequest) -> Result<AnswerResponse> {
		let query = req.query.trim();

		if query.is_empty() {
			return Err(Error::InvalidRequest { message: "query must be non-empty.".to_string() });
		}

		let snapshot = self.snapshot()?;
		let now = req.now.unwrap_or_else(OffsetDateTime::now_utc);
		let analysis = intent::analyze(query);

		tracing::debug!(
			version = snapshot.version,
			hint = ?analysis.hint,
			intents = analysis.intents.len(),
			"Analyzed query."
		);

		let mut degradations = Vec::new();
		let lexical = snapshot.lexical.score(query);
		let semantic = match snapshot.semantic.search(query, &self.cfg, &self.providers).await {
			Ok(scores) => Some(scores),
			Err(err) => {
				tracing::warn!(
					error = %err,
					"Semantic retrieval unavailable. Ranking lexical-only."
				);

				let message = match err {
					Error::EmbeddingUnavailable { message } => message,
					other => other.to_string(),
				};

				degradations.push(Degradation::EmbeddingUnavailable { message });

				None
			},
		};

		tracing::debug!(
			lexical = lexical.len(),
			semantic = semantic.as_ref().map(Vec::len),
			"Scored candidates."
		);

		let retrieval = &self.cfg.retrieval;
		let weights =
			FusionWeights { lexical: retrieval.lexical_weight, semantic: retrieval.semantic_weight };
		let fused = fusion::fuse(
			&lexical,
			semantic.as_deref(),
			weights,
			Normalization::parse(&retrieval.normalization)?,
			retrieval.candidate_k as usize,
		);
		let anchor = freshness::anchor_for(analysis.hint, now);
		let adjusted = freshness::adjust(fused, &snapshot.store, anchor, &self.cfg.freshness);

		tracing::debug!(candidates = adjusted.len(), ?anchor, "Fused and re-weighted candidates.");

		let outcome =
			rerank::apply(adjusted, query, &snapshot.store, &self.cfg, &self.providers).await;

		degradations.extend(outcome.degradation);

		let mut results = outcome.results;

		results.truncate(retrieval.final_k as usize);

		let ctx = ResolveContext {
			store: &snapshot.store,
			aggregates: &snapshot.aggregates,
			now,
			allow_running_balance_fallback: self.cfg.resolution.allow_running_balance_fallback,
		};
		let facts = analysis
			.intents
			.iter()
			.map(|intent| resolve::resolve(intent, &ctx))
			.collect::<Vec<_>>();
		let citations = citation::assemble(&results, &facts);
		let evidence = evidence_items(&snapshot, &citations, &results)?;
		let facts = facts
			.into_iter()
			.map(|fact| CitedFact {
				citations: citation::numbers_for(&citations, &fact.supporting_chunk_ids),
				fact,
			})
			.collect::<Vec<_>>();
		let ambiguity = analysis.intents.is_empty().then(|| {
			Error::AmbiguousIntent {
				message: "No supported intent detected. Returning retrieved evidence only."
					.to_string(),
			}
			.to_string()
		});

		tracing::debug!(
			evidence = evidence.len(),
			facts = facts.len(),
			degradations = degradations.len(),
			"Assembled answer."
		);

		Ok(AnswerResponse {
			version: snapshot.version,
			query: query.to_string(),
			evidence,
			facts,
			degradations,
			ambiguity,
		})
	}
}

fn evidence_items(
	snapshot: &Snapshot,
	citations: &[Citation],
	results: &[RetrievalResult],
) -> Result<Vec<EvidenceItem>> {
	citations
		.iter()
		.map(|citation| {
			let chunk = snapshot.store.get(citation.chunk_id)?;

			Ok(EvidenceItem {
				number: citation.number,
				chunk_id: chunk.id,
				kind: chunk.kind,
				period: chunk.period,
				text: chunk.text.clone(),
				scores: results.iter().find(|result| result.chunk_id == chunk.id).cloned(),
			})
		})
		.collect()
}
