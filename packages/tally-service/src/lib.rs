pub mod aggregate;
pub mod citation;
pub mod freshness;
pub mod fusion;
pub mod lexical;
pub mod pipeline;
pub mod rerank;
pub mod resolve;
pub mod semantic;
pub mod snapshot;
pub mod store;
pub mod text;

mod error;

pub use aggregate::{AggregateRecord, AggregateTable, MetricDefinition, Reducer};
pub use citation::Citation;
pub use error::{Error, Result};
pub use fusion::{FusionWeights, Normalization, RetrievalResult};
pub use pipeline::{AccountService, AnswerRequest, AnswerResponse, CitedFact, EvidenceItem};
pub use resolve::{FactValue, ResolvedFact, SourcePath};
pub use snapshot::{Snapshot, SnapshotHandle};
pub use store::ChunkStore;

use std::{cmp::Ordering, future::Future, pin::Pin, sync::Arc};

use serde::Serialize;

use tally_config::{EmbeddingProviderConfig, ProviderConfig};
use tally_providers::{embedding, rerank as rerank_api};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, tally_providers::Result<Vec<Vec<f32>>>>;
}

pub trait RerankProvider
where
	Self: Send + Sync,
{
	fn rerank<'a>(
		&'a self,
		cfg: &'a ProviderConfig,
		query: &'a str,
		docs: &'a [String],
	) -> BoxFuture<'a, tally_providers::Result<Vec<f32>>>;
}

/// A collaborator outage that was absorbed while answering.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Degradation {
	EmbeddingUnavailable { message: String },
	RerankUnavailable { message: String },
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub rerank: Arc<dyn RerankProvider>,
}
impl Providers {
	pub fn new(embedding: Arc<dyn EmbeddingProvider>, rerank: Arc<dyn RerankProvider>) -> Self {
		Self { embedding, rerank }
	}
}
impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { embedding: provider.clone(), rerank: provider }
	}
}

struct DefaultProviders;
impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, tally_providers::Result<Vec<Vec<f32>>>> {
		Box::pin(embedding::embed(cfg, texts))
	}
}
impl RerankProvider for DefaultProviders {
	fn rerank<'a>(
		&'a self,
		cfg: &'a ProviderConfig,
		query: &'a str,
		docs: &'a [String],
	) -> BoxFuture<'a, tally_providers::Result<Vec<f32>>> {
		Box::pin(rerank_api::rerank(cfg, query, docs))
	}
}

/// Descending order that sorts NaN last.
pub fn cmp_f32_desc(a: f32, b: f32) -> Ordering {
	match (a.is_nan(), b.is_nan()) {
		(true, true) => Ordering::Equal,
		(true, false) => Ordering::Greater,
		(false, true) => Ordering::Less,
		(false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
	}
}
