//! Immutable, versioned build-time state and the handle that swaps it.

use std::sync::{
	Arc, PoisonError, RwLock,
	atomic::{AtomicU64, Ordering},
};

use time::OffsetDateTime;

use crate::{
	Providers, Result,
	aggregate::{self, AggregateTable},
	lexical::LexicalIndex,
	semantic::SemanticIndex,
	store::ChunkStore,
};
use tally_chunking::SegmentConfig;
use tally_config::Config;
use tally_domain::SourceRecords;

/// Everything a query reads. Never mutated after `build` returns.
#[derive(Debug)]
pub struct Snapshot {
	pub version: u64,
	pub built_at: OffsetDateTime,
	pub store: ChunkStore,
	pub aggregates: AggregateTable,
	pub lexical: LexicalIndex,
	pub semantic: SemanticIndex,
}
impl Snapshot {
	pub async fn build(
		records: &SourceRecords,
		cfg: &Config,
		providers: &Providers,
		version: u64,
		built_at: OffsetDateTime,
	) -> Result<Self> {
		let mut store = ChunkStore::build(records, &SegmentConfig::default())?;
		let mut aggregates = AggregateTable::derive(&store, &aggregate::default_metrics());

		aggregates.materialize(&mut store)?;

		let lexical = LexicalIndex::build(&store, &cfg.retrieval.lexical);
		let semantic = SemanticIndex::build(&store, cfg, providers).await?;

		tracing::info!(
			version,
			chunks = store.len(),
			aggregates = aggregates.len(),
			vocabulary = lexical.vocabulary_len(),
			semantic_available = semantic.is_available(),
			embedding_source = ?semantic.source(),
			"Snapshot built."
		);

		Ok(Self { version, built_at, store, aggregates, lexical, semantic })
	}
}

/// Holds the active snapshot. Readers clone the `Arc` and keep it for the whole query; a rebuild
/// is prepared off to the side and published with a single pointer swap.
#[derive(Debug, Default)]
pub struct SnapshotHandle {
	active: RwLock<Option<Arc<Snapshot>>>,
	next_version: AtomicU64,
	writer: tokio::sync::Mutex<()>,
}
impl SnapshotHandle {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn current(&self) -> Option<Arc<Snapshot>> {
		self.active.read().unwrap_or_else(PoisonError::into_inner).clone()
	}

	/// Builds a snapshot from `records` and makes it active. Rebuilds are serialized; a failed
	/// build leaves the previous snapshot in place.
	pub async fn rebuild(
		&self,
		records: &SourceRecords,
		cfg: &Config,
		providers: &Providers,
	) -> Result<Arc<Snapshot>> {
		let _writer = self.writer.lock().await;
		let version = self.next_version.fetch_add(1, Ordering::SeqCst) + 1;
		let snapshot = Arc::new(
			Snapshot::build(records, cfg, providers, version, OffsetDateTime::now_utc()).await?,
		);

		self.publish(snapshot.clone());

		Ok(snapshot)
	}

	fn publish(&self, snapshot: Arc<Snapshot>) {
		let version = snapshot.version;
		let previous = self
			.active
			.write()
			.unwrap_or_else(PoisonError::into_inner)
			.replace(snapshot)
			.map(|previous| previous.version);

		tracing::info!(version, ?previous, "Snapshot swapped.");
	}
}
