mod acceptance {
	mod auth_date_invariance;
	mod balance_resolution;
	mod degradation;
	mod determinism;
	mod interest_precedence;
	mod payment_resolution;
	mod snapshot_reload;
	mod spend_window;
	mod year_and_history;

	use std::{
		sync::{
			Arc,
			atomic::{AtomicUsize, Ordering},
		},
		time::Duration,
	};

	use time::OffsetDateTime;

	use tally_config::{Config, EmbeddingProviderConfig, ProviderConfig};
	use tally_providers::hashing::HashingEmbedder;
	use tally_service::{
		AccountService, AnswerRequest, AnswerResponse, BoxFuture, EmbeddingProvider, Providers,
		RerankProvider,
	};

	pub const DIMENSIONS: u32 = 32;

	pub struct StubEmbedding {
		pub calls: AtomicUsize,
	}
	impl StubEmbedding {
		pub fn new() -> Self {
			Self { calls: AtomicUsize::new(0) }
		}
	}
	impl EmbeddingProvider for StubEmbedding {
		fn embed<'a>(
			&'a self,
			cfg: &'a EmbeddingProviderConfig,
			texts: &'a [String],
		) -> BoxFuture<'a, tally_providers::Result<Vec<Vec<f32>>>> {
			self.calls.fetch_add(1, Ordering::SeqCst);

			Box::pin(async move { Ok(HashingEmbedder::new(cfg.dimensions)?.embed(texts)) })
		}
	}

	pub struct FailingEmbedding;
	impl EmbeddingProvider for FailingEmbedding {
		fn embed<'a>(
			&'a self,
			_: &'a EmbeddingProviderConfig,
			_: &'a [String],
		) -> BoxFuture<'a, tally_providers::Result<Vec<Vec<f32>>>> {
			Box::pin(async {
				Err(tally_providers::Error::InvalidResponse {
					message: "Embedding endpoint returned 503.".to_string(),
				})
			})
		}
	}

	/// Embeds normally for the snapshot build, then stalls on every later call.
	pub struct StallingEmbedding {
		pub calls: AtomicUsize,
	}
	impl StallingEmbedding {
		pub fn new() -> Self {
			Self { calls: AtomicUsize::new(0) }
		}
	}
	impl EmbeddingProvider for StallingEmbedding {
		fn embed<'a>(
			&'a self,
			cfg: &'a EmbeddingProviderConfig,
			texts: &'a [String],
		) -> BoxFuture<'a, tally_providers::Result<Vec<Vec<f32>>>> {
			let call = self.calls.fetch_add(1, Ordering::SeqCst);

			Box::pin(async move {
				if call > 0 {
					tokio::time::sleep(Duration::from_millis(500)).await;
				}

				Ok(HashingEmbedder::new(cfg.dimensions)?.embed(texts))
			})
		}
	}

	/// Scores documents by reverse position, which flips the head of the list.
	pub struct ReversingRerank;
	impl RerankProvider for ReversingRerank {
		fn rerank<'a>(
			&'a self,
			_: &'a ProviderConfig,
			_: &'a str,
			docs: &'a [String],
		) -> BoxFuture<'a, tally_providers::Result<Vec<f32>>> {
			let scores = (0..docs.len()).map(|idx| idx as f32).collect();

			Box::pin(async move { Ok(scores) })
		}
	}

	pub struct FailingRerank;
	impl RerankProvider for FailingRerank {
		fn rerank<'a>(
			&'a self,
			_: &'a ProviderConfig,
			_: &'a str,
			_: &'a [String],
		) -> BoxFuture<'a, tally_providers::Result<Vec<f32>>> {
			Box::pin(async {
				Err(tally_providers::Error::InvalidResponse {
					message: "Rerank endpoint returned 500.".to_string(),
				})
			})
		}
	}

	pub struct SlowRerank;
	impl RerankProvider for SlowRerank {
		fn rerank<'a>(
			&'a self,
			_: &'a ProviderConfig,
			_: &'a str,
			docs: &'a [String],
		) -> BoxFuture<'a, tally_providers::Result<Vec<f32>>> {
			Box::pin(async move {
				tokio::time::sleep(Duration::from_millis(500)).await;

				Ok(vec![1.0; docs.len()])
			})
		}
	}

	/// Stub providers wired to a config that names both collaborators.
	pub fn test_config() -> Config {
		tally_testkit::provider_config(DIMENSIONS)
	}

	pub fn providers(
		embedding: Arc<dyn EmbeddingProvider>,
		rerank: Arc<dyn RerankProvider>,
	) -> Providers {
		Providers::new(embedding, rerank)
	}

	pub fn stub_providers() -> Providers {
		providers(Arc::new(StubEmbedding::new()), Arc::new(ReversingRerank))
	}

	pub async fn loaded_service(cfg: Config, providers: Providers) -> AccountService {
		let service = AccountService::with_providers(cfg, providers);
		let records = tally_testkit::sample_records().expect("Expected sample records.");

		service.reload(&records).await.expect("Expected the sample records to load.");

		service
	}

	pub fn now() -> OffsetDateTime {
		tally_testkit::at("2025-09-15T12:00:00Z").expect("Expected a valid timestamp.")
	}

	pub async fn ask(service: &AccountService, query: &str) -> AnswerResponse {
		service
			.answer(AnswerRequest { query: query.to_string(), now: Some(now()) })
			.await
			.expect("Expected an answer.")
	}
}
