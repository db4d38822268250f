//! Fixtures shared by the workspace's tests.

mod error;

pub use error::{Error, Result};

use serde_json::Value;
use time::OffsetDateTime;

use tally_config::{Config, EmbeddingProviderConfig, ProviderConfig};
use tally_domain::SourceRecords;

const SAMPLE_RECORDS: &str = include_str!("../fixtures/sample_records.json");

/// One account across 2024-03, 2025-07, 2025-08 and 2025-09, with an agreement excerpt.
pub fn sample_records() -> Result<SourceRecords> {
	Ok(serde_json::from_str(SAMPLE_RECORDS)?)
}

pub fn records(value: Value) -> Result<SourceRecords> {
	Ok(serde_json::from_value(value)?)
}

/// Lenient timestamp parsing, as used for record dates.
pub fn at(raw: &str) -> Result<OffsetDateTime> {
	tally_domain::time_serde::parse_lenient(raw)
		.ok_or_else(|| Error::Message(format!("Failed to parse timestamp {raw:?}.")))
}

/// Local hashing embeddings and no rerank provider.
pub fn offline_config() -> Config {
	let mut cfg = Config::default();

	cfg.rerank.enabled = false;

	cfg
}

/// Both providers pointed at an unroutable endpoint; tests swap in stub providers.
pub fn provider_config(dimensions: u32) -> Config {
	let mut cfg = Config::default();

	cfg.providers.embedding = Some(EmbeddingProviderConfig {
		provider_id: "stub-embedding".to_string(),
		api_base: "http://127.0.0.1:1".to_string(),
		api_key: "test-key".to_string(),
		path: "/embeddings".to_string(),
		model: "stub-embed".to_string(),
		dimensions,
		timeout_ms: 1_000,
		default_headers: Default::default(),
	});
	cfg.providers.rerank = Some(ProviderConfig {
		provider_id: "stub-rerank".to_string(),
		api_base: "http://127.0.0.1:1".to_string(),
		api_key: "test-key".to_string(),
		path: "/rerank".to_string(),
		model: "stub-rerank".to_string(),
		timeout_ms: 1_000,
		default_headers: Default::default(),
	});

	cfg
}
