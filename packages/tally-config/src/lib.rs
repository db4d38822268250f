mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, EmbeddingProviderConfig, Freshness, LexicalRanking, ProviderConfig, Providers, Rerank,
	Resolution, Retrieval, Service,
};

use std::{fs, path::Path};

const WEIGHT_SUM_TOLERANCE: f32 = 1e-4;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}
	if cfg.retrieval.candidate_k == 0 {
		return Err(Error::Validation {
			message: "retrieval.candidate_k must be greater than zero.".to_string(),
		});
	}
	if cfg.retrieval.final_k == 0 {
		return Err(Error::Validation {
			message: "retrieval.final_k must be greater than zero.".to_string(),
		});
	}
	if cfg.retrieval.final_k > cfg.retrieval.candidate_k {
		return Err(Error::Validation {
			message: "retrieval.final_k must not exceed retrieval.candidate_k.".to_string(),
		});
	}
	if !matches!(cfg.retrieval.normalization.as_str(), "min_max" | "rank") {
		return Err(Error::Validation {
			message: "retrieval.normalization must be one of min_max or rank.".to_string(),
		});
	}

	for (label, weight) in [
		("retrieval.lexical_weight", cfg.retrieval.lexical_weight),
		("retrieval.semantic_weight", cfg.retrieval.semantic_weight),
	] {
		if !weight.is_finite() {
			return Err(Error::Validation { message: format!("{label} must be a finite number.") });
		}
		if !(0.0..=1.0).contains(&weight) {
			return Err(Error::Validation {
				message: format!("{label} must be in the range 0.0-1.0."),
			});
		}
	}

	if (cfg.retrieval.lexical_weight + cfg.retrieval.semantic_weight - 1.0).abs()
		> WEIGHT_SUM_TOLERANCE
	{
		return Err(Error::Validation {
			message: "retrieval.lexical_weight and retrieval.semantic_weight must sum to 1.0."
				.to_string(),
		});
	}
	if cfg.retrieval.local_embedding_dimensions == 0 {
		return Err(Error::Validation {
			message: "retrieval.local_embedding_dimensions must be greater than zero.".to_string(),
		});
	}
	if !cfg.retrieval.lexical.k1.is_finite() || cfg.retrieval.lexical.k1 < 0.0 {
		return Err(Error::Validation {
			message: "retrieval.lexical.k1 must be a finite number, zero or greater.".to_string(),
		});
	}
	if !(0.0..=1.0).contains(&cfg.retrieval.lexical.b) {
		return Err(Error::Validation {
			message: "retrieval.lexical.b must be in the range 0.0-1.0.".to_string(),
		});
	}
	if !cfg.freshness.lambda_per_day.is_finite() || cfg.freshness.lambda_per_day < 0.0 {
		return Err(Error::Validation {
			message: "freshness.lambda_per_day must be a finite number, zero or greater."
				.to_string(),
		});
	}
	if !(0.0..=1.0).contains(&cfg.freshness.floor) {
		return Err(Error::Validation {
			message: "freshness.floor must be in the range 0.0-1.0.".to_string(),
		});
	}
	if cfg.rerank.enabled && cfg.rerank.top_k == 0 {
		return Err(Error::Validation {
			message: "rerank.top_k must be greater than zero when enabled.".to_string(),
		});
	}

	if let Some(embedding) = cfg.providers.embedding.as_ref() {
		if embedding.dimensions == 0 {
			return Err(Error::Validation {
				message: "providers.embedding.dimensions must be greater than zero.".to_string(),
			});
		}

		validate_provider(
			"embedding",
			&embedding.api_base,
			&embedding.api_key,
			&embedding.model,
			embedding.timeout_ms,
		)?;
	}
	if let Some(rerank) = cfg.providers.rerank.as_ref() {
		validate_provider(
			"rerank",
			&rerank.api_base,
			&rerank.api_key,
			&rerank.model,
			rerank.timeout_ms,
		)?;
	}

	Ok(())
}

fn validate_provider(
	label: &str,
	api_base: &str,
	api_key: &str,
	model: &str,
	timeout_ms: u64,
) -> Result<()> {
	for (field, value) in [("api_base", api_base), ("api_key", api_key), ("model", model)] {
		if value.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("providers.{label}.{field} must be non-empty."),
			});
		}
	}

	if timeout_ms == 0 {
		return Err(Error::Validation {
			message: format!("providers.{label}.timeout_ms must be greater than zero."),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.service.log_level = cfg.service.log_level.trim().to_string();
	cfg.retrieval.normalization = cfg.retrieval.normalization.trim().to_ascii_lowercase();

	if let Some(embedding) = cfg.providers.embedding.as_mut() {
		embedding.api_base = embedding.api_base.trim_end_matches('/').to_string();
	}
	if let Some(rerank) = cfg.providers.rerank.as_mut() {
		rerank.api_base = rerank.api_base.trim_end_matches('/').to_string();
	}
}
