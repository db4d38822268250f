//! Deterministic local embedder used when no embedding provider is configured.
//!
//! Feature hashing over lowercase word tokens and adjacent token pairs: each feature's blake3
//! digest picks a bucket and a sign. Vectors are L2-normalized so cosine similarity is a dot
//! product. Empty text maps to the zero vector.

use unicode_segmentation::UnicodeSegmentation;

use crate::{Error, Result};

#[derive(Clone, Debug)]
pub struct HashingEmbedder {
	dimensions: usize,
}
impl HashingEmbedder {
	pub fn new(dimensions: u32) -> Result<Self> {
		if dimensions == 0 {
			return Err(Error::InvalidConfig {
				message: "Hashing embedder dimensions must be greater than zero.".to_string(),
			});
		}

		Ok(Self { dimensions: dimensions as usize })
	}

	pub fn embed(&self, texts: &[String]) -> Vec<Vec<f32>> {
		texts.iter().map(|text| self.embed_one(text)).collect()
	}

	pub fn embed_one(&self, text: &str) -> Vec<f32> {
		let mut vector = vec![0.0_f32; self.dimensions];
		let tokens = text.unicode_words().map(str::to_lowercase).collect::<Vec<_>>();

		for token in &tokens {
			self.add_feature(&mut vector, token.as_bytes());
		}
		for pair in tokens.windows(2) {
			let feature = format!("{} {}", pair[0], pair[1]);

			self.add_feature(&mut vector, feature.as_bytes());
		}

		l2_normalize(&mut vector);

		vector
	}

	fn add_feature(&self, vector: &mut [f32], feature: &[u8]) {
		let digest = blake3::hash(feature);
		let bytes = digest.as_bytes();
		let mut bucket_bytes = [0_u8; 8];

		bucket_bytes.copy_from_slice(&bytes[..8]);

		let bucket = (u64::from_le_bytes(bucket_bytes) % self.dimensions as u64) as usize;
		let sign = if bytes[8] & 1 == 0 { 1.0 } else { -1.0 };

		vector[bucket] += sign;
	}
}

fn l2_normalize(vector: &mut [f32]) {
	let norm = vector.iter().map(|value| value * value).sum::<f32>().sqrt();

	if norm > 0.0 {
		vector.iter_mut().for_each(|value| *value /= norm);
	}
}
