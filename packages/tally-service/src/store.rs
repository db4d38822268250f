use std::collections::BTreeMap;

use time::OffsetDateTime;

use crate::{Error, Result};
use tally_chunking::SegmentConfig;
use tally_domain::{
	AgreementSegment, Chunk, ChunkId, ChunkKind, FieldValue, Period, SourceRecords, date_policy,
};

/// Every evidence chunk of one snapshot, indexed by id.
///
/// Ids are positions: accounts, statements, transactions, payments and agreement text in input
/// order, then aggregate chunks once they are materialized.
#[derive(Clone, Debug, Default)]
pub struct ChunkStore {
	chunks: Vec<Chunk>,
}
impl ChunkStore {
	pub fn build(records: &SourceRecords, segments: &SegmentConfig) -> Result<Self> {
		if records.is_empty() {
			return Err(Error::InvalidData { message: "No source records to index.".to_string() });
		}

		let mut store = Self::default();

		for account in &records.accounts {
			store.push_record(ChunkKind::Account, account.fields())?;
		}
		for statement in &records.statements {
			store.push_record(ChunkKind::Statement, statement.fields())?;
		}
		for transaction in &records.transactions {
			store.push_record(ChunkKind::Transaction, transaction.fields())?;
		}
		for payment in &records.payments {
			store.push_record(ChunkKind::Payment, payment.fields())?;
		}

		let mut segment_index = 0_usize;

		for segment in &records.agreement {
			store.push_record(ChunkKind::AgreementText, segment.fields(segment_index))?;

			segment_index += 1;
		}

		if let Some(raw) = records.agreement_text.as_deref() {
			for piece in tally_chunking::split_text(raw, segments) {
				let segment = AgreementSegment { text: piece.text, page: None };

				store.push_record(ChunkKind::AgreementText, segment.fields(segment_index))?;

				segment_index += 1;
			}
		}

		tracing::debug!(chunks = store.len(), "Built chunk store.");

		Ok(store)
	}

	pub fn get(&self, id: ChunkId) -> Result<&Chunk> {
		self.chunks.get(id.0 as usize).ok_or(Error::NotFound { chunk_id: id })
	}

	pub fn chunks(&self) -> &[Chunk] {
		&self.chunks
	}

	pub fn len(&self) -> usize {
		self.chunks.len()
	}

	pub fn is_empty(&self) -> bool {
		self.chunks.is_empty()
	}

	pub fn of_kind(&self, kind: ChunkKind) -> impl Iterator<Item = &Chunk> {
		self.chunks.iter().filter(move |chunk| chunk.kind == kind)
	}

	/// Chunks of `kind` assigned to `period`.
	pub fn in_period(&self, kind: ChunkKind, period: Period) -> impl Iterator<Item = &Chunk> {
		self.of_kind(kind).filter(move |chunk| chunk.period == Some(period))
	}

	pub(crate) fn push(
		&mut self,
		kind: ChunkKind,
		period: Option<Period>,
		timestamp: Option<OffsetDateTime>,
		fields: BTreeMap<String, FieldValue>,
	) -> Result<ChunkId> {
		let id = u32::try_from(self.chunks.len()).map(ChunkId).map_err(|_| Error::InvalidData {
			message: "Chunk count exceeds the id space.".to_string(),
		})?;

		self.chunks.push(Chunk::new(id, kind, period, timestamp, fields));

		Ok(id)
	}

	// Period and timestamp come from the kind's canonical date only.
	fn push_record(
		&mut self,
		kind: ChunkKind,
		fields: BTreeMap<String, FieldValue>,
	) -> Result<ChunkId> {
		let timestamp = date_policy::for_kind(kind).and_then(|policy| policy.canonical(&fields));
		let period = timestamp.map(Period::containing);

		self.push(kind, period, timestamp, fields)
	}
}
