//! Per-period rollups derived from the chunk store.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::{Result, store::ChunkStore};
use tally_domain::{Chunk, ChunkId, ChunkKind, FieldValue, Period, classify, fields};

pub const INTEREST_FROM_STATEMENTS_TOTAL: &str = "interest_from_statements_total";
pub const INTEREST_FROM_INTEREST_TRANSACTIONS_TOTAL: &str =
	"interest_from_interest_transactions_total";
pub const STATEMENT_ENDING_BALANCE: &str = "statement_ending_balance";
pub const PAYMENTS_TOTAL: &str = "payments_total";
pub const TRANSACTION_COUNT: &str = "transaction_count";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reducer {
	Sum,
	/// Value of the contributing chunk with the greatest timestamp.
	Latest,
	Count,
}

#[derive(Clone, Debug)]
pub struct MetricDefinition {
	pub name: &'static str,
	pub source: ChunkKind,
	/// Numeric field read from each chunk. `None` only makes sense with `Reducer::Count`.
	pub field: Option<&'static str>,
	pub absolute: bool,
	pub reducer: Reducer,
	pub filter: fn(&Chunk) -> bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AggregateRecord {
	pub period: Period,
	pub metric: String,
	pub value: f64,
	pub contributing_chunk_ids: Vec<ChunkId>,
	/// The AGGREGATE chunk rendering this record, once materialized.
	pub chunk_id: Option<ChunkId>,
}

#[derive(Clone, Debug, Default)]
pub struct AggregateTable {
	records: Vec<AggregateRecord>,
	by_key: HashMap<(Period, String), usize>,
}
impl AggregateTable {
	pub fn from_records(records: Vec<AggregateRecord>) -> Self {
		let by_key = records
			.iter()
			.enumerate()
			.map(|(idx, record)| ((record.period, record.metric.clone()), idx))
			.collect();

		Self { records, by_key }
	}

	/// Groups source chunks by period and reduces each metric. Periods with no contributing chunk
	/// get no record.
	pub fn derive(store: &ChunkStore, definitions: &[MetricDefinition]) -> Self {
		let mut records = Vec::new();

		for definition in definitions {
			let mut groups: BTreeMap<Period, Vec<&Chunk>> = BTreeMap::new();

			for chunk in store.of_kind(definition.source) {
				let Some(period) = chunk.period else {
					continue;
				};

				if !(definition.filter)(chunk) {
					continue;
				}
				if let Some(field) = definition.field
					&& chunk.number(field).is_none()
				{
					continue;
				}

				groups.entry(period).or_default().push(chunk);
			}

			for (period, chunks) in groups {
				if let Some(record) = reduce(definition, period, &chunks) {
					records.push(record);
				}
			}
		}

		Self::from_records(records)
	}

	/// Appends one AGGREGATE chunk per record, in record order, and links it back.
	pub fn materialize(&mut self, store: &mut ChunkStore) -> Result<()> {
		for record in &mut self.records {
			let mut values = BTreeMap::new();

			values.insert(fields::METRIC.to_string(), FieldValue::from(record.metric.as_str()));
			values.insert(fields::PERIOD.to_string(), FieldValue::from(record.period.to_string()));
			values.insert(fields::VALUE.to_string(), FieldValue::from(record.value));

			let id = store.push(ChunkKind::Aggregate, Some(record.period), None, values)?;

			record.chunk_id = Some(id);
		}

		Ok(())
	}

	pub fn get(&self, period: Period, metric: &str) -> Option<&AggregateRecord> {
		self.by_key.get(&(period, metric.to_string())).and_then(|idx| self.records.get(*idx))
	}

	pub fn records(&self) -> &[AggregateRecord] {
		&self.records
	}

	pub fn len(&self) -> usize {
		self.records.len()
	}

	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}
}

pub fn default_metrics() -> Vec<MetricDefinition> {
	vec![
		MetricDefinition {
			name: INTEREST_FROM_STATEMENTS_TOTAL,
			source: ChunkKind::Statement,
			field: Some(fields::INTEREST_CHARGED),
			absolute: false,
			reducer: Reducer::Sum,
			filter: |_| true,
		},
		MetricDefinition {
			name: INTEREST_FROM_INTEREST_TRANSACTIONS_TOTAL,
			source: ChunkKind::Transaction,
			field: Some(fields::AMOUNT),
			absolute: true,
			reducer: Reducer::Sum,
			filter: |chunk| classify::is_interest_transaction(chunk) && classify::is_posted(chunk),
		},
		MetricDefinition {
			name: STATEMENT_ENDING_BALANCE,
			source: ChunkKind::Statement,
			field: Some(fields::ENDING_BALANCE),
			absolute: false,
			reducer: Reducer::Latest,
			filter: |_| true,
		},
		MetricDefinition {
			name: PAYMENTS_TOTAL,
			source: ChunkKind::Payment,
			field: Some(fields::AMOUNT),
			absolute: false,
			reducer: Reducer::Sum,
			filter: |_| true,
		},
		MetricDefinition {
			name: TRANSACTION_COUNT,
			source: ChunkKind::Transaction,
			field: None,
			absolute: false,
			reducer: Reducer::Count,
			filter: |_| true,
		},
	]
}

pub fn round_cents(value: f64) -> f64 {
	(value * 100.0).round() / 100.0
}

fn reduce(
	definition: &MetricDefinition,
	period: Period,
	chunks: &[&Chunk],
) -> Option<AggregateRecord> {
	if chunks.is_empty() {
		return None;
	}

	let read = |chunk: &Chunk| {
		let value = definition.field.and_then(|field| chunk.number(field)).unwrap_or(0.0);

		if definition.absolute { value.abs() } else { value }
	};
	let (value, contributing) = match definition.reducer {
		Reducer::Sum => (
			round_cents(chunks.iter().map(|chunk| read(chunk)).sum()),
			chunks.iter().map(|chunk| chunk.id).collect::<Vec<_>>(),
		),
		Reducer::Latest => {
			let latest = chunks.iter().max_by_key(|chunk| (chunk.timestamp, chunk.id))?;

			(read(latest), vec![latest.id])
		},
		Reducer::Count => {
			(chunks.len() as f64, chunks.iter().map(|chunk| chunk.id).collect::<Vec<_>>())
		},
	};

	Some(AggregateRecord {
		period,
		metric: definition.name.to_string(),
		value,
		contributing_chunk_ids: contributing,
		chunk_id: None,
	})
}
