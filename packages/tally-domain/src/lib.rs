pub mod chunk;
pub mod classify;
pub mod date_policy;
pub mod fields;
pub mod intent;
pub mod period;
pub mod records;
pub mod time_serde;

mod error;

pub use chunk::{Chunk, ChunkId, ChunkKind, FieldValue};
pub use error::{Error, Result};
pub use intent::{
	BalanceTarget, Intent, IntentKind, PaymentTarget, PeriodHint, PeriodSelector, QueryAnalysis,
	SpendQuestion,
};
pub use period::Period;
pub use records::{
	AccountRecord, AgreementSegment, PaymentRecord, SourceRecords, StatementRecord,
	TransactionRecord,
};
