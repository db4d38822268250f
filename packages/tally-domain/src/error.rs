pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid period {value:?}; expected YYYY-MM.")]
	InvalidPeriod { value: String },
}
