pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Export error: {message}")]
	Export { message: String },
}
impl From<sicscout_providers::Error> for Error {
	fn from(err: sicscout_providers::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}

impl From<csv::Error> for Error {
	fn from(err: csv::Error) -> Self {
		Self::Export { message: err.to_string() }
	}
}

impl From<rust_xlsxwriter::XlsxError> for Error {
	fn from(err: rust_xlsxwriter::XlsxError) -> Self {
		Self::Export { message: err.to_string() }
	}
}
