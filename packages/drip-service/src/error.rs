#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Spreadsheet is not configured; set [sheet] in the config file.")]
	SheetNotConfigured,
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
}
impl From<color_eyre::Report> for Error {
	fn from(err: color_eyre::Report) -> Self {
		// Query helpers surface database failures as reports wrapping sqlx errors.
		if err.downcast_ref::<sqlx::Error>().is_some() {
			return Self::Storage { message: err.to_string() };
		}

		Self::Provider { message: err.to_string() }
	}
}
