#[derive(thiserror::Error, Debug)]
pub enum GatewayError {
	/// Network failure or a non-2xx HTTP status.
	#[error("transport error calling `{method}`: {message}")]
	Transport {
		method: String,
		status: Option<u16>,
		body: Option<String>,
		message: String,
	},

	/// The response did not contain the expected result.
	#[error("failed to extract `{method}` result: {reason}")]
	Extraction { method: String, reason: String },

	/// Rejected before anything was sent.
	#[error("invalid request: {0}")]
	InvalidRequest(String),
}

impl GatewayError {
	/// The HTTP status of a failed transport call, if any.
	pub fn status(&self) -> Option<u16> {
		match self {
			GatewayError::Transport { status, .. } => *status,
			_ => None,
		}
	}

	pub fn kind(&self) -> &'static str {
		match self {
			GatewayError::Transport { .. } => "transport",
			GatewayError::Extraction { .. } => "extraction",
			GatewayError::InvalidRequest(_) => "invalid_request",
		}
	}
}
