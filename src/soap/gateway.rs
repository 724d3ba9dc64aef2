use serde_json::Value;

use super::{
	GatewayError, Operation, Params, Session,
	envelope::{build_envelope, is_xml_name, soap_action},
	parse::parse_document,
	session::CONNECT_METHOD,
	transport::{SoapRequest, SoapResponse, Transport},
};

/// A SOAP endpoint, bound to a transport.
pub struct Gateway<T> {
	transport: T,
	endpoint: String,
	namespace: String,
}

impl<T: Transport> Gateway<T> {
	pub fn new(
		transport: T,
		endpoint: impl Into<String>,
		namespace: impl Into<String>,
	) -> Self {
		Self {
			transport,
			endpoint: endpoint.into(),
			namespace: namespace.into(),
		}
	}

	pub fn endpoint(&self) -> &str {
		&self.endpoint
	}

	pub fn transport(&self) -> &T {
		&self.transport
	}

	/// Invokes `method` and returns its `{method}Result` value.
	///
	/// A connected `session` makes this first call [`CONNECT_METHOD`],
	/// discarding its result.
	pub async fn invoke(
		&self,
		session: &Session,
		method: &str,
		params: &Params,
	) -> Result<Value, GatewayError> {
		if !is_xml_name(method) {
			return Err(GatewayError::InvalidRequest(format!(
				"`{}` is not a valid method name",
				method
			)));
		}

		params.validate()?;

		if let Some(connection) = session.connection() {
			connection.validate()?;
			log::debug!("🔌 Connecting before `{}`", method);
			self.send(CONNECT_METHOD, connection).await?;
		}

		let response = self.send(method, params).await?;
		extract_result(method, &response.body)
	}

	/// Invokes a typed operation.
	pub async fn call<O: Operation>(
		&self,
		session: &Session,
		params: &O::Params,
	) -> Result<O::Output, GatewayError> {
		let params = Params::from_serializable(params)?;
		let value = self.invoke(session, O::METHOD, &params).await?;

		serde_json::from_value(value).map_err(|e| GatewayError::Extraction {
			method: O::METHOD.to_string(),
			reason: format!("unexpected result shape: {}", e),
		})
	}

	async fn send(
		&self,
		method: &str,
		params: &Params,
	) -> Result<SoapResponse, GatewayError> {
		let request = SoapRequest {
			endpoint: self.endpoint.clone(),
			action: soap_action(&self.namespace, method),
			body: build_envelope(&self.namespace, method, params),
		};

		log::trace!("➡️ {} {}", method, request.body);

		let response = match self.transport.post(request).await {
			Ok(response) => response,
			Err(failure) => {
				log::error!("`{}` request to {} failed: {}", method, self.endpoint, failure.0);

				return Err(GatewayError::Transport {
					method: method.to_string(),
					status: None,
					body: None,
					message: failure.0,
				});
			}
		};

		if !(200..300).contains(&response.status) {
			log::error!(
				"`{}` returned HTTP {}: {}",
				method,
				response.status,
				response.body
			);

			return Err(GatewayError::Transport {
				method: method.to_string(),
				status: Some(response.status),
				message: format!("HTTP status {}", response.status),
				body: Some(response.body),
			});
		}

		log::trace!("⬅️ {} {}", method, response.body);

		Ok(response)
	}
}

/// Descends `Envelope.Body.{method}Response.{method}Result`.
pub fn extract_result(method: &str, xml: &str) -> Result<Value, GatewayError> {
	let extraction_error = |reason: String| {
		log::error!("Failed to extract `{}` result: {}", method, reason);

		GatewayError::Extraction {
			method: method.to_string(),
			reason,
		}
	};

	let mut document = parse_document(xml)
		.map_err(|e| extraction_error(format!("malformed XML: {}", e)))?;

	let response_key = format!("{}Response", method);
	let result_key = format!("{}Result", method);

	let mut value = &mut document;

	for key in ["Envelope", "Body", response_key.as_str(), result_key.as_str()] {
		value = match value.get_mut(key) {
			Some(next) => next,
			None => return Err(extraction_error(format!("`{}` not found", key))),
		};
	}

	Ok(value.take())
}
