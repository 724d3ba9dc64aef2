use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::{
	Method, Request, Response, StatusCode,
	body::{Body, Bytes},
	header,
};
use serde_json::json;

use crate::{
	soap::{GatewayError, Params, Transport},
	state::SharedState,
};

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

fn json_response(status: StatusCode, value: &serde_json::Value) -> Response<Full<Bytes>> {
	let mut response = Response::new(Full::new(Bytes::from(value.to_string())));
	*response.status_mut() = status;
	response.headers_mut().insert(
		header::CONTENT_TYPE,
		header::HeaderValue::from_static("application/json"),
	);
	response
}

fn error_response(
	status: StatusCode,
	kind: &str,
	message: String,
	upstream_status: Option<u16>,
) -> Response<Full<Bytes>> {
	json_response(
		status,
		&json!({
			"error": kind,
			"message": message,
			"status": upstream_status,
		}),
	)
}

fn gateway_error_response(error: GatewayError) -> Response<Full<Bytes>> {
	let status = match error {
		GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
		GatewayError::Transport { .. } | GatewayError::Extraction { .. } => {
			StatusCode::BAD_GATEWAY
		}
	};

	error_response(status, error.kind(), error.to_string(), error.status())
}

/// Parses a flat JSON object body. An empty body means no parameters.
fn parse_params(body: &[u8]) -> Result<Params, String> {
	if body.iter().all(u8::is_ascii_whitespace) {
		return Ok(Params::new());
	}

	match serde_json::from_slice::<serde_json::Value>(body) {
		Ok(serde_json::Value::Object(object)) => {
			Params::from_json_object(object).map_err(|e| e.to_string())
		}
		Ok(_) => Err("request body must be a JSON object".to_string()),
		Err(e) => Err(format!("invalid JSON: {}", e)),
	}
}

/// Handles `POST /{method}` by invoking `method` with the body's parameters.
pub async fn handle_request<T, B>(
	state: &SharedState<T>,
	request: Request<B>,
) -> Response<Full<Bytes>>
where
	T: Transport,
	B: Body,
	B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
	if request.method() != Method::POST {
		return error_response(
			StatusCode::METHOD_NOT_ALLOWED,
			"method_not_allowed",
			format!("{} is not supported, use POST", request.method()),
			None,
		);
	}

	let method = request.uri().path().trim_matches('/').to_string();

	if method.is_empty() {
		return error_response(
			StatusCode::NOT_FOUND,
			"not_found",
			"no remote method in path".to_string(),
			None,
		);
	}

	let body = match Limited::new(request.into_body(), MAX_BODY_BYTES).collect().await {
		Ok(collected) => collected.to_bytes(),
		Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
			return error_response(
				StatusCode::PAYLOAD_TOO_LARGE,
				"payload_too_large",
				format!("request body exceeds {} bytes", MAX_BODY_BYTES),
				None,
			);
		}
		Err(e) => {
			return error_response(
				StatusCode::BAD_REQUEST,
				"invalid_request",
				format!("failed to read body: {}", e),
				None,
			);
		}
	};

	let params = match parse_params(&body) {
		Ok(params) => params,
		Err(message) => {
			return error_response(
				StatusCode::BAD_REQUEST,
				"invalid_request",
				message,
				None,
			);
		}
	};

	log::debug!("Bridging `{}` with {} parameter(s)", method, params.len());

	match state.gateway.invoke(&state.session, &method, &params).await {
		Ok(result) => json_response(StatusCode::OK, &result),
		Err(e) => {
			log::warn!("Bridged `{}` failed: {}", method, e);
			gateway_error_response(e)
		}
	}
}
