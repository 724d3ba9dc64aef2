use http_body_util::{BodyExt, Full};
use hyper::{Request, body::Bytes, header};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{
	client::legacy::{Client, connect::HttpConnector},
	rt::TokioExecutor,
};

/// An outbound SOAP HTTP request.
#[derive(Clone, Debug)]
pub struct SoapRequest {
	pub endpoint: String,

	/// The already-quoted `SOAPAction` header value.
	pub action: String,

	pub body: String,
}

/// A raw HTTP response, whatever its status.
#[derive(Clone, Debug)]
pub struct SoapResponse {
	pub status: u16,
	pub body: String,
}

/// The request never got a response.
#[derive(Debug)]
pub struct TransportFailure(pub String);

pub const CONTENT_TYPE: &str = "text/xml; charset=utf-8";

pub trait Transport {
	fn post(
		&self,
		request: SoapRequest,
	) -> impl Future<Output = Result<SoapResponse, TransportFailure>> + Send;
}

/// HTTP and HTTPS transport built on the `hyper-util` client,
/// with rustls and the webpki root certificates.
#[derive(Clone)]
pub struct HyperTransport {
	client: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
}

impl HyperTransport {
	pub fn new() -> Self {
		let mut http = HttpConnector::new();
		http.enforce_http(false);

		let connector = HttpsConnectorBuilder::new()
			.with_webpki_roots()
			.https_or_http()
			.enable_http1()
			.wrap_connector(http);

		Self {
			client: Client::builder(TokioExecutor::new()).build(connector),
		}
	}
}

impl Default for HyperTransport {
	fn default() -> Self {
		Self::new()
	}
}

impl Transport for HyperTransport {
	fn post(
		&self,
		request: SoapRequest,
	) -> impl Future<Output = Result<SoapResponse, TransportFailure>> + Send {
		let client = self.client.clone();

		async move {
			let http_request = Request::post(request.endpoint.as_str())
				.header(header::CONTENT_TYPE, CONTENT_TYPE)
				.header("SOAPAction", request.action.as_str())
				.body(Full::new(Bytes::from(request.body)))
				.map_err(|e| TransportFailure(format!("invalid request: {}", e)))?;

			let response = client
				.request(http_request)
				.await
				.map_err(|e| TransportFailure(format!("{:?}", e)))?;

			let status = response.status().as_u16();

			let body = response
				.into_body()
				.collect()
				.await
				.map_err(|e| TransportFailure(format!("failed to read body: {}", e)))?
				.to_bytes();

			Ok(SoapResponse {
				status,
				body: String::from_utf8_lossy(&body).into_owned(),
			})
		}
	}
}

#[cfg(test)]
pub mod mock {
	use std::{collections::VecDeque, sync::Mutex};

	use super::*;

	/// Replays canned responses and records every request.
	#[derive(Default)]
	pub struct MockTransport {
		responses: Mutex<VecDeque<Result<SoapResponse, TransportFailure>>>,
		pub requests: Mutex<Vec<SoapRequest>>,
	}

	impl MockTransport {
		pub fn new() -> Self {
			Self::default()
		}

		pub fn respond(self, status: u16, body: impl Into<String>) -> Self {
			self.responses.lock().unwrap().push_back(Ok(SoapResponse {
				status,
				body: body.into(),
			}));

			self
		}

		pub fn fail(self, message: &str) -> Self {
			self
				.responses
				.lock()
				.unwrap()
				.push_back(Err(TransportFailure(message.to_string())));

			self
		}

		pub fn requests(&self) -> Vec<SoapRequest> {
			self.requests.lock().unwrap().clone()
		}
	}

	impl Transport for MockTransport {
		fn post(
			&self,
			request: SoapRequest,
		) -> impl Future<Output = Result<SoapResponse, TransportFailure>> + Send {
			self.requests.lock().unwrap().push(request);

			let response = self
				.responses
				.lock()
				.unwrap()
				.pop_front()
				.unwrap_or_else(|| Err(TransportFailure("no canned response".into())));

			async move { response }
		}
	}
}
