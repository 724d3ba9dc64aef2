use std::{convert::Infallible, net::SocketAddr, sync::Arc};

use hyper::{Request, body::Incoming, server::conn::http1, service::service_fn};
use hyper_util::{rt::TokioIo, server::graceful::GracefulShutdown};
use tokio::net::TcpListener;

use crate::{bridge::handler::handle_request, soap::Transport, state::SharedState};

pub async fn run<T>(state: Arc<SharedState<T>>) -> eyre::Result<()>
where
	T: Transport + Send + Sync + 'static,
{
	let port = state.config.server.port;

	let addr = SocketAddr::from(([127, 0, 0, 1], port));
	let listener = TcpListener::bind(addr).await?;
	log::info!("👂 Listening on http://{}", addr);

	serve(listener, state).await
}

pub async fn serve<T>(
	listener: TcpListener,
	state: Arc<SharedState<T>>,
) -> eyre::Result<()>
where
	T: Transport + Send + Sync + 'static,
{
	let graceful = GracefulShutdown::new();

	loop {
		tokio::select! {
			Ok((stream, addr)) = listener.accept() => {
				log::debug!("Got new TCP connection from {}", addr);

				let state = state.clone();
				let service = service_fn(move |request: Request<Incoming>| {
					let state = state.clone();
					async move { Ok::<_, Infallible>(handle_request(&*state, request).await) }
				});

				let connection = http1::Builder::new()
					.serve_connection(TokioIo::new(stream), service);
				let connection = graceful.watch(connection);

				tokio::spawn(async move {
					if let Err(e) = connection.await {
						log::warn!("Connection from {} failed: {}", addr, e);
					}
				});
			},

			_ = state.shutdown_token.cancelled() => {
				log::info!("🛑 Shutting down...");
				graceful.shutdown().await;
				log::debug!("✅ All connections closed");
				break;
			}
		}
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use http_body_util::{BodyExt, Full};
	use hyper::body::Bytes;
	use hyper_util::{client::legacy::Client, rt::TokioExecutor};

	use super::*;
	use crate::{
		config::{Config, ServerConfig},
		soap::{Params, envelope::DEFAULT_NAMESPACE, transport::mock::MockTransport},
	};

	#[tokio::test]
	async fn serves_until_cancelled() {
		let body = r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body>
			<PingResponse xmlns="http://tempuri.org/"><PingResult>pong</PingResult></PingResponse>
		</s:Body></s:Envelope>"#;

		let config = Config {
			endpoint: "http://erp.local/Service.asmx".to_string(),
			namespace: DEFAULT_NAMESPACE.to_string(),
			connection: Some(Params::new()),
			server: ServerConfig { port: 0 },
		};

		let shutdown_token = tokio_util::sync::CancellationToken::new();
		let state = Arc::new(SharedState::new(
			config,
			MockTransport::new().respond(200, body),
			shutdown_token.clone(),
		));

		let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
		let addr = listener.local_addr().unwrap();
		let server = tokio::spawn(serve(listener, state.clone()));

		let client = Client::builder(TokioExecutor::new()).build_http();
		let response = client
			.request(
				Request::post(format!("http://{}/Ping", addr))
					.body(Full::new(Bytes::from_static(b"{}")))
					.unwrap(),
			)
			.await
			.unwrap();

		assert_eq!(response.status(), 200);
		let bytes = response.into_body().collect().await.unwrap().to_bytes();
		assert_eq!(&bytes[..], b"\"pong\"");

		drop(client);
		shutdown_token.cancel();
		server.await.unwrap().unwrap();
	}
}
