use crate::{
	config::Config,
	soap::{Gateway, Session, Transport},
};

pub struct SharedState<T> {
	pub config: Config,
	pub shutdown_token: tokio_util::sync::CancellationToken,
	pub gateway: Gateway<T>,

	/// Used for every bridged call.
	pub session: Session,
}

impl<T: Transport> SharedState<T> {
	pub fn new(
		config: Config,
		transport: T,
		shutdown_token: tokio_util::sync::CancellationToken,
	) -> Self {
		let gateway =
			Gateway::new(transport, config.endpoint.clone(), config.namespace.clone());
		let session = Session::from(config.connection.clone());

		Self {
			config,
			shutdown_token,
			gateway,
			session,
		}
	}
}
