use super::Params;

/// The method called before every invocation of a connected session.
pub const CONNECT_METHOD: &str = "doConnection";

/// Per-caller connection context.
///
/// A session with connection parameters makes the gateway issue a
/// [`CONNECT_METHOD`] call before each real call.
#[derive(Clone, Debug, Default)]
pub struct Session {
	connection: Option<Params>,
}

impl Session {
	/// A session that never connects first.
	pub fn anonymous() -> Self {
		Self::default()
	}

	pub fn connected(connection: Params) -> Self {
		Self {
			connection: Some(connection),
		}
	}

	/// Parameters for the connection call, if one is due.
	pub fn connection(&self) -> Option<&Params> {
		self.connection.as_ref().filter(|p| !p.is_empty())
	}
}

impl From<Option<Params>> for Session {
	fn from(value: Option<Params>) -> Self {
		Self { connection: value }
	}
}
