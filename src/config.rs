use std::path::{Path, PathBuf};

use eyre::{WrapErr as _, eyre};
use serde::{Deserialize, Serialize};

use crate::soap::{Params, envelope::DEFAULT_NAMESPACE};

// The default project name is `org.dmsgate`.
const PROJECT_QUALIFIER: &str = "org";
const PROJECT_ORG: &str = "";
const PROJECT_NAME: &str = "dmsgate";

const DEFAULT_CONFIG_FILE_NAME: &str = "config.json5";
pub const DEFAULT_SERVER_PORT: u16 = 4280;

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct UserServerConfig {
	pub port: Option<u16>,
}

/// Configuration as written by the user.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct UserConfig {
	/// SOAP endpoint URL, e.g. `http://erp.local/Service.asmx`.
	pub endpoint: Option<String>,

	/// XML namespace of the remote methods,
	/// otherwise [`DEFAULT_NAMESPACE`].
	pub namespace: Option<String>,

	/// Parameters of the `doConnection` call preceding every call.
	/// Values must be strings, numbers or booleans.
	pub connection: Option<serde_json::Map<String, serde_json::Value>>,

	pub server: Option<UserServerConfig>,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
	pub port: u16,
}

/// Resolved configuration.
#[derive(Clone, Debug)]
pub struct Config {
	pub endpoint: String,
	pub namespace: String,
	pub connection: Option<Params>,
	pub server: ServerConfig,
}

impl UserConfig {
	pub fn read(path: &Path) -> eyre::Result<Self> {
		let config_string = std::fs::read_to_string(path)
			.wrap_err_with(|| format!("failed to read {}", path.display()))?;

		json5::from_str::<UserConfig>(&config_string)
			.wrap_err_with(|| format!("failed to parse {}", path.display()))
	}

	/// Reads the explicit path if given, otherwise the default config file
	/// when it exists.
	pub fn load(explicit_path: Option<&Path>) -> eyre::Result<Option<Self>> {
		if let Some(path) = explicit_path {
			return Self::read(path).map(Some);
		}

		match default_config_path() {
			Some(path) if path.exists() => {
				log::debug!("Using config at {}", path.display());
				Self::read(&path).map(Some)
			}
			_ => Ok(None),
		}
	}
}

pub fn default_config_path() -> Option<PathBuf> {
	directories::ProjectDirs::from(PROJECT_QUALIFIER, PROJECT_ORG, PROJECT_NAME)
		.map(|dirs| dirs.config_dir().join(DEFAULT_CONFIG_FILE_NAME))
}

impl Config {
	pub fn resolve(
		user_config: &Option<UserConfig>,
		endpoint_override: Option<String>,
		port_override: Option<u16>,
	) -> eyre::Result<Self> {
		let endpoint = endpoint_override
			.or_else(|| user_config.as_ref().and_then(|c| c.endpoint.clone()))
			.filter(|e| !e.is_empty())
			.ok_or_else(|| {
				eyre!("no SOAP endpoint configured (set `endpoint` or pass --endpoint)")
			})?;

		let uri = endpoint
			.parse::<hyper::Uri>()
			.wrap_err_with(|| format!("invalid SOAP endpoint `{}`", endpoint))?;

		if !matches!(uri.scheme_str(), Some("http" | "https")) {
			return Err(eyre!(
				"SOAP endpoint `{}` must be an http:// or https:// URL",
				endpoint
			));
		}

		let namespace = user_config
			.as_ref()
			.and_then(|c| c.namespace.clone())
			.unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());

		let connection =
			match user_config.as_ref().and_then(|c| c.connection.clone()) {
				Some(map) => Some(
					Params::from_json_object(map)
						.wrap_err("invalid `connection` parameters")?,
				),
				None => None,
			};

		let port = port_override
			.or_else(|| {
				user_config
					.as_ref()
					.and_then(|c| c.server.as_ref().and_then(|s| s.port))
			})
			.unwrap_or(DEFAULT_SERVER_PORT);

		Ok(Self {
			endpoint,
			namespace,
			connection,
			server: ServerConfig { port },
		})
	}
}

#[cfg(test)]
mod tests {
	use std::io::Write as _;

	use super::*;
	use crate::soap::Scalar;

	fn write_config(contents: &str) -> tempfile::NamedTempFile {
		let mut file = tempfile::Builder::new().suffix(".json5").tempfile().unwrap();
		file.write_all(contents.as_bytes()).unwrap();
		file
	}

	#[test]
	fn reads_json5_with_comments() {
		let file = write_config(
			r#"{
				// ERP test instance
				endpoint: "http://erp.local/Service.asmx",
				connection: { login: "admin", db: 3, },
				server: { port: 9000 },
			}"#,
		);

		let user_config = UserConfig::load(Some(file.path())).unwrap();
		let config = Config::resolve(&user_config, None, None).unwrap();

		assert_eq!(config.endpoint, "http://erp.local/Service.asmx");
		assert_eq!(config.namespace, DEFAULT_NAMESPACE);
		assert_eq!(config.server.port, 9000);

		let connection = config.connection.unwrap();
		assert_eq!(connection.get("login"), Some(&Scalar::from("admin")));
		assert_eq!(connection.get("db"), Some(&Scalar::from(3)));

		let keys: Vec<_> = connection.iter().map(|(k, _)| k).collect();
		assert_eq!(keys, vec!["login", "db"]);
	}

	#[test]
	fn overrides_win() {
		let user_config = Some(UserConfig {
			endpoint: Some("http://a/".into()),
			server: Some(UserServerConfig { port: Some(1) }),
			..Default::default()
		});

		let config =
			Config::resolve(&user_config, Some("http://b/".into()), Some(2)).unwrap();

		assert_eq!(config.endpoint, "http://b/");
		assert_eq!(config.server.port, 2);
		assert!(config.connection.is_none());
	}

	#[test]
	fn endpoint_is_required() {
		assert!(Config::resolve(&None, None, None).is_err());

		let empty = Some(UserConfig {
			endpoint: Some(String::new()),
			..Default::default()
		});
		assert!(Config::resolve(&empty, None, None).is_err());
	}

	#[test]
	fn endpoint_scheme_is_checked() {
		for endpoint in ["http://erp.local/Service.asmx", "https://erp.example.com/Service.asmx"] {
			let config = Config::resolve(&None, Some(endpoint.into()), None).unwrap();
			assert_eq!(config.endpoint, endpoint);
		}

		for endpoint in ["ftp://erp.local/Service.asmx", "erp.local/Service.asmx", "not a url"] {
			assert!(Config::resolve(&None, Some(endpoint.into()), None).is_err(), "{}", endpoint);
		}
	}

	#[test]
	fn nested_connection_values_are_rejected() {
		let file = write_config(
			r#"{ endpoint: "http://a/", connection: { roles: ["x"] } }"#,
		);

		let user_config = UserConfig::load(Some(file.path())).unwrap();
		assert!(Config::resolve(&user_config, None, None).is_err());
	}

	#[test]
	fn missing_explicit_file_is_an_error() {
		assert!(UserConfig::load(Some(Path::new("/nonexistent/dmsgate.json5"))).is_err());
	}
}
