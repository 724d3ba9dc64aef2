use std::fmt;

use serde::Serialize;

use super::{GatewayError, envelope::is_xml_name};

/// A scalar SOAP parameter value.
#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
	String(String),
	Number(serde_json::Number),
	Bool(bool),
}

impl fmt::Display for Scalar {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Scalar::String(s) => f.write_str(s),
			Scalar::Number(n) => write!(f, "{}", n),
			Scalar::Bool(b) => write!(f, "{}", b),
		}
	}
}

impl From<&str> for Scalar {
	fn from(value: &str) -> Self {
		Scalar::String(value.to_string())
	}
}

impl From<String> for Scalar {
	fn from(value: String) -> Self {
		Scalar::String(value)
	}
}

impl From<bool> for Scalar {
	fn from(value: bool) -> Self {
		Scalar::Bool(value)
	}
}

impl From<i64> for Scalar {
	fn from(value: i64) -> Self {
		Scalar::Number(value.into())
	}
}

impl From<u64> for Scalar {
	fn from(value: u64) -> Self {
		Scalar::Number(value.into())
	}
}

impl From<i32> for Scalar {
	fn from(value: i32) -> Self {
		Scalar::Number(value.into())
	}
}

impl Scalar {
	/// Converts a JSON value into a scalar.
	/// Returns `Ok(None)` for `null`, and an error for arrays and objects.
	pub fn from_json(
		key: &str,
		value: serde_json::Value,
	) -> Result<Option<Self>, GatewayError> {
		match value {
			serde_json::Value::Null => Ok(None),
			serde_json::Value::Bool(b) => Ok(Some(Scalar::Bool(b))),
			serde_json::Value::Number(n) => Ok(Some(Scalar::Number(n))),
			serde_json::Value::String(s) => Ok(Some(Scalar::String(s))),
			serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
				Err(GatewayError::InvalidRequest(format!(
					"parameter `{}` must be a string, number or boolean",
					key
				)))
			}
		}
	}

	/// Parses a command-line value: JSON numbers and booleans are kept
	/// as such, anything else is a string.
	pub fn parse_lossy(value: &str) -> Self {
		match serde_json::from_str::<serde_json::Value>(value) {
			Ok(serde_json::Value::Number(n)) => Scalar::Number(n),
			Ok(serde_json::Value::Bool(b)) => Scalar::Bool(b),
			_ => Scalar::String(value.to_string()),
		}
	}
}

/// A flat, insertion-ordered mapping of parameter names to scalars.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Params(Vec<(String, Scalar)>);

impl Params {
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets `key` to `value`, replacing an existing entry in place.
	pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Scalar>) {
		let key = key.into();
		let value = value.into();

		match self.0.iter_mut().find(|(k, _)| *k == key) {
			Some(entry) => entry.1 = value,
			None => self.0.push((key, value)),
		}
	}

	/// Builder-style [`Params::insert`].
	pub fn with(mut self, key: impl Into<String>, value: impl Into<Scalar>) -> Self {
		self.insert(key, value);
		self
	}

	pub fn get(&self, key: &str) -> Option<&Scalar> {
		self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
		self.0.iter().map(|(k, v)| (k.as_str(), v))
	}

	/// Builds from a JSON object, skipping `null` members.
	pub fn from_json_object(
		object: serde_json::Map<String, serde_json::Value>,
	) -> Result<Self, GatewayError> {
		let mut params = Self::new();

		for (key, value) in object {
			if let Some(scalar) = Scalar::from_json(&key, value)? {
				params.insert(key, scalar);
			}
		}

		Ok(params)
	}

	/// Serializes a typed parameter struct into a flat mapping.
	pub fn from_serializable<T: Serialize>(value: &T) -> Result<Self, GatewayError> {
		match serde_json::to_value(value) {
			Ok(serde_json::Value::Object(object)) => Self::from_json_object(object),
			Ok(serde_json::Value::Null) => Ok(Self::new()),
			Ok(other) => Err(GatewayError::InvalidRequest(format!(
				"parameters must serialize into an object, got `{}`",
				other
			))),
			Err(e) => Err(GatewayError::InvalidRequest(format!(
				"failed to serialize parameters: {}",
				e
			))),
		}
	}

	/// Checks that every key may be used as an XML element name.
	pub fn validate(&self) -> Result<(), GatewayError> {
		for (key, _) in &self.0 {
			if !is_xml_name(key) {
				return Err(GatewayError::InvalidRequest(format!(
					"`{}` is not a valid parameter name",
					key
				)));
			}
		}

		Ok(())
	}
}

impl<K: Into<String>, V: Into<Scalar>> FromIterator<(K, V)> for Params {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		let mut params = Self::new();

		for (key, value) in iter {
			params.insert(key, value);
		}

		params
	}
}
