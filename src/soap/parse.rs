//! Conversion of an XML document into a nested JSON-like mapping.
//!
//! Element and attribute names lose their namespace prefixes, attributes
//! become fields next to child elements, and repeated siblings are
//! collected into arrays. Text-only elements become scalars.

use quick_xml::{
	Reader,
	events::{BytesStart, Event},
};
use serde_json::{Map, Value};

pub const TEXT_KEY: &str = "#text";

#[derive(Debug)]
pub struct ParseError(pub String);

impl std::fmt::Display for ParseError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<quick_xml::Error> for ParseError {
	fn from(value: quick_xml::Error) -> Self {
		Self(value.to_string())
	}
}

impl From<quick_xml::events::attributes::AttrError> for ParseError {
	fn from(value: quick_xml::events::attributes::AttrError) -> Self {
		Self(value.to_string())
	}
}

struct Frame {
	name: String,
	fields: Map<String, Value>,
	text: String,
}

impl Frame {
	fn open(start: &BytesStart<'_>) -> Result<Self, ParseError> {
		let mut fields = Map::new();

		for attribute in start.attributes() {
			let attribute = attribute?;

			if attribute.key.as_namespace_binding().is_some() {
				continue;
			}

			let key = utf8(attribute.key.local_name().as_ref())?;
			let value = attribute.unescape_value()?;
			insert_field(&mut fields, key, Value::String(value.into_owned()));
		}

		Ok(Self {
			name: utf8(start.local_name().as_ref())?,
			fields,
			text: String::new(),
		})
	}

	fn close(self) -> (String, Value) {
		let value = if self.fields.is_empty() {
			coerce(&self.text)
		} else {
			let mut fields = self.fields;

			if !self.text.is_empty() {
				insert_field(&mut fields, TEXT_KEY.to_string(), coerce(&self.text));
			}

			Value::Object(fields)
		};

		(self.name, value)
	}
}

fn utf8(bytes: &[u8]) -> Result<String, ParseError> {
	std::str::from_utf8(bytes)
		.map(str::to_string)
		.map_err(|e| ParseError(e.to_string()))
}

/// Inserts a field, turning repeated keys into an array.
fn insert_field(fields: &mut Map<String, Value>, key: String, value: Value) {
	match fields.get_mut(&key) {
		Some(Value::Array(values)) => values.push(value),
		Some(existing) => {
			let first = existing.take();
			*existing = Value::Array(vec![first, value]);
		}
		None => {
			fields.insert(key, value);
		}
	}
}

/// Turns element text into a number or boolean where it looks like one
/// and the conversion is lossless.
pub fn coerce(text: &str) -> Value {
	let trimmed = text.trim();

	if trimmed.is_empty() {
		return Value::String(String::new());
	}

	match trimmed {
		"true" => return Value::Bool(true),
		"false" => return Value::Bool(false),
		_ => {}
	}

	let digits = trimmed.strip_prefix('-').unwrap_or(trimmed);
	let leading_zero = digits.len() > 1
		&& digits.starts_with('0')
		&& !digits.starts_with("0.");

	if !leading_zero && digits.starts_with(|c: char| c.is_ascii_digit()) {
		if let Ok(n) = trimmed.parse::<i64>() {
			return Value::Number(n.into());
		}

		if let Ok(n) = trimmed.parse::<u64>() {
			return Value::Number(n.into());
		}

		// Floats only when formatting gives the same text back.
		let canonical = if trimmed.contains('.') {
			trimmed.trim_end_matches('0').trim_end_matches('.')
		} else {
			trimmed
		};

		if let Ok(f) = trimmed.parse::<f64>() {
			if f.to_string() == canonical {
				if let Some(n) = serde_json::Number::from_f64(f) {
					return Value::Number(n);
				}
			}
		}
	}

	Value::String(text.to_string())
}

/// Parses an XML document. The result is an object holding the root element.
pub fn parse_document(xml: &str) -> Result<Value, ParseError> {
	let mut reader = Reader::from_str(xml);
	reader.config_mut().trim_text(true);

	let mut stack: Vec<Frame> = vec![];
	let mut root = Map::new();

	loop {
		match reader.read_event()? {
			Event::Start(start) => stack.push(Frame::open(&start)?),

			Event::Empty(start) => {
				let (name, value) = Frame::open(&start)?.close();
				attach(&mut stack, &mut root, name, value);
			}

			Event::End(_) => {
				let frame = stack
					.pop()
					.ok_or_else(|| ParseError("unbalanced end tag".to_string()))?;

				let (name, value) = frame.close();
				attach(&mut stack, &mut root, name, value);
			}

			Event::Text(text) => {
				if let Some(frame) = stack.last_mut() {
					frame.text.push_str(&text.unescape()?);
				}
			}

			Event::CData(data) => {
				if let Some(frame) = stack.last_mut() {
					frame.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
				}
			}

			Event::Eof => break,

			// Declarations, comments, processing instructions, doctypes.
			_ => {}
		}
	}

	if !stack.is_empty() {
		return Err(ParseError(format!(
			"unexpected end of document inside <{}>",
			stack.last().map(|f| f.name.as_str()).unwrap_or_default()
		)));
	}

	if root.is_empty() {
		return Err(ParseError("document has no root element".to_string()));
	}

	Ok(Value::Object(root))
}

fn attach(
	stack: &mut [Frame],
	root: &mut Map<String, Value>,
	name: String,
	value: Value,
) {
	match stack.last_mut() {
		Some(parent) => insert_field(&mut parent.fields, name, value),
		None => insert_field(root, name, value),
	}
}
