use quick_xml::escape::escape;

use super::Params;

pub const DEFAULT_NAMESPACE: &str = "http://tempuri.org/";

/// Returns `true` if `name` can be used verbatim as an XML element name.
/// Colons are rejected so that a name never introduces a prefix.
pub fn is_xml_name(name: &str) -> bool {
	let mut chars = name.chars();

	match chars.next() {
		Some(c) if c.is_alphabetic() || c == '_' => {}
		_ => return false,
	}

	chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

/// Serializes parameters as `<key>value</key>` elements, in order.
pub fn serialize_params(params: &Params) -> String {
	let mut fragment = String::new();

	for (key, value) in params.iter() {
		let value = value.to_string();
		fragment.push_str(&format!("<{key}>{}</{key}>", escape(value.as_str())));
	}

	fragment
}

/// Wraps a method invocation in a SOAP 1.1 envelope.
pub fn build_envelope(namespace: &str, method: &str, params: &Params) -> String {
	format!(
		r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xmlns:xsd="http://www.w3.org/2001/XMLSchema" xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
	<soap:Body>
		<{method} xmlns="{namespace}">{params}</{method}>
	</soap:Body>
</soap:Envelope>"#,
		method = method,
		namespace = escape(namespace),
		params = serialize_params(params),
	)
}

/// The quoted `SOAPAction` header value.
pub fn soap_action(namespace: &str, method: &str) -> String {
	format!("\"{}{}\"", namespace, method)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn params_are_serialized_in_order() {
		let params = Params::new()
			.with("zeta", "last?")
			.with("alpha", 1)
			.with("flag", false);

		assert_eq!(
			serialize_params(&params),
			"<zeta>last?</zeta><alpha>1</alpha><flag>false</flag>"
		);
	}

	#[test]
	fn empty_params_produce_empty_fragment() {
		assert_eq!(serialize_params(&Params::new()), "");

		let envelope = build_envelope(DEFAULT_NAMESPACE, "Ping", &Params::new());
		assert!(envelope.contains(r#"<Ping xmlns="http://tempuri.org/"></Ping>"#));
	}

	#[test]
	fn values_are_escaped() {
		let params = Params::new().with("q", "a<b & \"c\"");
		let fragment = serialize_params(&params);

		assert_eq!(fragment, "<q>a&lt;b &amp; &quot;c&quot;</q>");
	}

	#[test]
	fn envelope_wraps_method_in_body() {
		let envelope = build_envelope(
			DEFAULT_NAMESPACE,
			"GetDocuments",
			&Params::new().with("folderId", 9),
		);

		assert!(envelope.starts_with(r#"<?xml version="1.0" encoding="utf-8"?>"#));
		assert!(envelope.contains(
			r#"xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/""#
		));
		assert!(envelope.contains(
			r#"<GetDocuments xmlns="http://tempuri.org/"><folderId>9</folderId></GetDocuments>"#
		));

		let body_start = envelope.find("<soap:Body>").unwrap();
		let method_start = envelope.find("<GetDocuments").unwrap();
		let body_end = envelope.find("</soap:Body>").unwrap();
		assert!(body_start < method_start && method_start < body_end);
	}

	#[test]
	fn soap_action_is_quoted() {
		assert_eq!(
			soap_action(DEFAULT_NAMESPACE, "doConnection"),
			"\"http://tempuri.org/doConnection\""
		);
	}

	#[test]
	fn xml_names() {
		assert!(is_xml_name("doConnection"));
		assert!(is_xml_name("_x-1.2"));
		assert!(!is_xml_name(""));
		assert!(!is_xml_name("-x"));
		assert!(!is_xml_name("soap:Body"));
	}
}
