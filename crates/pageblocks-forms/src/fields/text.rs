//! Short text, long text and rich text

use crate::field::{ErrorKind, FieldDescriptor, FieldKind, FieldResult};
use crate::value::FieldValue;
use serde_json::Value as JsonValue;

pub(crate) fn clean(field: &FieldDescriptor, value: Option<&JsonValue>) -> FieldResult<FieldValue> {
	let text = match value {
		None | Some(JsonValue::Null) => None,
		Some(JsonValue::String(text)) => Some(text.as_str()),
		Some(_) => {
			return Err(field.error(ErrorKind::TypeMismatch { expected: "string" }));
		}
	};

	// Plain text is stripped like a submitted form value; rich text markup is kept verbatim.
	let text = match (field.kind, text) {
		(FieldKind::RichText, Some(text)) => Some(text),
		(_, Some(text)) => Some(text.trim()),
		(_, None) => None,
	};

	// Whitespace-only rich text is blank too, even though it is stored verbatim
	let Some(text) = text.filter(|text| !text.trim().is_empty()) else {
		return field.resolve_absent();
	};

	check_length(field, text)?;
	Ok(FieldValue::Text(text.to_string()))
}

/// Length is measured in characters, not bytes, so multi-byte input is not penalised.
pub(crate) fn check_length(field: &FieldDescriptor, text: &str) -> FieldResult<()> {
	let actual = text.chars().count();
	if let Some(max) = field.max_length
		&& actual > max
	{
		return Err(field.error(ErrorKind::TooLong { max, actual }));
	}
	Ok(())
}
