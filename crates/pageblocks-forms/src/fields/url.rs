//! Absolute URLs

use crate::field::{ErrorKind, FieldDescriptor, FieldResult};
use crate::fields::text::check_length;
use crate::validators::UrlValidator;
use crate::value::FieldValue;
use serde_json::Value as JsonValue;

pub(crate) fn clean(field: &FieldDescriptor, value: Option<&JsonValue>) -> FieldResult<FieldValue> {
	let text = match value {
		None | Some(JsonValue::Null) => "",
		Some(JsonValue::String(text)) => text.trim(),
		Some(_) => {
			return Err(field.error(ErrorKind::TypeMismatch { expected: "string" }));
		}
	};

	if text.is_empty() {
		return field.resolve_absent();
	}

	check_length(field, text)?;
	UrlValidator::new()
		.validate(text)
		.map_err(|kind| field.error(kind))?;

	Ok(FieldValue::Text(text.to_string()))
}
