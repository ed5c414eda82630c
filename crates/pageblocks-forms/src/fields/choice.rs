//! Enumerated values

use crate::field::{ErrorKind, FieldDescriptor, FieldResult};
use crate::value::FieldValue;
use serde_json::Value as JsonValue;

pub(crate) fn clean(field: &FieldDescriptor, value: Option<&JsonValue>) -> FieldResult<FieldValue> {
	let selected = match value {
		None | Some(JsonValue::Null) => String::new(),
		Some(JsonValue::String(text)) => text.trim().to_string(),
		// Numeric-looking choices ("25", "50") may arrive as numbers
		Some(JsonValue::Number(number)) => number.to_string(),
		Some(_) => {
			return Err(field.error(ErrorKind::TypeMismatch { expected: "string" }));
		}
	};

	if selected.is_empty() {
		return field.resolve_absent();
	}

	if field.choices.iter().any(|choice| choice.value == selected) {
		Ok(FieldValue::Text(selected))
	} else {
		Err(field.error(ErrorKind::InvalidChoice { value: selected }))
	}
}
