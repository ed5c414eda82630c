//! Integers with optional bounds

use crate::field::{ErrorKind, FieldDescriptor, FieldResult};
use crate::value::FieldValue;
use serde_json::Value as JsonValue;

pub(crate) fn clean(field: &FieldDescriptor, value: Option<&JsonValue>) -> FieldResult<FieldValue> {
	let number = match value {
		None | Some(JsonValue::Null) => return field.resolve_absent(),
		Some(JsonValue::Number(number)) => number.as_i64(),
		// Form posts deliver numbers as strings
		Some(JsonValue::String(text)) if text.trim().is_empty() => return field.resolve_absent(),
		Some(JsonValue::String(text)) => text.trim().parse::<i64>().ok(),
		Some(_) => None,
	};

	let Some(number) = number else {
		return Err(field.error(ErrorKind::TypeMismatch {
			expected: "integer",
		}));
	};

	let below = field.min_value.is_some_and(|min| number < min);
	let above = field.max_value.is_some_and(|max| number > max);
	if below || above {
		return Err(field.error(ErrorKind::OutOfRange {
			min: field.min_value,
			max: field.max_value,
			value: number,
		}));
	}

	Ok(FieldValue::Integer(number))
}
