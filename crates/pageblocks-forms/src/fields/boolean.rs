//! Boolean flags

use crate::field::{ErrorKind, FieldDescriptor, FieldResult};
use crate::value::FieldValue;
use serde_json::Value as JsonValue;

// Booleans never fail the required check: an unticked checkbox is a value.
pub(crate) fn clean(field: &FieldDescriptor, value: Option<&JsonValue>) -> FieldResult<FieldValue> {
	match value {
		None | Some(JsonValue::Null) => Ok(field
			.default
			.clone()
			.unwrap_or(FieldValue::Bool(false))),
		Some(JsonValue::Bool(flag)) => Ok(FieldValue::Bool(*flag)),
		Some(_) => Err(field.error(ErrorKind::TypeMismatch {
			expected: "boolean",
		})),
	}
}
