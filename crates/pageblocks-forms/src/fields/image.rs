//! Image references
//!
//! Only the shape of the identifier is checked here; whether the image exists
//! is the image resolver's concern.

use crate::field::{ErrorKind, FieldDescriptor, FieldResult};
use crate::value::{FieldValue, ImageRef};
use serde_json::Value as JsonValue;

pub(crate) fn clean(field: &FieldDescriptor, value: Option<&JsonValue>) -> FieldResult<FieldValue> {
	match value {
		None | Some(JsonValue::Null) => field.resolve_absent(),
		Some(JsonValue::String(id)) if id.trim().is_empty() => field.resolve_absent(),
		Some(JsonValue::String(id)) => Ok(FieldValue::Image(ImageRef::new(id.trim()))),
		Some(JsonValue::Number(number)) => match number.as_i64() {
			Some(id) => Ok(FieldValue::Image(ImageRef::from(id))),
			None => Err(field.error(ErrorKind::TypeMismatch {
				expected: "image identifier",
			})),
		},
		Some(_) => Err(field.error(ErrorKind::TypeMismatch {
			expected: "image identifier",
		})),
	}
}
