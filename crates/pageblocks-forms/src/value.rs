//! Typed field values
//!
//! Values serialize to plain JSON scalars. Parsing always goes through a
//! [`FieldDescriptor`](crate::FieldDescriptor), because the JSON shape alone
//! cannot tell a short text from an image identifier.

use serde::Serialize;
use serde_json::Value as JsonValue;
use std::fmt;

/// Opaque identifier of an image managed by the image collaborator.
///
/// Numeric identifiers are normalised to their decimal string form so that
/// `42` and `"42"` refer to the same image.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
	/// Create an image reference from any string-like identifier
	///
	/// # Examples
	///
	/// ```
	/// use pageblocks_forms::ImageRef;
	///
	/// let image = ImageRef::new("42");
	/// assert_eq!(image.as_str(), "42");
	/// ```
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	/// Get the identifier as a string slice
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for ImageRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<i64> for ImageRef {
	fn from(id: i64) -> Self {
		Self(id.to_string())
	}
}

impl From<&str> for ImageRef {
	fn from(id: &str) -> Self {
		Self(id.to_string())
	}
}

/// A cleaned value for a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
	/// Short text, long text, rich text, URL or choice value
	Text(String),
	/// Boolean flag
	Bool(bool),
	/// Integer value
	Integer(i64),
	/// Reference to an image
	Image(ImageRef),
	/// No value (optional integer or image left unset)
	Empty,
}

impl FieldValue {
	/// Convert the value into its stored JSON form
	///
	/// # Examples
	///
	/// ```
	/// use pageblocks_forms::FieldValue;
	/// use serde_json::json;
	///
	/// assert_eq!(FieldValue::Integer(120).to_json(), json!(120));
	/// assert_eq!(FieldValue::Empty.to_json(), json!(null));
	/// ```
	pub fn to_json(&self) -> JsonValue {
		match self {
			Self::Text(text) => JsonValue::String(text.clone()),
			Self::Bool(flag) => JsonValue::Bool(*flag),
			Self::Integer(number) => JsonValue::from(*number),
			Self::Image(image) => JsonValue::String(image.0.clone()),
			Self::Empty => JsonValue::Null,
		}
	}

	pub fn as_text(&self) -> Option<&str> {
		match self {
			Self::Text(text) => Some(text),
			_ => None,
		}
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Self::Bool(flag) => Some(*flag),
			_ => None,
		}
	}

	pub fn as_integer(&self) -> Option<i64> {
		match self {
			Self::Integer(number) => Some(*number),
			_ => None,
		}
	}

	pub fn as_image(&self) -> Option<&ImageRef> {
		match self {
			Self::Image(image) => Some(image),
			_ => None,
		}
	}

	/// Whether the value carries no content (`Empty` or an empty string)
	pub fn is_blank(&self) -> bool {
		match self {
			Self::Empty => true,
			Self::Text(text) => text.is_empty(),
			_ => false,
		}
	}
}

impl From<&str> for FieldValue {
	fn from(text: &str) -> Self {
		Self::Text(text.to_string())
	}
}

impl From<String> for FieldValue {
	fn from(text: String) -> Self {
		Self::Text(text)
	}
}

impl From<bool> for FieldValue {
	fn from(flag: bool) -> Self {
		Self::Bool(flag)
	}
}

impl From<i64> for FieldValue {
	fn from(number: i64) -> Self {
		Self::Integer(number)
	}
}

impl From<ImageRef> for FieldValue {
	fn from(image: ImageRef) -> Self {
		Self::Image(image)
	}
}
