//! Validated block values

use super::{BlockDef, BlockLibrary, StructMember};
use indexmap::IndexMap;
use pageblocks_forms::{FieldDescriptor, FieldValue};
use serde::Serialize;
use serde_json::Value as JsonValue;

/// A validated value tree
///
/// Struct members are kept in schema order, so serializing a value always
/// produces the same key order regardless of the raw input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum BlockValue {
	Field(FieldValue),
	Struct(IndexMap<String, BlockValue>),
	List(Vec<BlockValue>),
}

impl BlockValue {
	/// Stored JSON form of this value
	pub fn to_json(&self) -> JsonValue {
		match self {
			Self::Field(value) => value.to_json(),
			Self::Struct(members) => JsonValue::Object(
				members
					.iter()
					.map(|(name, value)| (name.clone(), value.to_json()))
					.collect(),
			),
			Self::List(items) => JsonValue::Array(items.iter().map(Self::to_json).collect()),
		}
	}

	/// Struct member by name
	pub fn get(&self, name: &str) -> Option<&BlockValue> {
		match self {
			Self::Struct(members) => members.get(name),
			_ => None,
		}
	}

	/// Primitive value of a struct member
	pub fn field(&self, name: &str) -> Option<&FieldValue> {
		match self.get(name)? {
			Self::Field(value) => Some(value),
			_ => None,
		}
	}

	/// List items, if this is a list
	pub fn items(&self) -> Option<&[BlockValue]> {
		match self {
			Self::List(items) => Some(items),
			_ => None,
		}
	}
}

/// A validated value of one registered block type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockInstance {
	pub type_name: String,
	pub value: BlockValue,
}

impl BlockInstance {
	/// Text of a member field, empty when absent or not textual
	///
	/// # Examples
	///
	/// ```
	/// use pageblocks_cms::catalog::home_library;
	/// use serde_json::json;
	///
	/// let library = home_library().unwrap();
	/// let cta = library
	///     .validate_instance("cta_section", &json!({
	///         "title": "Join us",
	///         "button_text": "Sign up",
	///         "button_link": "https://example.com/signup",
	///     }))
	///     .unwrap();
	///
	/// assert_eq!(cta.text("title"), "Join us");
	/// assert_eq!(cta.text("button_style"), "primary");
	/// ```
	pub fn text(&self, name: &str) -> &str {
		self.value
			.field(name)
			.and_then(FieldValue::as_text)
			.unwrap_or_default()
	}
}

/// Visit every primitive field in `value` together with its descriptor.
///
/// Shapes that disagree with `def` are skipped; validated values always agree.
pub(crate) fn visit_fields<'a, F>(library: &'a BlockLibrary, def: &'a BlockDef, value: &'a BlockValue, visit: &mut F)
where
	F: FnMut(&'a FieldDescriptor, &'a FieldValue),
{
	match (def, value) {
		(BlockDef::Field(field), BlockValue::Field(value)) => visit(field, value),
		(BlockDef::Struct(block), BlockValue::Struct(members)) => {
			for member in &block.members {
				let Some(member_value) = members.get(member.name()) else {
					continue;
				};
				match member {
					StructMember::Field(field) => {
						if let BlockValue::Field(value) = member_value {
							visit(field, value);
						}
					}
					StructMember::Block { def, .. } => visit_fields(library, def, member_value, visit),
				}
			}
		}
		(BlockDef::List(list), BlockValue::List(items)) => {
			for item in items {
				visit_fields(library, &list.child, item, visit);
			}
		}
		(BlockDef::Ref { type_name }, _) => {
			if let Some(schema) = library.get(type_name) {
				visit_fields(library, &schema.def, value, visit);
			}
		}
		_ => {}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	fn test_to_json_keeps_member_order() {
		// Arrange
		let mut members = IndexMap::new();
		members.insert("value".to_string(), BlockValue::Field("99%".into()));
		members.insert("label".to_string(), BlockValue::Field("Uptime".into()));
		let value = BlockValue::List(vec![BlockValue::Struct(members)]);

		// Act
		let json = serde_json::to_string(&value.to_json()).unwrap();

		// Assert
		assert_eq!(json, r#"[{"value":"99%","label":"Uptime"}]"#);
		assert_eq!(serde_json::to_value(&value).unwrap(), value.to_json());
	}

	#[rstest]
	fn test_field_lookup() {
		let mut members = IndexMap::new();
		members.insert("rating".to_string(), BlockValue::Field("5".into()));
		members.insert("stat".to_string(), BlockValue::List(Vec::new()));
		let value = BlockValue::Struct(members);

		assert_eq!(value.field("rating"), Some(&FieldValue::Text("5".to_string())));
		assert_eq!(value.field("stat"), None);
		assert_eq!(value.get("stat").and_then(BlockValue::items), Some(&[][..]));
		assert_eq!(value.get("missing"), None);
		assert_eq!(BlockValue::Field(FieldValue::Empty).to_json(), json!(null));
	}
}
