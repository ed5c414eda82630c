//! Recursive tree validation and aggregated error reports

use super::{BlockDef, BlockLibrary, BlockValue, ListBlock, StructBlock, StructMember};
use indexmap::IndexMap;
use pageblocks_forms::{ErrorKind, FieldDescriptor};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::fmt;

/// Why one node of a block tree failed validation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationErrorKind {
	#[error(transparent)]
	Field(#[from] ErrorKind),

	#[error("{}", describe_count(.min, .max, .actual))]
	CountOutOfBounds {
		min: usize,
		max: Option<usize>,
		actual: usize,
	},

	#[error("Block type not registered: {0}")]
	UnknownBlockType(String),
}

fn describe_count(min: &usize, max: &Option<usize>, actual: &usize) -> String {
	match max {
		Some(max) => format!("Expected between {min} and {max} items (got {actual})"),
		None => format!("Expected at least {min} items (got {actual})"),
	}
}

/// A validation failure at `path` inside a block tree
///
/// Paths use dots for struct members and brackets for list items, e.g.
/// `stat[2].label`. An empty path refers to the block itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
	pub path: String,
	#[serde(serialize_with = "serialize_kind")]
	pub kind: ValidationErrorKind,
}

fn serialize_kind<S: serde::Serializer>(
	kind: &ValidationErrorKind,
	serializer: S,
) -> Result<S::Ok, S::Error> {
	serializer.collect_str(kind)
}

impl ValidationError {
	pub fn new(path: impl Into<String>, kind: impl Into<ValidationErrorKind>) -> Self {
		Self {
			path: path.into(),
			kind: kind.into(),
		}
	}
}

impl fmt::Display for ValidationError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.path.is_empty() {
			write!(f, "{}", self.kind)
		} else {
			write!(f, "{}: {}", self.path, self.kind)
		}
	}
}

impl std::error::Error for ValidationError {}

/// Every problem found in one validation pass
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(&mut self, error: ValidationError) {
		self.0.push(error);
	}

	pub fn extend(&mut self, other: ValidationErrors) {
		self.0.extend(other.0);
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
		self.0.iter()
	}

	/// Error at exactly `path`, if any
	pub fn at(&self, path: &str) -> Option<&ValidationError> {
		self.0.iter().find(|error| error.path == path)
	}

	/// Re-root every path under `prefix`
	///
	/// # Examples
	///
	/// ```
	/// use pageblocks_cms::blocks::{ValidationError, ValidationErrors};
	/// use pageblocks_forms::ErrorKind;
	///
	/// let mut errors = ValidationErrors::new();
	/// errors.push(ValidationError::new("stat[0].label", ErrorKind::MissingRequired));
	///
	/// let rooted = errors.prefixed("[3]");
	/// assert_eq!(rooted.iter().next().unwrap().path, "[3].stat[0].label");
	/// ```
	pub fn prefixed(self, prefix: &str) -> Self {
		Self(
			self.0
				.into_iter()
				.map(|error| ValidationError {
					path: match (prefix.is_empty(), error.path.is_empty()) {
						(true, _) => error.path,
						(false, true) => prefix.to_string(),
						(false, false) if error.path.starts_with('[') => {
							format!("{prefix}{}", error.path)
						}
						(false, false) => format!("{prefix}.{}", error.path),
					},
					kind: error.kind,
				})
				.collect(),
		)
	}

	pub(crate) fn into_result<T>(self, value: T) -> Result<T, Self> {
		if self.is_empty() { Ok(value) } else { Err(self) }
	}
}

impl fmt::Display for ValidationErrors {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (i, error) in self.0.iter().enumerate() {
			if i > 0 {
				f.write_str("; ")?;
			}
			write!(f, "{error}")?;
		}
		Ok(())
	}
}

impl std::error::Error for ValidationErrors {}

impl IntoIterator for ValidationErrors {
	type Item = ValidationError;
	type IntoIter = std::vec::IntoIter<ValidationError>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.into_iter()
	}
}

impl<'a> IntoIterator for &'a ValidationErrors {
	type Item = &'a ValidationError;
	type IntoIter = std::slice::Iter<'a, ValidationError>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.iter()
	}
}

impl FromIterator<ValidationError> for ValidationErrors {
	fn from_iter<I: IntoIterator<Item = ValidationError>>(iter: I) -> Self {
		Self(iter.into_iter().collect())
	}
}

/// `prefix.name`, or `name` at the root
pub(crate) fn join_path(prefix: &str, name: &str) -> String {
	if prefix.is_empty() {
		name.to_string()
	} else {
		format!("{prefix}.{name}")
	}
}

/// `prefix[index]`
pub(crate) fn index_path(prefix: &str, index: usize) -> String {
	format!("{prefix}[{index}]")
}

/// Walks a raw JSON tree alongside its definition, collecting every error
pub(crate) struct Validator<'a> {
	library: &'a BlockLibrary,
	errors: ValidationErrors,
}

impl<'a> Validator<'a> {
	pub(crate) fn new(library: &'a BlockLibrary) -> Self {
		Self {
			library,
			errors: ValidationErrors::new(),
		}
	}

	pub(crate) fn finish(self, value: BlockValue) -> Result<BlockValue, ValidationErrors> {
		self.errors.into_result(value)
	}

	fn fail(&mut self, path: &str, kind: impl Into<ValidationErrorKind>) {
		self.errors.push(ValidationError::new(path, kind));
	}

	/// Validate `raw` against `def`; `raw` is `None` when the key was absent.
	///
	/// Always produces a value so that sibling members keep being checked;
	/// the value is only meaningful when no error was recorded.
	pub(crate) fn walk(&mut self, def: &BlockDef, raw: Option<&JsonValue>, path: &str) -> BlockValue {
		match def {
			BlockDef::Field(field) => self.walk_field(field, raw, path),
			BlockDef::Struct(block) => self.walk_struct(block, raw, path),
			BlockDef::List(list) => self.walk_list(list, raw, path),
			BlockDef::Ref { type_name } => match self.library.get(type_name) {
				Some(schema) => self.walk(&schema.def, raw, path),
				None => {
					self.fail(path, ValidationErrorKind::UnknownBlockType(type_name.clone()));
					BlockValue::Struct(IndexMap::new())
				}
			},
		}
	}

	fn walk_field(&mut self, field: &FieldDescriptor, raw: Option<&JsonValue>, path: &str) -> BlockValue {
		match field.clean(raw) {
			Ok(value) => BlockValue::Field(value),
			Err(err) => {
				self.fail(path, err.kind);
				BlockValue::Field(field.empty_value())
			}
		}
	}

	fn walk_struct(&mut self, block: &StructBlock, raw: Option<&JsonValue>, path: &str) -> BlockValue {
		let object = match raw {
			None | Some(JsonValue::Null) => None,
			Some(JsonValue::Object(map)) => Some(map),
			Some(_) => {
				self.fail(path, ErrorKind::TypeMismatch { expected: "object" });
				return BlockValue::Struct(IndexMap::new());
			}
		};

		let mut members = IndexMap::with_capacity(block.members.len());
		for member in &block.members {
			let name = member.name();
			let member_raw = object.and_then(|map| map.get(name));
			let member_path = join_path(path, name);
			let value = match member {
				StructMember::Field(field) => self.walk_field(field, member_raw, &member_path),
				StructMember::Block { def, .. } => self.walk(def, member_raw, &member_path),
			};
			members.insert(name.to_string(), value);
		}
		BlockValue::Struct(members)
	}

	fn walk_list(&mut self, list: &ListBlock, raw: Option<&JsonValue>, path: &str) -> BlockValue {
		let items: &[JsonValue] = match raw {
			None | Some(JsonValue::Null) => &[],
			Some(JsonValue::Array(items)) => items,
			Some(_) => {
				self.fail(path, ErrorKind::TypeMismatch { expected: "list" });
				return BlockValue::List(Vec::new());
			}
		};

		if !list.accepts_count(items.len()) {
			self.fail(
				path,
				ValidationErrorKind::CountOutOfBounds {
					min: list.min_count,
					max: list.max_count,
					actual: items.len(),
				},
			);
		}

		let values = items
			.iter()
			.enumerate()
			.map(|(index, item)| self.walk(&list.child, Some(item), &index_path(path, index)))
			.collect();
		BlockValue::List(values)
	}
}
