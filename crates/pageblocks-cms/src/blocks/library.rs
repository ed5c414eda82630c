//! Block registry built explicitly at start-up

use super::validate::Validator;
use super::value::visit_fields;
use super::{
	BlockDef, BlockInstance, BlockType, BlockValue, StructBlock, StructMember, ValidationError,
	ValidationErrorKind, ValidationErrors, direct_references,
};
use crate::assets::Media;
use crate::error::{CmsError, CmsResult};
use indexmap::IndexMap;
use pageblocks_forms::{FieldDescriptor, FieldValue};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::collections::HashSet;

/// A registered block type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockSchema {
	pub type_name: BlockType,
	pub label: Option<String>,
	pub icon: Option<String>,
	pub def: BlockDef,
	#[serde(skip_serializing_if = "Media::is_empty")]
	pub media: Media,
}

impl BlockSchema {
	pub fn new(type_name: impl Into<BlockType>, def: impl Into<BlockDef>) -> Self {
		Self {
			type_name: type_name.into(),
			label: None,
			icon: None,
			def: def.into(),
			media: Media::new(),
		}
	}

	pub fn with_label(mut self, label: impl Into<String>) -> Self {
		self.label = Some(label.into());
		self
	}

	pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
		self.icon = Some(icon.into());
		self
	}

	pub fn with_media(mut self, media: Media) -> Self {
		self.media = media;
		self
	}

	/// Editor-facing label, derived from the type name when none was declared
	pub fn label(&self) -> String {
		match &self.label {
			Some(label) => label.clone(),
			None => FieldDescriptor::char(self.type_name.as_str()).label(),
		}
	}
}

/// Registry of available block types
///
/// Registration order is preserved. A type may reference types that are
/// registered later; [`BlockLibrary::check`] reports references that never
/// got registered.
///
/// # Examples
///
/// ```
/// use pageblocks_cms::blocks::{BlockDef, BlockLibrary, BlockSchema, StructBlock};
/// use pageblocks_cms::error::CmsError;
/// use pageblocks_forms::FieldDescriptor;
///
/// let mut library = BlockLibrary::new();
/// library
///     .register(BlockSchema::new(
///         "section",
///         StructBlock::new().block("inner", BlockDef::reference("section")),
///     ))
///     .unwrap_err();
///
/// library
///     .register(BlockSchema::new(
///         "quote",
///         StructBlock::new().field(FieldDescriptor::text("quote").required()),
///     ))
///     .unwrap();
/// assert!(library.contains("quote"));
/// assert!(!library.contains("section"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct BlockLibrary {
	schemas: IndexMap<BlockType, BlockSchema>,
}

impl BlockLibrary {
	/// Create a new block library
	pub fn new() -> Self {
		Self::default()
	}

	/// Register a block type after checking its definition
	pub fn register(&mut self, schema: BlockSchema) -> CmsResult<()> {
		if schema.type_name.is_empty() {
			return Err(CmsError::InvalidSchema(
				"block type name must not be empty".to_string(),
			));
		}
		if self.schemas.contains_key(&schema.type_name) {
			return Err(CmsError::DuplicateBlockType(schema.type_name));
		}

		check_def(&schema.type_name, &schema.def)?;

		if let Some(cycle) = self.find_cycle(&schema) {
			tracing::warn!(block_type = %schema.type_name, cycle = ?cycle, "rejected cyclic block schema");
			return Err(CmsError::SchemaCycle(cycle));
		}

		tracing::debug!(block_type = %schema.type_name, "registered block type");
		self.schemas.insert(schema.type_name.clone(), schema);
		Ok(())
	}

	/// Get a registered schema
	pub fn get(&self, type_name: &str) -> Option<&BlockSchema> {
		self.schemas.get(type_name)
	}

	pub fn contains(&self, type_name: &str) -> bool {
		self.schemas.contains_key(type_name)
	}

	/// Registered type names in registration order
	pub fn type_names(&self) -> impl Iterator<Item = &str> {
		self.schemas.keys().map(String::as_str)
	}

	pub fn schemas(&self) -> impl Iterator<Item = &BlockSchema> {
		self.schemas.values()
	}

	pub fn len(&self) -> usize {
		self.schemas.len()
	}

	pub fn is_empty(&self) -> bool {
		self.schemas.is_empty()
	}

	/// Fail on the first reference to a type that was never registered
	pub fn check(&self) -> CmsResult<()> {
		for schema in self.schemas.values() {
			for reference in direct_references(&schema.def) {
				if !self.contains(reference) {
					tracing::warn!(
						block_type = %schema.type_name,
						reference,
						"block schema references an unregistered type"
					);
					return Err(CmsError::UnknownBlockType(reference.to_string()));
				}
			}
		}
		Ok(())
	}

	/// Validate raw editor or stored input against a registered type
	///
	/// Every problem in the tree is reported, not only the first.
	///
	/// # Examples
	///
	/// ```
	/// use pageblocks_cms::catalog::home_library;
	/// use serde_json::json;
	///
	/// let library = home_library().unwrap();
	/// let errors = library
	///     .validate_instance("testimonials", &json!({"quote": "Great!", "rating": "9"}))
	///     .unwrap_err();
	///
	/// let paths: Vec<&str> = errors.iter().map(|e| e.path.as_str()).collect();
	/// assert_eq!(paths, ["author", "rating"]);
	/// ```
	pub fn validate_instance(
		&self,
		type_name: &str,
		raw: &JsonValue,
	) -> Result<BlockInstance, ValidationErrors> {
		let Some(schema) = self.get(type_name) else {
			let mut errors = ValidationErrors::new();
			errors.push(ValidationError::new(
				"",
				ValidationErrorKind::UnknownBlockType(type_name.to_string()),
			));
			return Err(errors);
		};

		let mut validator = Validator::new(self);
		let value = validator.walk(&schema.def, Some(raw), "");
		let value = validator.finish(value)?;
		Ok(BlockInstance {
			type_name: type_name.to_string(),
			value,
		})
	}

	/// Every primitive field of a `type_name` value paired with its descriptor, in schema order
	pub fn fields_of<'a>(
		&'a self,
		type_name: &str,
		value: &'a BlockValue,
	) -> Vec<(&'a FieldDescriptor, &'a FieldValue)> {
		let mut fields = Vec::new();
		if let Some(schema) = self.get(type_name) {
			visit_fields(self, &schema.def, value, &mut |field, value| {
				fields.push((field, value));
			});
		}
		fields
	}

	/// Assets of `type_name` and of every type it references
	pub fn media_for(&self, type_name: &str) -> Media {
		let mut media = Media::new();
		let mut seen = HashSet::new();
		self.collect_media(type_name, &mut seen, &mut media);
		media
	}

	fn collect_media<'a>(&'a self, type_name: &'a str, seen: &mut HashSet<&'a str>, media: &mut Media) {
		if !seen.insert(type_name) {
			return;
		}
		let Some(schema) = self.get(type_name) else {
			return;
		};
		media.merge(&schema.media);
		for reference in direct_references(&schema.def) {
			self.collect_media(reference, seen, media);
		}
	}

	// Registered schemas are acyclic, so any new cycle passes through the candidate.
	fn find_cycle(&self, candidate: &BlockSchema) -> Option<Vec<String>> {
		let mut path = vec![candidate.type_name.clone()];
		let mut visited = HashSet::new();
		if self.reaches(candidate, &candidate.def, &mut path, &mut visited) {
			Some(path)
		} else {
			None
		}
	}

	fn reaches<'a>(
		&'a self,
		candidate: &'a BlockSchema,
		def: &'a BlockDef,
		path: &mut Vec<String>,
		visited: &mut HashSet<&'a str>,
	) -> bool {
		for reference in direct_references(def) {
			path.push(reference.to_string());
			if reference == candidate.type_name {
				return true;
			}
			if visited.insert(reference)
				&& let Some(next) = self.get(reference)
				&& self.reaches(candidate, &next.def, path, visited)
			{
				return true;
			}
			path.pop();
		}
		false
	}
}

fn check_def(type_name: &str, def: &BlockDef) -> CmsResult<()> {
	match def {
		BlockDef::Field(field) => check_field(type_name, field),
		BlockDef::Struct(block) => check_struct(type_name, block),
		BlockDef::List(list) => {
			if let Some(max) = list.max_count
				&& list.min_count > max
			{
				return Err(CmsError::InvalidSchema(format!(
					"{type_name}: list min_count {} is greater than max_count {max}",
					list.min_count
				)));
			}
			check_def(type_name, &list.child)
		}
		BlockDef::Ref { type_name: target } if target.is_empty() => Err(CmsError::InvalidSchema(
			format!("{type_name}: reference to an empty block type name"),
		)),
		BlockDef::Ref { .. } => Ok(()),
	}
}

fn check_struct(type_name: &str, block: &StructBlock) -> CmsResult<()> {
	let mut names = HashSet::new();
	for member in &block.members {
		if !names.insert(member.name()) {
			return Err(CmsError::InvalidSchema(format!(
				"{type_name}: member {:?} is declared twice",
				member.name()
			)));
		}
		match member {
			StructMember::Field(field) => check_field(type_name, field)?,
			StructMember::Block { name, def } => {
				if name.is_empty() {
					return Err(CmsError::InvalidSchema(format!(
						"{type_name}: member name must not be empty"
					)));
				}
				check_def(type_name, def)?;
			}
		}
	}
	Ok(())
}

fn check_field(type_name: &str, field: &FieldDescriptor) -> CmsResult<()> {
	field
		.check()
		.map_err(|err| CmsError::InvalidSchema(format!("{type_name}: {err}")))
}
