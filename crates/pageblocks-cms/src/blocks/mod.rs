//! StreamField-style content blocks
//!
//! Blocks are declared as data: a [`BlockDef`] tree of field descriptors,
//! struct blocks, list blocks and references to other registered block types.
//! The [`BlockLibrary`] owns the registered schemas and validates raw JSON into
//! [`BlockInstance`]s.

mod library;
mod validate;
mod value;

pub use library::{BlockLibrary, BlockSchema};
pub use validate::{ValidationError, ValidationErrorKind, ValidationErrors};
pub use value::{BlockInstance, BlockValue};

pub(crate) use validate::{index_path, join_path};

use pageblocks_forms::FieldDescriptor;
use serde::Serialize;

/// Block type identifier
pub type BlockType = String;

/// Definition of one node in a block schema tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "block", rename_all = "snake_case")]
pub enum BlockDef {
	/// A single primitive value
	Field(FieldDescriptor),
	/// Fixed set of named members
	Struct(StructBlock),
	/// Repeated child with count bounds
	List(ListBlock),
	/// Another registered block type, resolved through the library
	Ref { type_name: BlockType },
}

impl BlockDef {
	/// Reference a registered block type by name
	pub fn reference(type_name: impl Into<BlockType>) -> Self {
		Self::Ref {
			type_name: type_name.into(),
		}
	}

	/// Repeated `child` with `min_count..=max_count` elements
	pub fn list(child: impl Into<BlockDef>, min_count: usize, max_count: Option<usize>) -> Self {
		Self::List(ListBlock::new(child, min_count, max_count))
	}
}

impl From<FieldDescriptor> for BlockDef {
	fn from(field: FieldDescriptor) -> Self {
		Self::Field(field)
	}
}

impl From<StructBlock> for BlockDef {
	fn from(block: StructBlock) -> Self {
		Self::Struct(block)
	}
}

impl From<ListBlock> for BlockDef {
	fn from(block: ListBlock) -> Self {
		Self::List(block)
	}
}

/// One named member of a struct block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StructMember {
	Field(FieldDescriptor),
	Block { name: String, def: BlockDef },
}

impl StructMember {
	pub fn name(&self) -> &str {
		match self {
			Self::Field(field) => &field.name,
			Self::Block { name, .. } => name,
		}
	}
}

/// Fixed-shape block: every member is present in every instance
///
/// # Examples
///
/// ```
/// use pageblocks_cms::blocks::{BlockDef, StructBlock};
/// use pageblocks_forms::FieldDescriptor;
///
/// let stat = StructBlock::new()
///     .field(FieldDescriptor::char("value").required().with_max_length(20))
///     .field(FieldDescriptor::char("label").required().with_max_length(50));
///
/// let stats = StructBlock::new().block("stat", BlockDef::list(stat, 1, Some(6)));
/// assert_eq!(stats.members.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct StructBlock {
	pub members: Vec<StructMember>,
}

impl StructBlock {
	pub fn new() -> Self {
		Self::default()
	}

	/// Append a primitive field member
	pub fn field(mut self, field: FieldDescriptor) -> Self {
		self.members.push(StructMember::Field(field));
		self
	}

	/// Append several primitive field members in order
	pub fn fields(mut self, fields: impl IntoIterator<Item = FieldDescriptor>) -> Self {
		self.members
			.extend(fields.into_iter().map(StructMember::Field));
		self
	}

	/// Append a nested block member
	pub fn block(mut self, name: impl Into<String>, def: impl Into<BlockDef>) -> Self {
		self.members.push(StructMember::Block {
			name: name.into(),
			def: def.into(),
		});
		self
	}

	pub fn member(&self, name: &str) -> Option<&StructMember> {
		self.members.iter().find(|member| member.name() == name)
	}
}

/// Repeated block with count bounds
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListBlock {
	pub child: Box<BlockDef>,
	pub min_count: usize,
	/// `None` means unbounded
	pub max_count: Option<usize>,
}

impl ListBlock {
	pub fn new(child: impl Into<BlockDef>, min_count: usize, max_count: Option<usize>) -> Self {
		Self {
			child: Box::new(child.into()),
			min_count,
			max_count,
		}
	}

	/// Whether `count` elements satisfy the bounds
	pub fn accepts_count(&self, count: usize) -> bool {
		count >= self.min_count && self.max_count.is_none_or(|max| count <= max)
	}
}

/// Names of block types referenced anywhere inside `def` (not following references)
pub(crate) fn direct_references(def: &BlockDef) -> Vec<&str> {
	let mut found = Vec::new();
	collect_references(def, &mut found);
	found
}

fn collect_references<'a>(def: &'a BlockDef, found: &mut Vec<&'a str>) {
	match def {
		BlockDef::Field(_) => {}
		BlockDef::Ref { type_name } => found.push(type_name),
		BlockDef::List(list) => collect_references(&list.child, found),
		BlockDef::Struct(block) => {
			for member in &block.members {
				if let StructMember::Block { def, .. } = member {
					collect_references(def, found);
				}
			}
		}
	}
}
