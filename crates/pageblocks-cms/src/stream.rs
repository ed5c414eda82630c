//! StreamField-style content streams
//!
//! A stream is an ordered list of tagged blocks. Stored streams are JSON
//! arrays of `{"type", "value", "id"}` records and are re-validated against
//! the current schemas every time they are loaded.

use crate::assets::Media;
use crate::blocks::{
	BlockInstance, BlockLibrary, BlockValue, ValidationError, ValidationErrorKind,
	ValidationErrors, index_path,
};
use crate::error::{CmsError, CmsResult};
use pageblocks_conf::{CmsSettings, StreamLoadMode};
use pageblocks_forms::{ErrorKind, FieldKind, ImageRef};
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use std::collections::HashSet;
use std::sync::{Arc, LazyLock};
use uuid::Uuid;

static TAG_REGEX: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"<[^>]*>").expect("TAG_REGEX: invalid regex pattern"));

/// The block types one stream accepts, backed by a shared library
///
/// # Examples
///
/// ```
/// use pageblocks_cms::catalog::home_library;
/// use pageblocks_cms::stream::StreamCatalog;
/// use std::sync::Arc;
///
/// let library = Arc::new(home_library().unwrap());
/// let catalog = StreamCatalog::new(library, ["hero_banner", "stats"]).unwrap();
///
/// assert!(catalog.is_allowed("stats"));
/// assert!(!catalog.is_allowed("service_card"));
/// ```
#[derive(Debug, Clone)]
pub struct StreamCatalog {
	library: Arc<BlockLibrary>,
	allowed: Vec<String>,
	max_blocks: Option<usize>,
	load_mode: StreamLoadMode,
}

impl StreamCatalog {
	/// Create a catalog allowing `allowed`, in editor order
	///
	/// Every allowed type must be registered in `library`.
	pub fn new<I, S>(library: Arc<BlockLibrary>, allowed: I) -> CmsResult<Self>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let mut names: Vec<String> = Vec::new();
		for name in allowed {
			let name = name.into();
			if !library.contains(&name) {
				return Err(CmsError::UnknownBlockType(name));
			}
			if names.contains(&name) {
				return Err(CmsError::Duplicate(name));
			}
			names.push(name);
		}

		Ok(Self {
			library,
			allowed: names,
			max_blocks: None,
			load_mode: StreamLoadMode::default(),
		})
	}

	/// Apply the stream limits and load mode from settings
	pub fn with_settings(mut self, settings: &CmsSettings) -> Self {
		self.max_blocks = settings.max_stream_blocks;
		self.load_mode = settings.stream_load_mode;
		self
	}

	pub fn with_max_blocks(mut self, max_blocks: usize) -> Self {
		self.max_blocks = Some(max_blocks);
		self
	}

	pub fn with_load_mode(mut self, load_mode: StreamLoadMode) -> Self {
		self.load_mode = load_mode;
		self
	}

	pub fn library(&self) -> &BlockLibrary {
		&self.library
	}

	pub fn allowed(&self) -> &[String] {
		&self.allowed
	}

	pub fn is_allowed(&self, block_type: &str) -> bool {
		self.allowed.iter().any(|name| name == block_type)
	}

	pub fn max_blocks(&self) -> Option<usize> {
		self.max_blocks
	}

	pub fn load_mode(&self) -> StreamLoadMode {
		self.load_mode
	}

	fn validate(&self, block_type: &str, raw: &JsonValue) -> Result<BlockInstance, ValidationErrors> {
		if !self.is_allowed(block_type) {
			return Err(single_error(
				"",
				ValidationErrorKind::UnknownBlockType(block_type.to_string()),
			));
		}
		self.library.validate_instance(block_type, raw)
	}
}

fn single_error(path: &str, kind: impl Into<ValidationErrorKind>) -> ValidationErrors {
	let mut errors = ValidationErrors::new();
	errors.push(ValidationError::new(path, kind));
	errors
}

/// A block instance in a StreamField
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamBlock {
	/// Block type
	#[serde(rename = "type")]
	pub block_type: String,

	/// Validated block value
	pub value: BlockValue,

	/// Stable block ID for editing
	pub id: Option<String>,
}

impl StreamBlock {
	/// Stored record form: `{"type", "value", "id"}`
	pub fn to_json(&self) -> JsonValue {
		let mut record = Map::new();
		record.insert("type".to_string(), JsonValue::String(self.block_type.clone()));
		record.insert("value".to_string(), self.value.to_json());
		record.insert(
			"id".to_string(),
			self.id.clone().map_or(JsonValue::Null, JsonValue::String),
		);
		JsonValue::Object(record)
	}

	pub fn instance(&self) -> BlockInstance {
		BlockInstance {
			type_name: self.block_type.clone(),
			value: self.value.clone(),
		}
	}
}

/// A block dropped by a lenient load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedBlock {
	/// Position in the stored array
	pub index: usize,
	/// Stored type tag, when one could be read
	pub block_type: Option<String>,
	/// Paths are prefixed with `[index]`
	pub errors: ValidationErrors,
}

/// Result of a lenient load: the valid blocks and a report on the rest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LenientLoad {
	pub stream: StreamField,
	pub rejected: Vec<RejectedBlock>,
}

/// StreamField containing a sequence of blocks
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct StreamField {
	/// Ordered list of blocks
	blocks: Vec<StreamBlock>,
}

impl StreamField {
	/// Create a new empty StreamField
	pub fn new() -> Self {
		Self { blocks: Vec::new() }
	}

	/// Get all blocks
	pub fn blocks(&self) -> &[StreamBlock] {
		&self.blocks
	}

	pub fn len(&self) -> usize {
		self.blocks.len()
	}

	pub fn is_empty(&self) -> bool {
		self.blocks.is_empty()
	}

	/// Position of the block with `id`
	pub fn position(&self, id: &str) -> Option<usize> {
		self.blocks
			.iter()
			.position(|block| block.id.as_deref() == Some(id))
	}

	/// Validate `raw` as a `block_type` block and add it at the end
	///
	/// The new block gets a fresh UUID v4 id.
	pub fn append(
		&mut self,
		catalog: &StreamCatalog,
		block_type: &str,
		raw: &JsonValue,
	) -> CmsResult<&StreamBlock> {
		if !catalog.is_allowed(block_type) {
			return Err(CmsError::UnknownBlockType(block_type.to_string()));
		}
		if let Some(max) = catalog.max_blocks()
			&& self.blocks.len() >= max
		{
			return Err(CmsError::Validation(single_error(
				"",
				ValidationErrorKind::CountOutOfBounds {
					min: 0,
					max: Some(max),
					actual: self.blocks.len() + 1,
				},
			)));
		}

		let instance = catalog.validate(block_type, raw).map_err(CmsError::Validation)?;
		let id = Uuid::new_v4().to_string();
		tracing::debug!(block_type, id = %id, "appended stream block");

		self.blocks.push(StreamBlock {
			block_type: instance.type_name,
			value: instance.value,
			id: Some(id),
		});
		Ok(&self.blocks[self.blocks.len() - 1])
	}

	/// Remove the block at `index`
	pub fn remove(&mut self, index: usize) -> CmsResult<StreamBlock> {
		if index >= self.blocks.len() {
			return Err(CmsError::IndexOutOfRange {
				index,
				len: self.blocks.len(),
			});
		}
		Ok(self.blocks.remove(index))
	}

	/// Move the block at `from` so that it ends up at `to`
	///
	/// # Examples
	///
	/// ```
	/// use pageblocks_cms::catalog::home_stream_catalog;
	/// use pageblocks_cms::stream::StreamField;
	/// use serde_json::json;
	///
	/// let catalog = home_stream_catalog().unwrap();
	/// let mut body = StreamField::new();
	/// body.append(&catalog, "hero_banner", &json!({})).unwrap();
	/// body.append(&catalog, "theme_selector", &json!({})).unwrap();
	///
	/// body.move_block(1, 0).unwrap();
	/// assert_eq!(body.blocks()[0].block_type, "theme_selector");
	/// ```
	pub fn move_block(&mut self, from: usize, to: usize) -> CmsResult<()> {
		let len = self.blocks.len();
		for index in [from, to] {
			if index >= len {
				return Err(CmsError::IndexOutOfRange { index, len });
			}
		}
		let block = self.blocks.remove(from);
		self.blocks.insert(to, block);
		Ok(())
	}

	/// Lossless, order-preserving stored form
	pub fn serialize(&self) -> JsonValue {
		JsonValue::Array(self.blocks.iter().map(StreamBlock::to_json).collect())
	}

	/// Load a stored stream, failing if any block no longer validates
	///
	/// Every failing block is reported, with paths prefixed by its index.
	pub fn deserialize(catalog: &StreamCatalog, raw: &JsonValue) -> CmsResult<Self> {
		let records = stored_records(raw)?;
		let mut errors = check_stored_count(catalog, records.len());
		let mut blocks = Vec::with_capacity(records.len());

		for (index, record) in records.iter().enumerate() {
			match load_record(catalog, index, record) {
				Ok(block) => blocks.push(block),
				Err(rejected) => errors.extend(rejected.errors),
			}
		}

		if !errors.is_empty() {
			tracing::warn!(
				errors = errors.len(),
				report = %errors,
				"stored stream no longer matches its schemas"
			);
			return Err(CmsError::StoredContentMismatch(errors));
		}
		Ok(Self { blocks })
	}

	/// Load a stored stream, keeping valid blocks and reporting the rest
	///
	/// Only a stored value that is not a stream at all is an error.
	pub fn deserialize_lenient(catalog: &StreamCatalog, raw: &JsonValue) -> CmsResult<LenientLoad> {
		let records = stored_records(raw)?;
		let mut blocks = Vec::with_capacity(records.len());
		let mut rejected = Vec::new();

		for (index, record) in records.iter().enumerate() {
			if let Some(max) = catalog.max_blocks()
				&& blocks.len() >= max
			{
				rejected.push(RejectedBlock {
					index,
					block_type: record_type(record).map(str::to_string),
					errors: single_error(
						&index_path("", index),
						ValidationErrorKind::CountOutOfBounds {
							min: 0,
							max: Some(max),
							actual: records.len(),
						},
					),
				});
				continue;
			}
			match load_record(catalog, index, record) {
				Ok(block) => blocks.push(block),
				Err(block) => rejected.push(block),
			}
		}

		for block in &rejected {
			tracing::warn!(
				index = block.index,
				block_type = block.block_type.as_deref().unwrap_or("?"),
				report = %block.errors,
				"dropped stored block that no longer matches its schema"
			);
		}
		Ok(LenientLoad {
			stream: Self { blocks },
			rejected,
		})
	}

	/// Load using the catalog's configured load mode
	pub fn load(catalog: &StreamCatalog, raw: &JsonValue) -> CmsResult<Self> {
		match catalog.load_mode() {
			StreamLoadMode::Strict => Self::deserialize(catalog, raw),
			StreamLoadMode::Lenient => Ok(Self::deserialize_lenient(catalog, raw)?.stream),
		}
	}

	/// Text of every text-like field, for search indexing
	///
	/// Rich text is stripped of tags. Choice values, URLs and flags are not
	/// searchable content.
	pub fn searchable_content(&self, catalog: &StreamCatalog) -> String {
		let library = catalog.library();
		let mut parts = Vec::new();
		for block in &self.blocks {
			for (field, value) in library.fields_of(&block.block_type, &block.value) {
				if !field.kind.is_textual() {
					continue;
				}
				let Some(text) = value.as_text() else {
					continue;
				};
				let text = if field.kind == FieldKind::RichText {
					strip_tags(text)
				} else {
					text.split_whitespace().collect::<Vec<_>>().join(" ")
				};
				if !text.is_empty() {
					parts.push(text);
				}
			}
		}
		parts.join("\n")
	}

	/// Every image referenced by the stream, in order, without duplicates
	pub fn image_refs(&self, catalog: &StreamCatalog) -> Vec<ImageRef> {
		let library = catalog.library();
		let mut seen = HashSet::new();
		let mut images = Vec::new();
		for block in &self.blocks {
			for (_, value) in library.fields_of(&block.block_type, &block.value) {
				if let Some(image) = value.as_image()
					&& seen.insert(image.clone())
				{
					images.push(image.clone());
				}
			}
		}
		images
	}

	/// Assets needed to render the stream
	pub fn media(&self, catalog: &StreamCatalog) -> Media {
		let mut media = Media::new();
		for block in &self.blocks {
			media.merge(&catalog.library().media_for(&block.block_type));
		}
		media
	}

	/// First block of `block_type`
	pub fn first_of(&self, block_type: &str) -> Option<&StreamBlock> {
		self.blocks.iter().find(|block| block.block_type == block_type)
	}
}

fn strip_tags(html: &str) -> String {
	TAG_REGEX
		.replace_all(html, " ")
		.split_whitespace()
		.collect::<Vec<_>>()
		.join(" ")
}

fn stored_records(raw: &JsonValue) -> CmsResult<&[JsonValue]> {
	match raw {
		JsonValue::Array(records) => Ok(records),
		// An empty stream may be stored as null
		JsonValue::Null => Ok(&[]),
		_ => Err(CmsError::StoredContentMismatch(single_error(
			"",
			ErrorKind::TypeMismatch {
				expected: "stream",
			},
		))),
	}
}

fn check_stored_count(catalog: &StreamCatalog, count: usize) -> ValidationErrors {
	match catalog.max_blocks() {
		Some(max) if count > max => single_error(
			"",
			ValidationErrorKind::CountOutOfBounds {
				min: 0,
				max: Some(max),
				actual: count,
			},
		),
		_ => ValidationErrors::new(),
	}
}

fn record_type(record: &JsonValue) -> Option<&str> {
	record.get("type").and_then(JsonValue::as_str)
}

fn load_record(catalog: &StreamCatalog, index: usize, record: &JsonValue) -> Result<StreamBlock, RejectedBlock> {
	let prefix = index_path("", index);
	let reject = |errors: ValidationErrors| RejectedBlock {
		index,
		block_type: record_type(record).map(str::to_string),
		errors,
	};

	let Some(block_type) = record_type(record) else {
		return Err(reject(single_error(
			&prefix,
			ErrorKind::TypeMismatch {
				expected: "stream block record",
			},
		)));
	};
	let id = match record.get("id") {
		None | Some(JsonValue::Null) => Uuid::new_v4().to_string(),
		Some(JsonValue::String(id)) => id.clone(),
		Some(_) => {
			return Err(reject(single_error(
				&format!("{prefix}.id"),
				ErrorKind::TypeMismatch { expected: "string" },
			)));
		}
	};
	let raw_value = record.get("value").unwrap_or(&JsonValue::Null);

	catalog
		.validate(block_type, raw_value)
		.map(|instance| StreamBlock {
			block_type: instance.type_name,
			value: instance.value,
			id: Some(id),
		})
		.map_err(|errors| reject(errors.prefixed(&prefix)))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::catalog::home_stream_catalog;
	use rstest::{fixture, rstest};
	use serde_json::json;

	#[fixture]
	fn catalog() -> StreamCatalog {
		home_stream_catalog().unwrap()
	}

	fn cta(title: &str) -> JsonValue {
		json!({
			"title": title,
			"button_text": "Go",
			"button_link": "https://example.com/go"
		})
	}

	#[rstest]
	fn test_append_assigns_uuid_and_keeps_order(catalog: StreamCatalog) {
		// Arrange
		let mut stream = StreamField::new();

		// Act
		stream.append(&catalog, "cta_section", &cta("first")).unwrap();
		stream.append(&catalog, "cta_section", &cta("second")).unwrap();

		// Assert
		let titles: Vec<_> = stream
			.blocks()
			.iter()
			.map(|b| b.value.field("title").and_then(|v| v.as_text()).unwrap().to_string())
			.collect();
		assert_eq!(titles, ["first", "second"]);
		let id = stream.blocks()[0].id.as_deref().unwrap();
		assert!(Uuid::parse_str(id).is_ok());
		assert_ne!(stream.blocks()[0].id, stream.blocks()[1].id);
	}

	#[rstest]
	fn test_append_rejects_type_not_in_catalog() {
		// Arrange
		let library = Arc::new(crate::catalog::home_library().unwrap());
		let catalog = StreamCatalog::new(library, ["stats"]).unwrap();
		let mut stream = StreamField::new();

		// Act
		let result = stream.append(&catalog, "cta_section", &cta("x"));

		// Assert
		assert!(matches!(result, Err(CmsError::UnknownBlockType(t)) if t == "cta_section"));
		assert!(stream.is_empty());
	}

	#[rstest]
	fn test_append_invalid_block_is_validation_error(catalog: StreamCatalog) {
		let mut stream = StreamField::new();

		let result = stream.append(&catalog, "cta_section", &json!({"title": "x"}));

		match result {
			Err(CmsError::Validation(errors)) => assert_eq!(errors.len(), 2),
			other => panic!("expected validation error, got {other:?}"),
		}
	}

	#[rstest]
	fn test_append_respects_max_blocks(catalog: StreamCatalog) {
		let catalog = catalog.with_max_blocks(1);
		let mut stream = StreamField::new();
		stream.append(&catalog, "cta_section", &cta("one")).unwrap();

		let result = stream.append(&catalog, "cta_section", &cta("two"));

		assert!(matches!(result, Err(CmsError::Validation(_))));
		assert_eq!(stream.len(), 1);
	}

	#[rstest]
	fn test_serialize_record_shape(catalog: StreamCatalog) {
		// Arrange
		let mut stream = StreamField::new();
		stream
			.append(&catalog, "stats", &json!({"stat": [{"value": "99%", "label": "Uptime"}]}))
			.unwrap();

		// Act
		let stored = stream.serialize();

		// Assert
		let record = &stored[0];
		assert_eq!(record["type"], "stats");
		assert_eq!(
			record["value"],
			json!({"stat": [{"value": "99%", "label": "Uptime", "description": ""}]})
		);
		assert_eq!(record["id"], json!(stream.blocks()[0].id));
		assert_eq!(serde_json::to_value(&stream).unwrap(), stored);
	}

	#[rstest]
	fn test_deserialize_reports_every_failing_block(catalog: StreamCatalog) {
		// Arrange
		let stored = json!([
			{"type": "cta_section", "value": cta("ok"), "id": "a"},
			{"type": "stats", "value": {"stat": []}, "id": "b"},
			{"type": "gallery", "value": {}, "id": "c"},
			{"value": {}}
		]);

		// Act
		let result = StreamField::deserialize(&catalog, &stored);

		// Assert
		let Err(CmsError::StoredContentMismatch(errors)) = result else {
			panic!("expected stored content mismatch");
		};
		let paths: Vec<&str> = errors.iter().map(|e| e.path.as_str()).collect();
		assert_eq!(paths, ["[1].stat", "[2]", "[3]"]);
		assert_eq!(
			errors.at("[2]").map(|e| &e.kind),
			Some(&ValidationErrorKind::UnknownBlockType("gallery".to_string()))
		);
	}

	#[rstest]
	fn test_deserialize_lenient_keeps_valid_blocks(catalog: StreamCatalog) {
		// Arrange
		let stored = json!([
			{"type": "cta_section", "value": cta("kept"), "id": "a"},
			{"type": "stats", "value": {"stat": []}, "id": "b"},
			{"type": "cta_section", "value": cta("also kept"), "id": "c"}
		]);

		// Act
		let load = StreamField::deserialize_lenient(&catalog, &stored).unwrap();

		// Assert
		let ids: Vec<_> = load.stream.blocks().iter().map(|b| b.id.clone().unwrap()).collect();
		assert_eq!(ids, ["a", "c"]);
		assert_eq!(load.rejected.len(), 1);
		assert_eq!(load.rejected[0].index, 1);
		assert_eq!(load.rejected[0].block_type.as_deref(), Some("stats"));
	}

	#[rstest]
	fn test_load_follows_configured_mode(catalog: StreamCatalog) {
		let stored = json!([{"type": "gallery", "value": {}, "id": "x"}]);

		let strict = StreamField::load(&catalog, &stored);
		let lenient = StreamField::load(&catalog.with_load_mode(StreamLoadMode::Lenient), &stored);

		assert!(matches!(strict, Err(CmsError::StoredContentMismatch(_))));
		assert!(lenient.unwrap().is_empty());
	}

	#[rstest]
	fn test_deserialize_rejects_non_stream(catalog: StreamCatalog) {
		let result = StreamField::deserialize(&catalog, &json!({"type": "stats"}));

		assert!(matches!(result, Err(CmsError::StoredContentMismatch(_))));
		assert!(StreamField::deserialize(&catalog, &JsonValue::Null).unwrap().is_empty());
	}

	#[rstest]
	fn test_missing_id_gets_generated(catalog: StreamCatalog) {
		let stored = json!([{"type": "cta_section", "value": cta("x")}]);

		let stream = StreamField::deserialize(&catalog, &stored).unwrap();

		assert!(stream.blocks()[0].id.is_some());
	}

	#[rstest]
	fn test_remove_and_move_bounds(catalog: StreamCatalog) {
		// Arrange
		let mut stream = StreamField::new();
		for title in ["a", "b", "c"] {
			stream.append(&catalog, "cta_section", &cta(title)).unwrap();
		}
		let first_id = stream.blocks()[0].id.clone().unwrap();

		// Act
		stream.move_block(0, 2).unwrap();
		let removed = stream.remove(1).unwrap();

		// Assert
		assert_eq!(stream.position(&first_id), Some(1));
		assert_eq!(removed.value.field("title").and_then(|v| v.as_text()), Some("c"));
		assert!(matches!(
			stream.move_block(0, 5),
			Err(CmsError::IndexOutOfRange { index: 5, len: 2 })
		));
		assert!(matches!(stream.remove(2), Err(CmsError::IndexOutOfRange { .. })));
	}

	#[rstest]
	fn test_searchable_content_strips_rich_text(catalog: StreamCatalog) {
		// Arrange
		let mut stream = StreamField::new();
		stream
			.append(
				&catalog,
				"hero_banner",
				&json!({
					"headline": "Build faster",
					"description": "<p>Ship <b>every</b> day</p>",
					"cta_primary_link": "https://example.com"
				}),
			)
			.unwrap();

		// Act
		let content = stream.searchable_content(&catalog);

		// Assert
		assert_eq!(content, "Build faster\nShip every day");
	}

	#[rstest]
	fn test_image_refs_are_deduplicated(catalog: StreamCatalog) {
		// Arrange
		let mut stream = StreamField::new();
		stream
			.append(&catalog, "hero_banner", &json!({"background_image": 7}))
			.unwrap();
		stream
			.append(
				&catalog,
				"testimonials",
				&json!({"quote": "q", "author": "a", "avatar": "7"}),
			)
			.unwrap();
		stream
			.append(&catalog, "features", &json!({"title": "t", "description": "d", "icon": 9}))
			.unwrap();

		// Act
		let images = stream.image_refs(&catalog);

		// Assert
		assert_eq!(images, [ImageRef::from(7), ImageRef::from(9)]);
	}

	#[rstest]
	fn test_media_is_merged_across_blocks(catalog: StreamCatalog) {
		let mut stream = StreamField::new();
		stream
			.append(&catalog, "hero_carousel", &json!({"slides": [{}]}))
			.unwrap();
		stream
			.append(&catalog, "hero_carousel", &json!({"slides": [{}]}))
			.unwrap();
		stream.append(&catalog, "hero_banner", &json!({})).unwrap();

		let media = stream.media(&catalog);

		assert_eq!(media.css(), ["css/hero-carousel.css"]);
		assert_eq!(media.js(), ["js/hero-carousel.js", "js/hero-banner.js"]);
	}

	#[rstest]
	fn test_catalog_rejects_unregistered_and_duplicate_types() {
		let library = Arc::new(crate::catalog::home_library().unwrap());

		assert!(matches!(
			StreamCatalog::new(library.clone(), ["gallery"]),
			Err(CmsError::UnknownBlockType(_))
		));
		assert!(matches!(
			StreamCatalog::new(library, ["stats", "stats"]),
			Err(CmsError::Duplicate(_))
		));
	}
}
