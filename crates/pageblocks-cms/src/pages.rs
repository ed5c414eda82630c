//! Home page records and the page tree
//!
//! A [`HomePage`] owns its scalar fields and one content stream. Where a page
//! may be placed is declared as data in [`PageTypeRules`] and enforced by the
//! [`PageTree`].

use crate::blocks::{ValidationError, ValidationErrors, join_path};
use crate::error::{CmsError, CmsResult};
use crate::stream::{StreamCatalog, StreamField};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use pageblocks_forms::{FieldDescriptor, FieldValue, SlugValidator};
use serde_json::{Map, Value as JsonValue};
use uuid::Uuid;

/// Generic page type every site root uses
pub const GENERIC_PAGE: &str = "cms.Page";

/// The home page type
pub const HOME_PAGE: &str = "home.HomePage";

const ANY_PAGE_TYPE: &str = "*";

/// Placement rules of one page type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageTypeRules {
	pub type_name: &'static str,
	/// Types allowed as children; `*` allows any
	pub subpage_types: &'static [&'static str],
	/// Types allowed as parent; `*` allows any
	pub parent_page_types: &'static [&'static str],
}

impl PageTypeRules {
	pub const GENERIC: PageTypeRules = PageTypeRules {
		type_name: GENERIC_PAGE,
		subpage_types: &[ANY_PAGE_TYPE],
		parent_page_types: &[ANY_PAGE_TYPE],
	};

	pub const HOME: PageTypeRules = PageTypeRules {
		type_name: HOME_PAGE,
		subpage_types: &[HOME_PAGE],
		parent_page_types: &[GENERIC_PAGE],
	};

	/// Rules of a known page type
	pub fn for_type(type_name: &str) -> Option<PageTypeRules> {
		[Self::GENERIC, Self::HOME]
			.into_iter()
			.find(|rules| rules.type_name == type_name)
	}

	pub fn allows_subpage(&self, type_name: &str) -> bool {
		allows(self.subpage_types, type_name)
	}

	pub fn allows_parent(&self, type_name: &str) -> bool {
		allows(self.parent_page_types, type_name)
	}

	/// A child needs the parent's consent and the parent needs the child's
	///
	/// # Examples
	///
	/// ```
	/// use pageblocks_cms::pages::PageTypeRules;
	///
	/// assert!(PageTypeRules::HOME.can_create_under(&PageTypeRules::GENERIC));
	/// // The parent allows home pages, but home pages only live under generic pages
	/// assert!(!PageTypeRules::HOME.can_create_under(&PageTypeRules::HOME));
	/// ```
	pub fn can_create_under(&self, parent: &PageTypeRules) -> bool {
		parent.allows_subpage(self.type_name) && self.allows_parent(parent.type_name)
	}
}

fn allows(types: &[&str], type_name: &str) -> bool {
	types.iter().any(|allowed| *allowed == ANY_PAGE_TYPE || *allowed == type_name)
}

/// Scalar fields of a home page, in editor order
pub fn scalar_fields() -> Vec<FieldDescriptor> {
	vec![
		FieldDescriptor::char("title").required().with_max_length(255),
		FieldDescriptor::char("slug").required().with_max_length(255),
		FieldDescriptor::char("banner_title")
			.with_max_length(255)
			.with_help_text("SEO-friendly title for the homepage"),
		FieldDescriptor::char("banner_subtitle")
			.with_max_length(500)
			.with_help_text("Subtitle for the homepage banner"),
		FieldDescriptor::char("about_title")
			.with_max_length(255)
			.with_help_text("Title for the about section"),
		FieldDescriptor::text("about_description")
			.with_help_text("Description for the about section"),
	]
}

/// Home page record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomePage {
	pub id: String,
	pub title: String,
	pub slug: String,
	pub banner_title: String,
	pub banner_subtitle: String,
	pub about_title: String,
	pub about_description: String,
	pub content: StreamField,
	pub parent: Option<String>,
	pub first_published_at: Option<DateTime<Utc>>,
	pub last_published_at: Option<DateTime<Utc>>,
}

impl HomePage {
	/// Fields exposed to search indexing, in index order
	pub const SEARCH_FIELDS: [&'static str; 6] = [
		"title",
		"banner_title",
		"banner_subtitle",
		"about_title",
		"about_description",
		"content",
	];

	/// Create an unpublished page with a fresh id and an empty stream
	pub fn new(title: impl Into<String>, slug: impl Into<String>) -> Self {
		Self {
			id: Uuid::new_v4().to_string(),
			title: title.into(),
			slug: slug.into(),
			banner_title: String::new(),
			banner_subtitle: String::new(),
			about_title: String::new(),
			about_description: String::new(),
			content: StreamField::new(),
			parent: None,
			first_published_at: None,
			last_published_at: None,
		}
	}

	pub fn search_fields() -> &'static [&'static str] {
		&Self::SEARCH_FIELDS
	}

	pub fn rules() -> PageTypeRules {
		PageTypeRules::HOME
	}

	fn scalar(&self, name: &str) -> &str {
		match name {
			"title" => &self.title,
			"slug" => &self.slug,
			"banner_title" => &self.banner_title,
			"banner_subtitle" => &self.banner_subtitle,
			"about_title" => &self.about_title,
			"about_description" => &self.about_description,
			_ => "",
		}
	}

	/// Check scalar fields and re-check every stream block against `catalog`
	///
	/// Stream errors are reported under `content[i]`.
	pub fn validate(&self, catalog: &StreamCatalog) -> CmsResult<()> {
		let mut errors = validate_scalars(|name| Some(JsonValue::String(self.scalar(name).to_string())));

		for (index, block) in self.content.blocks().iter().enumerate() {
			let single = JsonValue::Array(vec![block.to_json()]);
			if let Err(CmsError::StoredContentMismatch(block_errors)) =
				StreamField::deserialize(catalog, &single)
			{
				// Rebase `[0]...` onto this block's real position
				for error in block_errors {
					let path = error.path.strip_prefix("[0]").unwrap_or(&error.path);
					errors.push(ValidationError {
						path: format!("content[{index}]{path}"),
						kind: error.kind,
					});
				}
			}
		}

		if errors.is_empty() {
			Ok(())
		} else {
			Err(CmsError::Validation(errors))
		}
	}

	/// Record a publication at `now`
	pub fn mark_published(&mut self, now: DateTime<Utc>) {
		self.first_published_at.get_or_insert(now);
		self.last_published_at = Some(now);
	}

	pub fn is_published(&self) -> bool {
		self.last_published_at.is_some()
	}

	/// Text of each search field; `content` is the stream's searchable text
	///
	/// # Examples
	///
	/// ```
	/// use pageblocks_cms::catalog::home_stream_catalog;
	/// use pageblocks_cms::pages::HomePage;
	///
	/// let catalog = home_stream_catalog().unwrap();
	/// let mut page = HomePage::new("Welcome", "home");
	/// page.about_title = "About us".to_string();
	///
	/// let document = page.search_document(&catalog);
	/// assert_eq!(document["title"], "Welcome");
	/// assert_eq!(document["about_title"], "About us");
	/// assert_eq!(document["content"], "");
	/// ```
	pub fn search_document(&self, catalog: &StreamCatalog) -> IndexMap<&'static str, String> {
		Self::SEARCH_FIELDS
			.into_iter()
			.map(|name| {
				let text = match name {
					"content" => self.content.searchable_content(catalog),
					other => self.scalar(other).to_string(),
				};
				(name, text)
			})
			.collect()
	}

	/// Stored form of the page
	pub fn to_json(&self) -> JsonValue {
		let mut object = Map::new();
		object.insert("id".to_string(), JsonValue::String(self.id.clone()));
		for field in scalar_fields() {
			object.insert(
				field.name.clone(),
				JsonValue::String(self.scalar(&field.name).to_string()),
			);
		}
		object.insert("content".to_string(), self.content.serialize());
		object.insert(
			"parent".to_string(),
			self.parent.clone().map_or(JsonValue::Null, JsonValue::String),
		);
		for (name, at) in [
			("first_published_at", self.first_published_at),
			("last_published_at", self.last_published_at),
		] {
			object.insert(
				name.to_string(),
				at.map_or(JsonValue::Null, |at| JsonValue::String(at.to_rfc3339())),
			);
		}
		JsonValue::Object(object)
	}

	/// Load a stored page, re-validating scalars and content
	///
	/// The stream follows the catalog's load mode. Any failure is reported as
	/// stored content that no longer matches the schema.
	pub fn from_json(catalog: &StreamCatalog, raw: &JsonValue) -> CmsResult<Self> {
		let Some(object) = raw.as_object() else {
			let mut errors = ValidationErrors::new();
			errors.push(ValidationError::new(
				"",
				pageblocks_forms::ErrorKind::TypeMismatch { expected: "object" },
			));
			return Err(CmsError::StoredContentMismatch(errors));
		};

		let mut errors = validate_scalars(|name| object.get(name).cloned());
		let id = match object.get("id").and_then(JsonValue::as_str) {
			Some(id) if !id.is_empty() => id.to_string(),
			_ => {
				errors.push(ValidationError::new(
					"id",
					pageblocks_forms::ErrorKind::MissingRequired,
				));
				String::new()
			}
		};
		let first_published_at = read_timestamp(object, "first_published_at", &mut errors);
		let last_published_at = read_timestamp(object, "last_published_at", &mut errors);

		let content = match StreamField::load(catalog, object.get("content").unwrap_or(&JsonValue::Null)) {
			Ok(content) => Some(content),
			Err(CmsError::StoredContentMismatch(stream_errors)) => {
				errors.extend(stream_errors.prefixed("content"));
				None
			}
			Err(other) => return Err(other),
		};

		if !errors.is_empty() {
			tracing::warn!(page_id = %id, report = %errors, "stored page no longer matches its schema");
			return Err(CmsError::StoredContentMismatch(errors));
		}

		let text = |name: &str| {
			object
				.get(name)
				.and_then(JsonValue::as_str)
				.map(str::to_string)
				.unwrap_or_default()
		};
		Ok(Self {
			id,
			title: text("title"),
			slug: text("slug"),
			banner_title: text("banner_title"),
			banner_subtitle: text("banner_subtitle"),
			about_title: text("about_title"),
			about_description: text("about_description"),
			content: content.unwrap_or_default(),
			parent: object
				.get("parent")
				.and_then(JsonValue::as_str)
				.map(str::to_string),
			first_published_at,
			last_published_at,
		})
	}
}

fn validate_scalars(value_of: impl Fn(&str) -> Option<JsonValue>) -> ValidationErrors {
	let mut errors = ValidationErrors::new();
	for field in scalar_fields() {
		let raw = value_of(&field.name);
		match field.clean(raw.as_ref()) {
			// Slugs are checked as stored; surrounding whitespace is not a valid slug
			Ok(FieldValue::Text(_)) if field.name == "slug" => {
				let slug = raw.as_ref().and_then(JsonValue::as_str).unwrap_or_default();
				if let Err(kind) = SlugValidator::new().validate(slug) {
					errors.push(ValidationError::new("slug", kind));
				}
			}
			Ok(_) => {}
			Err(err) => errors.push(ValidationError::new(field.name.as_str(), err.kind)),
		}
	}
	errors
}

fn read_timestamp(
	object: &Map<String, JsonValue>,
	name: &str,
	errors: &mut ValidationErrors,
) -> Option<DateTime<Utc>> {
	match object.get(name) {
		None | Some(JsonValue::Null) => None,
		Some(JsonValue::String(text)) => match DateTime::parse_from_rfc3339(text) {
			Ok(at) => Some(at.with_timezone(&Utc)),
			Err(_) => {
				errors.push(ValidationError::new(
					name,
					pageblocks_forms::ErrorKind::TypeMismatch {
						expected: "RFC 3339 timestamp",
					},
				));
				None
			}
		},
		Some(_) => {
			errors.push(ValidationError::new(
				name,
				pageblocks_forms::ErrorKind::TypeMismatch {
					expected: "RFC 3339 timestamp",
				},
			));
			None
		}
	}
}

/// One placed page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageNode {
	pub id: String,
	pub type_name: &'static str,
	pub slug: String,
	pub parent: Option<String>,
}

/// Page hierarchy with type placement rules
///
/// # Examples
///
/// ```
/// use pageblocks_cms::pages::{HomePage, PageTree};
///
/// let mut tree = PageTree::new("root");
/// let mut home = HomePage::new("Welcome", "home");
/// tree.place_home_page(&mut home, "root").unwrap();
///
/// assert_eq!(home.parent.as_deref(), Some("root"));
/// assert_eq!(tree.url_path(&home.id).unwrap(), "/home/");
/// ```
#[derive(Debug, Clone)]
pub struct PageTree {
	root: String,
	nodes: IndexMap<String, PageNode>,
}

impl PageTree {
	/// Create a tree whose root is a generic page
	pub fn new(root_id: impl Into<String>) -> Self {
		let root_id = root_id.into();
		let mut nodes = IndexMap::new();
		nodes.insert(
			root_id.clone(),
			PageNode {
				id: root_id.clone(),
				type_name: GENERIC_PAGE,
				slug: String::new(),
				parent: None,
			},
		);
		Self {
			root: root_id,
			nodes,
		}
	}

	pub fn root(&self) -> &str {
		&self.root
	}

	pub fn get(&self, id: &str) -> Option<&PageNode> {
		self.nodes.get(id)
	}

	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Children of `id` in insertion order
	pub fn children(&self, id: &str) -> Vec<&PageNode> {
		self.nodes
			.values()
			.filter(|node| node.parent.as_deref() == Some(id))
			.collect()
	}

	/// Place a page of type `rules` under `parent_id`
	pub fn add(
		&mut self,
		id: impl Into<String>,
		rules: &PageTypeRules,
		slug: &str,
		parent_id: &str,
	) -> CmsResult<()> {
		let id = id.into();
		if self.nodes.contains_key(&id) {
			return Err(CmsError::Duplicate(id));
		}
		let parent = self
			.nodes
			.get(parent_id)
			.ok_or_else(|| CmsError::PageNotFound(parent_id.to_string()))?;
		let parent_rules = PageTypeRules::for_type(parent.type_name).ok_or_else(|| {
			CmsError::InvalidHierarchy(format!("unknown parent page type {}", parent.type_name))
		})?;
		if !rules.can_create_under(&parent_rules) {
			return Err(CmsError::InvalidHierarchy(format!(
				"{} cannot be created under {}",
				rules.type_name, parent_rules.type_name
			)));
		}

		if let Err(kind) = SlugValidator::new().validate(slug) {
			let mut errors = ValidationErrors::new();
			errors.push(ValidationError::new("slug", kind));
			return Err(CmsError::Validation(errors));
		}
		if self.children(parent_id).iter().any(|sibling| sibling.slug == slug) {
			return Err(CmsError::Duplicate(join_path(parent_id, slug)));
		}

		tracing::debug!(page_id = %id, page_type = rules.type_name, parent = parent_id, "placed page");
		self.nodes.insert(
			id.clone(),
			PageNode {
				id,
				type_name: rules.type_name,
				slug: slug.to_string(),
				parent: Some(parent_id.to_string()),
			},
		);
		Ok(())
	}

	/// Place `page` under `parent_id` and record the parent on the page
	pub fn place_home_page(&mut self, page: &mut HomePage, parent_id: &str) -> CmsResult<()> {
		self.add(page.id.clone(), &HomePage::rules(), &page.slug, parent_id)?;
		page.parent = Some(parent_id.to_string());
		Ok(())
	}

	/// Remove a page that has no children
	pub fn remove(&mut self, id: &str) -> CmsResult<PageNode> {
		if id == self.root {
			return Err(CmsError::InvalidHierarchy("the root page cannot be removed".to_string()));
		}
		if !self.children(id).is_empty() {
			return Err(CmsError::InvalidHierarchy(format!("page {id} still has children")));
		}
		self.nodes
			.shift_remove(id)
			.ok_or_else(|| CmsError::PageNotFound(id.to_string()))
	}

	/// URL path of `id`, built from the slugs below the root
	pub fn url_path(&self, id: &str) -> CmsResult<String> {
		let mut slugs = Vec::new();
		let mut current = self
			.nodes
			.get(id)
			.ok_or_else(|| CmsError::PageNotFound(id.to_string()))?;
		while let Some(parent) = &current.parent {
			slugs.push(current.slug.as_str());
			current = self
				.nodes
				.get(parent)
				.ok_or_else(|| CmsError::PageNotFound(parent.clone()))?;
		}
		slugs.reverse();

		let mut path = String::from("/");
		for slug in slugs {
			path.push_str(slug);
			path.push('/');
		}
		Ok(path)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::catalog::home_stream_catalog;
	use chrono::TimeZone;
	use pageblocks_forms::ErrorKind;
	use rstest::{fixture, rstest};
	use serde_json::json;

	#[fixture]
	fn catalog() -> StreamCatalog {
		home_stream_catalog().unwrap()
	}

	#[rstest]
	#[case(PageTypeRules::HOME, PageTypeRules::GENERIC, true)]
	#[case(PageTypeRules::HOME, PageTypeRules::HOME, false)]
	#[case(PageTypeRules::GENERIC, PageTypeRules::HOME, false)]
	#[case(PageTypeRules::GENERIC, PageTypeRules::GENERIC, true)]
	fn test_placement_rules(
		#[case] child: PageTypeRules,
		#[case] parent: PageTypeRules,
		#[case] allowed: bool,
	) {
		assert_eq!(child.can_create_under(&parent), allowed);
	}

	#[rstest]
	fn test_tree_rejects_home_under_home() {
		// Arrange
		let mut tree = PageTree::new("root");
		let mut home = HomePage::new("Home", "home");
		tree.place_home_page(&mut home, "root").unwrap();
		let mut nested = HomePage::new("Nested", "nested");

		// Act
		let result = tree.place_home_page(&mut nested, &home.id);

		// Assert
		assert!(matches!(result, Err(CmsError::InvalidHierarchy(_))));
		assert_eq!(nested.parent, None);
	}

	#[rstest]
	fn test_tree_rejects_duplicate_sibling_slug() {
		let mut tree = PageTree::new("root");
		tree.add("a", &PageTypeRules::HOME, "home", "root").unwrap();

		let result = tree.add("b", &PageTypeRules::HOME, "home", "root");

		assert!(matches!(result, Err(CmsError::Duplicate(_))));
	}

	#[rstest]
	#[case("Home Page")]
	#[case("-home")]
	#[case("")]
	fn test_tree_rejects_invalid_slug(#[case] slug: &str) {
		let mut tree = PageTree::new("root");

		let result = tree.add("a", &PageTypeRules::HOME, slug, "root");

		assert!(matches!(result, Err(CmsError::Validation(_))));
	}

	#[rstest]
	fn test_tree_unknown_parent() {
		let mut tree = PageTree::new("root");

		let result = tree.add("a", &PageTypeRules::HOME, "home", "missing");

		assert!(matches!(result, Err(CmsError::PageNotFound(id)) if id == "missing"));
	}

	#[rstest]
	fn test_tree_remove_and_paths() {
		// Arrange
		let mut tree = PageTree::new("root");
		tree.add("section", &PageTypeRules::GENERIC, "company", "root").unwrap();
		tree.add("home", &PageTypeRules::HOME, "home", "section").unwrap();

		// Act & Assert
		assert_eq!(tree.url_path("home").unwrap(), "/company/home/");
		assert!(matches!(tree.remove("section"), Err(CmsError::InvalidHierarchy(_))));
		assert!(matches!(tree.remove("root"), Err(CmsError::InvalidHierarchy(_))));
		assert_eq!(tree.remove("home").unwrap().slug, "home");
		assert!(tree.children("section").is_empty());
	}

	#[rstest]
	fn test_validate_aggregates_scalar_errors(catalog: StreamCatalog) {
		// Arrange
		let mut page = HomePage::new("", "Not A Slug");
		page.banner_subtitle = "x".repeat(501);

		// Act
		let result = page.validate(&catalog);

		// Assert
		let Err(CmsError::Validation(errors)) = result else {
			panic!("expected validation errors");
		};
		assert!(matches!(
			errors.at("title").map(|e| &e.kind),
			Some(crate::blocks::ValidationErrorKind::Field(ErrorKind::MissingRequired))
		));
		assert!(errors.at("slug").is_some());
		assert!(matches!(
			errors.at("banner_subtitle").map(|e| &e.kind),
			Some(crate::blocks::ValidationErrorKind::Field(ErrorKind::TooLong { max: 500, actual: 501 }))
		));
	}

	#[rstest]
	fn test_validate_reports_stream_blocks_outside_catalog(catalog: StreamCatalog) {
		// Arrange
		let mut page = HomePage::new("Welcome", "home");
		page.content.append(&catalog, "service_card", &json!({"title": "Design"})).unwrap();
		let narrow = StreamCatalog::new(std::sync::Arc::new(catalog.library().clone()), ["stats"]).unwrap();

		// Act
		let result = page.validate(&narrow);

		// Assert
		let Err(CmsError::Validation(errors)) = result else {
			panic!("expected validation errors");
		};
		assert!(errors.at("content[0]").is_some());
	}

	#[rstest]
	fn test_json_round_trip(catalog: StreamCatalog) {
		// Arrange
		let mut page = HomePage::new("Welcome", "home");
		page.banner_title = "Hello".to_string();
		page.content
			.append(&catalog, "stats", &json!({"stat": [{"value": "10", "label": "Years"}]}))
			.unwrap();
		page.mark_published(Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap());

		// Act
		let restored = HomePage::from_json(&catalog, &page.to_json()).unwrap();

		// Assert
		assert_eq!(restored, page);
	}

	#[rstest]
	fn test_padded_scalars_load_back_verbatim(catalog: StreamCatalog) {
		// Arrange
		let mut page = HomePage::new(" Welcome ", "home");
		page.banner_title = "  Hello".to_string();
		page.validate(&catalog).unwrap();

		// Act
		let restored = HomePage::from_json(&catalog, &page.to_json()).unwrap();

		// Assert
		assert_eq!(restored.title, " Welcome ");
		assert_eq!(restored, page);
	}

	#[rstest]
	#[case(" home ")]
	#[case("home\n")]
	fn test_validate_rejects_padded_slug(catalog: StreamCatalog, #[case] slug: &str) {
		// Arrange
		let page = HomePage::new("Welcome", slug);

		// Act
		let result = page.validate(&catalog);

		// Assert
		let Err(CmsError::Validation(errors)) = result else {
			panic!("expected validation errors");
		};
		assert!(errors.at("slug").is_some());
	}

	#[rstest]
	fn test_from_json_reports_drift_under_content(catalog: StreamCatalog) {
		// Arrange
		let raw = json!({
			"id": "p1",
			"title": "Welcome",
			"slug": "home",
			"content": [{"type": "stats", "value": {"stat": []}, "id": "s"}]
		});

		// Act
		let result = HomePage::from_json(&catalog, &raw);

		// Assert
		let Err(CmsError::StoredContentMismatch(errors)) = result else {
			panic!("expected stored content mismatch");
		};
		assert!(errors.at("content[0].stat").is_some());
	}

	#[rstest]
	fn test_mark_published_keeps_first_date() {
		let mut page = HomePage::new("Welcome", "home");
		let first = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
		let second = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();

		page.mark_published(first);
		page.mark_published(second);

		assert_eq!(page.first_published_at, Some(first));
		assert_eq!(page.last_published_at, Some(second));
		assert!(page.is_published());
	}

	#[rstest]
	fn test_search_document_includes_stream_text(catalog: StreamCatalog) {
		let mut page = HomePage::new("Welcome", "home");
		page.content
			.append(&catalog, "features", &json!({"title": "Fast", "description": "Really fast"}))
			.unwrap();

		let document = page.search_document(&catalog);

		assert_eq!(document.keys().copied().collect::<Vec<_>>(), HomePage::search_fields());
		assert_eq!(document["content"], "Fast\nReally fast");
	}
}
