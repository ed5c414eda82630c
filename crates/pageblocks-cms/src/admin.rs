//! Admin integration
//!
//! Snippet view sets describe how a model is listed and searched in the admin
//! sidebar. They are collected in an explicit [`AdminRegistry`] built at
//! start-up. [`block_form`] describes a block schema for the editor surface.

use crate::blocks::{BlockDef, BlockLibrary, StructMember};
use crate::error::{CmsError, CmsResult};
use crate::pages::HomePage;
use crate::settings::SettingsRecord;
use indexmap::IndexMap;
use pageblocks_forms::{FieldDescriptor, FieldValue};
use serde::Serialize;
use serde_json::{Value as JsonValue, json};

/// A model that can be listed as an admin snippet
pub trait SnippetModel {
	/// Display text of `column`, or `None` if the model has no such column
	fn column(&self, column: &str) -> Option<String>;
}

impl SnippetModel for HomePage {
	fn column(&self, column: &str) -> Option<String> {
		let timestamp = |at: Option<chrono::DateTime<chrono::Utc>>| {
			at.map(|at| at.to_rfc3339()).unwrap_or_default()
		};
		Some(match column {
			"id" => self.id.clone(),
			"title" => self.title.clone(),
			"slug" => self.slug.clone(),
			"banner_title" => self.banner_title.clone(),
			"about_title" => self.about_title.clone(),
			"first_published_at" => timestamp(self.first_published_at),
			"last_published_at" => timestamp(self.last_published_at),
			_ => return None,
		})
	}
}

impl SnippetModel for SettingsRecord {
	fn column(&self, column: &str) -> Option<String> {
		match column {
			"name" => Some(self.name.clone()),
			"is_active" => Some(self.is_active.to_string()),
			other => self.get(other).map(display_value),
		}
	}
}

fn display_value(value: &FieldValue) -> String {
	match value {
		FieldValue::Text(text) => text.clone(),
		FieldValue::Bool(flag) => flag.to_string(),
		FieldValue::Integer(number) => number.to_string(),
		FieldValue::Image(image) => image.to_string(),
		FieldValue::Empty => String::new(),
	}
}

/// Admin listing of one model
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnippetViewSet {
	pub model: String,
	pub menu_label: String,
	pub icon: String,
	pub list_display: Vec<String>,
	pub search_fields: Vec<String>,
}

impl SnippetViewSet {
	pub fn new(model: impl Into<String>, menu_label: impl Into<String>) -> Self {
		Self {
			model: model.into(),
			menu_label: menu_label.into(),
			icon: "snippet".to_string(),
			list_display: Vec::new(),
			search_fields: Vec::new(),
		}
	}

	pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
		self.icon = icon.into();
		self
	}

	pub fn with_list_display<I, S>(mut self, columns: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.list_display = columns.into_iter().map(Into::into).collect();
		self
	}

	pub fn with_search_fields<I, S>(mut self, fields: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.search_fields = fields.into_iter().map(Into::into).collect();
		self
	}

	/// One row of display text per item, in `list_display` order
	pub fn rows<M: SnippetModel>(&self, items: &[M]) -> Vec<Vec<String>> {
		items
			.iter()
			.map(|item| {
				self.list_display
					.iter()
					.map(|column| item.column(column).unwrap_or_default())
					.collect()
			})
			.collect()
	}

	/// Items whose search fields contain `query`, ignoring case
	///
	/// An empty query matches everything.
	pub fn search<'a, M: SnippetModel>(&self, items: &'a [M], query: &str) -> Vec<&'a M> {
		let query = query.trim().to_lowercase();
		items
			.iter()
			.filter(|item| {
				query.is_empty()
					|| self.search_fields.iter().any(|field| {
						item.column(field)
							.is_some_and(|text| text.to_lowercase().contains(&query))
					})
			})
			.collect()
	}
}

/// Snippet registrations, keyed by model
#[derive(Debug, Clone, Default)]
pub struct AdminRegistry {
	view_sets: IndexMap<String, SnippetViewSet>,
}

impl AdminRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn register(&mut self, view_set: SnippetViewSet) -> CmsResult<()> {
		if self.view_sets.contains_key(&view_set.model) {
			return Err(CmsError::Duplicate(view_set.model));
		}
		tracing::debug!(model = %view_set.model, menu_label = %view_set.menu_label, "registered snippet");
		self.view_sets.insert(view_set.model.clone(), view_set);
		Ok(())
	}

	pub fn get(&self, model: &str) -> Option<&SnippetViewSet> {
		self.view_sets.get(model)
	}

	/// Sidebar entries as `(menu_label, icon)` in registration order
	pub fn menu(&self) -> Vec<(&str, &str)> {
		self.view_sets
			.values()
			.map(|view_set| (view_set.menu_label.as_str(), view_set.icon.as_str()))
			.collect()
	}

	pub fn len(&self) -> usize {
		self.view_sets.len()
	}

	pub fn is_empty(&self) -> bool {
		self.view_sets.is_empty()
	}
}

pub const HOME_PAGE_SNIPPET: &str = "home.HomePage";
pub const THEME_SETTINGS_SNIPPET: &str = "home.ThemeSettings";

/// Registrations for the home page and theme settings
pub fn home_admin() -> CmsResult<AdminRegistry> {
	let mut registry = AdminRegistry::new();
	registry.register(
		SnippetViewSet::new(HOME_PAGE_SNIPPET, "Home Pages")
			.with_icon("home")
			.with_list_display(["title", "slug", "first_published_at", "last_published_at"])
			.with_search_fields(["title", "slug"]),
	)?;
	registry.register(
		SnippetViewSet::new(THEME_SETTINGS_SNIPPET, "Theme Settings")
			.with_icon("paint")
			.with_list_display(["name", "is_active", "theme_mode"])
			.with_search_fields(["name"]),
	)?;
	Ok(registry)
}

/// Editor form description of a registered block type
///
/// References to other block types are expanded in place.
///
/// # Examples
///
/// ```
/// use pageblocks_cms::admin::block_form;
/// use pageblocks_cms::catalog::home_library;
///
/// let library = home_library().unwrap();
/// let form = block_form(&library, "cta_section").unwrap();
///
/// assert_eq!(form["type"], "cta_section");
/// assert_eq!(form["form"]["members"][0]["widget"], "text_input");
/// ```
pub fn block_form(library: &BlockLibrary, type_name: &str) -> CmsResult<JsonValue> {
	let schema = library
		.get(type_name)
		.ok_or_else(|| CmsError::UnknownBlockType(type_name.to_string()))?;
	Ok(json!({
		"type": schema.type_name,
		"label": schema.label(),
		"icon": schema.icon,
		"form": def_form(library, &schema.def)?,
	}))
}

fn def_form(library: &BlockLibrary, def: &BlockDef) -> CmsResult<JsonValue> {
	Ok(match def {
		BlockDef::Field(field) => field_form(field),
		BlockDef::Struct(block) => {
			let members = block
				.members
				.iter()
				.map(|member| match member {
					StructMember::Field(field) => Ok(field_form(field)),
					StructMember::Block { name, def } => {
						let mut form = def_form(library, def)?;
						if let Some(object) = form.as_object_mut() {
							object.insert("name".to_string(), JsonValue::String(name.clone()));
						}
						Ok(form)
					}
				})
				.collect::<CmsResult<Vec<_>>>()?;
			json!({ "block": "struct", "members": members })
		}
		BlockDef::List(list) => json!({
			"block": "list",
			"min_num": list.min_count,
			"max_num": list.max_count,
			"child": def_form(library, &list.child)?,
		}),
		// Registered schemas are acyclic, so expansion terminates
		BlockDef::Ref { type_name } => {
			let schema = library
				.get(type_name)
				.ok_or_else(|| CmsError::UnknownBlockType(type_name.clone()))?;
			let mut form = def_form(library, &schema.def)?;
			if let Some(object) = form.as_object_mut() {
				object.insert("block_type".to_string(), JsonValue::String(type_name.clone()));
			}
			form
		}
	})
}

fn field_form(field: &FieldDescriptor) -> JsonValue {
	let mut form = json!({
		"block": "field",
		"name": field.name,
		"label": field.label(),
		"widget": field.widget(),
		"required": field.required,
	});
	let Some(object) = form.as_object_mut() else {
		return form;
	};
	if let Some(help_text) = &field.help_text {
		object.insert("help_text".to_string(), json!(help_text));
	}
	if let Some(default) = &field.default {
		object.insert("default".to_string(), default.to_json());
	}
	if let Some(max_length) = field.max_length {
		object.insert("max_length".to_string(), json!(max_length));
	}
	if let Some(min_value) = field.min_value {
		object.insert("min_value".to_string(), json!(min_value));
	}
	if let Some(max_value) = field.max_value {
		object.insert("max_value".to_string(), json!(max_value));
	}
	if !field.choices.is_empty() {
		object.insert("choices".to_string(), json!(field.choices));
	}
	form
}
