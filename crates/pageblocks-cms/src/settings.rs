//! Settings singletons
//!
//! Site-wide records (theme, carousel defaults, video background defaults)
//! edited independently of pages. Each kind shares its option fields with the
//! block schema that can override it on a single page. Several records of a
//! kind may exist; at most one is expected to be active, and [`resolve_active`]
//! applies a deterministic tie-break when the store allowed more.

use crate::blocks::{ValidationError, ValidationErrors};
use crate::catalog::{self, HomeBlockType};
use crate::error::{CmsError, CmsResult};
use crate::store::ContentStore;
use crate::stream::StreamField;
use indexmap::IndexMap;
use pageblocks_forms::{FieldDescriptor, FieldValue};
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use std::fmt;
use std::str::FromStr;

/// Kind of settings singleton
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingsKind {
	Theme,
	Carousel,
	VideoBackground,
}

impl SettingsKind {
	pub const ALL: [SettingsKind; 3] = [Self::Theme, Self::Carousel, Self::VideoBackground];

	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Theme => "theme",
			Self::Carousel => "carousel",
			Self::VideoBackground => "video_background",
		}
	}

	/// Block type whose instances override this kind on a page
	pub fn block_type(&self) -> HomeBlockType {
		match self {
			Self::Theme => HomeBlockType::ThemeSelector,
			Self::Carousel => HomeBlockType::HeroCarousel,
			Self::VideoBackground => HomeBlockType::HeroVideoBackground,
		}
	}

	/// Option fields of this kind, shared with its block schema
	pub fn option_fields(&self) -> Vec<FieldDescriptor> {
		match self {
			Self::Theme => catalog::theme_options(),
			Self::Carousel => catalog::carousel_options(),
			Self::VideoBackground => catalog::video_options(),
		}
	}

	/// Option values used when neither a block nor an active record supplies them
	pub fn defaults(&self) -> IndexMap<String, FieldValue> {
		self.option_fields()
			.into_iter()
			.map(|field| {
				let value = field.default.clone().unwrap_or_else(|| field.empty_value());
				(field.name, value)
			})
			.collect()
	}
}

impl fmt::Display for SettingsKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for SettingsKind {
	type Err = CmsError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|kind| kind.as_str() == s)
			.ok_or_else(|| CmsError::InvalidSchema(format!("unknown settings kind: {s}")))
	}
}

fn name_field() -> FieldDescriptor {
	FieldDescriptor::char("name")
		.required()
		.with_max_length(100)
		.with_help_text("Name for this configuration")
}

fn is_active_field() -> FieldDescriptor {
	FieldDescriptor::boolean("is_active")
		.with_default(false)
		.with_help_text("Make this the active configuration for the site")
}

/// One named, activatable settings record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettingsRecord {
	pub kind: SettingsKind,
	pub name: String,
	pub is_active: bool,
	/// Option values in field-table order
	pub values: IndexMap<String, FieldValue>,
}

impl SettingsRecord {
	/// Create an inactive record with default option values
	pub fn new(kind: SettingsKind, name: impl Into<String>) -> CmsResult<Self> {
		let name = name.into();
		let name = match name_field().clean(Some(&JsonValue::String(name))) {
			Ok(FieldValue::Text(name)) => name,
			Ok(_) => String::new(),
			Err(err) => {
				let mut errors = ValidationErrors::new();
				errors.push(ValidationError::new("name", err.kind));
				return Err(CmsError::Validation(errors));
			}
		};
		Ok(Self {
			kind,
			name,
			is_active: false,
			values: kind.defaults(),
		})
	}

	pub fn activated(mut self) -> Self {
		self.is_active = true;
		self
	}

	/// Validate a raw record, reporting every invalid field
	///
	/// # Examples
	///
	/// ```
	/// use pageblocks_cms::settings::{SettingsKind, SettingsRecord};
	/// use pageblocks_forms::FieldValue;
	/// use serde_json::json;
	///
	/// let record = SettingsRecord::from_json(
	///     SettingsKind::Theme,
	///     &json!({"name": "Dark", "is_active": true, "theme_mode": "dark"}),
	/// )
	/// .unwrap();
	///
	/// assert!(record.is_active);
	/// assert_eq!(record.get("theme_mode"), Some(&FieldValue::Text("dark".into())));
	/// assert_eq!(record.get("font_size_scale"), Some(&FieldValue::Text("md".into())));
	/// ```
	pub fn from_json(kind: SettingsKind, raw: &JsonValue) -> CmsResult<Self> {
		let Some(object) = raw.as_object() else {
			let mut errors = ValidationErrors::new();
			errors.push(ValidationError::new(
				"",
				pageblocks_forms::ErrorKind::TypeMismatch { expected: "object" },
			));
			return Err(CmsError::Validation(errors));
		};

		let mut errors = ValidationErrors::new();
		let mut clean = |field: &FieldDescriptor| match field.clean(object.get(&field.name)) {
			Ok(value) => value,
			Err(err) => {
				errors.push(ValidationError::new(field.name.as_str(), err.kind));
				field.empty_value()
			}
		};

		let name = clean(&name_field());
		let is_active = clean(&is_active_field());
		let values: IndexMap<String, FieldValue> = kind
			.option_fields()
			.iter()
			.map(|field| (field.name.clone(), clean(field)))
			.collect();

		if !errors.is_empty() {
			return Err(CmsError::Validation(errors));
		}
		Ok(Self {
			kind,
			name: name.as_text().unwrap_or_default().to_string(),
			is_active: is_active.as_bool().unwrap_or_default(),
			values,
		})
	}

	/// Stored form: `name`, `is_active` and the option values in one flat object
	pub fn to_json(&self) -> JsonValue {
		let mut object = Map::new();
		object.insert("name".to_string(), JsonValue::String(self.name.clone()));
		object.insert("is_active".to_string(), JsonValue::Bool(self.is_active));
		for (name, value) in &self.values {
			object.insert(name.clone(), value.to_json());
		}
		JsonValue::Object(object)
	}

	pub fn get(&self, name: &str) -> Option<&FieldValue> {
		self.values.get(name)
	}

	/// Validate and replace one option value
	pub fn set(&mut self, name: &str, raw: &JsonValue) -> CmsResult<()> {
		let fields = self.kind.option_fields();
		let Some(field) = fields.iter().find(|field| field.name == name) else {
			return Err(CmsError::InvalidSchema(format!(
				"{} settings have no option named {name:?}",
				self.kind
			)));
		};
		let value = field.clean(Some(raw)).map_err(|err| {
			let mut errors = ValidationErrors::new();
			errors.push(ValidationError::new(name, err.kind));
			CmsError::Validation(errors)
		})?;
		self.values.insert(name.to_string(), value);
		Ok(())
	}
}

/// The active record among `records`, lowest name first on ties
///
/// Records of other kinds are ignored.
pub fn select_active(kind: SettingsKind, records: Vec<SettingsRecord>) -> Option<SettingsRecord> {
	let mut active: Vec<SettingsRecord> = records
		.into_iter()
		.filter(|record| record.kind == kind && record.is_active)
		.collect();
	active.sort_by(|a, b| a.name.cmp(&b.name));

	if active.len() > 1 {
		let names: Vec<&str> = active.iter().map(|record| record.name.as_str()).collect();
		tracing::warn!(
			kind = %kind,
			active = ?names,
			chosen = names[0],
			"more than one active settings record; using the lowest name"
		);
	}
	active.into_iter().next()
}

/// Find the active singleton of `kind` in the store
///
/// Returns `None` when no record is active; the caller falls back to the
/// kind's defaults.
pub fn resolve_active(store: &dyn ContentStore, kind: SettingsKind) -> CmsResult<Option<SettingsRecord>> {
	Ok(select_active(kind, store.list_singletons(kind)?))
}

/// Where a set of effective options came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum OptionSource {
	/// A block of the matching type in the page stream
	Block { id: Option<String> },
	/// The active settings singleton
	Singleton { name: String },
	/// Field defaults
	Defaults,
}

/// Effective options for rendering one settings kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedOptions {
	pub kind: SettingsKind,
	pub source: OptionSource,
	pub values: IndexMap<String, FieldValue>,
}

impl ResolvedOptions {
	pub fn get(&self, name: &str) -> Option<&FieldValue> {
		self.values.get(name)
	}
}

/// Options for `kind`: a page block wins, then the active singleton, then defaults
pub fn resolve_options(
	store: &dyn ContentStore,
	kind: SettingsKind,
	stream: &StreamField,
) -> CmsResult<ResolvedOptions> {
	if let Some(block) = stream.first_of(kind.block_type().as_str()) {
		let values = kind
			.option_fields()
			.into_iter()
			.map(|field| {
				let value = block
					.value
					.field(&field.name)
					.cloned()
					.or_else(|| field.default.clone())
					.unwrap_or_else(|| field.empty_value());
				(field.name, value)
			})
			.collect();
		return Ok(ResolvedOptions {
			kind,
			source: OptionSource::Block {
				id: block.id.clone(),
			},
			values,
		});
	}

	if let Some(record) = resolve_active(store, kind)? {
		let mut values = kind.defaults();
		for (name, value) in record.values {
			values.insert(name, value);
		}
		return Ok(ResolvedOptions {
			kind,
			source: OptionSource::Singleton { name: record.name },
			values,
		});
	}

	Ok(ResolvedOptions {
		kind,
		source: OptionSource::Defaults,
		values: kind.defaults(),
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::catalog::home_stream_catalog;
	use crate::store::InMemoryStore;
	use rstest::rstest;
	use serde_json::json;
	use std::sync::{Arc, Mutex};
	use tracing_subscriber::layer::SubscriberExt as _;
	use tracing_subscriber::util::SubscriberInitExt as _;

	/// A tracing layer that captures warning messages
	struct LogCapture {
		logs: Arc<Mutex<Vec<String>>>,
	}

	impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for LogCapture {
		fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
			struct MessageVisitor {
				message: String,
			}

			impl tracing::field::Visit for MessageVisitor {
				fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
					if field.name() == "message" {
						self.message = format!("{:?}", value);
					}
				}
			}

			let mut visitor = MessageVisitor {
				message: String::new(),
			};
			event.record(&mut visitor);
			self.logs
				.lock()
				.unwrap()
				.push(format!("[{}] {}", event.metadata().level(), visitor.message));
		}
	}

	fn record(name: &str, active: bool) -> SettingsRecord {
		let record = SettingsRecord::new(SettingsKind::Theme, name).unwrap();
		if active { record.activated() } else { record }
	}

	#[rstest]
	fn test_select_active_none_when_nothing_active() {
		let records = vec![record("a", false), record("b", false)];

		assert_eq!(select_active(SettingsKind::Theme, records), None);
	}

	#[rstest]
	fn test_select_active_single() {
		let records = vec![record("zeta", true), record("alpha", false)];

		let active = select_active(SettingsKind::Theme, records).unwrap();

		assert_eq!(active.name, "zeta");
	}

	#[rstest]
	fn test_select_active_tie_break_warns() {
		// Arrange
		let logs = Arc::new(Mutex::new(Vec::new()));
		let capture = LogCapture { logs: logs.clone() };
		let _guard = tracing_subscriber::registry().with(capture).set_default();
		let records = vec![record("Summer", true), record("Autumn", true), record("Winter", false)];

		// Act
		let active = select_active(SettingsKind::Theme, records).unwrap();

		// Assert
		assert_eq!(active.name, "Autumn");
		let captured = logs.lock().unwrap();
		assert!(
			captured
				.iter()
				.any(|log| log.starts_with("[WARN]") && log.contains("more than one active")),
			"expected a consistency warning, got {captured:?}"
		);
	}

	#[rstest]
	fn test_select_active_ignores_other_kinds() {
		let carousel = SettingsRecord::new(SettingsKind::Carousel, "a").unwrap().activated();

		assert_eq!(select_active(SettingsKind::Theme, vec![carousel]), None);
	}

	#[rstest]
	fn test_from_json_aggregates_errors() {
		// Arrange
		let raw = json!({
			"name": "x".repeat(101),
			"theme_mode": "neon",
			"primary_color": "#12345678"
		});

		// Act
		let result = SettingsRecord::from_json(SettingsKind::Theme, &raw);

		// Assert
		let Err(CmsError::Validation(errors)) = result else {
			panic!("expected validation errors");
		};
		let paths: Vec<&str> = errors.iter().map(|e| e.path.as_str()).collect();
		assert_eq!(paths, ["name", "theme_mode", "primary_color"]);
	}

	#[rstest]
	fn test_to_json_round_trips() {
		let mut original = record("Ocean", true);
		original.set("theme_mode", &json!("blue")).unwrap();

		let restored = SettingsRecord::from_json(SettingsKind::Theme, &original.to_json()).unwrap();

		assert_eq!(restored, original);
	}

	#[rstest]
	fn test_set_rejects_unknown_option() {
		let mut theme = record("Ocean", false);

		assert!(matches!(theme.set("rotation_speed", &json!(1)), Err(CmsError::InvalidSchema(_))));
		assert!(matches!(theme.set("theme_mode", &json!("neon")), Err(CmsError::Validation(_))));
	}

	#[rstest]
	fn test_new_rejects_blank_name() {
		assert!(matches!(
			SettingsRecord::new(SettingsKind::Carousel, "  "),
			Err(CmsError::Validation(_))
		));
	}

	#[rstest]
	fn test_resolve_options_precedence() {
		// Arrange
		let store = InMemoryStore::new(Arc::new(home_stream_catalog().unwrap()));
		let mut stream = StreamField::new();

		// Act & Assert: defaults
		let resolved = resolve_options(&store, SettingsKind::Carousel, &stream).unwrap();
		assert_eq!(resolved.source, OptionSource::Defaults);
		assert_eq!(resolved.get("rotation_speed"), Some(&FieldValue::Integer(5000)));

		// Act & Assert: active singleton
		let mut singleton = SettingsRecord::new(SettingsKind::Carousel, "Slow").unwrap().activated();
		singleton.set("rotation_speed", &json!(9000)).unwrap();
		store.save_singleton(singleton).unwrap();
		let resolved = resolve_options(&store, SettingsKind::Carousel, &stream).unwrap();
		assert_eq!(resolved.source, OptionSource::Singleton { name: "Slow".into() });
		assert_eq!(resolved.get("rotation_speed"), Some(&FieldValue::Integer(9000)));

		// Act & Assert: block in the stream
		let catalog = home_stream_catalog().unwrap();
		stream
			.append(&catalog, "hero_carousel", &json!({"slides": [{}], "rotation_speed": 3000}))
			.unwrap();
		let resolved = resolve_options(&store, SettingsKind::Carousel, &stream).unwrap();
		assert!(matches!(resolved.source, OptionSource::Block { id: Some(_) }));
		assert_eq!(resolved.get("rotation_speed"), Some(&FieldValue::Integer(3000)));
		assert_eq!(resolved.get("show_controls"), Some(&FieldValue::Bool(true)));
	}
}
