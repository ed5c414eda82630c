//! Field descriptors, widgets and field errors

use crate::fields;
use crate::value::FieldValue;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::collections::HashSet;

/// Semantic type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
	ShortText,
	LongText,
	RichText,
	Url,
	Boolean,
	Integer,
	Choice,
	Image,
}

impl FieldKind {
	/// Stable identifier used in admin form descriptions
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::ShortText => "short_text",
			Self::LongText => "long_text",
			Self::RichText => "rich_text",
			Self::Url => "url",
			Self::Boolean => "boolean",
			Self::Integer => "integer",
			Self::Choice => "choice",
			Self::Image => "image",
		}
	}

	/// Whether values of this kind are free text that search indexing should see
	pub fn is_textual(&self) -> bool {
		matches!(self, Self::ShortText | Self::LongText | Self::RichText)
	}

	/// Whether a `max_length` constraint is meaningful for this kind
	pub fn accepts_max_length(&self) -> bool {
		matches!(
			self,
			Self::ShortText | Self::LongText | Self::RichText | Self::Url
		)
	}
}

/// One `(value, label)` entry of a choice field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choice {
	pub value: String,
	pub label: String,
}

impl Choice {
	pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
		Self {
			value: value.into(),
			label: label.into(),
		}
	}
}

impl From<(&str, &str)> for Choice {
	fn from((value, label): (&str, &str)) -> Self {
		Self::new(value, label)
	}
}

/// Form control the editing surface renders for a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Widget {
	TextInput,
	Textarea,
	RichTextArea,
	UrlInput,
	CheckboxInput,
	NumberInput,
	Select,
	ImageChooser,
}

/// Reason a single value failed validation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorKind {
	#[error("This field is required")]
	MissingRequired,

	#[error("Ensure this value has at most {max} characters (it has {actual})")]
	TooLong { max: usize, actual: usize },

	#[error("{}", describe_range(.min, .max, .value))]
	OutOfRange {
		min: Option<i64>,
		max: Option<i64>,
		value: i64,
	},

	#[error("Select a valid choice. {value} is not one of the available choices")]
	InvalidChoice { value: String },

	#[error("Enter a valid URL (got {value:?})")]
	InvalidUrl { value: String },

	#[error("Expected a {expected} value")]
	TypeMismatch { expected: &'static str },
}

fn describe_range(min: &Option<i64>, max: &Option<i64>, value: &i64) -> String {
	match (min, max) {
		(Some(min), Some(max)) => {
			format!("Ensure this value is between {min} and {max} (it is {value})")
		}
		(Some(min), None) => {
			format!("Ensure this value is greater than or equal to {min} (it is {value})")
		}
		(None, Some(max)) => {
			format!("Ensure this value is less than or equal to {max} (it is {value})")
		}
		(None, None) => format!("Value {value} is out of range"),
	}
}

/// Validation failure for a named field
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {kind}")]
pub struct FieldError {
	pub field: String,
	pub kind: ErrorKind,
}

pub type FieldResult<T> = Result<T, FieldError>;

/// A descriptor whose declaration breaks its own invariants
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DefinitionError {
	#[error("Field name must not be empty")]
	EmptyName,

	#[error("Field {field}: max_length must be a positive integer")]
	ZeroMaxLength { field: String },

	#[error("Field {field}: min_value {min} is greater than max_value {max}")]
	InvertedRange { field: String, min: i64, max: i64 },

	#[error("Field {field}: a choice field needs at least one choice")]
	NoChoices { field: String },

	#[error("Field {field}: choice value {value:?} is declared twice")]
	DuplicateChoice { field: String, value: String },

	#[error("Field {field}: default {value:?} is not one of the declared choices")]
	DefaultNotInChoices { field: String, value: String },

	#[error("Field {field}: invalid default ({reason})")]
	InvalidDefault { field: String, reason: String },

	#[error("Field {field}: constraint {constraint} does not apply to {kind} fields")]
	UnexpectedConstraint {
		field: String,
		constraint: &'static str,
		kind: &'static str,
	},
}

/// Describes one primitive value slot of a block or settings record.
///
/// Descriptors are plain data: the catalog builds them from declarative
/// tables and the admin surface serializes them to render form controls.
///
/// # Examples
///
/// ```
/// use pageblocks_forms::{FieldDescriptor, FieldKind};
///
/// let field = FieldDescriptor::char("title")
///     .required()
///     .with_max_length(100)
///     .with_help_text("Feature title.");
///
/// assert_eq!(field.kind, FieldKind::ShortText);
/// assert!(field.required);
/// assert!(field.check().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
	pub name: String,
	pub kind: FieldKind,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub label: Option<String>,
	pub required: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub help_text: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub default: Option<FieldValue>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub max_length: Option<usize>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub min_value: Option<i64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub max_value: Option<i64>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub choices: Vec<Choice>,
}

impl FieldDescriptor {
	/// Create an optional field of the given kind with no constraints
	pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
		Self {
			name: name.into(),
			kind,
			label: None,
			required: false,
			help_text: None,
			default: None,
			max_length: None,
			min_value: None,
			max_value: None,
			choices: Vec::new(),
		}
	}

	/// Single-line text field
	pub fn char(name: impl Into<String>) -> Self {
		Self::new(name, FieldKind::ShortText)
	}

	/// Multi-line plain text field
	pub fn text(name: impl Into<String>) -> Self {
		Self::new(name, FieldKind::LongText)
	}

	/// Rich text (HTML) field
	pub fn rich_text(name: impl Into<String>) -> Self {
		Self::new(name, FieldKind::RichText)
	}

	/// Absolute URL field
	pub fn url(name: impl Into<String>) -> Self {
		Self::new(name, FieldKind::Url)
	}

	/// Boolean flag, `false` unless a default says otherwise
	pub fn boolean(name: impl Into<String>) -> Self {
		Self::new(name, FieldKind::Boolean)
	}

	/// Integer field
	pub fn integer(name: impl Into<String>) -> Self {
		Self::new(name, FieldKind::Integer)
	}

	/// Enumerated field restricted to `choices`
	///
	/// # Examples
	///
	/// ```
	/// use pageblocks_forms::FieldDescriptor;
	///
	/// let field = FieldDescriptor::choice("text_alignment", [
	///     ("left", "Left"),
	///     ("center", "Center"),
	///     ("right", "Right"),
	/// ])
	/// .with_default("center");
	///
	/// assert_eq!(field.choices.len(), 3);
	/// assert_eq!(field.choice_label("right"), Some("Right"));
	/// ```
	pub fn choice<C, I>(name: impl Into<String>, choices: I) -> Self
	where
		C: Into<Choice>,
		I: IntoIterator<Item = C>,
	{
		let mut field = Self::new(name, FieldKind::Choice);
		field.choices = choices.into_iter().map(Into::into).collect();
		field
	}

	/// Image reference field
	pub fn image(name: impl Into<String>) -> Self {
		Self::new(name, FieldKind::Image)
	}

	pub fn required(mut self) -> Self {
		self.required = true;
		self
	}

	pub fn with_label(mut self, label: impl Into<String>) -> Self {
		self.label = Some(label.into());
		self
	}

	pub fn with_help_text(mut self, help_text: impl Into<String>) -> Self {
		self.help_text = Some(help_text.into());
		self
	}

	pub fn with_default(mut self, default: impl Into<FieldValue>) -> Self {
		self.default = Some(default.into());
		self
	}

	pub fn with_max_length(mut self, max_length: usize) -> Self {
		self.max_length = Some(max_length);
		self
	}

	pub fn with_min_value(mut self, min_value: i64) -> Self {
		self.min_value = Some(min_value);
		self
	}

	pub fn with_max_value(mut self, max_value: i64) -> Self {
		self.max_value = Some(max_value);
		self
	}

	/// Set both integer bounds at once
	pub fn with_range(self, min_value: i64, max_value: i64) -> Self {
		self.with_min_value(min_value).with_max_value(max_value)
	}

	/// Human-readable label, derived from the name when none was declared
	///
	/// # Examples
	///
	/// ```
	/// use pageblocks_forms::FieldDescriptor;
	///
	/// let field = FieldDescriptor::url("cta_primary_link");
	/// assert_eq!(field.label(), "Cta primary link");
	/// ```
	pub fn label(&self) -> String {
		if let Some(label) = &self.label {
			return label.clone();
		}
		let spaced = self.name.replace('_', " ");
		let mut chars = spaced.chars();
		match chars.next() {
			Some(first) => first.to_uppercase().chain(chars).collect(),
			None => String::new(),
		}
	}

	/// Form control for this field
	pub fn widget(&self) -> Widget {
		match self.kind {
			FieldKind::ShortText => Widget::TextInput,
			FieldKind::LongText => Widget::Textarea,
			FieldKind::RichText => Widget::RichTextArea,
			FieldKind::Url => Widget::UrlInput,
			FieldKind::Boolean => Widget::CheckboxInput,
			FieldKind::Integer => Widget::NumberInput,
			FieldKind::Choice => Widget::Select,
			FieldKind::Image => Widget::ImageChooser,
		}
	}

	/// Label of the choice whose value is `value`
	pub fn choice_label(&self, value: &str) -> Option<&str> {
		self.choices
			.iter()
			.find(|choice| choice.value == value)
			.map(|choice| choice.label.as_str())
	}

	pub(crate) fn error(&self, kind: ErrorKind) -> FieldError {
		FieldError {
			field: self.name.clone(),
			kind,
		}
	}

	/// Value stored when an optional field is left blank and has no default
	pub fn empty_value(&self) -> FieldValue {
		match self.kind {
			FieldKind::ShortText
			| FieldKind::LongText
			| FieldKind::RichText
			| FieldKind::Url
			| FieldKind::Choice => FieldValue::Text(String::new()),
			FieldKind::Boolean => FieldValue::Bool(false),
			FieldKind::Integer | FieldKind::Image => FieldValue::Empty,
		}
	}

	// A declared default wins over the required check: choice fields are
	// required and defaulted at the same time.
	pub(crate) fn resolve_absent(&self) -> FieldResult<FieldValue> {
		if let Some(default) = &self.default {
			return Ok(default.clone());
		}
		if self.required {
			return Err(self.error(ErrorKind::MissingRequired));
		}
		Ok(self.empty_value())
	}

	/// Validate a raw value and return the cleaned, typed value.
	///
	/// `None` and JSON `null` mean the editor left the field blank.
	///
	/// # Examples
	///
	/// ```
	/// use pageblocks_forms::{ErrorKind, FieldDescriptor, FieldValue};
	/// use serde_json::json;
	///
	/// let padding = FieldDescriptor::integer("padding_top").with_range(0, 200);
	///
	/// assert_eq!(padding.clean(Some(&json!(40))).unwrap(), FieldValue::Integer(40));
	/// assert_eq!(padding.clean(None).unwrap(), FieldValue::Empty);
	/// assert!(matches!(
	///     padding.clean(Some(&json!(201))).unwrap_err().kind,
	///     ErrorKind::OutOfRange { .. }
	/// ));
	/// ```
	pub fn clean(&self, value: Option<&JsonValue>) -> FieldResult<FieldValue> {
		match self.kind {
			FieldKind::ShortText | FieldKind::LongText | FieldKind::RichText => {
				fields::text::clean(self, value)
			}
			FieldKind::Url => fields::url::clean(self, value),
			FieldKind::Boolean => fields::boolean::clean(self, value),
			FieldKind::Integer => fields::integer::clean(self, value),
			FieldKind::Choice => fields::choice::clean(self, value),
			FieldKind::Image => fields::image::clean(self, value),
		}
	}

	/// Check the descriptor's own invariants before it is used in a schema
	///
	/// # Examples
	///
	/// ```
	/// use pageblocks_forms::{DefinitionError, FieldDescriptor};
	///
	/// let field = FieldDescriptor::choice("rating", [("5", "5 Stars"), ("4", "4 Stars")])
	///     .with_default("6");
	///
	/// assert!(matches!(
	///     field.check(),
	///     Err(DefinitionError::DefaultNotInChoices { .. })
	/// ));
	/// ```
	pub fn check(&self) -> Result<(), DefinitionError> {
		if self.name.is_empty() {
			return Err(DefinitionError::EmptyName);
		}

		if let Some(max_length) = self.max_length {
			if !self.kind.accepts_max_length() {
				return Err(self.unexpected("max_length"));
			}
			if max_length == 0 {
				return Err(DefinitionError::ZeroMaxLength {
					field: self.name.clone(),
				});
			}
		}

		if self.kind != FieldKind::Integer
			&& (self.min_value.is_some() || self.max_value.is_some())
		{
			return Err(self.unexpected("min_value/max_value"));
		}
		if let (Some(min), Some(max)) = (self.min_value, self.max_value)
			&& min > max
		{
			return Err(DefinitionError::InvertedRange {
				field: self.name.clone(),
				min,
				max,
			});
		}

		if self.kind == FieldKind::Choice {
			self.check_choices()?;
		} else if !self.choices.is_empty() {
			return Err(self.unexpected("choices"));
		}

		if let Some(default) = &self.default {
			self.clean(Some(&default.to_json()))
				.map_err(|err| DefinitionError::InvalidDefault {
					field: self.name.clone(),
					reason: err.kind.to_string(),
				})?;
		}

		Ok(())
	}

	fn check_choices(&self) -> Result<(), DefinitionError> {
		if self.choices.is_empty() {
			return Err(DefinitionError::NoChoices {
				field: self.name.clone(),
			});
		}

		let mut seen = HashSet::new();
		for choice in &self.choices {
			if !seen.insert(choice.value.as_str()) {
				return Err(DefinitionError::DuplicateChoice {
					field: self.name.clone(),
					value: choice.value.clone(),
				});
			}
		}

		match &self.default {
			None => Ok(()),
			Some(FieldValue::Text(value)) if seen.contains(value.as_str()) => Ok(()),
			Some(FieldValue::Text(value)) => Err(DefinitionError::DefaultNotInChoices {
				field: self.name.clone(),
				value: value.clone(),
			}),
			Some(other) => Err(DefinitionError::InvalidDefault {
				field: self.name.clone(),
				reason: format!("choice defaults must be text, got {}", other.to_json()),
			}),
		}
	}

	fn unexpected(&self, constraint: &'static str) -> DefinitionError {
		DefinitionError::UnexpectedConstraint {
			field: self.name.clone(),
			constraint,
			kind: self.kind.as_str(),
		}
	}
}
