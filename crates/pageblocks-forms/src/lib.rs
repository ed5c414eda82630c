//! Field descriptors and field-level validation for pageblocks
//!
//! This crate provides the leaf layer of the block schema system:
//! - Field descriptors with a semantic kind, constraints, defaults and help text
//! - Descriptor-directed cleaning of raw JSON input into typed field values
//! - URL and slug validators shared with the page layer
//! - Admin widget hints derived from the field kind
//!
//! ## Example
//!
//! ```
//! use pageblocks_forms::{ErrorKind, FieldDescriptor, FieldValue};
//! use serde_json::json;
//!
//! let headline = FieldDescriptor::char("headline").with_max_length(10);
//!
//! assert_eq!(
//!     headline.clean(Some(&json!("Welcome"))).unwrap(),
//!     FieldValue::Text("Welcome".to_string())
//! );
//!
//! let err = headline.clean(Some(&json!("Welcome home!"))).unwrap_err();
//! assert_eq!(err.kind, ErrorKind::TooLong { max: 10, actual: 13 });
//! ```

pub mod field;
pub mod fields;
pub mod validators;
pub mod value;

pub use field::{
	Choice, DefinitionError, ErrorKind, FieldDescriptor, FieldError, FieldKind, FieldResult,
	Widget,
};
pub use validators::{SlugValidator, UrlValidator};
pub use value::{FieldValue, ImageRef};
