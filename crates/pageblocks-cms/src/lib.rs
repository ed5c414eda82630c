//! # pageblocks CMS
//!
//! Block schemas and content streams for a home page type, inspired by
//! Wagtail's StreamField.
//!
//! ## Features
//!
//! - **Block Schemas**: Struct and list blocks built from field descriptors, registered
//!   in an explicit [`BlockLibrary`](blocks::BlockLibrary) that rejects cyclic definitions
//! - **Content Streams**: Ordered, tagged block sequences with lossless JSON round-trips
//!   and re-validation on load
//! - **Settings Singletons**: Theme, carousel and video-background defaults with
//!   deterministic active-record resolution
//! - **Page Records**: Home pages with search fields and page-type placement rules
//! - **Admin Integration**: Snippet registrations and editor form descriptions
//!
//! ## Architecture
//!
//! ```text
//! pageblocks-cms
//! ├── blocks    - Block definitions, library, values and tree validation
//! ├── catalog   - The home page block catalog, declared as data
//! ├── stream    - StreamField-style content streams
//! ├── settings  - Settings singletons and option resolution
//! ├── pages     - Home page records and the page tree
//! ├── store     - Persistence collaborator and in-memory store
//! ├── images    - Image resolution collaborator
//! ├── assets    - CSS/JS media declared by blocks
//! └── admin     - Snippet registrations and form descriptions
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use pageblocks_cms::catalog::home_stream_catalog;
//! use pageblocks_cms::stream::StreamField;
//! use serde_json::json;
//!
//! let catalog = home_stream_catalog().unwrap();
//! let mut body = StreamField::new();
//! body.append(&catalog, "cta_section", &json!({
//!     "title": "Ready to start?",
//!     "button_text": "Contact us",
//!     "button_link": "https://example.com/contact",
//! }))
//! .unwrap();
//!
//! let stored = body.serialize();
//! assert_eq!(StreamField::deserialize(&catalog, &stored).unwrap(), body);
//! ```

#![warn(rustdoc::broken_intra_doc_links)]

// Re-export for downstream crates building raw block input
pub use serde_json;

pub mod admin;
pub mod assets;
pub mod blocks;
pub mod catalog;
pub mod images;
pub mod pages;
pub mod settings;
pub mod store;
pub mod stream;

pub mod prelude {
	//! Convenient re-exports of commonly used items

	pub use crate::blocks::{
		BlockDef, BlockInstance, BlockLibrary, BlockSchema, BlockValue, ListBlock, StructBlock,
		ValidationError, ValidationErrorKind, ValidationErrors,
	};
	pub use crate::catalog::{HomeBlockType, home_library, home_stream_catalog};
	pub use crate::error::{CmsError, CmsResult};
	pub use crate::pages::{HomePage, PageTree};
	pub use crate::settings::{SettingsKind, SettingsRecord, resolve_active};
	pub use crate::store::{ContentStore, InMemoryStore};
	pub use crate::stream::{StreamBlock, StreamCatalog, StreamField};
}

/// CMS error types
pub mod error {
	use crate::blocks::ValidationErrors;
	use thiserror::Error;

	/// CMS-related errors
	#[derive(Error, Debug)]
	pub enum CmsError {
		/// Block type not registered or not allowed in this stream
		#[error("Block type not registered: {0}")]
		UnknownBlockType(String),

		/// A block type with this name is already registered
		#[error("Block type already registered: {0}")]
		DuplicateBlockType(String),

		/// Registering the block type would make it reference itself
		#[error("Block type references itself: {}", .0.join(" -> "))]
		SchemaCycle(Vec<String>),

		/// A block definition breaks a structural invariant
		#[error("Invalid block schema: {0}")]
		InvalidSchema(String),

		/// Editor input failed validation
		#[error("Validation failed: {0}")]
		Validation(ValidationErrors),

		/// Persisted content no longer matches the current schema
		#[error("Stored content no longer matches schema: {0}")]
		StoredContentMismatch(ValidationErrors),

		/// Stream position outside the current block list
		#[error("Block index {index} out of range for a stream of {len} blocks")]
		IndexOutOfRange { index: usize, len: usize },

		/// Page not found
		#[error("Page not found: {0}")]
		PageNotFound(String),

		/// No settings record of this kind has the name
		#[error("Settings record not found: {kind}/{name}")]
		SettingsNotFound { kind: String, name: String },

		/// Invalid page hierarchy (disallowed parent/child page types)
		#[error("Invalid page hierarchy: {0}")]
		InvalidHierarchy(String),

		/// Image not found by the image resolver
		#[error("Image not found: {0}")]
		ImageNotFound(String),

		/// Registry or store key collision
		#[error("Duplicate key: {0}")]
		Duplicate(String),

		/// Serialization error
		#[error("Serialization error: {0}")]
		Serialization(#[from] serde_json::Error),
	}

	/// Result type for CMS operations
	pub type CmsResult<T> = Result<T, CmsError>;
}
