//! # pageblocks
//!
//! Typed, nested content blocks composed into ordered content streams, with
//! field-level validation, settings singletons and a home page type. Inspired by
//! Wagtail's StreamField.
//!
//! ## Feature Flags
//!
//! - `forms` - Field descriptors and field-level validation
//! - `conf` - Layered settings (defaults, TOML files, environment variables)
//! - `cms` - Block schemas, content streams, settings singletons and pages
//! - `full` (default) - All of the above
//!
//! ## Quick Example
//!
//! ```
//! # #[cfg(feature = "cms")]
//! # {
//! use pageblocks::prelude::*;
//! use serde_json::json;
//!
//! let catalog = home_stream_catalog().unwrap();
//! let mut page = HomePage::new("Welcome", "home");
//! page.content
//!     .append(&catalog, "stats", &json!({"stat": [{"value": "99%", "label": "Uptime"}]}))
//!     .unwrap();
//!
//! assert!(page.validate(&catalog).is_ok());
//! # }
//! ```

#[cfg(feature = "cms")]
pub use pageblocks_cms as cms;
#[cfg(feature = "conf")]
pub use pageblocks_conf as conf;
#[cfg(feature = "forms")]
pub use pageblocks_forms as forms;

#[cfg(feature = "cms")]
pub use pageblocks_cms::error::{CmsError, CmsResult};
#[cfg(feature = "conf")]
pub use pageblocks_conf::{CmsSettings, StreamLoadMode};
#[cfg(feature = "forms")]
pub use pageblocks_forms::{ErrorKind, FieldDescriptor, FieldValue};

pub mod prelude {
	//! Commonly used types across all enabled features

	#[cfg(feature = "cms")]
	pub use pageblocks_cms::prelude::*;
	#[cfg(feature = "conf")]
	pub use pageblocks_conf::{CmsSettings, StreamLoadMode};
	#[cfg(feature = "forms")]
	pub use pageblocks_forms::{FieldDescriptor, FieldKind, FieldValue, ImageRef};
}
