//! # pageblocks configuration
//!
//! Layered settings for the block schema core, in the style of Django
//! settings modules: built-in defaults, an optional TOML file and
//! `PAGEBLOCKS_*` environment variables are merged by priority and
//! deserialized into [`CmsSettings`].
//!
//! ```no_run
//! use pageblocks_conf::{CmsSettings, sources::{EnvSource, TomlFileSource}};
//!
//! let settings = CmsSettings::builder()
//!     .add_source(TomlFileSource::new("pageblocks.toml"))
//!     .add_source(EnvSource::new().with_prefix("PAGEBLOCKS_"))
//!     .build()
//!     .unwrap();
//! println!("{}", settings.static_url);
//! ```

pub mod settings;
pub mod sources;

pub use settings::{CmsSettings, ConfigError, SettingsBuilder, StreamLoadMode};
pub use sources::{ConfigSource, SourceError};
