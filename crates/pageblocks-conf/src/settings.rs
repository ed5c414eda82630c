//! Core settings and the builder that merges configuration sources

use crate::sources::{ConfigSource, SourceError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How stored content streams are loaded when a block no longer matches its schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamLoadMode {
	/// Any invalid block fails the whole load
	#[default]
	Strict,
	/// Invalid blocks are dropped and reported, valid blocks are kept
	Lenient,
}

/// Settings consumed by the block schema core
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CmsSettings {
	/// Prefix for block asset URLs (CSS and JS)
	pub static_url: String,
	/// Behaviour when stored content fails re-validation
	pub stream_load_mode: StreamLoadMode,
	/// Upper bound on blocks in one content stream, unbounded when absent
	pub max_stream_blocks: Option<usize>,
}

impl Default for CmsSettings {
	fn default() -> Self {
		Self {
			static_url: "/static/".to_string(),
			stream_load_mode: StreamLoadMode::Strict,
			max_stream_blocks: None,
		}
	}
}

/// Errors raised while building settings
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("Source error: {0}")]
	Source(#[from] SourceError),

	#[error("Invalid settings: {0}")]
	Deserialize(#[from] serde_json::Error),

	#[error("Invalid value for '{key}': {message}")]
	InvalidValue { key: String, message: String },
}

impl CmsSettings {
	/// Start building settings from layered sources
	pub fn builder() -> SettingsBuilder {
		SettingsBuilder::new()
	}

	/// Check cross-field constraints that serde cannot express
	///
	/// # Examples
	///
	/// ```
	/// use pageblocks_conf::CmsSettings;
	///
	/// let mut settings = CmsSettings::default();
	/// assert!(settings.validate().is_ok());
	///
	/// settings.static_url = "static".to_string();
	/// assert!(settings.validate().is_err());
	/// ```
	pub fn validate(&self) -> Result<(), ConfigError> {
		let url = &self.static_url;
		let rooted = url.starts_with('/')
			|| url.starts_with("http://")
			|| url.starts_with("https://");
		if !rooted || !url.ends_with('/') {
			return Err(ConfigError::InvalidValue {
				key: "static_url".to_string(),
				message: format!(
					"must be an absolute path or http(s) URL ending in '/', got {url:?}"
				),
			});
		}

		if self.max_stream_blocks == Some(0) {
			return Err(ConfigError::InvalidValue {
				key: "max_stream_blocks".to_string(),
				message: "must be at least 1 when set".to_string(),
			});
		}

		Ok(())
	}
}

/// Merges configuration sources by priority into [`CmsSettings`]
#[derive(Default)]
pub struct SettingsBuilder {
	sources: Vec<Box<dyn ConfigSource>>,
}

impl SettingsBuilder {
	pub fn new() -> Self {
		Self {
			sources: Vec::new(),
		}
	}

	/// Add a configuration source
	pub fn add_source<S: ConfigSource + 'static>(mut self, source: S) -> Self {
		self.sources.push(Box::new(source));
		self
	}

	/// Merge all sources over the defaults and validate the result
	///
	/// # Examples
	///
	/// ```
	/// use pageblocks_conf::{CmsSettings, StreamLoadMode};
	/// use pageblocks_conf::sources::MemorySource;
	/// use serde_json::json;
	///
	/// let settings = CmsSettings::builder()
	///     .add_source(MemorySource::new(10).with_value("stream_load_mode", json!("lenient")))
	///     .build()
	///     .unwrap();
	///
	/// assert_eq!(settings.stream_load_mode, StreamLoadMode::Lenient);
	/// assert_eq!(settings.static_url, "/static/");
	/// ```
	pub fn build(mut self) -> Result<CmsSettings, ConfigError> {
		let mut merged: IndexMap<String, Value> = match serde_json::to_value(CmsSettings::default())? {
			Value::Object(map) => map.into_iter().collect(),
			_ => IndexMap::new(),
		};

		// Lowest priority first so that later inserts override
		self.sources.sort_by_key(|source| source.priority());
		for source in &self.sources {
			let values = source.load()?;
			tracing::debug!(
				source = %source.description(),
				keys = values.len(),
				"merging settings source"
			);
			for (key, value) in values {
				// Unknown keys are ignored so that unrelated prefixed variables do not break loading
				if merged.contains_key(&key) {
					merged.insert(key, value);
				}
			}
		}

		let settings: CmsSettings =
			serde_json::from_value(Value::Object(merged.into_iter().collect()))?;
		settings.validate()?;
		Ok(settings)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::sources::MemorySource;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	fn test_build_without_sources_yields_defaults() {
		// Act
		let settings = SettingsBuilder::new().build().unwrap();

		// Assert
		assert_eq!(settings, CmsSettings::default());
	}

	#[rstest]
	fn test_higher_priority_source_wins() {
		// Arrange
		let low = MemorySource::new(10).with_value("static_url", json!("/low/"));
		let high = MemorySource::new(90).with_value("static_url", json!("/high/"));

		// Act: registration order must not matter
		let settings = SettingsBuilder::new()
			.add_source(high)
			.add_source(low)
			.build()
			.unwrap();

		// Assert
		assert_eq!(settings.static_url, "/high/");
	}

	#[rstest]
	fn test_unknown_keys_are_ignored() {
		let settings = SettingsBuilder::new()
			.add_source(MemorySource::new(10).with_value("home", json!("/root")))
			.build()
			.unwrap();

		assert_eq!(settings, CmsSettings::default());
	}

	#[rstest]
	fn test_invalid_load_mode_is_rejected() {
		let result = SettingsBuilder::new()
			.add_source(MemorySource::new(10).with_value("stream_load_mode", json!("sloppy")))
			.build();

		assert!(matches!(result, Err(ConfigError::Deserialize(_))));
	}

	#[rstest]
	#[case("/static/", true)]
	#[case("https://cdn.example.com/assets/", true)]
	#[case("/static", false)]
	#[case("static/", false)]
	fn test_static_url_validation(#[case] url: &str, #[case] valid: bool) {
		let settings = CmsSettings {
			static_url: url.to_string(),
			..CmsSettings::default()
		};

		assert_eq!(settings.validate().is_ok(), valid);
	}

	#[rstest]
	fn test_zero_max_stream_blocks_is_rejected() {
		let settings = CmsSettings {
			max_stream_blocks: Some(0),
			..CmsSettings::default()
		};

		assert!(matches!(
			settings.validate(),
			Err(ConfigError::InvalidValue { .. })
		));
	}
}
