//! Configuration sources for the layered settings system
//!
//! Sources are merged in priority order
//! (environment variables > TOML file > in-memory overrides > defaults).

use indexmap::IndexMap;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

/// Trait for configuration sources
pub trait ConfigSource: Send + Sync {
	/// Load configuration from this source
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError>;

	/// Get the priority of this source (higher = more important)
	fn priority(&self) -> u8;

	/// Get a description of this source
	fn description(&self) -> String;
}

/// Error type for configuration sources
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("TOML error: {0}")]
	Toml(#[from] toml::de::Error),

	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	#[error("Invalid source: {0}")]
	InvalidSource(String),
}

/// Fixed key/value pairs, used for defaults and programmatic overrides
pub struct MemorySource {
	values: IndexMap<String, Value>,
	priority: u8,
}

impl MemorySource {
	/// Create an in-memory source with the given priority
	///
	/// # Examples
	///
	/// ```
	/// use pageblocks_conf::sources::{ConfigSource, MemorySource};
	/// use serde_json::json;
	///
	/// let source = MemorySource::new(50).with_value("static_url", json!("/assets/"));
	/// assert_eq!(source.load().unwrap()["static_url"], json!("/assets/"));
	/// ```
	pub fn new(priority: u8) -> Self {
		Self {
			values: IndexMap::new(),
			priority,
		}
	}

	pub fn with_value(mut self, key: impl Into<String>, value: Value) -> Self {
		self.values.insert(key.into(), value);
		self
	}
}

impl ConfigSource for MemorySource {
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError> {
		Ok(self.values.clone())
	}

	fn priority(&self) -> u8 {
		self.priority
	}

	fn description(&self) -> String {
		format!("In-memory values ({} keys)", self.values.len())
	}
}

/// Environment variable configuration source
pub struct EnvSource {
	prefix: Option<String>,
}

impl EnvSource {
	/// Create a new environment variable configuration source
	///
	/// # Examples
	///
	/// ```
	/// use pageblocks_conf::sources::EnvSource;
	///
	/// let source = EnvSource::new().with_prefix("PAGEBLOCKS_");
	/// // Only loads env vars starting with PAGEBLOCKS_
	/// ```
	pub fn new() -> Self {
		Self { prefix: None }
	}

	/// Set a prefix filter for environment variables
	pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.prefix = Some(prefix.into());
		self
	}
}

impl Default for EnvSource {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigSource for EnvSource {
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError> {
		let mut config = IndexMap::new();

		for (key, value) in std::env::vars() {
			let clean_key = match &self.prefix {
				Some(prefix) => match key.strip_prefix(prefix.as_str()) {
					Some(stripped) => stripped.to_string(),
					None => continue,
				},
				None => key.clone(),
			};

			config.insert(clean_key.to_lowercase(), parse_env_value(value));
		}

		Ok(config)
	}

	fn priority(&self) -> u8 {
		100 // Highest priority
	}

	fn description(&self) -> String {
		match &self.prefix {
			Some(prefix) => format!("Environment variables (prefix: {})", prefix),
			None => "Environment variables".to_string(),
		}
	}
}

fn parse_env_value(value: String) -> Value {
	match value.trim().to_lowercase().as_str() {
		"true" | "yes" | "on" => return Value::Bool(true),
		"false" | "no" | "off" => return Value::Bool(false),
		_ => {}
	}
	if let Ok(number) = value.trim().parse::<i64>() {
		return Value::Number(number.into());
	}
	Value::String(value)
}

/// TOML file configuration source
///
/// A missing file contributes nothing; a malformed file is an error.
pub struct TomlFileSource {
	path: PathBuf,
}

impl TomlFileSource {
	/// Create a new TOML file configuration source
	///
	/// # Examples
	///
	/// ```
	/// use pageblocks_conf::sources::TomlFileSource;
	///
	/// let source = TomlFileSource::new("pageblocks.toml");
	/// ```
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}
}

impl ConfigSource for TomlFileSource {
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError> {
		if !self.path.exists() {
			tracing::debug!(path = %self.path.display(), "settings file not found, skipping");
			return Ok(IndexMap::new());
		}

		let content = fs::read_to_string(&self.path)?;
		let toml_value: toml::Value = toml::from_str(&content)?;
		let json_value = serde_json::to_value(toml_value)?;

		match json_value {
			Value::Object(map) => Ok(map.into_iter().collect()),
			_ => Err(SourceError::InvalidSource(format!(
				"{} does not contain a TOML table",
				self.path.display()
			))),
		}
	}

	fn priority(&self) -> u8 {
		50
	}

	fn description(&self) -> String {
		format!("TOML file: {}", self.path.display())
	}
}
