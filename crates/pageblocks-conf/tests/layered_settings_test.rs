//! Integration tests for layering TOML files and environment variables

use pageblocks_conf::sources::{EnvSource, TomlFileSource};
use pageblocks_conf::{CmsSettings, ConfigError, StreamLoadMode};
use rstest::rstest;
use serial_test::serial;
use std::env;
use std::io::Write;

fn write_toml(contents: &str) -> tempfile::NamedTempFile {
	let mut file = tempfile::NamedTempFile::new().unwrap();
	write!(file, "{contents}").unwrap();
	file
}

#[rstest]
#[serial(pageblocks_env)]
fn test_env_overrides_toml_file() {
	// Arrange
	let file = write_toml("static_url = \"/from-file/\"\nmax_stream_blocks = 12\n");
	// SAFETY: Setting environment variables is unsafe in multi-threaded programs.
	// This test uses #[serial] to ensure exclusive access to environment variables.
	unsafe {
		env::set_var("PBTEST_A_STATIC_URL", "/from-env/");
	}

	// Act
	let settings = CmsSettings::builder()
		.add_source(EnvSource::new().with_prefix("PBTEST_A_"))
		.add_source(TomlFileSource::new(file.path()))
		.build();

	// SAFETY: see above
	unsafe {
		env::remove_var("PBTEST_A_STATIC_URL");
	}

	// Assert
	let settings = settings.unwrap();
	assert_eq!(settings.static_url, "/from-env/");
	assert_eq!(settings.max_stream_blocks, Some(12));
	assert_eq!(settings.stream_load_mode, StreamLoadMode::Strict);
}

#[rstest]
#[serial(pageblocks_env)]
fn test_env_load_mode_is_parsed() {
	// Arrange
	// SAFETY: Setting environment variables is unsafe in multi-threaded programs.
	// This test uses #[serial] to ensure exclusive access to environment variables.
	unsafe {
		env::set_var("PBTEST_B_STREAM_LOAD_MODE", "lenient");
	}

	// Act
	let settings = CmsSettings::builder()
		.add_source(EnvSource::new().with_prefix("PBTEST_B_"))
		.build();

	// SAFETY: see above
	unsafe {
		env::remove_var("PBTEST_B_STREAM_LOAD_MODE");
	}

	// Assert
	assert_eq!(settings.unwrap().stream_load_mode, StreamLoadMode::Lenient);
}

#[rstest]
fn test_invalid_file_value_fails_validation() {
	// Arrange
	let file = write_toml("static_url = \"no-slash\"\n");

	// Act
	let result = CmsSettings::builder()
		.add_source(TomlFileSource::new(file.path()))
		.build();

	// Assert
	assert!(matches!(result, Err(ConfigError::InvalidValue { key, .. }) if key == "static_url"));
}
