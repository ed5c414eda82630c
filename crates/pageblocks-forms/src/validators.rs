//! URL and slug validators
//!
//! These validators are shared between URL fields inside blocks and the
//! scalar fields of page records.

use crate::field::ErrorKind;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

// Lowercase ASCII slug: letters, digits, hyphens, underscores.
//
// Does not allow hyphens at the start or end of the slug.
static SLUG_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^[a-z0-9_]([a-z0-9_-]*[a-z0-9_])?$").expect("SLUG_REGEX: invalid regex pattern")
});

/// Schemes accepted for absolute URLs.
pub const ALLOWED_SCHEMES: &[&str] = &["http", "https", "ftp", "ftps"];

/// Validates that a string is a syntactically valid absolute URL.
///
/// The validator checks:
/// - The string parses as an absolute URL (relative paths are rejected)
/// - Scheme is one of [`ALLOWED_SCHEMES`]
/// - A non-empty host is present
///
/// # Examples
///
/// ```
/// use pageblocks_forms::validators::UrlValidator;
///
/// let validator = UrlValidator::new();
/// assert!(validator.validate("https://example.com").is_ok());
/// assert!(validator.validate("http://localhost:8080/path").is_ok());
/// assert!(validator.validate("mailto:someone@example.com").is_err());
/// assert!(validator.validate("not-a-url").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct UrlValidator {
	schemes: Option<Vec<String>>,
}

impl UrlValidator {
	pub fn new() -> Self {
		Self { schemes: None }
	}

	/// Restrict accepted schemes to the given list
	///
	/// # Examples
	///
	/// ```
	/// use pageblocks_forms::validators::UrlValidator;
	///
	/// let validator = UrlValidator::new().with_schemes(["https"]);
	/// assert!(validator.validate("https://example.com").is_ok());
	/// assert!(validator.validate("http://example.com").is_err());
	/// ```
	pub fn with_schemes<I, S>(mut self, schemes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.schemes = Some(schemes.into_iter().map(Into::into).collect());
		self
	}

	fn scheme_allowed(&self, scheme: &str) -> bool {
		match &self.schemes {
			Some(schemes) => schemes.iter().any(|allowed| allowed == scheme),
			None => ALLOWED_SCHEMES.contains(&scheme),
		}
	}

	/// Validate `value`, returning [`ErrorKind::InvalidUrl`] on failure
	pub fn validate(&self, value: &str) -> Result<(), ErrorKind> {
		let invalid = || ErrorKind::InvalidUrl {
			value: value.to_string(),
		};

		if value.chars().any(char::is_whitespace) {
			return Err(invalid());
		}

		let parsed = Url::parse(value).map_err(|_| invalid())?;
		if !self.scheme_allowed(parsed.scheme()) {
			return Err(invalid());
		}
		match parsed.host_str() {
			Some(host) if !host.is_empty() => Ok(()),
			_ => Err(invalid()),
		}
	}
}

/// Validates that a string value is a valid URL slug.
///
/// # Examples
///
/// ```
/// use pageblocks_forms::validators::SlugValidator;
///
/// let validator = SlugValidator::new();
/// assert!(validator.validate("home").is_ok());
/// assert!(validator.validate("about_us-2").is_ok());
/// assert!(validator.validate("-invalid").is_err());
/// assert!(validator.validate("Has Space").is_err());
/// assert!(validator.validate("").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct SlugValidator;

impl SlugValidator {
	pub fn new() -> Self {
		Self
	}

	/// Validate `value`; slugs reuse [`ErrorKind::TypeMismatch`] with a "slug" expectation
	pub fn validate(&self, value: &str) -> Result<(), ErrorKind> {
		if value.is_empty() {
			return Err(ErrorKind::MissingRequired);
		}
		if SLUG_REGEX.is_match(value) {
			Ok(())
		} else {
			Err(ErrorKind::TypeMismatch { expected: "slug" })
		}
	}
}
