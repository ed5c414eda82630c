//! CSS and JavaScript assets declared by blocks
//!
//! Block types name the stylesheets and scripts their front-end rendering
//! needs. A page collects the media of every block in its stream and renders
//! the tags once, in first-seen order.

use serde::Serialize;

/// Media assets (CSS and JavaScript) for a block type
///
/// Paths are relative to the configured static URL.
///
/// # Examples
///
/// ```
/// use pageblocks_cms::assets::Media;
///
/// let media = Media::new()
///     .with_css("css/hero-carousel.css")
///     .with_js("js/hero-carousel.js");
///
/// let html = media.render("/static/");
/// assert!(html.contains(r#"href="/static/css/hero-carousel.css""#));
/// assert!(html.contains(r#"src="/static/js/hero-carousel.js""#));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Media {
	css: Vec<String>,
	js: Vec<String>,
}

impl Media {
	/// Create a new empty Media instance
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_css(mut self, path: impl Into<String>) -> Self {
		self.add_css(path);
		self
	}

	pub fn with_js(mut self, path: impl Into<String>) -> Self {
		self.add_js(path);
		self
	}

	/// Add a stylesheet unless it is already listed
	pub fn add_css(&mut self, path: impl Into<String>) {
		push_unique(&mut self.css, path.into());
	}

	/// Add a script unless it is already listed
	pub fn add_js(&mut self, path: impl Into<String>) {
		push_unique(&mut self.js, path.into());
	}

	/// Merge another Media instance into this one
	///
	/// Files keep first-seen order; duplicates are dropped.
	pub fn merge(&mut self, other: &Media) {
		for file in &other.css {
			push_unique(&mut self.css, file.clone());
		}
		for file in &other.js {
			push_unique(&mut self.js, file.clone());
		}
	}

	pub fn css(&self) -> &[String] {
		&self.css
	}

	pub fn js(&self) -> &[String] {
		&self.js
	}

	pub fn is_empty(&self) -> bool {
		self.css.is_empty() && self.js.is_empty()
	}

	/// Render CSS as HTML link tags
	pub fn render_css(&self, static_url: &str) -> String {
		self.css
			.iter()
			.map(|file| {
				format!(
					"<link rel=\"stylesheet\" type=\"text/css\" href=\"{}\">\n",
					escape_attr(&resolve(static_url, file))
				)
			})
			.collect()
	}

	/// Render JavaScript as HTML script tags
	pub fn render_js(&self, static_url: &str) -> String {
		self.js
			.iter()
			.map(|file| {
				format!(
					"<script type=\"text/javascript\" src=\"{}\"></script>\n",
					escape_attr(&resolve(static_url, file))
				)
			})
			.collect()
	}

	/// Stylesheets first, then scripts
	pub fn render(&self, static_url: &str) -> String {
		let mut html = self.render_css(static_url);
		html.push_str(&self.render_js(static_url));
		html
	}
}

fn push_unique(files: &mut Vec<String>, file: String) {
	if !files.contains(&file) {
		files.push(file);
	}
}

// Absolute URLs and rooted paths are used as given
fn resolve(static_url: &str, file: &str) -> String {
	if file.starts_with('/') || file.starts_with("http://") || file.starts_with("https://") {
		return file.to_string();
	}
	format!("{}/{}", static_url.trim_end_matches('/'), file)
}

fn escape_attr(value: &str) -> String {
	let mut escaped = String::with_capacity(value.len());
	for c in value.chars() {
		match c {
			'&' => escaped.push_str("&amp;"),
			'"' => escaped.push_str("&quot;"),
			'<' => escaped.push_str("&lt;"),
			'>' => escaped.push_str("&gt;"),
			_ => escaped.push(c),
		}
	}
	escaped
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_merge_keeps_first_seen_order_without_duplicates() {
		// Arrange
		let mut media = Media::new()
			.with_css("css/service-card.css")
			.with_js("js/hero-banner.js");
		let other = Media::new()
			.with_css("css/service-cards.css")
			.with_css("css/service-card.css")
			.with_js("js/hero-banner.js")
			.with_js("js/theme-selector.js");

		// Act
		media.merge(&other);

		// Assert
		assert_eq!(media.css(), ["css/service-card.css", "css/service-cards.css"]);
		assert_eq!(media.js(), ["js/hero-banner.js", "js/theme-selector.js"]);
	}

	#[rstest]
	#[case("/static/", "css/a.css", "/static/css/a.css")]
	#[case("https://cdn.example.com/s/", "css/a.css", "https://cdn.example.com/s/css/a.css")]
	#[case("/static/", "/vendor/a.css", "/vendor/a.css")]
	fn test_resolve(#[case] static_url: &str, #[case] file: &str, #[case] expected: &str) {
		assert_eq!(resolve(static_url, file), expected);
	}

	#[rstest]
	fn test_render_escapes_attributes() {
		let media = Media::new().with_js("js/a\"b.js");

		assert_eq!(
			media.render("/static/"),
			"<script type=\"text/javascript\" src=\"/static/js/a&quot;b.js\"></script>\n"
		);
	}

	#[rstest]
	fn test_render_lists_css_before_js() {
		let media = Media::new().with_js("js/x.js").with_css("css/x.css");

		let html = media.render("/static/");

		assert!(html.find("css/x.css").unwrap() < html.find("js/x.js").unwrap());
	}
}
