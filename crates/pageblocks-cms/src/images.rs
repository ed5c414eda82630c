//! Image resolution
//!
//! Blocks store image references only. Rendering resolves them through an
//! [`ImageResolver`] owned by the host application.

use crate::error::{CmsError, CmsResult};
use crate::stream::{StreamCatalog, StreamField};
use indexmap::IndexMap;
use pageblocks_forms::ImageRef;
use parking_lot::RwLock;
use serde::Serialize;

/// A resolved image rendition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedImage {
	pub id: ImageRef,
	pub url: String,
	pub alt: String,
	pub width: Option<u32>,
	pub height: Option<u32>,
}

impl ResolvedImage {
	pub fn new(id: impl Into<ImageRef>, url: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			url: url.into(),
			alt: String::new(),
			width: None,
			height: None,
		}
	}

	pub fn with_alt(mut self, alt: impl Into<String>) -> Self {
		self.alt = alt.into();
		self
	}

	pub fn with_size(mut self, width: u32, height: u32) -> Self {
		self.width = Some(width);
		self.height = Some(height);
		self
	}
}

/// Looks up images referenced from block content
pub trait ImageResolver: Send + Sync {
	fn resolve(&self, image: &ImageRef) -> CmsResult<ResolvedImage>;
}

/// In-memory [`ImageResolver`]
#[derive(Debug, Default)]
pub struct InMemoryImages {
	images: RwLock<IndexMap<ImageRef, ResolvedImage>>,
}

impl InMemoryImages {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&self, image: ResolvedImage) {
		self.images.write().insert(image.id.clone(), image);
	}

	pub fn len(&self) -> usize {
		self.images.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.images.read().is_empty()
	}
}

impl ImageResolver for InMemoryImages {
	fn resolve(&self, image: &ImageRef) -> CmsResult<ResolvedImage> {
		self.images
			.read()
			.get(image)
			.cloned()
			.ok_or_else(|| CmsError::ImageNotFound(image.as_str().to_string()))
	}
}

/// Resolve every image a stream references, in stream order
///
/// Fails on the first reference the resolver does not know.
pub fn resolve_all(
	resolver: &dyn ImageResolver,
	catalog: &StreamCatalog,
	stream: &StreamField,
) -> CmsResult<Vec<ResolvedImage>> {
	stream
		.image_refs(catalog)
		.iter()
		.map(|image| resolver.resolve(image))
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::catalog::home_stream_catalog;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	fn test_resolve_known_and_missing() {
		// Arrange
		let images = InMemoryImages::new();
		images.insert(ResolvedImage::new(7_i64, "/media/hero.jpg").with_alt("Hero").with_size(1920, 1080));

		// Act
		let found = images.resolve(&ImageRef::from(7_i64)).unwrap();
		let missing = images.resolve(&ImageRef::from("8"));

		// Assert
		assert_eq!(found.url, "/media/hero.jpg");
		assert_eq!(found.width, Some(1920));
		assert!(matches!(missing, Err(CmsError::ImageNotFound(id)) if id == "8"));
	}

	#[rstest]
	fn test_resolve_all_deduplicates_stream_references() {
		// Arrange
		let catalog = home_stream_catalog().unwrap();
		let mut stream = StreamField::new();
		stream
			.append(&catalog, "hero_banner", &json!({"headline": "Hi", "background_image": 3}))
			.unwrap();
		stream
			.append(&catalog, "features", &json!({"icon": "3", "title": "Fast", "description": "Yes"}))
			.unwrap();
		let images = InMemoryImages::new();
		images.insert(ResolvedImage::new("3", "/media/3.png"));

		// Act
		let resolved = resolve_all(&images, &catalog, &stream).unwrap();

		// Assert
		assert_eq!(resolved.len(), 1);
		assert_eq!(resolved[0].id, ImageRef::from(3_i64));
	}
}
