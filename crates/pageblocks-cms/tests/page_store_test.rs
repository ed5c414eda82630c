//! End-to-end tests combining pages, the store, settings and admin listings

use pageblocks_cms::admin::{HOME_PAGE_SNIPPET, home_admin};
use pageblocks_cms::catalog::home_stream_catalog;
use pageblocks_cms::error::CmsError;
use pageblocks_cms::images::{InMemoryImages, ResolvedImage, resolve_all};
use pageblocks_cms::pages::{HomePage, PageTree};
use pageblocks_cms::settings::{OptionSource, SettingsKind, SettingsRecord, resolve_active, resolve_options};
use pageblocks_cms::store::{ContentStore, InMemoryStore};
use pageblocks_cms::stream::StreamCatalog;
use pageblocks_conf::{CmsSettings, StreamLoadMode};
use pageblocks_forms::FieldValue;
use rstest::{fixture, rstest};
use serde_json::json;
use std::sync::Arc;

#[fixture]
fn store() -> InMemoryStore {
	InMemoryStore::new(Arc::new(home_stream_catalog().unwrap()))
}

#[rstest]
fn test_publish_store_and_list_home_page(store: InMemoryStore) {
	// Arrange
	let mut tree = PageTree::new("root");
	let mut page = HomePage::new("Welcome", "home");
	page.banner_title = "Build with us".to_string();
	page.content
		.append(
			store.catalog(),
			"hero_banner",
			&json!({"headline": "Hello", "background_image": 12}),
		)
		.unwrap();
	tree.place_home_page(&mut page, "root").unwrap();
	page.mark_published(chrono::Utc::now());

	// Act
	store.save_page(&page).unwrap();
	let loaded = store.load_page(&page.id).unwrap();

	// Assert
	assert_eq!(loaded, page);
	assert_eq!(loaded.parent.as_deref(), Some("root"));

	let images = InMemoryImages::new();
	images.insert(ResolvedImage::new(12_i64, "/media/images/hero.jpg"));
	let resolved = resolve_all(&images, store.catalog(), &loaded.content).unwrap();
	assert_eq!(resolved[0].url, "/media/images/hero.jpg");

	let admin = home_admin().unwrap();
	let rows = admin.get(HOME_PAGE_SNIPPET).unwrap().rows(&[loaded]);
	assert_eq!(rows[0][0], "Welcome");
	assert!(!rows[0][3].is_empty());
}

#[rstest]
fn test_missing_image_is_reported(store: InMemoryStore) {
	let mut page = HomePage::new("Welcome", "home");
	page.content
		.append(store.catalog(), "features", &json!({"icon": 4, "title": "A", "description": "B"}))
		.unwrap();

	let result = resolve_all(&InMemoryImages::new(), store.catalog(), &page.content);

	assert!(matches!(result, Err(CmsError::ImageNotFound(id)) if id == "4"));
}

#[rstest]
fn test_resolve_active_prefers_lowest_name(store: InMemoryStore) {
	// Arrange
	for name in ["Summer", "Autumn", "Winter"] {
		let mut record = SettingsRecord::new(SettingsKind::Theme, name).unwrap();
		record.is_active = name != "Winter";
		store.save_singleton(record).unwrap();
	}
	store
		.save_singleton(SettingsRecord::new(SettingsKind::Carousel, "Aaa").unwrap().activated())
		.unwrap();

	// Act
	let active = resolve_active(&store, SettingsKind::Theme).unwrap();

	// Assert
	assert_eq!(active.map(|record| record.name), Some("Autumn".to_string()));
	assert!(resolve_active(&store, SettingsKind::VideoBackground).unwrap().is_none());
}

#[rstest]
fn test_page_block_overrides_singleton(store: InMemoryStore) {
	// Arrange
	let mut singleton = SettingsRecord::new(SettingsKind::Carousel, "Slow").unwrap().activated();
	singleton.set("rotation_speed", &json!(15000)).unwrap();
	store.save_singleton(singleton).unwrap();

	let mut page = HomePage::new("Welcome", "home");
	let without_block = resolve_options(&store, SettingsKind::Carousel, &page.content).unwrap();
	page.content
		.append(
			store.catalog(),
			"hero_carousel",
			&json!({"slides": [{"headline": "One"}], "rotation_speed": 2000}),
		)
		.unwrap();

	// Act
	let with_block = resolve_options(&store, SettingsKind::Carousel, &page.content).unwrap();

	// Assert
	assert_eq!(without_block.source, OptionSource::Singleton { name: "Slow".to_string() });
	assert_eq!(without_block.get("rotation_speed"), Some(&FieldValue::Integer(15000)));
	assert!(matches!(with_block.source, OptionSource::Block { .. }));
	assert_eq!(with_block.get("rotation_speed"), Some(&FieldValue::Integer(2000)));
}

#[rstest]
fn test_schema_drift_strict_and_lenient() {
	// Arrange
	let raw = json!({
		"id": "legacy",
		"title": "Legacy",
		"slug": "legacy",
		"content": [
			{"type": "stats", "value": {"stat": [{"value": "1", "label": "One"}]}, "id": "a"},
			{"type": "retired_gallery", "value": {"images": []}, "id": "b"},
		]
	});
	let base = home_stream_catalog().unwrap();
	let lenient_settings = CmsSettings {
		stream_load_mode: StreamLoadMode::Lenient,
		..CmsSettings::default()
	};
	let lenient_catalog: StreamCatalog = base.clone().with_settings(&lenient_settings);

	let strict = InMemoryStore::new(Arc::new(base));
	let lenient = InMemoryStore::new(Arc::new(lenient_catalog));
	strict.import_raw_page("legacy", raw.clone());
	lenient.import_raw_page("legacy", raw);

	// Act
	let strict_result = strict.load_page("legacy");
	let lenient_result = lenient.load_page("legacy");

	// Assert
	let Err(CmsError::StoredContentMismatch(errors)) = strict_result else {
		panic!("expected stored content mismatch");
	};
	assert_eq!(errors.len(), 1);
	assert!(errors.at("content[1]").is_some());

	let page = lenient_result.unwrap();
	assert_eq!(page.content.len(), 1);
	assert_eq!(page.content.blocks()[0].block_type, "stats");
}

#[rstest]
fn test_stream_limit_from_settings() {
	// Arrange
	let settings = CmsSettings {
		max_stream_blocks: Some(1),
		..CmsSettings::default()
	};
	let catalog = home_stream_catalog().unwrap().with_settings(&settings);
	let mut page = HomePage::new("Welcome", "home");
	page.content
		.append(&catalog, "stats", &json!({"stat": [{"value": "1", "label": "One"}]}))
		.unwrap();

	// Act
	let result = page
		.content
		.append(&catalog, "stats", &json!({"stat": [{"value": "2", "label": "Two"}]}));

	// Assert
	assert!(matches!(result, Err(CmsError::Validation(_))));
	assert_eq!(page.content.len(), 1);
}
