//! Persistence collaborator
//!
//! Pages and settings records are persisted in their stored JSON form and
//! re-validated on every load, so content written under an older schema is
//! reported instead of silently returned.

use crate::error::{CmsError, CmsResult};
use crate::pages::HomePage;
use crate::settings::{SettingsKind, SettingsRecord};
use crate::stream::StreamCatalog;
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde_json::Value as JsonValue;
use std::sync::Arc;

/// Storage for pages and settings singletons
pub trait ContentStore: Send + Sync {
	/// Validate and persist a page, replacing any page with the same id
	fn save_page(&self, page: &HomePage) -> CmsResult<()>;

	/// Load and re-validate a page
	fn load_page(&self, id: &str) -> CmsResult<HomePage>;

	fn delete_page(&self, id: &str) -> CmsResult<()>;

	/// Ids of every stored page, in first-save order
	fn page_ids(&self) -> CmsResult<Vec<String>>;

	/// Every stored record of `kind`, re-validated
	///
	/// A record that no longer matches its schema fails the call only when it
	/// is stored as active; drifted inactive records are logged and skipped.
	fn list_singletons(&self, kind: SettingsKind) -> CmsResult<Vec<SettingsRecord>>;

	/// Insert or replace the record with the same kind and name
	fn save_singleton(&self, record: SettingsRecord) -> CmsResult<()>;

	fn delete_singleton(&self, kind: SettingsKind, name: &str) -> CmsResult<()>;
}

/// In-memory [`ContentStore`] holding stored JSON
///
/// # Examples
///
/// ```
/// use pageblocks_cms::catalog::home_stream_catalog;
/// use pageblocks_cms::pages::HomePage;
/// use pageblocks_cms::store::{ContentStore, InMemoryStore};
/// use std::sync::Arc;
///
/// let store = InMemoryStore::new(Arc::new(home_stream_catalog().unwrap()));
/// let page = HomePage::new("Welcome", "home");
/// store.save_page(&page).unwrap();
///
/// assert_eq!(store.load_page(&page.id).unwrap(), page);
/// ```
pub struct InMemoryStore {
	catalog: Arc<StreamCatalog>,
	pages: RwLock<IndexMap<String, JsonValue>>,
	singletons: RwLock<IndexMap<(SettingsKind, String), JsonValue>>,
}

impl InMemoryStore {
	pub fn new(catalog: Arc<StreamCatalog>) -> Self {
		Self {
			catalog,
			pages: RwLock::new(IndexMap::new()),
			singletons: RwLock::new(IndexMap::new()),
		}
	}

	pub fn catalog(&self) -> &StreamCatalog {
		&self.catalog
	}

	/// Store a raw page record without validation
	///
	/// Stands in for content written by an older schema version.
	pub fn import_raw_page(&self, id: impl Into<String>, raw: JsonValue) {
		self.pages.write().insert(id.into(), raw);
	}

	/// Store a raw settings record without validation
	pub fn import_raw_singleton(&self, kind: SettingsKind, name: impl Into<String>, raw: JsonValue) {
		self.singletons.write().insert((kind, name.into()), raw);
	}
}

impl ContentStore for InMemoryStore {
	fn save_page(&self, page: &HomePage) -> CmsResult<()> {
		page.validate(&self.catalog)?;
		tracing::debug!(page_id = %page.id, blocks = page.content.len(), "saving page");
		self.pages.write().insert(page.id.clone(), page.to_json());
		Ok(())
	}

	fn load_page(&self, id: &str) -> CmsResult<HomePage> {
		let raw = self
			.pages
			.read()
			.get(id)
			.cloned()
			.ok_or_else(|| CmsError::PageNotFound(id.to_string()))?;
		HomePage::from_json(&self.catalog, &raw)
	}

	fn delete_page(&self, id: &str) -> CmsResult<()> {
		self.pages
			.write()
			.shift_remove(id)
			.map(|_| ())
			.ok_or_else(|| CmsError::PageNotFound(id.to_string()))
	}

	fn page_ids(&self) -> CmsResult<Vec<String>> {
		Ok(self.pages.read().keys().cloned().collect())
	}

	fn list_singletons(&self, kind: SettingsKind) -> CmsResult<Vec<SettingsRecord>> {
		let stored: Vec<(String, JsonValue)> = self
			.singletons
			.read()
			.iter()
			.filter(|((stored_kind, _), _)| *stored_kind == kind)
			.map(|((_, name), raw)| (name.clone(), raw.clone()))
			.collect();

		let mut records = Vec::with_capacity(stored.len());
		for (name, raw) in stored {
			match SettingsRecord::from_json(kind, &raw) {
				Ok(record) => records.push(record),
				Err(CmsError::Validation(errors)) => {
					let errors = errors.prefixed(&name);
					if raw.get("is_active").and_then(JsonValue::as_bool) == Some(true) {
						tracing::warn!(kind = %kind, name = %name, report = %errors, "active settings no longer match their schema");
						return Err(CmsError::StoredContentMismatch(errors));
					}
					tracing::warn!(kind = %kind, name = %name, report = %errors, "skipping inactive settings that no longer match their schema");
				}
				Err(other) => return Err(other),
			}
		}
		Ok(records)
	}

	fn save_singleton(&self, record: SettingsRecord) -> CmsResult<()> {
		// Round-trip through the stored form so invalid values never persist
		let raw = record.to_json();
		SettingsRecord::from_json(record.kind, &raw)?;
		tracing::debug!(kind = %record.kind, name = %record.name, active = record.is_active, "saving settings");
		self.singletons.write().insert((record.kind, record.name), raw);
		Ok(())
	}

	fn delete_singleton(&self, kind: SettingsKind, name: &str) -> CmsResult<()> {
		self.singletons
			.write()
			.shift_remove(&(kind, name.to_string()))
			.map(|_| ())
			.ok_or_else(|| CmsError::SettingsNotFound {
				kind: kind.to_string(),
				name: name.to_string(),
			})
	}
}
