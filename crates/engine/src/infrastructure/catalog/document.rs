//! JSON catalog documents.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use charplan_domain::{
    CharacterClass, CharacterOption, EquipmentItem, GrantableEffect, ReferenceTag, Spell,
};
use serde::{Deserialize, Serialize};

use super::InMemoryCatalog;
use crate::infrastructure::ports::{CatalogEntity, CatalogError, CatalogPort};

/// Every table a catalog serves, in one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogDocument {
    #[serde(default)]
    pub classes: Vec<CharacterClass>,
    #[serde(default)]
    pub spells: Vec<Spell>,
    #[serde(default)]
    pub races: Vec<CharacterOption>,
    #[serde(default)]
    pub backgrounds: Vec<CharacterOption>,
    #[serde(default)]
    pub items: Vec<EquipmentItem>,
    #[serde(default)]
    pub passives: Vec<GrantableEffect>,
    #[serde(default)]
    pub actions: Vec<GrantableEffect>,
}

impl CatalogDocument {
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        serde_json::from_str(json).map_err(CatalogError::malformed)
    }
}

/// Catalog backed by a JSON document read once at startup.
#[derive(Debug, Clone)]
pub struct JsonCatalog {
    path: PathBuf,
    inner: InMemoryCatalog,
}

impl JsonCatalog {
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref().to_path_buf();
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| CatalogError::unavailable(format!("{}: {}", path.display(), e)))?;
        let document = CatalogDocument::from_json_str(&content)?;

        tracing::info!(
            path = %path.display(),
            classes = document.classes.len(),
            spells = document.spells.len(),
            items = document.items.len(),
            "Loaded catalog document"
        );

        Ok(Self {
            path,
            inner: InMemoryCatalog::new(document),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CatalogPort for JsonCatalog {
    async fn class_options(&self) -> Result<Vec<CharacterClass>, CatalogError> {
        self.inner.class_options().await
    }

    async fn spell_options(&self, class_name: Option<String>) -> Result<Vec<Spell>, CatalogError> {
        self.inner.spell_options(class_name).await
    }

    async fn race_options(&self) -> Result<Vec<CharacterOption>, CatalogError> {
        self.inner.race_options().await
    }

    async fn background_options(&self) -> Result<Vec<CharacterOption>, CatalogError> {
        self.inner.background_options().await
    }

    async fn entity_by_id(&self, tag: ReferenceTag, id: u32) -> Result<CatalogEntity, CatalogError> {
        self.inner.entity_by_id(tag, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_document_is_rejected() {
        let err = CatalogDocument::from_json_str(r#"{ "classes": 3 }"#).unwrap_err();
        assert!(matches!(err, CatalogError::Malformed(_)));
    }

    #[test]
    fn missing_tables_default_to_empty() {
        let doc = CatalogDocument::from_json_str("{}").unwrap();
        assert_eq!(doc, CatalogDocument::default());
    }

    #[tokio::test]
    async fn loads_fixture_from_disk() {
        let path = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("test_data")
            .join("catalog.json");
        let catalog = JsonCatalog::from_path(&path).await.unwrap();

        assert_eq!(catalog.path(), path.as_path());
        let classes = catalog.class_options().await.unwrap();
        assert!(classes.iter().any(|c| c.name == "Fighter"));
    }

    #[tokio::test]
    async fn missing_file_is_unavailable() {
        let err = JsonCatalog::from_path("/nonexistent/catalog.json")
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Unavailable(_)));
    }
}
