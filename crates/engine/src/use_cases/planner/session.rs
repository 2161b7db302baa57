//! Planner session: the collaborators and tables shared by every engine
//! instance of one build.

use std::fmt;
use std::sync::Arc;

use charplan_domain::{CharacterClass, Spell};

use crate::infrastructure::config::PlannerConfig;
use crate::infrastructure::ports::{CatalogError, CatalogPort};
use crate::infrastructure::references::ReferenceRegistry;
use crate::infrastructure::serializer::TreeSerializer;

pub struct PlannerSession {
    catalog: Arc<dyn CatalogPort>,
    references: Arc<ReferenceRegistry>,
    classes: Vec<CharacterClass>,
    spells: Vec<Arc<Spell>>,
    config: PlannerConfig,
}

impl PlannerSession {
    /// Load the class and spell tables and open empty interning pools.
    pub async fn start(
        catalog: Arc<dyn CatalogPort>,
        config: PlannerConfig,
    ) -> Result<Arc<Self>, CatalogError> {
        let classes = catalog.class_options().await?;
        let spells = catalog.spell_options(None).await?;

        tracing::info!(
            classes = classes.len(),
            spells = spells.len(),
            environment = %config.environment,
            "Planner session started"
        );

        Ok(Arc::new(Self::new(catalog, classes, spells, config)))
    }

    pub fn new(
        catalog: Arc<dyn CatalogPort>,
        classes: Vec<CharacterClass>,
        spells: Vec<Spell>,
        config: PlannerConfig,
    ) -> Self {
        let references = Arc::new(ReferenceRegistry::new());
        let spells = spells
            .into_iter()
            .map(|spell| references.intern_spell(Arc::new(spell)))
            .collect();

        Self {
            catalog,
            references,
            classes,
            spells,
            config,
        }
    }

    pub fn catalog(&self) -> &Arc<dyn CatalogPort> {
        &self.catalog
    }

    pub fn references(&self) -> &Arc<ReferenceRegistry> {
        &self.references
    }

    pub fn classes(&self) -> &[CharacterClass] {
        &self.classes
    }

    pub fn class(&self, name: &str) -> Option<&CharacterClass> {
        self.classes.iter().find(|class| class.name == name)
    }

    pub fn spells(&self) -> &[Arc<Spell>] {
        &self.spells
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn serializer(&self) -> TreeSerializer {
        TreeSerializer::new(self.catalog.clone(), self.references.clone())
    }
}

impl fmt::Debug for PlannerSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlannerSession")
            .field("classes", &self.classes.len())
            .field("spells", &self.spells.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::MockCatalogPort;
    use crate::test_fixtures;
    use charplan_domain::ReferenceTag;

    #[tokio::test]
    async fn start_loads_tables_and_pools_spells() {
        let catalog = Arc::new(test_fixtures::catalog());
        let session = PlannerSession::start(catalog, PlannerConfig::development())
            .await
            .unwrap();

        assert!(session.class("Fighter").is_some());
        assert!(!session.spells().is_empty());
        assert_eq!(
            session.references().len(ReferenceTag::Spell),
            session.spells().len()
        );
    }

    #[tokio::test]
    async fn when_catalog_unavailable_start_fails() {
        let mut catalog = MockCatalogPort::new();
        catalog
            .expect_class_options()
            .returning(|| Err(CatalogError::unavailable("connection refused")));

        let result = PlannerSession::start(Arc::new(catalog), PlannerConfig::default()).await;

        assert!(matches!(result, Err(CatalogError::Unavailable(_))));
    }
}
