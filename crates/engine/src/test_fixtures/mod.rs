//! Test fixtures loader for JSON fixture files and common build helpers.
//!
//! Fixtures live in the crate's `test_data/` directory. `catalog.json` holds a
//! small two-class catalog (Fighter 1-12, Wizard 1-5) with races, backgrounds,
//! spells and items.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_fixtures::{build_fighter, item};
//!
//! #[test]
//! fn test_fighter_holds_a_shield() {
//!     let character = build_fighter(2)
//!         .equip_item(EquipmentSlot::MeleeOffhand, item("Wooden Shield"))
//!         .unwrap();
//!     // ... test logic
//! }
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use charplan_domain::{
    Ability, CharacterOption, EquipmentItem, GrantableEffect, PassiveSubtype, PlannerStep,
};

use crate::infrastructure::catalog::{CatalogDocument, InMemoryCatalog};
use crate::infrastructure::config::PlannerConfig;
use crate::use_cases::planner::{Character, PlannerSession};

// =============================================================================
// Fixture Loading
// =============================================================================

/// Load a JSON fixture from test_data/ directory.
///
/// # Panics
///
/// Panics if the fixture file cannot be read or parsed.
pub fn load_fixture<T: serde::de::DeserializeOwned>(path: &str) -> T {
    let fixture_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("test_data")
        .join(path);
    let content = std::fs::read_to_string(&fixture_path).unwrap_or_else(|e| {
        panic!(
            "Failed to read fixture '{}': {}",
            fixture_path.display(),
            e
        )
    });
    serde_json::from_str(&content).unwrap_or_else(|e| {
        panic!(
            "Failed to parse fixture '{}': {}",
            fixture_path.display(),
            e
        )
    })
}

pub fn catalog_document() -> CatalogDocument {
    load_fixture("catalog.json")
}

pub fn catalog() -> InMemoryCatalog {
    InMemoryCatalog::new(catalog_document())
}

/// A development session over the fixture catalog: strict invariants and
/// export self-check on.
pub fn session() -> Arc<PlannerSession> {
    let document = catalog_document();
    let classes = document.classes.clone();
    let spells = document.spells.clone();
    Arc::new(PlannerSession::new(
        Arc::new(InMemoryCatalog::new(document)),
        classes,
        spells,
        PlannerConfig::development(),
    ))
}

/// A catalog item by name.
pub fn item(name: &str) -> Arc<EquipmentItem> {
    catalog_document()
        .items
        .into_iter()
        .find(|item| item.name == name)
        .map(Arc::new)
        .unwrap_or_else(|| panic!("no fixture item named '{}'", name))
}

// =============================================================================
// Answer Helpers
// =============================================================================

/// Point-buy scores: STR 15, DEX 14, CON 14, INT 8, WIS 10, CHA 10.
pub fn ability_scores_option() -> CharacterOption {
    let values: BTreeMap<Ability, i32> = [
        (Ability::Strength, 15),
        (Ability::Dexterity, 14),
        (Ability::Constitution, 14),
        (Ability::Intelligence, 8),
        (Ability::Wisdom, 10),
        (Ability::Charisma, 10),
    ]
    .into_iter()
    .collect();

    CharacterOption::new("Point Buy").with_grants(vec![GrantableEffect::ability_scores(
        "Base Ability Scores",
        PassiveSubtype::AbilityBase,
        values,
    )])
}

/// Answer the front pending decision with the named options.
///
/// # Panics
///
/// Panics if nothing is pending, a name is not offered, or the engine
/// rejects the answer.
pub fn answer(character: &Character, names: &[&str]) -> Character {
    let pending = character
        .next_decision()
        .cloned()
        .unwrap_or_else(|| panic!("nothing pending to answer with {:?}", names));
    let options = names
        .iter()
        .map(|name| {
            pending
                .option_named(name)
                .cloned()
                .unwrap_or_else(|| panic!("'{}' is not offered for {}", name, pending.step))
        })
        .collect();
    character
        .make_decision(&pending, options)
        .unwrap_or_else(|e| panic!("answering {} failed: {}", pending.step, e))
}

/// Answer every pending decision with its first options, stopping at an
/// open MANAGE_LEVELS decision.
pub fn answer_all_first(character: &Character) -> Character {
    let mut character = character.clone();
    while let Some(pending) = character.next_decision().cloned() {
        let options = match pending.step {
            PlannerStep::ManageLevels => break,
            PlannerStep::SetAbilityScores => vec![ability_scores_option()],
            _ => pending.options.iter().take(pending.count).cloned().collect(),
        };
        assert!(!options.is_empty(), "{} has no options", pending.step);
        character = character
            .make_decision(&pending, options)
            .unwrap_or_else(|e| panic!("answering {} failed: {}", pending.step, e));
    }
    character
}

// =============================================================================
// Build Fixtures
// =============================================================================

/// A Fighter of `levels` levels with every choice at its first option
/// (Archery, Athletics, Champion, Alert at 4).
pub fn build_fighter(levels: usize) -> Character {
    let mut character = Character::new(session());
    for _ in 0..levels {
        character = answer_all_first(&answer(&character.level_up(), &["Fighter"]));
    }
    character
}

/// `character` with `levels` Wizard levels added through "Add a class",
/// every choice at its first option.
pub fn add_wizard(character: &Character, levels: usize) -> Character {
    let character = character.level_up();
    let pending = character
        .next_decision()
        .cloned()
        .unwrap_or_else(|| panic!("no level up queued"));
    let proxy = pending
        .option_named("Add a class")
        .cloned()
        .unwrap_or_else(|| panic!("no new class offered"));
    let character = character
        .make_decision(&pending, vec![proxy])
        .unwrap_or_else(|e| panic!("adding a class failed: {}", e));

    let mut character = answer_all_first(&answer(&character, &["Wizard"]));
    for _ in 1..levels {
        character = answer_all_first(&answer(&character.level_up(), &["Wizard"]));
    }
    character
}

/// A level 4 Fighter who took `feat` at level 4.
pub fn build_fighter_with_feat(feat: &str) -> Character {
    let character = answer(&build_fighter(3).level_up(), &["Fighter"]);
    answer_all_first(&answer(&character, &[feat]))
}

/// A finished level 4 High Elf Fighter with the Soldier background.
pub async fn complete_build(session: Arc<PlannerSession>) -> Character {
    let mut character = Character::new(session);
    while let Some(next) = character
        .queue_next_step()
        .await
        .unwrap_or_else(|e| panic!("queueing a step failed: {}", e))
    {
        character = next;
    }

    let character = answer(&answer(&character, &["Elf"]), &["High Elf"]);
    let mut character = answer_all_first(&character);
    for _ in 1..4 {
        character = answer_all_first(&answer(&character.level_up(), &["Fighter"]));
    }
    character
}
