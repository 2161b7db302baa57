//! Charplan Engine - inspect an exported build.
//!
//! Reads an export string from the first argument (or stdin), rebuilds the
//! tree against the catalog named by `CHARPLAN_CATALOG_PATH` and prints a
//! summary of the build.

use std::sync::Arc;

use anyhow::Context;
use tokio::io::AsyncReadExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use charplan_engine::infrastructure::catalog::JsonCatalog;
use charplan_engine::infrastructure::config::{PlannerConfig, ENV_CATALOG_PATH};
use charplan_engine::use_cases::planner::{Character, PlannerSession};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv_from_repo_root();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "charplan_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = PlannerConfig::from_env();
    let catalog_path = config
        .catalog_path
        .clone()
        .with_context(|| format!("{} is not set", ENV_CATALOG_PATH))?;

    let catalog = JsonCatalog::from_path(&catalog_path)
        .await
        .with_context(|| format!("loading catalog {}", catalog_path.display()))?;
    let session = PlannerSession::start(Arc::new(catalog), config).await?;

    let encoded = match std::env::args().nth(1) {
        Some(arg) => arg,
        None => {
            let mut input = String::new();
            tokio::io::stdin().read_to_string(&mut input).await?;
            input
        }
    };

    let character = Character::import(session, encoded.trim()).await?;
    print_summary(&character);
    Ok(())
}

fn print_summary(character: &Character) {
    let name_of = |node: Option<&charplan_domain::TreeNode>| {
        node.map_or_else(|| "-".to_string(), |n| n.name.clone())
    };

    println!("Race:       {}", name_of(character.race()));
    if let Some(subrace) = character.subrace() {
        println!("Subrace:    {}", subrace.name);
    }
    println!("Background: {}", name_of(character.background()));
    println!("Level:      {}", character.total_level());

    for class in character.class_info() {
        let subclass = class
            .subclass
            .map(|node| format!(" ({})", node.name))
            .unwrap_or_default();
        println!("  {} {}{}", class.name, class.levels.len(), subclass);
    }

    let scores: Vec<String> = character
        .total_ability_scores()
        .iter()
        .map(|(ability, value)| format!("{} {}", ability, value))
        .collect();
    println!("Abilities:  {}", scores.join(", "));

    let feats: Vec<&str> = character.feats().iter().map(|n| n.name.as_str()).collect();
    if !feats.is_empty() {
        println!("Feats:      {}", feats.join(", "));
    }

    for (slot, equipped) in character.equipment() {
        println!("  {}: {}", slot, equipped.item.name);
    }
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
