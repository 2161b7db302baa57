//! Planner configuration loaded from the environment.

use std::path::PathBuf;
use std::str::FromStr;

pub const ENV_ENVIRONMENT: &str = "CHARPLAN_ENVIRONMENT";
pub const ENV_MAX_LEVEL: &str = "CHARPLAN_MAX_LEVEL";
pub const ENV_UNDO_LIMIT: &str = "CHARPLAN_UNDO_LIMIT";
pub const ENV_VALIDATE_EXPORT: &str = "CHARPLAN_VALIDATE_EXPORT";
pub const ENV_CATALOG_PATH: &str = "CHARPLAN_CATALOG_PATH";

const DEFAULT_MAX_LEVEL: usize = 12;
const DEFAULT_UNDO_LIMIT: usize = 64;

/// How structural invariant breaches inside the engine are handled.
///
/// Development builds fail loudly; everywhere else the breach is logged and
/// the engine carries on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvariantPolicy {
    Strict,
    Lenient,
}

impl InvariantPolicy {
    /// Returns whether the invariant held.
    ///
    /// # Panics
    /// Under `Strict` when `holds` is false.
    pub fn check(&self, holds: bool, message: impl FnOnce() -> String) -> bool {
        if holds {
            return true;
        }

        let message = message();
        match self {
            InvariantPolicy::Strict => panic!("Invariant violated: {}", message),
            InvariantPolicy::Lenient => {
                tracing::error!(%message, "Invariant violated, continuing");
                false
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerConfig {
    pub environment: String,
    pub invariants: InvariantPolicy,
    /// Total level cap across all classes
    pub max_level: usize,
    /// Snapshots retained by `BuildHistory`
    pub undo_limit: usize,
    /// Run the serializer self-check on every export
    pub validate_export: bool,
    pub catalog_path: Option<PathBuf>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            environment: "production".to_string(),
            invariants: InvariantPolicy::Lenient,
            max_level: DEFAULT_MAX_LEVEL,
            undo_limit: DEFAULT_UNDO_LIMIT,
            validate_export: false,
            catalog_path: None,
        }
    }
}

impl PlannerConfig {
    /// Strict invariants, export self-check on.
    pub fn development() -> Self {
        Self {
            environment: "dev".to_string(),
            invariants: InvariantPolicy::Strict,
            validate_export: true,
            ..Self::default()
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source. Missing or unparsable values fall
    /// back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let environment = lookup(ENV_ENVIRONMENT).unwrap_or(defaults.environment);
        let invariants = if environment == "dev" {
            InvariantPolicy::Strict
        } else {
            InvariantPolicy::Lenient
        };

        Self {
            invariants,
            max_level: parse_or(&lookup, ENV_MAX_LEVEL, defaults.max_level),
            undo_limit: parse_or(&lookup, ENV_UNDO_LIMIT, defaults.undo_limit),
            validate_export: parse_or(&lookup, ENV_VALIDATE_EXPORT, defaults.validate_export),
            catalog_path: lookup(ENV_CATALOG_PATH).map(PathBuf::from),
            environment,
        }
    }

    pub fn is_dev(&self) -> bool {
        self.environment == "dev"
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + std::fmt::Debug,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, ?default, "Invalid config value, using default");
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = PlannerConfig::from_lookup(|_| None);
        assert_eq!(config, PlannerConfig::default());
        assert_eq!(config.max_level, 12);
        assert_eq!(config.undo_limit, 64);
        assert_eq!(config.invariants, InvariantPolicy::Lenient);
    }

    #[test]
    fn dev_environment_is_strict() {
        let config = PlannerConfig::from_lookup(lookup_from(&[
            (ENV_ENVIRONMENT, "dev"),
            (ENV_MAX_LEVEL, "20"),
            (ENV_VALIDATE_EXPORT, "true"),
            (ENV_CATALOG_PATH, "/tmp/catalog.json"),
        ]));
        assert!(config.is_dev());
        assert_eq!(config.invariants, InvariantPolicy::Strict);
        assert_eq!(config.max_level, 20);
        assert!(config.validate_export);
        assert_eq!(config.catalog_path, Some(PathBuf::from("/tmp/catalog.json")));
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = PlannerConfig::from_lookup(lookup_from(&[
            (ENV_MAX_LEVEL, "twelve"),
            (ENV_UNDO_LIMIT, "-1"),
        ]));
        assert_eq!(config.max_level, 12);
        assert_eq!(config.undo_limit, 64);
    }

    #[test]
    fn lenient_policy_reports_breach() {
        assert!(InvariantPolicy::Lenient.check(true, || "unused".into()));
        assert!(!InvariantPolicy::Lenient.check(false, || "count mismatch".into()));
    }

    #[test]
    #[should_panic(expected = "count mismatch")]
    fn strict_policy_panics() {
        InvariantPolicy::Strict.check(false, || "count mismatch".into());
    }
}
