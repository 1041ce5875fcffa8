//! # Session Configuration
//!
//! Instance naming and global conditions for the cart manager.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     EASYCART_PREFIX=shop_                                              │
//! │     EASYCART_DEFAULT_INSTANCE=main                                     │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     passed explicitly to SessionConfig::load                           │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     prefix "easycart_", instance "default", no global conditions       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # easycart.toml
//! prefix = "easycart_"
//! default_instance = "default"
//!
//! [[global_conditions]]
//! name = "VAT"
//! value = "+8.25%"
//! type = "tax"
//!
//! [[global_conditions]]
//! name = "Summer Sale"
//! value = "-10%"
//! type = "discount"
//! target = "products"
//! products = ["1", "2"]
//! max = "80"          # cap on the adjustment, currency units
//! minimum = "300"     # minimum purchase
//! minimum_per_item = false
//! ```

use std::path::Path;

use easycart_core::{Condition, CoreResult, Money, ProductId, Target, DEFAULT_INSTANCE_NAME, INSTANCE_PREFIX};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{SessionError, SessionResult};

// =============================================================================
// Condition Config
// =============================================================================

/// A condition declared in the config file.
///
/// Amounts are decimal strings, parsed the same way condition values are.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionConfig {
    pub name: String,

    pub value: String,

    #[serde(rename = "type", default = "default_condition_type")]
    pub kind: String,

    #[serde(default)]
    pub target: Target,

    #[serde(default)]
    pub products: Vec<ProductId>,

    #[serde(default)]
    pub max: Option<String>,

    #[serde(default)]
    pub minimum: Option<String>,

    #[serde(default)]
    pub minimum_per_item: bool,
}

fn default_condition_type() -> String {
    "discount".to_string()
}

impl ConditionConfig {
    /// Builds the condition, failing on any malformed value or amount.
    pub fn to_condition(&self) -> CoreResult<Condition> {
        let mut condition = Condition::new(self.name.clone(), &self.value, self.kind.clone())?;

        if self.target == Target::Products {
            condition = condition.on_products(&self.products);
        }
        if let Some(max) = &self.max {
            condition = condition.max_at(max.parse::<Money>()?);
        }
        if let Some(minimum) = &self.minimum {
            condition = condition.with_minimum(minimum.parse::<Money>()?, self.minimum_per_item);
        }

        Ok(condition)
    }
}

// =============================================================================
// Session Config
// =============================================================================

/// Cart manager configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Prepended to every instance name before store lookups.
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Instance used when the caller names none.
    #[serde(default = "default_instance")]
    pub default_instance: String,

    /// Conditions applied to every newly created cart.
    #[serde(default)]
    pub global_conditions: Vec<ConditionConfig>,
}

fn default_prefix() -> String {
    INSTANCE_PREFIX.to_string()
}

fn default_instance() -> String {
    DEFAULT_INSTANCE_NAME.to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            prefix: default_prefix(),
            default_instance: default_instance(),
            global_conditions: Vec::new(),
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a TOML document. Environment overrides are not applied.
    pub fn from_toml_str(contents: &str) -> SessionResult<Self> {
        let config: SessionConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file, when `path` is given and exists
    /// 3. Environment variables
    pub fn load(path: Option<&Path>) -> SessionResult<Self> {
        let mut config = Self::default();

        if let Some(path) = path {
            if path.exists() {
                info!(?path, "Loading session config from file");
                let contents = std::fs::read_to_string(path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus environment overrides.
    pub fn from_env() -> SessionResult<Self> {
        Self::load(None)
    }

    /// Writes the configuration as TOML.
    pub fn save(&self, path: &Path) -> SessionResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        info!(?path, "Session config saved");
        Ok(())
    }

    /// Checks instance naming and that every global condition builds.
    pub fn validate(&self) -> SessionResult<()> {
        if self.default_instance.trim().is_empty() {
            return Err(SessionError::InvalidConfig(
                "default_instance must not be empty".into(),
            ));
        }
        self.conditions()?;
        Ok(())
    }

    /// Builds the configured global conditions in declaration order.
    pub fn conditions(&self) -> SessionResult<Vec<Condition>> {
        self.global_conditions
            .iter()
            .map(|c| c.to_condition().map_err(SessionError::from))
            .collect()
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies `EASYCART_*` overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(prefix) = lookup("EASYCART_PREFIX") {
            debug!(prefix = %prefix, "Overriding instance prefix from environment");
            self.prefix = prefix;
        }

        if let Some(instance) = lookup("EASYCART_DEFAULT_INSTANCE") {
            debug!(instance = %instance, "Overriding default instance from environment");
            self.default_instance = instance;
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
prefix = "shop_"
default_instance = "main"

[[global_conditions]]
name = "VAT"
value = "+8.25%"
type = "tax"

[[global_conditions]]
name = "Summer Sale"
value = "-10%"
target = "products"
products = ["1", "2"]
max = "80"
minimum = "300"
"#;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.prefix, "easycart_");
        assert_eq!(config.default_instance, "default");
        assert!(config.global_conditions.is_empty());
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        assert_eq!(SessionConfig::from_toml_str("").unwrap(), SessionConfig::default());
    }

    #[test]
    fn test_parse_global_conditions() {
        let config = SessionConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.prefix, "shop_");
        assert_eq!(config.default_instance, "main");

        let conditions = config.conditions().unwrap();
        assert_eq!(conditions.len(), 2);
        assert!(conditions[0].is_tax());

        let sale = &conditions[1];
        assert_eq!(sale.kind(), "discount");
        assert_eq!(sale.target(), Target::Products);
        assert!(sale.applies_to_product(&ProductId::from(2)));
        assert_eq!(sale.max_value(), Some(Money::from_units(80)));
        assert_eq!(sale.minimum(), Some(Money::from_units(300)));
        assert!(sale.is_cart_gated());
    }

    #[test]
    fn test_malformed_condition_fails_validation() {
        let broken = r#"
[[global_conditions]]
name = "Oops"
value = "ten percent"
"#;
        assert!(matches!(
            SessionConfig::from_toml_str(broken),
            Err(SessionError::Core(_))
        ));

        let bad_cap = r#"
[[global_conditions]]
name = "Cap"
value = "-5%"
max = "lots"
"#;
        assert!(SessionConfig::from_toml_str(bad_cap).is_err());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        assert!(matches!(
            SessionConfig::from_toml_str("prefix = "),
            Err(SessionError::Config(_))
        ));
    }

    #[test]
    fn test_empty_default_instance_rejected() {
        assert!(matches!(
            SessionConfig::from_toml_str("default_instance = \" \""),
            Err(SessionError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_overrides() {
        let mut config = SessionConfig::default();
        config.apply_overrides(|key| match key {
            "EASYCART_PREFIX" => Some("tenant42_".to_string()),
            _ => None,
        });
        assert_eq!(config.prefix, "tenant42_");
        assert_eq!(config.default_instance, "default");
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = SessionConfig::load(Some(&dir.path().join("missing.toml"))).unwrap();
        assert!(config.global_conditions.is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conf").join("easycart.toml");
        let config = SessionConfig::from_toml_str(SAMPLE).unwrap();

        config.save(&path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(SessionConfig::from_toml_str(&contents).unwrap(), config);
    }
}
