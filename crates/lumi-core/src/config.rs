use serde::{Deserialize, Serialize};

use crate::types::{Domain, RegistryId};

/// Static parameters of a credential registry deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Collection name, also the signing-domain name.
    #[serde(default = "default_name")]
    pub name: String,
    /// Short collection symbol.
    #[serde(default = "default_symbol")]
    pub symbol: String,
    /// Authorization scheme version.
    #[serde(default = "default_version")]
    pub version: String,
    /// Execution-context identifier (network / environment).
    #[serde(default = "default_context_id")]
    pub context_id: u64,
}

fn default_name() -> String {
    "LumiCredential".into()
}
fn default_symbol() -> String {
    "LUMI".into()
}
fn default_version() -> String {
    "1.0".into()
}
fn default_context_id() -> u64 {
    984123
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            symbol: default_symbol(),
            version: default_version(),
            context_id: default_context_id(),
        }
    }
}

impl RegistryConfig {
    /// Signing domain for the registry instance `registry`.
    pub fn domain(&self, registry: RegistryId) -> Domain {
        Domain {
            name: self.name.clone(),
            version: self.version.clone(),
            context_id: self.context_id,
            registry,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RegistryConfig::default();
        assert_eq!(config.name, "LumiCredential");
        assert_eq!(config.symbol, "LUMI");
        assert_eq!(config.version, "1.0");
        assert_eq!(config.context_id, 984123);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: RegistryConfig = serde_json::from_str(r#"{"name":"Campaign"}"#).unwrap();
        assert_eq!(config.name, "Campaign");
        assert_eq!(config.symbol, "LUMI");
    }

    #[test]
    fn test_domain_carries_registry() {
        let config = RegistryConfig {
            context_id: 7,
            ..Default::default()
        };
        let domain = config.domain(RegistryId([9u8; 32]));
        assert_eq!(domain.name, "LumiCredential");
        assert_eq!(domain.context_id, 7);
        assert_eq!(domain.registry, RegistryId([9u8; 32]));
    }
}
