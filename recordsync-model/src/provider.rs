//! Payment provider configuration variants.
//!
//! Each provider declares an ordered list of configuration keys. All
//! per-provider behavior goes through [`ProviderKind::descriptor`]; nothing
//! else matches on provider identifiers.

use crate::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One configuration key a provider requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigKey {
    pub key: &'static str,
    pub label: &'static str,
    /// Allowed values, when the key is a fixed choice.
    pub options: Option<&'static [&'static str]>,
}

/// Static description of a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderDescriptor {
    pub unique_id: &'static str,
    pub name: &'static str,
    pub logo: &'static str,
    pub full_logo: &'static str,
    pub config: &'static [ConfigKey],
}

static COINBASE: ProviderDescriptor = ProviderDescriptor {
    unique_id: "coinbase",
    name: "Coinbase",
    logo: "/images/coinbase.png",
    full_logo: "/images/coinbase-1.png",
    config: &[
        ConfigKey {
            key: "API_KEY",
            label: "Api Key",
            options: None,
        },
        ConfigKey {
            key: "WEBHOOK_SECRET",
            label: "Webhook Secret",
            options: None,
        },
    ],
};

static COINGATE: ProviderDescriptor = ProviderDescriptor {
    unique_id: "coingate",
    name: "Coingate",
    logo: "/images/coingate.png",
    full_logo: "/images/coingate-1.png",
    config: &[
        ConfigKey {
            key: "AUTH_TOKEN",
            label: "Auth Token",
            options: None,
        },
        ConfigKey {
            key: "ENVIRONMENT",
            label: "Environment",
            options: Some(&["test", "production"]),
        },
    ],
};

/// Supported instant-deposit providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Coinbase,
    Coingate,
}

impl ProviderKind {
    /// Every provider, in display order.
    pub const ALL: [ProviderKind; 2] = [ProviderKind::Coinbase, ProviderKind::Coingate];

    /// The provider's static descriptor.
    pub fn descriptor(self) -> &'static ProviderDescriptor {
        match self {
            ProviderKind::Coinbase => &COINBASE,
            ProviderKind::Coingate => &COINGATE,
        }
    }

    /// Resolves a provider from its unique id.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.descriptor().unique_id == id)
    }
}

/// A provider configuration block as edited in a form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub provider: ProviderKind,
    #[serde(default)]
    pub config: BTreeMap<String, String>,
}

impl ProviderConfig {
    /// A config with one empty value per declared key.
    pub fn blank(provider: ProviderKind) -> Self {
        let config = provider
            .descriptor()
            .config
            .iter()
            .map(|k| (k.key.to_string(), String::new()))
            .collect();
        Self { provider, config }
    }

    /// Sets a configuration value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.config.insert(key.into(), value.into());
    }

    /// A copy holding only the keys the provider declares.
    pub fn normalized(&self) -> Self {
        let config = self
            .provider
            .descriptor()
            .config
            .iter()
            .filter_map(|k| {
                self.config
                    .get(k.key)
                    .map(|v| (k.key.to_string(), v.clone()))
            })
            .collect();
        Self {
            provider: self.provider,
            config,
        }
    }

    /// Checks every declared key. `path` is the path of the block itself;
    /// errors are reported at `<path>.config.<KEY>`.
    pub fn validate(&self, path: &str) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        for key in self.provider.descriptor().config {
            let key_path = format!("{path}.config.{}", key.key);
            let value = self.config.get(key.key).map(|v| v.trim()).unwrap_or("");
            if value.is_empty() {
                errors.push(ValidationError::new(key_path, "required"));
                continue;
            }
            if let Some(options) = key.options {
                if !options.contains(&value) {
                    errors.push(ValidationError::new(
                        key_path,
                        format!("must be one of: {}", options.join(", ")),
                    ));
                }
            }
        }
        errors
    }
}
