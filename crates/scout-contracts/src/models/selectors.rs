use anyhow::{bail, Result};

use super::registry::ModelRegistry;
use super::ModelRole;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSelection {
    pub name: String,
    pub role: ModelRole,
    /// Set when a requested model was replaced by the role default.
    pub fallback_reason: Option<String>,
}

/// Resolves user-supplied model names against the registry.
#[derive(Debug, Clone, Default)]
pub struct ModelSelector {
    registry: ModelRegistry,
}

impl ModelSelector {
    pub fn new(registry: ModelRegistry) -> Self {
        Self { registry }
    }

    /// A blank request picks the role default silently. An unknown name, or
    /// one registered for the other role, falls back with a reason.
    pub fn select(&self, role: ModelRole, requested: Option<&str>) -> Result<ModelSelection> {
        let Some(default) = self.registry.default_for(role) else {
            bail!("no {role} models are registered");
        };
        let requested = requested.map(str::trim).filter(|value| !value.is_empty());
        let Some(requested) = requested else {
            return Ok(ModelSelection {
                name: default.name.clone(),
                role,
                fallback_reason: None,
            });
        };

        match self.registry.get(requested) {
            Some(spec) if spec.role == role => Ok(ModelSelection {
                name: spec.name.clone(),
                role,
                fallback_reason: None,
            }),
            _ => Ok(ModelSelection {
                name: default.name.clone(),
                role,
                fallback_reason: Some(format!(
                    "'{requested}' is not a known {role} model; using {}. Known: {}.",
                    default.name,
                    self.registry.names_for(role).join(", ")
                )),
            }),
        }
    }
}
