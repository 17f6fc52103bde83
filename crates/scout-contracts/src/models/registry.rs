use indexmap::IndexMap;

use super::ModelRole;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    pub name: String,
    pub role: ModelRole,
}

impl ModelSpec {
    pub fn new(name: impl Into<String>, role: ModelRole) -> Self {
        Self {
            name: name.into(),
            role,
        }
    }
}

/// Known models in preference order; the first model per role is the default.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    models: IndexMap<String, ModelSpec>,
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::from_specs([
            ModelSpec::new("gemini-2.5-flash", ModelRole::Text),
            ModelSpec::new("gemini-2.5-pro", ModelRole::Text),
            ModelSpec::new("gemini-2.0-flash", ModelRole::Text),
            ModelSpec::new("imagen-3.0-generate-002", ModelRole::Image),
            ModelSpec::new("imagen-4.0-generate-001", ModelRole::Image),
            ModelSpec::new("imagen-4.0-fast-generate-001", ModelRole::Image),
        ])
    }
}

impl ModelRegistry {
    pub fn from_specs(specs: impl IntoIterator<Item = ModelSpec>) -> Self {
        Self {
            models: specs
                .into_iter()
                .map(|spec| (spec.name.clone(), spec))
                .collect(),
        }
    }

    /// Looks a model up by name; an API-style `models/` prefix is ignored.
    pub fn get(&self, name: &str) -> Option<&ModelSpec> {
        self.models.get(name.trim().trim_start_matches("models/"))
    }

    pub fn default_for(&self, role: ModelRole) -> Option<&ModelSpec> {
        self.models.values().find(|spec| spec.role == role)
    }

    pub fn names_for(&self, role: ModelRole) -> Vec<&str> {
        self.models
            .values()
            .filter(|spec| spec.role == role)
            .map(|spec| spec.name.as_str())
            .collect()
    }
}
