mod registry;
mod selectors;

use std::fmt;

use crate::results::SearchMode;

pub use registry::{ModelRegistry, ModelSpec};
pub use selectors::{ModelSelection, ModelSelector};

/// Which of the two configured models a request goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelRole {
    /// Gemini `generateContent` with Google Search grounding.
    Text,
    /// Imagen `predict`.
    Image,
}

impl ModelRole {
    pub fn for_mode(mode: SearchMode) -> Self {
        match mode {
            SearchMode::Web | SearchMode::WebImage => ModelRole::Text,
            SearchMode::ImageGeneration => ModelRole::Image,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ModelRole::Text => "text",
            ModelRole::Image => "image",
        }
    }
}

impl fmt::Display for ModelRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
