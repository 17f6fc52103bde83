use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    #[default]
    Web,
    WebImage,
    ImageGeneration,
}

impl SearchMode {
    pub const ALL: [SearchMode; 3] = [
        SearchMode::Web,
        SearchMode::WebImage,
        SearchMode::ImageGeneration,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SearchMode::Web => "web",
            SearchMode::WebImage => "web_image",
            SearchMode::ImageGeneration => "image_generation",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SearchMode::Web => "Web Search",
            SearchMode::WebImage => "Image Search",
            SearchMode::ImageGeneration => "Generate Image",
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            SearchMode::Web => "Search the web for anything...",
            SearchMode::WebImage => "Search the web for images of...",
            SearchMode::ImageGeneration => "Describe an image to generate...",
        }
    }

    pub fn example_query(self) -> &'static str {
        match self {
            SearchMode::Web => "Latest AI trends",
            SearchMode::WebImage => "Photos of the aurora borealis",
            SearchMode::ImageGeneration => "A futuristic city at sunset",
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchMode {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "web" | "search" | "web_search" => Ok(SearchMode::Web),
            "web_image" | "webimage" | "image_search" | "images" => Ok(SearchMode::WebImage),
            "image_generation" | "imagegeneration" | "generate" | "gen" => {
                Ok(SearchMode::ImageGeneration)
            }
            _ => Err(format!(
                "Unknown search mode '{}'. Expected one of: web, images, generate.",
                raw.trim()
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebResultSource {
    pub title: String,
    pub uri: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebSearchResult {
    pub summary: String,
    pub sources: Vec<WebResultSource>,
}

impl WebSearchResult {
    pub fn is_empty(&self) -> bool {
        self.summary.is_empty() && self.sources.is_empty()
    }
}

/// Accumulates grounding citations, keeping the first title seen for each uri.
#[derive(Debug, Default)]
pub struct SourceList {
    seen: HashSet<String>,
    sources: Vec<WebResultSource>,
}

impl SourceList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the uri is empty or already present. Uris are
    /// compared exactly as received.
    pub fn push(&mut self, uri: &str, title: Option<&str>) -> bool {
        if uri.is_empty() || self.seen.contains(uri) {
            return false;
        }
        let title = title.filter(|value| !value.trim().is_empty()).unwrap_or(uri);
        self.seen.insert(uri.to_string());
        self.sources.push(WebResultSource {
            title: title.to_string(),
            uri: uri.to_string(),
        });
        true
    }

    pub fn into_sources(self) -> Vec<WebResultSource> {
        self.sources
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebImageResult {
    pub image_url: String,
    pub source_url: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedImageResult {
    /// `data:` URI carrying the encoded image inline.
    pub image_url: String,
    pub prompt: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl GeneratedImageResult {
    pub fn mime_type(&self) -> &str {
        self.image_url
            .strip_prefix("data:")
            .and_then(|rest| rest.split_once(';'))
            .map(|(mime, _)| mime)
            .unwrap_or("application/octet-stream")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum QueryResult {
    Web(WebSearchResult),
    WebImages(Vec<WebImageResult>),
    Generated(Vec<GeneratedImageResult>),
}

impl QueryResult {
    pub fn mode(&self) -> SearchMode {
        match self {
            QueryResult::Web(_) => SearchMode::Web,
            QueryResult::WebImages(_) => SearchMode::WebImage,
            QueryResult::Generated(_) => SearchMode::ImageGeneration,
        }
    }

    pub fn item_count(&self) -> usize {
        match self {
            QueryResult::Web(result) => result.sources.len(),
            QueryResult::WebImages(images) => images.len(),
            QueryResult::Generated(images) => images.len(),
        }
    }
}
