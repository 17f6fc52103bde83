use std::io::Cursor;

use image::ImageReader;
use scout_contracts::results::{
    GeneratedImageResult, SearchMode, WebImageResult, WebSearchResult,
};
use scout_engine::ResultView;

const DATA_URI_PREVIEW_CHARS: usize = 48;

pub fn render_welcome() -> String {
    let mut out = String::from("AI Search Agent\n");
    out.push_str(
        "Use /web, /images or /generate to switch between Web Search, Image Search, and Image Generation.\n",
    );
    for mode in SearchMode::ALL {
        out.push_str(&format!(
            "  {:<15} \"{}\"\n",
            mode.label(),
            mode.example_query()
        ));
    }
    out
}

pub fn render_loading(mode: SearchMode, query: &str) -> String {
    let verb = match mode {
        SearchMode::Web => "Searching the web for",
        SearchMode::WebImage => "Finding images of",
        SearchMode::ImageGeneration => "Generating images of",
    };
    format!("{verb} \"{query}\"...")
}

pub fn render_error(message: &str) -> String {
    format!("Error\n{message}")
}

pub fn render_view(view: ResultView<'_>) -> String {
    match view {
        ResultView::Web { query, result } => render_web(query, result),
        ResultView::WebImages { query, results } => render_web_images(query, results),
        ResultView::Generated { query, results } => render_generated(query, results),
    }
}

pub fn render_web(query: &str, result: &WebSearchResult) -> String {
    let mut out = format!("Results for \"{query}\"\n\n");
    let summary = result.summary.trim();
    if !summary.is_empty() {
        out.push_str(summary);
        out.push('\n');
    }
    if !result.sources.is_empty() {
        out.push_str("\nSources\n");
        for (idx, source) in result.sources.iter().enumerate() {
            out.push_str(&format!(
                "  {}. {} <{}>\n",
                idx + 1,
                source.title,
                source.uri
            ));
        }
    }
    out
}

/// Empty input renders nothing.
pub fn render_web_images(query: &str, results: &[WebImageResult]) -> String {
    if results.is_empty() {
        return String::new();
    }
    let mut out = format!("Images for \"{query}\"\n");
    for (idx, image) in results.iter().enumerate() {
        out.push_str(&format!(
            "\n  {}. {}\n     {}\n     Source: {}\n",
            idx + 1,
            image.description,
            image.image_url,
            image.source_url
        ));
    }
    out
}

pub fn render_generated(query: &str, results: &[GeneratedImageResult]) -> String {
    let mut out = format!("Generated images for \"{query}\"\n");
    for (idx, image) in results.iter().enumerate() {
        let dims = image_dimensions(&image.bytes)
            .map(|(width, height)| format!(", {width}x{height}"))
            .unwrap_or_default();
        out.push_str(&format!(
            "  {}. {} ({} bytes{dims}) {}\n",
            idx + 1,
            image.mime_type(),
            image.bytes.len(),
            preview_data_uri(&image.image_url)
        ));
    }
    out
}

pub fn image_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}

fn preview_data_uri(uri: &str) -> String {
    if uri.chars().count() <= DATA_URI_PREVIEW_CHARS {
        return uri.to_string();
    }
    uri.chars().take(DATA_URI_PREVIEW_CHARS).collect::<String>() + "…"
}
