use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use scout_contracts::events::{EventKind, EventWriter};
use scout_contracts::models::{ModelRole, ModelSelector};
use scout_contracts::results::{
    GeneratedImageResult, QueryResult, SearchMode, SourceList, WebImageResult, WebResultSource,
    WebSearchResult,
};
use serde_json::{json, Map, Value};

use crate::config::ScoutConfig;
use crate::error::QueryError;
use crate::extract::extract_json_object;
use crate::prompts::{
    web_image_search_prompt, web_search_prompt, GENERATED_ASPECT_RATIO, GENERATED_IMAGE_COUNT,
    GENERATED_IMAGE_MIME,
};
use crate::transport::ModelTransport;

const WEB_SEARCH_UNAVAILABLE: &str =
    "Failed to fetch web search results. The API may be unavailable or the query may be inappropriate.";
const IMAGE_SEARCH_UNAVAILABLE: &str =
    "Failed to fetch image search results. The API may be unavailable or the query may be inappropriate.";
const GENERATION_UNAVAILABLE: &str =
    "Failed to generate images. The API may be unavailable or the prompt may be inappropriate.";

/// Builds mode-specific requests, sends them through a [`ModelTransport`],
/// and normalizes the replies into typed results.
pub struct QueryService {
    transport: Box<dyn ModelTransport>,
    text_model: String,
    image_model: String,
    events: Option<EventWriter>,
}

impl QueryService {
    pub fn new(
        transport: Box<dyn ModelTransport>,
        text_model: impl Into<String>,
        image_model: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            text_model: text_model.into(),
            image_model: image_model.into(),
            events: None,
        }
    }

    /// Resolves model names through the registry, falling back to the
    /// defaults. Returns the fallback reasons so callers can surface them.
    pub fn from_config(
        transport: Box<dyn ModelTransport>,
        config: &ScoutConfig,
    ) -> anyhow::Result<(Self, Vec<String>)> {
        let selector = ModelSelector::default();
        let text = selector.select(ModelRole::Text, config.text_model.as_deref())?;
        let image = selector.select(ModelRole::Image, config.image_model.as_deref())?;
        let warnings = [text.fallback_reason, image.fallback_reason]
            .into_iter()
            .flatten()
            .collect();
        Ok((Self::new(transport, text.name, image.name), warnings))
    }

    pub fn with_events(mut self, events: Option<EventWriter>) -> Self {
        self.events = events;
        self
    }

    pub fn model(&self, role: ModelRole) -> &str {
        match role {
            ModelRole::Text => &self.text_model,
            ModelRole::Image => &self.image_model,
        }
    }

    pub fn set_model(&mut self, role: ModelRole, model: impl Into<String>) {
        let slot = match role {
            ModelRole::Text => &mut self.text_model,
            ModelRole::Image => &mut self.image_model,
        };
        *slot = model.into();
    }

    pub fn perform(&self, mode: SearchMode, query: &str) -> Result<QueryResult, QueryError> {
        match mode {
            SearchMode::Web => self.perform_web_search(query).map(QueryResult::Web),
            SearchMode::WebImage => self
                .perform_web_image_search(query)
                .map(QueryResult::WebImages),
            SearchMode::ImageGeneration => self
                .perform_image_generation(query)
                .map(QueryResult::Generated),
        }
    }

    pub fn perform_web_search(&self, query: &str) -> Result<WebSearchResult, QueryError> {
        let request = grounded_request(&web_search_prompt(query));
        let response = self
            .transport
            .generate_content(&self.text_model, &request)
            .map_err(|err| QueryError::service_unavailable(WEB_SEARCH_UNAVAILABLE, &err))?;

        let result = WebSearchResult {
            summary: response_text(&response),
            sources: grounding_sources(&response),
        };
        if result.is_empty() {
            return Err(QueryError::empty_result(
                "The model returned an empty response. Please try a different query.",
            ));
        }
        Ok(result)
    }

    pub fn perform_web_image_search(
        &self,
        query: &str,
    ) -> Result<Vec<WebImageResult>, QueryError> {
        let request = grounded_request(&web_image_search_prompt(query));
        let response = self
            .transport
            .generate_content(&self.text_model, &request)
            .map_err(|err| QueryError::service_unavailable(IMAGE_SEARCH_UNAVAILABLE, &err))?;

        let text = response_text(&response);
        if text.is_empty() {
            if is_safety_blocked(&response) {
                return Err(QueryError::safety_blocked());
            }
            return Err(QueryError::empty_result(
                "The model returned an empty response. Unable to find images.",
            ));
        }

        let parsed = parse_web_images(&text)?;
        for dropped in &parsed.dropped {
            self.record(
                EventKind::ImageSearchItemDropped,
                json!({
                    "query": query,
                    "index": dropped.index,
                    "reason": dropped.reason,
                }),
            );
        }
        Ok(parsed.images)
    }

    pub fn perform_image_generation(
        &self,
        prompt: &str,
    ) -> Result<Vec<GeneratedImageResult>, QueryError> {
        let request = json!({
            "instances": [{ "prompt": prompt }],
            "parameters": {
                "sampleCount": GENERATED_IMAGE_COUNT,
                "aspectRatio": GENERATED_ASPECT_RATIO,
                "outputOptions": { "mimeType": GENERATED_IMAGE_MIME },
            },
        });
        let response = self
            .transport
            .predict(&self.image_model, &request)
            .map_err(|err| QueryError::service_unavailable(GENERATION_UNAVAILABLE, &err))?;
        generated_images(&response, prompt)
    }

    fn record(&self, kind: EventKind, fields: Value) {
        if let Some(events) = self.events.as_ref() {
            events.record(kind, fields);
        }
    }
}

fn grounded_request(prompt: &str) -> Value {
    json!({
        "contents": [{
            "role": "user",
            "parts": [{ "text": prompt }],
        }],
        "tools": [{ "googleSearch": {} }],
    })
}

fn first_candidate(response: &Value) -> Option<&Map<String, Value>> {
    response
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|candidates| candidates.first())
        .and_then(Value::as_object)
}

/// Concatenated text parts of the first candidate; thought parts are skipped.
pub fn response_text(response: &Value) -> String {
    let Some(candidate) = first_candidate(response) else {
        return String::new();
    };
    candidate
        .get("content")
        .and_then(|content| content.get("parts"))
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter(|part| !part.get("thought").and_then(Value::as_bool).unwrap_or(false))
                .filter_map(|part| part.get("text").and_then(Value::as_str))
                .collect::<String>()
        })
        .unwrap_or_default()
}

/// Web citations from the first candidate's grounding metadata, deduplicated
/// by uri in first-seen order.
pub fn grounding_sources(response: &Value) -> Vec<WebResultSource> {
    let mut sources = SourceList::new();
    let chunks = first_candidate(response)
        .and_then(|candidate| candidate.get("groundingMetadata"))
        .and_then(|metadata| metadata.get("groundingChunks"))
        .and_then(Value::as_array);
    for chunk in chunks.into_iter().flatten() {
        let Some(web) = chunk.get("web").and_then(Value::as_object) else {
            continue;
        };
        let Some(uri) = web.get("uri").and_then(Value::as_str) else {
            continue;
        };
        sources.push(uri, web.get("title").and_then(Value::as_str));
    }
    sources.into_sources()
}

pub fn is_safety_blocked(response: &Value) -> bool {
    let finish_reason = first_candidate(response)
        .and_then(|candidate| candidate.get("finishReason"))
        .and_then(Value::as_str);
    if finish_reason == Some("SAFETY") {
        return true;
    }
    response
        .get("promptFeedback")
        .and_then(|feedback| feedback.get("blockReason"))
        .and_then(Value::as_str)
        .map(|reason| !reason.is_empty() && reason != "BLOCK_REASON_UNSPECIFIED")
        .unwrap_or(false)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedImage {
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedWebImages {
    pub images: Vec<WebImageResult>,
    pub dropped: Vec<DroppedImage>,
}

/// Pulls the `images` array out of free text. Incomplete entries are
/// dropped and reported, never fatal.
pub fn parse_web_images(text: &str) -> Result<ParsedWebImages, QueryError> {
    let json_text = extract_json_object(text).ok_or_else(QueryError::no_json_found)?;
    let parsed: Value = serde_json::from_str(json_text).map_err(|_| {
        QueryError::malformed_json(
            "Failed to parse image search results. The model returned malformed JSON.",
        )
    })?;
    let Some(items) = parsed.get("images").and_then(Value::as_array) else {
        return Err(QueryError::malformed_json(
            "The model returned data in an unexpected format. Expected an object with an 'images' array.",
        ));
    };

    let mut images = Vec::new();
    let mut dropped = Vec::new();
    for (index, item) in items.iter().enumerate() {
        match web_image_from_value(item) {
            Ok(image) => images.push(image),
            Err(reason) => dropped.push(DroppedImage { index, reason }),
        }
    }
    Ok(ParsedWebImages { images, dropped })
}

fn web_image_from_value(item: &Value) -> Result<WebImageResult, String> {
    let Some(object) = item.as_object() else {
        return Err("entry is not an object".to_string());
    };
    let field = |key: &str| -> Result<String, String> {
        object
            .get(key)
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .ok_or_else(|| format!("missing or empty '{key}'"))
    };
    Ok(WebImageResult {
        image_url: field("imageUrl")?,
        source_url: field("sourceUrl")?,
        description: field("description")?,
    })
}

/// Wraps each prediction's base64 payload as a data URI, in response order.
pub fn generated_images(
    response: &Value,
    prompt: &str,
) -> Result<Vec<GeneratedImageResult>, QueryError> {
    let predictions = response
        .get("predictions")
        .or_else(|| response.get("generatedImages"))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let mut out = Vec::new();
    for row in predictions {
        let Some(obj) = row.as_object() else {
            continue;
        };
        let image = obj
            .get("image")
            .and_then(Value::as_object)
            .unwrap_or(obj);
        let Some(encoded) = image
            .get("bytesBase64Encoded")
            .or_else(|| image.get("imageBytes"))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
        else {
            continue;
        };
        let bytes = BASE64.decode(encoded.as_bytes()).map_err(|err| {
            QueryError::service_unavailable(
                GENERATION_UNAVAILABLE,
                &anyhow::Error::new(err).context("Imagen image base64 decode failed"),
            )
        })?;
        let mime_type = image
            .get("mimeType")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|value| value.starts_with("image/"))
            .unwrap_or(GENERATED_IMAGE_MIME);
        out.push(GeneratedImageResult {
            image_url: format!("data:{mime_type};base64,{encoded}"),
            prompt: prompt.to_string(),
            bytes,
        });
    }

    if out.is_empty() {
        return Err(QueryError::generation_failed());
    }
    Ok(out)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::{Arc, Mutex};

    use anyhow::bail;
    use base64::Engine as _;
    use scout_contracts::events::EventWriter;
    use scout_contracts::models::ModelRole;
    use scout_contracts::results::SearchMode;
    use serde_json::{json, Value};

    use super::{
        grounding_sources, parse_web_images, response_text, QueryService, BASE64,
    };
    use crate::config::ScoutConfig;
    use crate::error::QueryErrorKind;
    use crate::transport::{GeminiTransport, ModelTransport};

    /// Replays one canned reply per call and records what was sent.
    #[derive(Clone, Default)]
    pub(crate) struct StubTransport {
        replies: Arc<Mutex<Vec<anyhow::Result<Value>>>>,
        pub(crate) calls: Arc<Mutex<Vec<(String, String, Value)>>>,
    }

    impl StubTransport {
        pub(crate) fn replying(replies: Vec<anyhow::Result<Value>>) -> Self {
            let stub = Self::default();
            if let Ok(mut queue) = stub.replies.lock() {
                *queue = replies.into_iter().rev().collect();
            }
            stub
        }

        fn next(&self, method: &str, model: &str, payload: &Value) -> anyhow::Result<Value> {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push((method.to_string(), model.to_string(), payload.clone()));
            }
            let Ok(mut queue) = self.replies.lock() else {
                bail!("stub poisoned");
            };
            match queue.pop() {
                Some(reply) => reply,
                None => bail!("stub has no reply queued"),
            }
        }
    }

    impl ModelTransport for StubTransport {
        fn generate_content(&self, model: &str, payload: &Value) -> anyhow::Result<Value> {
            self.next("generateContent", model, payload)
        }

        fn predict(&self, model: &str, payload: &Value) -> anyhow::Result<Value> {
            self.next("predict", model, payload)
        }
    }

    pub(crate) fn text_reply(text: &str) -> Value {
        json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": text }] },
                "finishReason": "STOP",
            }]
        })
    }

    pub(crate) fn service_with(stub: &StubTransport) -> QueryService {
        QueryService::new(
            Box::new(stub.clone()),
            "gemini-2.5-flash",
            "imagen-3.0-generate-002",
        )
    }

    pub(crate) fn predictions_reply(count: usize) -> Value {
        let rows: Vec<Value> = (0..count)
            .map(|idx| {
                json!({
                    "bytesBase64Encoded": BASE64.encode(format!("jpeg-bytes-{idx}")),
                    "mimeType": "image/jpeg",
                })
            })
            .collect();
        json!({ "predictions": rows })
    }

    #[test]
    fn web_search_dedupes_sources_in_first_seen_order() -> anyhow::Result<()> {
        let stub = StubTransport::replying(vec![Ok(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Rust is " }, { "text": "a language." }] },
                "groundingMetadata": {
                    "groundingChunks": [
                        { "web": { "uri": "https://a.test", "title": "A" } },
                        { "web": { "uri": "https://b.test" } },
                        { "retrievedContext": { "uri": "gs://ignored" } },
                        { "web": { "uri": "https://a.test", "title": "A duplicate" } },
                        { "web": { "title": "no uri" } },
                        { "web": { "uri": "https://c.test", "title": "C" } },
                    ]
                }
            }]
        }))]);
        let service = service_with(&stub);

        let result = service.perform_web_search("rust")?;
        assert_eq!(result.summary, "Rust is a language.");
        let uris: Vec<&str> = result.sources.iter().map(|s| s.uri.as_str()).collect();
        assert_eq!(uris, vec!["https://a.test", "https://b.test", "https://c.test"]);
        assert_eq!(result.sources[0].title, "A");
        assert_eq!(result.sources[1].title, "https://b.test");

        let calls = stub.calls.lock().map(|calls| calls.clone()).unwrap_or_default();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "generateContent");
        assert_eq!(calls[0].1, "gemini-2.5-flash");
        assert_eq!(calls[0].2["tools"][0], json!({ "googleSearch": {} }));
        assert_eq!(
            calls[0].2["contents"][0]["parts"][0]["text"],
            json!("Search for this and provide a concise summary: \"rust\"")
        );
        Ok(())
    }

    #[test]
    fn web_search_with_sources_only_still_succeeds() -> anyhow::Result<()> {
        let stub = StubTransport::replying(vec![Ok(json!({
            "candidates": [{
                "content": { "parts": [] },
                "groundingMetadata": {
                    "groundingChunks": [{ "web": { "uri": "https://only.test" } }]
                }
            }]
        }))]);
        let result = service_with(&stub).perform_web_search("q")?;
        assert!(result.summary.is_empty());
        assert_eq!(result.sources.len(), 1);
        Ok(())
    }

    #[test]
    fn web_search_empty_summary_and_sources_is_empty_result() {
        let stub = StubTransport::replying(vec![Ok(json!({ "candidates": [] }))]);
        let err = service_with(&stub)
            .perform_web_search("q")
            .err()
            .map(|err| err.kind());
        assert_eq!(err, Some(QueryErrorKind::EmptyResult));
    }

    #[test]
    fn transport_failure_is_service_unavailable() {
        let stub = StubTransport::replying(vec![
            Err(anyhow::anyhow!("Gemini request failed (500): internal")),
            Err(anyhow::anyhow!("connection reset")),
            Err(anyhow::anyhow!("Imagen request failed (403): denied")),
        ]);
        let service = service_with(&stub);

        let web = service.perform_web_search("q").err();
        assert_eq!(web.as_ref().map(|e| e.kind()), Some(QueryErrorKind::ServiceUnavailable));
        assert!(web
            .map(|e| e.message().contains("internal"))
            .unwrap_or(false));

        let images = service.perform_web_image_search("q").err().map(|e| e.kind());
        assert_eq!(images, Some(QueryErrorKind::ServiceUnavailable));

        let generated = service.perform_image_generation("q").err().map(|e| e.kind());
        assert_eq!(generated, Some(QueryErrorKind::ServiceUnavailable));
    }

    #[test]
    fn unreachable_service_error_omits_api_key() -> anyhow::Result<()> {
        let config = ScoutConfig {
            api_key: "SECRET-KEY-123".to_string(),
            api_base: "http://127.0.0.1:1/v1beta".to_string(),
            text_model: None,
            image_model: None,
            request_timeout_s: 5.0,
        };
        let (service, _) =
            QueryService::from_config(Box::new(GeminiTransport::new(&config)?), &config)?;

        for mode in SearchMode::ALL {
            let Err(err) = service.perform(mode, "q") else {
                anyhow::bail!("{mode} should fail against a closed port");
            };
            assert_eq!(err.kind(), QueryErrorKind::ServiceUnavailable);
            assert!(!err.message().contains("SECRET-KEY-123"), "{}", err.message());
        }
        Ok(())
    }

    #[test]
    fn image_search_parses_json_wrapped_in_prose() -> anyhow::Result<()> {
        let text = "here is json: {\"images\":[{\"imageUrl\":\"https://img.test/1.jpg\",\"sourceUrl\":\"https://page.test/1\",\"description\":\"first\"}]} thanks";
        let stub = StubTransport::replying(vec![Ok(text_reply(text))]);
        let images = service_with(&stub).perform_web_image_search("aurora")?;
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].image_url, "https://img.test/1.jpg");
        assert_eq!(images[0].source_url, "https://page.test/1");
        assert_eq!(images[0].description, "first");
        Ok(())
    }

    #[test]
    fn image_search_keeps_fields_exactly_as_returned() -> anyhow::Result<()> {
        let text = r#"{"images":[
            {"imageUrl":" https://img.test/1.jpg ","sourceUrl":"https://page.test/1","description":"  padded desc  "},
            {"imageUrl":"https://img.test/2.jpg","sourceUrl":"https://page.test/2","description":"   "}
        ]}"#;
        let stub = StubTransport::replying(vec![Ok(text_reply(text))]);
        let images = service_with(&stub).perform_web_image_search("q")?;
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].image_url, " https://img.test/1.jpg ");
        assert_eq!(images[0].description, "  padded desc  ");
        assert_eq!(images[1].description, "   ");
        Ok(())
    }

    #[test]
    fn image_search_drops_incomplete_entries_and_logs_them() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let events_path = temp.path().join("events.jsonl");
        let text = r#"```json
{"images": [
  {"imageUrl": "https://img.test/1.jpg", "sourceUrl": "https://page.test/1", "description": "one"},
  {"imageUrl": "https://img.test/2.jpg", "sourceUrl": "https://page.test/2"},
  {"imageUrl": "", "sourceUrl": "https://page.test/3", "description": "blank"},
  "not an object",
  {"imageUrl": "https://img.test/5.jpg", "sourceUrl": "https://page.test/5", "description": "five"}
]}
```"#;
        let stub = StubTransport::replying(vec![Ok(text_reply(text))]);
        let service = service_with(&stub)
            .with_events(Some(EventWriter::new(&events_path, "session-1")));

        let images = service.perform_web_image_search("q")?;
        let descriptions: Vec<&str> = images.iter().map(|i| i.description.as_str()).collect();
        assert_eq!(descriptions, vec!["one", "five"]);

        let log = std::fs::read_to_string(&events_path)?;
        let events: Vec<Value> = log
            .lines()
            .map(serde_json::from_str)
            .collect::<Result<_, _>>()?;
        assert_eq!(events.len(), 3);
        assert_eq!(events[0]["type"], json!("image_search_item_dropped"));
        assert_eq!(events[0]["index"], json!(1));
        assert_eq!(events[0]["reason"], json!("missing or empty 'description'"));
        assert_eq!(events[1]["reason"], json!("missing or empty 'imageUrl'"));
        assert_eq!(events[2]["reason"], json!("entry is not an object"));
        Ok(())
    }

    #[test]
    fn image_search_error_kinds() {
        let cases = [
            (text_reply("I could not find any images."), QueryErrorKind::NoJsonFound),
            (text_reply("{\"images\": [ oops }"), QueryErrorKind::MalformedJson),
            (text_reply("{\"results\": []}"), QueryErrorKind::MalformedJson),
            (text_reply("{\"images\": \"none\"}"), QueryErrorKind::MalformedJson),
            (text_reply(""), QueryErrorKind::EmptyResult),
            (
                json!({ "candidates": [{ "finishReason": "SAFETY" }] }),
                QueryErrorKind::SafetyBlocked,
            ),
            (
                json!({ "promptFeedback": { "blockReason": "SAFETY" } }),
                QueryErrorKind::SafetyBlocked,
            ),
        ];
        for (reply, expected) in cases {
            let stub = StubTransport::replying(vec![Ok(reply.clone())]);
            let kind = service_with(&stub)
                .perform_web_image_search("q")
                .err()
                .map(|err| err.kind());
            assert_eq!(kind, Some(expected), "reply: {reply}");
        }
    }

    #[test]
    fn image_search_prompt_requests_grounded_json() -> anyhow::Result<()> {
        let stub = StubTransport::replying(vec![Ok(text_reply("{\"images\": []}"))]);
        let images = service_with(&stub).perform_web_image_search("red pandas")?;
        assert!(images.is_empty());
        let calls = stub.calls.lock().map(|calls| calls.clone()).unwrap_or_default();
        let prompt = calls[0].2["contents"][0]["parts"][0]["text"]
            .as_str()
            .unwrap_or_default()
            .to_string();
        assert!(prompt.contains("'red pandas'"));
        assert_eq!(calls[0].2["tools"][0], json!({ "googleSearch": {} }));
        Ok(())
    }

    #[test]
    fn image_generation_wraps_each_image_as_data_uri() -> anyhow::Result<()> {
        let stub = StubTransport::replying(vec![Ok(predictions_reply(4))]);
        let images = service_with(&stub).perform_image_generation("a city at dusk")?;
        assert_eq!(images.len(), 4);
        for (idx, image) in images.iter().enumerate() {
            assert_eq!(image.prompt, "a city at dusk");
            assert!(image.image_url.starts_with("data:image/jpeg;base64,"));
            assert_eq!(image.bytes, format!("jpeg-bytes-{idx}").into_bytes());
        }
        let mut urls: Vec<&str> = images.iter().map(|i| i.image_url.as_str()).collect();
        urls.dedup();
        assert_eq!(urls.len(), 4);

        let calls = stub.calls.lock().map(|calls| calls.clone()).unwrap_or_default();
        assert_eq!(calls[0].0, "predict");
        assert_eq!(calls[0].1, "imagen-3.0-generate-002");
        let parameters = &calls[0].2["parameters"];
        assert_eq!(parameters["sampleCount"], json!(4));
        assert_eq!(parameters["aspectRatio"], json!("16:9"));
        assert_eq!(parameters["outputOptions"]["mimeType"], json!("image/jpeg"));
        assert_eq!(calls[0].2["instances"][0]["prompt"], json!("a city at dusk"));
        Ok(())
    }

    #[test]
    fn image_generation_with_no_images_fails() {
        let replies = vec![
            Ok(predictions_reply(0)),
            Ok(json!({})),
            Ok(json!({ "predictions": [{ "raiFilteredReason": "filtered" }] })),
        ];
        let stub = StubTransport::replying(replies);
        let service = service_with(&stub);
        for _ in 0..3 {
            let kind = service
                .perform_image_generation("q")
                .err()
                .map(|err| err.kind());
            assert_eq!(kind, Some(QueryErrorKind::GenerationFailed));
        }
    }

    #[test]
    fn perform_dispatches_by_mode() -> anyhow::Result<()> {
        let stub = StubTransport::replying(vec![
            Ok(text_reply("summary")),
            Ok(text_reply("{\"images\": []}")),
            Ok(predictions_reply(1)),
        ]);
        let service = service_with(&stub);
        for mode in SearchMode::ALL {
            let result = service.perform(mode, "q")?;
            assert_eq!(result.mode(), mode);
        }
        Ok(())
    }

    #[test]
    fn from_config_falls_back_for_unknown_models() -> anyhow::Result<()> {
        let config = ScoutConfig {
            api_key: "k".to_string(),
            api_base: "https://example.test".to_string(),
            text_model: Some("gemini-2.5-pro".to_string()),
            image_model: Some("dall-e".to_string()),
            request_timeout_s: 30.0,
        };
        let (service, warnings) =
            QueryService::from_config(Box::new(StubTransport::default()), &config)?;
        assert_eq!(service.model(ModelRole::Text), "gemini-2.5-pro");
        assert_eq!(service.model(ModelRole::Image), "imagen-3.0-generate-002");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("'dall-e' is not a known image model"));
        Ok(())
    }

    #[test]
    fn helpers_tolerate_missing_structure() -> anyhow::Result<()> {
        assert_eq!(response_text(&json!({})), "");
        assert_eq!(
            response_text(&json!({
                "candidates": [{ "content": { "parts": [
                    { "text": "thinking...", "thought": true },
                    { "text": "answer" }
                ] } }]
            })),
            "answer"
        );
        assert!(grounding_sources(&json!({ "candidates": [{}] })).is_empty());
        let parsed = parse_web_images("{\"images\": []}")?;
        assert!(parsed.images.is_empty() && parsed.dropped.is_empty());
        Ok(())
    }
}
