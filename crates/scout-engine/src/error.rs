use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum QueryErrorKind {
    EmptyResult,
    SafetyBlocked,
    NoJsonFound,
    MalformedJson,
    GenerationFailed,
    ServiceUnavailable,
}

impl QueryErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            QueryErrorKind::EmptyResult => "empty_result",
            QueryErrorKind::SafetyBlocked => "safety_blocked",
            QueryErrorKind::NoJsonFound => "no_json_found",
            QueryErrorKind::MalformedJson => "malformed_json",
            QueryErrorKind::GenerationFailed => "generation_failed",
            QueryErrorKind::ServiceUnavailable => "service_unavailable",
        }
    }
}

/// Failure of a single query. `message` is what the user sees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryError {
    kind: QueryErrorKind,
    message: String,
}

impl QueryError {
    pub fn new(kind: QueryErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn empty_result(message: impl Into<String>) -> Self {
        Self::new(QueryErrorKind::EmptyResult, message)
    }

    pub fn safety_blocked() -> Self {
        Self::new(
            QueryErrorKind::SafetyBlocked,
            "Image search was blocked for safety reasons. Please try a different query.",
        )
    }

    pub fn no_json_found() -> Self {
        Self::new(
            QueryErrorKind::NoJsonFound,
            "Could not find a valid JSON object in the model's response.",
        )
    }

    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new(QueryErrorKind::MalformedJson, message)
    }

    pub fn generation_failed() -> Self {
        Self::new(
            QueryErrorKind::GenerationFailed,
            "Image generation failed. This could be due to safety restrictions. Please try a different or more specific prompt.",
        )
    }

    /// Wraps a transport or remote failure, keeping the cause chain visible.
    pub fn service_unavailable(summary: &str, err: &anyhow::Error) -> Self {
        Self::new(
            QueryErrorKind::ServiceUnavailable,
            format!("{summary} ({})", error_chain_text(err, 400)),
        )
    }

    pub fn kind(&self) -> QueryErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for QueryError {}

pub fn error_chain_text(err: &anyhow::Error, max_chars: usize) -> String {
    let mut parts = Vec::new();
    for cause in err.chain() {
        let text = cause.to_string();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            continue;
        }
        if parts
            .last()
            .map(|existing: &String| existing == trimmed)
            .unwrap_or(false)
        {
            continue;
        }
        parts.push(trimmed.to_string());
    }
    if parts.is_empty() {
        return truncate_text(&err.to_string(), max_chars);
    }
    truncate_text(&parts.join(" | caused by: "), max_chars)
}

pub fn truncate_text(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    value.chars().take(max_chars).collect::<String>() + "…"
}
