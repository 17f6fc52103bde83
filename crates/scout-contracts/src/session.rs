use crate::results::{QueryResult, SearchMode};

/// Outcome of the most recent query. Exactly one variant is live at a time,
/// so a result can never coexist with a loading flag or an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Initial,
    Loading {
        query: String,
        mode: SearchMode,
    },
    Succeeded {
        query: String,
        mode: SearchMode,
        result: QueryResult,
    },
    Failed {
        query: String,
        mode: SearchMode,
        message: String,
    },
}

impl SessionState {
    pub fn is_initial(&self) -> bool {
        matches!(self, SessionState::Initial)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::Loading { .. })
    }

    pub fn last_query(&self) -> Option<&str> {
        match self {
            SessionState::Initial => None,
            SessionState::Loading { query, .. }
            | SessionState::Succeeded { query, .. }
            | SessionState::Failed { query, .. } => Some(query.as_str()),
        }
    }

    pub fn last_mode(&self) -> Option<SearchMode> {
        match self {
            SessionState::Initial => None,
            SessionState::Loading { mode, .. }
            | SessionState::Succeeded { mode, .. }
            | SessionState::Failed { mode, .. } => Some(*mode),
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            SessionState::Failed { message, .. } => Some(message.as_str()),
            _ => None,
        }
    }

    pub fn result(&self) -> Option<&QueryResult> {
        match self {
            SessionState::Succeeded { result, .. } => Some(result),
            _ => None,
        }
    }

    pub fn status_label(&self) -> &'static str {
        match self {
            SessionState::Initial => "idle",
            SessionState::Loading { .. } => "loading",
            SessionState::Succeeded { .. } => "succeeded",
            SessionState::Failed { .. } => "failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::results::{QueryResult, SearchMode, WebSearchResult};

    use super::SessionState;

    #[test]
    fn initial_state_has_no_query_or_outcome() {
        let state = SessionState::default();
        assert!(state.is_initial());
        assert!(!state.is_loading());
        assert_eq!(state.last_query(), None);
        assert_eq!(state.last_mode(), None);
        assert_eq!(state.status_label(), "idle");
    }

    #[test]
    fn accessors_follow_the_live_variant() {
        let loading = SessionState::Loading {
            query: "rust".to_string(),
            mode: SearchMode::Web,
        };
        assert!(loading.is_loading());
        assert!(loading.result().is_none());
        assert!(loading.error().is_none());

        let failed = SessionState::Failed {
            query: "rust".to_string(),
            mode: SearchMode::WebImage,
            message: "boom".to_string(),
        };
        assert_eq!(failed.error(), Some("boom"));
        assert_eq!(failed.last_mode(), Some(SearchMode::WebImage));
        assert!(failed.result().is_none());

        let done = SessionState::Succeeded {
            query: "rust".to_string(),
            mode: SearchMode::Web,
            result: QueryResult::Web(WebSearchResult {
                summary: "A language.".to_string(),
                sources: Vec::new(),
            }),
        };
        assert_eq!(done.last_query(), Some("rust"));
        assert!(done.error().is_none());
        assert_eq!(done.result().map(QueryResult::mode), Some(SearchMode::Web));
    }
}
