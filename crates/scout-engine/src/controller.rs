use scout_contracts::events::{EventKind, EventWriter};
use scout_contracts::results::{
    GeneratedImageResult, QueryResult, SearchMode, WebImageResult, WebSearchResult,
};
use scout_contracts::session::SessionState;
use serde_json::{json, Value};

use crate::error::QueryError;
use crate::service::QueryService;

/// Handle for one submitted query. A ticket completes at most once, and
/// only while it is the controller's outstanding query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTicket {
    seq: u64,
    query: String,
    mode: SearchMode,
}

impl QueryTicket {
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultView<'a> {
    Web {
        query: &'a str,
        result: &'a WebSearchResult,
    },
    WebImages {
        query: &'a str,
        results: &'a [WebImageResult],
    },
    Generated {
        query: &'a str,
        results: &'a [GeneratedImageResult],
    },
}

/// Owns the selected mode and the outcome of the last query.
#[derive(Debug, Default)]
pub struct SearchController {
    mode: SearchMode,
    state: SessionState,
    next_seq: u64,
    in_flight: Option<u64>,
    events: Option<EventWriter>,
}

impl SearchController {
    pub fn new(mode: SearchMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn with_events(mut self, events: Option<EventWriter>) -> Self {
        self.events = events;
        self
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Switches the mode for the next submission; the current outcome stays.
    pub fn set_mode(&mut self, mode: SearchMode) {
        if mode == self.mode {
            return;
        }
        self.record(
            EventKind::ModeChanged,
            json!({ "from": self.mode.as_str(), "to": mode.as_str() }),
        );
        self.mode = mode;
    }

    /// Input should be disabled while a query is outstanding.
    pub fn can_submit(&self) -> bool {
        !self.state.is_loading()
    }

    /// Starts a query in the current mode. Blank input and submissions
    /// while another query is loading are ignored.
    pub fn begin(&mut self, raw_query: &str) -> Option<QueryTicket> {
        let query = raw_query.trim();
        if query.is_empty() || !self.can_submit() {
            return None;
        }
        self.next_seq += 1;
        let ticket = QueryTicket {
            seq: self.next_seq,
            query: query.to_string(),
            mode: self.mode,
        };
        self.in_flight = Some(ticket.seq);
        self.state = SessionState::Loading {
            query: ticket.query.clone(),
            mode: ticket.mode,
        };
        self.record(
            EventKind::QueryStarted,
            json!({ "seq": ticket.seq, "mode": ticket.mode.as_str(), "query": ticket.query }),
        );
        Some(ticket)
    }

    /// Records the outcome of `ticket`. Returns false when the ticket is not
    /// the outstanding one (already finished, or from an earlier query),
    /// leaving state untouched.
    pub fn finish(
        &mut self,
        ticket: &QueryTicket,
        outcome: Result<QueryResult, QueryError>,
    ) -> bool {
        if self.in_flight != Some(ticket.seq) {
            return false;
        }
        self.in_flight = None;
        self.state = match outcome {
            Ok(result) => {
                self.record(
                    EventKind::QuerySucceeded,
                    json!({
                        "seq": ticket.seq,
                        "mode": ticket.mode.as_str(),
                        "items": result.item_count(),
                    }),
                );
                SessionState::Succeeded {
                    query: ticket.query.clone(),
                    mode: ticket.mode,
                    result,
                }
            }
            Err(err) => {
                self.record(
                    EventKind::QueryFailed,
                    json!({
                        "seq": ticket.seq,
                        "mode": ticket.mode.as_str(),
                        "error_kind": err.kind().as_str(),
                        "message": err.message(),
                    }),
                );
                SessionState::Failed {
                    query: ticket.query.clone(),
                    mode: ticket.mode,
                    message: err.to_string(),
                }
            }
        };
        true
    }

    /// Runs one query to completion against `service`.
    pub fn submit(&mut self, service: &QueryService, raw_query: &str) -> &SessionState {
        let Some(ticket) = self.begin(raw_query) else {
            return &self.state;
        };
        let outcome = service.perform(ticket.mode(), ticket.query());
        self.finish(&ticket, outcome);
        &self.state
    }

    /// The view to render, if any. Requires a finished, successful query
    /// whose result matches the mode it was submitted in.
    pub fn visible_view(&self) -> Option<ResultView<'_>> {
        let SessionState::Succeeded {
            query,
            mode,
            result,
        } = &self.state
        else {
            return None;
        };
        if result.mode() != *mode {
            return None;
        }
        Some(match result {
            QueryResult::Web(result) => ResultView::Web { query, result },
            QueryResult::WebImages(results) => ResultView::WebImages { query, results },
            QueryResult::Generated(results) => ResultView::Generated { query, results },
        })
    }

    /// Images from the last successful generation, for export.
    pub fn generated_images(&self) -> Option<&[GeneratedImageResult]> {
        match self.visible_view()? {
            ResultView::Generated { results, .. } => Some(results),
            _ => None,
        }
    }

    fn record(&self, kind: EventKind, fields: Value) {
        if let Some(events) = self.events.as_ref() {
            events.record(kind, fields);
        }
    }
}
