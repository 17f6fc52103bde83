pub mod config;
pub mod controller;
pub mod error;
pub mod extract;
pub mod prompts;
pub mod service;
pub mod transport;

pub use config::ScoutConfig;
pub use controller::{QueryTicket, ResultView, SearchController};
pub use error::{QueryError, QueryErrorKind};
pub use service::QueryService;
pub use transport::{GeminiTransport, ModelTransport};
