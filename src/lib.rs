pub mod client;
pub mod collector;
pub mod config;
pub mod corpus;
pub mod driver;
pub mod error;
pub mod overlay;
pub mod report;
pub mod request;
pub mod telemetry;

pub use client::{Dispatch, HttpClient, ReqwestClient};
pub use collector::{LatencyStats, OutcomeKind, RequestOutcome, ResultCollector, RunResult};
pub use config::{ConfigResolver, Properties, ReportFormat, RunConfig};
pub use corpus::{Corpus, CorpusLoader};
pub use driver::{iteration_budget, LoadDriver, TermCursor};
pub use error::{LoadError, Result};
pub use overlay::{ParamPair, QueryParamOverlay};
pub use request::{RequestBuilder, RequestSpec};
