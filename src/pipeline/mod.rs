pub mod aggregate;
pub mod dedup;
pub mod dispatch;
pub mod engine;

pub use aggregate::ResultAggregator;
pub use dedup::CandidateDeduplicator;
pub use dispatch::ValidationDispatcher;
pub use engine::{CancelToken, HistoryScanner};
