//! Stateful runtime: per-entity graph cache, fan-in dispatcher, timeout
//! recovery, and the round coordinator tying them together.

pub mod cache;
pub mod config;
pub mod dispatcher;
pub mod engine;
pub mod monitor;

pub use cache::{GraphCache, StatefulGraphInstance};
pub use config::RuntimeConfig;
pub use dispatcher::{Dispatcher, Phase, TransformationState};
pub use engine::{GateEngine, RoundOutcome, SyncJob};
pub use monitor::TimeoutMonitor;
