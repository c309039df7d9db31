//! Observability
//!
//! Diagnostic logging, Prometheus metrics, and the JSONL presentation frame
//! stream consumed by renderers.

pub mod events;
pub mod logging;
pub mod metrics;

pub use events::{Event, EventEmitter};
pub use logging::{LogFormat, init_logging};
pub use metrics::init_metrics;
