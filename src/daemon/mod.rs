mod engine;
mod service;

pub use engine::{effective_interval, CycleOutcome, IntervalTicker, Ticker, UpdateEngine};
pub use service::run;
