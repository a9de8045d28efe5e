//! Request instrumentation and process-metric collection.

pub mod collector;
pub mod http;
