//! Built-in node executors
//!
//! The handful of node types the engine ships with; everything else is
//! registered by integrations at startup.

mod http;
mod set;
mod start;

pub use http::HttpRequestExecutor;
pub use set::SetExecutor;
pub use start::StartExecutor;

use autoengine::ExecutorRegistry;
use std::sync::Arc;

/// Register all built-in executors.
///
/// `httpRequest` and `actionNode` are aliases for the same executor;
/// action nodes on the canvas are HTTP calls under the hood.
pub fn register_all(registry: &mut ExecutorRegistry) {
    registry.register("start", Arc::new(StartExecutor));
    registry.register("set", Arc::new(SetExecutor));

    let http = Arc::new(HttpRequestExecutor::new());
    registry.register("httpRequest", http.clone());
    registry.register("actionNode", http);
}
