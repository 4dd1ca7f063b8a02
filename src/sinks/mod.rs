//! Action sinks: where routed action events go
//!
//! The pipeline only produces abstract commands; a sink turns them into
//! something observable (log lines, JSON for an OS injector, a test buffer).

pub mod console;
pub mod json;
pub mod recording;

use anyhow::Result;
use tracing::warn;

use crate::action::ActionEvent;

pub use console::ConsoleSink;
pub use json::JsonSink;
pub use recording::RecordingSink;

pub trait ActionSink: Send {
    fn name(&self) -> &str;
    fn execute(&mut self, action: &ActionEvent) -> Result<()>;
    fn shutdown(&mut self) -> Result<()>;
}

/// Deliver a frame's actions in order
///
/// A failing action is logged and skipped; the rest are still delivered.
/// Returns how many actions the sink accepted.
pub fn dispatch(sink: &mut dyn ActionSink, actions: &[ActionEvent]) -> usize {
    let mut delivered = 0;
    for action in actions {
        match sink.execute(action) {
            Ok(()) => delivered += 1,
            Err(e) => warn!("⚠️  Sink '{}' failed on {}: {:#}", sink.name(), action.name(), e),
        }
    }
    delivered
}
