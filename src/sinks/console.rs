//! Console sink - logs every action for testing and debugging

use anyhow::Result;
use tracing::{debug, info};

use crate::action::ActionEvent;
use crate::sinks::ActionSink;

/// ConsoleSink logs every routed action
///
/// Useful for trying gestures without an OS injector attached. Cursor
/// motion is logged at debug level so clicks and key presses stand out.
pub struct ConsoleSink {
    name: String,
    /// Execution counter for debugging
    execution_count: u64,
}

impl ConsoleSink {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            execution_count: 0,
        }
    }

    pub fn execution_count(&self) -> u64 {
        self.execution_count
    }
}

fn describe(action: &ActionEvent) -> String {
    match action {
        ActionEvent::MoveTo { x, y } | ActionEvent::DragMove { x, y } => {
            format!("({:.0}, {:.0})", x, y)
        }
        ActionEvent::ScrollBy { dy } => format!("{:+}", dy),
        ActionEvent::KeyHover { key: Some(key) } => key.to_string(),
        ActionEvent::KeyHover { key: None } => "(none)".to_string(),
        ActionEvent::KeyPress { key } => format!("{} [{}]", key, key.symbol()),
        _ => "(no params)".to_string(),
    }
}

impl ActionSink for ConsoleSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&mut self, action: &ActionEvent) -> Result<()> {
        self.execution_count += 1;
        let exec_num = self.execution_count;

        let line = format!(
            "🎮 [{}] Sink '{}' → {} {} [exec #{}]",
            chrono::Local::now().format("%H:%M:%S%.3f"),
            self.name,
            action.name(),
            describe(action),
            exec_num
        );

        match action {
            ActionEvent::MoveTo { .. } | ActionEvent::DragMove { .. } | ActionEvent::Pause => {
                debug!("{}", line)
            }
            _ => info!("{}", line),
        }

        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        info!(
            "🛑 ConsoleSink '{}' shutting down (executed {} actions)",
            self.name, self.execution_count
        );
        Ok(())
    }
}
