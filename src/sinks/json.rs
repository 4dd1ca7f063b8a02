//! JSON Lines sink for piping actions into an OS-level injector

use anyhow::{Context, Result};
use std::io::Write;
use tracing::info;

use crate::action::ActionEvent;
use crate::sinks::ActionSink;

/// Writes one JSON object per action, newline-terminated and flushed
pub struct JsonSink<W: Write + Send> {
    writer: W,
    written: u64,
}

impl<W: Write + Send> JsonSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl JsonSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> ActionSink for JsonSink<W> {
    fn name(&self) -> &str {
        "json"
    }

    fn execute(&mut self, action: &ActionEvent) -> Result<()> {
        serde_json::to_writer(&mut self.writer, action)
            .with_context(|| format!("Failed to serialize {}", action.name()))?;
        self.writer
            .write_all(b"\n")
            .context("Failed to write action")?;
        // Downstream injectors read line by line
        self.writer.flush().context("Failed to flush action")?;
        self.written += 1;
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        self.writer.flush().context("Failed to flush on shutdown")?;
        info!("🛑 JsonSink shutting down (wrote {} actions)", self.written);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::Key;
    use serde_json::{json, Value};

    #[test]
    fn test_writes_one_line_per_action() {
        let mut sink = JsonSink::new(Vec::new());
        sink.execute(&ActionEvent::MoveTo { x: 12.5, y: 3.0 }).unwrap();
        sink.execute(&ActionEvent::KeyPress { key: Key::Letter('A') }).unwrap();
        sink.execute(&ActionEvent::ScrollBy { dy: -2 }).unwrap();
        sink.shutdown().unwrap();

        let out = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<Value> = out
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(
            lines,
            vec![
                json!({"action": "move_to", "x": 12.5, "y": 3.0}),
                json!({"action": "key_press", "key": "A"}),
                json!({"action": "scroll_by", "dy": -2}),
            ]
        );
    }

    #[test]
    fn test_output_parses_back_into_actions() {
        let mut sink = JsonSink::new(Vec::new());
        let actions = [ActionEvent::KeyHover { key: None }, ActionEvent::DragEnd];
        for a in &actions {
            sink.execute(a).unwrap();
        }
        let out = String::from_utf8(sink.into_inner()).unwrap();
        let parsed: Vec<ActionEvent> = out
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(parsed, actions);
    }
}
