//! In-memory sink that records actions

use anyhow::Result;

use crate::action::ActionEvent;
use crate::sinks::ActionSink;

#[derive(Debug, Default)]
pub struct RecordingSink {
    actions: Vec<ActionEvent>,
    shut_down: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn actions(&self) -> &[ActionEvent] {
        &self.actions
    }

    /// Take recorded actions, leaving the buffer empty
    pub fn drain(&mut self) -> Vec<ActionEvent> {
        std::mem::take(&mut self.actions)
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }
}

impl ActionSink for RecordingSink {
    fn name(&self) -> &str {
        "recording"
    }

    fn execute(&mut self, action: &ActionEvent) -> Result<()> {
        if self.shut_down {
            anyhow::bail!("RecordingSink already shut down");
        }
        self.actions.push(*action);
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        self.shut_down = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::dispatch;

    #[test]
    fn test_records_in_order_and_drains() {
        let mut sink = RecordingSink::new();
        dispatch(&mut sink, &[ActionEvent::DragStart, ActionEvent::DragEnd]);
        assert_eq!(sink.actions(), &[ActionEvent::DragStart, ActionEvent::DragEnd]);
        assert_eq!(sink.drain().len(), 2);
        assert!(sink.actions().is_empty());
    }

    #[test]
    fn test_rejects_after_shutdown() {
        let mut sink = RecordingSink::new();
        sink.shutdown().unwrap();
        assert!(sink.is_shut_down());
        assert!(sink.execute(&ActionEvent::Pause).is_err());
    }
}
