//! Pending-command plumbing between input translation and the control loop.

use std::collections::VecDeque;

use gridlife_core::ControlCommand;
use tracing::warn;

/// Default bound on commands held between two ticks.
pub const DEFAULT_COMMAND_CAPACITY: usize = 64;

/// Bounded FIFO of control commands awaiting the next tick.
///
/// The session is single-threaded by construction, so this is a plain queue
/// rather than a channel; the submit contract still matches a bounded bus:
/// commands past capacity are dropped with a warning instead of blocking the
/// event source.
#[derive(Debug)]
pub struct CommandQueue {
    pending: VecDeque<ControlCommand>,
    capacity: usize,
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_COMMAND_CAPACITY)
    }
}

impl CommandQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pending: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Enqueue a command, preserving arrival order. Returns `false` and
    /// drops the command when the queue is full.
    pub fn submit(&mut self, command: ControlCommand) -> bool {
        if self.pending.len() >= self.capacity {
            warn!(?command, "command queue full; dropping command");
            return false;
        }
        self.pending.push_back(command);
        true
    }

    /// Drain every pending command in arrival order.
    pub fn drain(&mut self) -> impl Iterator<Item = ControlCommand> + '_ {
        self.pending.drain(..)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_preserves_arrival_order() {
        let mut queue = CommandQueue::new();
        assert!(queue.submit(ControlCommand::Clear));
        assert!(queue.submit(ControlCommand::LoadPattern {
            name: "glider".into(),
        }));
        let drained: Vec<_> = queue.drain().collect();
        assert_eq!(
            drained,
            vec![
                ControlCommand::Clear,
                ControlCommand::LoadPattern {
                    name: "glider".into(),
                },
            ],
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn overflow_drops_instead_of_blocking() {
        let mut queue = CommandQueue::with_capacity(2);
        assert!(queue.submit(ControlCommand::TogglePause));
        assert!(queue.submit(ControlCommand::TogglePause));
        assert!(!queue.submit(ControlCommand::Quit));
        assert_eq!(queue.len(), 2);
    }
}
