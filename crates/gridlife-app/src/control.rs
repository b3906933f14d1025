//! Timing and lifecycle owner for an interactive session.

use std::time::Duration;

use gridlife_core::{Automaton, ControlCommand, PatternCatalog, apply_world_command};
use tracing::debug;

use crate::command::CommandQueue;

/// Lifecycle states of the interactive loop. `Terminated` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopState {
    #[default]
    Running,
    Paused,
    Terminated,
}

/// The top-level driver state: pause flag, tick cadence, and liveness.
///
/// Per tick the owner calls [`ControlLoop::tick`] (drain commands in arrival
/// order, then advance the world once if running), draws the current grid,
/// and sleeps [`ControlLoop::tick_interval`] — so the effective frame rate
/// is capped at `max(tick_interval, render_cost)`.
#[derive(Debug)]
pub struct ControlLoop {
    state: LoopState,
    tick_interval_ms: u64,
}

impl ControlLoop {
    #[must_use]
    pub fn new(tick_interval_ms: u64) -> Self {
        Self {
            state: LoopState::Running,
            tick_interval_ms,
        }
    }

    #[must_use]
    pub const fn state(&self) -> LoopState {
        self.state
    }

    #[must_use]
    pub const fn is_terminated(&self) -> bool {
        matches!(self.state, LoopState::Terminated)
    }

    #[must_use]
    pub const fn tick_interval_ms(&self) -> u64 {
        self.tick_interval_ms
    }

    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Apply one command. Pause, interval, and quit mutate loop state here;
    /// everything else is forwarded to the world. Editing commands are
    /// honored while paused, so a configuration can be set up before
    /// resuming. Commands arriving after termination are discarded.
    pub fn apply(
        &mut self,
        command: ControlCommand,
        world: &mut dyn Automaton,
        catalog: &PatternCatalog,
    ) {
        if self.is_terminated() {
            debug!(?command, "loop already terminated; discarding command");
            return;
        }
        match command {
            ControlCommand::TogglePause => {
                self.state = match self.state {
                    LoopState::Running => LoopState::Paused,
                    LoopState::Paused => LoopState::Running,
                    LoopState::Terminated => LoopState::Terminated,
                };
                debug!(state = ?self.state, "pause toggled");
            }
            ControlCommand::AdjustInterval { delta_ms } => {
                self.tick_interval_ms = self.tick_interval_ms.saturating_add_signed(delta_ms);
                debug!(interval_ms = self.tick_interval_ms, "tick interval adjusted");
            }
            ControlCommand::Quit => {
                self.state = LoopState::Terminated;
            }
            world_command => {
                apply_world_command(world, catalog, &world_command);
            }
        }
    }

    /// Run one tick of the protocol: drain pending commands in arrival
    /// order, then step the world exactly once if the loop is running.
    ///
    /// Returns `false` once the loop has terminated; rendering and the
    /// inter-tick delay belong to the caller.
    pub fn tick(
        &mut self,
        commands: &mut CommandQueue,
        world: &mut dyn Automaton,
        catalog: &PatternCatalog,
    ) -> bool {
        for command in commands.drain() {
            self.apply(command, world, catalog);
        }
        if self.state == LoopState::Running {
            world.step();
        }
        !self.is_terminated()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridlife_core::{Generation, LifeWorld};

    fn world() -> LifeWorld {
        LifeWorld::new(8, 8, Some(3)).expect("world")
    }

    #[test]
    fn pause_toggles_between_the_live_states() {
        let mut control = ControlLoop::new(100);
        let mut world = world();
        let catalog = PatternCatalog::empty();

        assert_eq!(control.state(), LoopState::Running);
        control.apply(ControlCommand::TogglePause, &mut world, &catalog);
        assert_eq!(control.state(), LoopState::Paused);
        control.apply(ControlCommand::TogglePause, &mut world, &catalog);
        assert_eq!(control.state(), LoopState::Running);
    }

    #[test]
    fn quit_terminates_from_either_live_state() {
        let catalog = PatternCatalog::empty();
        for pause_first in [false, true] {
            let mut control = ControlLoop::new(100);
            let mut world = world();
            if pause_first {
                control.apply(ControlCommand::TogglePause, &mut world, &catalog);
            }
            control.apply(ControlCommand::Quit, &mut world, &catalog);
            assert_eq!(control.state(), LoopState::Terminated);
        }
    }

    #[test]
    fn commands_after_termination_are_discarded() {
        let mut control = ControlLoop::new(100);
        let mut world = world();
        let catalog = PatternCatalog::empty();

        control.apply(ControlCommand::Quit, &mut world, &catalog);
        control.apply(
            ControlCommand::ToggleCell { row: 1, col: 1 },
            &mut world,
            &catalog,
        );
        assert_eq!(world.grid().count_live(), 0);
        assert_eq!(control.state(), LoopState::Terminated);
    }

    #[test]
    fn interval_floors_at_zero() {
        let mut control = ControlLoop::new(3);
        let mut world = world();
        let catalog = PatternCatalog::empty();

        control.apply(
            ControlCommand::AdjustInterval { delta_ms: -2 },
            &mut world,
            &catalog,
        );
        assert_eq!(control.tick_interval_ms(), 1);
        control.apply(
            ControlCommand::AdjustInterval { delta_ms: -2 },
            &mut world,
            &catalog,
        );
        assert_eq!(control.tick_interval_ms(), 0);
        control.apply(
            ControlCommand::AdjustInterval { delta_ms: -2 },
            &mut world,
            &catalog,
        );
        assert_eq!(control.tick_interval_ms(), 0);
        control.apply(
            ControlCommand::AdjustInterval { delta_ms: 2 },
            &mut world,
            &catalog,
        );
        assert_eq!(control.tick_interval_ms(), 2);
    }

    #[test]
    fn tick_steps_only_while_running() {
        let mut control = ControlLoop::new(0);
        let mut world = world();
        let catalog = PatternCatalog::empty();
        let mut commands = CommandQueue::new();

        assert!(control.tick(&mut commands, &mut world, &catalog));
        assert_eq!(world.generation(), Generation(1));

        commands.submit(ControlCommand::TogglePause);
        assert!(control.tick(&mut commands, &mut world, &catalog));
        assert_eq!(world.generation(), Generation(1), "paused tick must not step");

        commands.submit(ControlCommand::TogglePause);
        assert!(control.tick(&mut commands, &mut world, &catalog));
        assert_eq!(world.generation(), Generation(2));
    }

    #[test]
    fn editing_while_paused_is_permitted() {
        let mut control = ControlLoop::new(0);
        let mut world = world();
        let catalog = PatternCatalog::empty();
        let mut commands = CommandQueue::new();

        commands.submit(ControlCommand::TogglePause);
        commands.submit(ControlCommand::ToggleCell { row: 2, col: 2 });
        commands.submit(ControlCommand::Randomize { probability: 1.0 });
        assert!(control.tick(&mut commands, &mut world, &catalog));

        assert_eq!(control.state(), LoopState::Paused);
        assert_eq!(world.grid().count_live(), 64);
    }

    #[test]
    fn quit_mid_drain_stops_the_tick_without_stepping() {
        let mut control = ControlLoop::new(0);
        let mut world = world();
        let catalog = PatternCatalog::empty();
        let mut commands = CommandQueue::new();

        commands.submit(ControlCommand::Quit);
        commands.submit(ControlCommand::Randomize { probability: 1.0 });
        assert!(!control.tick(&mut commands, &mut world, &catalog));
        assert_eq!(world.generation(), Generation::zero());
        assert_eq!(world.grid().count_live(), 0);
    }
}
