//! Interactive shell for GridLife: command plumbing, input translation, the
//! control loop, and the terminal front-end.

pub mod command;
pub mod control;
pub mod input;
pub mod terminal;

pub mod renderer {
    use anyhow::Result;
    use gridlife_core::{Automaton, PatternCatalog};

    use crate::{command::CommandQueue, control::ControlLoop};

    /// Shared context passed to renderer implementations.
    pub struct RendererContext<'a> {
        pub world: &'a mut dyn Automaton,
        pub catalog: &'a PatternCatalog,
        pub commands: &'a mut CommandQueue,
        pub control: &'a mut ControlLoop,
    }

    pub trait Renderer {
        /// Stable identifier describing the renderer implementation (e.g., "terminal").
        fn name(&self) -> &'static str;

        /// Launch the renderer; blocks until the session terminates.
        fn run(&self, ctx: RendererContext<'_>) -> Result<()>;
    }
}

pub use command::CommandQueue;
pub use control::{ControlLoop, LoopState};
pub use input::{InputTranslator, Key, KeyBindings, PointerButton, RawEvent};
pub use terminal::TerminalRenderer;
