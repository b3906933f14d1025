//! Translation from raw pointer/key events to semantic control commands.
//!
//! The event vocabulary is backend-agnostic: the terminal front-end feeds it
//! from `crossterm`, the tests feed it directly. Translation is pure; no
//! state is retained between events.

use gridlife_core::ControlCommand;

/// Pointer button identifiers reported by the event source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Backend-agnostic key identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Escape,
}

/// Raw events delivered by the windowing/terminal event source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawEvent {
    PointerMoved {
        x: u32,
        y: u32,
    },
    PointerButtonDown {
        button: PointerButton,
        x: u32,
        y: u32,
    },
    PointerButtonUp {
        button: PointerButton,
        x: u32,
        y: u32,
    },
    KeyDown {
        key: Key,
        shift: bool,
    },
    WindowClose,
}

/// Key-to-command mapping. Configuration, not hardcoded magic: front-ends
/// may rebind any of these.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    pub pause: Key,
    pub randomize: Key,
    /// Live probability used by the randomize command.
    pub randomize_probability: f64,
    pub clear: Key,
    /// Speed-up fires on this key with Shift held (the unshifted key cap on
    /// common layouts), or on `speed_up_alt` for sources that deliver the
    /// shifted character as its own key.
    pub speed_up: Key,
    pub speed_up_alt: Key,
    pub speed_down: Key,
    /// Magnitude of one interval adjustment, in milliseconds.
    pub interval_step_ms: i64,
    pub load_pattern: Key,
    /// Catalog name stamped by the load-pattern key.
    pub pattern_name: String,
    pub quit: Key,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            pause: Key::Char(' '),
            randomize: Key::Char('r'),
            randomize_probability: 0.20,
            clear: Key::Char('c'),
            speed_up: Key::Char('='),
            speed_up_alt: Key::Char('+'),
            speed_down: Key::Char('-'),
            interval_step_ms: 2,
            load_pattern: Key::Char('g'),
            pattern_name: "glider".to_string(),
            quit: Key::Escape,
        }
    }
}

/// Stateless translator from raw events to zero-or-one semantic command.
#[derive(Debug, Clone)]
pub struct InputTranslator {
    bindings: KeyBindings,
    cell_size: u32,
}

impl InputTranslator {
    /// `cell_size` is the pixel-to-cell scale factor used for pointer
    /// mapping; the session configuration guarantees it is non-zero.
    #[must_use]
    pub fn new(cell_size: u32, bindings: KeyBindings) -> Self {
        assert!(cell_size > 0, "cell_size must be non-zero");
        Self {
            bindings,
            cell_size,
        }
    }

    #[must_use]
    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    /// Map one raw event to its command, if any. Pointer motion and button
    /// release map to nothing; cell coordinates use integer division, so a
    /// press anywhere inside a cell toggles that cell.
    #[must_use]
    pub fn translate(&self, event: &RawEvent) -> Option<ControlCommand> {
        match event {
            RawEvent::PointerButtonDown {
                button: PointerButton::Primary,
                x,
                y,
            } => Some(ControlCommand::ToggleCell {
                row: (y / self.cell_size) as usize,
                col: (x / self.cell_size) as usize,
            }),
            RawEvent::KeyDown { key, shift } => self.translate_key(*key, *shift),
            RawEvent::WindowClose => Some(ControlCommand::Quit),
            RawEvent::PointerMoved { .. }
            | RawEvent::PointerButtonDown { .. }
            | RawEvent::PointerButtonUp { .. } => None,
        }
    }

    fn translate_key(&self, key: Key, shift: bool) -> Option<ControlCommand> {
        let bindings = &self.bindings;
        if key == bindings.quit {
            Some(ControlCommand::Quit)
        } else if key == bindings.pause {
            Some(ControlCommand::TogglePause)
        } else if key == bindings.randomize {
            Some(ControlCommand::Randomize {
                probability: bindings.randomize_probability,
            })
        } else if key == bindings.clear {
            Some(ControlCommand::Clear)
        } else if (key == bindings.speed_up && shift) || key == bindings.speed_up_alt {
            Some(ControlCommand::AdjustInterval {
                delta_ms: -bindings.interval_step_ms,
            })
        } else if key == bindings.speed_down {
            Some(ControlCommand::AdjustInterval {
                delta_ms: bindings.interval_step_ms,
            })
        } else if key == bindings.load_pattern {
            Some(ControlCommand::LoadPattern {
                name: bindings.pattern_name.clone(),
            })
        } else {
            None
        }
    }
}
