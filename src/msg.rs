use crossterm::event::KeyEvent;

use crate::scaffold::ScaffoldReport;

/// All possible messages that drive state transitions.
#[derive(Debug)]
pub enum Msg {
    // -- Input events (raw)
    Key(KeyEvent),
    Resize,

    // -- Scaffolding
    /// Sent once by the scaffold worker; the error is already rendered for display.
    ScaffoldFinished(Result<ScaffoldReport, String>),

    // -- System
    Tick,
}
