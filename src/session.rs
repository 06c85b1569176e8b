//! REPL session state: the imports and statements accepted so far.
//!
//! A turn is staged by appending its source to the sequence it targets. It then
//! either stays there (commit) or is popped (rollback), which brings the session
//! back to exactly what it was before the turn started.

use classify::{Target, Turn};

/// Shown by the `$` listing when nothing was imported yet
pub const NO_IMPORTS: &str = "(no imports)";

/// Shown by the `$` listing when the history is empty
pub const NO_HISTORY: &str = "(no history)";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    imports: Vec<String>,
    statements: Vec<String>,
}

impl Session {
    pub fn new() -> Session {
        Session::default()
    }

    pub fn imports(&self) -> &[String] {
        &self.imports
    }

    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    fn sequence(&mut self, target: Target) -> &mut Vec<String> {
        match target {
            Target::Imports => &mut self.imports,
            Target::Statements => &mut self.statements,
        }
    }

    /// Tentatively append the turn's source. Turns without a target leave the
    /// session untouched
    pub fn stage(&mut self, turn: &Turn) {
        if let Some(target) = turn.target() {
            self.sequence(target).push(turn.source().to_string());
        }
    }

    /// Drop the staged entry of a failed turn
    pub fn rollback(&mut self, turn: &Turn) {
        if let Some(target) = turn.target() {
            let popped = self.sequence(target).pop();
            debug_assert_eq!(popped.as_deref(), Some(turn.source()));
        }
    }

    /// Keep the staged entry of a successful turn. Type queries are reported but
    /// never replayed, so they are dropped here as well
    pub fn commit(&mut self, turn: &Turn) {
        if turn.auto_discard() {
            self.rollback(turn);
        }
    }

    /// Forget everything
    pub fn clear(&mut self) {
        self.imports.clear();
        self.statements.clear();
    }

    /// The `$` listing: imports, then the history
    pub fn listing(&self) -> String {
        let imports = match self.imports.is_empty() {
            true => NO_IMPORTS.to_string(),
            false => self.imports.join("\n"),
        };
        let history = match self.statements.is_empty() {
            true => NO_HISTORY.to_string(),
            false => self.statements.join("\n"),
        };

        format!("{imports}\n{history}")
    }
}
