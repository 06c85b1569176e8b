//! Creates a prompt based on the state of the line being entered

use colored::Colorize;

pub struct Prompt;

impl Prompt {
    /// Prompt for a fresh input
    pub fn get() -> String {
        format!("{} ", ">".purple())
    }

    /// Prompt shown while delimiters are still open
    pub fn continuation() -> String {
        format!("{} ", "...".purple())
    }
}
