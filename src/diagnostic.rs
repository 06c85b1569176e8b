//! Classification of the compiler's stderr. Lines pointing into the generated
//! compilation unit are reduced to their message; warnings are told apart so they
//! can be hidden, and everything else passes through untouched.

use colored::Colorize;
use nom::{
    bytes::complete::tag, character::complete::digit1, combinator::map_res,
    sequence::terminated, IResult,
};

/// Marker the compiler puts in front of warning messages
pub const WARNING: &str = "Warning : ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    Error { line: usize, message: String },
    Warning { line: usize, message: String },
    /// Anything not attached to the compilation unit, such as the continuation of
    /// a multi-line message
    Other(String),
}

impl Diagnostic {
    pub fn is_warning(&self) -> bool {
        matches!(self, Diagnostic::Warning { .. })
    }

    /// Line of the compilation unit the message points at
    pub fn line(&self) -> Option<usize> {
        match self {
            Diagnostic::Error { line, .. } | Diagnostic::Warning { line, .. } => Some(*line),
            Diagnostic::Other(_) => None,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Diagnostic::Error { message, .. } | Diagnostic::Warning { message, .. } => message,
            Diagnostic::Other(raw) => raw,
        }
    }

    pub fn emit(&self) {
        match self {
            Diagnostic::Error { message, .. } => {
                eprintln!("{}: {}", "Repl".yellow().bold(), message)
            }
            Diagnostic::Warning { message, .. } => {
                eprintln!("{}: {}", "Repl".yellow(), message)
            }
            Diagnostic::Other(raw) => eprintln!("{raw}"),
        }
    }
}

/// `<line>: ` right after the file name
fn line_number(input: &str) -> IResult<&str, usize> {
    terminated(map_res(digit1, str::parse::<usize>), tag(": "))(input)
}

/// Find `<file>:` in a line, either at its start or right after a path separator
fn after_file<'l>(line: &'l str, file: &str) -> Option<&'l str> {
    let needle = format!("{file}:");

    line.match_indices(&needle).find_map(|(idx, _)| {
        let anchored = idx == 0 || line[..idx].ends_with(&['/', '\\'][..]);
        anchored.then(|| &line[idx + needle.len()..])
    })
}

fn classify_line(line: &str, file: &str) -> Diagnostic {
    let parsed = after_file(line, file).and_then(|rest| line_number(rest).ok());

    match parsed {
        Some((message, number)) => match message.split_once(WARNING) {
            Some((_, warning)) => Diagnostic::Warning {
                line: number,
                message: warning.to_string(),
            },
            None => Diagnostic::Error {
                line: number,
                message: message.to_string(),
            },
        },
        None => Diagnostic::Other(line.to_string()),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    /// Parse the compiler's stderr for the compilation unit named `file`
    pub fn parse(stderr: &str, file: &str) -> Diagnostics {
        Diagnostics(
            stderr
                .lines()
                .map(|l| l.trim_end_matches('\r'))
                .filter(|l| !l.is_empty())
                .map(|l| classify_line(l, file))
                .collect(),
        )
    }

    /// A failure that happened before the compiler could say anything
    pub fn from_message(msg: String) -> Diagnostics {
        Diagnostics(vec![Diagnostic::Other(msg)])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The diagnostics worth showing: warnings only make it when enabled
    pub fn visible(&self, warnings: bool) -> Vec<Diagnostic> {
        self.0
            .iter()
            .filter(|d| warnings || !d.is_warning())
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FILE: &str = "Repl.hx";

    #[test]
    fn t_error_loses_location() {
        let diags = Diagnostics::parse(
            "/tmp/.tmpAbc/Repl.hx:9: characters 1-2 : Unexpected ;\n",
            FILE,
        );

        assert_eq!(
            diags.iter().next(),
            Some(&Diagnostic::Error {
                line: 9,
                message: String::from("characters 1-2 : Unexpected ;"),
            })
        );
    }

    #[test]
    fn t_warning_keeps_text_after_marker() {
        let diags = Diagnostics::parse(
            "/tmp/x/Repl.hx:8: characters 1-6 : Warning : This code has no effect",
            FILE,
        );

        assert_eq!(
            diags.iter().next(),
            Some(&Diagnostic::Warning {
                line: 8,
                message: String::from("This code has no effect"),
            })
        );
    }

    #[test]
    fn t_unrelated_lines_pass_through() {
        let diags = Diagnostics::parse(
            "Error: Library hxnodejs is not installed\n\n/tmp/x/Other.hx:1: nope",
            FILE,
        );
        let messages: Vec<&str> = diags.iter().map(|d| d.message()).collect();

        assert_eq!(
            messages,
            ["Error: Library hxnodejs is not installed", "/tmp/x/Other.hx:1: nope"]
        );
    }

    #[test]
    fn t_file_name_must_be_anchored() {
        let diags = Diagnostics::parse("/tmp/x/MyRepl.hx:3: oops", FILE);

        assert!(matches!(diags.iter().next(), Some(Diagnostic::Other(_))));
    }

    #[test]
    fn t_windows_paths() {
        let diags = Diagnostics::parse("C:\\tmp\\Repl.hx:4: Unknown identifier : y\r\n", FILE);

        assert_eq!(diags.iter().next().map(|d| d.message()), Some("Unknown identifier : y"));
    }

    #[test]
    fn t_visible_hides_warnings() {
        let diags = Diagnostics::parse(
            "/t/Repl.hx:1: Warning : shadowed\n/t/Repl.hx:2: Unknown identifier : z",
            FILE,
        );

        assert_eq!(diags.visible(true).len(), 2);
        assert_eq!(
            diags.visible(false),
            vec![Diagnostic::Error {
                line: 2,
                message: String::from("Unknown identifier : z"),
            }]
        );
    }

    #[test]
    fn t_diagnostic_lines() {
        let diags = Diagnostics::parse(
            "/t/Repl.hx:11: Warning : shadowed\n/t/Repl.hx:12: Unknown identifier : z\nnote",
            FILE,
        );
        let lines: Vec<Option<usize>> = diags.iter().map(Diagnostic::line).collect();

        assert_eq!(lines, [Some(11), Some(12), None]);
    }

    #[test]
    fn t_line_number() {
        assert_eq!(line_number("12: rest"), Ok(("rest", 12)));
        assert!(line_number("x: rest").is_err());
    }
}
