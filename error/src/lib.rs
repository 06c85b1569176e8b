//! The Error module contains helpful wrappers around the possible failures of a
//! REPL turn. They are shared by the assembler, the compiler adapter, the sandbox
//! and the interactive shell.

use std::fmt::{Display, Formatter};
use std::io;

use colored::Colorize;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum ErrKind {
    Hint,
    Toolchain,
    Compile,
    Extract,
    Eval,
    IO,
    Usage,
}

impl ErrKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrKind::Hint => "hint",
            ErrKind::Toolchain => "toolchain",
            ErrKind::Compile => "Repl",
            ErrKind::Extract => "extract",
            ErrKind::Eval => "Eval",
            ErrKind::IO => "i/o",
            ErrKind::Usage => "usage",
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Error {
    kind: ErrKind,
    msg: Option<String>,
    hints: Vec<Error>,
}

impl Error {
    pub fn new(kind: ErrKind) -> Error {
        Error {
            kind,
            msg: None,
            hints: vec![],
        }
    }

    pub fn hint() -> Error {
        Error::new(ErrKind::Hint)
    }

    pub fn with_msg(self, msg: String) -> Error {
        Error {
            msg: Some(msg),
            ..self
        }
    }

    // Add a hint to emit alongside the error
    pub fn with_hint(self, hint: Error) -> Error {
        let mut new_hints = self.hints;
        new_hints.push(hint);

        Error {
            hints: new_hints,
            ..self
        }
    }

    pub fn kind(&self) -> ErrKind {
        self.kind
    }

    pub fn msg(&self) -> Option<&str> {
        self.msg.as_deref()
    }

    pub fn hints(&self) -> &[Error] {
        &self.hints
    }

    fn emit_hint(&self) {
        if let Some(msg) = &self.msg {
            eprintln!("{}: {}", "hint".black().on_green(), msg);
        }
    }

    /// Print the error on stderr. Runtime and compiler errors keep the short
    /// `Eval:`/`Repl:` labels users are used to seeing in front of their messages
    pub fn emit(&self) {
        let label = match self.kind {
            ErrKind::Eval => self.kind.as_str().red().bold(),
            ErrKind::Compile => self.kind.as_str().yellow().bold(),
            _ => self.kind.as_str().black().on_yellow(),
        };

        match &self.msg {
            Some(msg) => eprintln!("{label}: {msg}"),
            None => eprintln!("{label}"),
        }

        self.hints.iter().for_each(|hint| hint.emit_hint());
    }

    pub fn exit(&self) -> ! {
        // The exit code depends on the kind of error
        std::process::exit(self.kind as i32);
    }
}

/// I/O errors keep their messages
impl From<io::Error> for Error {
    fn from(e: io::Error) -> Error {
        Error::new(ErrKind::IO).with_msg(e.to_string())
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.kind.as_str())?;
        if let Some(msg) = &self.msg {
            write!(f, ": {msg}")?;
        }

        Ok(())
    }
}

impl std::error::Error for Error {}
