//! The REPL module implements the interactive prompt of hxrepl. Lines starting
//! with a dot are shell commands, everything else goes through the context.

mod prompt;
use prompt::Prompt;

use std::fs;
use std::path::{Path, PathBuf};

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use hxrepl::{has_unclosed_delimiters, log, Compiler, Context, Evaluator, Outcome, Session};
use hxrepl::{ErrKind, Error, HaxeContext};

const HELP: &str = "\
.break    Drop the lines entered so far
.clear    Reset the session
.exit     Exit the REPL
.help     Print this help message
.load     Evaluate the lines of a file
.save     Save the imports and statements of the session to a file
$         List the imports and statements of the session";

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Help,
    Exit,
    Clear,
    Break,
    Load(PathBuf),
    Save(PathBuf),
}

impl Command {
    /// Recognize a shell command. Inputs such as `.5` are left to the compiler
    pub fn parse(input: &str) -> Result<Option<Command>, Error> {
        let input = input.trim();
        let keyword = match input.strip_prefix('.') {
            Some(rest) if rest.starts_with(|c: char| c.is_ascii_alphabetic()) => rest,
            _ => return Ok(None),
        };

        let (keyword, operand) = match keyword.split_once(char::is_whitespace) {
            Some((keyword, operand)) => (keyword, operand.trim()),
            None => (keyword, ""),
        };

        let file = |name: &str| match operand.is_empty() {
            true => Err(Error::new(ErrKind::Usage).with_msg(format!("usage: .{name} <file>"))),
            false => Ok(PathBuf::from(operand)),
        };

        let command = match keyword {
            "help" => Command::Help,
            "exit" => Command::Exit,
            "clear" => Command::Clear,
            "break" => Command::Break,
            "load" => Command::Load(file("load")?),
            "save" => Command::Save(file("save")?),
            _ => {
                return Err(Error::new(ErrKind::Usage)
                    .with_msg(format!("invalid REPL keyword `.{keyword}`"))
                    .with_hint(Error::hint().with_msg(String::from("try `.help`"))))
            }
        };

        Ok(Some(command))
    }
}

/// Split a file into inputs, joining lines while delimiters are open. Each input
/// comes with the line it starts on
pub fn inputs(source: &str) -> Vec<(usize, String)> {
    let mut inputs = vec![];
    let mut buffer = String::new();
    let mut start = 0;

    for (idx, line) in source.lines().enumerate() {
        let trimmed = line.trim();
        if buffer.is_empty() && (trimmed.is_empty() || trimmed.starts_with("//")) {
            continue;
        }

        if buffer.is_empty() {
            start = idx + 1;
        } else {
            buffer.push('\n');
        }
        buffer.push_str(line);

        if !has_unclosed_delimiters(&buffer) {
            inputs.push((start, std::mem::take(&mut buffer)));
        }
    }

    if !buffer.trim().is_empty() {
        inputs.push((start, buffer));
    }

    inputs
}

/// Evaluate a file, stopping at the first input that fails
pub fn load<C: Compiler, E: Evaluator>(ctx: &mut Context<C, E>, path: &Path) -> Result<(), Error> {
    let source = fs::read_to_string(path).map_err(|e| {
        Error::new(ErrKind::IO).with_msg(format!("cannot read `{}`: {e}", path.display()))
    })?;

    for (line, input) in inputs(&source) {
        let result = ctx.eval(&input);
        result.emit();

        if let Outcome::Failed(_) = result.outcome {
            return Err(Error::hint().with_msg(format!(
                "stopped loading `{}` at line {line}",
                path.display()
            )));
        }
    }

    Ok(())
}

/// Write the imports and statements of a session, one per line
pub fn save(session: &Session, path: &Path) -> Result<(), Error> {
    let mut content = String::new();
    for entry in session.imports().iter().chain(session.statements()) {
        content.push_str(entry);
        content.push('\n');
    }

    fs::write(path, content).map_err(|e| {
        Error::new(ErrKind::IO).with_msg(format!("cannot write `{}`: {e}", path.display()))
    })
}

pub struct Repl {
    ctx: HaxeContext,
    reader: DefaultEditor,
    pending: String,
}

impl Repl {
    pub fn new(ctx: HaxeContext) -> Result<Repl, ReadlineError> {
        Ok(Repl {
            ctx,
            reader: DefaultEditor::new()?,
            pending: String::new(),
        })
    }

    /// Run a shell command. Returns false once the REPL should stop
    fn command(&mut self, command: Command) -> bool {
        log!("running {:?}", command);

        match command {
            Command::Help => println!("{HELP}"),
            Command::Exit => return false,
            Command::Clear => self.ctx.clear(),
            Command::Break => self.pending.clear(),
            Command::Load(path) => {
                if let Err(e) = load(&mut self.ctx, &path) {
                    e.emit()
                }
            }
            Command::Save(path) => match save(self.ctx.session(), &path) {
                Ok(()) => println!("session saved to {}", path.display()),
                Err(e) => e.emit(),
            },
        }

        true
    }

    fn prompt(&self) -> String {
        match self.pending.is_empty() {
            true => Prompt::get(),
            false => Prompt::continuation(),
        }
    }

    /// Launch the REPL
    pub fn launch(mut self) -> anyhow::Result<()> {
        loop {
            let line = match self.reader.readline(&self.prompt()) {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) => {
                    self.pending.clear();
                    continue;
                }
                Err(ReadlineError::Eof) => break,
                Err(e) => return Err(e.into()),
            };

            // Commands are only recognized on a fresh line, `.break` excepted
            let command = match self.pending.is_empty() {
                true => Command::parse(&line),
                false => Ok((line.trim() == ".break").then_some(Command::Break)),
            };

            match command {
                Ok(Some(command)) => {
                    self.reader.add_history_entry(line.as_str())?;
                    match self.command(command) {
                        true => continue,
                        false => break,
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    e.emit();
                    continue;
                }
            }

            if !self.pending.is_empty() {
                self.pending.push('\n');
            }
            self.pending.push_str(&line);

            if has_unclosed_delimiters(&self.pending) {
                continue;
            }

            let input = std::mem::take(&mut self.pending);
            if !input.trim().is_empty() {
                self.reader.add_history_entry(input.as_str())?;
            }

            self.ctx.eval(&input).emit();
        }

        Ok(())
    }
}
