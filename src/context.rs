//! The `Context` drives one REPL session. It owns the accumulated [`Session`] and
//! runs every turn through the same sequence: stage the input, assemble the
//! compilation unit, compile it, cut out the newest code and evaluate it. A turn
//! failing anywhere along the way is rolled back, so between two turns the
//! session always compiles.

use std::fmt::{Display, Formatter};

use classify::{Target, Turn, TurnKind};
use error::{ErrKind, Error};

use crate::compiler::Compiler;
use crate::diagnostic::Diagnostic;
use crate::log;
use crate::sandbox::Evaluator;
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Assembling,
    Compiling,
    CompileFailed,
    CompileSucceeded,
    Evaluating,
    EvalFailed,
    EvalSucceeded,
}

impl Display for Phase {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Assembling => "assembling",
            Phase::Compiling => "compiling",
            Phase::CompileFailed => "compile failed",
            Phase::CompileSucceeded => "compile succeeded",
            Phase::Evaluating => "evaluating",
            Phase::EvalFailed => "eval failed",
            Phase::EvalSucceeded => "eval succeeded",
        };

        write!(f, "{name}")
    }
}

impl Phase {
    /// Can the machine move from this phase to `next`
    pub fn leads_to(self, next: Phase) -> bool {
        use Phase::*;

        matches!(
            (self, next),
            (Idle, Assembling)
                | (Assembling, Compiling)
                | (Compiling, CompileFailed | CompileSucceeded)
                | (CompileSucceeded, Evaluating)
                | (Evaluating, EvalFailed | EvalSucceeded)
                | (CompileFailed | EvalFailed | EvalSucceeded, Idle)
        )
    }
}

#[derive(Debug)]
pub enum Outcome {
    /// Nothing was entered
    Skipped,
    /// The `$` listing
    Listing(String),
    /// The turn was committed. `None` stands for `undefined`
    Value(Option<String>),
    /// The turn was rolled back
    Failed(Error),
}

/// Result of evaluating a single input in the REPL.
#[derive(Debug)]
pub struct EvalResult {
    /// Compiler messages worth showing, warnings included when enabled
    pub diagnostics: Vec<Diagnostic>,
    pub outcome: Outcome,
}

impl EvalResult {
    fn new(outcome: Outcome) -> EvalResult {
        EvalResult {
            diagnostics: vec![],
            outcome,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, Outcome::Failed(_))
    }

    /// Print the result the way the prompt shows it: compiler messages first, then
    /// the value or the error. `undefined` is not printed
    pub fn emit(&self) {
        self.diagnostics.iter().for_each(Diagnostic::emit);

        match &self.outcome {
            Outcome::Skipped | Outcome::Value(None) => {}
            Outcome::Listing(listing) => println!("{listing}"),
            Outcome::Value(Some(value)) => println!("{value}"),
            // The diagnostics already explain the failure
            Outcome::Failed(e) if e.kind() == ErrKind::Compile && !self.diagnostics.is_empty() => {}
            Outcome::Failed(e) => e.emit(),
        }
    }
}

pub struct Context<C: Compiler, E: Evaluator> {
    session: Session,
    compiler: C,
    evaluator: E,
    warnings: bool,
    phase: Phase,
}

impl<C: Compiler, E: Evaluator> Context<C, E> {
    pub fn new(compiler: C, evaluator: E) -> Context<C, E> {
        Context {
            session: Session::new(),
            compiler,
            evaluator,
            warnings: true,
            phase: Phase::Idle,
        }
    }

    pub fn with_warnings(self, warnings: bool) -> Context<C, E> {
        Context { warnings, ..self }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn compiler(&self) -> &C {
        &self.compiler
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// Reset the session, runtime bindings included
    pub fn clear(&mut self) {
        log!(turn, "session cleared");
        self.session.clear();
        self.evaluator.reset();
    }

    fn enter(&mut self, phase: Phase) {
        debug_assert!(
            self.phase.leads_to(phase),
            "no transition from {} to {}",
            self.phase,
            phase
        );
        log!(turn, "{} -> {}", self.phase, phase);
        self.phase = phase;
    }

    /// Evaluate a line of input
    pub fn eval(&mut self, input: &str) -> EvalResult {
        let turn = classify::classify(input);
        log!(turn, "`{}` classified as {:?}", turn.raw(), turn.kind());

        match (turn.kind(), turn.target()) {
            (TurnKind::Meta, _) => EvalResult::new(Outcome::Listing(self.session.listing())),
            (_, Some(target)) => self.run(&turn, target),
            (_, None) => EvalResult::new(Outcome::Skipped),
        }
    }

    fn rollback(&mut self, turn: &Turn, failed: Phase) {
        self.enter(failed);
        self.session.rollback(turn);
        self.enter(Phase::Idle);
    }

    fn run(&mut self, turn: &Turn, target: Target) -> EvalResult {
        self.enter(Phase::Assembling);
        self.session.stage(turn);
        let source = splice::assemble(self.session.imports(), self.session.statements(), turn);

        self.enter(Phase::Compiling);
        let compiled = match self.compiler.compile(&source) {
            Ok(compiled) => compiled,
            Err(diagnostics) => {
                self.rollback(turn, Phase::CompileFailed);
                return EvalResult {
                    diagnostics: diagnostics.visible(self.warnings),
                    outcome: Outcome::Failed(
                        Error::new(ErrKind::Compile)
                            .with_msg(String::from("compilation failed")),
                    ),
                };
            }
        };
        self.enter(Phase::CompileSucceeded);

        let diagnostics = compiled.diagnostics.visible(self.warnings);

        // Cutting the delta out is the first step of evaluating it
        self.enter(Phase::Evaluating);
        let delta = match splice::extract(&compiled.output, target) {
            Ok(delta) => delta,
            Err(e) => {
                self.rollback(turn, Phase::EvalFailed);
                return EvalResult {
                    diagnostics,
                    outcome: Outcome::Failed(e),
                };
            }
        };

        match self.evaluator.evaluate(&delta) {
            Ok(value) => {
                self.enter(Phase::EvalSucceeded);
                self.session.commit(turn);
                self.enter(Phase::Idle);

                EvalResult {
                    diagnostics,
                    outcome: Outcome::Value(value),
                }
            }
            Err(e) => {
                self.rollback(turn, Phase::EvalFailed);

                EvalResult {
                    diagnostics,
                    outcome: Outcome::Failed(e),
                }
            }
        }
    }
}
