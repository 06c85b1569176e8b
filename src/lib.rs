//! An interactive front-end for the Haxe compiler.
//!
//! Each line entered is spliced into a rolling compilation unit which is compiled
//! to JavaScript as a whole. Only the code produced by the newest line is then run
//! in a Node.js sandbox, so earlier side effects are never replayed.

pub mod log;

pub mod compiler;
pub mod config;
pub mod context;
pub mod diagnostic;
pub mod sandbox;
pub mod session;

pub use classify::{classify, has_unclosed_delimiters, Target, Turn, TurnKind};
pub use compiler::{Compiled, Compiler, HaxeCompiler};
pub use config::{Config, HaxeContext};
pub use context::{Context, EvalResult, Outcome, Phase};
pub use diagnostic::{Diagnostic, Diagnostics};
pub use error::{ErrKind, Error};
pub use sandbox::{Evaluator, NodeSandbox};
pub use session::Session;
