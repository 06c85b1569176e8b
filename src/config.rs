//! Session configuration: which toolchain to drive, what to hand the compiler,
//! where modules are resolved from, and whether warnings are shown.

use std::path::{Path, PathBuf};

use error::{ErrKind, Error};

use crate::compiler::HaxeCompiler;
use crate::context::Context;
use crate::sandbox::NodeSandbox;

/// The context driven by the real toolchain
pub type HaxeContext = Context<HaxeCompiler, NodeSandbox>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    haxe: String,
    node: String,
    compiler_args: Vec<String>,
    warnings: bool,
    colors: bool,
    pwd: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            haxe: String::from("haxe"),
            node: String::from("node"),
            compiler_args: vec![],
            warnings: true,
            colors: false,
            pwd: None,
        }
    }
}

impl Config {
    pub fn new() -> Config {
        Config::default()
    }

    /// Compiler binary to invoke
    pub fn with_haxe(self, haxe: String) -> Config {
        Config { haxe, ..self }
    }

    /// Node.js binary running the sandbox
    pub fn with_node(self, node: String) -> Config {
        Config { node, ..self }
    }

    /// Arguments handed verbatim to the compiler, before the fixed flags
    pub fn with_compiler_args(self, compiler_args: Vec<String>) -> Config {
        Config {
            compiler_args,
            ..self
        }
    }

    pub fn with_warnings(self, warnings: bool) -> Config {
        Config { warnings, ..self }
    }

    /// Show values the way Node.js colors them on a terminal
    pub fn with_colors(self, colors: bool) -> Config {
        Config { colors, ..self }
    }

    /// Working directory used to resolve modules, defaults to the current one
    pub fn with_pwd(self, pwd: Option<PathBuf>) -> Config {
        Config { pwd, ..self }
    }

    pub fn haxe(&self) -> &str {
        &self.haxe
    }

    pub fn node(&self) -> &str {
        &self.node
    }

    pub fn compiler_args(&self) -> &[String] {
        &self.compiler_args
    }

    pub fn warnings(&self) -> bool {
        self.warnings
    }

    /// The absolute working directory
    pub fn resolve_pwd(&self) -> Result<PathBuf, Error> {
        let pwd = match &self.pwd {
            Some(pwd) => pwd.clone(),
            None => std::env::current_dir()?,
        };

        pwd.canonicalize().map_err(|e| {
            Error::new(ErrKind::Usage).with_msg(format!(
                "cannot use `{}` as working directory: {e}",
                pwd.display()
            ))
        })
    }

    pub fn compiler(&self, pwd: &Path) -> Result<HaxeCompiler, Error> {
        HaxeCompiler::new(&self.haxe, self.compiler_args.clone(), pwd)
    }

    pub fn sandbox(&self, pwd: &Path) -> Result<NodeSandbox, Error> {
        Ok(NodeSandbox::new(&self.node, pwd)?.with_colors(self.colors))
    }

    /// Build a context driving the configured toolchain
    pub fn context(&self) -> Result<HaxeContext, Error> {
        let pwd = self.resolve_pwd()?;

        Ok(Context::new(self.compiler(&pwd)?, self.sandbox(&pwd)?).with_warnings(self.warnings))
    }
}
