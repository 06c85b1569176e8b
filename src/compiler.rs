//! The Haxe compiler, driven as a batch tool.
//!
//! The compilation unit is rewritten into a process-lifetime temporary directory
//! on every turn and compiled with a fixed set of flags. Dead code elimination,
//! optimizations and inlining are all disabled so that every statement, even one
//! without any observable effect, leaves its own code between the turn markers.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use error::{ErrKind, Error};
use tempfile::TempDir;

use crate::diagnostic::Diagnostics;
use crate::log;

/// The rolling compilation unit
pub const SOURCE_FILE: &str = "Repl.hx";

/// The compiled artifact, overwritten by every successful compilation
pub const OUTPUT_FILE: &str = "out.js";

/// Output of a successful compilation
#[derive(Debug, Clone)]
pub struct Compiled {
    pub output: String,
    /// Warnings, or anything else the compiler had to say
    pub diagnostics: Diagnostics,
}

pub trait Compiler {
    /// Compile a whole compilation unit and return the generated JavaScript, or the
    /// diagnostics explaining why it was rejected
    fn compile(&mut self, source: &str) -> Result<Compiled, Diagnostics>;
}

pub struct HaxeCompiler {
    haxe: String,
    extra_args: Vec<String>,
    pwd: PathBuf,
    dir: TempDir,
}

impl HaxeCompiler {
    pub fn new(haxe: &str, extra_args: Vec<String>, pwd: &Path) -> Result<HaxeCompiler, Error> {
        let dir = tempfile::Builder::new().prefix("hxrepl_").tempdir()?;
        log!(compile, "compilation unit lives in {}", dir.path().display());

        Ok(HaxeCompiler {
            haxe: haxe.to_string(),
            extra_args,
            pwd: pwd.to_owned(),
            dir,
        })
    }

    pub fn source_path(&self) -> PathBuf {
        self.dir.path().join(SOURCE_FILE)
    }

    pub fn output_path(&self) -> PathBuf {
        self.dir.path().join(OUTPUT_FILE)
    }

    /// Extra arguments first, then the fixed flag set
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.extra_args.iter().map(OsString::from).collect();

        args.extend(
            [
                "-D",
                "js-classic",
                "-D",
                "nodejs",
                "-lib",
                "hxnodejs",
                "--no-inline",
                "--no-opt",
                "-dce",
                "no",
                "-cp",
            ]
            .iter()
            .map(OsString::from),
        );
        args.push(self.dir.path().as_os_str().to_owned());
        args.push(OsString::from("-js"));
        args.push(self.output_path().into_os_string());
        args.push(OsString::from(splice::CLASS_NAME));

        args
    }

    /// Ask the compiler for its version, which doubles as a check that the
    /// toolchain is installed
    pub fn version(&self) -> Result<String, Error> {
        let out = Command::new(&self.haxe)
            .arg("-version")
            .output()
            .map_err(|e| {
                Error::new(ErrKind::Toolchain).with_msg(format!("cannot run `{}`: {e}", self.haxe))
            })?;

        let stdout = String::from_utf8_lossy(&out.stdout).trim().to_string();
        let stderr = String::from_utf8_lossy(&out.stderr).trim().to_string();

        if !out.status.success() {
            return Err(Error::new(ErrKind::Toolchain).with_msg(stderr));
        }

        // Older compilers print their version on stderr
        Ok(match stdout.is_empty() {
            true => stderr,
            false => stdout,
        })
    }
}

impl Compiler for HaxeCompiler {
    fn compile(&mut self, source: &str) -> Result<Compiled, Diagnostics> {
        let source_path = self.source_path();
        fs::write(&source_path, source).map_err(|e| {
            Diagnostics::from_message(format!("cannot write {}: {e}", source_path.display()))
        })?;

        let args = self.args();
        log!(
            compile,
            "{} {}",
            self.haxe,
            args.iter()
                .map(|a| a.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );

        let out = Command::new(&self.haxe)
            .args(&args)
            .current_dir(&self.pwd)
            .output()
            .map_err(|e| Diagnostics::from_message(format!("cannot run `{}`: {e}", self.haxe)))?;

        let diagnostics = Diagnostics::parse(&String::from_utf8_lossy(&out.stderr), SOURCE_FILE);
        for diagnostic in diagnostics.iter() {
            if let Some(line) = diagnostic.line() {
                log!(compile, "{}:{line}: {}", SOURCE_FILE, diagnostic.message());
            }
        }

        if !out.status.success() {
            log!(compile, "compiler exited with {}", out.status);
            return Err(diagnostics);
        }

        let output_path = self.output_path();
        let output = fs::read_to_string(&output_path).map_err(|e| {
            Diagnostics::from_message(format!("cannot read {}: {e}", output_path.display()))
        })?;

        Ok(Compiled {
            output,
            diagnostics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compiler(extra: &[&str]) -> HaxeCompiler {
        HaxeCompiler::new(
            "haxe",
            extra.iter().map(|a| a.to_string()).collect(),
            Path::new("."),
        )
        .unwrap()
    }

    #[test]
    fn t_args_fixed_flags() {
        let haxe = compiler(&[]);
        let args: Vec<String> = haxe
            .args()
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        for flag in ["--no-inline", "--no-opt", "js-classic", "nodejs", "hxnodejs"] {
            assert!(args.iter().any(|a| a == flag), "missing {flag}");
        }

        let dce = args.iter().position(|a| a == "-dce").unwrap();
        assert_eq!(args[dce + 1], "no");

        let js = args.iter().position(|a| a == "-js").unwrap();
        assert!(args[js + 1].ends_with(OUTPUT_FILE));

        let cp = args.iter().position(|a| a == "-cp").unwrap();
        assert_eq!(Path::new(&args[cp + 1]), haxe.dir.path());

        assert_eq!(args.last().map(String::as_str), Some("Repl"));
    }

    #[test]
    fn t_extra_args_come_first() {
        let haxe = compiler(&["-lib", "tink_core", "-D", "analyzer-optimize"]);
        let args = haxe.args();

        assert_eq!(args[0], "-lib");
        assert_eq!(args[1], "tink_core");
        assert_eq!(args[3], "analyzer-optimize");
    }

    #[test]
    fn t_paths_share_one_directory() {
        let haxe = compiler(&[]);

        assert_eq!(haxe.source_path().parent(), haxe.output_path().parent());
        assert!(haxe.source_path().ends_with(SOURCE_FILE));
    }

    #[test]
    fn t_missing_toolchain() {
        let haxe = HaxeCompiler::new("hxrepl-no-such-haxe", vec![], Path::new(".")).unwrap();
        let err = haxe.version().unwrap_err();

        assert_eq!(err.kind(), ErrKind::Toolchain);
    }

    #[test]
    fn t_compile_with_missing_toolchain_is_diagnosed() {
        let mut haxe = HaxeCompiler::new("hxrepl-no-such-haxe", vec![], Path::new(".")).unwrap();
        let diagnostics = haxe.compile("class Repl {}").unwrap_err();

        assert!(!diagnostics.is_empty());
        assert!(haxe.source_path().exists());
    }
}
