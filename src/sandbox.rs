//! Evaluation of the compiled deltas.
//!
//! Deltas run in a single Node.js `vm` context kept alive for the whole session,
//! so a binding made by one turn is visible to the next ones. The context lives
//! in a runner process spawned on first use. Requests go through its stdin;
//! its stdout carries both the program's own output, forwarded as is by a
//! reader thread, and one tagged report line per request.

use std::fs;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use error::{ErrKind, Error};
use serde::{Deserialize, Serialize};
use tempfile::TempDir;

use crate::log;

const RUNNER: &str = include_str!("runner.js");
const RUNNER_FILE: &str = "runner.js";

/// Tag in front of the runner's report lines
const REPORT_PREFIX: &str = "\u{1}hxrepl-report:";

pub trait Evaluator {
    /// Run `code` and return its displayable value, `None` standing for
    /// `undefined`
    fn evaluate(&mut self, code: &str) -> Result<Option<String>, Error>;

    /// Forget every binding made so far
    fn reset(&mut self) {}
}

#[derive(Debug, Serialize)]
struct Request<'c> {
    code: &'c str,
}

#[derive(Debug, Deserialize)]
struct Report {
    ok: bool,
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl Report {
    fn broken(message: String) -> Report {
        Report {
            ok: false,
            value: None,
            message: Some(message),
        }
    }

    fn into_result(self) -> Result<Option<String>, Error> {
        match self.ok {
            true => Ok(self.value),
            false => Err(Error::new(ErrKind::Eval).with_msg(self.message.unwrap_or_default())),
        }
    }
}

/// Forward the runner's output to ours and hand its reports back, until the
/// runner goes away
fn forward(stdout: ChildStdout, reports: Sender<Report>) {
    let mut reader = BufReader::new(stdout);
    let mut line = vec![];

    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }

        let text = String::from_utf8_lossy(&line);
        let mut out = io::stdout().lock();

        match text.split_once(REPORT_PREFIX) {
            // Output written without a trailing newline shares the report's line
            Some((output, report)) => {
                let _ = out.write_all(output.as_bytes());
                let _ = out.flush();

                let report = serde_json::from_str::<Report>(report.trim_end()).unwrap_or_else(|e| {
                    Report::broken(format!("unreadable sandbox report: {e}"))
                });
                if reports.send(report).is_err() {
                    break;
                }
            }
            None => {
                let _ = out.write_all(text.as_bytes());
                let _ = out.flush();
            }
        }
    }
}

struct Runner {
    child: Child,
    stdin: ChildStdin,
    reports: Receiver<Report>,
}

impl Drop for Runner {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

pub struct NodeSandbox {
    node: String,
    pwd: PathBuf,
    dir: TempDir,
    colors: bool,
    runner: Option<Runner>,
}

impl NodeSandbox {
    pub fn new(node: &str, pwd: &Path) -> Result<NodeSandbox, Error> {
        let dir = tempfile::Builder::new().prefix("hxrepl_vm_").tempdir()?;
        fs::write(dir.path().join(RUNNER_FILE), RUNNER)?;

        Ok(NodeSandbox {
            node: node.to_string(),
            pwd: pwd.to_owned(),
            dir,
            colors: false,
            runner: None,
        })
    }

    /// Colorize the values shown
    pub fn with_colors(self, colors: bool) -> NodeSandbox {
        NodeSandbox { colors, ..self }
    }

    /// Directory modules are resolved from
    pub fn pwd(&self) -> &Path {
        &self.pwd
    }

    pub fn version(&self) -> Result<String, Error> {
        let out = Command::new(&self.node)
            .arg("--version")
            .output()
            .map_err(|e| {
                Error::new(ErrKind::Toolchain).with_msg(format!("cannot run `{}`: {e}", self.node))
            })?;

        match out.status.success() {
            true => Ok(String::from_utf8_lossy(&out.stdout).trim().to_string()),
            false => Err(Error::new(ErrKind::Toolchain)
                .with_msg(String::from_utf8_lossy(&out.stderr).trim().to_string())),
        }
    }

    fn spawn(&self) -> Result<Runner, Error> {
        let mut cmd = Command::new(&self.node);
        cmd.arg(self.dir.path().join(RUNNER_FILE))
            .arg(&self.pwd)
            .current_dir(&self.pwd)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped());

        if self.colors {
            cmd.arg("--colors");
        }

        let mut child = cmd.spawn().map_err(|e| {
            Error::new(ErrKind::Eval).with_msg(format!("cannot run `{}`: {e}", self.node))
        })?;
        log!(eval, "sandbox started as process {}", child.id());

        let (stdin, stdout) = match (child.stdin.take(), child.stdout.take()) {
            (Some(stdin), Some(stdout)) => (stdin, stdout),
            _ => {
                let _ = child.kill();
                return Err(Error::new(ErrKind::Eval)
                    .with_msg(String::from("cannot talk to the sandbox")));
            }
        };

        let (tx, reports) = mpsc::channel();
        thread::spawn(move || forward(stdout, tx));

        Ok(Runner {
            child,
            stdin,
            reports,
        })
    }
}

impl Evaluator for NodeSandbox {
    fn evaluate(&mut self, code: &str) -> Result<Option<String>, Error> {
        let mut runner = match self.runner.take() {
            Some(runner) => runner,
            None => self.spawn()?,
        };

        let request = serde_json::to_string(&Request { code }).map_err(|e| {
            Error::new(ErrKind::Eval).with_msg(format!("cannot encode request: {e}"))
        })?;

        log!(eval, "running {} bytes of JavaScript", code.len());

        // A failed write means the runner is gone: it is dropped along with its
        // bindings, and respawned on the next turn
        writeln!(runner.stdin, "{request}")
            .and_then(|_| runner.stdin.flush())
            .map_err(|e| Error::new(ErrKind::Eval).with_msg(format!("sandbox is gone: {e}")))?;

        match runner.reports.recv() {
            Ok(report) => {
                self.runner = Some(runner);
                report.into_result()
            }
            Err(_) => {
                let status = runner.child.wait()?;
                log!(eval, "sandbox exited with {status}");

                Err(Error::new(ErrKind::Eval).with_msg(format!("sandbox exited with {status}")))
            }
        }
    }

    fn reset(&mut self) {
        log!(eval, "sandbox reset");
        self.runner = None;
    }
}
