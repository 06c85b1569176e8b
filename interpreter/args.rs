//! The `Args` module gives command line options to hxrepl

use structopt::StructOpt;

use std::path::PathBuf;

#[derive(StructOpt)]
#[structopt(name = "hxrepl", about = "An interactive Haxe prompt running on Node.js")]
pub struct Args {
    #[structopt(short, long)]
    version: bool,

    /// Hide compiler warnings
    #[structopt(long = "no-warnings")]
    no_warnings: bool,

    /// Directory modules are resolved from
    #[structopt(long, parse(from_os_str))]
    pwd: Option<PathBuf>,

    /// Haxe compiler to use
    #[structopt(long, default_value = "haxe")]
    haxe: String,

    /// Node.js binary to evaluate with
    #[structopt(long, default_value = "node")]
    node: String,

    #[structopt(short, long)]
    debug: bool,

    /// Extra arguments given to the compiler
    #[structopt()]
    arguments: Vec<String>,
}

impl Args {
    fn print_version() {
        println!("{}", env!("CARGO_PKG_VERSION"));

        std::process::exit(0);
    }

    /// Parses the command line arguments, executes stopping options (such as --help
    /// or --version) and returns the given arguments
    pub fn handle() -> Args {
        let args = Args::from_args();

        if args.version {
            Args::print_version()
        }

        args
    }

    /// Is the REPL launched in debug mode
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Should compiler warnings be displayed
    pub fn warnings(&self) -> bool {
        !self.no_warnings
    }

    pub fn pwd(&self) -> Option<&PathBuf> {
        self.pwd.as_ref()
    }

    pub fn haxe(&self) -> &str {
        &self.haxe
    }

    pub fn node(&self) -> &str {
        &self.node
    }

    /// Arguments forwarded to the compiler
    pub fn compiler_args(&self) -> Vec<String> {
        self.arguments.clone()
    }
}
