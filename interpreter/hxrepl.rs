mod args;
mod repl;

use std::io::{self, IsTerminal};

use hxrepl::{log, Config, Error};

use args::Args;
use repl::Repl;

/// Report an error that prevents the REPL from starting, then exit
fn fatal(e: Error) -> ! {
    e.emit();
    e.exit()
}

fn main() -> anyhow::Result<()> {
    let args = Args::handle();
    match args.debug() {
        true => hxrepl::log::enable(),
        false => hxrepl::log::enable_from_env(),
    }

    let config = Config::new()
        .with_haxe(args.haxe().to_string())
        .with_node(args.node().to_string())
        .with_compiler_args(args.compiler_args())
        .with_warnings(args.warnings())
        .with_colors(io::stdout().is_terminal())
        .with_pwd(args.pwd().cloned());

    let ctx = config.context().unwrap_or_else(|e| fatal(e));

    let version = ctx.compiler().version().unwrap_or_else(|e| fatal(e));
    let node = ctx.evaluator().version().unwrap_or_else(|e| fatal(e));
    log!("node {node}, modules resolved from {}", ctx.evaluator().pwd().display());

    println!("REPL Haxe {version}");

    Repl::new(ctx)?.launch()
}
