//! Assembling a whole compilation unit out of a REPL session, and cutting the
//! freshly compiled JavaScript back into the piece produced by the latest turn.
//!
//! Both halves agree on a single contract: a marker statement is emitted before
//! the first statement, between every two statements and after the last one.
//! The Haxe compiler keeps it verbatim as a standalone JavaScript statement,
//! which gives the extractor exact turn boundaries to split on.

use classify::{Target, Turn};
use error::{ErrKind, Error};

/// Marker literal. Its only job is to never show up in a legitimate program
pub const MARKER: &str = "<__hxrepl_turn__>";

/// Statement evaluated right before the delta so that turns without a value of
/// their own report nothing
pub const NO_VALUE: &str = "undefined;\n";

/// Name of the generated class, and of the compilation unit
pub const CLASS_NAME: &str = "Repl";

const INIT_HEAD: &str = "class Repl {
    static function __init__():Void {
haxe.Log.trace = function(v:Dynamic, ?infos:haxe.PosInfos) {
    untyped console.log(v);
}
var require = untyped require;
";

const INIT_TAIL: &str = "    }
}
";

/// The marker, as written in the Haxe source
pub fn marker_statement() -> String {
    format!("js.Syntax.code('\"{MARKER}\"');")
}

/// The marker, as emitted by the compiler in the JavaScript output
pub fn marker_token() -> String {
    format!("\"{MARKER}\";\n")
}

/// Render the full compilation unit for a session whose `statements` already
/// contain the staged turn as their last entry.
///
/// When the turn retains an identifier, an escape surfacing its value is
/// appended to the last statement, on the same line. Declarations get a second
/// escape evaluating to `undefined`, so their own echo stays silent.
pub fn assemble(imports: &[String], statements: &[String], turn: &Turn) -> String {
    let marker = marker_statement();
    let mut lines = statements.to_vec();

    if let (Some(ident), Some(last)) = (turn.retained(), lines.last_mut()) {
        last.push_str(&format!(" untyped js.Syntax.code(\"{{0}}\", {ident});"));
        if turn.suppress_output() {
            last.push_str(" untyped js.Syntax.code(\"undefined\");");
        }
    }

    let mut source = String::new();
    for import in imports {
        source.push_str(import);
        source.push('\n');
    }

    source.push_str(INIT_HEAD);
    source.push_str(&marker);
    source.push('\n');
    source.push_str(&lines.join(&format!("\n{marker}\n")));
    source.push('\n');
    source.push_str(&marker);
    source.push('\n');
    source.push_str(INIT_TAIL);

    source
}

/// Keep the prologue and the epilogue of the compiled output, then the code of
/// the newest statement when the turn targeted the statement history. Code
/// generated for earlier turns is dropped so it does not run twice.
pub fn extract(output: &str, target: Target) -> Result<String, Error> {
    let token = marker_token();
    let mut fragments: Vec<&str> = output.split(token.as_str()).collect();

    if fragments.len() < 2 {
        return Err(Error::new(ErrKind::Extract)
            .with_msg(String::from("compiled output carries no turn markers")));
    }

    let prologue = fragments[0];
    // Checked above: there are at least two fragments
    let epilogue = fragments.pop().unwrap_or_default();

    let mut delta = format!("{prologue}{epilogue}{NO_VALUE}");

    if target == Target::Statements {
        // The prologue is not a statement: a statement turn needs a third fragment
        if fragments.len() < 2 {
            return Err(Error::new(ErrKind::Extract)
                .with_msg(String::from("compiled output carries no statement")));
        }
        delta.push_str(fragments.pop().unwrap_or_default());
    }

    Ok(delta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use classify::classify;

    fn owned(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn t_assemble_single_statement() {
        let turn = classify("1 + 1");
        let src = assemble(&[], &owned(&["1 + 1;"]), &turn);
        let marker = marker_statement();

        assert!(src.starts_with("class Repl {"));
        assert!(src.contains("haxe.Log.trace = function"));
        assert!(src.contains("var require = untyped require;"));
        assert!(src.contains(&format!("{marker}\n1 + 1;\n{marker}\n")));
        assert_eq!(src.matches(&marker).count(), 2);
    }

    #[test]
    fn t_assemble_marks_every_boundary() {
        let turn = classify("c");
        let statements = owned(&["var a = 1;", "var b = 2;", "c;"]);
        let src = assemble(&[], &statements, &turn);

        assert_eq!(src.matches(&marker_statement()).count(), 4);
    }

    #[test]
    fn t_assemble_imports_come_first() {
        let turn = classify("import haxe.Json");
        let imports = owned(&["import sys.io.File;", "import haxe.Json;"]);
        let src = assemble(&imports, &[], &turn);

        assert!(src.starts_with("import sys.io.File;\nimport haxe.Json;\nclass Repl {"));
    }

    #[test]
    fn t_assemble_retains_identifier_on_last_line() {
        let turn = classify("x");
        let src = assemble(&[], &owned(&["var x = 5;", "x;"]), &turn);

        assert!(src.contains("x; untyped js.Syntax.code(\"{0}\", x);\n"));
        assert!(src.contains("var x = 5;\n"));
        assert!(!src.contains("js.Syntax.code(\"undefined\")"));
    }

    #[test]
    fn t_assemble_suppresses_binding_echo() {
        let turn = classify("var x = 5");
        let src = assemble(&[], &owned(&["var x = 5;"]), &turn);

        assert!(src.contains(
            "var x = 5; untyped js.Syntax.code(\"{0}\", x); untyped js.Syntax.code(\"undefined\");"
        ));
    }

    #[test]
    fn t_extract_keeps_only_newest_statement() {
        let token = marker_token();
        let output = format!(
            "var prologue;\n{token}var a = 1;\n{token}var b = 2;\n{token}a + b;\n{token}epilogue();\n"
        );

        let delta = extract(&output, Target::Statements).unwrap();

        assert_eq!(delta, "var prologue;\nepilogue();\nundefined;\na + b;\n");
        assert!(!delta.contains("var a = 1"));
        assert!(!delta.contains("var b = 2"));
    }

    #[test]
    fn t_extract_import_turn_appends_nothing() {
        let token = marker_token();
        let output = format!("var prologue;\n{token}var a = 1;\n{token}epilogue();\n");

        let delta = extract(&output, Target::Imports).unwrap();

        assert_eq!(delta, "var prologue;\nepilogue();\nundefined;\n");
    }

    #[test]
    fn t_extract_without_markers() {
        let err = extract("console.log(1);\n", Target::Statements).unwrap_err();

        assert_eq!(err.kind(), ErrKind::Extract);
    }

    #[test]
    fn t_extract_statement_turn_without_statement() {
        let token = marker_token();
        let output = format!("var prologue;\n{token}epilogue();\n");

        assert!(extract(&output, Target::Statements).is_err());
        assert!(extract(&output, Target::Imports).is_ok());
    }
}
