//! Input classification for the REPL.
//!
//! Every line typed at the prompt becomes a [`Turn`]: an empty line, the `$`
//! session listing, an import declaration, or a statement. Statements carry the
//! extra bits the assembler needs to surface a value: the identifier to retain,
//! whether its echo is suppressed, and whether the statement is dropped from the
//! history once evaluated.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::satisfy,
    combinator::{all_consuming, not},
    sequence::{preceded, terminated},
    IResult,
};

/// Reserved input listing the session's imports and history
pub const META_TOKEN: &str = "$";

/// Prefix of a type-introspection request. Those are evaluated once and never
/// kept in the history
pub const TYPE_QUERY_PREFIX: &str = "$type(";

const TERMINATOR: char = ';';

/// Recognizers for the few reserved forms of the prompt
pub struct Token;

impl Token {
    fn is_ident_char(c: char) -> bool {
        c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'
    }

    /// A keyword followed by exactly one whitespace character, such as "var " or
    /// "using\t"
    fn is_word_char(c: char) -> bool {
        c.is_alphanumeric() || c == '_'
    }

    fn keyword<'i>(input: &'i str, keyword: &'static str) -> IResult<&'i str, &'i str> {
        terminated(tag(keyword), satisfy(char::is_whitespace))(input)
    }

    fn import_kw(input: &str) -> IResult<&str, &str> {
        Token::keyword(input, "import")
    }

    fn using_kw(input: &str) -> IResult<&str, &str> {
        Token::keyword(input, "using")
    }

    fn var_kw(input: &str) -> IResult<&str, &str> {
        Token::keyword(input, "var")
    }

    pub fn identifier(input: &str) -> IResult<&str, &str> {
        take_while1(Token::is_ident_char)(input)
    }

    pub fn import_tok(input: &str) -> IResult<&str, &str> {
        alt((Token::import_kw, Token::using_kw))(input)
    }

    /// Recognize a variable declaration and return the declared identifier. The
    /// whole name must match, `var myVar` is not a declaration of `my`
    pub fn var_decl(input: &str) -> IResult<&str, &str> {
        preceded(
            Token::var_kw,
            terminated(Token::identifier, not(satisfy(Token::is_word_char))),
        )(input)
    }

    pub fn type_query(input: &str) -> IResult<&str, &str> {
        tag(TYPE_QUERY_PREFIX)(input)
    }

    /// Is the whole input a single lowercase identifier
    pub fn bare_identifier(input: &str) -> bool {
        all_consuming(Token::identifier)(input).is_ok()
    }
}

/// The kind of input entered at the REPL prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnKind {
    /// Nothing to do
    Empty,
    /// The `$` session listing
    Meta,
    /// `import` or `using` declaration
    Import,
    /// `var` declaration
    Binding,
    /// `$type(...)` request
    TypeQuery,
    /// Any other statement or expression
    Expression,
}

/// The session sequence a turn is tentatively appended to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Imports,
    Statements,
}

/// One REPL interaction, from the trimmed input to everything the assembler,
/// the extractor and the session need to know about it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    raw: String,
    kind: TurnKind,
    source: String,
    retained: Option<String>,
    suppress_output: bool,
    auto_discard: bool,
}

impl Turn {
    fn bare(raw: &str, kind: TurnKind) -> Turn {
        Turn {
            raw: raw.to_string(),
            kind,
            source: String::new(),
            retained: None,
            suppress_output: false,
            auto_discard: false,
        }
    }

    /// Trimmed input, as typed
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn kind(&self) -> TurnKind {
        self.kind
    }

    /// Normalized source, terminated by a semicolon. Empty for `Empty` and `Meta`
    /// turns
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Identifier whose value is surfaced as the turn's result
    pub fn retained(&self) -> Option<&str> {
        self.retained.as_deref()
    }

    pub fn suppress_output(&self) -> bool {
        self.suppress_output
    }

    pub fn auto_discard(&self) -> bool {
        self.auto_discard
    }

    pub fn target(&self) -> Option<Target> {
        match self.kind {
            TurnKind::Import => Some(Target::Imports),
            TurnKind::Binding | TurnKind::TypeQuery | TurnKind::Expression => {
                Some(Target::Statements)
            }
            TurnKind::Empty | TurnKind::Meta => None,
        }
    }
}

fn terminate(input: &str) -> String {
    let mut source = input.to_string();
    if !source.ends_with(TERMINATOR) {
        source.push(TERMINATOR);
    }

    source
}

/// Classify a line of REPL input.
#[must_use]
pub fn classify(input: &str) -> Turn {
    let raw = input.trim();

    if raw.is_empty() {
        return Turn::bare(raw, TurnKind::Empty);
    }

    if raw == META_TOKEN {
        return Turn::bare(raw, TurnKind::Meta);
    }

    if Token::import_tok(raw).is_ok() {
        return Turn {
            source: terminate(raw),
            ..Turn::bare(raw, TurnKind::Import)
        };
    }

    // The bare identifier check happens before the terminator is added
    let mut retained = Token::bare_identifier(raw).then(|| raw.to_string());
    let auto_discard = Token::type_query(raw).is_ok();
    let source = terminate(raw);

    let kind = match Token::var_decl(&source) {
        Ok((_, ident)) => {
            retained = Some(ident.to_string());
            TurnKind::Binding
        }
        Err(_) if auto_discard => TurnKind::TypeQuery,
        Err(_) => TurnKind::Expression,
    };

    Turn {
        raw: raw.to_string(),
        kind,
        source,
        retained,
        suppress_output: kind == TurnKind::Binding,
        auto_discard,
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Scan {
    Code,
    Quoted { quote: char, escaped: bool },
    LineComment,
    BlockComment,
}

/// Check whether input has unclosed delimiters (for multi-line input). Strings
/// and comments are skipped, and an unterminated block comment also counts as
/// unclosed.
#[must_use]
pub fn has_unclosed_delimiters(input: &str) -> bool {
    let mut depth: i32 = 0;
    let mut state = Scan::Code;
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        state = match state {
            Scan::Quoted { quote, escaped } => match ch {
                _ if escaped => Scan::Quoted {
                    quote,
                    escaped: false,
                },
                '\\' => Scan::Quoted {
                    quote,
                    escaped: true,
                },
                _ if ch == quote => Scan::Code,
                _ => state,
            },
            Scan::LineComment => match ch {
                '\n' => Scan::Code,
                _ => state,
            },
            Scan::BlockComment => match (ch, chars.peek().copied()) {
                ('*', Some('/')) => {
                    chars.next();
                    Scan::Code
                }
                _ => state,
            },
            Scan::Code => match (ch, chars.peek().copied()) {
                ('/', Some('/')) => {
                    chars.next();
                    Scan::LineComment
                }
                ('/', Some('*')) => {
                    chars.next();
                    Scan::BlockComment
                }
                ('"' | '\'', _) => Scan::Quoted {
                    quote: ch,
                    escaped: false,
                },
                ('{' | '(' | '[', _) => {
                    depth += 1;
                    state
                }
                ('}' | ')' | ']', _) => {
                    depth -= 1;
                    state
                }
                _ => state,
            },
        };
    }

    depth > 0 || state == Scan::BlockComment
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t_empty_input() {
        assert_eq!(classify("").kind(), TurnKind::Empty);
        assert_eq!(classify("   \t").kind(), TurnKind::Empty);
        assert_eq!(classify("  ").target(), None);
    }

    #[test]
    fn t_meta_token() {
        let turn = classify(" $ ");

        assert_eq!(turn.kind(), TurnKind::Meta);
        assert_eq!(turn.source(), "");
        assert_eq!(turn.target(), None);
    }

    #[test]
    fn t_import_keeps_terminator() {
        let turn = classify("import sys.io.File;");

        assert_eq!(turn.kind(), TurnKind::Import);
        assert_eq!(turn.source(), "import sys.io.File;");
        assert_eq!(turn.target(), Some(Target::Imports));
        assert_eq!(turn.retained(), None);
    }

    #[test]
    fn t_using_gets_terminator() {
        let turn = classify("using StringTools");

        assert_eq!(turn.kind(), TurnKind::Import);
        assert_eq!(turn.source(), "using StringTools;");
    }

    #[test]
    fn t_import_needs_whitespace() {
        // `imports` is an identifier, not a declaration
        let turn = classify("imports");

        assert_eq!(turn.kind(), TurnKind::Expression);
        assert_eq!(turn.retained(), Some("imports"));
    }

    #[test]
    fn t_var_binding() {
        let turn = classify("var x = 5");

        assert_eq!(turn.kind(), TurnKind::Binding);
        assert_eq!(turn.source(), "var x = 5;");
        assert_eq!(turn.retained(), Some("x"));
        assert!(turn.suppress_output());
        assert!(!turn.auto_discard());
        assert_eq!(turn.target(), Some(Target::Statements));
    }

    #[test]
    fn t_var_binding_needs_whole_identifier() {
        let turn = classify("var myVar = 1;");

        assert_eq!(turn.kind(), TurnKind::Expression);
        assert_eq!(turn.retained(), None);
        assert!(!turn.suppress_output());
        assert_eq!(turn.source(), "var myVar = 1;");
    }

    #[test]
    fn t_var_binding_with_type_hint() {
        let turn = classify("var count:Int = 1");

        assert_eq!(turn.kind(), TurnKind::Binding);
        assert_eq!(turn.retained(), Some("count"));
    }

    #[test]
    fn t_var_without_identifier_is_expression() {
        let turn = classify("var  x = 1");

        assert_eq!(turn.kind(), TurnKind::Expression);
        assert_eq!(turn.retained(), None);
        assert!(!turn.suppress_output());
    }

    #[test]
    fn t_bare_identifier_is_retained() {
        let turn = classify("counter_2");

        assert_eq!(turn.kind(), TurnKind::Expression);
        assert_eq!(turn.source(), "counter_2;");
        assert_eq!(turn.retained(), Some("counter_2"));
        assert!(!turn.suppress_output());
    }

    #[test]
    fn t_terminated_identifier_is_not_retained() {
        assert_eq!(classify("x;").retained(), None);
        assert_eq!(classify("Math").retained(), None);
    }

    #[test]
    fn t_expression() {
        let turn = classify("1 + 1");

        assert_eq!(turn.kind(), TurnKind::Expression);
        assert_eq!(turn.source(), "1 + 1;");
        assert_eq!(turn.retained(), None);
        assert!(!turn.auto_discard());
    }

    #[test]
    fn t_type_query_is_discarded() {
        let turn = classify("$type(x)");

        assert_eq!(turn.kind(), TurnKind::TypeQuery);
        assert_eq!(turn.source(), "$type(x);");
        assert!(turn.auto_discard());
        assert_eq!(turn.target(), Some(Target::Statements));
    }

    #[test]
    fn t_token_recognizers() {
        assert_eq!(Token::identifier("abc_1 + 2"), Ok((" + 2", "abc_1")));
        assert_eq!(Token::var_decl("var y=2;"), Ok(("=2;", "y")));
        assert!(Token::var_decl("variable = 2;").is_err());
        assert!(Token::var_decl("var xY = 2;").is_err());
        assert!(Token::import_tok("using\tLambda").is_ok());
        assert!(Token::bare_identifier("abc"));
        assert!(!Token::bare_identifier("a.b"));
    }

    #[test]
    fn t_unclosed_delimiters() {
        assert!(has_unclosed_delimiters("function f() {"));
        assert!(has_unclosed_delimiters("var a = [1, 2,"));
        assert!(!has_unclosed_delimiters("function f() {}"));
        assert!(!has_unclosed_delimiters("var s = \"{ not a block\";"));
        assert!(!has_unclosed_delimiters("var c = '(';"));
    }

    #[test]
    fn t_unclosed_delimiters_skip_comments() {
        assert!(!has_unclosed_delimiters("trace(1); // see (notes"));
        assert!(!has_unclosed_delimiters("trace(1); /* { */"));
        assert!(has_unclosed_delimiters("trace(1); /* still open"));
        assert!(has_unclosed_delimiters("var f = function() { // }"));
        assert!(!has_unclosed_delimiters("var a = [\n  1, // ]\n  2\n];"));
        assert!(!has_unclosed_delimiters("var url = \"http://x/(\";"));
    }

    #[test]
    fn t_unclosed_delimiters_escaped_backslash() {
        assert!(has_unclosed_delimiters("var s = \"\\\\\"; var f = function() {"));
        assert!(!has_unclosed_delimiters("var s = \"a\\\"(b\";"));
        assert!(!has_unclosed_delimiters("var c = '\\\\'; f()"));
    }
}
