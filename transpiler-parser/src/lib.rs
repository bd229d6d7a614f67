//! The source language's concrete grammar, parse tree, and the table-
//! driven parser that builds one from a token stream.

mod grammar;
mod parser;
mod tree;

pub use grammar::build_grammar;
pub use parser::{parse, SyntaxError};
pub use tree::{Node, NodeId, ParseTree};

use once_cell::sync::Lazy;
use transpiler_lexer::LexerError;
use transpiler_parsegen::{generate_table, LLParserTable};
use transpiler_symbols::{Grammar, Token};

static GRAMMAR: Lazy<Grammar> = Lazy::new(build_grammar);
static TABLE: Lazy<LLParserTable> =
    Lazy::new(|| generate_table(&GRAMMAR).expect("the built-in grammar is LL(1) by construction"));

pub fn grammar() -> &'static Grammar {
    &GRAMMAR
}

#[derive(Debug)]
pub enum FrontEndError {
    Lexer(LexerError),
    Syntax(SyntaxError),
}

impl std::fmt::Display for FrontEndError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrontEndError::Lexer(e) => write!(f, "{e}"),
            FrontEndError::Syntax(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for FrontEndError {}

impl From<LexerError> for FrontEndError {
    fn from(e: LexerError) -> Self {
        FrontEndError::Lexer(e)
    }
}

impl From<SyntaxError> for FrontEndError {
    fn from(e: SyntaxError) -> Self {
        FrontEndError::Syntax(e)
    }
}

/// Lexes and parses `source` in one step, using the built-in grammar
/// and its (lazily computed, memoized) predict table.
pub fn parse_source(source: &str) -> Result<ParseTree, FrontEndError> {
    let tokens: Vec<Token> = transpiler_lexer::lex(source)?;
    match parse(&tokens, &GRAMMAR, &TABLE) {
        Ok(tree) => {
            log::debug!("parsed {} parse-tree nodes", tree.walk().count());
            Ok(tree)
        }
        Err(e) => {
            log::warn!("{e}");
            Err(FrontEndError::from(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_to_end_parse_succeeds_on_minimal_program() {
        parse_source("begin end.").expect("minimal program should parse");
    }

    #[test]
    fn end_to_end_parse_reports_lexer_errors() {
        let err = parse_source("begin x := %; end.").unwrap_err();
        assert!(matches!(err, FrontEndError::Lexer(_)));
    }
}
