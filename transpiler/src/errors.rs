use std::error::Error;
use std::fmt;

use transpiler_lexer::LexerError;
use transpiler_parser::{FrontEndError, SyntaxError};
use transpiler_parsegen::ParserGenError;
use transpiler_sem::SemanticError;

/// The pipeline's single error type: each stage's own error, unwrapped
/// into one enum so the caller never has to match on per-crate types.
/// `Grammar` is part of the taxonomy spec.md §7 describes, but the
/// translator's built-in grammar is checked LL(1) once at first use and
/// panics (rather than returning this variant) if it ever were not --
/// the variant exists for callers who build their own grammar through
/// `transpiler_parsegen` directly.
#[derive(Debug)]
pub enum TranspileError {
    Lexer(LexerError),
    Grammar(ParserGenError),
    Syntax(SyntaxError),
    Semantic(SemanticError),
}

impl fmt::Display for TranspileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranspileError::Lexer(e) => write!(f, "{e}"),
            TranspileError::Grammar(e) => write!(f, "{e}"),
            TranspileError::Syntax(e) => write!(f, "{e}"),
            TranspileError::Semantic(e) => write!(f, "{e}"),
        }
    }
}

impl Error for TranspileError {}

impl From<FrontEndError> for TranspileError {
    fn from(e: FrontEndError) -> Self {
        match e {
            FrontEndError::Lexer(e) => TranspileError::Lexer(e),
            FrontEndError::Syntax(e) => TranspileError::Syntax(e),
        }
    }
}

impl From<ParserGenError> for TranspileError {
    fn from(e: ParserGenError) -> Self {
        TranspileError::Grammar(e)
    }
}

impl From<SemanticError> for TranspileError {
    fn from(e: SemanticError) -> Self {
        TranspileError::Semantic(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn semantic_error_display_passes_through_unaltered() {
        let inner = SemanticError::new("c", 1, "variable is not defined", None);
        let wrapped = TranspileError::Semantic(inner);
        assert_eq!(wrapped.to_string(), "c at line 1 - variable is not defined");
    }
}
