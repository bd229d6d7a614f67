use std::error::Error;
use std::fmt;

/// A declaration, scoping, or typing violation, or a recognized-but-
/// unsupported construct (compound assignment). Both carry a lexeme and
/// a line so the message format stays uniform.
#[derive(Debug, PartialEq)]
pub struct SemanticError {
    pub lexeme: String,
    pub line: u32,
    pub reason: String,
    pub path: Option<String>,
}

impl SemanticError {
    pub fn new(lexeme: impl Into<String>, line: u32, reason: impl Into<String>, path: Option<&str>) -> Self {
        SemanticError {
            lexeme: lexeme.into(),
            line,
            reason: reason.into(),
            path: path.map(str::to_string),
        }
    }

    pub fn not_implemented(operator: impl Into<String>, line: u32, path: Option<&str>) -> Self {
        let operator = operator.into();
        SemanticError::new(
            operator.clone(),
            line,
            format!("compound-assignment operator '{operator}' is not implemented"),
            path,
        )
    }
}

impl Error for SemanticError {}

impl fmt::Display for SemanticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at line {} - {}", self.lexeme, self.line, self.reason)?;
        if let Some(path) = &self.path {
            write!(f, " ({path}:{})", self.line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_the_contract_format() {
        let err = SemanticError::new("c", 1, "variable is not defined", None);
        assert_eq!(err.to_string(), "c at line 1 - variable is not defined");
    }

    #[test]
    fn display_appends_path_suffix() {
        let err = SemanticError::new("c", 1, "variable is not defined", Some("prog.src"));
        assert_eq!(err.to_string(), "c at line 1 - variable is not defined (prog.src:1)");
    }

    #[test]
    fn not_implemented_names_the_operator() {
        let err = SemanticError::not_implemented("+=", 4, None);
        assert_eq!(err.lexeme, "+=");
        assert!(err.reason.contains("+="));
    }
}
