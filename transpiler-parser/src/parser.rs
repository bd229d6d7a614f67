//! Table-driven, non-recursive LL(1) parser. Drives a work stack of
//! tree nodes rather than recursing through the grammar, so grammar
//! depth never costs native call-stack depth.

use std::error::Error;
use std::fmt;

use transpiler_symbols::{Grammar, Symbol, Token};
use transpiler_parsegen::LLParserTable;

use crate::tree::{NodeId, ParseTree};

#[derive(Debug, PartialEq)]
pub enum SyntaxError {
    UnexpectedToken {
        found: Token,
        expected: String,
    },
    UnexpectedEndOfInput {
        line: u32,
    },
}

impl Error for SyntaxError {}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyntaxError::UnexpectedToken { found, expected } => write!(
                f,
                "unexpected '{}' at line {}, expected {}",
                found.lexeme, found.line, expected
            ),
            SyntaxError::UnexpectedEndOfInput { line } => {
                write!(f, "unexpected end of input at line {line}")
            }
        }
    }
}

struct StackItem {
    symbol: Symbol,
    node: Option<NodeId>,
}

/// Consumes the full token stream produced by the lexer (already
/// terminated by an `End` token) and produces a parse tree, or the
/// first syntax error encountered.
pub fn parse(tokens: &[Token], grammar: &Grammar, table: &LLParserTable) -> Result<ParseTree, SyntaxError> {
    let mut tree = ParseTree::new(grammar.entry_point());
    let mut stack = vec![
        StackItem { symbol: Symbol::End, node: None },
        StackItem { symbol: grammar.entry_point(), node: Some(tree.root()) },
    ];

    let mut pos = 0;
    let mut last_line = tokens.first().map(|t| t.line).unwrap_or(1);
    let lookahead = |pos: usize| -> &Token { &tokens[pos.min(tokens.len() - 1)] };

    loop {
        let current = lookahead(pos);
        let top = stack.last().expect("work stack is never empty before termination");

        match top.symbol {
            Symbol::End => {
                if current.terminal == Symbol::End {
                    return Ok(tree);
                }
                return Err(SyntaxError::UnexpectedToken {
                    found: current.clone(),
                    expected: "end of input".to_string(),
                });
            }
            Symbol::Terminal(_) if top.symbol == current.terminal => {
                let node = top.node.expect("terminal work items always carry a node");
                tree.attach_token(node, current.clone());
                stack.pop();
                last_line = current.line;
                pos += 1;
            }
            Symbol::Terminal(_) => {
                if current.terminal == Symbol::End {
                    return Err(SyntaxError::UnexpectedEndOfInput { line: last_line });
                }
                return Err(SyntaxError::UnexpectedToken {
                    found: current.clone(),
                    expected: grammar.get_symbol_name(&top.symbol),
                });
            }
            Symbol::NonTerminal(_) => {
                let node = top.node.expect("non-terminal work items always carry a node");
                match table.get_production(top.symbol, current.terminal) {
                    Some(production) => {
                        let production = production.to_vec();
                        stack.pop();
                        for symbol in production.iter().rev() {
                            if *symbol == Symbol::Epsilon {
                                continue;
                            }
                            let child = tree.push_child(node, *symbol);
                            stack.push(StackItem { symbol: *symbol, node: Some(child) });
                        }
                    }
                    None => {
                        if current.terminal == Symbol::End {
                            return Err(SyntaxError::UnexpectedEndOfInput { line: last_line });
                        }
                        return Err(SyntaxError::UnexpectedToken {
                            found: current.clone(),
                            expected: grammar.get_symbol_name(&top.symbol),
                        });
                    }
                }
            }
            Symbol::Epsilon => unreachable!("epsilon is never pushed onto the work stack"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::build_grammar;
    use transpiler_parsegen::generate_table;
    use transpiler_lexer::lex;

    fn parse_source(source: &str) -> Result<ParseTree, SyntaxError> {
        let grammar = build_grammar();
        let table = generate_table(&grammar).unwrap();
        let tokens = lex(source).expect("lexing must succeed in these tests");
        parse(&tokens, &grammar, &table)
    }

    #[test]
    fn parses_minimal_program() {
        parse_source("begin end.").expect("minimal program should parse");
    }

    #[test]
    fn parses_program_with_declarations_and_statements() {
        parse_source(
            "var x: integer;\nbegin\n  x := 1;\n  if x > 0 then x := x + 1 else x := 0;\nend.",
        )
        .expect("program should parse");
    }

    #[test]
    fn dangling_if_forces_block_wrapping_for_nested_if() {
        // `if a then if b then x := 1;` is rejected: a bare IfStmt is not
        // a valid ThenBody. It must be written `if a then begin if b then x := 1; end;`.
        let result = parse_source("begin if a then if b then x := 1; end.");
        assert!(result.is_err());
    }

    #[test]
    fn wrapped_nested_if_parses() {
        parse_source("begin if a then begin if b then x := 1; end; end.").expect("should parse");
    }

    #[test]
    fn unexpected_end_of_input_reports_last_consumed_line() {
        let err = parse_source("var x: integer;\nbegin\n  x := 1;\n").unwrap_err();
        match err {
            SyntaxError::UnexpectedEndOfInput { line } => assert_eq!(line, 3),
            other => panic!("expected UnexpectedEndOfInput, got {other:?}"),
        }
    }

    #[test]
    fn for_loop_with_downto_parses() {
        parse_source("begin for var i: integer := 10 downto 1 do x := i; end.").expect("should parse");
    }
}
