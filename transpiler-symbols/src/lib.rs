//! Core data types shared by every stage of the pipeline: the symbol
//! alphabet, tokens produced by the lexer, and the fixed grammar the
//! parser generator and parser both operate over.

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{self, Display};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
    Epsilon,
    End,
    NonTerminal(u32),
    Terminal(u32),
}

impl Symbol {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Symbol::Terminal(_) | Symbol::End)
    }

    pub fn is_non_terminal(&self) -> bool {
        matches!(self, Symbol::NonTerminal(_))
    }
}

/// A single lexeme recognized by the lexer, tagged with its terminal
/// symbol and source position.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub terminal: Symbol,
    pub lexeme: String,
    pub byte_offset: usize,
    pub line: u32,
}

impl Token {
    pub fn new(terminal: Symbol, lexeme: impl Into<String>, byte_offset: usize, line: u32) -> Self {
        Token {
            terminal,
            lexeme: lexeme.into(),
            byte_offset,
            line,
        }
    }

    pub fn eoi(byte_offset: usize, line: u32) -> Self {
        Token::new(Symbol::End, "", byte_offset, line)
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lexeme)
    }
}

/// A right-hand side of a production: `lhs -> rhs[0] rhs[1] ...`.
/// `rhs == [Symbol::Epsilon]` denotes the empty production.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    lhs: u32,
    rhs: Vec<Symbol>,
}

impl Rule {
    pub fn new(lhs: u32, rhs: Vec<Symbol>) -> Self {
        Rule { lhs, rhs }
    }

    pub fn lhs(&self) -> Symbol {
        Symbol::NonTerminal(self.lhs)
    }

    pub fn rhs(&self) -> &[Symbol] {
        &self.rhs
    }

    pub fn is_epsilon(&self) -> bool {
        self.rhs == [Symbol::Epsilon]
    }

    pub fn display<'rule, 'grammar>(&'rule self, grammar: &'grammar Grammar) -> RuleDisplay<'rule, 'grammar> {
        RuleDisplay { rule: self, grammar }
    }
}

pub struct RuleDisplay<'rule, 'grammar> {
    rule: &'rule Rule,
    grammar: &'grammar Grammar,
}

impl<'rule, 'grammar> Display for RuleDisplay<'rule, 'grammar> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rhs_names: Vec<String> = self
            .rule
            .rhs()
            .iter()
            .map(|s| self.grammar.get_symbol_name(s))
            .collect();
        write!(
            f,
            "{} -> {}",
            self.grammar.get_symbol_name(&self.rule.lhs()),
            rhs_names.join(" ")
        )
    }
}

#[derive(Debug, PartialEq)]
pub enum GrammarError {
    MissingSymbol(String),
    RuleWithTerminalLeftHandSide,
}

impl Error for GrammarError {}

impl Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrammarError::MissingSymbol(name) => write!(f, "grammar references unknown symbol '{}'", name),
            GrammarError::RuleWithTerminalLeftHandSide => {
                write!(f, "rule left-hand side must be a non-terminal")
            }
        }
    }
}

/// The fixed grammar for the source language: a start symbol, a set of
/// productions, and name tables used only for diagnostics.
#[derive(Debug)]
pub struct Grammar {
    rules: Vec<Rule>,
    non_terminal_names: BTreeMap<u32, &'static str>,
    terminal_names: BTreeMap<u32, &'static str>,
    entry_symbol: Symbol,
}

impl Grammar {
    pub fn new(
        entry_symbol: Symbol,
        rules: Vec<Rule>,
        non_terminal_names: BTreeMap<u32, &'static str>,
        terminal_names: BTreeMap<u32, &'static str>,
    ) -> Self {
        Grammar {
            rules,
            non_terminal_names,
            terminal_names,
            entry_symbol,
        }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn rules_for(&self, non_terminal: Symbol) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(move |r| r.lhs() == non_terminal)
    }

    pub fn entry_point(&self) -> Symbol {
        self.entry_symbol
    }

    pub fn non_terminals(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.non_terminal_names.keys().map(|i| Symbol::NonTerminal(*i))
    }

    pub fn terminals(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.terminal_names.keys().map(|i| Symbol::Terminal(*i))
    }

    pub fn get_symbol_name(&self, symbol: &Symbol) -> String {
        match symbol {
            Symbol::Terminal(i) => self
                .terminal_names
                .get(i)
                .map(|s| s.to_string())
                .unwrap_or_else(|| format!("terminal({})", i)),
            Symbol::NonTerminal(i) => self
                .non_terminal_names
                .get(i)
                .map(|s| s.to_string())
                .unwrap_or_else(|| format!("non_terminal({})", i)),
            Symbol::Epsilon => String::from("<eps>"),
            Symbol::End => String::from("<eoi>"),
        }
    }
}

impl Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Grammar (entry: {}) {{", self.get_symbol_name(&self.entry_symbol))?;
        for rule in &self.rules {
            writeln!(f, "\t{}", rule.display(self))?;
        }
        write!(f, "}}")
    }
}

/// Fixed terminal indices for the source language. Shared between the
/// lexer (which assigns these tags while scanning) and the grammar
/// construction in `transpiler-parser` (which builds the predict table
/// over them), so both sides agree on the alphabet without either one
/// generating it from the other.
pub mod terminals {
    pub const ID: u32 = 0;
    pub const INT_LIT: u32 = 1;
    pub const REAL_LIT: u32 = 2;
    pub const STRING_LIT: u32 = 3;

    pub const T_INTEGER: u32 = 4;
    pub const T_REAL: u32 = 5;
    pub const T_BOOLEAN: u32 = 6;
    pub const T_CHAR: u32 = 7;
    pub const T_STRING: u32 = 8;

    pub const TRUE: u32 = 9;
    pub const FALSE: u32 = 10;

    pub const VAR: u32 = 11;
    pub const IF: u32 = 12;
    pub const THEN: u32 = 13;
    pub const ELSE: u32 = 14;
    pub const FOR: u32 = 15;
    pub const WHILE: u32 = 16;
    pub const REPEAT: u32 = 17;
    pub const UNTIL: u32 = 18;
    pub const DO: u32 = 19;
    pub const TO: u32 = 20;
    pub const DOWNTO: u32 = 21;
    pub const BEGIN: u32 = 22;
    pub const END: u32 = 23;

    pub const LPAREN: u32 = 24;
    pub const RPAREN: u32 = 25;
    pub const SEMI: u32 = 26;
    pub const COLON: u32 = 27;
    pub const COMMA: u32 = 28;
    pub const DOT: u32 = 48;

    pub const EQ: u32 = 29;
    pub const NE: u32 = 30;
    pub const LE: u32 = 31;
    pub const LT: u32 = 32;
    pub const GE: u32 = 33;
    pub const GT: u32 = 34;

    pub const PLUS: u32 = 35;
    pub const MINUS: u32 = 36;
    pub const STAR: u32 = 37;
    pub const SLASH: u32 = 38;
    pub const ASSIGN: u32 = 39;
    pub const PLUS_ASSIGN: u32 = 40;
    pub const MINUS_ASSIGN: u32 = 41;
    pub const STAR_ASSIGN: u32 = 42;
    pub const SLASH_ASSIGN: u32 = 43;

    pub const AND: u32 = 44;
    pub const OR: u32 = 45;
    pub const NOT: u32 = 46;
    pub const XOR: u32 = 47;

    /// `(index, diagnostic name)` in index order, used to build the name
    /// table consumed by `Grammar::get_symbol_name` and by the lexer's
    /// rule table.
    pub const ALL: &[(u32, &str)] = &[
        (ID, "ID"),
        (INT_LIT, "INT_LIT"),
        (REAL_LIT, "REAL_LIT"),
        (STRING_LIT, "STRING_LIT"),
        (T_INTEGER, "integer"),
        (T_REAL, "real"),
        (T_BOOLEAN, "boolean"),
        (T_CHAR, "char"),
        (T_STRING, "string"),
        (TRUE, "true"),
        (FALSE, "false"),
        (VAR, "var"),
        (IF, "if"),
        (THEN, "then"),
        (ELSE, "else"),
        (FOR, "for"),
        (WHILE, "while"),
        (REPEAT, "repeat"),
        (UNTIL, "until"),
        (DO, "do"),
        (TO, "to"),
        (DOWNTO, "downto"),
        (BEGIN, "begin"),
        (END, "end"),
        (LPAREN, "("),
        (RPAREN, ")"),
        (SEMI, ";"),
        (COLON, ":"),
        (COMMA, ","),
        (EQ, "="),
        (NE, "<>"),
        (LE, "<="),
        (LT, "<"),
        (GE, ">="),
        (GT, ">"),
        (PLUS, "+"),
        (MINUS, "-"),
        (STAR, "*"),
        (SLASH, "/"),
        (ASSIGN, ":="),
        (PLUS_ASSIGN, "+="),
        (MINUS_ASSIGN, "-="),
        (STAR_ASSIGN, "*="),
        (SLASH_ASSIGN, "/="),
        (AND, "and"),
        (OR, "or"),
        (NOT, "not"),
        (XOR, "xor"),
        (DOT, "."),
    ];
}

/// Fixed non-terminal indices for the concrete grammar built in
/// `transpiler-parser`. Kept alongside `terminals` so both that crate
/// and any diagnostic code can name a symbol without redefining it.
pub mod non_terminals {
    pub const PROGRAM: u32 = 0;
    pub const VAR_DECL_LIST_OPT: u32 = 1;
    pub const VAR_DECL: u32 = 2;
    pub const TYPE: u32 = 3;
    pub const INIT_OPT: u32 = 4;
    pub const STMT_LIST: u32 = 5;
    pub const STMT: u32 = 6;
    pub const THEN_BODY: u32 = 7;
    pub const ID_STMT: u32 = 8;
    pub const ID_STMT_TAIL: u32 = 9;
    pub const ASSIGN_OP: u32 = 10;
    pub const IF_STMT: u32 = 11;
    pub const ELSE_OPT: u32 = 12;
    pub const FOR_STMT: u32 = 13;
    pub const FOR_DIR: u32 = 14;
    pub const WHILE_STMT: u32 = 15;
    pub const REPEAT_STMT: u32 = 16;
    pub const BLOCK_STMT: u32 = 17;
    pub const EXPR: u32 = 18;
    pub const OR_EXPR: u32 = 19;
    pub const OR_EXPR_TAIL: u32 = 20;
    pub const AND_EXPR: u32 = 21;
    pub const AND_EXPR_TAIL: u32 = 22;
    pub const NOT_EXPR: u32 = 23;
    pub const REL_EXPR: u32 = 24;
    pub const REL_EXPR_TAIL: u32 = 25;
    pub const REL_OP: u32 = 26;
    pub const ADD_EXPR: u32 = 27;
    pub const ADD_EXPR_TAIL: u32 = 28;
    pub const MUL_EXPR: u32 = 29;
    pub const MUL_EXPR_TAIL: u32 = 30;
    pub const UNARY_EXPR: u32 = 31;
    pub const PRIMARY: u32 = 32;
    pub const CALL_TAIL: u32 = 33;
    pub const ARGS_OPT: u32 = 34;
    pub const ARG_LIST_TAIL: u32 = 35;

    pub const ALL: &[(u32, &str)] = &[
        (PROGRAM, "Program"),
        (VAR_DECL_LIST_OPT, "VarDeclListOpt"),
        (VAR_DECL, "VarDecl"),
        (TYPE, "Type"),
        (INIT_OPT, "InitOpt"),
        (STMT_LIST, "StmtList"),
        (STMT, "Stmt"),
        (THEN_BODY, "ThenBody"),
        (ID_STMT, "IdStmt"),
        (ID_STMT_TAIL, "IdStmtTail"),
        (ASSIGN_OP, "AssignOp"),
        (IF_STMT, "IfStmt"),
        (ELSE_OPT, "ElseOpt"),
        (FOR_STMT, "ForStmt"),
        (FOR_DIR, "ForDir"),
        (WHILE_STMT, "WhileStmt"),
        (REPEAT_STMT, "RepeatStmt"),
        (BLOCK_STMT, "BlockStmt"),
        (EXPR, "Expr"),
        (OR_EXPR, "OrExpr"),
        (OR_EXPR_TAIL, "OrExprTail"),
        (AND_EXPR, "AndExpr"),
        (AND_EXPR_TAIL, "AndExprTail"),
        (NOT_EXPR, "NotExpr"),
        (REL_EXPR, "RelExpr"),
        (REL_EXPR_TAIL, "RelExprTail"),
        (REL_OP, "RelOp"),
        (ADD_EXPR, "AddExpr"),
        (ADD_EXPR_TAIL, "AddExprTail"),
        (MUL_EXPR, "MulExpr"),
        (MUL_EXPR_TAIL, "MulExprTail"),
        (UNARY_EXPR, "UnaryExpr"),
        (PRIMARY, "Primary"),
        (CALL_TAIL, "CallTail"),
        (ARGS_OPT, "ArgsOpt"),
        (ARG_LIST_TAIL, "ArgListTail"),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_grammar() -> Grammar {
        // S -> a S | eps
        let mut nt = BTreeMap::new();
        nt.insert(0, "S");
        let mut t = BTreeMap::new();
        t.insert(0, "a");
        Grammar::new(
            Symbol::NonTerminal(0),
            vec![
                Rule::new(0, vec![Symbol::Terminal(0), Symbol::NonTerminal(0)]),
                Rule::new(0, vec![Symbol::Epsilon]),
            ],
            nt,
            t,
        )
    }

    #[test]
    fn rules_for_filters_by_lhs() {
        let g = toy_grammar();
        assert_eq!(g.rules_for(Symbol::NonTerminal(0)).count(), 2);
    }

    #[test]
    fn epsilon_rule_detected() {
        let g = toy_grammar();
        let eps_rule = g.rules().iter().find(|r| r.is_epsilon()).unwrap();
        assert!(eps_rule.is_epsilon());
    }

    #[test]
    fn symbol_name_falls_back_when_unknown() {
        let g = toy_grammar();
        assert_eq!(g.get_symbol_name(&Symbol::Terminal(9)), "terminal(9)");
    }

    #[test]
    fn display_renders_rules() {
        let g = toy_grammar();
        let rendered = format!("{}", g);
        assert!(rendered.contains("S -> a S"));
        assert!(rendered.contains("S -> <eps>"));
    }
}
